pub mod m6805;

use crate::error::Result;
use crate::types::HardwareInteger;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, IntoStaticStr};

pub trait CpuInstruction {}

/// Level of an input pin as driven by the host
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum LineState {
    Clear,
    Assert,
    /// Assert immediately followed by clear
    Pulse,
}
impl LineState {
    #[inline]
    pub fn is_asserted(self) -> bool {
        self != LineState::Clear
    }
}

/// Input pins a CPU core may expose
#[derive(
    PartialEq, Eq, Clone, Copy, Debug, Display, EnumString, IntoStaticStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
pub enum InputLine {
    /// /IRQ (IRQ1 on parts with several external interrupts)
    Irq,
    Irq2,
    Nmi,
    Reset,
    /// Timer interrupt request or timer clock pin, depending on the part
    Timer,
    Timer2,
    Timer3,
    Cpi,
    Pci,
    Sci,
    AdConv,
    /// Input capture pin of a free-running timer
    TimerCapture,
}

pub trait Cpu<TAddress, TWord, TInstruction>
where
    TAddress: HardwareInteger,
    TWord: HardwareInteger,
    TInstruction: CpuInstruction,
{
    fn reset(&mut self) -> u32;

    fn execute_next_instruction(&mut self) -> u32;

    fn execute_cycles(&mut self, cycles: u32) -> u32 {
        let mut run: u32 = 0;
        while run < cycles {
            run += self.execute_next_instruction();
        }
        run
    }

    fn set_input(&mut self, line: InputLine, state: LineState) -> Result<()>;

    /// Number of machine cycles elapsed after `clocks` input clocks, rounded up
    fn clocks_to_cycles(&self, clocks: u64) -> u64;

    fn cycles_to_clocks(&self, cycles: u64) -> u64;
}
