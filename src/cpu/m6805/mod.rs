pub mod disasm;
mod execute;
pub mod hc05;
pub mod m68705;
pub mod peripherals;
pub mod ports;
pub mod state;
pub mod tables;
pub mod variant;

pub use disasm::{DisasmFlags, Disassembler, Disassembly};
pub use peripherals::{PeripheralSnapshot, Peripherals};
pub use ports::{PortDevice, PortDeviceRef};
pub use state::{M6805Snapshot, StateEntry};
pub use tables::{AddressingMode, BaseInstruction, Instruction, InstructionSet};
pub use variant::{Configuration, InterruptSource, Variant};

use crate::bus::Bus;
use crate::cpu::*;
use crate::error::{EmuError, Result};
use crate::types::*;
use crate::*;
use serde::{Deserialize, Serialize};
use std::num::Wrapping;

pub type Address = u16w;
pub type Word = u8w;

bitflags! {
    pub struct ConditionCodes : u8 {
        /// Carry/borrow
        const C = 0b00000001;
        /// Zero
        const Z = 0b00000010;
        /// Negative
        const N = 0b00000100;
        /// Interrupt mask
        const I = 0b00001000;
        /// Half carry
        const H = 0b00010000;
    }
}

/// Bits 7-5 of CC are not implemented and read back as ones
const CC_UNUSED: u8 = 0b11100000;

#[derive(PartialEq, Eq, Clone, Copy, Debug, Serialize, Deserialize)]
pub enum HaltState {
    Running,
    /// WAIT: clocks keep running, no instructions are fetched
    Wait,
    /// STOP: everything halts until an interrupt
    Stop,
}

pub struct M6805<'a> {
    /// Accumulator
    a: Word,
    /// Index register
    x: Word,
    /// Stack pointer
    s: Address,
    /// Program counter
    pc: Address,
    /// Condition code register
    cc: ConditionCodes,

    pending_interrupts: u16,
    /// One bit per `InputLine`, set while the line is held asserted
    line_states: u16,
    halt: HaltState,
    reset_held: bool,
    reset_pulses: u64,
    /// Opcode and operand bytes read through the program counter
    fetched: u64,

    variant: Variant,
    config: Configuration,
    bus: EmuRef<Bus<'a, Address, Word>>,
    peripherals: Peripherals<'a>,
    irq_acknowledge: Option<Box<dyn FnMut(u16) + 'a>>,
}
impl<'a> M6805<'a> {
    pub fn new(variant: Variant, bus: EmuRef<Bus<'a, Address, Word>>) -> Self {
        let config = variant.configuration();
        Self {
            a: Wrapping(0),
            x: Wrapping(0),
            s: Wrapping(config.sp_mask),
            pc: Wrapping(0),
            cc: ConditionCodes::I,
            pending_interrupts: 0,
            line_states: 0,
            halt: HaltState::Running,
            reset_held: false,
            reset_pulses: 0,
            fetched: 0,
            variant,
            peripherals: Peripherals::new(config.peripherals),
            config,
            bus,
            irq_acknowledge: None,
        }
    }

    #[inline]
    pub fn create(variant: Variant, bus: EmuRef<Bus<'a, Address, Word>>) -> EmuRef<Self> {
        make_ref(Self::new(variant, bus))
    }

    #[inline]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    #[inline]
    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    #[inline]
    pub fn a(&self) -> u8 {
        self.a.0
    }

    #[inline]
    pub fn x(&self) -> u8 {
        self.x.0
    }

    #[inline]
    pub fn s(&self) -> u16 {
        self.s.0
    }

    #[inline]
    pub fn pc(&self) -> u16 {
        self.pc.0
    }

    #[inline]
    pub fn cc(&self) -> ConditionCodes {
        self.cc
    }

    #[inline]
    pub fn pending_interrupts(&self) -> u16 {
        self.pending_interrupts
    }

    #[inline]
    pub fn halt_state(&self) -> HaltState {
        self.halt
    }

    /// Number of times the reset line was pulsed, by the host or by a watchdog
    #[inline]
    pub fn reset_pulses(&self) -> u64 {
        self.reset_pulses
    }

    #[inline]
    pub fn bytes_fetched(&self) -> u64 {
        self.fetched
    }

    /// Called with the pending bit of every interrupt the core takes
    pub fn set_irq_acknowledge<F: FnMut(u16) + 'a>(&mut self, callback: F) {
        self.irq_acknowledge = Some(Box::new(callback));
    }

    /// Connects a device to the on-chip parallel ports.
    /// Returns `false` if the part has none.
    pub fn attach_ports(&mut self, device: PortDeviceRef<'a>) -> bool {
        self.peripherals.attach(device)
    }

    pub fn set_port_input(&mut self, port: usize, level: u8) {
        if port < ports::PORT_COUNT {
            self.peripherals
                .set_port_input(port, level, &mut self.pending_interrupts);
        }
    }

    #[inline]
    fn mask_address(&self, address: u16) -> u16 {
        address & self.config.address_mask()
    }

    /// Reads memory the way an instruction would, side effects included
    pub fn read(&mut self, address: u16) -> u8 {
        let address = self.mask_address(address);
        match self.peripherals.read(address, &mut self.pending_interrupts) {
            Some(data) => data,
            None => self.bus.borrow().read(Wrapping(address)).0,
        }
    }

    pub fn write(&mut self, address: u16, data: u8) {
        let address = self.mask_address(address);
        if !self
            .peripherals
            .write(address, data, &mut self.pending_interrupts)
        {
            self.bus.borrow().write(Wrapping(address), Wrapping(data));
        }
    }

    /// Reads memory without disturbing any register or peripheral
    pub fn peek(&self, address: u16) -> u8 {
        let address = self.mask_address(address);
        match self.peripherals.peek(address) {
            Some(data) => data,
            None => self.bus.borrow().peek(Wrapping(address)).0,
        }
    }

    #[inline]
    fn read_word(&mut self, address: Address) -> Word {
        Wrapping(self.read(address.0))
    }

    #[inline]
    fn write_word(&mut self, address: Address, data: Word) {
        self.write(address.0, data.0)
    }

    /// Big-endian
    fn read_address(&mut self, address: Address) -> Address {
        let hi = self.read_word(address);
        let lo = self.read_word(address + Wrapping(1));
        Wrapping(make_word(hi.0, lo.0))
    }

    fn read_next_word(&mut self) -> Word {
        let result = self.read_word(self.pc);
        self.pc += Wrapping(1);
        self.fetched += 1;
        result
    }

    fn read_next_address(&mut self) -> Address {
        let hi = self.read_next_word();
        let lo = self.read_next_word();
        Wrapping(make_word(hi.0, lo.0))
    }

    #[inline]
    fn sp_adjust(&self, s: Address) -> Address {
        Wrapping((s.0 & self.config.sp_mask) | self.config.sp_floor)
    }

    fn push_word(&mut self, data: Word) {
        self.write_word(self.s, data);
        self.s = self.sp_adjust(self.s - Wrapping(1));
    }

    fn pop_word(&mut self) -> Word {
        self.s = self.sp_adjust(self.s + Wrapping(1));
        self.read_word(self.s)
    }

    fn push_address(&mut self, data: Address) {
        self.push_word(Wrapping(data.0 as u8));
        self.push_word(Wrapping((data.0 >> 8) as u8));
    }

    fn pop_address(&mut self) -> Address {
        let hi = self.pop_word();
        let lo = self.pop_word();
        Wrapping(make_word(hi.0, lo.0))
    }

    /// Stacks the full register frame used by interrupts and SWI
    fn push_frame(&mut self) {
        self.push_address(self.pc);
        self.push_word(self.x);
        self.push_word(self.a);
        self.push_word(Wrapping(self.cc.bits() | CC_UNUSED));
    }

    #[inline]
    fn set_nz_flags(&mut self, value: Word) {
        self.cc.set(ConditionCodes::Z, value.0 == 0);
        self.cc.set(ConditionCodes::N, (value.0 & 0x80) != 0);
    }

    /// Level of the pin sampled by BIL/BIH
    fn test_il(&self) -> bool {
        match self.peripherals.irq_line() {
            Some(level) => level,
            None => (self.line_states & line_bit(self.config.il_line)) != 0,
        }
    }

    fn burn_cycles(&mut self, count: u32) {
        if count == 0 {
            return;
        }
        if self.peripherals.burn(count, &mut self.pending_interrupts) {
            tracing::info!(target: "m6805::cop", "watchdog reset at PC={:04X}", self.pc.0);
            self.reset_pulses += 1;
            self.reset();
        }
    }

    /// Services the highest priority request the mask allows, returning the cycles spent
    fn interrupt(&mut self) -> u32 {
        let masked = self.cc.contains(ConditionCodes::I);
        let pending = self.pending_interrupts;
        let source = match self
            .config
            .interrupts
            .iter()
            .find(|s| ((pending & s.bit) != 0) && (!s.maskable || !masked))
        {
            Some(source) => *source,
            None => return 0,
        };

        self.push_frame();
        self.cc.insert(ConditionCodes::I);
        if let Some(acknowledge) = self.irq_acknowledge.as_mut() {
            acknowledge(source.bit);
        }
        if source.latched {
            self.pending_interrupts &= !source.bit;
        }
        self.peripherals.interrupt_serviced(source.bit);
        self.pc = self.read_address(Wrapping(source.vector));
        self.halt = HaltState::Running;

        tracing::debug!(
            target: "m6805::int",
            "servicing {} interrupt, vector {:04X} -> {:04X}",
            source.name,
            source.vector,
            self.pc.0
        );

        let cycles = self.config.interrupt_cycles;
        self.burn_cycles(cycles);
        cycles
    }

    /// One instruction boundary. Returns `None` while nothing can run.
    fn cycle(&mut self) -> Option<u32> {
        if self.reset_held {
            return None;
        }

        let mut cycles = 0;
        if self.pending_interrupts != 0 {
            cycles += self.interrupt();
        }

        match self.halt {
            HaltState::Running => {}
            HaltState::Wait => {
                self.burn_cycles(1);
                return Some(cycles + 1);
            }
            HaltState::Stop => return None,
        }

        let op_code = self.read_next_word().0;
        let instruction = self.config.instruction_set.ops()[op_code as usize];
        self.execute_instruction(op_code, instruction);

        let cost = self.config.instruction_set.cycles()[op_code as usize] as u32;
        self.burn_cycles(cost);
        Some(cycles + cost)
    }

    /// Runs until `budget` cycles are used up and returns the cycles actually consumed.
    ///
    /// At least one instruction boundary is processed, so the result can exceed the budget.
    pub fn run(&mut self, budget: i32) -> i32 {
        self.s = self.sp_adjust(self.s);

        let mut icount = budget;
        loop {
            match self.cycle() {
                Some(cycles) => icount -= cycles as i32,
                None => icount = icount.min(0),
            }
            if icount <= 0 {
                break;
            }
        }
        budget - icount
    }

    /// Executes a single instruction boundary. An idle core reports one cycle.
    pub fn step(&mut self) -> u32 {
        self.cycle().unwrap_or(1)
    }

    pub fn disassemble_at(&self, pc: u16) -> Result<Disassembly> {
        let bytes: Vec<u8> = (0..3u16).map(|i| self.peek(pc.wrapping_add(i))).collect();
        Disassembler::new(self.config.instruction_set)
            .with_symbols(self.config.symbols)
            .disassemble(pc, &bytes)
    }

    /// Condition codes rendered as `???HINZC`, with `.` for clear bits
    pub fn flags_string(&self) -> String {
        let cc = self.cc.bits() | CC_UNUSED;
        "???HINZC"
            .chars()
            .enumerate()
            .map(|(i, c)| if (cc & (0x80 >> i)) != 0 { c } else { '.' })
            .collect()
    }

    pub fn state_entries(&self) -> Vec<StateEntry> {
        let mut entries = vec![
            StateEntry::new("A", self.a.0 as u32, 0xFF),
            StateEntry::new("PC", self.pc.0 as u32, 0xFFFF),
            StateEntry::new("S", self.s.0 as u32, 0xFFFF),
            StateEntry::new("X", self.x.0 as u32, 0xFF),
            StateEntry::new("CC", (self.cc.bits() | CC_UNUSED) as u32, 0xFF),
        ];
        self.peripherals.state_entries(&mut entries);
        entries
    }

    pub fn set_state_entry(&mut self, name: &str, value: u32) -> Result<()> {
        match name {
            "A" => self.a = Wrapping(value as u8),
            "PC" => self.pc = Wrapping(value as u16),
            "S" => self.s = self.sp_adjust(Wrapping(value as u16)),
            "X" => self.x = Wrapping(value as u8),
            "CC" => self.cc = ConditionCodes::from_bits_truncate(value as u8),
            _ => {
                if !self.peripherals.set_state_entry(name, value) {
                    return Err(EmuError::UnknownRegister(name.to_string()));
                }
            }
        }
        Ok(())
    }

    pub fn save_state(&self) -> M6805Snapshot {
        M6805Snapshot {
            variant: self.variant,
            a: self.a.0,
            x: self.x.0,
            s: self.s.0,
            pc: self.pc.0,
            cc: self.cc.bits(),
            pending_interrupts: self.pending_interrupts,
            line_states: self.line_states,
            halt: self.halt,
            reset_held: self.reset_held,
            reset_pulses: self.reset_pulses,
            peripherals: self.peripherals.snapshot(),
        }
    }

    pub fn load_state(&mut self, snapshot: &M6805Snapshot) -> Result<()> {
        if snapshot.variant != self.variant {
            return Err(EmuError::StateMismatch {
                expected: self.variant,
                found: snapshot.variant,
            });
        }
        if !self.peripherals.restore(&snapshot.peripherals) {
            return Err(EmuError::StateMismatch {
                expected: self.variant,
                found: snapshot.variant,
            });
        }

        self.a = Wrapping(snapshot.a);
        self.x = Wrapping(snapshot.x);
        self.s = self.sp_adjust(Wrapping(snapshot.s));
        self.pc = Wrapping(snapshot.pc);
        self.cc = ConditionCodes::from_bits_truncate(snapshot.cc);
        self.pending_interrupts = snapshot.pending_interrupts;
        self.line_states = snapshot.line_states;
        self.halt = snapshot.halt;
        self.reset_held = snapshot.reset_held;
        self.reset_pulses = snapshot.reset_pulses;
        Ok(())
    }
}
impl<'a> Cpu<Address, Word, Instruction> for M6805<'a> {
    fn reset(&mut self) -> u32 {
        self.a = Wrapping(0);
        self.x = Wrapping(0);
        self.s = Wrapping(self.config.sp_mask);
        self.cc = ConditionCodes::I;
        self.pending_interrupts = 0;
        // edge detectors forget any line still held across the reset
        self.line_states = 0;
        self.halt = HaltState::Running;

        self.peripherals.reset(&mut self.pending_interrupts);
        if let Some(mor) = self.config.mask_options {
            let port_b_interrupt = self.peek(mor);
            let ncope = (self.peek(mor + 1) & 0x01) != 0;
            self.peripherals
                .apply_mask_options(port_b_interrupt, ncope, &mut self.pending_interrupts);
        }

        self.pc = self.read_address(Wrapping(self.config.reset_vector));
        tracing::debug!(target: "m6805", "{} reset, PC={:04X}", self.variant, self.pc.0);
        0
    }

    #[inline]
    fn execute_next_instruction(&mut self) -> u32 {
        self.step()
    }

    fn set_input(&mut self, line: InputLine, state: LineState) -> Result<()> {
        if line == InputLine::Reset {
            match state {
                LineState::Pulse => {
                    self.reset_pulses += 1;
                    self.reset_held = false;
                    self.reset();
                }
                LineState::Assert => {
                    self.reset_held = true;
                    self.reset();
                }
                LineState::Clear => {
                    if self.reset_held {
                        self.reset_held = false;
                        self.reset();
                    }
                }
            }
            return Ok(());
        }

        if self
            .peripherals
            .set_input(line, state, &mut self.pending_interrupts)
        {
            return Ok(());
        }

        let source = self
            .config
            .interrupts
            .iter()
            .find(|s| s.line == Some(line))
            .copied()
            .ok_or(EmuError::UnsupportedInputLine {
                variant: self.variant,
                line,
            })?;

        let bit = line_bit(line);
        let was_held = (self.line_states & bit) != 0;
        let held = state == LineState::Assert;
        if (held != was_held) || (state == LineState::Pulse) {
            if held {
                self.line_states |= bit;
            } else {
                self.line_states &= !bit;
            }
            if state.is_asserted() {
                tracing::trace!(target: "m6805::int", "{} line latched", source.name);
                self.pending_interrupts |= source.bit;
            }
        }
        Ok(())
    }

    #[inline]
    fn clocks_to_cycles(&self, clocks: u64) -> u64 {
        (clocks + self.config.clock_divider - 1) / self.config.clock_divider
    }

    #[inline]
    fn cycles_to_clocks(&self, cycles: u64) -> u64 {
        cycles * self.config.clock_divider
    }
}

#[inline]
fn line_bit(line: InputLine) -> u16 {
    1 << (line as u16)
}
