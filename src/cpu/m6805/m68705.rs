use super::ports::{IoPorts, PortDeviceRef, PortState, PORT_COUNT};
use super::state::StateEntry;
use super::variant::INT_TIMER;
use crate::cpu::{InputLine, LineState};
use serde::{Deserialize, Serialize};

bitflags! {
    pub struct TimerControl : u8 {
        /// Timer interrupt request
        const TIR = 0b10000000;
        /// Timer interrupt mask
        const TIM = 0b01000000;
        /// External clock source
        const TIN = 0b00100000;
        /// External clock enable
        const TIE = 0b00010000;
        /// Prescaler clear, write-only
        const PSC = 0b00001000;
        /// Prescaler divide select
        const PS = 0b00000111;
    }
}

const PORT_DDR: [bool; PORT_COUNT] = [true, true, true, true];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ClockSource {
    Internal,
    /// Internal clock, counting only while the TIMER pin is high
    Gated,
    Stopped,
    /// Rising edges on the TIMER pin
    External,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct M68705Registers {
    pub tdr: u8,
    /// Value reloaded into TDR by a prescaler clear
    pub latch: u8,
    pub tcr: u8,
    pub prescaler: u8,
    pub timer_pin: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct M68705Snapshot {
    pub ports: PortState,
    pub registers: M68705Registers,
}

/// Ports and 8 bit prescaled timer of the MC68705 and MC146805E2
pub struct M68705Peripherals<'a> {
    ports: IoPorts<'a>,
    regs: M68705Registers,
}
impl<'a> M68705Peripherals<'a> {
    pub fn new(port_bits: [u8; PORT_COUNT]) -> Self {
        Self {
            ports: IoPorts::new(port_bits),
            regs: M68705Registers {
                tdr: 0xFF,
                latch: 0xFF,
                tcr: TimerControl::TIM.bits(),
                prescaler: 0,
                timer_pin: false,
            },
        }
    }

    #[inline]
    pub fn attach(&mut self, device: PortDeviceRef<'a>) {
        self.ports.attach(device);
    }

    pub fn reset(&mut self, pending: &mut u16) {
        self.ports.reset();
        self.regs.tcr = TimerControl::TIM.bits();
        self.regs.prescaler = 0;
        self.update_pending(pending);
    }

    #[inline]
    fn tcr(&self) -> TimerControl {
        TimerControl::from_bits_truncate(self.regs.tcr)
    }

    fn clock_source(&self) -> ClockSource {
        let tcr = self.tcr();
        match (tcr.contains(TimerControl::TIN), tcr.contains(TimerControl::TIE)) {
            (false, false) => ClockSource::Internal,
            (false, true) => ClockSource::Gated,
            (true, false) => ClockSource::Stopped,
            (true, true) => ClockSource::External,
        }
    }

    fn update_pending(&self, pending: &mut u16) {
        let tcr = self.tcr();
        if tcr.contains(TimerControl::TIR) && !tcr.contains(TimerControl::TIM) {
            *pending |= INT_TIMER;
        } else {
            *pending &= !INT_TIMER;
        }
    }

    pub fn set_port_input(&mut self, port: usize, level: u8) {
        if self.ports.is_present(port) {
            self.ports.set_input(port, level);
        }
    }

    fn port_address(&self, address: u16) -> Option<usize> {
        let port = (address & 0x03) as usize;
        if (port < PORT_COUNT - 1) && self.ports.is_present(port) {
            Some(port)
        } else {
            None
        }
    }

    pub fn read(&mut self, address: u16) -> Option<u8> {
        match address {
            0x0000..=0x0002 => self.port_address(address).map(|port| {
                self.ports.sample(port);
                self.ports.value(port)
            }),
            _ => self.peek(address),
        }
    }

    pub fn peek(&self, address: u16) -> Option<u8> {
        match address {
            0x0000..=0x0002 => self.port_address(address).map(|port| self.ports.value(port)),
            0x0004..=0x0006 => self
                .port_address(address)
                .map(|port| self.ports.state.ddr[port]),
            0x0008 => Some(self.regs.tdr),
            0x0009 => Some(self.regs.tcr),
            _ => None,
        }
    }

    pub fn write(&mut self, address: u16, data: u8, pending: &mut u16) -> bool {
        match address {
            0x0000..=0x0002 => match self.port_address(address) {
                Some(port) => self.ports.write_latch(port, data),
                None => return false,
            },
            0x0004..=0x0006 => match self.port_address(address) {
                Some(port) => {
                    if self.ports.write_ddr(port, data) != 0 {
                        self.ports.notify(port);
                    }
                }
                None => return false,
            },
            0x0008 => {
                tracing::debug!(target: "m6805::timer", "write TDR: {:02X}", data);
                self.regs.latch = data;
                self.regs.tdr = data;
            }
            0x0009 => self.write_tcr(data, pending),
            _ => return false,
        }
        true
    }

    fn write_tcr(&mut self, data: u8, pending: &mut u16) {
        let data = TimerControl::from_bits_truncate(data);
        let old = self.tcr();

        // TIR can be cleared but not set by software
        let mut tcr = data & !(TimerControl::TIR | TimerControl::PSC);
        if old.contains(TimerControl::TIR) && data.contains(TimerControl::TIR) {
            tcr |= TimerControl::TIR;
        }
        tracing::debug!(
            target: "m6805::timer",
            "write TCR: {:?}{}",
            tcr,
            if data.contains(TimerControl::PSC) { ", clear prescaler" } else { "" }
        );
        self.regs.tcr = tcr.bits();

        if data.contains(TimerControl::PSC) {
            self.regs.prescaler = 0;
            self.regs.tdr = self.regs.latch;
        }
        self.update_pending(pending);
    }

    /// Feeds `clocks` prescaler inputs to the timer
    fn tick(&mut self, clocks: u32, pending: &mut u16) {
        let shift = (self.tcr() & TimerControl::PS).bits() as u32;
        let total = self.regs.prescaler as u32 + clocks;
        let decrements = total >> shift;
        self.regs.prescaler = (total & ((1 << shift) - 1)) as u8;
        if decrements == 0 {
            return;
        }

        let until_zero = if self.regs.tdr == 0 { 0x100 } else { self.regs.tdr as u32 };
        if decrements >= until_zero {
            tracing::trace!(target: "m6805::timer", "timer reached zero");
            self.regs.tcr |= TimerControl::TIR.bits();
            self.update_pending(pending);
        }
        self.regs.tdr = self.regs.tdr.wrapping_sub(decrements as u8);
    }

    pub fn burn(&mut self, count: u32, pending: &mut u16) {
        match self.clock_source() {
            ClockSource::Internal => self.tick(count, pending),
            ClockSource::Gated if self.regs.timer_pin => self.tick(count, pending),
            _ => {}
        }
    }

    pub fn set_input(&mut self, line: InputLine, state: LineState, pending: &mut u16) -> bool {
        if line != InputLine::Timer {
            return false;
        }

        let rising = state.is_asserted() && !self.regs.timer_pin;
        if rising && (self.clock_source() == ClockSource::External) {
            self.tick(1, pending);
        }
        self.regs.timer_pin = state == LineState::Assert;
        true
    }

    pub fn state_entries(&self, entries: &mut Vec<StateEntry>) {
        self.ports.state_entries(entries, &PORT_DDR);
        entries.push(StateEntry::new("TDR", self.regs.tdr as u32, 0xFF));
        entries.push(StateEntry::new("TCR", self.regs.tcr as u32, 0xF7));
        entries.push(StateEntry::new("PS", self.regs.prescaler as u32, 0x7F));
    }

    pub fn set_state_entry(&mut self, name: &str, value: u32) -> bool {
        if self.ports.set_state_entry(name, value, &PORT_DDR) {
            return true;
        }
        match name {
            "TDR" => self.regs.tdr = value as u8,
            "TCR" => self.regs.tcr = (value & 0xF7) as u8,
            "PS" => self.regs.prescaler = (value & 0x7F) as u8,
            _ => return false,
        }
        true
    }

    pub fn snapshot(&self) -> M68705Snapshot {
        M68705Snapshot {
            ports: self.ports.state.clone(),
            registers: self.regs.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: &M68705Snapshot) {
        self.ports.state = snapshot.ports.clone();
        self.regs = snapshot.registers.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timer() -> (M68705Peripherals<'static>, u16) {
        let mut p = M68705Peripherals::new([0xFF, 0xFF, 0x0F, 0x00]);
        let mut pending = 0;
        p.reset(&mut pending);
        (p, pending)
    }

    #[test]
    fn counts_down_through_prescaler() {
        let (mut p, mut pending) = timer();
        p.write(0x0008, 0x10, &mut pending);
        // divide by 4, interrupts unmasked
        p.write(0x0009, 0x02, &mut pending);

        p.burn(7, &mut pending);
        assert_eq!(p.peek(0x0008), Some(0x0F));
        p.burn(1, &mut pending);
        assert_eq!(p.peek(0x0008), Some(0x0E));
        assert_eq!(pending, 0);

        p.burn(14 * 4, &mut pending);
        assert_eq!(p.peek(0x0008), Some(0x00));
        assert_eq!(pending & INT_TIMER, INT_TIMER);

        // no reload, the counter keeps going from 0xFF
        p.burn(4, &mut pending);
        assert_eq!(p.peek(0x0008), Some(0xFF));
    }

    #[test]
    fn masked_request_stays_latched() {
        let (mut p, mut pending) = timer();
        p.write(0x0008, 0x01, &mut pending);
        p.burn(1, &mut pending);
        assert_ne!(p.regs.tcr & TimerControl::TIR.bits(), 0);
        assert_eq!(pending, 0);

        // unmasking with TIR written as 1 keeps the request
        p.write(0x0009, 0x80, &mut pending);
        assert_eq!(pending & INT_TIMER, INT_TIMER);

        p.write(0x0009, 0x00, &mut pending);
        assert_eq!(pending, 0);
    }

    #[test]
    fn prescaler_clear_reloads_latch() {
        let (mut p, mut pending) = timer();
        p.write(0x0008, 0x40, &mut pending);
        p.burn(0x10, &mut pending);
        assert_eq!(p.peek(0x0008), Some(0x30));
        p.write(0x0009, 0x48, &mut pending);
        assert_eq!(p.peek(0x0008), Some(0x40));
        assert_eq!(p.peek(0x0009), Some(0x40));
    }

    #[test]
    fn external_clock_counts_pin_edges() {
        let (mut p, mut pending) = timer();
        p.write(0x0008, 0x05, &mut pending);
        p.write(0x0009, 0x70, &mut pending);
        p.burn(100, &mut pending);
        assert_eq!(p.peek(0x0008), Some(0x05));

        p.set_input(InputLine::Timer, LineState::Assert, &mut pending);
        p.set_input(InputLine::Timer, LineState::Assert, &mut pending);
        p.set_input(InputLine::Timer, LineState::Clear, &mut pending);
        p.set_input(InputLine::Timer, LineState::Pulse, &mut pending);
        assert_eq!(p.peek(0x0008), Some(0x03));
    }

    #[test]
    fn missing_ports_are_not_decoded() {
        let (mut p, mut pending) = timer();
        assert_eq!(p.peek(0x0003), None);
        assert!(!p.write(0x0003, 0x00, &mut pending));
        assert!(p.write(0x0006, 0xFF, &mut pending));
        assert_eq!(p.peek(0x0006), Some(0x0F));
    }
}
