use super::ports::{IoPorts, PortDeviceRef, PortState, PORT_COUNT};
use super::state::StateEntry;
use super::variant::{INT_IRQ, INT_TIMER};
use crate::cpu::{InputLine, LineState};
use serde::{Deserialize, Serialize};

bitflags! {
    pub struct TimerControl : u8 {
        /// Input capture interrupt enable
        const ICIE = 0b10000000;
        /// Output compare interrupt enable
        const OCIE = 0b01000000;
        /// Timer overflow interrupt enable
        const TOIE = 0b00100000;
        /// Input edge (capture on rising edge when set)
        const IEDG = 0b00000010;
        /// Output level
        const OLVL = 0b00000001;
    }
}

bitflags! {
    pub struct TimerStatus : u8 {
        /// Input capture flag
        const ICF = 0b10000000;
        /// Output compare flag
        const OCF = 0b01000000;
        /// Timer overflow flag
        const TOF = 0b00100000;
    }
}

bitflags! {
    pub struct CopControl : u8 {
        /// COP reset happened
        const COPF = 0b00010000;
        /// Clock monitor enable
        const CME = 0b00001000;
        /// Programmable COP enable, can only be set
        const PCOPE = 0b00000100;
        /// Programmable COP timeout select
        const CM = 0b00000011;
    }
}

const TCR_WRITE_MASK: u8 = 0xE3;
const TIMER_INTERRUPTS: u8 = 0xE0;
const PRESCALER_SHIFT: u32 = 2;
const PRESCALER_MASK: u32 = (1 << PRESCALER_SHIFT) - 1;
const COUNTER_RESET: u16 = 0xFFFC;
const PCOP_BITS: u32 = 21;
const NCOP_BITS: u32 = 17;

const PORT_DDR: [bool; PORT_COUNT] = [true, true, true, false];

/// Register file of the HC05 timer, IRQ latch and COP watchdogs
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hc05Registers {
    pub port_irq_state: bool,
    pub irq_line_state: bool,
    pub irq_latch: bool,

    pub tcap_state: bool,
    pub tcr: u8,
    pub tsr: u8,
    /// Status bits the program has read since they were set
    pub tsr_seen: u8,
    pub prescaler: u8,
    pub counter: u16,
    pub icr: u16,
    pub ocr: u16,
    pub inhibit_cap: bool,
    pub inhibit_cmp: bool,
    /// Low byte buffers for TRL and ATRL
    pub trl_buf: [u8; 2],
    pub trl_latched: [bool; 2],

    pub pcop_cnt: u32,
    pub ncop_cnt: u32,
    pub coprst: u8,
    pub copcr: u8,
    pub ncope: bool,
}
impl Hc05Registers {
    fn power_on() -> Self {
        Self {
            port_irq_state: false,
            irq_line_state: false,
            irq_latch: false,
            tcap_state: false,
            tcr: 0x00,
            tsr: 0x00,
            tsr_seen: 0x00,
            prescaler: 0,
            counter: COUNTER_RESET,
            icr: 0x0000,
            ocr: 0x0000,
            inhibit_cap: false,
            inhibit_cmp: false,
            trl_buf: [COUNTER_RESET as u8; 2],
            trl_latched: [false; 2],
            pcop_cnt: 0,
            ncop_cnt: 0,
            coprst: 0x00,
            copcr: 0x00,
            ncope: false,
        }
    }

    #[inline]
    fn tcr(&self) -> TimerControl {
        TimerControl::from_bits_truncate(self.tcr)
    }

    #[inline]
    fn copcr(&self) -> CopControl {
        CopControl::from_bits_truncate(self.copcr)
    }

    #[inline]
    fn timer_pending(&self) -> bool {
        (self.tcr & self.tsr & TIMER_INTERRUPTS) != 0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hc05Snapshot {
    pub ports: PortState,
    pub registers: Hc05Registers,
}

pub struct Hc05Peripherals<'a> {
    ports: IoPorts<'a>,
    regs: Hc05Registers,
    /// Part has the COP watchdog registers
    cop: bool,
}
impl<'a> Hc05Peripherals<'a> {
    pub fn new(port_bits: [u8; PORT_COUNT], cop: bool) -> Self {
        Self {
            ports: IoPorts::new(port_bits),
            regs: Hc05Registers::power_on(),
            cop,
        }
    }

    #[inline]
    pub fn attach(&mut self, device: PortDeviceRef<'a>) {
        self.ports.attach(device);
    }

    pub fn reset(&mut self, pending: &mut u16) {
        self.ports.reset();
        self.regs.irq_latch = false;
        self.update_port_irq(pending);

        let r = &mut self.regs;
        r.tcr &= TimerControl::IEDG.bits();
        r.tsr_seen = 0x00;
        r.prescaler = 0;
        r.counter = COUNTER_RESET;
        r.inhibit_cap = false;
        r.inhibit_cmp = false;
        r.trl_buf = [r.counter as u8; 2];
        r.trl_latched = [false; 2];

        r.ncop_cnt = 0;
        r.copcr &= CopControl::COPF.bits();
    }

    /// Latches the mask option registers read from the part's EPROM
    pub fn apply_mask_options(&mut self, port_b_interrupt: u8, ncope: bool, pending: &mut u16) {
        let mut interrupt = [0x00; PORT_COUNT];
        interrupt[1] = port_b_interrupt;
        self.set_port_interrupt(interrupt, pending);
        self.regs.ncope = ncope;
    }

    pub fn set_port_interrupt(&mut self, interrupt: [u8; PORT_COUNT], pending: &mut u16) {
        let mut diff = 0x00;
        for port in 0..PORT_COUNT {
            let state = &mut self.ports.state;
            diff |= (state.interrupt[port] ^ interrupt[port]) & !state.ddr[port];
            state.interrupt[port] = interrupt[port];
        }
        if diff != 0 {
            self.update_port_irq(pending);
        }
    }

    pub fn set_port_input(&mut self, port: usize, level: u8, pending: &mut u16) {
        let diff = self.ports.set_input(port, level);
        let state = &self.ports.state;
        if (diff & state.interrupt[port] & !state.ddr[port]) != 0 {
            self.update_port_irq(pending);
        }
    }

    #[inline]
    pub fn irq_line(&self) -> bool {
        self.regs.irq_line_state
    }

    pub fn read(&mut self, address: u16, pending: &mut u16) -> Option<u8> {
        match address {
            0x0000..=0x0003 => Some(self.read_port(address as usize, pending)),
            0x0004..=0x0006 => Some(self.ports.state.ddr[(address & 0x03) as usize]),
            0x0012 => Some(self.regs.tcr),
            0x0013 => Some(self.read_tsr()),
            0x0014..=0x0015 => Some(self.read_icr(address & 0x01 != 0, pending)),
            0x0016..=0x0017 => Some(self.read_ocr(address & 0x01 != 0, pending)),
            0x0018..=0x001B => Some(self.read_timer(address, pending)),
            0x001E if self.cop => Some(self.read_copcr()),
            _ => None,
        }
    }

    pub fn peek(&self, address: u16) -> Option<u8> {
        let r = &self.regs;
        match address {
            0x0000..=0x0003 => Some(self.ports.value(address as usize)),
            0x0004..=0x0006 => Some(self.ports.state.ddr[(address & 0x03) as usize]),
            0x0012 => Some(r.tcr),
            0x0013 => Some(r.tsr),
            0x0014 => Some((r.icr >> 8) as u8),
            0x0015 => Some(r.icr as u8),
            0x0016 => Some((r.ocr >> 8) as u8),
            0x0017 => Some(r.ocr as u8),
            0x0018 | 0x001A => Some((r.counter >> 8) as u8),
            0x0019 | 0x001B => Some(r.trl_buf[((address >> 1) & 0x01) as usize]),
            0x001E if self.cop => Some(r.copcr),
            _ => None,
        }
    }

    /// Returns `false` if nothing on chip decodes the address
    pub fn write(&mut self, address: u16, data: u8, pending: &mut u16) -> bool {
        match address {
            0x0000..=0x0003 => self.ports.write_latch(address as usize, data),
            0x0004..=0x0006 => self.write_ddr((address & 0x03) as usize, data, pending),
            0x0012 => self.write_tcr(data, pending),
            // read-only timer registers
            0x0013..=0x0015 | 0x0018..=0x001B => {}
            0x0016..=0x0017 => self.write_ocr(address & 0x01 != 0, data, pending),
            0x001D if self.cop => self.write_coprst(data),
            0x001E if self.cop => self.write_copcr(data),
            0x1FF0 if self.cop => self.write_copr(data),
            _ => return false,
        }
        true
    }

    fn read_port(&mut self, port: usize, pending: &mut u16) -> u8 {
        let diff = self.ports.sample(port);
        let state = &self.ports.state;
        if (diff & state.interrupt[port] & !state.ddr[port]) != 0 {
            self.update_port_irq(pending);
        }
        self.ports.value(port)
    }

    fn write_ddr(&mut self, port: usize, data: u8, pending: &mut u16) {
        let diff = self.ports.write_ddr(port, data);
        if diff != 0 {
            if (diff & self.ports.state.interrupt[port]) != 0 {
                self.ports.sample(port);
                self.update_port_irq(pending);
            }
            self.ports.notify(port);
        }
    }

    fn update_port_irq(&mut self, pending: &mut u16) {
        let s = &self.ports.state;
        let state = (0..PORT_COUNT).fold(0x00, |acc, i| acc | (s.interrupt[i] & !s.ddr[i] & !s.input[i]));
        let state = state != 0;

        if state != self.regs.port_irq_state {
            tracing::debug!(
                target: "m6805::int",
                "I/O port IRQ state now {}{}",
                state as u8,
                if !self.regs.irq_line_state && state && !self.regs.irq_latch {
                    ", set IRQ latch"
                } else {
                    ""
                }
            );
            self.regs.port_irq_state = state;
            if !self.regs.irq_line_state && state {
                self.regs.irq_latch = true;
                *pending |= INT_IRQ;
            }
        }
    }

    fn update_timer_pending(&self, pending: &mut u16) {
        if self.regs.timer_pending() {
            *pending |= INT_TIMER;
        } else {
            *pending &= !INT_TIMER;
        }
    }

    fn write_tcr(&mut self, data: u8, pending: &mut u16) {
        let data = data & TCR_WRITE_MASK;
        let tcr = TimerControl::from_bits_truncate(data);
        tracing::debug!(
            target: "m6805::timer",
            "write TCR: ICIE={} OCIE={} TOIE={} IEDG={} OLVL={}",
            tcr.contains(TimerControl::ICIE) as u8,
            tcr.contains(TimerControl::OCIE) as u8,
            tcr.contains(TimerControl::TOIE) as u8,
            tcr.contains(TimerControl::IEDG) as u8,
            tcr.contains(TimerControl::OLVL) as u8
        );
        self.regs.tcr = data;
        self.update_timer_pending(pending);
    }

    fn read_tsr(&mut self) -> u8 {
        let events = TimerStatus::from_bits_truncate(self.regs.tsr & !self.regs.tsr_seen);
        if !events.is_empty() {
            tracing::debug!(target: "m6805::timer", "read TSR: seen {:?}", events);
        }
        self.regs.tsr_seen = self.regs.tsr;
        self.regs.tsr
    }

    /// Clears a status flag if the program saw it set
    fn acknowledge(&mut self, flag: TimerStatus, pending: &mut u16) -> bool {
        if (self.regs.tsr_seen & flag.bits()) != 0 {
            self.regs.tsr &= !flag.bits();
            self.regs.tsr_seen &= !flag.bits();
            if !self.regs.timer_pending() {
                *pending &= !INT_TIMER;
            }
            true
        } else {
            false
        }
    }

    // Reading ICRH inhibits capture until ICRL is read
    fn read_icr(&mut self, low: bool, pending: &mut u16) -> u8 {
        if low {
            if self.acknowledge(TimerStatus::ICF, pending) {
                tracing::debug!(target: "m6805::timer", "read ICRL, clear ICF");
            }
            if self.regs.inhibit_cap {
                tracing::debug!(target: "m6805::timer", "read ICRL, enable capture");
            }
            self.regs.inhibit_cap = false;
            self.regs.icr as u8
        } else {
            if !self.regs.inhibit_cap {
                tracing::debug!(target: "m6805::timer", "read ICRH, inhibit capture");
            }
            self.regs.inhibit_cap = true;
            (self.regs.icr >> 8) as u8
        }
    }

    fn read_ocr(&mut self, low: bool, pending: &mut u16) -> u8 {
        if low {
            if self.acknowledge(TimerStatus::OCF, pending) {
                tracing::debug!(target: "m6805::timer", "read OCRL, clear OCF");
            }
            self.regs.ocr as u8
        } else {
            (self.regs.ocr >> 8) as u8
        }
    }

    // Writing OCRH inhibits compare until OCRL is written
    fn write_ocr(&mut self, low: bool, data: u8, pending: &mut u16) {
        if low {
            if self.acknowledge(TimerStatus::OCF, pending) {
                tracing::debug!(target: "m6805::timer", "write OCRL, clear OCF");
            }
            if self.regs.inhibit_cmp {
                tracing::debug!(target: "m6805::timer", "write OCRL, enable compare");
            }
            self.regs.inhibit_cmp = false;
            self.regs.ocr = (self.regs.ocr & 0xFF00) | (data as u16);
        } else {
            if !self.regs.inhibit_cmp {
                tracing::debug!(target: "m6805::timer", "write OCRH, inhibit compare");
            }
            self.regs.inhibit_cmp = true;
            self.regs.ocr = (self.regs.ocr & 0x00FF) | ((data as u16) << 8);
        }
    }

    /// TRH/ATRH return the counter MSB and latch the LSB buffer, TRL/ATRL complete the sequence
    fn read_timer(&mut self, address: u16, pending: &mut u16) -> u8 {
        let low = (address & 0x01) != 0;
        let alt = ((address >> 1) & 0x01) as usize;
        let name = if alt != 0 { "ATR" } else { "TR" };
        if low {
            if self.regs.trl_latched[alt] {
                tracing::trace!(target: "m6805::timer", "read {}L, read sequence complete", name);
            }
            self.regs.trl_latched[alt] = false;
            // ATRL leaves TOF alone
            if (alt == 0) && self.acknowledge(TimerStatus::TOF, pending) {
                tracing::debug!(target: "m6805::timer", "read TRL, clear TOF");
            }
            self.regs.trl_buf[alt]
        } else {
            if !self.regs.trl_latched[alt] {
                tracing::trace!(target: "m6805::timer", "read {}H, latch {}L", name, name);
                self.regs.trl_latched[alt] = true;
                self.regs.trl_buf[alt] = self.regs.counter as u8;
            }
            (self.regs.counter >> 8) as u8
        }
    }

    fn write_coprst(&mut self, data: u8) {
        let clears = (data == 0xAA) && (self.regs.coprst == 0x55);
        tracing::debug!(
            target: "m6805::cop",
            "write COPRST={:02X}{}",
            data,
            if clears { ", reset" } else { "" }
        );
        match data {
            0x55 => self.regs.coprst = data,
            0xAA => {
                if clears {
                    self.regs.pcop_cnt &= 0x0000_7FFF;
                }
                self.regs.coprst = data;
            }
            _ => {}
        }
    }

    fn read_copcr(&mut self) -> u8 {
        if self.regs.copcr().contains(CopControl::COPF) {
            tracing::debug!(target: "m6805::cop", "read COPCR, clear COPF");
        }
        let result = self.regs.copcr;
        self.regs.copcr &= !CopControl::COPF.bits();
        result
    }

    fn write_copcr(&mut self, data: u8) {
        let pcope = self.regs.copcr().contains(CopControl::PCOPE);
        tracing::debug!(
            target: "m6805::cop",
            "write COPCR: CME={} PCOPE={} [{}] CM={}",
            (data >> 3) & 0x01,
            (data >> 2) & 0x01,
            if !pcope && (data & CopControl::PCOPE.bits()) != 0 {
                "set"
            } else {
                "ignored"
            },
            data & CopControl::CM.bits()
        );
        // PCOPE is kept by the mask and can only be set by the data
        self.regs.copcr = (self.regs.copcr & 0xF4) | (data & 0x0F);
    }

    fn write_copr(&mut self, data: u8) {
        tracing::debug!(target: "m6805::cop", "write COPR: COPC={}", data & 0x01);
        if (data & 0x01) == 0 {
            self.regs.ncop_cnt = 0;
        }
    }

    /// Returns `true` if an input line was consumed by the peripherals
    pub fn set_input(&mut self, line: InputLine, state: LineState, pending: &mut u16) -> bool {
        match line {
            InputLine::Irq => {
                if state.is_asserted() && !self.regs.irq_line_state {
                    tracing::debug!(
                        target: "m6805::int",
                        "/IRQ edge{}",
                        if self.regs.port_irq_state || self.regs.irq_latch {
                            ""
                        } else {
                            ", set IRQ latch"
                        }
                    );
                    if !self.regs.port_irq_state {
                        self.regs.irq_latch = true;
                        *pending |= INT_IRQ;
                    }
                }
                self.regs.irq_line_state = state == LineState::Assert;
                true
            }
            InputLine::TimerCapture => {
                match state {
                    LineState::Pulse => {
                        self.set_capture_pin(true, pending);
                        self.set_capture_pin(false, pending);
                    }
                    _ => self.set_capture_pin(state == LineState::Assert, pending),
                }
                true
            }
            _ => false,
        }
    }

    fn set_capture_pin(&mut self, level: bool, pending: &mut u16) {
        let edge = self.regs.tcr().contains(TimerControl::IEDG);
        if (level != self.regs.tcap_state) && (level == edge) {
            tracing::debug!(
                target: "m6805::timer",
                "input capture {:04X}{}",
                self.regs.counter,
                if self.regs.inhibit_cap { " [inhibited]" } else { "" }
            );
            if !self.regs.inhibit_cap {
                self.regs.tsr |= TimerStatus::ICF.bits();
                self.regs.icr = self.regs.counter;
                if self.regs.timer_pending() {
                    *pending |= INT_TIMER;
                }
            }
        }
        self.regs.tcap_state = level;
    }

    /// The IRQ latch is released when the CPU takes the external interrupt
    pub fn interrupt_serviced(&mut self, bit: u16) {
        if bit == INT_IRQ {
            tracing::debug!(target: "m6805::int", "servicing external interrupt");
            self.regs.irq_latch = false;
        } else if bit == INT_TIMER {
            tracing::debug!(target: "m6805::int", "servicing timer interrupt");
        }
    }

    /// Advances the timer and watchdogs, returning `true` if a watchdog demands a reset
    pub fn burn(&mut self, count: u32, pending: &mut u16) -> bool {
        let r = &mut self.regs;

        let increments = (count + (r.prescaler as u32 & PRESCALER_MASK)) >> PRESCALER_SHIFT;
        let new_counter = r.counter as u32 + increments;
        let rollover = new_counter >= 0x1_0000;
        let compare_match = (r.ocr > r.counter) && ((r.ocr as u32) <= new_counter);
        r.prescaler = ((count + r.prescaler as u32) & PRESCALER_MASK) as u8;
        r.counter = new_counter as u16;

        if rollover {
            tracing::trace!(target: "m6805::timer", "timer rollover");
            r.tsr |= TimerStatus::TOF.bits();
        }
        if compare_match {
            tracing::trace!(
                target: "m6805::timer",
                "output compare match{}",
                if r.inhibit_cmp { " [inhibited]" } else { "" }
            );
            if !r.inhibit_cmp {
                r.tsr |= TimerStatus::OCF.bits();
                let level = r.tcr().contains(TimerControl::OLVL);
                self.ports.timer_compare(level);
            }
        }
        self.update_timer_pending_set(pending);

        let mut reset = false;
        let r = &mut self.regs;

        let copcr = r.copcr();
        let pcop_timeout = 1u32 << ((((copcr & CopControl::CM).bits() as u32) << 1) + 15);
        if copcr.contains(CopControl::PCOPE)
            && (pcop_timeout <= (r.pcop_cnt & (pcop_timeout - 1)) + count)
        {
            tracing::info!(target: "m6805::cop", "PCOP reset");
            r.copcr |= CopControl::COPF.bits();
            reset = true;
        }
        r.pcop_cnt = (r.pcop_cnt + count) & ((1 << PCOP_BITS) - 1);

        if r.ncope {
            r.ncop_cnt += count;
            if r.ncop_cnt >= (1 << NCOP_BITS) {
                tracing::info!(target: "m6805::cop", "NCOP reset");
                reset = true;
            }
            r.ncop_cnt &= (1 << NCOP_BITS) - 1;
        }

        reset
    }

    // Only raises the request
    fn update_timer_pending_set(&self, pending: &mut u16) {
        if self.regs.timer_pending() {
            *pending |= INT_TIMER;
        }
    }

    pub fn state_entries(&self, entries: &mut Vec<StateEntry>) {
        self.ports.state_entries(entries, &PORT_DDR);

        let r = &self.regs;
        entries.push(StateEntry::new("TCR", r.tcr as u32, 0x7F));
        entries.push(StateEntry::new("TSR", r.tsr as u32, 0xFF));
        entries.push(StateEntry::new("ICR", r.icr as u32, 0xFFFF));
        entries.push(StateEntry::new("OCR", r.ocr as u32, 0xFFFF));
        entries.push(StateEntry::new("PS", r.prescaler as u32, PRESCALER_MASK));
        entries.push(StateEntry::new("TR", r.counter as u32, 0xFFFF));
        if self.cop {
            entries.push(StateEntry::new("COPRST", r.coprst as u32, 0xFF));
            entries.push(StateEntry::new("COPCR", r.copcr as u32, 0x1F));
            entries.push(StateEntry::new("PCOP", r.pcop_cnt, (1 << PCOP_BITS) - 1));
            entries.push(StateEntry::new("NCOPE", r.ncope as u32, 0x01));
            entries.push(StateEntry::new("NCOP", r.ncop_cnt, (1 << NCOP_BITS) - 1));
        }
        entries.push(StateEntry::new("IRQLATCH", r.irq_latch as u32, 0x01));
    }

    pub fn set_state_entry(&mut self, name: &str, value: u32) -> bool {
        if self.ports.set_state_entry(name, value, &PORT_DDR) {
            return true;
        }

        let r = &mut self.regs;
        match name {
            "TCR" => r.tcr = (value & 0x7F) as u8,
            "TSR" => r.tsr = value as u8,
            "ICR" => r.icr = value as u16,
            "OCR" => r.ocr = value as u16,
            "PS" => r.prescaler = (value & PRESCALER_MASK) as u8,
            "TR" => r.counter = value as u16,
            "COPRST" if self.cop => r.coprst = value as u8,
            "COPCR" if self.cop => r.copcr = (value & 0x1F) as u8,
            "PCOP" if self.cop => r.pcop_cnt = value & ((1 << PCOP_BITS) - 1),
            "NCOPE" if self.cop => r.ncope = (value & 0x01) != 0,
            "NCOP" if self.cop => r.ncop_cnt = value & ((1 << NCOP_BITS) - 1),
            "IRQLATCH" => r.irq_latch = (value & 0x01) != 0,
            _ => return false,
        }
        true
    }

    pub fn snapshot(&self) -> Hc05Snapshot {
        Hc05Snapshot {
            ports: self.ports.state.clone(),
            registers: self.regs.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: &Hc05Snapshot) {
        self.ports.state = snapshot.ports.clone();
        self.regs = snapshot.registers.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peripherals(cop: bool) -> (Hc05Peripherals<'static>, u16) {
        let mut p = Hc05Peripherals::new([0xFF, 0xFF, 0xFF, 0xBF], cop);
        let mut pending = 0;
        p.reset(&mut pending);
        (p, pending)
    }

    #[test]
    fn counter_starts_just_before_rollover() {
        let (mut p, mut pending) = peripherals(false);
        assert_eq!(p.peek(0x0018), Some(0xFF));
        assert_eq!(p.peek(0x0019), Some(0xFC));

        // four cycles per count, four counts to overflow
        p.burn(16, &mut pending);
        assert_eq!(p.regs.counter, 0x0000);
        assert_ne!(p.regs.tsr & TimerStatus::TOF.bits(), 0);
        assert_eq!(pending & INT_TIMER, 0);
    }

    #[test]
    fn overflow_interrupt_needs_toie_and_clears_through_trl() {
        let (mut p, mut pending) = peripherals(false);
        p.write(0x0012, TimerControl::TOIE.bits(), &mut pending);
        p.burn(16, &mut pending);
        assert_ne!(pending & INT_TIMER, 0);

        // TRL without a prior TSR read leaves TOF set
        p.read(0x0019, &mut pending);
        assert_ne!(pending & INT_TIMER, 0);

        p.read(0x0013, &mut pending);
        p.read(0x0019, &mut pending);
        assert_eq!(pending & INT_TIMER, 0);
        assert_eq!(p.regs.tsr & TimerStatus::TOF.bits(), 0);
    }

    #[test]
    fn trh_read_freezes_trl_until_read() {
        let (mut p, mut pending) = peripherals(false);
        assert_eq!(p.read(0x0018, &mut pending), Some(0xFF));
        p.burn(8, &mut pending);
        assert_eq!(p.read(0x0019, &mut pending), Some(0xFC));
        assert_eq!(p.read(0x0019, &mut pending), Some(0xFC));
        assert_eq!(p.read(0x0018, &mut pending), Some(0xFF));
        assert_eq!(p.read(0x0019, &mut pending), Some(0xFE));
    }

    #[test]
    fn output_compare_sets_ocf_unless_inhibited() {
        let (mut p, mut pending) = peripherals(false);
        p.write(0x0017, 0xFF, &mut pending);
        p.write(0x0016, 0xFF, &mut pending);
        p.burn(12, &mut pending);
        assert_eq!(p.regs.counter, 0xFFFF);
        assert_eq!(p.regs.tsr & TimerStatus::OCF.bits(), 0);

        p.write(0x0017, 0xFF, &mut pending);
        p.burn(4, &mut pending);
        p.burn(4 * 0xFFFF, &mut pending);
        assert_eq!(p.regs.counter, 0xFFFF);
        assert_ne!(p.regs.tsr & TimerStatus::OCF.bits(), 0);
    }

    #[test]
    fn irq_edge_sets_latch_once() {
        let (mut p, mut pending) = peripherals(false);
        p.set_input(InputLine::Irq, LineState::Assert, &mut pending);
        assert!(p.regs.irq_latch);
        assert_eq!(pending & INT_IRQ, INT_IRQ);

        pending = 0;
        p.set_input(InputLine::Irq, LineState::Assert, &mut pending);
        assert_eq!(pending, 0);
        assert!(p.irq_line());

        p.set_input(InputLine::Irq, LineState::Clear, &mut pending);
        assert!(!p.irq_line());
    }

    #[test]
    fn port_interrupt_pins_pull_the_latch() {
        let (mut p, mut pending) = peripherals(true);
        p.apply_mask_options(0x01, false, &mut pending);
        assert_eq!(pending, 0);

        p.set_port_input(1, 0xFE, &mut pending);
        assert_eq!(pending & INT_IRQ, INT_IRQ);
        assert!(p.regs.port_irq_state);
    }

    #[test]
    fn capture_follows_selected_edge() {
        let (mut p, mut pending) = peripherals(false);
        p.write(0x0012, (TimerControl::ICIE | TimerControl::IEDG).bits(), &mut pending);
        p.burn(40, &mut pending);
        p.set_input(InputLine::TimerCapture, LineState::Assert, &mut pending);
        assert_eq!(p.regs.icr, 0x0006);
        assert_ne!(pending & INT_TIMER, 0);

        // ICRH inhibits further captures until ICRL is read
        p.read(0x0014, &mut pending);
        p.set_input(InputLine::TimerCapture, LineState::Clear, &mut pending);
        p.burn(40, &mut pending);
        p.set_input(InputLine::TimerCapture, LineState::Assert, &mut pending);
        assert_eq!(p.regs.icr, 0x0006);
    }

    #[test]
    fn coprst_sequence_clears_high_pcop_bits() {
        let (mut p, mut pending) = peripherals(true);
        p.regs.pcop_cnt = 0x1_2345;
        p.write(0x001D, 0xAA, &mut pending);
        assert_eq!(p.regs.pcop_cnt, 0x1_2345);
        p.write(0x001D, 0x55, &mut pending);
        p.write(0x001D, 0xAA, &mut pending);
        assert_eq!(p.regs.pcop_cnt, 0x2345);
    }

    #[test]
    fn pcope_is_set_only() {
        let (mut p, mut pending) = peripherals(true);
        p.write(0x001E, 0x05, &mut pending);
        assert_eq!(p.regs.copcr, 0x05);
        p.write(0x001E, 0x00, &mut pending);
        assert_eq!(p.regs.copcr, 0x04);
    }

    #[test]
    fn pcop_timeout_requests_reset_and_flags_copf() {
        let (mut p, mut pending) = peripherals(true);
        p.write(0x001E, CopControl::PCOPE.bits(), &mut pending);
        assert!(!p.burn((1 << 15) - 1, &mut pending));
        assert!(p.burn(1, &mut pending));
        assert_eq!(p.read(0x001E, &mut pending), Some(0x14));
        assert_eq!(p.regs.copcr, 0x04);
    }

    #[test]
    fn cop_registers_absent_without_watchdog() {
        let (mut p, mut pending) = peripherals(false);
        assert!(!p.write(0x001E, 0x04, &mut pending));
        assert_eq!(p.read(0x001E, &mut pending), None);
        assert!(!p.burn(1 << 18, &mut pending));
    }
}
