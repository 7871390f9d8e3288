use super::hc05::{Hc05Peripherals, Hc05Snapshot};
use super::m68705::{M68705Peripherals, M68705Snapshot};
use super::ports::PortDeviceRef;
use super::state::StateEntry;
use super::variant::PeripheralKind;
use crate::cpu::{InputLine, LineState};
use serde::{Deserialize, Serialize};

/// On-chip devices that sit between the core and the external bus
pub enum Peripherals<'a> {
    None,
    M68705(M68705Peripherals<'a>),
    Hc05(Hc05Peripherals<'a>),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeripheralSnapshot {
    None,
    M68705(M68705Snapshot),
    Hc05(Hc05Snapshot),
}

impl<'a> Peripherals<'a> {
    pub fn new(kind: PeripheralKind) -> Self {
        match kind {
            PeripheralKind::None => Self::None,
            PeripheralKind::M68705 { port_bits } => {
                Self::M68705(M68705Peripherals::new(port_bits))
            }
            PeripheralKind::Hc05 { port_bits, cop } => Self::Hc05(Hc05Peripherals::new(port_bits, cop)),
        }
    }

    /// Returns `false` if the part has no ports to attach to
    pub fn attach(&mut self, device: PortDeviceRef<'a>) -> bool {
        match self {
            Self::None => return false,
            Self::M68705(p) => p.attach(device),
            Self::Hc05(p) => p.attach(device),
        }
        true
    }

    pub fn reset(&mut self, pending: &mut u16) {
        match self {
            Self::None => {}
            Self::M68705(p) => p.reset(pending),
            Self::Hc05(p) => p.reset(pending),
        }
    }

    pub fn apply_mask_options(&mut self, port_b_interrupt: u8, ncope: bool, pending: &mut u16) {
        if let Self::Hc05(p) = self {
            p.apply_mask_options(port_b_interrupt, ncope, pending);
        }
    }

    pub fn set_port_input(&mut self, port: usize, level: u8, pending: &mut u16) {
        match self {
            Self::None => {}
            Self::M68705(p) => p.set_port_input(port, level),
            Self::Hc05(p) => p.set_port_input(port, level, pending),
        }
    }

    #[inline]
    pub fn read(&mut self, address: u16, pending: &mut u16) -> Option<u8> {
        match self {
            Self::None => None,
            Self::M68705(p) => p.read(address),
            Self::Hc05(p) => p.read(address, pending),
        }
    }

    #[inline]
    pub fn peek(&self, address: u16) -> Option<u8> {
        match self {
            Self::None => None,
            Self::M68705(p) => p.peek(address),
            Self::Hc05(p) => p.peek(address),
        }
    }

    #[inline]
    pub fn write(&mut self, address: u16, data: u8, pending: &mut u16) -> bool {
        match self {
            Self::None => false,
            Self::M68705(p) => p.write(address, data, pending),
            Self::Hc05(p) => p.write(address, data, pending),
        }
    }

    /// Advances timers by `count` machine cycles, returning `true` if a watchdog fired
    #[inline]
    pub fn burn(&mut self, count: u32, pending: &mut u16) -> bool {
        match self {
            Self::None => false,
            Self::M68705(p) => {
                p.burn(count, pending);
                false
            }
            Self::Hc05(p) => p.burn(count, pending),
        }
    }

    pub fn set_input(&mut self, line: InputLine, state: LineState, pending: &mut u16) -> bool {
        match self {
            Self::None => false,
            Self::M68705(p) => p.set_input(line, state, pending),
            Self::Hc05(p) => p.set_input(line, state, pending),
        }
    }

    /// Level of /IRQ if the peripherals own that pin
    pub fn irq_line(&self) -> Option<bool> {
        match self {
            Self::Hc05(p) => Some(p.irq_line()),
            _ => None,
        }
    }

    pub fn interrupt_serviced(&mut self, bit: u16) {
        if let Self::Hc05(p) = self {
            p.interrupt_serviced(bit);
        }
    }

    pub fn state_entries(&self, entries: &mut Vec<StateEntry>) {
        match self {
            Self::None => {}
            Self::M68705(p) => p.state_entries(entries),
            Self::Hc05(p) => p.state_entries(entries),
        }
    }

    pub fn set_state_entry(&mut self, name: &str, value: u32) -> bool {
        match self {
            Self::None => false,
            Self::M68705(p) => p.set_state_entry(name, value),
            Self::Hc05(p) => p.set_state_entry(name, value),
        }
    }

    pub fn snapshot(&self) -> PeripheralSnapshot {
        match self {
            Self::None => PeripheralSnapshot::None,
            Self::M68705(p) => PeripheralSnapshot::M68705(p.snapshot()),
            Self::Hc05(p) => PeripheralSnapshot::Hc05(p.snapshot()),
        }
    }

    /// Returns `false` if the snapshot was taken from different peripherals
    pub fn restore(&mut self, snapshot: &PeripheralSnapshot) -> bool {
        match (self, snapshot) {
            (Self::None, PeripheralSnapshot::None) => {}
            (Self::M68705(p), PeripheralSnapshot::M68705(s)) => p.restore(s),
            (Self::Hc05(p), PeripheralSnapshot::Hc05(s)) => p.restore(s),
            _ => return false,
        }
        true
    }
}
