use crate::*;
use serde::{Deserialize, Serialize};

pub const PORT_COUNT: usize = 4;

/// Something wired to the parallel I/O pins of an MCU
pub trait PortDevice {
    /// Returns the levels of the pins selected by `mask` (the pins currently
    /// configured as inputs), or `None` if nothing drives the port.
    fn read_port(&mut self, port: usize, mask: u8) -> Option<u8>;

    /// Called when output pins change; `ddr` selects the pins driven by the MCU
    fn write_port(&mut self, port: usize, value: u8, ddr: u8);

    /// Output compare pin of a free-running timer
    fn timer_compare(&mut self, _level: bool) {}
}

pub type PortDeviceRef<'a> = EmuRef<dyn PortDevice + 'a>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortState {
    /// Physically present pins of each port
    pub bits: [u8; PORT_COUNT],
    /// Input pins that pull the IRQ latch when low
    pub interrupt: [u8; PORT_COUNT],
    pub input: [u8; PORT_COUNT],
    pub latch: [u8; PORT_COUNT],
    pub ddr: [u8; PORT_COUNT],
}

/// Latch/DDR model shared by the on-chip parallel ports
pub struct IoPorts<'a> {
    pub(crate) state: PortState,
    device: Option<PortDeviceRef<'a>>,
}
impl<'a> IoPorts<'a> {
    pub fn new(bits: [u8; PORT_COUNT]) -> Self {
        Self {
            state: PortState {
                bits,
                interrupt: [0x00; PORT_COUNT],
                input: [0xFF; PORT_COUNT],
                latch: [0xFF; PORT_COUNT],
                ddr: [0x00; PORT_COUNT],
            },
            device: None,
        }
    }

    #[inline]
    pub fn attach(&mut self, device: PortDeviceRef<'a>) {
        self.device = Some(device);
    }

    #[inline]
    pub fn is_present(&self, port: usize) -> bool {
        self.state.bits.get(port).map_or(false, |&bits| bits != 0)
    }

    /// All ports become inputs; latches and pin levels survive
    pub fn reset(&mut self) {
        self.state.ddr = [0x00; PORT_COUNT];
    }

    /// Level seen by the CPU when reading the port
    #[inline]
    pub fn value(&self, port: usize) -> u8 {
        let s = &self.state;
        (s.latch[port] & s.ddr[port]) | (s.input[port] & !s.ddr[port])
    }

    /// Polls the attached device for new input levels, returning the pins that changed
    pub fn sample(&mut self, port: usize) -> u8 {
        let mask = !self.state.ddr[port] & self.state.bits[port];
        let polled = match &self.device {
            Some(device) => device.borrow_mut().read_port(port, mask),
            None => None,
        };
        match polled {
            Some(level) => self.set_input(port, level),
            None => 0,
        }
    }

    /// Drives the input pins directly, returning the pins that changed
    pub fn set_input(&mut self, port: usize, level: u8) -> u8 {
        let level = level & self.state.bits[port];
        let diff = level ^ self.state.input[port];
        if diff != 0 {
            tracing::trace!(
                target: "m6805::ioport",
                "PORT{} input = {:02X} (was {:02X})",
                port_name(port),
                level,
                self.state.input[port]
            );
        }
        self.state.input[port] = level;
        diff
    }

    pub fn write_latch(&mut self, port: usize, data: u8) {
        let data = data & self.state.bits[port];
        let diff = self.state.latch[port] ^ data;
        if diff != 0 {
            tracing::trace!(
                target: "m6805::ioport",
                "write PORT{} latch: {:02X} & {:02X} (was {:02X})",
                port_name(port),
                data,
                self.state.ddr[port],
                self.state.latch[port]
            );
        }
        self.state.latch[port] = data;
        if diff & self.state.ddr[port] != 0 {
            self.notify(port);
        }
    }

    /// Updates the direction register and returns the pins that changed direction.
    /// The caller decides when to [`IoPorts::notify`] the device.
    pub fn write_ddr(&mut self, port: usize, data: u8) -> u8 {
        let data = data & self.state.bits[port];
        let diff = data ^ self.state.ddr[port];
        if diff != 0 {
            tracing::trace!(
                target: "m6805::ioport",
                "write DDR{}: {:02X} (was {:02X})",
                port_name(port),
                data,
                self.state.ddr[port]
            );
            self.state.ddr[port] = data;
        }
        diff
    }

    pub fn notify(&mut self, port: usize) {
        let value = self.value(port);
        let ddr = self.state.ddr[port];
        if let Some(device) = &self.device {
            device.borrow_mut().write_port(port, value, ddr);
        }
    }

    pub fn timer_compare(&mut self, level: bool) {
        if let Some(device) = &self.device {
            device.borrow_mut().timer_compare(level);
        }
    }

    /// Debugger view of the latches and of the direction registers flagged in `ddr`
    pub(crate) fn state_entries(
        &self,
        entries: &mut Vec<super::state::StateEntry>,
        ddr: &[bool; PORT_COUNT],
    ) {
        for port in (0..PORT_COUNT).filter(|&p| self.is_present(p)) {
            entries.push(super::state::StateEntry::new(
                format!("LATCH{}", port_name(port)),
                self.state.latch[port] as u32,
                self.state.bits[port] as u32,
            ));
        }
        for port in (0..PORT_COUNT).filter(|&p| ddr[p] && self.is_present(p)) {
            entries.push(super::state::StateEntry::new(
                format!("DDR{}", port_name(port)),
                self.state.ddr[port] as u32,
                self.state.bits[port] as u32,
            ));
        }
    }

    pub(crate) fn set_state_entry(
        &mut self,
        name: &str,
        value: u32,
        ddr: &[bool; PORT_COUNT],
    ) -> bool {
        for port in (0..PORT_COUNT).filter(|&p| self.is_present(p)) {
            let bits = self.state.bits[port];
            if name == format!("LATCH{}", port_name(port)) {
                self.state.latch[port] = value as u8 & bits;
                return true;
            }
            if ddr[port] && (name == format!("DDR{}", port_name(port))) {
                self.state.ddr[port] = value as u8 & bits;
                return true;
            }
        }
        false
    }
}

#[inline]
pub fn port_name(port: usize) -> char {
    (b'A' + port as u8) as char
}
