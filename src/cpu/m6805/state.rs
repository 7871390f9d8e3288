use super::peripherals::PeripheralSnapshot;
use super::variant::Variant;
use super::HaltState;
use serde::{Deserialize, Serialize};

/// One register as shown to a debugger
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateEntry {
    pub name: String,
    pub value: u32,
    pub mask: u32,
}
impl StateEntry {
    #[inline]
    pub fn new<S: Into<String>>(name: S, value: u32, mask: u32) -> Self {
        Self {
            name: name.into(),
            value: value & mask,
            mask,
        }
    }
}

/// Everything needed to resume a core exactly where it stopped.
///
/// Memory outside the core is not included; the owning system saves its own regions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct M6805Snapshot {
    pub variant: Variant,
    pub a: u8,
    pub x: u8,
    pub s: u16,
    pub pc: u16,
    pub cc: u8,
    pub pending_interrupts: u16,
    pub line_states: u16,
    pub halt: HaltState,
    pub reset_held: bool,
    pub reset_pulses: u64,
    pub peripherals: PeripheralSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_are_masked_on_creation() {
        let entry = StateEntry::new("PS", 0x17, 0x03);
        assert_eq!(entry.value, 0x03);
        assert_eq!(entry.name, "PS");
    }
}
