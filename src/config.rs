use crate::cpu::m6805::Variant;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything needed to build and run one machine
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    pub variant: Variant,
    /// Input clock in Hz
    pub clock: u64,
    pub image: Option<PathBuf>,
    /// Where raw binaries are placed; S-records carry their own addresses
    pub load_address: Option<u32>,
    /// Machine cycles to run
    pub cycles: u64,
    /// Log every executed instruction
    pub trace: bool,
    /// Initial pin levels, one entry per port starting at port A
    pub port_inputs: Vec<u8>,
}
impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            variant: Variant::M68HC05C4,
            clock: 4_000_000,
            image: None,
            load_address: None,
            cycles: 100_000,
            trace: false,
            port_inputs: Vec::new(),
        }
    }
}
impl MachineConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Load address for raw binaries: the configured one, else the start of the largest memory region
    pub fn default_load_address(&self) -> u32 {
        match self.load_address {
            Some(address) => address,
            None => self
                .variant
                .configuration()
                .memory_map
                .iter()
                .max_by_key(|region| region.len())
                .map_or(0, |region| region.start as u32),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = MachineConfig::from_json_str(r#"{ "variant": "m68705p3", "trace": true }"#)
            .unwrap();
        assert_eq!(config.variant, Variant::M68705P3);
        assert!(config.trace);
        assert_eq!(config.clock, 4_000_000);
        assert_eq!(config.cycles, 100_000);
        assert!(config.image.is_none());
    }

    #[test]
    fn unknown_variant_is_rejected() {
        assert!(MachineConfig::from_json_str(r#"{ "variant": "z80" }"#).is_err());
    }

    #[test]
    fn default_load_address_follows_memory_map() {
        let mut config = MachineConfig::default();
        assert_eq!(config.default_load_address(), 0x0100);
        config.variant = Variant::M68705P3;
        assert_eq!(config.default_load_address(), 0x0080);
        config.load_address = Some(0x0200);
        assert_eq!(config.default_load_address(), 0x0200);
    }
}
