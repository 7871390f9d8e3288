use super::tables::InstructionSet;
use crate::cpu::InputLine;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, IntoStaticStr};

/// Pending-interrupt bits shared by most parts
pub const INT_IRQ: u16 = 1 << 0;
pub const INT_TIMER: u16 = 1 << 1;
pub const INT_CPI: u16 = 1 << 2;

pub mod hd63705 {
    pub const INT_IRQ1: u16 = 1 << 0;
    pub const INT_IRQ2: u16 = 1 << 1;
    pub const INT_TIMER1: u16 = 1 << 2;
    pub const INT_TIMER2: u16 = 1 << 3;
    pub const INT_TIMER3: u16 = 1 << 4;
    pub const INT_PCI: u16 = 1 << 5;
    pub const INT_SCI: u16 = 1 << 6;
    pub const INT_ADCONV: u16 = 1 << 7;
    pub const INT_NMI: u16 = 1 << 8;
}

#[derive(
    PartialEq, Eq, Clone, Copy, Debug, Display, EnumString, IntoStaticStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    M6805,
    M146805E2,
    M68705P3,
    M68HC05EG,
    HD63705,
    M68HC05C4,
    M68HC05C8,
    M68HC705C8A,
}

/// One entry of a part's interrupt priority list
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InterruptSource {
    pub name: &'static str,
    pub bit: u16,
    pub vector: u16,
    pub maskable: bool,
    /// Input pin that latches this source on a rising edge
    pub line: Option<InputLine>,
    /// Edge-latched sources are cleared when serviced, level sources by their peripheral
    pub latched: bool,
}
impl InterruptSource {
    const fn edge(name: &'static str, bit: u16, vector: u16, line: InputLine) -> Self {
        Self {
            name,
            bit,
            vector,
            maskable: true,
            line: Some(line),
            latched: true,
        }
    }

    const fn level(name: &'static str, bit: u16, vector: u16) -> Self {
        Self {
            name,
            bit,
            vector,
            maskable: true,
            line: None,
            latched: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegionKind {
    Ram,
    Rom,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryRegion {
    pub start: u16,
    pub end: u16,
    pub kind: RegionKind,
}
impl MemoryRegion {
    const fn ram(start: u16, end: u16) -> Self {
        Self {
            start,
            end,
            kind: RegionKind::Ram,
        }
    }

    const fn rom(start: u16, end: u16) -> Self {
        Self {
            start,
            end,
            kind: RegionKind::Rom,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    #[inline]
    pub fn contains(&self, address: u16) -> bool {
        (address >= self.start) && (address <= self.end)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PeripheralKind {
    /// Everything is external to the core
    None,
    /// Parallel ports and the 8 bit prescaled down-counter of the MC68705/MC146805
    M68705 { port_bits: [u8; 4] },
    /// Parallel ports, 16 bit free-running timer and optional COP watchdogs of the MC68HC05
    Hc05 { port_bits: [u8; 4], cop: bool },
}

#[derive(Clone, Copy, Debug)]
pub struct Configuration {
    pub instruction_set: InstructionSet,
    pub address_width: u32,
    pub sp_mask: u16,
    pub sp_floor: u16,
    pub reset_vector: u16,
    pub swi_vector: u16,
    /// Priority order, highest first
    pub interrupts: &'static [InterruptSource],
    pub interrupt_cycles: u32,
    /// Input clocks per machine cycle
    pub clock_divider: u64,
    /// Pin tested by BIL/BIH
    pub il_line: InputLine,
    pub peripherals: PeripheralKind,
    /// Mask option registers latched on reset (port B interrupt enables, NCOP enable)
    pub mask_options: Option<u16>,
    pub memory_map: &'static [MemoryRegion],
    pub symbols: &'static [(u16, &'static str)],
}
impl Configuration {
    #[inline]
    pub const fn address_mask(&self) -> u16 {
        ((1u32 << self.address_width) - 1) as u16
    }
}

const M6805_INTERRUPTS: [InterruptSource; 1] =
    [InterruptSource::edge("IRQ", INT_IRQ, 0xFFFA, InputLine::Irq)];

const M146805E2_INTERRUPTS: [InterruptSource; 2] = [
    InterruptSource::edge("IRQ", INT_IRQ, 0x1FFA, InputLine::Irq),
    InterruptSource::level("TIMER", INT_TIMER, 0x1FF8),
];

const M68705_INTERRUPTS: [InterruptSource; 2] = [
    InterruptSource::edge("IRQ", INT_IRQ, 0x07FA, InputLine::Irq),
    InterruptSource::level("TIMER", INT_TIMER, 0x07F8),
];

const M68HC05EG_INTERRUPTS: [InterruptSource; 3] = [
    InterruptSource::edge("IRQ", INT_IRQ, 0x1FFA, InputLine::Irq),
    InterruptSource::edge("TIMER", INT_TIMER, 0x1FF8, InputLine::Timer),
    InterruptSource::edge("CPI", INT_CPI, 0x1FF6, InputLine::Cpi),
];

const HD63705_INTERRUPTS: [InterruptSource; 9] = [
    InterruptSource {
        name: "NMI",
        bit: hd63705::INT_NMI,
        vector: 0x1FFC,
        maskable: false,
        line: Some(InputLine::Nmi),
        latched: true,
    },
    InterruptSource::edge("IRQ1", hd63705::INT_IRQ1, 0x1FF8, InputLine::Irq),
    InterruptSource::edge("IRQ2", hd63705::INT_IRQ2, 0x1FEC, InputLine::Irq2),
    InterruptSource::edge("ADCONV", hd63705::INT_ADCONV, 0x1FEA, InputLine::AdConv),
    InterruptSource::edge("TIMER1", hd63705::INT_TIMER1, 0x1FF6, InputLine::Timer),
    InterruptSource::edge("TIMER2", hd63705::INT_TIMER2, 0x1FF4, InputLine::Timer2),
    InterruptSource::edge("TIMER3", hd63705::INT_TIMER3, 0x1FF2, InputLine::Timer3),
    InterruptSource::edge("PCI", hd63705::INT_PCI, 0x1FF0, InputLine::Pci),
    InterruptSource::edge("SCI", hd63705::INT_SCI, 0x1FEE, InputLine::Sci),
];

// The /IRQ pin of the HC05 is routed through the IRQ latch, not latched directly
const M68HC05_INTERRUPTS: [InterruptSource; 2] = [
    InterruptSource {
        name: "IRQ",
        bit: INT_IRQ,
        vector: 0xFFFA,
        maskable: true,
        line: None,
        latched: true,
    },
    InterruptSource::level("TIMER", INT_TIMER, 0xFFF8),
];

const FLAT_4K: [MemoryRegion; 1] = [MemoryRegion::ram(0x0000, 0x0FFF)];
const FLAT_8K: [MemoryRegion; 1] = [MemoryRegion::ram(0x0000, 0x1FFF)];
const FLAT_64K: [MemoryRegion; 1] = [MemoryRegion::ram(0x0000, 0xFFFF)];

const M68705P3_MAP: [MemoryRegion; 2] = [
    MemoryRegion::ram(0x0010, 0x007F),
    MemoryRegion::rom(0x0080, 0x07FF),
];

const M146805E2_MAP: [MemoryRegion; 2] = [
    MemoryRegion::ram(0x0010, 0x007F),
    MemoryRegion::ram(0x0080, 0x1FFF),
];

const M68HC05C4_MAP: [MemoryRegion; 5] = [
    MemoryRegion::rom(0x0020, 0x004F),
    MemoryRegion::ram(0x0050, 0x00FF),
    MemoryRegion::rom(0x0100, 0x10FF),
    MemoryRegion::rom(0x1F00, 0x1FEF),
    MemoryRegion::rom(0x1FF4, 0x1FFF),
];

const M68HC05C8_MAP: [MemoryRegion; 5] = [
    MemoryRegion::rom(0x0020, 0x004F),
    MemoryRegion::ram(0x0050, 0x00FF),
    MemoryRegion::rom(0x0100, 0x1EFF),
    MemoryRegion::rom(0x1F00, 0x1FEF),
    MemoryRegion::rom(0x1FF4, 0x1FFF),
];

const M68HC705C8A_MAP: [MemoryRegion; 5] = [
    MemoryRegion::rom(0x0020, 0x004F),
    MemoryRegion::ram(0x0050, 0x00FF),
    MemoryRegion::rom(0x0100, 0x1EFF),
    MemoryRegion::rom(0x1F00, 0x1FEF),
    MemoryRegion::rom(0x1FF0, 0x1FFF),
];

pub const M68HC05C4_SYMBOLS: [(u16, &str); 25] = [
    (0x0000, "PORTA"),
    (0x0001, "PORTB"),
    (0x0002, "PORTC"),
    (0x0003, "PORTD"),
    (0x0004, "DDRA"),
    (0x0005, "DDRB"),
    (0x0006, "DDRC"),
    (0x000A, "SPCR"),
    (0x000B, "SPSR"),
    (0x000C, "SPDR"),
    (0x000D, "BAUD"),
    (0x000E, "SCCR1"),
    (0x000F, "SCCR2"),
    (0x0010, "SCSR"),
    (0x0011, "SCDR"),
    (0x0012, "TCR"),
    (0x0013, "TSR"),
    (0x0014, "ICRH"),
    (0x0015, "ICRL"),
    (0x0016, "OCRH"),
    (0x0017, "OCRL"),
    (0x0018, "TRH"),
    (0x0019, "TRL"),
    (0x001A, "ATRH"),
    (0x001B, "ATRL"),
];

pub const M68HC705C8A_SYMBOLS: [(u16, &str); 28] = [
    (0x0000, "PORTA"),
    (0x0001, "PORTB"),
    (0x0002, "PORTC"),
    (0x0003, "PORTD"),
    (0x0004, "DDRA"),
    (0x0005, "DDRB"),
    (0x0006, "DDRC"),
    (0x000A, "SPCR"),
    (0x000B, "SPSR"),
    (0x000C, "SPDR"),
    (0x000D, "BAUD"),
    (0x000E, "SCCR1"),
    (0x000F, "SCCR2"),
    (0x0010, "SCSR"),
    (0x0011, "SCDR"),
    (0x0012, "TCR"),
    (0x0013, "TSR"),
    (0x0014, "ICRH"),
    (0x0015, "ICRL"),
    (0x0016, "OCRH"),
    (0x0017, "OCRL"),
    (0x0018, "TRH"),
    (0x0019, "TRL"),
    (0x001A, "ATRH"),
    (0x001B, "ATRL"),
    (0x001C, "PROG"),
    (0x001D, "COPRST"),
    (0x001E, "COPCR"),
];

const HC05_PORT_BITS: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xBF];

impl Variant {
    pub const ALL: [Variant; 8] = [
        Variant::M6805,
        Variant::M146805E2,
        Variant::M68705P3,
        Variant::M68HC05EG,
        Variant::HD63705,
        Variant::M68HC05C4,
        Variant::M68HC05C8,
        Variant::M68HC705C8A,
    ];

    pub fn configuration(self) -> Configuration {
        match self {
            Variant::M6805 => Configuration {
                instruction_set: InstructionSet::Hmos,
                address_width: 12,
                sp_mask: 0x007F,
                sp_floor: 0x0060,
                reset_vector: 0xFFFE,
                swi_vector: 0xFFFC,
                interrupts: &M6805_INTERRUPTS,
                interrupt_cycles: 11,
                clock_divider: 4,
                il_line: InputLine::Irq,
                peripherals: PeripheralKind::None,
                mask_options: None,
                memory_map: &FLAT_4K,
                symbols: &[],
            },
            Variant::M146805E2 => Configuration {
                instruction_set: InstructionSet::Cmos,
                address_width: 13,
                sp_mask: 0x007F,
                sp_floor: 0x0060,
                reset_vector: 0x1FFE,
                swi_vector: 0x1FFC,
                interrupts: &M146805E2_INTERRUPTS,
                interrupt_cycles: 11,
                clock_divider: 4,
                il_line: InputLine::Irq,
                peripherals: PeripheralKind::M68705 {
                    port_bits: [0xFF, 0xFF, 0x00, 0x00],
                },
                mask_options: None,
                memory_map: &M146805E2_MAP,
                symbols: &[],
            },
            Variant::M68705P3 => Configuration {
                instruction_set: InstructionSet::Hmos,
                address_width: 11,
                sp_mask: 0x007F,
                sp_floor: 0x0060,
                reset_vector: 0x07FE,
                swi_vector: 0x07FC,
                interrupts: &M68705_INTERRUPTS,
                interrupt_cycles: 11,
                clock_divider: 4,
                il_line: InputLine::Irq,
                peripherals: PeripheralKind::M68705 {
                    port_bits: [0xFF, 0xFF, 0x0F, 0x00],
                },
                mask_options: None,
                memory_map: &M68705P3_MAP,
                symbols: &[],
            },
            Variant::M68HC05EG => Configuration {
                instruction_set: InstructionSet::Hmos,
                address_width: 13,
                sp_mask: 0x00FF,
                sp_floor: 0x00C0,
                reset_vector: 0x1FFE,
                swi_vector: 0xFFFC,
                interrupts: &M68HC05EG_INTERRUPTS,
                interrupt_cycles: 11,
                clock_divider: 4,
                il_line: InputLine::Irq,
                peripherals: PeripheralKind::None,
                mask_options: None,
                memory_map: &FLAT_8K,
                symbols: &[],
            },
            Variant::HD63705 => Configuration {
                instruction_set: InstructionSet::Hmos,
                address_width: 16,
                sp_mask: 0x017F,
                sp_floor: 0x0100,
                reset_vector: 0x1FFE,
                swi_vector: 0x1FFA,
                interrupts: &HD63705_INTERRUPTS,
                interrupt_cycles: 11,
                clock_divider: 4,
                il_line: InputLine::Nmi,
                peripherals: PeripheralKind::None,
                mask_options: None,
                memory_map: &FLAT_64K,
                symbols: &[],
            },
            Variant::M68HC05C4 | Variant::M68HC05C8 | Variant::M68HC705C8A => {
                let cop = self == Variant::M68HC705C8A;
                Configuration {
                    instruction_set: InstructionSet::Hc,
                    address_width: 13,
                    sp_mask: 0x00FF,
                    sp_floor: 0x00C0,
                    reset_vector: 0xFFFE,
                    swi_vector: 0xFFFC,
                    interrupts: &M68HC05_INTERRUPTS,
                    interrupt_cycles: 10,
                    clock_divider: 2,
                    il_line: InputLine::Irq,
                    peripherals: PeripheralKind::Hc05 {
                        port_bits: HC05_PORT_BITS,
                        cop,
                    },
                    mask_options: if cop { Some(0x1FF0) } else { None },
                    memory_map: match self {
                        Variant::M68HC05C4 => &M68HC05C4_MAP,
                        Variant::M68HC05C8 => &M68HC05C8_MAP,
                        _ => &M68HC705C8A_MAP,
                    },
                    symbols: if cop {
                        &M68HC705C8A_SYMBOLS
                    } else {
                        &M68HC05C4_SYMBOLS
                    },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn variant_names_round_trip() {
        for variant in Variant::ALL.iter() {
            assert_eq!(Variant::from_str(&variant.to_string()).unwrap(), *variant);
        }
        assert_eq!(Variant::from_str("m68hc705c8a").unwrap(), Variant::M68HC705C8A);
    }

    #[test]
    fn stack_windows_fit_the_address_space() {
        for variant in Variant::ALL.iter() {
            let config = variant.configuration();
            assert!(config.sp_floor <= config.sp_mask, "{}", variant);
            assert_eq!(config.sp_mask & !config.address_mask(), 0, "{}", variant);
        }
    }

    #[test]
    fn memory_maps_stay_inside_the_address_space() {
        for variant in Variant::ALL.iter() {
            let config = variant.configuration();
            for region in config.memory_map {
                assert!(region.start <= region.end);
                assert_eq!(region.end & !config.address_mask(), 0, "{}", variant);
            }
        }
    }

    #[test]
    fn nmi_outranks_everything_on_hd63705() {
        let config = Variant::HD63705.configuration();
        assert_eq!(config.interrupts[0].name, "NMI");
        assert!(!config.interrupts[0].maskable);
        assert!(config.interrupts[1..].iter().all(|s| s.maskable));
    }
}
