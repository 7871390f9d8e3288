use crate::cpu::CpuInstruction;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString, IntoStaticStr};

#[derive(PartialEq, Eq, Clone, Copy, Debug, Display, AsRefStr, IntoStaticStr)]
pub enum AddressingMode {
    /// Inherent
    INH = 0,
    /// Inherent, operates on the accumulator
    INA = 1,
    /// Inherent, operates on the index register
    INX = 2,
    /// Immediate
    IMM = 3,
    /// Direct (page zero)
    DIR = 4,
    /// Extended
    EXT = 5,
    /// Indexed, no offset
    IX = 6,
    /// Indexed, 8 bit offset
    IX1 = 7,
    /// Indexed, 16 bit offset
    IX2 = 8,
    /// Relative
    REL = 9,
    /// Direct bit test + relative branch
    BTB = 10,
    /// Direct bit set/clear
    BSC = 11,
}
impl AddressingMode {
    /// Instruction length in bytes including the opcode
    pub const fn length(self) -> usize {
        match self {
            Self::INH | Self::INA | Self::INX | Self::IX => 1,
            Self::IMM | Self::DIR | Self::IX1 | Self::REL | Self::BSC => 2,
            Self::EXT | Self::IX2 | Self::BTB => 3,
        }
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug, Display, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum BaseInstruction {
    // Bit test and branch
    BRSET0 = 0,
    BRSET1 = 1,
    BRSET2 = 2,
    BRSET3 = 3,
    BRSET4 = 4,
    BRSET5 = 5,
    BRSET6 = 6,
    BRSET7 = 7,
    BRCLR0 = 8,
    BRCLR1 = 9,
    BRCLR2 = 10,
    BRCLR3 = 11,
    BRCLR4 = 12,
    BRCLR5 = 13,
    BRCLR6 = 14,
    BRCLR7 = 15,
    // Bit manipulation
    BSET0 = 16,
    BSET1 = 17,
    BSET2 = 18,
    BSET3 = 19,
    BSET4 = 20,
    BSET5 = 21,
    BSET6 = 22,
    BSET7 = 23,
    BCLR0 = 24,
    BCLR1 = 25,
    BCLR2 = 26,
    BCLR3 = 27,
    BCLR4 = 28,
    BCLR5 = 29,
    BCLR6 = 30,
    BCLR7 = 31,
    // Relative branches
    BRA = 32,
    BRN = 33,
    BHI = 34,
    BLS = 35,
    BCC = 36,
    BCS = 37,
    BNE = 38,
    BEQ = 39,
    BHCC = 40,
    BHCS = 41,
    BPL = 42,
    BMI = 43,
    BMC = 44,
    BMS = 45,
    BIL = 46,
    BIH = 47,
    // Read-modify-write
    NEG = 48,
    COM = 49,
    LSR = 50,
    ROR = 51,
    ASR = 52,
    LSL = 53,
    ROL = 54,
    DEC = 55,
    INC = 56,
    TST = 57,
    CLR = 58,
    // Control and register transfer
    RTI = 59,
    RTS = 60,
    SWI = 61,
    STOP = 62,
    WAIT = 63,
    MUL = 64,
    TAX = 65,
    CLC = 66,
    SEC = 67,
    CLI = 68,
    SEI = 69,
    RSP = 70,
    NOP = 71,
    TXA = 72,
    // Register/memory
    SUB = 73,
    CMP = 74,
    SBC = 75,
    CPX = 76,
    AND = 77,
    BIT = 78,
    LDA = 79,
    STA = 80,
    EOR = 81,
    ADC = 82,
    ORA = 83,
    ADD = 84,
    JMP = 85,
    JSR = 86,
    LDX = 87,
    STX = 88,
    BSR = 89,
    // Reserved opcode
    #[strum(serialize = "illegal")]
    ILL = 90,
}

pub(crate) const BASE_INSTRUCTION_COUNT: usize = BaseInstruction::ILL as usize + 1;

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Instruction(pub BaseInstruction, pub AddressingMode);
impl Instruction {
    #[inline]
    pub const fn base(&self) -> BaseInstruction {
        self.0
    }

    #[inline]
    pub const fn mode(&self) -> AddressingMode {
        self.1
    }

    #[inline]
    pub const fn is_illegal(&self) -> bool {
        matches!(self.0, BaseInstruction::ILL)
    }
}
impl CpuInstruction for Instruction {}

pub type OpcodeTable = [Instruction; 256];
pub type CycleTable = [u8; 256];

/// Opcode/cycle table family of a part
#[derive(
    PartialEq, Eq, Clone, Copy, Debug, Display, EnumString, IntoStaticStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InstructionSet {
    /// First generation NMOS/HMOS parts
    Hmos,
    /// CMOS parts, adds STOP and WAIT
    Cmos,
    /// HC05 parts, adds MUL
    Hc,
}
impl InstructionSet {
    #[inline]
    pub fn ops(self) -> &'static OpcodeTable {
        match self {
            Self::Hmos => &HMOS_OPS,
            Self::Cmos => &CMOS_OPS,
            Self::Hc => &HC_OPS,
        }
    }

    #[inline]
    pub fn cycles(self) -> &'static CycleTable {
        match self {
            Self::Hmos => &HMOS_CYCLES,
            Self::Cmos => &CMOS_CYCLES,
            Self::Hc => &HC_CYCLES,
        }
    }

    /// Shortest instruction, ignoring the zero cost of reserved opcodes
    pub fn min_cycles(self) -> u32 {
        self.cycles()
            .iter()
            .copied()
            .filter(|&c| c != 0)
            .min()
            .unwrap_or(0) as u32
    }

    pub fn max_cycles(self) -> u32 {
        self.cycles().iter().copied().max().unwrap_or(0) as u32
    }
}

const fn patch_ops(mut table: OpcodeTable, patches: &[(u8, Instruction)]) -> OpcodeTable {
    let mut i = 0;
    while i < patches.len() {
        let (op_code, instruction) = patches[i];
        table[op_code as usize] = instruction;
        i += 1;
    }
    table
}

const fn patch_cycles(mut table: CycleTable, patches: &[(u8, u8)]) -> CycleTable {
    let mut i = 0;
    while i < patches.len() {
        let (op_code, cycles) = patches[i];
        table[op_code as usize] = cycles;
        i += 1;
    }
    table
}

const CMOS_PATCHES: [(u8, Instruction); 2] = [
    (0x8E, Instruction(BaseInstruction::STOP, AddressingMode::INH)),
    (0x8F, Instruction(BaseInstruction::WAIT, AddressingMode::INH)),
];

const HC_PATCHES: [(u8, Instruction); 1] =
    [(0x42, Instruction(BaseInstruction::MUL, AddressingMode::INH))];

const BASE_OPS: OpcodeTable = [
    Instruction(BaseInstruction::BRSET0, AddressingMode::BTB), // 0x00
    Instruction(BaseInstruction::BRCLR0, AddressingMode::BTB), // 0x01
    Instruction(BaseInstruction::BRSET1, AddressingMode::BTB), // 0x02
    Instruction(BaseInstruction::BRCLR1, AddressingMode::BTB), // 0x03
    Instruction(BaseInstruction::BRSET2, AddressingMode::BTB), // 0x04
    Instruction(BaseInstruction::BRCLR2, AddressingMode::BTB), // 0x05
    Instruction(BaseInstruction::BRSET3, AddressingMode::BTB), // 0x06
    Instruction(BaseInstruction::BRCLR3, AddressingMode::BTB), // 0x07
    Instruction(BaseInstruction::BRSET4, AddressingMode::BTB), // 0x08
    Instruction(BaseInstruction::BRCLR4, AddressingMode::BTB), // 0x09
    Instruction(BaseInstruction::BRSET5, AddressingMode::BTB), // 0x0A
    Instruction(BaseInstruction::BRCLR5, AddressingMode::BTB), // 0x0B
    Instruction(BaseInstruction::BRSET6, AddressingMode::BTB), // 0x0C
    Instruction(BaseInstruction::BRCLR6, AddressingMode::BTB), // 0x0D
    Instruction(BaseInstruction::BRSET7, AddressingMode::BTB), // 0x0E
    Instruction(BaseInstruction::BRCLR7, AddressingMode::BTB), // 0x0F
    Instruction(BaseInstruction::BSET0, AddressingMode::BSC), // 0x10
    Instruction(BaseInstruction::BCLR0, AddressingMode::BSC), // 0x11
    Instruction(BaseInstruction::BSET1, AddressingMode::BSC), // 0x12
    Instruction(BaseInstruction::BCLR1, AddressingMode::BSC), // 0x13
    Instruction(BaseInstruction::BSET2, AddressingMode::BSC), // 0x14
    Instruction(BaseInstruction::BCLR2, AddressingMode::BSC), // 0x15
    Instruction(BaseInstruction::BSET3, AddressingMode::BSC), // 0x16
    Instruction(BaseInstruction::BCLR3, AddressingMode::BSC), // 0x17
    Instruction(BaseInstruction::BSET4, AddressingMode::BSC), // 0x18
    Instruction(BaseInstruction::BCLR4, AddressingMode::BSC), // 0x19
    Instruction(BaseInstruction::BSET5, AddressingMode::BSC), // 0x1A
    Instruction(BaseInstruction::BCLR5, AddressingMode::BSC), // 0x1B
    Instruction(BaseInstruction::BSET6, AddressingMode::BSC), // 0x1C
    Instruction(BaseInstruction::BCLR6, AddressingMode::BSC), // 0x1D
    Instruction(BaseInstruction::BSET7, AddressingMode::BSC), // 0x1E
    Instruction(BaseInstruction::BCLR7, AddressingMode::BSC), // 0x1F
    Instruction(BaseInstruction::BRA, AddressingMode::REL), // 0x20
    Instruction(BaseInstruction::BRN, AddressingMode::REL), // 0x21
    Instruction(BaseInstruction::BHI, AddressingMode::REL), // 0x22
    Instruction(BaseInstruction::BLS, AddressingMode::REL), // 0x23
    Instruction(BaseInstruction::BCC, AddressingMode::REL), // 0x24
    Instruction(BaseInstruction::BCS, AddressingMode::REL), // 0x25
    Instruction(BaseInstruction::BNE, AddressingMode::REL), // 0x26
    Instruction(BaseInstruction::BEQ, AddressingMode::REL), // 0x27
    Instruction(BaseInstruction::BHCC, AddressingMode::REL), // 0x28
    Instruction(BaseInstruction::BHCS, AddressingMode::REL), // 0x29
    Instruction(BaseInstruction::BPL, AddressingMode::REL), // 0x2A
    Instruction(BaseInstruction::BMI, AddressingMode::REL), // 0x2B
    Instruction(BaseInstruction::BMC, AddressingMode::REL), // 0x2C
    Instruction(BaseInstruction::BMS, AddressingMode::REL), // 0x2D
    Instruction(BaseInstruction::BIL, AddressingMode::REL), // 0x2E
    Instruction(BaseInstruction::BIH, AddressingMode::REL), // 0x2F
    Instruction(BaseInstruction::NEG, AddressingMode::DIR), // 0x30
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x31
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x32
    Instruction(BaseInstruction::COM, AddressingMode::DIR), // 0x33
    Instruction(BaseInstruction::LSR, AddressingMode::DIR), // 0x34
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x35
    Instruction(BaseInstruction::ROR, AddressingMode::DIR), // 0x36
    Instruction(BaseInstruction::ASR, AddressingMode::DIR), // 0x37
    Instruction(BaseInstruction::LSL, AddressingMode::DIR), // 0x38
    Instruction(BaseInstruction::ROL, AddressingMode::DIR), // 0x39
    Instruction(BaseInstruction::DEC, AddressingMode::DIR), // 0x3A
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x3B
    Instruction(BaseInstruction::INC, AddressingMode::DIR), // 0x3C
    Instruction(BaseInstruction::TST, AddressingMode::DIR), // 0x3D
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x3E
    Instruction(BaseInstruction::CLR, AddressingMode::DIR), // 0x3F
    Instruction(BaseInstruction::NEG, AddressingMode::INA), // 0x40
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x41
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x42
    Instruction(BaseInstruction::COM, AddressingMode::INA), // 0x43
    Instruction(BaseInstruction::LSR, AddressingMode::INA), // 0x44
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x45
    Instruction(BaseInstruction::ROR, AddressingMode::INA), // 0x46
    Instruction(BaseInstruction::ASR, AddressingMode::INA), // 0x47
    Instruction(BaseInstruction::LSL, AddressingMode::INA), // 0x48
    Instruction(BaseInstruction::ROL, AddressingMode::INA), // 0x49
    Instruction(BaseInstruction::DEC, AddressingMode::INA), // 0x4A
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x4B
    Instruction(BaseInstruction::INC, AddressingMode::INA), // 0x4C
    Instruction(BaseInstruction::TST, AddressingMode::INA), // 0x4D
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x4E
    Instruction(BaseInstruction::CLR, AddressingMode::INA), // 0x4F
    Instruction(BaseInstruction::NEG, AddressingMode::INX), // 0x50
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x51
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x52
    Instruction(BaseInstruction::COM, AddressingMode::INX), // 0x53
    Instruction(BaseInstruction::LSR, AddressingMode::INX), // 0x54
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x55
    Instruction(BaseInstruction::ROR, AddressingMode::INX), // 0x56
    Instruction(BaseInstruction::ASR, AddressingMode::INX), // 0x57
    Instruction(BaseInstruction::LSL, AddressingMode::INX), // 0x58
    Instruction(BaseInstruction::ROL, AddressingMode::INX), // 0x59
    Instruction(BaseInstruction::DEC, AddressingMode::INX), // 0x5A
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x5B
    Instruction(BaseInstruction::INC, AddressingMode::INX), // 0x5C
    Instruction(BaseInstruction::TST, AddressingMode::INX), // 0x5D
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x5E
    Instruction(BaseInstruction::CLR, AddressingMode::INX), // 0x5F
    Instruction(BaseInstruction::NEG, AddressingMode::IX1), // 0x60
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x61
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x62
    Instruction(BaseInstruction::COM, AddressingMode::IX1), // 0x63
    Instruction(BaseInstruction::LSR, AddressingMode::IX1), // 0x64
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x65
    Instruction(BaseInstruction::ROR, AddressingMode::IX1), // 0x66
    Instruction(BaseInstruction::ASR, AddressingMode::IX1), // 0x67
    Instruction(BaseInstruction::LSL, AddressingMode::IX1), // 0x68
    Instruction(BaseInstruction::ROL, AddressingMode::IX1), // 0x69
    Instruction(BaseInstruction::DEC, AddressingMode::IX1), // 0x6A
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x6B
    Instruction(BaseInstruction::INC, AddressingMode::IX1), // 0x6C
    Instruction(BaseInstruction::TST, AddressingMode::IX1), // 0x6D
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x6E
    Instruction(BaseInstruction::CLR, AddressingMode::IX1), // 0x6F
    Instruction(BaseInstruction::NEG, AddressingMode::IX), // 0x70
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x71
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x72
    Instruction(BaseInstruction::COM, AddressingMode::IX), // 0x73
    Instruction(BaseInstruction::LSR, AddressingMode::IX), // 0x74
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x75
    Instruction(BaseInstruction::ROR, AddressingMode::IX), // 0x76
    Instruction(BaseInstruction::ASR, AddressingMode::IX), // 0x77
    Instruction(BaseInstruction::LSL, AddressingMode::IX), // 0x78
    Instruction(BaseInstruction::ROL, AddressingMode::IX), // 0x79
    Instruction(BaseInstruction::DEC, AddressingMode::IX), // 0x7A
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x7B
    Instruction(BaseInstruction::INC, AddressingMode::IX), // 0x7C
    Instruction(BaseInstruction::TST, AddressingMode::IX), // 0x7D
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x7E
    Instruction(BaseInstruction::CLR, AddressingMode::IX), // 0x7F
    Instruction(BaseInstruction::RTI, AddressingMode::INH), // 0x80
    Instruction(BaseInstruction::RTS, AddressingMode::INH), // 0x81
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x82
    Instruction(BaseInstruction::SWI, AddressingMode::INH), // 0x83
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x84
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x85
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x86
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x87
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x88
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x89
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x8A
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x8B
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x8C
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x8D
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x8E
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x8F
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x90
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x91
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x92
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x93
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x94
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x95
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x96
    Instruction(BaseInstruction::TAX, AddressingMode::INH), // 0x97
    Instruction(BaseInstruction::CLC, AddressingMode::INH), // 0x98
    Instruction(BaseInstruction::SEC, AddressingMode::INH), // 0x99
    Instruction(BaseInstruction::CLI, AddressingMode::INH), // 0x9A
    Instruction(BaseInstruction::SEI, AddressingMode::INH), // 0x9B
    Instruction(BaseInstruction::RSP, AddressingMode::INH), // 0x9C
    Instruction(BaseInstruction::NOP, AddressingMode::INH), // 0x9D
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0x9E
    Instruction(BaseInstruction::TXA, AddressingMode::INH), // 0x9F
    Instruction(BaseInstruction::SUB, AddressingMode::IMM), // 0xA0
    Instruction(BaseInstruction::CMP, AddressingMode::IMM), // 0xA1
    Instruction(BaseInstruction::SBC, AddressingMode::IMM), // 0xA2
    Instruction(BaseInstruction::CPX, AddressingMode::IMM), // 0xA3
    Instruction(BaseInstruction::AND, AddressingMode::IMM), // 0xA4
    Instruction(BaseInstruction::BIT, AddressingMode::IMM), // 0xA5
    Instruction(BaseInstruction::LDA, AddressingMode::IMM), // 0xA6
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0xA7
    Instruction(BaseInstruction::EOR, AddressingMode::IMM), // 0xA8
    Instruction(BaseInstruction::ADC, AddressingMode::IMM), // 0xA9
    Instruction(BaseInstruction::ORA, AddressingMode::IMM), // 0xAA
    Instruction(BaseInstruction::ADD, AddressingMode::IMM), // 0xAB
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0xAC
    Instruction(BaseInstruction::BSR, AddressingMode::REL), // 0xAD
    Instruction(BaseInstruction::LDX, AddressingMode::IMM), // 0xAE
    Instruction(BaseInstruction::ILL, AddressingMode::INH), // 0xAF
    Instruction(BaseInstruction::SUB, AddressingMode::DIR), // 0xB0
    Instruction(BaseInstruction::CMP, AddressingMode::DIR), // 0xB1
    Instruction(BaseInstruction::SBC, AddressingMode::DIR), // 0xB2
    Instruction(BaseInstruction::CPX, AddressingMode::DIR), // 0xB3
    Instruction(BaseInstruction::AND, AddressingMode::DIR), // 0xB4
    Instruction(BaseInstruction::BIT, AddressingMode::DIR), // 0xB5
    Instruction(BaseInstruction::LDA, AddressingMode::DIR), // 0xB6
    Instruction(BaseInstruction::STA, AddressingMode::DIR), // 0xB7
    Instruction(BaseInstruction::EOR, AddressingMode::DIR), // 0xB8
    Instruction(BaseInstruction::ADC, AddressingMode::DIR), // 0xB9
    Instruction(BaseInstruction::ORA, AddressingMode::DIR), // 0xBA
    Instruction(BaseInstruction::ADD, AddressingMode::DIR), // 0xBB
    Instruction(BaseInstruction::JMP, AddressingMode::DIR), // 0xBC
    Instruction(BaseInstruction::JSR, AddressingMode::DIR), // 0xBD
    Instruction(BaseInstruction::LDX, AddressingMode::DIR), // 0xBE
    Instruction(BaseInstruction::STX, AddressingMode::DIR), // 0xBF
    Instruction(BaseInstruction::SUB, AddressingMode::EXT), // 0xC0
    Instruction(BaseInstruction::CMP, AddressingMode::EXT), // 0xC1
    Instruction(BaseInstruction::SBC, AddressingMode::EXT), // 0xC2
    Instruction(BaseInstruction::CPX, AddressingMode::EXT), // 0xC3
    Instruction(BaseInstruction::AND, AddressingMode::EXT), // 0xC4
    Instruction(BaseInstruction::BIT, AddressingMode::EXT), // 0xC5
    Instruction(BaseInstruction::LDA, AddressingMode::EXT), // 0xC6
    Instruction(BaseInstruction::STA, AddressingMode::EXT), // 0xC7
    Instruction(BaseInstruction::EOR, AddressingMode::EXT), // 0xC8
    Instruction(BaseInstruction::ADC, AddressingMode::EXT), // 0xC9
    Instruction(BaseInstruction::ORA, AddressingMode::EXT), // 0xCA
    Instruction(BaseInstruction::ADD, AddressingMode::EXT), // 0xCB
    Instruction(BaseInstruction::JMP, AddressingMode::EXT), // 0xCC
    Instruction(BaseInstruction::JSR, AddressingMode::EXT), // 0xCD
    Instruction(BaseInstruction::LDX, AddressingMode::EXT), // 0xCE
    Instruction(BaseInstruction::STX, AddressingMode::EXT), // 0xCF
    Instruction(BaseInstruction::SUB, AddressingMode::IX2), // 0xD0
    Instruction(BaseInstruction::CMP, AddressingMode::IX2), // 0xD1
    Instruction(BaseInstruction::SBC, AddressingMode::IX2), // 0xD2
    Instruction(BaseInstruction::CPX, AddressingMode::IX2), // 0xD3
    Instruction(BaseInstruction::AND, AddressingMode::IX2), // 0xD4
    Instruction(BaseInstruction::BIT, AddressingMode::IX2), // 0xD5
    Instruction(BaseInstruction::LDA, AddressingMode::IX2), // 0xD6
    Instruction(BaseInstruction::STA, AddressingMode::IX2), // 0xD7
    Instruction(BaseInstruction::EOR, AddressingMode::IX2), // 0xD8
    Instruction(BaseInstruction::ADC, AddressingMode::IX2), // 0xD9
    Instruction(BaseInstruction::ORA, AddressingMode::IX2), // 0xDA
    Instruction(BaseInstruction::ADD, AddressingMode::IX2), // 0xDB
    Instruction(BaseInstruction::JMP, AddressingMode::IX2), // 0xDC
    Instruction(BaseInstruction::JSR, AddressingMode::IX2), // 0xDD
    Instruction(BaseInstruction::LDX, AddressingMode::IX2), // 0xDE
    Instruction(BaseInstruction::STX, AddressingMode::IX2), // 0xDF
    Instruction(BaseInstruction::SUB, AddressingMode::IX1), // 0xE0
    Instruction(BaseInstruction::CMP, AddressingMode::IX1), // 0xE1
    Instruction(BaseInstruction::SBC, AddressingMode::IX1), // 0xE2
    Instruction(BaseInstruction::CPX, AddressingMode::IX1), // 0xE3
    Instruction(BaseInstruction::AND, AddressingMode::IX1), // 0xE4
    Instruction(BaseInstruction::BIT, AddressingMode::IX1), // 0xE5
    Instruction(BaseInstruction::LDA, AddressingMode::IX1), // 0xE6
    Instruction(BaseInstruction::STA, AddressingMode::IX1), // 0xE7
    Instruction(BaseInstruction::EOR, AddressingMode::IX1), // 0xE8
    Instruction(BaseInstruction::ADC, AddressingMode::IX1), // 0xE9
    Instruction(BaseInstruction::ORA, AddressingMode::IX1), // 0xEA
    Instruction(BaseInstruction::ADD, AddressingMode::IX1), // 0xEB
    Instruction(BaseInstruction::JMP, AddressingMode::IX1), // 0xEC
    Instruction(BaseInstruction::JSR, AddressingMode::IX1), // 0xED
    Instruction(BaseInstruction::LDX, AddressingMode::IX1), // 0xEE
    Instruction(BaseInstruction::STX, AddressingMode::IX1), // 0xEF
    Instruction(BaseInstruction::SUB, AddressingMode::IX), // 0xF0
    Instruction(BaseInstruction::CMP, AddressingMode::IX), // 0xF1
    Instruction(BaseInstruction::SBC, AddressingMode::IX), // 0xF2
    Instruction(BaseInstruction::CPX, AddressingMode::IX), // 0xF3
    Instruction(BaseInstruction::AND, AddressingMode::IX), // 0xF4
    Instruction(BaseInstruction::BIT, AddressingMode::IX), // 0xF5
    Instruction(BaseInstruction::LDA, AddressingMode::IX), // 0xF6
    Instruction(BaseInstruction::STA, AddressingMode::IX), // 0xF7
    Instruction(BaseInstruction::EOR, AddressingMode::IX), // 0xF8
    Instruction(BaseInstruction::ADC, AddressingMode::IX), // 0xF9
    Instruction(BaseInstruction::ORA, AddressingMode::IX), // 0xFA
    Instruction(BaseInstruction::ADD, AddressingMode::IX), // 0xFB
    Instruction(BaseInstruction::JMP, AddressingMode::IX), // 0xFC
    Instruction(BaseInstruction::JSR, AddressingMode::IX), // 0xFD
    Instruction(BaseInstruction::LDX, AddressingMode::IX), // 0xFE
    Instruction(BaseInstruction::STX, AddressingMode::IX), // 0xFF
];

pub static HMOS_OPS: OpcodeTable = BASE_OPS;
pub static CMOS_OPS: OpcodeTable = patch_ops(BASE_OPS, &CMOS_PATCHES);
pub static HC_OPS: OpcodeTable = patch_ops(patch_ops(BASE_OPS, &CMOS_PATCHES), &HC_PATCHES);

#[rustfmt::skip]
pub static HMOS_CYCLES: CycleTable = [
    /* 0   1   2   3   4   5   6   7   8   9   A   B   C   D   E   F */
    10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, // 0
     7,  7,  7,  7,  7,  7,  7,  7,  7,  7,  7,  7,  7,  7,  7,  7, // 1
     4,  4,  4,  4,  4,  4,  4,  4,  4,  4,  4,  4,  4,  4,  4,  4, // 2
     6,  0,  0,  6,  6,  0,  6,  6,  6,  6,  6,  0,  6,  6,  0,  6, // 3
     4,  0,  0,  4,  4,  0,  4,  4,  4,  4,  4,  0,  4,  4,  0,  4, // 4
     4,  0,  0,  4,  4,  0,  4,  4,  4,  4,  4,  0,  4,  4,  0,  4, // 5
     7,  0,  0,  7,  7,  0,  7,  7,  7,  7,  7,  0,  7,  7,  0,  7, // 6
     6,  0,  0,  6,  6,  0,  6,  6,  6,  6,  6,  0,  6,  6,  0,  6, // 7
     9,  6,  0, 11,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0, // 8
     0,  0,  0,  0,  0,  0,  0,  2,  2,  2,  2,  2,  2,  2,  0,  2, // 9
     2,  2,  2,  2,  2,  2,  2,  0,  2,  2,  2,  2,  0,  8,  2,  0, // A
     4,  4,  4,  4,  4,  4,  4,  5,  4,  4,  4,  4,  3,  7,  4,  5, // B
     5,  5,  5,  5,  5,  5,  5,  6,  5,  5,  5,  5,  4,  8,  5,  6, // C
     6,  6,  6,  6,  6,  6,  6,  7,  6,  6,  6,  6,  5,  9,  6,  7, // D
     5,  5,  5,  5,  5,  5,  5,  6,  5,  5,  5,  5,  4,  8,  5,  6, // E
     4,  4,  4,  4,  4,  4,  4,  5,  4,  4,  4,  4,  3,  7,  4,  5, // F
];

#[rustfmt::skip]
const CMOS_CYCLE_TABLE: CycleTable = [
    /* 0   1   2   3   4   5   6   7   8   9   A   B   C   D   E   F */
     5,  5,  5,  5,  5,  5,  5,  5,  5,  5,  5,  5,  5,  5,  5,  5, // 0
     5,  5,  5,  5,  5,  5,  5,  5,  5,  5,  5,  5,  5,  5,  5,  5, // 1
     3,  3,  3,  3,  3,  3,  3,  3,  3,  3,  3,  3,  3,  3,  3,  3, // 2
     5,  0,  0,  5,  5,  0,  5,  5,  5,  5,  5,  0,  5,  4,  0,  5, // 3
     3,  0,  0,  3,  3,  0,  3,  3,  3,  3,  3,  0,  3,  3,  0,  3, // 4
     3,  0,  0,  3,  3,  0,  3,  3,  3,  3,  3,  0,  3,  3,  0,  3, // 5
     6,  0,  0,  6,  6,  0,  6,  6,  6,  6,  6,  0,  6,  5,  0,  6, // 6
     5,  0,  0,  5,  5,  0,  5,  5,  5,  5,  5,  0,  5,  4,  0,  5, // 7
     9,  6,  0, 10,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  2,  2, // 8
     0,  0,  0,  0,  0,  0,  0,  2,  2,  2,  2,  2,  2,  2,  0,  2, // 9
     2,  2,  2,  2,  2,  2,  2,  0,  2,  2,  2,  2,  0,  6,  2,  0, // A
     3,  3,  3,  3,  3,  3,  3,  4,  3,  3,  3,  3,  2,  5,  3,  4, // B
     4,  4,  4,  4,  4,  4,  4,  5,  4,  4,  4,  4,  3,  6,  4,  5, // C
     5,  5,  5,  5,  5,  5,  5,  6,  5,  5,  5,  5,  4,  7,  5,  6, // D
     4,  4,  4,  4,  4,  4,  4,  5,  4,  4,  4,  4,  3,  6,  4,  5, // E
     3,  3,  3,  3,  3,  3,  3,  4,  3,  3,  3,  3,  2,  5,  3,  4, // F
];

pub static CMOS_CYCLES: CycleTable = CMOS_CYCLE_TABLE;
pub static HC_CYCLES: CycleTable = patch_cycles(CMOS_CYCLE_TABLE, &[(0x42, 11)]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_opcodes_cost_nothing() {
        for set in [InstructionSet::Hmos, InstructionSet::Cmos, InstructionSet::Hc] {
            for (op_code, instruction) in set.ops().iter().enumerate() {
                assert_eq!(
                    instruction.is_illegal(),
                    set.cycles()[op_code] == 0,
                    "{} opcode {:02X}",
                    set,
                    op_code
                );
            }
        }
    }

    #[test]
    fn variant_tables_differ_only_in_patches() {
        for op_code in 0..256 {
            match op_code {
                0x8E | 0x8F => {
                    assert!(HMOS_OPS[op_code].is_illegal());
                    assert!(!CMOS_OPS[op_code].is_illegal());
                }
                0x42 => {
                    assert!(CMOS_OPS[op_code].is_illegal());
                    assert_eq!(HC_OPS[op_code].base(), BaseInstruction::MUL);
                    assert_eq!(HC_CYCLES[op_code], 11);
                }
                _ => {
                    assert_eq!(HMOS_OPS[op_code], CMOS_OPS[op_code]);
                    assert_eq!(CMOS_OPS[op_code], HC_OPS[op_code]);
                }
            }
        }
        assert_eq!(CMOS_OPS[0x8E].base(), BaseInstruction::STOP);
        assert_eq!(CMOS_OPS[0x8F].base(), BaseInstruction::WAIT);
    }

    #[test]
    fn min_and_max_cycles_skip_placeholders() {
        assert_eq!(InstructionSet::Hmos.min_cycles(), 2);
        assert_eq!(InstructionSet::Hmos.max_cycles(), 11);
        assert_eq!(InstructionSet::Hc.min_cycles(), 2);
        assert_eq!(InstructionSet::Hc.max_cycles(), 11);
    }

    #[test]
    fn mnemonics_render_lowercase() {
        assert_eq!(BaseInstruction::BRSET3.to_string(), "brset3");
        assert_eq!(BaseInstruction::BHCS.to_string(), "bhcs");
        assert_eq!(BaseInstruction::ILL.to_string(), "illegal");
    }
}
