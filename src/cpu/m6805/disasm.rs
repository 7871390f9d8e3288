use super::tables::{AddressingMode, BaseInstruction, InstructionSet};
use crate::error::{EmuError, Result};
use crate::types::make_word;

bitflags! {
    /// Hints for a debugger's step commands
    pub struct DisasmFlags : u8 {
        /// Control returns to the next instruction (subroutine calls, SWI)
        const STEP_OVER = 0b00000001;
        /// Returns from a subroutine or interrupt handler
        const STEP_OUT = 0b00000010;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Disassembly {
    pub text: String,
    /// Bytes consumed, opcode included
    pub length: usize,
    pub flags: DisasmFlags,
}

/// Stateless, table driven disassembler for one instruction set
#[derive(Clone, Copy, Debug)]
pub struct Disassembler {
    set: InstructionSet,
    symbols: &'static [(u16, &'static str)],
}
impl Disassembler {
    pub const fn new(set: InstructionSet) -> Self {
        Self { set, symbols: &[] }
    }

    /// Names to print in place of direct and extended addresses
    pub const fn with_symbols(mut self, symbols: &'static [(u16, &'static str)]) -> Self {
        self.symbols = symbols;
        self
    }

    fn symbol(&self, address: u16) -> Option<&'static str> {
        self.symbols
            .iter()
            .find(|(a, _)| *a == address)
            .map(|(_, name)| *name)
    }

    fn direct(&self, address: u8) -> String {
        match self.symbol(address as u16) {
            Some(name) => name.to_string(),
            None => format!("${:02x}", address),
        }
    }

    fn extended(&self, address: u16) -> String {
        match self.symbol(address) {
            Some(name) => name.to_string(),
            None => format!("${:04x}", address),
        }
    }

    /// Length of the instruction starting with `op_code`
    #[inline]
    pub fn length(&self, op_code: u8) -> usize {
        self.set.ops()[op_code as usize].mode().length()
    }

    pub fn disassemble(&self, pc: u16, bytes: &[u8]) -> Result<Disassembly> {
        let op_code = *bytes.first().ok_or(EmuError::TruncatedInstruction {
            pc,
            needed: 1,
            available: 0,
        })?;
        let instruction = self.set.ops()[op_code as usize];
        let mode = instruction.mode();
        let base = instruction.base();

        let length = mode.length();
        if bytes.len() < length {
            return Err(EmuError::TruncatedInstruction {
                pc,
                needed: length,
                available: bytes.len(),
            });
        }

        let mnemonic: &'static str = base.into();
        let branch_target = |offset: u8, length: usize| {
            pc.wrapping_add(length as u16)
                .wrapping_add(offset as i8 as i16 as u16)
        };

        let (mnemonic, operand) = match mode {
            AddressingMode::INH => (mnemonic.to_string(), String::new()),
            AddressingMode::INA => (format!("{}a", mnemonic), String::new()),
            AddressingMode::INX => (format!("{}x", mnemonic), String::new()),
            AddressingMode::IMM => (mnemonic.to_string(), format!("#${:02x}", bytes[1])),
            AddressingMode::DIR | AddressingMode::BSC => {
                (mnemonic.to_string(), self.direct(bytes[1]))
            }
            AddressingMode::EXT => (
                mnemonic.to_string(),
                self.extended(make_word(bytes[1], bytes[2])),
            ),
            AddressingMode::IX => (mnemonic.to_string(), ",x".to_string()),
            AddressingMode::IX1 => (mnemonic.to_string(), format!("${:02x},x", bytes[1])),
            AddressingMode::IX2 => (
                mnemonic.to_string(),
                format!("${:04x},x", make_word(bytes[1], bytes[2])),
            ),
            AddressingMode::REL => (
                mnemonic.to_string(),
                format!("${:04x}", branch_target(bytes[1], length)),
            ),
            AddressingMode::BTB => (
                mnemonic.to_string(),
                format!(
                    "{},${:04x}",
                    self.direct(bytes[1]),
                    branch_target(bytes[2], length)
                ),
            ),
        };

        let flags = match base {
            BaseInstruction::JSR | BaseInstruction::BSR | BaseInstruction::SWI => {
                DisasmFlags::STEP_OVER
            }
            BaseInstruction::RTS | BaseInstruction::RTI => DisasmFlags::STEP_OUT,
            _ => DisasmFlags::empty(),
        };

        Ok(Disassembly {
            text: format!("{:<7}{}", mnemonic, operand).trim_end().to_string(),
            length,
            flags,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::m6805::variant::M68HC05C4_SYMBOLS;

    fn text(set: InstructionSet, pc: u16, bytes: &[u8]) -> String {
        Disassembler::new(set).disassemble(pc, bytes).unwrap().text
    }

    #[test]
    fn formats_every_operand_kind() {
        let set = InstructionSet::Hmos;
        assert_eq!(text(set, 0, &[0x4C]), "inca");
        assert_eq!(text(set, 0, &[0x5A]), "decx");
        assert_eq!(text(set, 0, &[0x97]), "tax");
        assert_eq!(text(set, 0, &[0xA6, 0x1F]), "lda    #$1f");
        assert_eq!(text(set, 0, &[0xB7, 0x80]), "sta    $80");
        assert_eq!(text(set, 0, &[0xCC, 0x12, 0x34]), "jmp    $1234");
        assert_eq!(text(set, 0, &[0xF6]), "lda    ,x");
        assert_eq!(text(set, 0, &[0xE6, 0x10]), "lda    $10,x");
        assert_eq!(text(set, 0, &[0xD6, 0x01, 0x00]), "lda    $0100,x");
    }

    #[test]
    fn branch_targets_are_absolute() {
        let set = InstructionSet::Hmos;
        assert_eq!(text(set, 0x1000, &[0x20, 0xFE]), "bra    $1000");
        assert_eq!(text(set, 0x1000, &[0x26, 0x10]), "bne    $1012");
        assert_eq!(text(set, 0x1000, &[0x05, 0x03, 0xFD]), "brclr2 $03,$1000");
        assert_eq!(text(set, 0x1000, &[0x1C, 0x20]), "bset6  $20");
    }

    #[test]
    fn symbols_replace_register_addresses() {
        let disasm = Disassembler::new(InstructionSet::Hc).with_symbols(&M68HC05C4_SYMBOLS);
        let result = disasm.disassemble(0x0100, &[0xB6, 0x13]).unwrap();
        assert_eq!(result.text, "lda    TSR");
        let result = disasm.disassemble(0x0100, &[0xB6, 0x50]).unwrap();
        assert_eq!(result.text, "lda    $50");
    }

    #[test]
    fn tables_follow_the_instruction_set() {
        assert_eq!(text(InstructionSet::Hmos, 0, &[0x42]), "illegal");
        assert_eq!(text(InstructionSet::Hc, 0, &[0x42]), "mul");
        assert_eq!(text(InstructionSet::Cmos, 0, &[0x8E]), "stop");
    }

    #[test]
    fn reports_step_flags() {
        let disasm = Disassembler::new(InstructionSet::Hmos);
        let jsr = disasm.disassemble(0, &[0xBD, 0x40]).unwrap();
        assert_eq!(jsr.flags, DisasmFlags::STEP_OVER);
        let rts = disasm.disassemble(0, &[0x81]).unwrap();
        assert_eq!(rts.flags, DisasmFlags::STEP_OUT);
        assert_eq!(rts.length, 1);
    }

    #[test]
    fn truncated_input_is_an_error() {
        let disasm = Disassembler::new(InstructionSet::Hmos);
        assert!(matches!(
            disasm.disassemble(0, &[0xCC, 0x12]),
            Err(EmuError::TruncatedInstruction { needed: 3, available: 2, .. })
        ));
        assert!(disasm.disassemble(0, &[]).is_err());
    }
}
