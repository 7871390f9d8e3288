use super::tables::{Instruction, BASE_INSTRUCTION_COUNT};
use super::{Address, ConditionCodes, HaltState, Word, CC_UNUSED, M6805};
use std::num::Wrapping;

#[derive(Debug)]
enum InstructionData {
    None,
    Accumulator,
    Index,
    Immediate(Word),
    Address(Address),
    /// Branch target
    Relative(Address),
    /// Tested byte and branch target of BRSET/BRCLR
    BitTest(Word, Address),
}
impl InstructionData {
    fn read_data(&self, cpu: &mut M6805) -> Word {
        match self {
            Self::Accumulator => cpu.a,
            Self::Index => cpu.x,
            Self::Immediate(data) => *data,
            Self::Address(address) => cpu.read_word(*address),
            Self::BitTest(data, _) => *data,
            _ => unreachable!("instruction has no operand"),
        }
    }

    fn write_data(&self, cpu: &mut M6805, data: Word) {
        match self {
            Self::Accumulator => cpu.a = data,
            Self::Index => cpu.x = data,
            Self::Address(address) => cpu.write_word(*address, data),
            _ => unreachable!("instruction operand is not writable"),
        }
    }

    fn read_address(&self) -> Address {
        match self {
            Self::Address(address) => *address,
            Self::Relative(target) => *target,
            Self::BitTest(_, target) => *target,
            _ => unreachable!("instruction has no effective address"),
        }
    }
}

impl<'a> M6805<'a> {
    pub(super) fn execute_instruction(&mut self, op_code: u8, instruction: Instruction) {
        let addressing_mode = instruction.mode();
        let base_instruction = instruction.base();

        if instruction.is_illegal() {
            tracing::warn!(
                target: "m6805",
                "illegal opcode {:02X} at {:04X}",
                op_code,
                self.pc.0.wrapping_sub(1)
            );
        }

        let data = ADDRESSING_LOOKUP[addressing_mode as usize](self);
        let execute = EXECUTE_LOOKUP[base_instruction as usize];
        execute(self, data);
    }

    fn branch(&mut self, condition: bool, data: InstructionData) {
        if condition {
            self.pc = data.read_address();
        }
    }

    fn subtract(&mut self, left: Word, right: Word, borrow: bool) -> Word {
        let result = (left.0 as u16)
            .wrapping_sub(right.0 as u16)
            .wrapping_sub(borrow as u16);
        self.cc.set(ConditionCodes::C, (result & 0x0100) != 0);
        let result = Wrapping(result as u8);
        self.set_nz_flags(result);
        result
    }

    fn add(&mut self, left: Word, right: Word, carry: bool) -> Word {
        let result = (left.0 as u16) + (right.0 as u16) + (carry as u16);
        self.cc.set(ConditionCodes::C, (result & 0x0100) != 0);
        self.cc.set(
            ConditionCodes::H,
            ((left.0 as u16 ^ right.0 as u16 ^ result) & 0x0010) != 0,
        );
        let result = Wrapping(result as u8);
        self.set_nz_flags(result);
        result
    }
}

#[inline]
fn addressing_inh(_: &mut M6805) -> InstructionData {
    InstructionData::None
}

#[inline]
fn addressing_ina(_: &mut M6805) -> InstructionData {
    InstructionData::Accumulator
}

#[inline]
fn addressing_inx(_: &mut M6805) -> InstructionData {
    InstructionData::Index
}

#[inline]
fn addressing_imm(cpu: &mut M6805) -> InstructionData {
    InstructionData::Immediate(cpu.read_next_word())
}

#[inline]
fn addressing_dir(cpu: &mut M6805) -> InstructionData {
    let address = cpu.read_next_word();
    InstructionData::Address(Wrapping(address.0 as u16))
}

#[inline]
fn addressing_ext(cpu: &mut M6805) -> InstructionData {
    InstructionData::Address(cpu.read_next_address())
}

#[inline]
fn addressing_ix(cpu: &mut M6805) -> InstructionData {
    InstructionData::Address(Wrapping(cpu.x.0 as u16))
}

#[inline]
fn addressing_ix1(cpu: &mut M6805) -> InstructionData {
    let offset = cpu.read_next_word();
    InstructionData::Address(Wrapping(cpu.x.0 as u16 + offset.0 as u16))
}

#[inline]
fn addressing_ix2(cpu: &mut M6805) -> InstructionData {
    let offset = cpu.read_next_address();
    InstructionData::Address(offset + Wrapping(cpu.x.0 as u16))
}

fn relative_target(cpu: &mut M6805) -> Address {
    let offset = cpu.read_next_word().0 as i8;
    cpu.pc + Wrapping(offset as i16 as u16)
}

#[inline]
fn addressing_rel(cpu: &mut M6805) -> InstructionData {
    InstructionData::Relative(relative_target(cpu))
}

// The tested byte is read before the branch offset
fn addressing_btb(cpu: &mut M6805) -> InstructionData {
    let address = cpu.read_next_word();
    let data = cpu.read_word(Wrapping(address.0 as u16));
    let target = relative_target(cpu);
    InstructionData::BitTest(data, target)
}

#[inline]
fn addressing_bsc(cpu: &mut M6805) -> InstructionData {
    addressing_dir(cpu)
}

const ADDRESSING_LOOKUP: [fn(&mut M6805) -> InstructionData; 12] = [
    addressing_inh,
    addressing_ina,
    addressing_inx,
    addressing_imm,
    addressing_dir,
    addressing_ext,
    addressing_ix,
    addressing_ix1,
    addressing_ix2,
    addressing_rel,
    addressing_btb,
    addressing_bsc,
];

fn execute_brset(cpu: &mut M6805, data: InstructionData, bit: u8) {
    let set = (data.read_data(cpu).0 & (1 << bit)) != 0;
    cpu.cc.set(ConditionCodes::C, set);
    cpu.branch(set, data);
}

fn execute_brclr(cpu: &mut M6805, data: InstructionData, bit: u8) {
    let set = (data.read_data(cpu).0 & (1 << bit)) != 0;
    cpu.cc.set(ConditionCodes::C, set);
    cpu.branch(!set, data);
}

fn execute_bset(cpu: &mut M6805, data: InstructionData, bit: u8) {
    let value = data.read_data(cpu) | Wrapping(1u8 << bit);
    data.write_data(cpu, value);
}

fn execute_bclr(cpu: &mut M6805, data: InstructionData, bit: u8) {
    let value = data.read_data(cpu) & Wrapping(!(1u8 << bit));
    data.write_data(cpu, value);
}

macro_rules! bit_handlers {
    ($($bit:literal => $brset:ident, $brclr:ident, $bset:ident, $bclr:ident;)*) => {
        $(
            fn $brset(cpu: &mut M6805, data: InstructionData) {
                execute_brset(cpu, data, $bit);
            }

            fn $brclr(cpu: &mut M6805, data: InstructionData) {
                execute_brclr(cpu, data, $bit);
            }

            fn $bset(cpu: &mut M6805, data: InstructionData) {
                execute_bset(cpu, data, $bit);
            }

            fn $bclr(cpu: &mut M6805, data: InstructionData) {
                execute_bclr(cpu, data, $bit);
            }
        )*
    };
}

bit_handlers! {
    0 => execute_brset0, execute_brclr0, execute_bset0, execute_bclr0;
    1 => execute_brset1, execute_brclr1, execute_bset1, execute_bclr1;
    2 => execute_brset2, execute_brclr2, execute_bset2, execute_bclr2;
    3 => execute_brset3, execute_brclr3, execute_bset3, execute_bclr3;
    4 => execute_brset4, execute_brclr4, execute_bset4, execute_bclr4;
    5 => execute_brset5, execute_brclr5, execute_bset5, execute_bclr5;
    6 => execute_brset6, execute_brclr6, execute_bset6, execute_bclr6;
    7 => execute_brset7, execute_brclr7, execute_bset7, execute_bclr7;
}

fn execute_bra(cpu: &mut M6805, data: InstructionData) {
    cpu.branch(true, data);
}

fn execute_brn(_: &mut M6805, _: InstructionData) {}

fn execute_bhi(cpu: &mut M6805, data: InstructionData) {
    let condition = !cpu.cc.intersects(ConditionCodes::C | ConditionCodes::Z);
    cpu.branch(condition, data);
}

fn execute_bls(cpu: &mut M6805, data: InstructionData) {
    let condition = cpu.cc.intersects(ConditionCodes::C | ConditionCodes::Z);
    cpu.branch(condition, data);
}

fn execute_bcc(cpu: &mut M6805, data: InstructionData) {
    let condition = !cpu.cc.contains(ConditionCodes::C);
    cpu.branch(condition, data);
}

fn execute_bcs(cpu: &mut M6805, data: InstructionData) {
    let condition = cpu.cc.contains(ConditionCodes::C);
    cpu.branch(condition, data);
}

fn execute_bne(cpu: &mut M6805, data: InstructionData) {
    let condition = !cpu.cc.contains(ConditionCodes::Z);
    cpu.branch(condition, data);
}

fn execute_beq(cpu: &mut M6805, data: InstructionData) {
    let condition = cpu.cc.contains(ConditionCodes::Z);
    cpu.branch(condition, data);
}

fn execute_bhcc(cpu: &mut M6805, data: InstructionData) {
    let condition = !cpu.cc.contains(ConditionCodes::H);
    cpu.branch(condition, data);
}

fn execute_bhcs(cpu: &mut M6805, data: InstructionData) {
    let condition = cpu.cc.contains(ConditionCodes::H);
    cpu.branch(condition, data);
}

fn execute_bpl(cpu: &mut M6805, data: InstructionData) {
    let condition = !cpu.cc.contains(ConditionCodes::N);
    cpu.branch(condition, data);
}

fn execute_bmi(cpu: &mut M6805, data: InstructionData) {
    let condition = cpu.cc.contains(ConditionCodes::N);
    cpu.branch(condition, data);
}

fn execute_bmc(cpu: &mut M6805, data: InstructionData) {
    let condition = !cpu.cc.contains(ConditionCodes::I);
    cpu.branch(condition, data);
}

fn execute_bms(cpu: &mut M6805, data: InstructionData) {
    let condition = cpu.cc.contains(ConditionCodes::I);
    cpu.branch(condition, data);
}

/// Branches while the interrupt pin is low (asserted)
fn execute_bil(cpu: &mut M6805, data: InstructionData) {
    let condition = cpu.test_il();
    cpu.branch(condition, data);
}

fn execute_bih(cpu: &mut M6805, data: InstructionData) {
    let condition = !cpu.test_il();
    cpu.branch(condition, data);
}

fn execute_neg(cpu: &mut M6805, data: InstructionData) {
    let value = data.read_data(cpu);
    let result = Wrapping(0) - value;
    cpu.cc.set(ConditionCodes::C, result.0 != 0);
    cpu.set_nz_flags(result);
    data.write_data(cpu, result);
}

fn execute_com(cpu: &mut M6805, data: InstructionData) {
    let result = !data.read_data(cpu);
    cpu.cc.insert(ConditionCodes::C);
    cpu.set_nz_flags(result);
    data.write_data(cpu, result);
}

fn execute_lsr(cpu: &mut M6805, data: InstructionData) {
    let value = data.read_data(cpu);
    let result = value >> 1;
    cpu.cc.set(ConditionCodes::C, (value.0 & 0x01) != 0);
    cpu.set_nz_flags(result);
    data.write_data(cpu, result);
}

fn execute_ror(cpu: &mut M6805, data: InstructionData) {
    let value = data.read_data(cpu);
    let carry = if cpu.cc.contains(ConditionCodes::C) { 0x80 } else { 0x00 };
    let result = (value >> 1) | Wrapping(carry);
    cpu.cc.set(ConditionCodes::C, (value.0 & 0x01) != 0);
    cpu.set_nz_flags(result);
    data.write_data(cpu, result);
}

fn execute_asr(cpu: &mut M6805, data: InstructionData) {
    let value = data.read_data(cpu);
    let result = (value >> 1) | (value & Wrapping(0x80));
    cpu.cc.set(ConditionCodes::C, (value.0 & 0x01) != 0);
    cpu.set_nz_flags(result);
    data.write_data(cpu, result);
}

fn execute_lsl(cpu: &mut M6805, data: InstructionData) {
    let value = data.read_data(cpu);
    let result = value << 1;
    cpu.cc.set(ConditionCodes::C, (value.0 & 0x80) != 0);
    cpu.set_nz_flags(result);
    data.write_data(cpu, result);
}

fn execute_rol(cpu: &mut M6805, data: InstructionData) {
    let value = data.read_data(cpu);
    let carry = if cpu.cc.contains(ConditionCodes::C) { 0x01 } else { 0x00 };
    let result = (value << 1) | Wrapping(carry);
    cpu.cc.set(ConditionCodes::C, (value.0 & 0x80) != 0);
    cpu.set_nz_flags(result);
    data.write_data(cpu, result);
}

fn execute_dec(cpu: &mut M6805, data: InstructionData) {
    let result = data.read_data(cpu) - Wrapping(1);
    cpu.set_nz_flags(result);
    data.write_data(cpu, result);
}

fn execute_inc(cpu: &mut M6805, data: InstructionData) {
    let result = data.read_data(cpu) + Wrapping(1);
    cpu.set_nz_flags(result);
    data.write_data(cpu, result);
}

fn execute_tst(cpu: &mut M6805, data: InstructionData) {
    let value = data.read_data(cpu);
    cpu.set_nz_flags(value);
}

fn execute_clr(cpu: &mut M6805, data: InstructionData) {
    cpu.set_nz_flags(Wrapping(0));
    data.write_data(cpu, Wrapping(0));
}

fn execute_rti(cpu: &mut M6805, _: InstructionData) {
    let cc = cpu.pop_word();
    cpu.cc = ConditionCodes::from_bits_truncate(cc.0);
    cpu.a = cpu.pop_word();
    cpu.x = cpu.pop_word();
    cpu.pc = cpu.pop_address();
}

fn execute_rts(cpu: &mut M6805, _: InstructionData) {
    cpu.pc = cpu.pop_address();
}

fn execute_swi(cpu: &mut M6805, _: InstructionData) {
    cpu.push_frame();
    cpu.cc.insert(ConditionCodes::I);
    let vector = Wrapping(cpu.config.swi_vector);
    cpu.pc = cpu.read_address(vector);
}

fn execute_stop(cpu: &mut M6805, _: InstructionData) {
    tracing::debug!(target: "m6805", "STOP at {:04X}", cpu.pc.0.wrapping_sub(1));
    cpu.cc.remove(ConditionCodes::I);
    cpu.halt = HaltState::Stop;
}

fn execute_wait(cpu: &mut M6805, _: InstructionData) {
    tracing::debug!(target: "m6805", "WAIT at {:04X}", cpu.pc.0.wrapping_sub(1));
    cpu.cc.remove(ConditionCodes::I);
    cpu.halt = HaltState::Wait;
}

fn execute_mul(cpu: &mut M6805, _: InstructionData) {
    let result = (cpu.x.0 as u16) * (cpu.a.0 as u16);
    cpu.x = Wrapping((result >> 8) as u8);
    cpu.a = Wrapping(result as u8);
    cpu.cc.remove(ConditionCodes::H | ConditionCodes::C);
}

fn execute_tax(cpu: &mut M6805, _: InstructionData) {
    cpu.x = cpu.a;
}

fn execute_clc(cpu: &mut M6805, _: InstructionData) {
    cpu.cc.remove(ConditionCodes::C);
}

fn execute_sec(cpu: &mut M6805, _: InstructionData) {
    cpu.cc.insert(ConditionCodes::C);
}

fn execute_cli(cpu: &mut M6805, _: InstructionData) {
    cpu.cc.remove(ConditionCodes::I);
}

fn execute_sei(cpu: &mut M6805, _: InstructionData) {
    cpu.cc.insert(ConditionCodes::I);
}

fn execute_rsp(cpu: &mut M6805, _: InstructionData) {
    cpu.s = Wrapping(cpu.config.sp_mask);
}

fn execute_nop(_: &mut M6805, _: InstructionData) {}

fn execute_txa(cpu: &mut M6805, _: InstructionData) {
    cpu.a = cpu.x;
}

fn execute_sub(cpu: &mut M6805, data: InstructionData) {
    let value = data.read_data(cpu);
    let a = cpu.a;
    cpu.a = cpu.subtract(a, value, false);
}

fn execute_cmp(cpu: &mut M6805, data: InstructionData) {
    let value = data.read_data(cpu);
    let a = cpu.a;
    cpu.subtract(a, value, false);
}

fn execute_sbc(cpu: &mut M6805, data: InstructionData) {
    let value = data.read_data(cpu);
    let borrow = cpu.cc.contains(ConditionCodes::C);
    let a = cpu.a;
    cpu.a = cpu.subtract(a, value, borrow);
}

fn execute_cpx(cpu: &mut M6805, data: InstructionData) {
    let value = data.read_data(cpu);
    let x = cpu.x;
    cpu.subtract(x, value, false);
}

fn execute_and(cpu: &mut M6805, data: InstructionData) {
    let value = data.read_data(cpu);
    cpu.a &= value;
    cpu.set_nz_flags(cpu.a);
}

fn execute_bit(cpu: &mut M6805, data: InstructionData) {
    let result = cpu.a & data.read_data(cpu);
    cpu.set_nz_flags(result);
}

fn execute_lda(cpu: &mut M6805, data: InstructionData) {
    cpu.a = data.read_data(cpu);
    cpu.set_nz_flags(cpu.a);
}

fn execute_sta(cpu: &mut M6805, data: InstructionData) {
    let value = cpu.a;
    cpu.set_nz_flags(value);
    data.write_data(cpu, value);
}

fn execute_eor(cpu: &mut M6805, data: InstructionData) {
    let value = data.read_data(cpu);
    cpu.a ^= value;
    cpu.set_nz_flags(cpu.a);
}

fn execute_adc(cpu: &mut M6805, data: InstructionData) {
    let value = data.read_data(cpu);
    let carry = cpu.cc.contains(ConditionCodes::C);
    let a = cpu.a;
    cpu.a = cpu.add(a, value, carry);
}

fn execute_ora(cpu: &mut M6805, data: InstructionData) {
    let value = data.read_data(cpu);
    cpu.a |= value;
    cpu.set_nz_flags(cpu.a);
}

fn execute_add(cpu: &mut M6805, data: InstructionData) {
    let value = data.read_data(cpu);
    let a = cpu.a;
    cpu.a = cpu.add(a, value, false);
}

fn execute_jmp(cpu: &mut M6805, data: InstructionData) {
    cpu.pc = data.read_address();
}

fn execute_jsr(cpu: &mut M6805, data: InstructionData) {
    let pc = cpu.pc;
    cpu.push_address(pc);
    cpu.pc = data.read_address();
}

fn execute_ldx(cpu: &mut M6805, data: InstructionData) {
    cpu.x = data.read_data(cpu);
    cpu.set_nz_flags(cpu.x);
}

fn execute_stx(cpu: &mut M6805, data: InstructionData) {
    let value = cpu.x;
    cpu.set_nz_flags(value);
    data.write_data(cpu, value);
}

fn execute_bsr(cpu: &mut M6805, data: InstructionData) {
    let pc = cpu.pc;
    cpu.push_address(pc);
    cpu.pc = data.read_address();
}

// Reserved opcodes do nothing and take no time
fn execute_ill(_: &mut M6805, _: InstructionData) {}

const EXECUTE_LOOKUP: [fn(&mut M6805, InstructionData); BASE_INSTRUCTION_COUNT] = [
    execute_brset0,
    execute_brset1,
    execute_brset2,
    execute_brset3,
    execute_brset4,
    execute_brset5,
    execute_brset6,
    execute_brset7,
    execute_brclr0,
    execute_brclr1,
    execute_brclr2,
    execute_brclr3,
    execute_brclr4,
    execute_brclr5,
    execute_brclr6,
    execute_brclr7,
    execute_bset0,
    execute_bset1,
    execute_bset2,
    execute_bset3,
    execute_bset4,
    execute_bset5,
    execute_bset6,
    execute_bset7,
    execute_bclr0,
    execute_bclr1,
    execute_bclr2,
    execute_bclr3,
    execute_bclr4,
    execute_bclr5,
    execute_bclr6,
    execute_bclr7,
    execute_bra,
    execute_brn,
    execute_bhi,
    execute_bls,
    execute_bcc,
    execute_bcs,
    execute_bne,
    execute_beq,
    execute_bhcc,
    execute_bhcs,
    execute_bpl,
    execute_bmi,
    execute_bmc,
    execute_bms,
    execute_bil,
    execute_bih,
    execute_neg,
    execute_com,
    execute_lsr,
    execute_ror,
    execute_asr,
    execute_lsl,
    execute_rol,
    execute_dec,
    execute_inc,
    execute_tst,
    execute_clr,
    execute_rti,
    execute_rts,
    execute_swi,
    execute_stop,
    execute_wait,
    execute_mul,
    execute_tax,
    execute_clc,
    execute_sec,
    execute_cli,
    execute_sei,
    execute_rsp,
    execute_nop,
    execute_txa,
    execute_sub,
    execute_cmp,
    execute_sbc,
    execute_cpx,
    execute_and,
    execute_bit,
    execute_lda,
    execute_sta,
    execute_eor,
    execute_adc,
    execute_ora,
    execute_add,
    execute_jmp,
    execute_jsr,
    execute_ldx,
    execute_stx,
    execute_bsr,
    execute_ill,
];
