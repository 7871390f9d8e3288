use remu6805::bus::{Bus, BusRef};
use remu6805::cpu::m6805::variant::hd63705;
use remu6805::cpu::m6805::{ConditionCodes, HaltState, Variant, M6805};
use remu6805::cpu::{Cpu, InputLine, LineState};
use remu6805::memory::Ram;
use remu6805::{clone_ref, make_ref};
use std::num::Wrapping;

fn machine(variant: Variant) -> M6805<'static> {
    let mut bus = Bus::new();
    let ram = Ram::<Wrapping<u16>, Wrapping<u8>>::create(Wrapping(0xFFFF), Wrapping(0x0000));
    bus.add_component(clone_ref(&ram) as BusRef<_, _>);
    M6805::new(variant, make_ref(bus))
}

#[test]
fn reset_loads_vector_and_masks_interrupts() {
    let mut cpu = machine(Variant::HD63705);
    cpu.write(0x1FFE, 0x10);
    cpu.write(0x1FFF, 0x00);
    cpu.write(0x1000, 0x98);

    cpu.reset();
    assert_eq!(cpu.pc(), 0x1000);
    assert!(cpu.cc().contains(ConditionCodes::I));

    cpu.set_state_entry("CC", 0x09).unwrap();
    let cycles = cpu.step();
    assert_eq!(cycles, 2);
    assert_eq!(cpu.pc(), 0x1001);
    assert!(!cpu.cc().contains(ConditionCodes::C));
    assert!(cpu.cc().contains(ConditionCodes::I));
}

#[test]
fn base_part_reads_vector_through_its_address_mask() {
    let mut cpu = machine(Variant::M6805);
    // 0xFFFE on a 12 bit bus
    cpu.write(0xFFFE, 0x10);
    cpu.write(0xFFFF, 0x00);
    assert_eq!(cpu.peek(0x0FFE), 0x10);

    // clc, fetched from 0x1000 & 0x0FFF
    cpu.write(0x1000, 0x98);
    cpu.reset();
    assert_eq!(cpu.pc(), 0x1000);

    cpu.set_state_entry("CC", 0x01).unwrap();
    assert_eq!(cpu.step(), 2);
    assert_eq!(cpu.pc(), 0x1001);
    assert_eq!(cpu.cc(), ConditionCodes::empty());
}

#[test]
fn reset_restores_stack_and_registers() {
    let mut cpu = machine(Variant::M68HC05C4);
    cpu.set_state_entry("A", 0x12).unwrap();
    cpu.set_state_entry("S", 0xC4).unwrap();
    cpu.reset();
    assert_eq!(cpu.a(), 0x00);
    assert_eq!(cpu.x(), 0x00);
    assert_eq!(cpu.s(), 0x00FF);
}

#[test]
fn reset_line_pulse_and_hold() {
    let mut cpu = machine(Variant::M6805);
    cpu.write(0x0FFE, 0x02);
    cpu.write(0x0FFF, 0x00);
    // nop; nop; ...
    for address in 0x0200..0x0210 {
        cpu.write(address, 0x9D);
    }
    cpu.reset();
    cpu.run(8);
    assert_eq!(cpu.pc(), 0x0204);

    cpu.set_input(InputLine::Reset, LineState::Pulse).unwrap();
    assert_eq!(cpu.pc(), 0x0200);
    assert_eq!(cpu.reset_pulses(), 1);

    cpu.set_input(InputLine::Reset, LineState::Assert).unwrap();
    assert_eq!(cpu.run(100), 100);
    assert_eq!(cpu.pc(), 0x0200);

    cpu.set_input(InputLine::Reset, LineState::Clear).unwrap();
    cpu.run(2);
    assert_eq!(cpu.pc(), 0x0201);
    assert_eq!(cpu.reset_pulses(), 1);
}

#[test]
fn wait_halts_fetch_but_keeps_burning() {
    let mut cpu = machine(Variant::M146805E2);
    cpu.write(0x1FFE, 0x01);
    cpu.write(0x1FFF, 0x00);
    // wait
    cpu.write(0x0100, 0x8F);
    cpu.reset();

    cpu.step();
    assert_eq!(cpu.halt_state(), HaltState::Wait);
    assert!(!cpu.cc().contains(ConditionCodes::I));
    assert_eq!(cpu.step(), 1);
    assert_eq!(cpu.pc(), 0x0101);
}

#[test]
fn held_nmi_latches_again_after_reset() {
    let mut cpu = machine(Variant::HD63705);
    cpu.write(0x1FFE, 0x01);
    cpu.write(0x1FFF, 0x00);
    cpu.write(0x1FFC, 0x03);
    cpu.write(0x1FFD, 0x00);
    cpu.write(0x0100, 0x9D);
    cpu.write(0x0300, 0x9D);
    cpu.reset();

    cpu.set_input(InputLine::Nmi, LineState::Assert).unwrap();
    cpu.step();
    assert_eq!(cpu.pc(), 0x0301);

    // still held, no new edge
    cpu.set_input(InputLine::Nmi, LineState::Assert).unwrap();
    assert_eq!(cpu.pending_interrupts(), 0);

    cpu.reset();
    assert_eq!(cpu.pending_interrupts(), 0);
    cpu.set_input(InputLine::Nmi, LineState::Assert).unwrap();
    assert_eq!(cpu.pending_interrupts(), hd63705::INT_NMI);
    cpu.step();
    assert_eq!(cpu.pc(), 0x0301);
}
