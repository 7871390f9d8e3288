use remu6805::bus::{Bus, BusRef};
use remu6805::cpu::m6805::variant::{hd63705, INT_IRQ, INT_TIMER};
use remu6805::cpu::m6805::{ConditionCodes, Variant, M6805};
use remu6805::cpu::{Cpu, InputLine, LineState};
use remu6805::memory::Ram;
use remu6805::{clone_ref, make_ref};
use std::cell::RefCell;
use std::num::Wrapping;
use std::rc::Rc;

fn machine(variant: Variant) -> (M6805<'static>, Rc<RefCell<Vec<u16>>>) {
    let mut bus = Bus::new();
    let ram = Ram::<Wrapping<u16>, Wrapping<u8>>::create(Wrapping(0xFFFF), Wrapping(0x0000));
    bus.add_component(clone_ref(&ram) as BusRef<_, _>);
    let mut cpu = M6805::new(variant, make_ref(bus));

    let acks = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&acks);
    cpu.set_irq_acknowledge(move |bit| log.borrow_mut().push(bit));
    (cpu, acks)
}

fn load(cpu: &mut M6805, address: u16, bytes: &[u8]) {
    for (i, byte) in bytes.iter().enumerate() {
        cpu.write(address + i as u16, *byte);
    }
}

/// M6805 with reset at 0x0100 and the IRQ handler at 0x0200
fn m6805_with_handler() -> (M6805<'static>, Rc<RefCell<Vec<u16>>>) {
    let (mut cpu, acks) = machine(Variant::M6805);
    load(&mut cpu, 0x0FFE, &[0x01, 0x00]);
    load(&mut cpu, 0x0FFA, &[0x02, 0x00]);
    // cli; nop; nop; nop
    load(&mut cpu, 0x0100, &[0x9A, 0x9D, 0x9D, 0x9D]);
    // nop; rti
    load(&mut cpu, 0x0200, &[0x9D, 0x80]);
    cpu.reset();
    (cpu, acks)
}

#[test]
fn irq_is_taken_at_the_next_boundary() {
    let (mut cpu, acks) = m6805_with_handler();
    cpu.step();
    assert_eq!(cpu.pc(), 0x0101);

    cpu.set_input(InputLine::Irq, LineState::Assert).unwrap();
    assert_eq!(cpu.pending_interrupts(), INT_IRQ);

    // service (11) plus the handler's first nop (2)
    assert_eq!(cpu.step(), 13);
    assert_eq!(cpu.pc(), 0x0201);
    assert!(cpu.cc().contains(ConditionCodes::I));
    assert_eq!(cpu.pending_interrupts(), 0);
    assert_eq!(*acks.borrow(), vec![INT_IRQ]);

    // PCL, PCH, X, A, CC
    assert_eq!(cpu.s(), 0x7A);
    assert_eq!(cpu.peek(0x7F), 0x01);
    assert_eq!(cpu.peek(0x7E), 0x01);
    assert_eq!(cpu.peek(0x7B), 0xE0);
}

#[test]
fn held_line_is_not_serviced_twice() {
    let (mut cpu, acks) = m6805_with_handler();
    cpu.step();
    cpu.set_input(InputLine::Irq, LineState::Assert).unwrap();
    cpu.step();

    // still held, no new edge
    cpu.set_input(InputLine::Irq, LineState::Assert).unwrap();
    assert_eq!(cpu.pending_interrupts(), 0);

    // rti, back to the interrupted nop
    cpu.step();
    assert_eq!(cpu.pc(), 0x0101);
    assert!(!cpu.cc().contains(ConditionCodes::I));
    cpu.step();
    assert_eq!(cpu.pc(), 0x0102);
    assert_eq!(acks.borrow().len(), 1);

    cpu.set_input(InputLine::Irq, LineState::Clear).unwrap();
    cpu.set_input(InputLine::Irq, LineState::Assert).unwrap();
    cpu.step();
    assert_eq!(cpu.pc(), 0x0201);
    assert_eq!(acks.borrow().len(), 2);
}

#[test]
fn edges_while_masked_latch_a_single_request() {
    let (mut cpu, acks) = m6805_with_handler();
    cpu.set_input(InputLine::Irq, LineState::Pulse).unwrap();
    cpu.set_input(InputLine::Irq, LineState::Pulse).unwrap();
    assert_eq!(cpu.pending_interrupts(), INT_IRQ);

    // cli, then the request is taken once
    cpu.step();
    cpu.step();
    assert_eq!(cpu.pc(), 0x0201);
    cpu.step();
    cpu.step();
    cpu.step();
    assert_eq!(cpu.pc(), 0x0103);
    assert_eq!(acks.borrow().len(), 1);
}

#[test]
fn nmi_wins_and_ignores_the_mask() {
    let (mut cpu, acks) = machine(Variant::HD63705);
    load(&mut cpu, 0x1FFE, &[0x01, 0x00]);
    load(&mut cpu, 0x1FFC, &[0x03, 0x00]);
    load(&mut cpu, 0x1FF8, &[0x04, 0x00]);
    load(&mut cpu, 0x0100, &[0x9D]);
    load(&mut cpu, 0x0300, &[0x9D]);
    cpu.reset();

    cpu.set_input(InputLine::Irq, LineState::Assert).unwrap();
    cpu.set_input(InputLine::Nmi, LineState::Assert).unwrap();
    cpu.step();
    assert_eq!(cpu.pc(), 0x0301);
    assert_eq!(*acks.borrow(), vec![hd63705::INT_NMI]);
    assert_eq!(cpu.pending_interrupts(), hd63705::INT_IRQ1);
}

#[test]
fn hc05_timer_overflow_vectors() {
    let (mut cpu, acks) = machine(Variant::M68HC05C4);
    load(&mut cpu, 0x1FFE, &[0x01, 0x00]);
    load(&mut cpu, 0x1FF8, &[0x04, 0x00]);
    // cli; bra *
    load(&mut cpu, 0x0100, &[0x9A, 0x20, 0xFE]);
    // bra *
    load(&mut cpu, 0x0400, &[0x20, 0xFE]);
    cpu.reset();

    // TOIE
    cpu.write(0x0012, 0x20);
    cpu.run(100);
    assert_eq!(cpu.pc(), 0x0400);
    assert_eq!(*acks.borrow(), vec![INT_TIMER]);
    // level source, stays requested until the program acknowledges it
    assert_eq!(cpu.pending_interrupts() & INT_TIMER, INT_TIMER);
}

#[test]
fn hc05_irq_goes_through_the_latch() {
    let (mut cpu, acks) = machine(Variant::M68HC05C4);
    load(&mut cpu, 0x1FFE, &[0x01, 0x00]);
    load(&mut cpu, 0x1FFA, &[0x02, 0x00]);
    // cli; nop
    load(&mut cpu, 0x0100, &[0x9A, 0x9D]);
    load(&mut cpu, 0x0200, &[0x9D]);
    cpu.reset();
    cpu.step();

    cpu.set_input(InputLine::Irq, LineState::Assert).unwrap();
    cpu.step();
    assert_eq!(cpu.pc(), 0x0201);
    assert_eq!(*acks.borrow(), vec![INT_IRQ]);
    assert_eq!(cpu.pending_interrupts(), 0);
}
