use proptest::prelude::*;
use remu6805::cpu::m6805::Variant;
use remu6805::image::Image;
use remu6805::system::Mcu;

const TDR: u16 = 0x0008;
const TCR: u16 = 0x0009;

/// Resets into a run of NOPs at 0x0080
fn m68705p3() -> Mcu<'static> {
    let mut mcu = Mcu::new(Variant::M68705P3, 4_000_000);
    mcu.load(&Image::from_binary(vec![0x9D; 0x100], 0x0080)).unwrap();
    mcu.load(&Image::from_binary(vec![0x00, 0x80], 0x07FE)).unwrap();
    mcu.reset();
    mcu
}

/// Resets into `bra *` at 0x0100
fn m68hc05c4() -> Mcu<'static> {
    let mut mcu = Mcu::new(Variant::M68HC05C4, 4_000_000);
    mcu.load(&Image::from_binary(vec![0x20, 0xFE], 0x0100)).unwrap();
    mcu.load(&Image::from_binary(vec![0x01, 0x00], 0x1FFE)).unwrap();
    mcu.reset();
    mcu
}

#[test]
fn prescaler_clear_reloads_and_counting_resumes() {
    let mut mcu = m68705p3();
    let cpu = mcu.cpu_mut();
    cpu.write(TDR, 0x20);
    // TIM, divide by 1
    cpu.write(TCR, 0x40);

    for _ in 0..3 {
        cpu.step();
    }
    assert_eq!(cpu.peek(TDR), 0x1A);

    // TIM | PSC
    cpu.write(TCR, 0x48);
    assert_eq!(cpu.peek(TDR), 0x20);
    cpu.step();
    assert_eq!(cpu.peek(TDR), 0x1E);
    assert_eq!(cpu.peek(TCR), 0x40);
}

#[test]
fn reaching_zero_requests_the_timer_interrupt() {
    let mut mcu = m68705p3();
    let cpu = mcu.cpu_mut();
    cpu.write(TDR, 0x04);
    cpu.write(TCR, 0x40);
    cpu.step();
    cpu.step();
    assert_eq!(cpu.peek(TCR) & 0x80, 0x80);
    // masked
    assert_eq!(cpu.pending_interrupts(), 0);

    // unmask, keeping TIR
    cpu.write(TCR, 0x80);
    assert_ne!(cpu.pending_interrupts(), 0);
}

proptest! {
    #[test]
    fn reading_the_counter_does_not_disturb_it(steps in 1usize..200, divide in 0u8..8) {
        let mut observed = m68705p3();
        let mut quiet = m68705p3();
        for mcu in [&mut observed, &mut quiet] {
            mcu.cpu_mut().write(TDR, 0xC0);
            mcu.cpu_mut().write(TCR, 0x40 | divide);
        }

        for _ in 0..steps {
            let cpu = observed.cpu_mut();
            let read = cpu.read(TDR);
            prop_assert_eq!(read, cpu.peek(TDR));
            cpu.step();
            quiet.cpu_mut().step();
        }
        prop_assert_eq!(observed.cpu().save_state(), quiet.cpu().save_state());
    }

    #[test]
    fn peeking_registers_has_no_side_effects(cycles in 0u64..5000) {
        let mut mcu = m68hc05c4();
        // enable every timer interrupt so flags stay visible
        mcu.cpu_mut().write(0x0012, 0xE0);
        mcu.run(cycles);

        let cpu = mcu.cpu();
        let before = cpu.save_state();
        let first: Vec<u8> = (0x0000..0x0020).map(|a| cpu.peek(a)).collect();
        let second: Vec<u8> = (0x0000..0x0020).map(|a| cpu.peek(a)).collect();
        prop_assert_eq!(first, second);
        prop_assert_eq!(before, cpu.save_state());
    }
}

#[test]
fn status_read_then_counter_read_clears_overflow() {
    let mut mcu = m68hc05c4();
    mcu.run(64);
    let cpu = mcu.cpu_mut();
    assert_eq!(cpu.peek(0x0013) & 0x20, 0x20);

    // peeking TSR does not arm the acknowledge
    cpu.peek(0x0013);
    cpu.read(0x0019);
    assert_eq!(cpu.peek(0x0013) & 0x20, 0x20);

    cpu.read(0x0013);
    cpu.read(0x0019);
    assert_eq!(cpu.peek(0x0013) & 0x20, 0x00);
}
