use remu6805::cpu::m6805::Variant;
use remu6805::image::Image;
use remu6805::system::Mcu;

const COPRST: u16 = 0x001D;
const COPCR: u16 = 0x001E;
const PCOPE: u8 = 0x04;
const COPF: u8 = 0x10;

fn m68hc705c8a(program: &[u8], ncope: bool) -> Mcu<'static> {
    let mut mcu = Mcu::new(Variant::M68HC705C8A, 4_000_000);
    mcu.load(&Image::from_binary(program.to_vec(), 0x0100)).unwrap();
    // MOR: no port B interrupts, NCOP enable in bit 0 of 0x1FF1
    mcu.load(&Image::from_binary(vec![0x00, ncope as u8], 0x1FF0)).unwrap();
    mcu.load(&Image::from_binary(vec![0x01, 0x00], 0x1FFE)).unwrap();
    mcu.reset();
    mcu
}

#[test]
fn programmable_cop_pulses_reset_once() {
    // bra *
    let mut mcu = m68hc705c8a(&[0x20, 0xFE], false);
    // PCOPE, CM = 1: 2^17 cycle timeout
    mcu.cpu_mut().write(COPCR, PCOPE | 0x01);
    let timeout: u64 = 1 << 17;

    let mut total = 0u64;
    while total < timeout {
        assert_eq!(mcu.cpu().reset_pulses(), 0);
        total += mcu.cpu_mut().step() as u64;
    }
    assert_eq!(mcu.cpu().reset_pulses(), 1);
    assert_eq!(mcu.cpu().pc(), 0x0100);

    // the reset disabled the watchdog and left COPF behind
    let copcr = mcu.cpu().peek(COPCR);
    assert_eq!(copcr & (COPF | PCOPE), COPF);
    mcu.run(4 * timeout);
    assert_eq!(mcu.cpu().reset_pulses(), 1);

    // reading COPCR clears COPF
    mcu.cpu_mut().read(COPCR);
    assert_eq!(mcu.cpu().peek(COPCR) & COPF, 0);
}

#[test]
fn serviced_cop_never_fires() {
    // loop: lda #$55; sta COPRST; lda #$AA; sta COPRST; bra loop
    let program = [0xA6, 0x55, 0xB7, 0x1D, 0xA6, 0xAA, 0xB7, 0x1D, 0x20, 0xF6];
    let mut mcu = m68hc705c8a(&program, false);
    mcu.cpu_mut().write(COPCR, PCOPE | 0x01);

    mcu.run(4 << 17);
    assert_eq!(mcu.cpu().reset_pulses(), 0);
    assert_eq!(mcu.cpu().peek(COPCR) & COPF, 0);
}

#[test]
fn non_programmable_cop_follows_mask_option() {
    let mut enabled = m68hc705c8a(&[0x20, 0xFE], true);
    enabled.run((1 << 17) + 16);
    assert_eq!(enabled.cpu().reset_pulses(), 1);

    let mut disabled = m68hc705c8a(&[0x20, 0xFE], false);
    disabled.run(4 << 17);
    assert_eq!(disabled.cpu().reset_pulses(), 0);
}

#[test]
fn copr_write_services_the_non_programmable_cop() {
    // loop: clr $1FF0 (ext store of 0); bra loop
    let program = [0x4F, 0xC7, 0x1F, 0xF0, 0x20, 0xFB];
    let mut mcu = m68hc705c8a(&program, true);
    mcu.run(4 << 17);
    assert_eq!(mcu.cpu().reset_pulses(), 0);
}
