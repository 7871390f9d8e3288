use crate::bus::*;
use crate::cpu::m6805::variant::{MemoryRegion, RegionKind};
use crate::cpu::m6805::{self, M6805, Variant};
use crate::cpu::*;
use crate::error::{EmuError, Result};
use crate::image::Image;
use crate::memory::{Ram, Rom};
use crate::*;
use std::num::Wrapping;

/// Value read from addresses nothing answers
const OPEN_BUS: u8 = 0xFF;

enum Memory {
    Ram(EmuRef<Ram<m6805::Address, m6805::Word>>),
    Rom(EmuRef<Rom<m6805::Address, m6805::Word>>),
}
impl Memory {
    fn load(&self, offset: usize, bytes: &[u8]) {
        match self {
            Self::Ram(ram) => ram.borrow_mut().load(offset, bytes),
            Self::Rom(rom) => rom.borrow_mut().load(offset, bytes),
        }
    }
}

/// A single-chip 6805 family microcontroller with its on-chip memories
pub struct Mcu<'a> {
    cpu: M6805<'a>,
    bus: EmuRef<Bus<'a, m6805::Address, m6805::Word>>,
    memories: Vec<(MemoryRegion, Memory)>,
    /// Input clock in Hz
    clock: u64,
    total_cycles: u64,
    trace: bool,
}
impl<'a> Mcu<'a> {
    pub fn new(variant: Variant, clock: u64) -> Self {
        let config = variant.configuration();

        let bus = Bus::create();
        let mut memories = Vec::with_capacity(config.memory_map.len());
        {
            let mut bus_borrow = bus.borrow_mut();
            bus_borrow.set_unmapped_value(Wrapping(OPEN_BUS));
            for region in config.memory_map.iter() {
                let range = AddressRange::new(Wrapping(region.start), Wrapping(region.end));
                let memory = match region.kind {
                    RegionKind::Ram => {
                        let ram = make_ref(Ram::with_range(range));
                        bus_borrow.add_component(clone_ref(&ram) as BusRef<_, _>);
                        Memory::Ram(ram)
                    }
                    RegionKind::Rom => {
                        let rom = make_ref(Rom::with_range(range));
                        bus_borrow.add_component(clone_ref(&rom) as BusRef<_, _>);
                        Memory::Rom(rom)
                    }
                };
                memories.push((*region, memory));
            }
        }

        let cpu = M6805::new(variant, clone_ref(&bus));

        Self {
            cpu,
            bus,
            memories,
            clock,
            total_cycles: 0,
            trace: false,
        }
    }

    #[inline]
    pub fn cpu(&self) -> &M6805<'a> {
        &self.cpu
    }

    #[inline]
    pub fn cpu_mut(&mut self) -> &mut M6805<'a> {
        &mut self.cpu
    }

    #[inline]
    pub fn bus(&self) -> &EmuRef<Bus<'a, m6805::Address, m6805::Word>> {
        &self.bus
    }

    #[inline]
    pub fn set_trace(&mut self, trace: bool) {
        self.trace = trace;
    }

    /// Copies an image into the on-chip memories, ROM included.
    ///
    /// Bytes outside the address space are an error, bytes that fall in unmapped holes are skipped.
    pub fn load(&mut self, image: &Image) -> Result<()> {
        let config = self.cpu.configuration();
        let width = config.address_width;
        let limit = 1u64 << width;

        for segment in image.segments.iter() {
            if segment.end() > limit {
                return Err(EmuError::AddressOutOfRange {
                    address: (segment.end() - 1).min(u32::MAX as u64) as u32,
                    width,
                });
            }

            let mut placed = 0usize;
            for (region, memory) in self.memories.iter() {
                let start = (segment.address as u64).max(region.start as u64);
                let end = segment.end().min(region.end as u64 + 1);
                if start >= end {
                    continue;
                }
                let offset = (start - segment.address as u64) as usize;
                let data = &segment.data[offset..offset + (end - start) as usize];
                memory.load((start - region.start as u64) as usize, data);
                placed += data.len();
            }

            if placed < segment.data.len() {
                tracing::warn!(
                    target: "m6805",
                    "{} byte(s) of the segment at {:04X} fall outside on-chip memory",
                    segment.data.len() - placed,
                    segment.address
                );
            }
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        self.cpu.reset();
        self.total_cycles = 0;
    }

    #[inline]
    pub fn set_input(&mut self, line: InputLine, state: LineState) -> Result<()> {
        self.cpu.set_input(line, state)
    }

    #[inline]
    pub fn set_port_input(&mut self, port: usize, level: u8) {
        self.cpu.set_port_input(port, level);
    }

    /// Runs for at least `cycles` machine cycles and returns the number actually run
    pub fn run(&mut self, cycles: u64) -> u64 {
        let mut run = 0;
        if self.trace {
            while run < cycles {
                let pc = self.cpu.pc();
                match self.cpu.disassemble_at(pc) {
                    Ok(disassembly) => tracing::trace!(
                        target: "m6805",
                        "{:04X}: {:<16} A={:02X} X={:02X} S={:04X} CC={}",
                        pc,
                        disassembly.text,
                        self.cpu.a(),
                        self.cpu.x(),
                        self.cpu.s(),
                        self.cpu.flags_string()
                    ),
                    Err(error) => tracing::trace!(target: "m6805", "{:04X}: {}", pc, error),
                }
                run += self.cpu.step() as u64;
            }
        } else {
            while run < cycles {
                let budget = (cycles - run).min(i32::MAX as u64) as i32;
                run += self.cpu.run(budget) as u64;
            }
        }
        self.total_cycles += run;
        run
    }

    #[inline]
    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    /// Time covered by the cycles run since reset, in seconds
    pub fn elapsed_seconds(&self) -> f64 {
        let clocks = self.cpu.cycles_to_clocks(self.total_cycles);
        if self.clock == 0 {
            0.0
        } else {
            clocks as f64 / self.clock as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Segment;

    #[test]
    fn loads_into_rom_and_skips_holes() {
        let mut mcu = Mcu::new(Variant::M68HC05C4, 4_000_000);
        let image = Image {
            segments: vec![
                Segment {
                    address: 0x1FFE,
                    data: vec![0x01, 0x00],
                },
                Segment {
                    address: 0x10FE,
                    data: vec![0x9D, 0x9D, 0x9D, 0x9D],
                },
            ],
            entry: None,
            header: None,
        };
        mcu.load(&image).unwrap();
        mcu.reset();
        assert_eq!(mcu.cpu().pc(), 0x0100);
        assert_eq!(mcu.cpu().peek(0x10FF), 0x9D);
        assert_eq!(mcu.cpu().peek(0x1100), OPEN_BUS);

        // ROM is not writable by the program
        mcu.cpu_mut().write(0x10FF, 0x00);
        assert_eq!(mcu.cpu().peek(0x10FF), 0x9D);
    }

    #[test]
    fn rejects_images_beyond_the_address_space() {
        let mut mcu = Mcu::new(Variant::M68705P3, 4_000_000);
        let image = Image::from_binary(vec![0; 0x10], 0x07F8);
        assert!(matches!(
            mcu.load(&image),
            Err(EmuError::AddressOutOfRange { address: 0x0807, width: 11 })
        ));
    }

    #[test]
    fn segment_at_the_top_of_32_bit_space_is_rejected() {
        let mut mcu = Mcu::new(Variant::HD63705, 4_000_000);
        let image = Image::from_binary(vec![0x01, 0x02], 0xFFFF_FFFF);
        assert!(matches!(
            mcu.load(&image),
            Err(EmuError::AddressOutOfRange { address: 0xFFFF_FFFF, width: 16 })
        ));
    }

    #[test]
    fn run_accounts_time() {
        let mut mcu = Mcu::new(Variant::M6805, 4_000_000);
        // bra *
        let image = Image::from_binary(vec![0x20, 0xFE], 0x0100);
        mcu.load(&image).unwrap();
        mcu.load(&Image::from_binary(vec![0x01, 0x00], 0x0FFE)).unwrap();
        mcu.reset();

        let run = mcu.run(1000);
        assert!(run >= 1000);
        assert_eq!(mcu.cpu().pc(), 0x0100);
        assert_eq!(mcu.total_cycles(), run);
        assert!((mcu.elapsed_seconds() - run as f64 * 4.0 / 4_000_000.0).abs() < 1e-12);
    }
}
