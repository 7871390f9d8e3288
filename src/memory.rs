use crate::bus::*;
use crate::types::HardwareInteger;
use crate::*;

pub struct Ram<TAddress, TWord>
where
    TAddress: HardwareInteger,
    TWord: HardwareInteger,
{
    data: Vec<TWord>,
    range: AddressRange<TAddress>,
}
impl<TAddress, TWord> Ram<TAddress, TWord>
where
    TAddress: HardwareInteger,
    TWord: HardwareInteger,
{
    pub fn new(size: TAddress, start_address: TAddress) -> Self {
        Self {
            data: vec![TWord::zero(); size.to_usize().unwrap_or(0)],
            range: AddressRange::new(start_address, start_address + size - TAddress::one()),
        }
    }

    #[inline]
    pub fn create(size: TAddress, start_address: TAddress) -> EmuRef<Self> {
        make_ref(Self::new(size, start_address))
    }

    /// Covers `range` inclusively, which may span the whole address space
    pub fn with_range(range: AddressRange<TAddress>) -> Self {
        let size = (range.end - range.start).to_usize().map_or(0, |size| size + 1);
        Self {
            data: vec![TWord::zero(); size],
            range,
        }
    }

    #[inline]
    pub fn range(&self) -> AddressRange<TAddress> {
        self.range
    }

    /// Copies `bytes` into the RAM starting at `offset`, dropping anything past the end
    pub fn load(&mut self, offset: usize, bytes: &[u8]) {
        load_into(&mut self.data, offset, bytes);
    }
}
impl<TAddress, TWord> BusComponent<TAddress, TWord> for Ram<TAddress, TWord>
where
    TAddress: HardwareInteger,
    TWord: HardwareInteger,
{
    #[inline]
    fn read_range(&self) -> Option<AddressRange<TAddress>> {
        Some(self.range)
    }
    #[inline]
    fn write_range(&self) -> Option<AddressRange<TAddress>> {
        Some(self.range)
    }

    #[inline]
    fn read(&mut self, address: TAddress) -> TWord {
        self.peek(address)
    }

    #[inline]
    fn write(&mut self, address: TAddress, data: TWord) {
        if let Some(cell) = address.to_usize().and_then(|i| self.data.get_mut(i)) {
            *cell = data;
        }
    }

    #[inline]
    fn peek(&self, address: TAddress) -> TWord {
        address
            .to_usize()
            .and_then(|i| self.data.get(i).copied())
            .unwrap_or_else(TWord::zero)
    }
}

/// Mask-programmed or EPROM memory, only writable through [`Rom::load`]
pub struct Rom<TAddress, TWord>
where
    TAddress: HardwareInteger,
    TWord: HardwareInteger,
{
    data: Vec<TWord>,
    range: AddressRange<TAddress>,
}
impl<TAddress, TWord> Rom<TAddress, TWord>
where
    TAddress: HardwareInteger,
    TWord: HardwareInteger,
{
    pub fn new(size: TAddress, start_address: TAddress) -> Self {
        Self {
            data: vec![TWord::zero(); size.to_usize().unwrap_or(0)],
            range: AddressRange::new(start_address, start_address + size - TAddress::one()),
        }
    }

    #[inline]
    pub fn create(size: TAddress, start_address: TAddress) -> EmuRef<Self> {
        make_ref(Self::new(size, start_address))
    }

    /// Covers `range` inclusively, which may span the whole address space
    pub fn with_range(range: AddressRange<TAddress>) -> Self {
        let size = (range.end - range.start).to_usize().map_or(0, |size| size + 1);
        Self {
            data: vec![TWord::zero(); size],
            range,
        }
    }

    #[inline]
    pub fn range(&self) -> AddressRange<TAddress> {
        self.range
    }

    pub fn load(&mut self, offset: usize, bytes: &[u8]) {
        load_into(&mut self.data, offset, bytes);
    }
}
impl<TAddress, TWord> BusComponent<TAddress, TWord> for Rom<TAddress, TWord>
where
    TAddress: HardwareInteger,
    TWord: HardwareInteger,
{
    #[inline]
    fn read_range(&self) -> Option<AddressRange<TAddress>> {
        Some(self.range)
    }
    #[inline]
    fn write_range(&self) -> Option<AddressRange<TAddress>> {
        None
    }

    #[inline]
    fn read(&mut self, address: TAddress) -> TWord {
        self.peek(address)
    }

    fn write(&mut self, _address: TAddress, _data: TWord) {}

    #[inline]
    fn peek(&self, address: TAddress) -> TWord {
        address
            .to_usize()
            .and_then(|i| self.data.get(i).copied())
            .unwrap_or_else(TWord::zero)
    }
}

fn load_into<TWord: HardwareInteger>(data: &mut [TWord], offset: usize, bytes: &[u8]) {
    for (cell, byte) in data.iter_mut().skip(offset).zip(bytes) {
        *cell = TWord::truncate(*byte as u32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{u16w, u8w};
    use std::num::Wrapping;

    #[test]
    fn range_can_cover_the_whole_address_space() {
        let mut ram: Ram<u16w, u8w> =
            Ram::with_range(AddressRange::new(Wrapping(0x0000), Wrapping(0xFFFF)));
        ram.write(Wrapping(0xFFFF), Wrapping(0x5A));
        assert_eq!(ram.peek(Wrapping(0xFFFF)), Wrapping(0x5A));
        assert_eq!(ram.range().len(), Wrapping(0x0000));
    }

    #[test]
    fn rom_ignores_bus_writes() {
        let mut rom: Rom<u16w, u8w> = Rom::new(Wrapping(0x0010), Wrapping(0x0100));
        rom.load(2, &[0x12, 0x34]);
        rom.write(Wrapping(0x0002), Wrapping(0xFF));
        assert_eq!(rom.peek(Wrapping(0x0002)), Wrapping(0x12));
        assert_eq!(rom.read(Wrapping(0x0003)), Wrapping(0x34));
        assert_eq!(rom.write_range(), None);
    }
}
