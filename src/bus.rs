use crate::types::HardwareInteger;
use crate::*;
use std::collections::HashMap;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct AddressRange<TAddress>
where
    TAddress: HardwareInteger,
{
    /// First address in the range
    pub start: TAddress,
    /// Last address in the range
    pub end: TAddress,
}
impl<TAddress> AddressRange<TAddress>
where
    TAddress: HardwareInteger,
{
    #[inline]
    pub const fn new(start: TAddress, end: TAddress) -> Self {
        Self { start, end }
    }

    #[inline]
    /// The length of the range
    pub fn len(&self) -> TAddress {
        self.end - self.start + TAddress::one()
    }

    /// Checks whether a given address falls within the range
    #[inline]
    pub fn contains(&self, address: TAddress) -> bool {
        (address >= self.start) && (address <= self.end)
    }
}

/// A hardware component that is connected to a bus
pub trait BusComponent<TAddress, TWord>
where
    TAddress: HardwareInteger,
    TWord: HardwareInteger,
{
    /// The CPU address range at which this component is active when reading
    fn read_range(&self) -> Option<AddressRange<TAddress>>;
    /// The CPU address range at which this component is active when writing
    fn write_range(&self) -> Option<AddressRange<TAddress>>;

    /// Reads from the component
    ///
    /// The address is given relative to the components address space (CPU address - read range start)
    fn read(&mut self, address: TAddress) -> TWord;
    /// Writes to the component
    ///
    /// The address is given relative to the components address space (CPU address - write range start)
    fn write(&mut self, address: TAddress, data: TWord);

    /// Reads from the component on behalf of a debugger.
    ///
    /// Must not change any component state. Components whose reads have
    /// side effects have to override this.
    fn peek(&self, address: TAddress) -> TWord;
}

pub type BusRef<'a, TAddress, TWord> = EmuRef<dyn BusComponent<TAddress, TWord> + 'a>;

pub type BusHandle = u32;

pub struct Bus<'a, TAddress, TWord>
where
    TAddress: HardwareInteger,
    TWord: HardwareInteger,
{
    components: HashMap<BusHandle, BusRef<'a, TAddress, TWord>>,
    next_handle: BusHandle,
    /// Value seen when no component answers a read
    unmapped: TWord,
}
impl<'a, TAddress, TWord> Bus<'a, TAddress, TWord>
where
    TAddress: HardwareInteger,
    TWord: HardwareInteger,
{
    #[inline]
    pub fn new() -> Self {
        Self {
            components: HashMap::new(),
            next_handle: 0,
            unmapped: TWord::zero(),
        }
    }

    #[inline]
    pub fn create() -> EmuRef<Self> {
        make_ref(Self::new())
    }

    #[inline]
    pub fn set_unmapped_value(&mut self, value: TWord) {
        self.unmapped = value;
    }

    #[inline]
    pub fn add_component(&mut self, component: BusRef<'a, TAddress, TWord>) -> BusHandle {
        let handle = self.next_handle;
        self.components.insert(handle, component);
        self.next_handle += 1;
        handle
    }

    pub fn read(&self, address: TAddress) -> TWord {
        let mut result = TWord::zero();
        let mut mapped = false;

        for (_, component_ref) in self.components.iter() {
            if let Ok(mut component) = component_ref.try_borrow_mut() {
                if let Some(range) = component.read_range() {
                    if range.contains(address) {
                        result |= component.read(address - range.start);
                        mapped = true;
                    }
                }
            }
        }

        if mapped {
            result
        } else {
            self.unmapped
        }
    }

    /// Side-effect free counterpart of [`Bus::read`]
    pub fn peek(&self, address: TAddress) -> TWord {
        let mut result = TWord::zero();
        let mut mapped = false;

        for (_, component_ref) in self.components.iter() {
            if let Ok(component) = component_ref.try_borrow() {
                if let Some(range) = component.read_range() {
                    if range.contains(address) {
                        result |= component.peek(address - range.start);
                        mapped = true;
                    }
                }
            }
        }

        if mapped {
            result
        } else {
            self.unmapped
        }
    }

    pub fn write(&self, address: TAddress, data: TWord) {
        for (_, component_ref) in self.components.iter() {
            if let Ok(mut component) = component_ref.try_borrow_mut() {
                if let Some(range) = component.write_range() {
                    if range.contains(address) {
                        component.write(address - range.start, data);
                    }
                }
            }
        }
    }
}
impl<'a, TAddress, TWord> Default for Bus<'a, TAddress, TWord>
where
    TAddress: HardwareInteger,
    TWord: HardwareInteger,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{Ram, Rom};
    use crate::types::{u16w, u8w};
    use std::num::Wrapping;

    #[test]
    fn unmapped_reads_return_open_bus_value() {
        let bus: Bus<u16w, u8w> = Bus::new();
        assert_eq!(bus.read(Wrapping(0x1234)), Wrapping(0));

        let mut bus: Bus<u16w, u8w> = Bus::new();
        bus.set_unmapped_value(Wrapping(0xFF));
        assert_eq!(bus.read(Wrapping(0x1234)), Wrapping(0xFF));
        assert_eq!(bus.peek(Wrapping(0x1234)), Wrapping(0xFF));
    }

    #[test]
    fn components_see_relative_addresses() {
        let mut bus: Bus<u16w, u8w> = Bus::new();
        let ram = Ram::<Wrapping<u16>, Wrapping<u8>>::create(Wrapping(0x10), Wrapping(0x50));
        bus.add_component(clone_ref(&ram) as BusRef<u16w, u8w>);

        bus.write(Wrapping(0x52), Wrapping(0xAB));
        assert_eq!(ram.borrow().peek(Wrapping(0x02)), Wrapping(0xAB));
        assert_eq!(bus.read(Wrapping(0x52)), Wrapping(0xAB));
    }

    #[test]
    fn rom_ignores_bus_writes() {
        let mut bus: Bus<u16w, u8w> = Bus::new();
        let rom = Rom::create(Wrapping(0x100), Wrapping(0x1000));
        rom.borrow_mut().load(0, &[0x12, 0x34]);
        bus.add_component(rom);

        bus.write(Wrapping(0x1000), Wrapping(0xFF));
        assert_eq!(bus.read(Wrapping(0x1000)), Wrapping(0x12));
        assert_eq!(bus.read(Wrapping(0x1001)), Wrapping(0x34));
    }
}
