use num_traits::{
    FromPrimitive, Num, NumAssign, ToPrimitive, Unsigned, WrappingAdd, WrappingMul, WrappingShl,
    WrappingShr, WrappingSub,
};
use std::num::Wrapping;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

#[allow(non_camel_case_types)]
pub type u8w = Wrapping<u8>;
#[allow(non_camel_case_types)]
pub type u16w = Wrapping<u16>;

pub trait HardwareInteger:
    Sized
    + Clone
    + Copy
    + Num
    + NumAssign
    + FromPrimitive
    + ToPrimitive
    + Eq
    + PartialOrd
    + Ord
    + Unsigned
    + WrappingAdd
    + WrappingSub
    + WrappingMul
    + WrappingShl
    + WrappingShr
    + Not
    + BitAnd
    + BitOr
    + BitXor
    + BitAndAssign
    + BitOrAssign
    + BitXorAssign
{
    /// Builds a value from the low bits of `value`
    fn truncate(value: u32) -> Self;
}
impl HardwareInteger for u8w {
    #[inline]
    fn truncate(value: u32) -> Self {
        Wrapping(value as u8)
    }
}
impl HardwareInteger for u16w {
    #[inline]
    fn truncate(value: u32) -> Self {
        Wrapping(value as u16)
    }
}

/// Combines two bytes into a big-endian 16 bit value
#[inline]
pub const fn make_word(hi: u8, lo: u8) -> u16 {
    ((hi as u16) << 8) | (lo as u16)
}
