pub mod mcu;

pub use mcu::Mcu;
