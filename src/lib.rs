#[macro_use]
extern crate bitflags;

use std::cell::RefCell;
use std::rc::Rc;

pub mod bus;
pub mod config;
pub mod cpu;
pub mod error;
pub mod image;
pub mod memory;
pub mod system;
pub mod types;
pub mod util;

pub use error::{EmuError, Result};

pub type EmuRef<T> = Rc<RefCell<T>>;

#[inline]
pub fn make_ref<T>(value: T) -> EmuRef<T> {
    Rc::new(RefCell::new(value))
}

#[inline]
pub fn clone_ref<T: ?Sized>(r: &EmuRef<T>) -> EmuRef<T> {
    Rc::clone(r)
}
