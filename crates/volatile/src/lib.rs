//! Volatile access wrappers for memory that is observed by hardware.
//!
//! Everything here funnels through `core::ptr::read_volatile` and `core::ptr::write_volatile`,
//! so the compiler can neither reorder nor elide the accesses.
#![cfg_attr(not(feature = "std"), no_std)]

pub mod cell;
pub mod slice;

pub use cell::VolatileCell;
pub use slice::VolatileSlice;
