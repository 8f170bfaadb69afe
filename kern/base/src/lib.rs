//! PAN early boot base
//!
//! The output path that exists before anything else in the kernel does: a VGA text renderer,
//! a polled 16550 UART, the console that routes text to both, and the boot self checks that
//! report through it.
#![no_std]

pub mod arch;
pub mod boot;
pub mod devices;
pub mod util;
