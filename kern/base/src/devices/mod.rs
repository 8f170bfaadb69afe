//! Early boot output devices.

pub mod console;
pub mod vga_text;

/// A byte-at-a-time transmitter the console can mirror its output to.
///
/// [`crate::arch::x86_64::io::uart::Uart16550`] implements this with a blocking busy-wait.
/// Callers only depend on the trait, so an interrupt-driven or bounded-wait driver can take
/// its place later.
pub trait SerialSink {
    fn put_char(&mut self, byte: u8);
}

impl<S: SerialSink + ?Sized> SerialSink for &mut S {
    fn put_char(&mut self, byte: u8) {
        (**self).put_char(byte)
    }
}
