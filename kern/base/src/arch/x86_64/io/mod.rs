//! x86 port-mapped I/O.
//!
//! Drivers never issue `in`/`out` themselves, they go through [`PortIo`], so the register
//! sequences can be exercised against a recording bus on the host.

pub mod uart;

/// Byte-wide access to the x86 I/O port space.
pub trait PortIo {
    /// Reads a byte from `port`.
    fn read_u8(&mut self, port: u16) -> u8;

    /// Writes `value` to `port`.
    fn write_u8(&mut self, port: u16, value: u8);
}

impl<P: PortIo + ?Sized> PortIo for &mut P {
    fn read_u8(&mut self, port: u16) -> u8 {
        (**self).read_u8(port)
    }

    fn write_u8(&mut self, port: u16, value: u8) {
        (**self).write_u8(port, value)
    }
}

/// The real I/O port space, accessed with `in al, dx` / `out dx, al`.
#[cfg(target_arch = "x86_64")]
#[derive(Debug)]
pub struct PortBus {
    _private: (),
}

#[cfg(target_arch = "x86_64")]
impl PortBus {
    /// # Safety
    ///
    /// Port writes have side effects on whatever device decodes the port. The caller must only
    /// hand this bus to drivers whose ports actually belong to them, and must not create a
    /// second bus that drives the same ports concurrently.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

#[cfg(target_arch = "x86_64")]
impl PortIo for PortBus {
    #[inline]
    fn read_u8(&mut self, port: u16) -> u8 {
        let mut port = ::x86_64::instructions::port::Port::<u8>::new(port);
        // SAFETY: port ownership is guaranteed by the creator of the bus
        unsafe { port.read() }
    }

    #[inline]
    fn write_u8(&mut self, port: u16, value: u8) {
        let mut port = ::x86_64::instructions::port::Port::<u8>::new(port);
        // SAFETY: port ownership is guaranteed by the creator of the bus
        unsafe { port.write(value) }
    }
}
