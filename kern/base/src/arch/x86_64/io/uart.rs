use core::fmt;

use bitflags::bitflags;

use super::PortIo;
use crate::devices::SerialSink;

/// I/O base of the first serial port.
pub const COM1: u16 = 0x3F8;

/// Rate at which a divisor of 1 clocks the line (1.8432 MHz crystal / 16).
pub const UART_CLOCK_HZ: u32 = 115_200;

/// Offsets from the base port for the UART registers.
const DATA_REG: u16 = 0; // Data Register (RW) / Divisor Latch Low (DLL) when DLAB=1
const INT_ENABLE_REG: u16 = 1; // Interrupt Enable Register (IER) / Divisor Latch High (DLH) when DLAB=1
const FIFO_CONTROL_REG: u16 = 2; // FIFO Control Register (FCR) (W) / Interrupt Identification Register (IIR) (R)
const LINE_CONTROL_REG: u16 = 3; // Line Control Register (LCR) (RW)
const MODEM_CONTROL_REG: u16 = 4; // Modem Control Register (MCR) (RW)
const LINE_STATUS_REG: u16 = 5; // Line Status Register (LSR) (R)
#[allow(dead_code)]
const MODEM_STATUS_REG: u16 = 6; // Modem Status Register (MSR) (R)
#[allow(dead_code)]
const SCRATCHPAD_REG: u16 = 7; // Scratchpad Register (SR) (RW)

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct InterruptEnable: u8 {
        const RECEIVED_DATA = 1 << 0;
        const TRANSMIT_EMPTY = 1 << 1;
        const LINE_STATUS = 1 << 2;
        const MODEM_STATUS = 1 << 3;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LineControl: u8 {
        const WORD_LENGTH_5 = 0b00;
        const WORD_LENGTH_6 = 0b01;
        const WORD_LENGTH_7 = 0b10;
        const WORD_LENGTH_8 = 0b11;
        const TWO_STOP_BITS = 1 << 2;
        const PARITY_ENABLE = 1 << 3;
        const EVEN_PARITY = 1 << 4;
        const STICK_PARITY = 1 << 5;
        const BREAK = 1 << 6;
        /// Divisor Latch Access Bit: registers 0 and 1 become the baud divisor
        const DLAB = 1 << 7;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FifoControl: u8 {
        const ENABLE = 1 << 0;
        const CLEAR_RECEIVE = 1 << 1;
        const CLEAR_TRANSMIT = 1 << 2;
        const DMA_MODE = 1 << 3;
        const TRIGGER_4 = 0b01 << 6;
        const TRIGGER_8 = 0b10 << 6;
        const TRIGGER_14 = 0b11 << 6;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ModemControl: u8 {
        const DATA_TERMINAL_READY = 1 << 0;
        const REQUEST_TO_SEND = 1 << 1;
        const OUT1 = 1 << 2;
        /// Gates the IRQ line on PC hardware; inert while IER is zero
        const OUT2 = 1 << 3;
        const LOOPBACK = 1 << 4;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LineStatus: u8 {
        const DATA_READY = 1 << 0;
        const OVERRUN_ERROR = 1 << 1;
        const PARITY_ERROR = 1 << 2;
        const FRAMING_ERROR = 1 << 3;
        const BREAK_INTERRUPT = 1 << 4;
        /// Transmit holding register empty
        const OUTPUT_EMPTY = 1 << 5;
        const TRANSMITTER_EMPTY = 1 << 6;
        const FIFO_ERROR = 1 << 7;
    }
}

/// Baud rate divisor latched into DLL/DLH.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaudDivisor(u16);

impl BaudDivisor {
    pub const BAUD_115200: BaudDivisor = BaudDivisor(1);

    /// Returns the divisor for `baud`, or `None` when the rate is not an exact fraction of
    /// [`UART_CLOCK_HZ`] or the divisor does not fit the 16-bit latch.
    pub const fn for_baud(baud: u32) -> Option<Self> {
        if baud == 0 || UART_CLOCK_HZ % baud != 0 {
            return None;
        }
        let divisor = UART_CLOCK_HZ / baud;
        if divisor > u16::MAX as u32 {
            return None;
        }
        Some(Self(divisor as u16))
    }

    pub const fn get(self) -> u16 {
        self.0
    }
}

/// Polling driver for a 16550-compatible UART.
pub struct Uart16550<P: PortIo> {
    bus: P,
    port_base: u16,
    divisor: BaudDivisor,
}

impl<P: PortIo> Uart16550<P> {
    /// Creates a new `Uart16550` instance for the given base port, at 115200 baud.
    ///
    /// # Safety
    /// The given port must be a valid UART base address on `bus`, and no other driver may
    /// program the same registers.
    pub const unsafe fn new(bus: P, port_base: u16) -> Self {
        Uart16550 {
            bus,
            port_base,
            divisor: BaudDivisor::BAUD_115200,
        }
    }

    /// Uses `divisor` instead of the 115200 baud default on the next [`Self::init`].
    pub fn with_divisor(mut self, divisor: BaudDivisor) -> Self {
        self.divisor = divisor;
        self
    }

    /// Programs the line for polled transmission: 8N1, FIFOs on, no interrupts.
    ///
    /// Should only be called once, before the first byte is sent.
    pub fn init(&mut self) {
        // 1. Disable all interrupts
        self.write_reg(INT_ENABLE_REG, InterruptEnable::empty().bits());

        // 2. Enable DLAB so registers 0 and 1 address the divisor latch
        self.write_reg(LINE_CONTROL_REG, LineControl::DLAB.bits());

        // 3. Divisor, low byte then high byte
        let [low, high] = self.divisor.get().to_le_bytes();
        self.write_reg(DATA_REG, low);
        self.write_reg(INT_ENABLE_REG, high);

        // 4. Clear DLAB, 8 data bits, no parity, 1 stop bit
        self.write_reg(LINE_CONTROL_REG, LineControl::WORD_LENGTH_8.bits());

        // 5. Enable and clear both FIFOs, 14-byte receive threshold
        let fifo = FifoControl::ENABLE
            | FifoControl::CLEAR_RECEIVE
            | FifoControl::CLEAR_TRANSMIT
            | FifoControl::TRIGGER_14;
        self.write_reg(FIFO_CONTROL_REG, fifo.bits());

        // 6. DTR + RTS asserted, OUT2 set; IER stays zero so nothing is raised
        let modem =
            ModemControl::DATA_TERMINAL_READY | ModemControl::REQUEST_TO_SEND | ModemControl::OUT2;
        self.write_reg(MODEM_CONTROL_REG, modem.bits());
    }

    pub fn line_status(&mut self) -> LineStatus {
        LineStatus::from_bits_retain(self.read_reg(LINE_STATUS_REG))
    }

    /// Writes a single byte to the serial port, blocking until it can be sent.
    ///
    /// There is no timeout: a UART that never reports an empty holding register stalls the
    /// caller forever.
    pub fn put_char(&mut self, byte: u8) {
        while !self.line_status().contains(LineStatus::OUTPUT_EMPTY) {
            core::hint::spin_loop();
        }
        self.write_reg(DATA_REG, byte);
    }

    /// Sends `bytes` in order, stopping at the first NUL.
    pub fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes.iter().take_while(|&&byte| byte != 0) {
            self.put_char(byte);
        }
    }

    #[inline]
    fn read_reg(&mut self, reg: u16) -> u8 {
        self.bus.read_u8(self.port_base + reg)
    }

    #[inline]
    fn write_reg(&mut self, reg: u16, value: u8) {
        self.bus.write_u8(self.port_base + reg, value)
    }
}

impl<P: PortIo> SerialSink for Uart16550<P> {
    fn put_char(&mut self, byte: u8) {
        Uart16550::put_char(self, byte)
    }
}

impl<P: PortIo> fmt::Write for Uart16550<P> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write(s.as_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::{collections::VecDeque, vec, vec::Vec};

    use super::*;

    #[derive(Default)]
    struct Bus {
        writes: Vec<(u16, u8)>,
        reads: Vec<u16>,
        status: VecDeque<u8>,
    }

    impl PortIo for Bus {
        fn read_u8(&mut self, port: u16) -> u8 {
            self.reads.push(port);
            self.status.pop_front().unwrap_or(LineStatus::OUTPUT_EMPTY.bits())
        }

        fn write_u8(&mut self, port: u16, value: u8) {
            self.writes.push((port, value));
        }
    }

    #[test]
    fn test_init_register_sequence() {
        let mut bus = Bus::default();
        let mut uart = unsafe { Uart16550::new(&mut bus, COM1) };
        uart.init();
        assert_eq!(
            bus.writes,
            vec![
                (0x3F9, 0x00),
                (0x3FB, 0x80),
                (0x3F8, 0x01),
                (0x3F9, 0x00),
                (0x3FB, 0x03),
                (0x3FA, 0xC7),
                (0x3FC, 0x0B),
            ]
        );
        assert!(bus.reads.is_empty());
    }

    #[test]
    fn test_init_with_slower_divisor() {
        let mut bus = Bus::default();
        let divisor = BaudDivisor::for_baud(300).unwrap();
        let mut uart = unsafe { Uart16550::new(&mut bus, 0x2F8) }.with_divisor(divisor);
        uart.init();
        // 115200 / 300 = 384 = 0x0180
        assert_eq!(bus.writes[2], (0x2F8, 0x80));
        assert_eq!(bus.writes[3], (0x2F9, 0x01));
    }

    #[test]
    fn test_put_char_waits_for_holding_register() {
        let mut bus = Bus::default();
        bus.status.extend([0x00, 0x01, LineStatus::OUTPUT_EMPTY.bits()]);
        let mut uart = unsafe { Uart16550::new(&mut bus, COM1) };
        uart.put_char(b'K');
        assert_eq!(bus.reads, vec![0x3FD; 3]);
        assert_eq!(bus.writes, vec![(0x3F8, b'K')]);
    }

    #[test]
    fn test_write_stops_at_nul() {
        let mut bus = Bus::default();
        let mut uart = unsafe { Uart16550::new(&mut bus, COM1) };
        uart.write(b"ok\0ignored");
        let sent: Vec<u8> = bus.writes.iter().map(|&(_, byte)| byte).collect();
        assert_eq!(sent, b"ok");
    }

    #[test]
    fn test_baud_divisors() {
        assert_eq!(BaudDivisor::for_baud(115_200), Some(BaudDivisor::BAUD_115200));
        assert_eq!(BaudDivisor::for_baud(38_400).map(BaudDivisor::get), Some(3));
        assert_eq!(BaudDivisor::for_baud(9_600).map(BaudDivisor::get), Some(12));
        assert_eq!(BaudDivisor::for_baud(0), None);
        assert_eq!(BaudDivisor::for_baud(100_000), None);
        // 115200 / 1 does not fit the latch
        assert_eq!(BaudDivisor::for_baud(1), None);
    }
}
