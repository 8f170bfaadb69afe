//! Host-side stand-ins for the hardware the early console drives.
//!
//! Everything here records what the code under test did so assertions can be made afterwards.
//! Handles are cheap to clone and share their state, so a test can keep one and give the
//! other to the driver.

use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
    rc::Rc,
};

use pan_base::{
    arch::x86_64::io::{PortIo, uart::LineStatus},
    devices::{
        SerialSink,
        vga_text::{CharCell, ColorCode, GRID_CELLS, TextRenderer, WIDTH},
    },
};
use volatile::VolatileSlice;

/// Line status of a UART with nothing left to send.
pub const IDLE_LINE_STATUS: u8 = LineStatus::OUTPUT_EMPTY.bits() | LineStatus::TRANSMITTER_EMPTY.bits();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortAccess {
    Read(u16),
    Write(u16, u8),
}

#[derive(Default)]
struct BusState {
    accesses: Vec<PortAccess>,
    replies: HashMap<u16, VecDeque<u8>>,
}

/// An I/O port space that logs every access.
///
/// Reads return queued replies for the port first, then [`IDLE_LINE_STATUS`].
#[derive(Clone, Default)]
pub struct MockPortBus {
    state: Rc<RefCell<BusState>>,
}

impl MockPortBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `values` to be returned by the next reads of `port`.
    pub fn queue_reads(&self, port: u16, values: impl IntoIterator<Item = u8>) {
        self.state.borrow_mut().replies.entry(port).or_default().extend(values);
    }

    pub fn accesses(&self) -> Vec<PortAccess> {
        self.state.borrow().accesses.clone()
    }

    pub fn clear(&self) {
        self.state.borrow_mut().accesses.clear();
    }
}

impl PortIo for MockPortBus {
    fn read_u8(&mut self, port: u16) -> u8 {
        let mut state = self.state.borrow_mut();
        state.accesses.push(PortAccess::Read(port));
        state
            .replies
            .get_mut(&port)
            .and_then(VecDeque::pop_front)
            .unwrap_or(IDLE_LINE_STATUS)
    }

    fn write_u8(&mut self, port: u16, value: u8) {
        self.state.borrow_mut().accesses.push(PortAccess::Write(port, value));
    }
}

/// A serial sink that keeps everything it was given.
#[derive(Clone, Default)]
pub struct RecordingSerial {
    bytes: Rc<RefCell<Vec<u8>>>,
}

impl RecordingSerial {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.borrow().clone()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes.borrow()).into_owned()
    }
}

impl SerialSink for RecordingSerial {
    fn put_char(&mut self, byte: u8) {
        self.bytes.borrow_mut().push(byte);
    }
}

/// Heap-backed stand-in for the VGA text buffer.
///
/// Starts out filled with NUL cells, like memory nobody has initialized yet.
pub struct TestGrid {
    cells: Vec<CharCell>,
}

impl TestGrid {
    pub fn new() -> Self {
        Self {
            cells: vec![CharCell::new(0, ColorCode::from_raw(0)); GRID_CELLS],
        }
    }

    pub fn renderer(&mut self, color: ColorCode) -> TextRenderer<'_> {
        TextRenderer::new(VolatileSlice::from_slice_mut(&mut self.cells), color)
    }
}

impl Default for TestGrid {
    fn default() -> Self {
        Self::new()
    }
}

/// The glyphs of `row` with trailing blanks removed.
pub fn row_text(screen: &TextRenderer<'_>, row: usize) -> String {
    let text: String = (0..WIDTH).map(|col| screen.cell(row, col).glyph() as char).collect();
    text.trim_end_matches(' ').to_owned()
}

/// Whether every cell from `from_col` to the end of `row` is a blank in the renderer's colour.
pub fn row_is_blank_from(screen: &TextRenderer<'_>, row: usize, from_col: usize) -> bool {
    let blank = CharCell::blank(screen.color());
    (from_col..WIDTH).all(|col| screen.cell(row, col) == blank)
}
