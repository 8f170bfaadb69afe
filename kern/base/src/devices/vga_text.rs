//! VGA text mode renderer.
//!
//! Writes glyphs straight into the 80x25 character grid the display controller scans out.
//! Every access to the grid is volatile.

use static_assertions::assert_eq_size;
use volatile::VolatileSlice;

/// Physical address of the colour text buffer.
pub const VGA_TEXT_BASE: u64 = 0xB8000;
pub const WIDTH: usize = 80;
pub const HEIGHT: usize = 25;
pub const GRID_CELLS: usize = WIDTH * HEIGHT;

const BLANK_GLYPH: u8 = b' ';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Color {
    Black = 0,
    Blue = 1,
    Green = 2,
    Cyan = 3,
    Red = 4,
    Magenta = 5,
    Brown = 6,
    LightGray = 7,
    DarkGray = 8,
    LightBlue = 9,
    LightGreen = 10,
    LightCyan = 11,
    LightRed = 12,
    Pink = 13,
    Yellow = 14,
    White = 15,
}

/// Attribute byte: background in the high nibble, foreground in the low nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct ColorCode(u8);

impl ColorCode {
    /// Light grey on black.
    pub const DEFAULT: ColorCode = ColorCode::new(Color::LightGray, Color::Black);

    pub const fn new(foreground: Color, background: Color) -> Self {
        Self((background as u8) << 4 | (foreground as u8))
    }

    pub const fn from_raw(attribute: u8) -> Self {
        Self(attribute)
    }

    pub const fn as_u8(self) -> u8 {
        self.0
    }
}

/// One grid cell as the hardware sees it: glyph in the low byte, attribute in the high byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct CharCell(u16);

assert_eq_size!(CharCell, u16);

impl CharCell {
    pub const fn new(glyph: u8, color: ColorCode) -> Self {
        Self((color.as_u8() as u16) << 8 | glyph as u16)
    }

    pub const fn blank(color: ColorCode) -> Self {
        Self::new(BLANK_GLYPH, color)
    }

    pub const fn glyph(self) -> u8 {
        self.0 as u8
    }

    pub const fn color(self) -> ColorCode {
        ColorCode((self.0 >> 8) as u8)
    }

    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

/// What happens when a printable character wraps past the last column of the last row.
///
/// A newline on the last row always scrolls. A wrap does not scroll unless asked to: by
/// default the cursor is pinned to the start of the last row and later output overwrites it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    #[default]
    Clamp,
    Scroll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub row: usize,
    pub col: usize,
}

/// Renders bytes into a text grid and owns its cursor.
pub struct TextRenderer<'a> {
    cells: &'a mut VolatileSlice<CharCell>,
    cursor: Cursor,
    color: ColorCode,
    wrap: WrapMode,
}

impl<'a> TextRenderer<'a> {
    /// Wraps `cells` as a `WIDTH` x `HEIGHT` grid drawn in `color`.
    ///
    /// The grid is left untouched until [`Self::init`] is called.
    ///
    /// # Panics
    ///
    /// Panics if `cells` does not hold exactly [`GRID_CELLS`] cells.
    pub fn new(cells: &'a mut VolatileSlice<CharCell>, color: ColorCode) -> Self {
        assert_eq!(cells.len(), GRID_CELLS, "text grid must be {WIDTH}x{HEIGHT}");
        Self {
            cells,
            cursor: Cursor::default(),
            color,
            wrap: WrapMode::default(),
        }
    }

    pub fn with_wrap_mode(mut self, wrap: WrapMode) -> Self {
        self.wrap = wrap;
        self
    }

    /// Blanks the whole grid and homes the cursor.
    pub fn init(&mut self) {
        self.cells.fill(CharCell::blank(self.color));
        self.cursor = Cursor::default();
    }

    pub fn write_char(&mut self, byte: u8) {
        if byte == b'\n' {
            self.cursor.col = 0;
            if self.cursor.row + 1 == HEIGHT {
                self.scroll();
            } else {
                self.cursor.row += 1;
            }
            return;
        }

        let index = self.cursor.row * WIDTH + self.cursor.col;
        self.cells[index].set(CharCell::new(byte, self.color));

        self.cursor.col += 1;
        if self.cursor.col == WIDTH {
            self.cursor.col = 0;
            if self.cursor.row + 1 < HEIGHT {
                self.cursor.row += 1;
            } else if self.wrap == WrapMode::Scroll {
                self.scroll();
            }
        }
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn color(&self) -> ColorCode {
        self.color
    }

    /// Volatile read of the cell at (`row`, `col`).
    ///
    /// # Panics
    ///
    /// Panics if the position lies outside the grid.
    pub fn cell(&self, row: usize, col: usize) -> CharCell {
        assert!(row < HEIGHT && col < WIDTH);
        self.cells[row * WIDTH + col].get()
    }

    /// Moves every row up by one and blanks the last row. The cursor row is unchanged.
    fn scroll(&mut self) {
        self.cells.copy_within(WIDTH.., 0);
        self.cells[(HEIGHT - 1) * WIDTH..].fill(CharCell::blank(self.color));
    }
}
