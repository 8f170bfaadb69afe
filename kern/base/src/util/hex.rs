use core::fmt;

const DIGITS: &[u8; 16] = b"0123456789ABCDEF";
const PREFIX: &[u8; 2] = b"0x";
const LEN: usize = PREFIX.len() + 16;

/// A 64-bit value rendered as `0x` and sixteen uppercase hex digits.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct HexU64([u8; LEN]);

/// Renders every nibble of `value`, leading zeros included, most significant first.
pub const fn format_hex64(value: u64) -> HexU64 {
    let mut buf = [0u8; LEN];
    buf[0] = PREFIX[0];
    buf[1] = PREFIX[1];
    let mut i = 0;
    while i < 16 {
        let shift = (15 - i) * 4;
        buf[PREFIX.len() + i] = DIGITS[((value >> shift) & 0xF) as usize];
        i += 1;
    }
    HexU64(buf)
}

impl HexU64 {
    pub const fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        // SAFETY: the buffer only ever holds ASCII from `PREFIX` and `DIGITS`
        unsafe { core::str::from_utf8_unchecked(&self.0) }
    }
}

impl fmt::Display for HexU64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for HexU64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
