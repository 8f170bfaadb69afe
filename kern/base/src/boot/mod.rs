//! Boot-time self checks.

use thiserror::Error;

use crate::{
    devices::{SerialSink, console::Console},
    util::hex::format_hex64,
};

/// Start of the kernel text mapping in the higher half.
pub const KERNEL_TEXT_BASE: u64 = 0xFFFF_FFFF_8000_0000;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("kernel entry {address:#x} lies below the higher-half base {threshold:#x}")]
pub struct LowerHalfError {
    pub address: u64,
    pub threshold: u64,
}

/// Reports on `console` whether `address` lies at or above `threshold`.
///
/// Both are compared as plain 64-bit values; neither has to be canonical.
///
/// The report is always written; the error only carries the verdict back so the caller can
/// decide whether a kernel running from the wrong half may keep booting.
pub fn verify_higher_half<S: SerialSink>(
    console: &mut Console<'_, S>,
    address: u64,
    threshold: u64,
) -> Result<(), LowerHalfError> {
    console.write_dual(b"\n[kernel] kernel_main @ ");
    console.write_dual(format_hex64(address).as_bytes());
    console.write_dual(b"\n");

    if address >= threshold {
        console.write_dual(b"[kernel] OK: running from higher-half\n");
        Ok(())
    } else {
        console.write_dual(b"[kernel] FAIL: not in higher-half\n");
        Err(LowerHalfError { address, threshold })
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::string::ToString;

    use super::*;

    #[test]
    fn test_error_names_both_addresses() {
        let err = LowerHalfError {
            address: 0x10_0000,
            threshold: KERNEL_TEXT_BASE,
        };
        assert_eq!(
            err.to_string(),
            "kernel entry 0x100000 lies below the higher-half base 0xffffffff80000000"
        );
    }
}
