//! The higher-half self check as it appears on both sinks.

use pan_base::{
    boot::{KERNEL_TEXT_BASE, LowerHalfError, verify_higher_half},
    devices::{console::Console, vga_text::ColorCode},
};
use pan_test::{RecordingSerial, TestGrid, row_text};

#[test]
fn test_entry_above_threshold_passes() {
    let serial = RecordingSerial::new();
    let mut grid = TestGrid::new();
    let mut screen = grid.renderer(ColorCode::DEFAULT);
    screen.init();
    let mut console = Console::new(screen, serial.clone());
    console.enable_dual_output();

    let entry = 0xFFFF_FFFF_8010_2ABC;
    assert_eq!(verify_higher_half(&mut console, entry, KERNEL_TEXT_BASE), Ok(()));

    assert_eq!(
        serial.text(),
        "\n[kernel] kernel_main @ 0xFFFFFFFF80102ABC\n[kernel] OK: running from higher-half\n"
    );
    assert_eq!(row_text(console.screen(), 0), "");
    assert_eq!(row_text(console.screen(), 1), "[kernel] kernel_main @ 0xFFFFFFFF80102ABC");
    assert_eq!(row_text(console.screen(), 2), "[kernel] OK: running from higher-half");
}

#[test]
fn test_entry_at_threshold_passes() {
    let serial = RecordingSerial::new();
    let mut grid = TestGrid::new();
    let mut screen = grid.renderer(ColorCode::DEFAULT);
    screen.init();
    let mut console = Console::new(screen, serial.clone());
    console.enable_dual_output();

    assert!(verify_higher_half(&mut console, KERNEL_TEXT_BASE, KERNEL_TEXT_BASE).is_ok());
    assert!(serial.text().contains("0xFFFFFFFF80000000\n[kernel] OK"));
}

#[test]
fn test_entry_below_threshold_fails() {
    let serial = RecordingSerial::new();
    let mut grid = TestGrid::new();
    let mut screen = grid.renderer(ColorCode::DEFAULT);
    screen.init();
    let mut console = Console::new(screen, serial.clone());
    console.enable_dual_output();

    let entry = 0x0010_0000;
    assert_eq!(
        verify_higher_half(&mut console, entry, KERNEL_TEXT_BASE),
        Err(LowerHalfError {
            address: entry,
            threshold: KERNEL_TEXT_BASE,
        })
    );
    assert_eq!(
        serial.text(),
        "\n[kernel] kernel_main @ 0x0000000000100000\n[kernel] FAIL: not in higher-half\n"
    );
    assert_eq!(row_text(console.screen(), 2), "[kernel] FAIL: not in higher-half");
}

#[test]
fn test_report_stays_on_screen_without_dual_output() {
    let serial = RecordingSerial::new();
    let mut grid = TestGrid::new();
    let mut screen = grid.renderer(ColorCode::DEFAULT);
    screen.init();
    let mut console = Console::new(screen, serial.clone());

    let _ = verify_higher_half(&mut console, 0x1000, KERNEL_TEXT_BASE);
    assert!(serial.bytes().is_empty());
    assert_eq!(row_text(console.screen(), 1), "[kernel] kernel_main @ 0x0000000000001000");
}

#[test]
fn test_non_canonical_entry_below_threshold_fails() {
    let serial = RecordingSerial::new();
    let mut grid = TestGrid::new();
    let mut screen = grid.renderer(ColorCode::DEFAULT);
    screen.init();
    let mut console = Console::new(screen, serial.clone());
    console.enable_dual_output();

    for entry in [0x0000_8000_0000_0000, 0x8000_0000_0000_0000] {
        assert_eq!(
            verify_higher_half(&mut console, entry, KERNEL_TEXT_BASE),
            Err(LowerHalfError {
                address: entry,
                threshold: KERNEL_TEXT_BASE,
            })
        );
    }
    assert_eq!(
        serial.text(),
        "\n[kernel] kernel_main @ 0x0000800000000000\n[kernel] FAIL: not in higher-half\n\
         \n[kernel] kernel_main @ 0x8000000000000000\n[kernel] FAIL: not in higher-half\n"
    );
}

#[test]
fn test_threshold_need_not_be_canonical() {
    let serial = RecordingSerial::new();
    let mut grid = TestGrid::new();
    let mut screen = grid.renderer(ColorCode::DEFAULT);
    screen.init();
    let mut console = Console::new(screen, serial);

    assert!(verify_higher_half(&mut console, u64::MAX, 0x8000_0000_0000_0000).is_ok());
    assert!(verify_higher_half(&mut console, 0x7FFF_FFFF_FFFF_FFFF, 0x8000_0000_0000_0000).is_err());
}
