//! PAN kernel entry
//!
//! Brings up the early console (UART first, then the VGA text grid), reports where the kernel
//! is running from and hands the console to the `log` facade.
#![no_std]

use core::{fmt::Write, panic::PanicInfo};

use pan_base::{
    arch::x86_64::{
        halt_loop,
        io::{
            PortBus,
            uart::{BaudDivisor, Uart16550},
        },
    },
    boot::verify_higher_half,
    devices::{
        console::Console,
        vga_text::{CharCell, ColorCode, GRID_CELLS, TextRenderer, WrapMode},
    },
    util::logger::ConsoleLogger,
};
use volatile::VolatileSlice;

mod kconfig {
    include!(concat!(env!("OUT_DIR"), "/kconfig.rs"));
}

type EarlyConsole = Console<'static, Uart16550<PortBus>>;

static LOGGER: ConsoleLogger<EarlyConsole> = ConsoleLogger::new();

const BANNER: &[u8] = b"PAN OS 64 BIT KERNEL INITIALIZED\n";

const SERIAL_DIVISOR: BaudDivisor = match BaudDivisor::for_baud(kconfig::SERIAL_BAUD) {
    Some(divisor) => divisor,
    None => panic!("configured baud rate has no UART divisor"),
};

/// Called by the bootstrap code once long mode and the higher-half mapping are up.
///
/// The boot protocol magic and info pointer are accepted but not interpreted yet.
#[unsafe(no_mangle)]
pub extern "C" fn kernel_main(_magic: u64, _info: u64) -> ! {
    let mut console = early_console();
    if kconfig::DUAL_OUTPUT {
        console.enable_dual_output();
    }
    console.write(BANNER);

    let entry = kernel_main as *const () as usize as u64;
    let verdict = verify_higher_half(&mut console, entry, kconfig::HIGHER_HALF_BASE);

    let dual = console.is_dual_output();
    if LOGGER.install(console, kconfig::LOG_LEVEL).is_err() {
        // Only reachable if something installed a logger before us, and then there is nowhere
        // left to report to
        halt_loop();
    }
    log::info!("early console up (serial mirror: {dual})");

    if let Err(err) = verdict {
        log::warn!("{err}");
        if kconfig::HALT_ON_LOWER_HALF {
            log::error!("refusing to continue outside the higher half");
            halt_loop();
        }
    }

    log::info!("nothing left to boot, halting");
    halt_loop()
}

fn early_console() -> EarlyConsole {
    // SAFETY: nothing else drives the configured UART this early
    let mut serial = unsafe { Uart16550::new(PortBus::new(), kconfig::SERIAL_PORT) }.with_divisor(SERIAL_DIVISOR);
    serial.init();

    // SAFETY: the text buffer is mapped by the bootstrap code and owned by the console from
    // here on
    let cells = unsafe { VolatileSlice::from_raw_parts_mut(kconfig::VGA_TEXT_BASE as *mut CharCell, GRID_CELLS) };
    let wrap = if kconfig::SCROLL_ON_WRAP {
        WrapMode::Scroll
    } else {
        WrapMode::Clamp
    };
    let mut screen = TextRenderer::new(cells, ColorCode::from_raw(kconfig::TEXT_ATTRIBUTE)).with_wrap_mode(wrap);
    screen.init();

    Console::new(screen, serial)
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    let reported = LOGGER
        .with_sink(|console| writeln!(console, "\n[kernel] PANIC: {info}"))
        .is_some();
    if !reported {
        // The console is not up yet, or the panic came from inside it
        // SAFETY: the console that owned this UART is either absent or stuck mid-write
        let mut serial = unsafe { Uart16550::new(PortBus::new(), kconfig::SERIAL_PORT) }.with_divisor(SERIAL_DIVISOR);
        serial.init();
        let _ = writeln!(serial, "\n[kernel] PANIC: {info}");
    }
    halt_loop()
}
