use core::fmt::Write;

use log::{LevelFilter, Log, SetLoggerError};
use spin::Mutex;

/// A `log` backend that writes every record to a text sink, normally the early console.
///
/// The sink lives behind a spin lock that is only ever `try_lock`ed from the logging path, so
/// a record emitted while the sink is already borrowed (for example by a panic raised in the
/// middle of a write) is dropped instead of deadlocking.
pub struct ConsoleLogger<W> {
    sink: Mutex<Option<W>>,
}

impl<W: Write + Send> ConsoleLogger<W> {
    pub const fn new() -> Self {
        Self { sink: Mutex::new(None) }
    }

    /// Hands `sink` to the logger and registers it as the global `log` backend.
    ///
    /// Fails if any logger, this one included, was already installed. The sink is dropped in
    /// that case.
    pub fn install(&'static self, sink: W, level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_logger(self)?;
        *self.sink.lock() = Some(sink);
        log::set_max_level(level);
        Ok(())
    }

    /// Runs `f` on the sink, if one is installed and not currently borrowed.
    pub fn with_sink<R>(&self, f: impl FnOnce(&mut W) -> R) -> Option<R> {
        self.sink.try_lock()?.as_mut().map(f)
    }
}

impl<W: Write + Send> Default for ConsoleLogger<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> Log for ConsoleLogger<W> {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let _ = self.with_sink(|sink| {
            writeln!(sink, "[{}] {}: {}", record.level(), record.target(), record.args())
        });
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::string::String;

    use super::*;

    static LOGGER: ConsoleLogger<String> = ConsoleLogger::new();

    #[test]
    fn test_records_reach_sink() {
        LOGGER.install(String::new(), LevelFilter::Info).unwrap();
        log::info!(target: "boot", "console up");
        log::debug!(target: "boot", "filtered");
        let text = LOGGER.with_sink(|sink| sink.clone()).unwrap();
        assert_eq!(text, "[INFO] boot: console up\n");

        assert!(LOGGER.install(String::new(), LevelFilter::Trace).is_err());

        // A record raised while the sink is held must be dropped, not spin on the lock
        let nested = LOGGER.with_sink(|sink| {
            log::error!(target: "boot", "raised mid-write");
            assert_eq!(LOGGER.with_sink(|_| ()), None);
            sink.push_str("raw\n");
        });
        assert_eq!(nested, Some(()));
        let text = LOGGER.with_sink(|sink| sink.clone()).unwrap();
        assert_eq!(text, "[INFO] boot: console up\nraw\n");
        assert!(!text.contains("mid-write"));
    }

    #[test]
    fn test_no_sink_before_install() {
        let logger: ConsoleLogger<String> = ConsoleLogger::new();
        assert_eq!(logger.with_sink(|sink| sink.len()), None);
        // Records without a sink are dropped silently
        logger.log(
            &log::Record::builder()
                .args(format_args!("lost"))
                .level(log::Level::Error)
                .build(),
        );
    }
}
