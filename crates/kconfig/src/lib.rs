//! Build-time configuration of the early console.
//!
//! The kernel cannot read files, so its build script loads a TOML file through this crate,
//! validates it and renders the values as Rust constants (see [`Config::to_rust_source`]).
//!
//! ```toml
//! [serial]
//! port = 0x3F8
//! baud = 115200
//!
//! [console]
//! vga_base = "0xB8000"
//! foreground = 7
//! background = 0
//! dual_output = true
//! scroll_on_wrap = false
//!
//! [boot]
//! higher_half_base = "0xFFFF_FFFF_8000_0000"
//! halt_on_lower_half = false
//!
//! [log]
//! level = "info"
//! ```

use std::{fmt::Write as _, path::Path};

use serde_derive::{Deserialize, Serialize};

mod address;
mod error;

pub use address::Address;
pub use error::{ConfigError, Result};

/// Rate produced by a UART divisor of 1.
pub const UART_CLOCK_HZ: u32 = 115_200;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub serial: SerialConfig,
    pub console: ConsoleConfig,
    pub boot: BootConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SerialConfig {
    /// I/O base of the UART
    pub port: u16,
    pub baud: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: 0x3F8,
            baud: 115_200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsoleConfig {
    /// Physical address of the VGA text buffer
    pub vga_base: Address,
    pub foreground: u8,
    pub background: u8,
    /// Mirror console output to the serial line from the start
    pub dual_output: bool,
    /// Scroll when a full last row wraps, instead of pinning the cursor to that row
    pub scroll_on_wrap: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            vga_base: Address(0xB8000),
            foreground: 7,
            background: 0,
            dual_output: true,
            scroll_on_wrap: false,
        }
    }
}

impl ConsoleConfig {
    /// The VGA attribute byte for the configured colours.
    pub fn attribute(&self) -> u8 {
        self.background << 4 | self.foreground
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BootConfig {
    /// Lowest address the kernel entry point may run from
    pub higher_half_base: Address,
    /// Stop booting when the entry point is below `higher_half_base`
    pub halt_on_lower_half: bool,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            higher_half_base: Address(0xFFFF_FFFF_8000_0000),
            halt_on_lower_half: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub level: LogLevel,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// The matching `log::LevelFilter` variant name.
    pub fn filter_name(self) -> &'static str {
        match self {
            Self::Off => "Off",
            Self::Error => "Error",
            Self::Warn => "Warn",
            Self::Info => "Info",
            Self::Debug => "Debug",
            Self::Trace => "Trace",
        }
    }
}

impl Config {
    /// Reads and validates the configuration at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Parses and validates a configuration. Missing keys take their defaults.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let baud = self.serial.baud;
        if baud == 0 || UART_CLOCK_HZ % baud != 0 || UART_CLOCK_HZ / baud > u32::from(u16::MAX) {
            return Err(ConfigError::InvalidBaud(baud));
        }

        let port = self.serial.port;
        if port == 0 || port > u16::MAX - 7 {
            return Err(ConfigError::InvalidPort(port));
        }

        for (key, address) in [
            ("console.vga_base", self.console.vga_base),
            ("boot.higher_half_base", self.boot.higher_half_base),
        ] {
            if !address.is_canonical() {
                return Err(ConfigError::NonCanonical {
                    key,
                    address: address.0,
                });
            }
        }

        for (key, value) in [
            ("console.foreground", self.console.foreground),
            ("console.background", self.console.background),
        ] {
            if value > 15 {
                return Err(ConfigError::InvalidColor { key, value });
            }
        }

        Ok(())
    }

    /// Writes the configuration to `path` as TOML.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = toml::to_string_pretty(self)?;
        std::fs::write(path, text).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Renders the configuration as constants for `include!`.
    ///
    /// The output names `log::LevelFilter`, so the including crate must depend on `log`.
    pub fn to_rust_source(&self) -> String {
        let mut out = String::from("// Generated by kconfig. Do not edit.\n\n");
        let mut constant = |name: &str, ty: &str, value: String| {
            // Writing into a String cannot fail
            let _ = writeln!(out, "pub const {name}: {ty} = {value};");
        };
        constant("SERIAL_PORT", "u16", format!("{:#X}", self.serial.port));
        constant("SERIAL_BAUD", "u32", self.serial.baud.to_string());
        constant("VGA_TEXT_BASE", "u64", format!("{:#X}", self.console.vga_base.0));
        constant("TEXT_ATTRIBUTE", "u8", format!("{:#04X}", self.console.attribute()));
        constant("DUAL_OUTPUT", "bool", self.console.dual_output.to_string());
        constant("SCROLL_ON_WRAP", "bool", self.console.scroll_on_wrap.to_string());
        constant("HIGHER_HALF_BASE", "u64", format!("{:#X}", self.boot.higher_half_base.0));
        constant("HALT_ON_LOWER_HALF", "bool", self.boot.halt_on_lower_half.to_string());
        constant(
            "LOG_LEVEL",
            "log::LevelFilter",
            format!("log::LevelFilter::{}", self.log.level.filter_name()),
        );
        out
    }
}

/// Writes the default configuration to `path`.
pub fn write_default(path: impl AsRef<Path>) -> Result<()> {
    Config::default().write(path)
}
