use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to render configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("serial.baud = {0} is not an exact divisor rate of 115200")]
    InvalidBaud(u32),

    #[error("serial.port = {0:#x} cannot hold an 8-register UART block")]
    InvalidPort(u16),

    #[error("{key} = {address:#x} is not a canonical x86_64 address")]
    NonCanonical { key: &'static str, address: u64 },

    #[error("{key} = {value} is not a VGA colour index (0-15)")]
    InvalidColor { key: &'static str, value: u8 },
}

pub type Result<T> = core::result::Result<T, ConfigError>;
