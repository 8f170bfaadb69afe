pub mod hex;
pub mod logger;
