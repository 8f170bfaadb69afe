use std::{env, error::Error, fs, path::PathBuf};

use kconfig::Config;

const MANIFEST_DIR: &str = env!("CARGO_MANIFEST_DIR");

fn main() -> Result<(), Box<dyn Error>> {
    let config_file = env::var("PAN_CONFIG").unwrap_or_else(|_| format!("{MANIFEST_DIR}/kernel.toml"));
    println!("cargo:rerun-if-env-changed=PAN_CONFIG");
    println!("cargo:rerun-if-changed={config_file}");

    let config = Config::from_file(&config_file)?;
    let out_file = PathBuf::from(env::var("OUT_DIR")?).join("kconfig.rs");
    fs::write(out_file, config.to_rust_source())?;
    Ok(())
}
