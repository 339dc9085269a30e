//! Config Command
//!
//! Inspect and initialize configuration files.

use crate::cli::output::Output;
use crate::config::ConfigLoader;
use crate::types::Result;

pub fn show(as_json: bool) -> Result<()> {
    ConfigLoader::show_config(as_json)
}

pub fn path() {
    ConfigLoader::show_path();
}

pub fn init(global: bool, force: bool) -> Result<()> {
    let path = ConfigLoader::init(global, force)?;
    Output::new().success(&format!("Wrote default config to {}", path.display()));
    Ok(())
}
