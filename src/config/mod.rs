mod types;

pub use types::*;

use std::path::Path;

use avview_util::{Error, Result};

/// Largest buffer alignment accepted from configuration.
pub const MAX_ALIGN: i32 = 1024;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::config(format!("failed to read {}: {e}", path.display())))?;
    Config::from_toml_str(&content)
}

impl Config {
    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| Error::config(format!("invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        validate_align("frame_align", self.frame_align)?;
        validate_align("sample_align", self.sample_align)?;
        Ok(())
    }
}

fn validate_align(name: &str, value: i32) -> Result<()> {
    if value == 0 {
        return Ok(());
    }
    if value < 0 || value > MAX_ALIGN || value & (value - 1) != 0 {
        return Err(Error::config(format!(
            "{name} must be 0 or a power of two up to {MAX_ALIGN}, got {value}"
        )));
    }
    Ok(())
}
