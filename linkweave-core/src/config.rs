use crate::error::Result;
use linkweave_engine::EngineConfig;
use std::fs;
use std::path::Path;
use tracing::debug;

pub const DEFAULT_CONFIG_DIR: &str = "~/.config/linkweave/";
pub const CONFIG_FILE: &str = "config.json";
pub const DATABASE_FILE: &str = "linkweave.db";

/// Read and validate a config file. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<EngineConfig> {
    if !path.exists() {
        debug!("No config at {}, using defaults", path.display());
        return Ok(EngineConfig::default());
    }

    let raw = fs::read_to_string(path)?;
    let config: EngineConfig = serde_json::from_str(&raw)?;
    config.validate()?;
    debug!("Loaded config from {}", path.display());
    Ok(config)
}

pub fn save_config(path: &Path, config: &EngineConfig) -> Result<()> {
    config.validate()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(config)?)?;
    Ok(())
}
