mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./tubeforge.toml",
        "~/.config/tubeforge/config.toml",
        "/etc/tubeforge/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    for library in &config.libraries {
        if library.name.is_empty() {
            anyhow::bail!("Library at {:?} has no name", library.path);
        }
        if !library.path.exists() {
            tracing::warn!("Library path does not exist: {:?}", library.path);
        }
    }

    if config.sponsorblock.enabled && config.sponsorblock.api_url.is_empty() {
        anyhow::bail!("Skip-segment lookup is enabled but no API URL is set");
    }

    Ok(())
}
