use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};


/// Config file locations tried in order when no explicit path is given.
const DEFAULT_PATHS: [&str; 2] = ["./quill.toml", "~/.config/quill/config.toml"];

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub stream: StreamConfig,
}

/// Rendering options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Syntect theme used for fenced code blocks
    pub theme: String,
    /// Emit a full HTML page instead of a fragment
    pub standalone: bool,
    /// Page title in standalone mode
    pub title: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            standalone: false,
            title: "quill".to_string(),
        }
    }
}

/// Stream intake options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Minimum milliseconds between re-renders while streaming. The parsing
    /// core reparses the whole buffer per update, so the caller throttles.
    pub throttle_ms: u64,
    /// Treat input lines as SSE events instead of raw text
    pub events: bool,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            throttle_ms: 150,
            events: false,
        }
    }
}

impl Config {
    /// Load configuration from the given path, or from the default search
    /// locations. Defaults are returned when no config file exists; an
    /// explicitly given path must exist.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let path = match config_path {
            Some(path) => {
                let expanded = shellexpand::tilde(path);
                let p = PathBuf::from(expanded.as_ref());
                if !p.exists() {
                    anyhow::bail!("config file not found: {}", path);
                }
                Some(p)
            }
            None => DEFAULT_PATHS
                .iter()
                .map(|path| PathBuf::from(shellexpand::tilde(path).as_ref()))
                .find(|p| p.exists()),
        };

        match path {
            Some(p) => {
                let content = std::fs::read_to_string(&p)
                    .with_context(|| format!("failed to read config file: {}", p.display()))?;
                let config: Config = toml::from_str(&content)
                    .with_context(|| format!("invalid config file: {}", p.display()))?;
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Write the configuration as pretty TOML.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("failed to write config file: {}", path.display()))?;
        Ok(())
    }
}
