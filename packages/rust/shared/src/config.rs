//! Application configuration for Monotone.
//!
//! User config lives at `~/.monotone/monotone.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{MonotoneError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "monotone.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".monotone";

// ---------------------------------------------------------------------------
// Config structs (matching monotone.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where tutorial content comes from.
    #[serde(default)]
    pub content: ContentConfig,

    /// Markdown rendering options.
    #[serde(default)]
    pub render: RenderConfig,

    /// Terminal viewer settings.
    #[serde(default)]
    pub ui: UiConfig,
}

/// Content backend selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentSource {
    /// Tutorials compiled into the binary.
    #[default]
    Bundled,
    /// `<dir>/<id>.md` on the local filesystem.
    Dir,
    /// `<base_url>/<id>.md` over HTTP.
    Http,
}

impl std::str::FromStr for ContentSource {
    type Err = MonotoneError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bundled" => Ok(Self::Bundled),
            "dir" => Ok(Self::Dir),
            "http" => Ok(Self::Http),
            other => Err(MonotoneError::config(format!(
                "unknown content source '{other}': expected 'bundled', 'dir', or 'http'"
            ))),
        }
    }
}

/// `[content]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Which backend resolves tutorial bodies.
    #[serde(default)]
    pub source: ContentSource,

    /// Directory holding `<id>.md` files (source = "dir").
    #[serde(default = "default_content_dir")]
    pub dir: String,

    /// Base URL serving `<id>.md` files (source = "http").
    #[serde(default)]
    pub base_url: String,

    /// Transport timeout in milliseconds; exceeded loads report `Unavailable`.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Optional TOML index replacing the bundled one.
    #[serde(default)]
    pub index_path: String,
}

impl ContentConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The index override path, if one is configured.
    pub fn index_override(&self) -> Option<&Path> {
        if self.index_path.is_empty() {
            None
        } else {
            Some(Path::new(&self.index_path))
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            source: ContentSource::default(),
            dir: default_content_dir(),
            base_url: String::new(),
            timeout_ms: default_timeout_ms(),
            index_path: String::new(),
        }
    }
}

fn default_content_dir() -> String {
    "tutorials".into()
}
fn default_timeout_ms() -> u64 {
    5000
}

/// `[render]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_true")]
    pub tables: bool,

    #[serde(default = "default_true")]
    pub strikethrough: bool,

    #[serde(default = "default_true")]
    pub footnotes: bool,

    #[serde(default = "default_true")]
    pub task_lists: bool,

    #[serde(default)]
    pub smart_punctuation: bool,

    /// Emit raw HTML found in markdown as escaped text.
    /// Turn on when content does not come from a trusted source.
    #[serde(default)]
    pub escape_raw_html: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            tables: true,
            strikethrough: true,
            footnotes: true,
            task_lists: true,
            smart_punctuation: false,
            escape_raw_html: false,
        }
    }
}

fn default_true() -> bool {
    true
}

/// `[ui]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Event poll interval of the terminal viewer, in milliseconds.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
        }
    }
}

fn default_tick_ms() -> u64 {
    100
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.monotone/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| MonotoneError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.monotone/monotone.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| MonotoneError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        MonotoneError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    validate(&config)?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| MonotoneError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| MonotoneError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| MonotoneError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Reject settings that cannot work at runtime.
pub fn validate(config: &AppConfig) -> Result<()> {
    if config.content.source == ContentSource::Http && config.content.base_url.is_empty() {
        return Err(MonotoneError::config(
            "content.source is 'http' but content.base_url is empty",
        ));
    }
    if config.content.timeout_ms == 0 {
        return Err(MonotoneError::config("content.timeout_ms must be greater than 0"));
    }
    if config.ui.tick_ms == 0 {
        return Err(MonotoneError::config("ui.tick_ms must be greater than 0"));
    }
    Ok(())
}
