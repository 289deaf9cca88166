//! RON configuration for the `frameload` binary.
//!
//! Every field has a default, so a file only needs the values it changes:
//!
//! ```ron
//! (
//!     request_limit: 4,
//!     fetch: (request_timeout_ms: 5000),
//!     display: (autoload_images: false),
//! )
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use frameload_core::{Color, FrameSettings, LoaderConfig, DEFAULT_REQUEST_LIMIT};
use frameload_engine::FetchSettings;
use frameload_logging::loader_info;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    #[error("failed to read configuration {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub request_limit: usize,
    pub fetch: FetchConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct FetchConfig {
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub redirect_limit: usize,
    pub max_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct DisplayConfig {
    pub font_family: String,
    pub font_size: u16,
    pub text_color: (u8, u8, u8),
    pub link_color: (u8, u8, u8),
    pub visited_link_color: (u8, u8, u8),
    pub background_color: (u8, u8, u8),
    pub underline_links: bool,
    pub change_cursor_over_links: bool,
    pub autoload_images: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            request_limit: DEFAULT_REQUEST_LIMIT,
            fetch: FetchConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        let settings = FetchSettings::default();
        Self {
            connect_timeout_ms: settings.connect_timeout.as_millis() as u64,
            request_timeout_ms: settings.request_timeout.as_millis() as u64,
            redirect_limit: settings.redirect_limit,
            max_bytes: settings.max_bytes,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        FrameSettings::default().into()
    }
}

impl From<FrameSettings> for DisplayConfig {
    fn from(settings: FrameSettings) -> Self {
        let rgb = |Color(r, g, b): Color| (r, g, b);
        Self {
            font_family: settings.font_family,
            font_size: settings.font_size,
            text_color: rgb(settings.text_color),
            link_color: rgb(settings.link_color),
            visited_link_color: rgb(settings.visited_link_color),
            background_color: rgb(settings.background_color),
            underline_links: settings.underline_links,
            change_cursor_over_links: settings.change_cursor_over_links,
            autoload_images: settings.autoload_images,
        }
    }
}

impl AppConfig {
    pub fn loader_config(&self) -> LoaderConfig {
        let color = |(r, g, b): (u8, u8, u8)| Color(r, g, b);
        let display = &self.display;
        LoaderConfig {
            request_limit: self.request_limit,
            root_settings: FrameSettings {
                font_family: display.font_family.clone(),
                font_size: display.font_size,
                text_color: color(display.text_color),
                link_color: color(display.link_color),
                visited_link_color: color(display.visited_link_color),
                background_color: color(display.background_color),
                underline_links: display.underline_links,
                change_cursor_over_links: display.change_cursor_over_links,
                autoload_images: display.autoload_images,
            },
        }
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: Duration::from_millis(self.fetch.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.fetch.request_timeout_ms),
            redirect_limit: self.fetch.redirect_limit,
            max_bytes: self.fetch.max_bytes,
        }
    }
}

pub(crate) fn load(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = ron::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    loader_info!("Loaded configuration from {:?}", path);
    Ok(config)
}
