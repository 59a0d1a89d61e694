use crate::data::indexed_table::DEFAULT_MAX_COLUMNS;
use crate::search_filter::MatchMode;
use anyhow::{Context, Result};
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub search: SearchConfig,
    pub theme: ThemeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Maximum number of columns taken from the first record
    pub max_columns: usize,

    /// Flush the screen if a row takes longer than this to fetch
    pub refresh_delay_ms: u64,

    /// Text shown before the search input
    pub prompt: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub match_mode: MatchMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Header colours, alternating per column
    pub header_colors: Vec<String>,

    /// Cell colours, alternating per column
    pub cell_colors: Vec<String>,

    pub selected_bold: bool,
    pub selected_reversed: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_columns: DEFAULT_MAX_COLUMNS,
            refresh_delay_ms: 100,
            prompt: "Search: ".to_string(),
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            header_colors: vec!["cyan".to_string(), "blue".to_string()],
            cell_colors: vec!["white".to_string(), "gray".to_string()],
            selected_bold: true,
            selected_reversed: false,
        }
    }
}

impl DisplayConfig {
    pub fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_delay_ms)
    }
}

impl ThemeConfig {
    pub fn header_palette(&self) -> Vec<Color> {
        parse_palette(&self.header_colors)
    }

    pub fn cell_palette(&self) -> Vec<Color> {
        parse_palette(&self.cell_colors)
    }
}

fn parse_palette(names: &[String]) -> Vec<Color> {
    let palette: Vec<Color> = names
        .iter()
        .map(|name| {
            Color::from_str(name).unwrap_or_else(|_| {
                warn!(target: "config", "Unknown colour {:?}, using terminal default", name);
                Color::Reset
            })
        })
        .collect();

    if palette.is_empty() {
        vec![Color::Reset]
    } else {
        palette
    }
}

impl Config {
    /// Load config from `path`, or from the default location.
    ///
    /// A missing file yields the defaults; nothing is written.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::get_config_path() {
                Ok(path) => path,
                Err(_) => return Ok(Self::default()),
            },
        };

        if !config_path.exists() {
            if path.is_some() {
                anyhow::bail!("Config file {} does not exist", config_path.display());
            }
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("Invalid config in {}", config_path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("tabview").join("config.toml"))
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        r##"# tabview configuration file
# Location: ~/.config/tabview/config.toml (Linux)
#           ~/Library/Application Support/tabview/config.toml (macOS)
#           %APPDATA%\tabview\config.toml (Windows)

[display]
# Only the first N columns of the first record are shown
max_columns = 5

# Flush the screen if fetching a single row takes longer than this (ms)
refresh_delay_ms = 100

# Text in front of the search input
prompt = "Search: "

[search]
# How search text is matched against cell values:
# "substring" (case-insensitive), "fuzzy" or "regex"
match_mode = "substring"

[theme]
# Colours alternate column by column
# Names: "black", "red", "green", "yellow", "blue", "magenta", "cyan", "gray",
#        "white", "light-blue", ... or "#rrggbb"
header_colors = ["cyan", "blue"]
cell_colors = ["white", "gray"]

# Highlight for the selected row
selected_bold = true
selected_reversed = false
"##
        .to_string()
    }
}
