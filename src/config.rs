//! Configuration management with TOML, environment variables, and CLI overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Site origin every relative link is resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the stock listing page
    #[serde(default = "default_listing_path")]
    pub listing_path: String,

    /// Path segment that identifies a vehicle detail page
    #[serde(default = "default_detail_path_marker")]
    pub detail_path_marker: String,

    /// Dealer name appended to page titles (" em <city> - <dealer>")
    #[serde(default = "default_dealer_name")]
    pub dealer_name: String,

    /// JSON file the scrape run writes
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Fixed delay after each detail page request in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Random jitter added to delay (0 to this value)
    #[serde(default)]
    pub delay_jitter_ms: u64,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Stop after this many detail pages
    #[serde(default)]
    pub max_vehicles: Option<usize>,

    /// Model names recognised in addition to the built-in list
    #[serde(default)]
    pub extra_models: Vec<String>,

    /// Console output format
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_base_url() -> String {
    "https://eurocarveiculos.com".to_string()
}

fn default_listing_path() -> String {
    "/multipla".to_string()
}

fn default_detail_path_marker() -> String {
    "/carros/".to_string()
}

fn default_dealer_name() -> String {
    "Eurocar Multimarcas".to_string()
}

fn default_output() -> PathBuf {
    Path::new("dados").join("estoque_eurocar.json")
}

fn default_delay_ms() -> u64 {
    550
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            listing_path: default_listing_path(),
            detail_path_marker: default_detail_path_marker(),
            dealer_name: default_dealer_name(),
            output: default_output(),
            delay_ms: default_delay_ms(),
            delay_jitter_ms: 0,
            timeout_secs: default_timeout_secs(),
            proxy: None,
            max_vehicles: None,
            extra_models: Vec::new(),
            format: OutputFormat::Table,
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("eurocar-scraper").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(base_url) = std::env::var("EUROCAR_BASE_URL") {
            self.base_url = base_url;
        }

        if let Ok(output) = std::env::var("EUROCAR_OUTPUT") {
            self.output = PathBuf::from(output);
        }

        if let Ok(delay) = std::env::var("EUROCAR_DELAY") {
            if let Ok(d) = delay.parse() {
                self.delay_ms = d;
            }
        }

        if let Ok(proxy) = std::env::var("EUROCAR_PROXY") {
            self.proxy = Some(proxy);
        }

        self
    }
}

/// Output format for console results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use: table, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
