//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::error::ScrapeError;
use crate::scrape::profiles::{Site, SiteProfile};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;
use url::Url;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Site profile name; auto-detected from the page host when unset
    #[serde(default)]
    pub site: Option<String>,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Base delay between requests in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Random jitter added to delay (0 to this value)
    #[serde(default = "default_delay_jitter_ms")]
    pub delay_jitter_ms: u64,

    /// Page load timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum number of records to return
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Filter: minimum price
    #[serde(default)]
    pub min_price: Option<f64>,

    /// Filter: maximum price
    #[serde(default)]
    pub max_price: Option<f64>,

    /// Filter: keywords that must appear in title
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Filter: keywords that must NOT appear in title
    #[serde(default)]
    pub exclude_keywords: Vec<String>,

    /// Override: ancestor levels read for link-scan candidates
    #[serde(default)]
    pub ancestor_depth: Option<usize>,

    /// Override: minimum product image size in pixels
    #[serde(default)]
    pub min_image_px: Option<u32>,

    /// Override: minimum title length in characters
    #[serde(default)]
    pub min_title_chars: Option<usize>,

    /// User-defined site profiles (`[[profiles]]` tables)
    #[serde(default)]
    pub profiles: Vec<SiteProfile>,
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_delay_jitter_ms() -> u64 {
    1500
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_results() -> usize {
    20
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: None,
            proxy: None,
            delay_ms: default_delay_ms(),
            delay_jitter_ms: default_delay_jitter_ms(),
            timeout_secs: default_timeout_secs(),
            max_results: default_max_results(),
            format: OutputFormat::Table,
            min_price: None,
            max_price: None,
            keywords: Vec::new(),
            exclude_keywords: Vec::new(),
            ancestor_depth: None,
            min_image_px: None,
            min_title_chars: None,
            profiles: Vec::new(),
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
        // 1. Explicit path takes precedence
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        // 2. Try current directory
        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        // 3. Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("price-scout").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        // 4. Return default config
        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(site) = std::env::var("SCOUT_SITE") {
            if !site.trim().is_empty() {
                self.site = Some(site);
            }
        }

        if let Ok(proxy) = std::env::var("SCOUT_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(delay) = std::env::var("SCOUT_DELAY") {
            if let Ok(d) = delay.parse() {
                self.delay_ms = d;
            }
        }

        self
    }

    /// Resolves the site profile to use for a page.
    ///
    /// An explicit `site` is looked up among the configured profiles first,
    /// then the built-in ones. Without one, the profile is picked by the
    /// page's host, falling back to the generic profile. Threshold overrides
    /// from this config are applied on top.
    pub fn profile(&self, page_url: Option<&str>) -> Result<SiteProfile, ScrapeError> {
        let mut profile = match &self.site {
            Some(name) => self.named_profile(name)?,
            None => page_url
                .and_then(|u| Url::parse(u).ok())
                .and_then(|u| u.host_str().map(|h| self.profile_for_host(h)))
                .unwrap_or_else(SiteProfile::generic),
        };

        if let Some(depth) = self.ancestor_depth {
            profile.ancestor_depth = depth;
        }
        if let Some(px) = self.min_image_px {
            profile.min_image_px = px;
        }
        if let Some(chars) = self.min_title_chars {
            profile.min_title_chars = chars;
        }

        debug!("Using site profile '{}'", profile.name);
        Ok(profile)
    }

    fn named_profile(&self, name: &str) -> Result<SiteProfile, ScrapeError> {
        if let Some(custom) = self.profiles.iter().find(|p| p.name.eq_ignore_ascii_case(name)) {
            return Ok(custom.clone());
        }
        name.parse::<Site>()
            .map(|site| site.profile())
            .map_err(|_| ScrapeError::UnknownSite(name.to_string()))
    }

    fn profile_for_host(&self, host: &str) -> SiteProfile {
        let bare = host.trim_start_matches("www.");
        let custom = self.profiles.iter().find(|p| {
            p.domain.as_deref().is_some_and(|d| bare == d || bare.ends_with(&format!(".{d}")))
        });

        match custom {
            Some(profile) => profile.clone(),
            None => Site::from_host(host).unwrap_or_default().profile(),
        }
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: table, json, markdown, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
