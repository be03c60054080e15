//! Search command implementation: load a listing page, extract, filter.

use crate::config::Config;
use crate::filters::FilterChainBuilder;
use crate::format::Formatter;
use crate::scrape::{Engine, FileSource, HttpSession, PageSource, ProductRecord, SiteProfile};
use crate::store::ProductStore;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Extracts product listings from a search page.
pub struct SearchCommand {
    config: Config,
    out: Option<PathBuf>,
}

impl SearchCommand {
    /// Creates a new search command.
    pub fn new(config: Config) -> Self {
        Self { config, out: None }
    }

    /// Also saves the extracted list as JSON to `path`.
    pub fn save_to(mut self, path: Option<PathBuf>) -> Self {
        self.out = path;
        self
    }

    /// Searches the configured site for `query` and returns formatted output.
    pub async fn execute(&self, query: &str) -> Result<String> {
        let profile = self.config.profile(None)?;
        let url = profile.search_url_for(query).with_context(|| {
            format!(
                "Site profile '{}' has no search URL. Use --site, or `fetch` with a full URL.",
                profile.name
            )
        })?;

        let session = HttpSession::new(&self.config)?;
        self.execute_with_source(&session, &url, profile).await
    }

    /// Extracts listings from an arbitrary page URL. The site profile is
    /// detected from the host unless one is configured.
    pub async fn execute_url(&self, url: &str) -> Result<String> {
        let profile = self.config.profile(Some(url))?;
        let session = HttpSession::new(&self.config)?;
        self.execute_with_source(&session, url, profile).await
    }

    /// Extracts listings from a saved snapshot, resolving links against
    /// `base_url`.
    pub async fn execute_file(&self, file: &Path, base_url: &str) -> Result<String> {
        let profile = self.config.profile(Some(base_url))?;
        let source = FileSource::new(file);
        self.execute_with_source(&source, base_url, profile).await
    }

    /// Runs the command against a provided page source (for testing).
    pub async fn execute_with_source(
        &self,
        source: &impl PageSource,
        url: &str,
        profile: SiteProfile,
    ) -> Result<String> {
        let records = self.collect(source, url, profile).await?;

        if let Some(path) = &self.out {
            ProductStore::new(path)
                .save(&records)
                .with_context(|| format!("Failed to save results to {}", path.display()))?;
            info!("Saved {} products to {}", records.len(), path.display());
        }

        let formatter = Formatter::new(self.config.format);
        Ok(formatter.format_products(&records))
    }

    /// Loads, extracts and filters. `max_results` of 0 means no limit.
    pub async fn collect(
        &self,
        source: &impl PageSource,
        url: &str,
        profile: SiteProfile,
    ) -> Result<Vec<ProductRecord>> {
        let engine = Engine::new(profile).context("Invalid site profile")?;

        let filters = FilterChainBuilder::from_config(&self.config).build();
        if !filters.is_empty() {
            debug!("Active filters: {}", filters.descriptions().join(", "));
        }

        let snapshot = source.fetch(url).await.with_context(|| format!("Failed to load {}", url))?;

        let max = (self.config.max_results > 0).then_some(self.config.max_results);
        // With filters active the cap applies after filtering
        let limit = if filters.is_empty() { max } else { None };

        let records = engine.extract(&snapshot, limit)?;
        let mut records = filters.apply(records);
        if let Some(max) = max {
            records.truncate(max);
        }

        info!("Found {} products on {}", records.len(), snapshot.url);
        Ok(records)
    }
}
