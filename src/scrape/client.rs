//! Page sources: where rendered search pages come from.

use crate::config::Config;
use crate::error::{Result, ScrapeError};
use crate::scrape::pipeline::Snapshot;
use anyhow::Context;
use async_trait::async_trait;
use rand::Rng;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;
use wreq::Client;
use wreq_util::Emulation;

const ACCEPT_LANGUAGE: &str = "vi-VN,vi;q=0.9,en-US;q=0.8,en;q=0.7";

const MAX_REDIRECTS: usize = 5;

/// Something that can deliver a rendered page for a URL. Enables mocking
/// for tests.
///
/// Sites that render listings client-side and lazy-load prices and images
/// must be scrolled top to middle to bottom, with short pauses, before the
/// snapshot is taken. A premature snapshot is not an error; it just yields
/// records with missing prices and images, or none at all.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Loads `url` and returns its HTML and final URL.
    async fn fetch(&self, url: &str) -> Result<Snapshot>;
}

/// HTTP session with browser impersonation, for server-rendered pages.
///
/// One session per command invocation; dropping it closes its connections.
pub struct HttpSession {
    client: Client,
    timeout_secs: u64,
    delay_ms: u64,
    delay_jitter_ms: u64,
}

impl HttpSession {
    /// Creates a session from the given configuration.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            timeout_secs: config.timeout_secs,
            delay_ms: config.delay_ms,
            delay_jitter_ms: config.delay_jitter_ms,
        })
    }

    /// Adds a random delay before each request.
    async fn delay(&self) {
        if self.delay_ms == 0 {
            return;
        }

        let jitter = if self.delay_jitter_ms > 0 {
            rand::rng().random_range(0..=self.delay_jitter_ms)
        } else {
            0
        };

        let total_delay = self.delay_ms + jitter;
        debug!("Delaying {}ms", total_delay);
        tokio::time::sleep(Duration::from_millis(total_delay)).await;
    }

    async fn get(&self, url: &str) -> Result<wreq::Response> {
        self.client
            .get(url)
            .emulation(Emulation::Chrome131)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header("Accept-Language", ACCEPT_LANGUAGE)
            .header("Cache-Control", "no-cache")
            .header("Sec-Fetch-Dest", "document")
            .header("Sec-Fetch-Mode", "navigate")
            .header("Sec-Fetch-Site", "none")
            .header("Upgrade-Insecure-Requests", "1")
            .send()
            .await
            .map_err(|e| self.request_error(url, e))
    }

    fn request_error(&self, url: &str, err: wreq::Error) -> ScrapeError {
        if err.is_timeout() {
            ScrapeError::Timeout { url: url.to_string(), secs: self.timeout_secs }
        } else {
            ScrapeError::Navigation { url: url.to_string(), reason: err.to_string() }
        }
    }
}

#[async_trait]
impl PageSource for HttpSession {
    async fn fetch(&self, url: &str) -> Result<Snapshot> {
        self.delay().await;

        info!("Fetching {}", url);

        let mut current = url.to_string();
        for _ in 0..=MAX_REDIRECTS {
            let response = self.get(&current).await?;
            let status = response.status();
            debug!("Response status: {}", status);

            if status.is_redirection() {
                let next = response
                    .headers()
                    .get("location")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|loc| Url::parse(&current).ok()?.join(loc).ok());
                match next {
                    Some(next) => {
                        debug!("Redirected {} -> {}", current, next);
                        current = next.to_string();
                        continue;
                    }
                    None => {
                        return Err(ScrapeError::Status { url: current, status: status.as_u16() });
                    }
                }
            }

            if status == 429 || status == 503 {
                warn!("Rate limited ({}). Consider using a proxy or increasing --delay.", status);
            }
            if !status.is_success() {
                return Err(ScrapeError::Status { url: current, status: status.as_u16() });
            }

            let html = response.text().await.map_err(|e| self.request_error(&current, e))?;
            return Ok(Snapshot::new(html, current));
        }

        Err(ScrapeError::Navigation {
            url: url.to_string(),
            reason: format!("more than {MAX_REDIRECTS} redirects"),
        })
    }
}

/// Reads snapshots saved to disk by a browser driver.
///
/// The file at the path is returned for every URL; the URL only becomes the
/// snapshot's base for link resolution.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PageSource for FileSource {
    async fn fetch(&self, url: &str) -> Result<Snapshot> {
        debug!("Reading snapshot {} as {}", self.path.display(), url);
        let html = tokio::fs::read_to_string(&self.path).await?;
        Ok(Snapshot::new(html, url))
    }
}
