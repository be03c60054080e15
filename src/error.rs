//! Error types for page acquisition and engine construction.
//!
//! Extraction itself never fails: a page with nothing product-like yields an
//! empty list. These errors cover the cases where there is no page to
//! extract from, or the engine cannot be built from a profile.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The page could not be loaded at all (DNS, TLS, connection reset...).
    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    /// The page did not finish loading in time.
    #[error("Timed out after {secs}s loading {url}")]
    Timeout { url: String, secs: u64 },

    /// The server answered, but not with a usable page.
    #[error("Request to {url} failed with status: {status}")]
    Status { url: String, status: u16 },

    #[error("Invalid URL '{0}'")]
    InvalidUrl(String),

    /// A profile carries a CSS selector that does not compile.
    #[error("Invalid selector '{selector}' in profile '{profile}'")]
    Selector { profile: String, selector: String },

    /// A profile's price format does not compile into a matcher.
    #[error("Invalid price format in profile '{profile}': {reason}")]
    PriceFormat { profile: String, reason: String },

    #[error("Unknown site profile: {0}")]
    UnknownSite(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScrapeError {
    /// True for failures that mean "the site could not be reached or rendered",
    /// as opposed to configuration or local I/O problems.
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            ScrapeError::Navigation { .. } | ScrapeError::Timeout { .. } | ScrapeError::Status { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_classification() {
        let err = ScrapeError::Timeout { url: "https://a.vn".to_string(), secs: 30 };
        assert!(err.is_navigation());

        let err = ScrapeError::Status { url: "https://a.vn".to_string(), status: 503 };
        assert!(err.is_navigation());
        assert!(err.to_string().contains("503"));

        let err = ScrapeError::UnknownSite("tiki".to_string());
        assert!(!err.is_navigation());
    }

    #[test]
    fn test_selector_error_message() {
        let err = ScrapeError::Selector {
            profile: "custom".to_string(),
            selector: "div[".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("div["));
        assert!(msg.contains("custom"));
    }
}
