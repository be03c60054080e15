//! Price range filter.

use super::Filter;
use crate::scrape::models::format_vnd;
use crate::scrape::ProductRecord;

/// Filters products by price range. Bounds are inclusive.
pub struct PriceFilter {
    min: Option<f64>,
    max: Option<f64>,
}

impl PriceFilter {
    /// Creates a new price filter with optional min/max bounds.
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// Creates a filter with only minimum price.
    pub fn min(price: f64) -> Self {
        Self { min: Some(price), max: None }
    }

    /// Creates a filter with only maximum price.
    pub fn max(price: f64) -> Self {
        Self { min: None, max: Some(price) }
    }

    /// Creates a filter with both min and max.
    pub fn range(min: f64, max: f64) -> Self {
        Self { min: Some(min), max: Some(max) }
    }
}

impl Filter for PriceFilter {
    fn matches(&self, product: &ProductRecord) -> bool {
        // Products without price pass the filter (don't exclude them)
        let Some(price) = product.price else {
            return true;
        };

        self.min.is_none_or(|min| price >= min) && self.max.is_none_or(|max| price <= max)
    }

    fn description(&self) -> String {
        match (self.min, self.max) {
            (Some(min), Some(max)) => format!("Price: {} - {}", format_vnd(min), format_vnd(max)),
            (Some(min), None) => format!("Price: >= {}", format_vnd(min)),
            (None, Some(max)) => format!("Price: <= {}", format_vnd(max)),
            (None, None) => "Price: any".to_string(),
        }
    }
}
