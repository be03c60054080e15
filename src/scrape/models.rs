//! Data models for extracted product listings.

use scraper::ElementRef;
use serde::{Deserialize, Serialize};

/// One product listing extracted from a search page.
///
/// Serializes to `{"title", "url", "price", "image"}` with `null` for absent
/// fields, which is the exchange format for stored lists and downstream
/// consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Human-readable product name, never blank
    pub title: String,
    /// Absolute product URL, unique within one result list
    pub url: String,
    /// Price in VND
    pub price: Option<f64>,
    /// Absolute image URL
    pub image: Option<String>,
}

impl ProductRecord {
    /// Returns the price formatted the way Vietnamese shops print it, e.g. `1.090.000đ`.
    pub fn price_display(&self) -> Option<String> {
        self.price.map(format_vnd)
    }
}

impl From<RawRecord> for ProductRecord {
    fn from(raw: RawRecord) -> Self {
        Self { title: raw.title, url: raw.url, price: raw.price, image: raw.image }
    }
}

/// Formats an amount with `.` thousands separators and a `đ` suffix.
pub fn format_vnd(amount: f64) -> String {
    let whole = amount.round() as u64;
    let digits = whole.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out.push('đ');
    out
}

/// How a candidate was found. Anchor candidates come from the link-scan
/// fallback and get ancestor-text aggregation during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    Container,
    Anchor,
}

/// A DOM node suspected (not yet confirmed) to be a product listing.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub element: ElementRef<'a>,
    pub kind: CandidateKind,
}

impl<'a> Candidate<'a> {
    pub fn container(element: ElementRef<'a>) -> Self {
        Self { element, kind: CandidateKind::Container }
    }

    pub fn anchor(element: ElementRef<'a>) -> Self {
        Self { element, kind: CandidateKind::Anchor }
    }
}

/// Fields pulled out of one candidate, before classification.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub title: String,
    pub url: String,
    pub price: Option<f64>,
    pub image: Option<String>,
}

/// A page of stored records plus the size of the whole list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPage {
    /// Number of records in the stored list, before pagination
    pub total: usize,
    pub items: Vec<ProductRecord>,
}

impl ProductPage {
    /// Returns number of records on this page.
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Returns true if this page holds no records.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record() -> ProductRecord {
        ProductRecord {
            title: "Tai Nghe Bluetooth Baseus".to_string(),
            url: "https://cellphones.com.vn/tai-nghe-baseus.html".to_string(),
            price: Some(459000.0),
            image: None,
        }
    }

    #[test]
    fn test_format_vnd() {
        assert_eq!(format_vnd(1090000.0), "1.090.000đ");
        assert_eq!(format_vnd(740000.0), "740.000đ");
        assert_eq!(format_vnd(999.0), "999đ");
        assert_eq!(format_vnd(1000.0), "1.000đ");
        assert_eq!(format_vnd(29590000.0), "29.590.000đ");
    }

    #[test]
    fn test_price_display() {
        let record = make_record();
        assert_eq!(record.price_display(), Some("459.000đ".to_string()));

        let mut record = make_record();
        record.price = None;
        assert!(record.price_display().is_none());
    }

    #[test]
    fn test_record_json_shape() {
        let record = make_record();
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["title"], "Tai Nghe Bluetooth Baseus");
        assert_eq!(value["price"], 459000.0);
        assert!(value["image"].is_null());
        assert_eq!(value.as_object().unwrap().len(), 4);
    }

    #[test]
    fn test_record_from_json_with_nulls() {
        let json = r#"{"title":"Op lung","url":"https://a.vn/x.html","price":null,"image":null}"#;
        let record: ProductRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.title, "Op lung");
        assert!(record.price.is_none());
        assert!(record.image.is_none());
    }

    #[test]
    fn test_product_page() {
        let page = ProductPage { total: 10, items: vec![make_record()] };
        assert_eq!(page.count(), 1);
        assert!(!page.is_empty());

        let page = ProductPage { total: 0, items: Vec::new() };
        assert!(page.is_empty());
    }
}
