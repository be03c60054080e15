//! Final filtering: drops records without product evidence, deduplicates by
//! URL and applies the result limit.

use crate::scrape::models::{ProductRecord, RawRecord};
use crate::scrape::profiles::SiteProfile;
use regex_lite::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::{debug, trace};

/// Size segment in CDN image paths, e.g. `/358x358/`.
static IMAGE_SIZE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/(\d+)x(\d+)").unwrap());

/// Decides which raw records are real product listings.
#[derive(Debug, Clone, Copy)]
pub struct Classifier {
    min_image_px: u32,
    min_title_chars: usize,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::from_profile(&SiteProfile::generic())
    }
}

impl Classifier {
    pub fn new(min_image_px: u32, min_title_chars: usize) -> Self {
        Self { min_image_px, min_title_chars }
    }

    pub fn from_profile(profile: &SiteProfile) -> Self {
        Self::new(profile.min_image_px, profile.min_title_chars)
    }

    /// Reads the `/WxH` size segment of an image URL.
    pub fn image_size(url: &str) -> Option<(u32, u32)> {
        let caps = IMAGE_SIZE.captures(url)?;
        let width = caps.get(1)?.as_str().parse().ok()?;
        let height = caps.get(2)?.as_str().parse().ok()?;
        Some((width, height))
    }

    /// True if the record looks like a product: it has a price, or a
    /// size-encoded image at least `min_image_px` on its longer side.
    pub fn has_evidence(&self, record: &RawRecord) -> bool {
        if record.price.is_some() {
            return true;
        }
        record
            .image
            .as_deref()
            .and_then(Self::image_size)
            .is_some_and(|(w, h)| w.max(h) >= self.min_image_px)
    }

    fn title_ok(&self, record: &RawRecord) -> bool {
        record.title.trim().chars().count() >= self.min_title_chars
    }

    /// Filters, deduplicates by URL (first occurrence wins) and truncates to
    /// `limit`. `None` means no limit.
    pub fn classify(&self, raw: Vec<RawRecord>, limit: Option<usize>) -> Vec<ProductRecord> {
        let total = raw.len();
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for record in raw {
            if limit.is_some_and(|n| out.len() >= n) {
                break;
            }
            if !self.title_ok(&record) {
                trace!("Rejecting short title '{}'", record.title);
                continue;
            }
            if !self.has_evidence(&record) {
                trace!("Rejecting {} without price or product image", record.url);
                continue;
            }
            if !seen.insert(record.url.clone()) {
                trace!("Duplicate {}", record.url);
                continue;
            }
            out.push(ProductRecord::from(record));
        }

        debug!("Classifier kept {} of {} records", out.len(), total);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(title: &str, url: &str, price: Option<f64>, image: Option<&str>) -> RawRecord {
        RawRecord {
            title: title.to_string(),
            url: url.to_string(),
            price,
            image: image.map(str::to_string),
        }
    }

    #[test]
    fn test_image_size() {
        assert_eq!(
            Classifier::image_size("https://cdn.vn/media/358x358/a.jpg"),
            Some((358, 358))
        );
        assert_eq!(Classifier::image_size("https://cdn.vn/w/40x40.png"), Some((40, 40)));
        assert_eq!(Classifier::image_size("https://cdn.vn/a.jpg"), None);
    }

    #[test]
    fn test_small_image_without_price_rejected() {
        let classifier = Classifier::default();
        let records = vec![
            raw("Icon giỏ hàng", "https://a.vn/cart", None, Some("https://a.vn/40x40/c.png")),
            raw("AirPods Pro 2", "https://a.vn/airpods", None, Some("https://a.vn/300x300/p.png")),
        ];

        let out = classifier.classify(records, None);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "AirPods Pro 2");
        assert!(out[0].price.is_none());
    }

    #[test]
    fn test_one_large_side_is_enough() {
        let classifier = Classifier::default();
        let record = raw("Banner sạc", "https://a.vn/b", None, Some("https://a.vn/1200x80/b.jpg"));
        assert!(classifier.has_evidence(&record));

        let record = raw("Không có ảnh", "https://a.vn/c", None, None);
        assert!(!classifier.has_evidence(&record));

        let record = raw("Ảnh không rõ cỡ", "https://a.vn/d", None, Some("https://a.vn/d.jpg"));
        assert!(!classifier.has_evidence(&record));
    }

    #[test]
    fn test_price_is_enough() {
        let classifier = Classifier::default();
        let records = vec![raw("Cáp USB-C", "https://a.vn/c", Some(99000.0), None)];
        let out = classifier.classify(records, None);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_short_titles_rejected() {
        let classifier = Classifier::default();
        let records = vec![
            raw("  Go ", "https://a.vn/1", Some(1000.0), None),
            raw("Mới", "https://a.vn/2", Some(1000.0), None),
        ];

        let out = classifier.classify(records, None);
        // Length counts characters, not bytes
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].url, "https://a.vn/2");
    }

    #[test]
    fn test_dedup_and_limit() {
        let classifier = Classifier::default();
        let urls = ["p0", "p1", "p0", "p2", "p1", "p3", "p0", "p4", "p5", "p6"];
        let records: Vec<_> = urls
            .iter()
            .enumerate()
            .map(|(i, u)| {
                raw(&format!("Sản phẩm {i}"), &format!("https://a.vn/{u}"), Some(1000.0), None)
            })
            .collect();

        let out = classifier.classify(records, Some(5));
        let got: Vec<_> = out.iter().map(|r| r.url.trim_start_matches("https://a.vn/")).collect();
        assert_eq!(got, vec!["p0", "p1", "p2", "p3", "p4"]);
        // First occurrence wins
        assert_eq!(out[0].title, "Sản phẩm 0");
        assert_eq!(out[1].title, "Sản phẩm 1");
    }

    #[test]
    fn test_no_limit_and_zero_limit() {
        let classifier = Classifier::default();
        let records: Vec<_> = (0..8)
            .map(|i| raw("Ốp lưng", &format!("https://a.vn/{i}"), Some(1000.0), None))
            .collect();

        assert_eq!(classifier.classify(records.clone(), None).len(), 8);
        assert!(classifier.classify(records, Some(0)).is_empty());
    }

    #[test]
    fn test_custom_thresholds() {
        let classifier = Classifier::new(200, 5);
        let records = vec![
            raw("Tai nghe", "https://a.vn/1", None, Some("https://a.vn/180x180/t.jpg")),
            raw("Loa", "https://a.vn/2", Some(500000.0), None),
            raw("Loa JBL", "https://a.vn/3", None, Some("https://a.vn/240x240/l.jpg")),
        ];

        let out = classifier.classify(records, None);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].url, "https://a.vn/3");
    }
}
