//! The extraction engine: locate, extract, classify.

use crate::error::{Result, ScrapeError};
use crate::scrape::classifier::Classifier;
use crate::scrape::extractor::RecordExtractor;
use crate::scrape::locator::CandidateLocator;
use crate::scrape::models::{ProductRecord, RawRecord};
use crate::scrape::profiles::SiteProfile;
use crate::scrape::selectors::ProfileSelectors;
use scraper::Html;
use tracing::{debug, warn};
use url::Url;

/// A rendered page as delivered by a page source.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Rendered HTML
    pub html: String,
    /// URL the page was loaded from, after redirects
    pub url: String,
}

impl Snapshot {
    pub fn new(html: impl Into<String>, url: impl Into<String>) -> Self {
        Self { html: html.into(), url: url.into() }
    }

    /// Parses the HTML and the base URL.
    pub fn parse(&self) -> Result<Page> {
        let base = Url::parse(&self.url).map_err(|_| ScrapeError::InvalidUrl(self.url.clone()))?;
        Ok(Page { document: Html::parse_document(&self.html), base })
    }
}

/// A parsed snapshot. Not `Send`; build it after the last `.await`.
pub struct Page {
    pub document: Html,
    pub base: Url,
}

/// Product-listing extractor for one site profile.
///
/// Holds no per-page state, so one engine can process any number of pages
/// and the same page always yields the same records.
pub struct Engine {
    profile: SiteProfile,
    selectors: ProfileSelectors,
    locator: CandidateLocator,
    extractor: RecordExtractor,
    classifier: Classifier,
}

impl Engine {
    /// Builds an engine for `profile`. Fails if any of its selectors is invalid.
    pub fn new(profile: SiteProfile) -> Result<Self> {
        let selectors = ProfileSelectors::compile(&profile)?;
        let locator = CandidateLocator::from_profile(&profile, &selectors);
        let extractor = RecordExtractor::new(profile.clone(), selectors.clone())?;
        let classifier = Classifier::from_profile(&profile);

        debug!("Built engine for profile '{}' ({} strategies)", profile.name, locator.len());

        Ok(Self { profile, selectors, locator, extractor, classifier })
    }

    /// Returns the profile this engine follows.
    pub fn profile(&self) -> &SiteProfile {
        &self.profile
    }

    /// Extracts product records from a snapshot.
    pub fn extract(
        &self,
        snapshot: &Snapshot,
        limit: Option<usize>,
    ) -> Result<Vec<ProductRecord>> {
        let page = snapshot.parse()?;
        Ok(self.extract_page(&page, limit))
    }

    /// Extracts product records from a parsed page. Never fails; a page
    /// without listings yields an empty list.
    pub fn extract_page(&self, page: &Page, limit: Option<usize>) -> Vec<ProductRecord> {
        if !self.is_ready(&page.document) {
            warn!(
                "No listing markup for '{}' on {}; the page may not be fully rendered",
                self.profile.name, page.base
            );
        }

        // A strategy only counts once something it found survives
        // classification; otherwise the next one gets its turn.
        self.locator.locate(&page.document, |candidates| {
            let raw: Vec<RawRecord> = candidates
                .into_iter()
                .filter_map(|c| self.extractor.extract(c, &page.base))
                .collect();
            debug!("Extracted {} raw records from {}", raw.len(), page.base);

            self.classifier.classify(raw, limit)
        })
    }

    /// Extracts from raw HTML with an explicit base URL.
    pub fn extract_html(
        &self,
        html: &str,
        base_url: &str,
        limit: Option<usize>,
    ) -> Result<Vec<ProductRecord>> {
        self.extract(&Snapshot::new(html, base_url), limit)
    }

    /// True if any of the profile's ready markers is present, or the profile
    /// has none.
    pub fn is_ready(&self, document: &Html) -> bool {
        self.selectors.ready.is_empty()
            || self.selectors.ready.iter().any(|sel| document.select(sel).next().is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape::profiles::Site;

    const BASE: &str = "https://cellphones.com.vn/catalogsearch/result?q=sac";

    fn engine(site: Site) -> Engine {
        Engine::new(site.profile()).unwrap()
    }

    fn card(href: &str, name: &str, price: &str, img: &str) -> String {
        format!(
            r#"<div class="product-item">
                 <a class="product-item-link" href="{href}">
                   <img data-src="{img}">
                   {name}<br>{price}
                 </a>
               </div>"#
        )
    }

    #[test]
    fn test_extract_cards() {
        let html = [
            card("/sac-anker.html", "Sạc Anker 20W", "290.000đ", "/media/358x358/a.jpg"),
            card("/cap-ugreen.html", "Cáp Ugreen", "", "/media/358x358/u.jpg"),
            card("/icon.html", "Biểu tượng", "", "/media/40x40/i.png"),
        ]
        .concat();

        let records = engine(Site::Cellphones).extract_html(&html, BASE, None).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].url, "https://cellphones.com.vn/sac-anker.html");
        assert_eq!(records[0].price, Some(290000.0));
        assert_eq!(records[1].title, "Cáp Ugreen");
        assert!(records[1].price.is_none());
    }

    #[test]
    fn test_extract_is_idempotent() {
        let html = card("/sac-anker.html", "Sạc Anker 20W", "290.000đ", "/media/358x358/a.jpg");
        let engine = engine(Site::Cellphones);
        let first = engine.extract_html(&html, BASE, None).unwrap();
        let second = engine.extract_html(&html, BASE, None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_page() {
        let html = "<html><body><p>Không tìm thấy kết quả</p></body></html>";
        for site in Site::all() {
            let records = engine(*site).extract_html(html, BASE, Some(10)).unwrap();
            assert!(records.is_empty());
        }
    }

    #[test]
    fn test_limit() {
        let html: String = (0..6)
            .map(|i| card(&format!("/p{i}.html"), &format!("Sản phẩm {i}"), "100.000đ", ""))
            .collect();
        let records = engine(Site::Cellphones).extract_html(&html, BASE, Some(4)).unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[3].url, "https://cellphones.com.vn/p3.html");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = engine(Site::Generic).extract_html("<html></html>", "not a url", None);
        assert!(matches!(err, Err(ScrapeError::InvalidUrl(_))));
    }

    #[test]
    fn test_invalid_profile_fails_at_construction() {
        let mut profile = SiteProfile::generic();
        profile.container_selectors = vec!["div[".to_string()];
        assert!(matches!(Engine::new(profile), Err(ScrapeError::Selector { .. })));
    }

    #[test]
    fn test_falls_back_when_links_hold_no_products() {
        let html = r#"
            <nav><a href="/">Trang chủ</a></nav>
            <div class="product-item"><a href="/ipad-air-m2">iPad Air M2 11 inch</a>
                <span data-price="15990000"></span></div>
            <div class="product-item"><a href="/airpods-pro-2">AirPods Pro 2</a>
                <span data-price="5490000"></span></div>"#;
        let base = "https://dienthoaivui.com.vn/tim-kiem?_tim_kiem=apple";

        let records = engine(Site::DienThoaiVui).extract_html(html, base, None).unwrap();
        let prices: Vec<_> = records.iter().map(|r| r.price).collect();
        assert_eq!(prices, vec![Some(15990000.0), Some(5490000.0)]);
        assert_eq!(records[0].url, "https://dienthoaivui.com.vn/ipad-air-m2");
    }

    #[test]
    fn test_invalid_price_format_fails_at_construction() {
        let profile: SiteProfile =
            toml::from_str("name = \"x\"\n[price_format]\nmin_bare_digits = 4294967296").unwrap();
        assert!(matches!(Engine::new(profile), Err(ScrapeError::PriceFormat { .. })));
    }

    #[test]
    fn test_is_ready() {
        let engine = engine(Site::Cellphones);
        let ready = Html::parse_document(r#"<div class="product-item"></div>"#);
        let blank = Html::parse_document("<div></div>");
        assert!(engine.is_ready(&ready));
        assert!(!engine.is_ready(&blank));

        // No markers configured
        let generic = self::engine(Site::Generic);
        assert!(generic.is_ready(&blank));
    }
}
