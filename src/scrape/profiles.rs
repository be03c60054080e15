//! Site profiles: per-site selector lists and parsing rules.
//!
//! Built-in profiles cover the shops this tool was tuned against. Any other
//! site can be described with a `[[profiles]]` table in the config file;
//! missing fields fall back to the generic profile's values.
//!
//! **Update process**: when a shop changes its markup, save a rendered
//! search page, adjust the profile here and add the page as a test fixture.

use crate::scrape::price::PriceFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Built-in site profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    Cellphones,
    #[serde(rename = "dienthoaivui")]
    DienThoaiVui,
    #[default]
    Generic,
}

impl Site {
    /// Returns all built-in sites.
    pub fn all() -> &'static [Site] {
        &[Site::Cellphones, Site::DienThoaiVui, Site::Generic]
    }

    /// Returns the profile name used on the command line and in config.
    pub fn name(&self) -> &'static str {
        match self {
            Site::Cellphones => "cellphones",
            Site::DienThoaiVui => "dienthoaivui",
            Site::Generic => "generic",
        }
    }

    /// Finds the built-in site serving `host`, ignoring a leading `www.`.
    pub fn from_host(host: &str) -> Option<Site> {
        let host = host.trim_start_matches("www.");
        Site::all().iter().copied().find(|site| {
            site.profile()
                .domain
                .as_deref()
                .is_some_and(|d| host == d || host.ends_with(&format!(".{d}")))
        })
    }

    /// Builds the profile for this site.
    pub fn profile(&self) -> SiteProfile {
        match self {
            Site::Cellphones => SiteProfile {
                name: self.name().to_string(),
                domain: Some("cellphones.com.vn".to_string()),
                search_url: Some("https://cellphones.com.vn/catalogsearch/result?q={query}".to_string()),
                strategies: vec![StrategyKind::Containers, StrategyKind::Anchors],
                container_selectors: strings(&[
                    ".product-item",
                    "div.product-item-info",
                    ".product-card",
                    ".product-item-wrap",
                ]),
                anchor_selectors: strings(&["a.product-item-link", "a[href$='.html']"]),
                price_selectors: strings(&[
                    ".product__price--show",
                    ".price",
                    ".product-price",
                    ".price-final_price",
                    "[data-price]",
                ]),
                ready_selectors: strings(&[
                    ".product-item",
                    "a.product-item-link",
                    "div.product-item-info",
                    ".product-card",
                ]),
                ..SiteProfile::generic()
            },
            Site::DienThoaiVui => SiteProfile {
                name: self.name().to_string(),
                domain: Some("dienthoaivui.com.vn".to_string()),
                search_url: Some("https://dienthoaivui.com.vn/tim-kiem?_tim_kiem={query}".to_string()),
                // Listing links are bare anchors with the price in a sibling
                // block, so the link scan goes first.
                strategies: vec![StrategyKind::Anchors, StrategyKind::Containers],
                container_selectors: strings(&[
                    ".product-item",
                    ".product-card",
                    "div.product",
                    "li.product",
                    ".product-item-wrap",
                ]),
                anchor_selectors: strings(&["a[href]"]),
                price_selectors: strings(&[
                    ".price",
                    ".product-price",
                    ".gia",
                    ".price-final_price",
                    "[data-price]",
                ]),
                skip_paths: strings(&["/tin-tuc", "/suachua", "/dat-lich", "/dich-vu", "/uu-dai"]),
                ready_selectors: Vec::new(),
                ..SiteProfile::generic()
            },
            Site::Generic => SiteProfile::generic(),
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Site {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "cellphones" | "cps" => Ok(Site::Cellphones),
            "dienthoaivui" | "dtv" => Ok(Site::DienThoaiVui),
            "generic" | "auto" => Ok(Site::Generic),
            _ => Err(format!("Unknown site: {}. Use: cellphones, dienthoaivui, generic", s)),
        }
    }
}

/// Candidate-location strategies, tried in profile order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Product-card containers, first matching selector wins
    Containers,
    /// Link scan; each matching anchor is a candidate
    Anchors,
}

/// Selectors and parsing rules for one target site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteProfile {
    /// Profile name
    pub name: String,

    /// Host this profile applies to, for auto-detection
    pub domain: Option<String>,

    /// Search page URL with a `{query}` placeholder
    pub search_url: Option<String>,

    /// Locator strategies in priority order
    pub strategies: Vec<StrategyKind>,

    /// Product-card container selectors, in priority order
    pub container_selectors: Vec<String>,

    /// Selectors for product-looking anchors in the link scan
    pub anchor_selectors: Vec<String>,

    /// Preferred link selectors inside a container
    pub link_selectors: Vec<String>,

    /// Explicit name/title element selectors
    pub title_selectors: Vec<String>,

    /// Price container selectors
    pub price_selectors: Vec<String>,

    /// Numeric price attribute on a price container
    pub price_attr: String,

    /// Product name attribute on a container
    pub name_attr: String,

    /// Image source attributes, most preferred first
    pub image_attrs: Vec<String>,

    /// Href fragments that mark non-product links (articles, services...)
    pub skip_paths: Vec<String>,

    /// Lowercase words marking badge lines that are never titles
    pub badge_words: Vec<String>,

    /// Levels (the anchor itself included) read for ancestor-text
    /// aggregation on link-scan candidates; 0 disables it
    pub ancestor_depth: usize,

    /// Ancestor levels searched for an image on link-scan candidates
    pub image_ancestor_depth: usize,

    /// Minimum of max(width, height) for a size-encoded image URL to count
    /// as product evidence
    pub min_image_px: u32,

    /// Minimum title length, in characters
    pub min_title_chars: usize,

    /// Markup whose presence shows the listing has rendered
    pub ready_selectors: Vec<String>,

    /// Price locale
    pub price_format: PriceFormat,
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self::generic()
    }
}

impl SiteProfile {
    /// Profile for unknown shops: common product-card markup and a full
    /// link scan with ancestor-text aggregation.
    pub fn generic() -> Self {
        Self {
            name: "generic".to_string(),
            domain: None,
            search_url: None,
            strategies: vec![StrategyKind::Containers, StrategyKind::Anchors],
            container_selectors: strings(&[
                ".product-item",
                "div.product-item-info",
                ".product-card",
                ".product-item-wrap",
                "div.product",
                "li.product",
            ]),
            anchor_selectors: strings(&["a.product-item-link", "a[href$='.html']", "a[href$='.htm']"]),
            link_selectors: strings(&["a.product-item-link"]),
            title_selectors: strings(&[
                ".name-product",
                ".product-name",
                ".name",
                ".title",
                "h3",
                "h2",
                "h1",
                ".product-title",
            ]),
            price_selectors: strings(&[
                ".price",
                ".product-price",
                ".price-final_price",
                ".price-box",
                "[data-price]",
            ]),
            price_attr: "data-price".to_string(),
            name_attr: "data-name".to_string(),
            image_attrs: strings(&["data-src", "data-lazy-src", "src"]),
            skip_paths: Vec::new(),
            badge_words: strings(&["giảm", "bảo hành", "sắp về", "smember", "sale", "%"]),
            ancestor_depth: 5,
            image_ancestor_depth: 3,
            min_image_px: 150,
            min_title_chars: 3,
            ready_selectors: Vec::new(),
            price_format: PriceFormat::vnd(),
        }
    }

    /// Builds the search page URL for `query`, if the profile has a template.
    pub fn search_url_for(&self, query: &str) -> Option<String> {
        self.search_url.as_ref().map(|t| t.replace("{query}", &urlencoding::encode(query)))
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
