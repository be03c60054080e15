//! Record extraction: pulls title, link, image and price out of one candidate.
//!
//! Every field has a fallback chain. A missing or unparseable field is left
//! empty; a candidate is only dropped when it has no resolvable link or no
//! usable title.

use crate::error::{Result, ScrapeError};
use crate::scrape::dom::{ancestor_text, clean_title, inner_text, resolve_url};
use crate::scrape::models::{Candidate, CandidateKind, RawRecord};
use crate::scrape::price::PriceParser;
use crate::scrape::profiles::SiteProfile;
use crate::scrape::selectors::{ProfileSelectors, ANY_LINK, IMAGE};
use scraper::ElementRef;
use tracing::trace;
use url::Url;

/// Where a price may be read from, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource {
    /// Known price containers inside the candidate
    Selectors,
    /// Text of the link and its nearby ancestors
    Ancestors,
    /// The candidate's own visible text
    CandidateText,
}

impl PriceSource {
    /// Returns the price lookup order for a kind of candidate.
    pub fn chain(kind: CandidateKind, ancestor_depth: usize) -> &'static [PriceSource] {
        match kind {
            CandidateKind::Container => &[PriceSource::Selectors, PriceSource::CandidateText],
            CandidateKind::Anchor if ancestor_depth > 0 => {
                &[PriceSource::Selectors, PriceSource::Ancestors, PriceSource::CandidateText]
            }
            CandidateKind::Anchor => &[PriceSource::Selectors, PriceSource::CandidateText],
        }
    }
}

/// Extracts raw records from candidates, following one site profile.
pub struct RecordExtractor {
    profile: SiteProfile,
    selectors: ProfileSelectors,
    prices: PriceParser,
    badge_words: Vec<String>,
}

/// Per-candidate state shared by the field extractors.
struct Context<'a> {
    candidate: Candidate<'a>,
    anchor: ElementRef<'a>,
    /// Aggregated ancestor text, for link-scan candidates
    surroundings: Option<String>,
}

impl RecordExtractor {
    /// Creates an extractor for a profile whose selectors are already compiled.
    /// Fails if the profile's price format does not compile.
    pub fn new(profile: SiteProfile, selectors: ProfileSelectors) -> Result<Self> {
        let prices = profile.price_format.compile().map_err(|e| ScrapeError::PriceFormat {
            profile: profile.name.clone(),
            reason: e.to_string(),
        })?;
        let badge_words = profile.badge_words.iter().map(|w| w.to_lowercase()).collect();
        Ok(Self { profile, selectors, prices, badge_words })
    }

    /// Extracts one candidate. Returns `None` when the candidate has no
    /// resolvable link or no usable title.
    pub fn extract(&self, candidate: Candidate<'_>, base: &Url) -> Option<RawRecord> {
        let Some(anchor) = self.primary_anchor(candidate) else {
            trace!("Skipping candidate without a link");
            return None;
        };

        let href = anchor.value().attr("href").unwrap_or_default();
        let Some(url) = resolve_url(base, href) else {
            trace!("Skipping candidate with unusable href '{}'", href);
            return None;
        };

        let surroundings = match candidate.kind {
            CandidateKind::Anchor if self.profile.ancestor_depth > 0 => {
                Some(ancestor_text(anchor, self.profile.ancestor_depth))
            }
            _ => None,
        };

        let cx = Context { candidate, anchor, surroundings };

        let title = self.title(&cx);
        if title.trim().is_empty() {
            trace!("Skipping {} without a title", url);
            return None;
        }

        let image = self.image(&cx, base);
        let price = self.price(&cx);

        Some(RawRecord { title, url, price, image })
    }

    /// The candidate itself when it is a link, otherwise the first preferred
    /// link inside it, otherwise any link inside it.
    fn primary_anchor<'a>(&self, candidate: Candidate<'a>) -> Option<ElementRef<'a>> {
        let element = candidate.element;
        if element.value().name() == "a" && element.value().attr("href").is_some() {
            return Some(element);
        }

        self.selectors
            .links
            .iter()
            .find_map(|sel| element.select(sel).find(|a| a.value().attr("href").is_some()))
            .or_else(|| element.select(&ANY_LINK).next())
    }

    // Title

    fn title(&self, cx: &Context<'_>) -> String {
        // 1. Explicit name/title element
        let named = self.selectors.titles.iter().find_map(|sel| {
            cx.candidate
                .element
                .select(sel)
                .map(|e| clean_title(&inner_text(e)))
                .find(|t| !t.is_empty())
        });
        if let Some(title) = named {
            return title;
        }

        let anchor_text = inner_text(cx.anchor);

        match cx.candidate.kind {
            CandidateKind::Container => {
                // 2. Link text, 3. name attribute
                let title = clean_title(&anchor_text);
                if !title.is_empty() {
                    return title;
                }
                self.name_attribute(cx).unwrap_or_default()
            }
            CandidateKind::Anchor => {
                // Bare links often hold badges and prices next to the name,
                // or only an image with the name in a sibling block.
                self.pick_title(&anchor_text)
                    .or_else(|| cx.surroundings.as_deref().and_then(|t| self.pick_title(t)))
                    .or_else(|| self.name_attribute(cx))
                    .unwrap_or_else(|| clean_title(&anchor_text))
            }
        }
    }

    /// First line that reads like a product name: not a price, not a badge,
    /// at least four characters.
    pub fn pick_title(&self, text: &str) -> Option<String> {
        text.lines().map(str::trim).find(|line| self.is_name_line(line)).map(str::to_string)
    }

    fn is_name_line(&self, line: &str) -> bool {
        if line.chars().count() < 4 || self.prices.is_price_line(line) {
            return false;
        }
        let lower = line.to_lowercase();
        !self.badge_words.iter().any(|w| lower.contains(w.as_str()))
    }

    fn name_attribute(&self, cx: &Context<'_>) -> Option<String> {
        let attr = self.profile.name_attr.as_str();
        [cx.candidate.element, cx.anchor]
            .iter()
            .filter_map(|e| e.value().attr(attr))
            .map(clean_title)
            .find(|t| !t.is_empty())
    }

    // Image

    fn image(&self, cx: &Context<'_>, base: &Url) -> Option<String> {
        if let Some(src) = self.first_image(cx.candidate.element, base) {
            return Some(src);
        }

        if cx.candidate.kind == CandidateKind::Anchor {
            return cx
                .anchor
                .ancestors()
                .filter_map(ElementRef::wrap)
                .take(self.profile.image_ancestor_depth)
                .find_map(|parent| self.first_image(parent, base));
        }

        None
    }

    /// Source of the first image under `element`, lazy-load attributes first.
    fn first_image(&self, element: ElementRef<'_>, base: &Url) -> Option<String> {
        element.select(&IMAGE).find_map(|img| {
            self.profile
                .image_attrs
                .iter()
                .filter_map(|attr| img.value().attr(attr))
                .find_map(|src| resolve_url(base, src))
        })
    }

    // Price

    fn price(&self, cx: &Context<'_>) -> Option<f64> {
        PriceSource::chain(cx.candidate.kind, self.profile.ancestor_depth)
            .iter()
            .find_map(|source| self.price_from(*source, cx))
    }

    fn price_from(&self, source: PriceSource, cx: &Context<'_>) -> Option<f64> {
        match source {
            PriceSource::Selectors => self.selectors.prices.iter().find_map(|sel| {
                let node = cx.candidate.element.select(sel).next()?;
                match node.value().attr(&self.profile.price_attr) {
                    Some(value) => self.prices.parse_attribute(value),
                    None => self.prices.parse(&inner_text(node)),
                }
            }),
            PriceSource::Ancestors => {
                cx.surroundings.as_deref().and_then(|text| self.prices.parse_marked(text))
            }
            PriceSource::CandidateText => {
                let text = inner_text(cx.candidate.element);
                let marked = self.prices.parse_marked(&text);
                match cx.candidate.kind {
                    // Bare numbers in link text are model names and years
                    CandidateKind::Anchor => marked,
                    CandidateKind::Container => marked.or_else(|| self.prices.parse(&text)),
                }
            }
        }
    }
}
