//! Candidate location: finds the DOM nodes likely to be product listings.
//!
//! Strategies run in profile order and the first one whose candidates turn
//! into records wins. Nothing found is an empty list, never an error.

use crate::scrape::models::Candidate;
use crate::scrape::profiles::{SiteProfile, StrategyKind};
use crate::scrape::selectors::{ProfileSelectors, ANY_LINK};
use scraper::{Html, Selector};
use tracing::{debug, trace};

/// One way of finding candidates on a page.
pub trait LocateStrategy: Send + Sync {
    /// Returns the candidates this strategy finds, in document order.
    /// An empty list means "not found, try the next strategy".
    fn locate<'a>(&self, document: &'a Html) -> Vec<Candidate<'a>>;

    /// Returns a short name for logs.
    fn name(&self) -> &'static str;
}

/// Product-card containers. Selectors are tried in priority order and the
/// first one with at least one match is used alone; matches from later
/// selectors are never merged in.
pub struct ContainerStrategy {
    selectors: Vec<Selector>,
}

impl ContainerStrategy {
    pub fn new(selectors: Vec<Selector>) -> Self {
        Self { selectors }
    }
}

impl LocateStrategy for ContainerStrategy {
    fn locate<'a>(&self, document: &'a Html) -> Vec<Candidate<'a>> {
        for (index, selector) in self.selectors.iter().enumerate() {
            let found: Vec<_> = document.select(selector).map(Candidate::container).collect();
            if !found.is_empty() {
                trace!("Container selector #{} matched {} nodes", index, found.len());
                return found;
            }
        }
        Vec::new()
    }

    fn name(&self) -> &'static str {
        "containers"
    }
}

/// Link scan: every anchor matching one of the profile's anchor selectors
/// is a candidate, minus links into known non-product sections.
pub struct AnchorStrategy {
    selectors: Vec<Selector>,
    skip_paths: Vec<String>,
}

impl AnchorStrategy {
    pub fn new(selectors: Vec<Selector>, skip_paths: Vec<String>) -> Self {
        Self { selectors, skip_paths: skip_paths.into_iter().map(|p| p.to_lowercase()).collect() }
    }

    fn is_skipped(&self, href: &str) -> bool {
        let href = href.to_lowercase();
        self.skip_paths.iter().any(|p| href.contains(p.as_str()))
    }
}

impl LocateStrategy for AnchorStrategy {
    fn locate<'a>(&self, document: &'a Html) -> Vec<Candidate<'a>> {
        document
            .select(&ANY_LINK)
            .filter(|a| self.selectors.iter().any(|sel| sel.matches(a)))
            .filter(|a| {
                let href = a.value().attr("href").unwrap_or_default().trim();
                !href.is_empty() && !self.is_skipped(href)
            })
            .map(Candidate::anchor)
            .collect()
    }

    fn name(&self) -> &'static str {
        "anchors"
    }
}

/// Ordered chain of locate strategies.
pub struct CandidateLocator {
    strategies: Vec<Box<dyn LocateStrategy>>,
}

impl CandidateLocator {
    /// Creates an empty locator.
    pub fn new() -> Self {
        Self { strategies: Vec::new() }
    }

    /// Appends a strategy to the chain.
    pub fn add(&mut self, strategy: impl LocateStrategy + 'static) -> &mut Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    /// Builds the chain a profile asks for.
    pub fn from_profile(profile: &SiteProfile, selectors: &ProfileSelectors) -> Self {
        let mut locator = Self::new();
        for kind in &profile.strategies {
            match kind {
                StrategyKind::Containers => {
                    locator.add(ContainerStrategy::new(selectors.containers.clone()));
                }
                StrategyKind::Anchors => {
                    locator.add(AnchorStrategy::new(
                        selectors.anchors.clone(),
                        profile.skip_paths.clone(),
                    ));
                }
            }
        }
        locator
    }

    /// Runs the strategies in order, handing each one's candidates to
    /// `accept`, and returns the first non-empty result. A strategy that
    /// finds candidates `accept` turns into nothing does not end the search.
    pub fn locate<'a, T>(
        &self,
        document: &'a Html,
        mut accept: impl FnMut(Vec<Candidate<'a>>) -> Vec<T>,
    ) -> Vec<T> {
        for strategy in &self.strategies {
            let found = strategy.locate(document);
            if found.is_empty() {
                debug!("Strategy '{}' found nothing", strategy.name());
                continue;
            }

            let count = found.len();
            let accepted = accept(found);
            if !accepted.is_empty() {
                debug!(
                    "Strategy '{}' found {} candidates, kept {}",
                    strategy.name(),
                    count,
                    accepted.len()
                );
                return accepted;
            }
            debug!("Strategy '{}' found {} candidates, none kept", strategy.name(), count);
        }
        Vec::new()
    }

    /// Returns the number of strategies.
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Returns true if no strategies are configured.
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl Default for CandidateLocator {
    fn default() -> Self {
        Self::new()
    }
}
