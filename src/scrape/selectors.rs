//! CSS selectors used by the extraction engine.
//!
//! Universal selectors live here as statics; per-site selector lists come
//! from a [`SiteProfile`] and are compiled once into [`ProfileSelectors`]
//! when an engine is built.

use crate::error::{Result, ScrapeError};
use crate::scrape::profiles::SiteProfile;
use scraper::Selector;
use std::sync::LazyLock;

/// Any link with a target.
pub static ANY_LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// Any image.
pub static IMAGE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());

/// A profile's selector lists, compiled. Order within each list is
/// priority order.
#[derive(Debug, Clone)]
pub struct ProfileSelectors {
    pub containers: Vec<Selector>,
    pub anchors: Vec<Selector>,
    pub links: Vec<Selector>,
    pub titles: Vec<Selector>,
    pub prices: Vec<Selector>,
    pub ready: Vec<Selector>,
}

impl ProfileSelectors {
    /// Compiles every selector in `profile`. Any invalid selector is an error:
    /// a half-compiled profile would silently change strategy priorities.
    pub fn compile(profile: &SiteProfile) -> Result<Self> {
        Ok(Self {
            containers: compile_list(profile, &profile.container_selectors)?,
            anchors: compile_list(profile, &profile.anchor_selectors)?,
            links: compile_list(profile, &profile.link_selectors)?,
            titles: compile_list(profile, &profile.title_selectors)?,
            prices: compile_list(profile, &profile.price_selectors)?,
            ready: compile_list(profile, &profile.ready_selectors)?,
        })
    }
}

fn compile_list(profile: &SiteProfile, list: &[String]) -> Result<Vec<Selector>> {
    list.iter()
        .map(|css| {
            Selector::parse(css).map_err(|_| ScrapeError::Selector {
                profile: profile.name.clone(),
                selector: css.clone(),
            })
        })
        .collect()
}
