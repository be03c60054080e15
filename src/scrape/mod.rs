//! Product-listing extraction: page sources, site profiles and the
//! locate / extract / classify engine.

pub mod classifier;
pub mod client;
pub mod dom;
pub mod extractor;
pub mod locator;
pub mod models;
pub mod pipeline;
pub mod price;
pub mod profiles;
pub mod selectors;

pub use classifier::Classifier;
pub use client::{FileSource, HttpSession, PageSource};
pub use extractor::{PriceSource, RecordExtractor};
pub use locator::{AnchorStrategy, CandidateLocator, ContainerStrategy, LocateStrategy};
pub use models::{Candidate, CandidateKind, ProductPage, ProductRecord, RawRecord};
pub use pipeline::{Engine, Page, Snapshot};
pub use price::{PriceFormat, PriceParser};
pub use profiles::{Site, SiteProfile, StrategyKind};
