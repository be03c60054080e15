//! Saved product lists: a JSON array of records on disk, read back a page
//! at a time.

use crate::error::Result;
use crate::scrape::models::{ProductPage, ProductRecord};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A product list stored as a JSON file.
pub struct ProductStore {
    path: PathBuf,
}

impl ProductStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `records` as a pretty-printed JSON array, replacing the file.
    pub fn save(&self, records: &[ProductRecord]) -> Result<()> {
        let json = serde_json::to_string_pretty(records)?;
        std::fs::write(&self.path, json)?;
        debug!("Saved {} records to {}", records.len(), self.path.display());
        Ok(())
    }

    /// Reads the whole list.
    pub fn load(&self) -> Result<Vec<ProductRecord>> {
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Reads one page of the list. See [`paginate`].
    pub fn page(&self, limit: usize, offset: usize) -> Result<ProductPage> {
        Ok(paginate(self.load()?, limit, offset))
    }
}

/// Slices `records` from `offset`, taking at most `limit` items; a `limit`
/// of 0 takes everything from `offset` on. `total` is always the full length.
pub fn paginate(records: Vec<ProductRecord>, limit: usize, offset: usize) -> ProductPage {
    let total = records.len();
    let rest = records.into_iter().skip(offset);
    let items = if limit == 0 { rest.collect() } else { rest.take(limit).collect() };
    ProductPage { total, items }
}
