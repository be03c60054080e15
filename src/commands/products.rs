//! Lists a saved product file a page at a time.

use crate::config::OutputFormat;
use crate::format::Formatter;
use crate::store::ProductStore;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Reads back a product list saved by `search --out`.
pub struct ProductsCommand {
    format: OutputFormat,
}

impl ProductsCommand {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Returns `limit` records starting at `offset` (0 = all remaining),
    /// together with the size of the whole list.
    pub fn execute(&self, file: &Path, limit: usize, offset: usize) -> Result<String> {
        let page = ProductStore::new(file)
            .page(limit, offset)
            .with_context(|| format!("Failed to read product list: {}", file.display()))?;

        info!("Listing {} of {} products from {}", page.count(), page.total, file.display());

        Ok(Formatter::new(self.format).format_page(&page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape::ProductRecord;
    use tempfile::NamedTempFile;

    fn write_list(n: usize) -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        let records: Vec<_> = (0..n)
            .map(|i| ProductRecord {
                title: format!("Ốp lưng {i}"),
                url: format!("https://dienthoaivui.com.vn/op-lung-{i}"),
                price: Some(150000.0),
                image: None,
            })
            .collect();
        ProductStore::new(file.path()).save(&records).unwrap();
        file
    }

    #[test]
    fn test_products_json_page() {
        let file = write_list(7);
        let output = ProductsCommand::new(OutputFormat::Json).execute(file.path(), 2, 4).unwrap();

        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["total"], 7);
        let items = value["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["title"], "Ốp lưng 4");
    }

    #[test]
    fn test_products_all_remaining() {
        let file = write_list(7);
        let output = ProductsCommand::new(OutputFormat::Table).execute(file.path(), 0, 5).unwrap();
        assert!(output.contains("Ốp lưng 6"));
        assert!(output.contains("Showing 2 of 7 stored products"));
    }

    #[test]
    fn test_products_missing_file() {
        let err = ProductsCommand::new(OutputFormat::Table)
            .execute(Path::new("/nonexistent/list.json"), 10, 0)
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read product list"));
    }
}
