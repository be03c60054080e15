//! Output formatting for product records (table, JSON, markdown, CSV).

use crate::config::OutputFormat;
use crate::scrape::{ProductPage, ProductRecord};

const TITLE_WIDTH: usize = 50;
const MARKDOWN_TITLE_WIDTH: usize = 40;

/// Formats product records for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats multiple products. JSON output is the plain record array.
    pub fn format_products(&self, products: &[ProductRecord]) -> String {
        if products.is_empty() {
            return match self.format {
                OutputFormat::Json => "[]".to_string(),
                OutputFormat::Csv => self.csv_header(),
                _ => "No products found.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => self.json_products(products),
            OutputFormat::Table => self.table_products(products),
            OutputFormat::Markdown => self.markdown_products(products),
            OutputFormat::Csv => self.csv_products(products),
        }
    }

    /// Formats one page of a stored list. JSON output is `{total, items}`.
    pub fn format_page(&self, page: &ProductPage) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(page).unwrap_or_else(|_| "{}".to_string())
            }
            OutputFormat::Csv => self.format_products(&page.items),
            OutputFormat::Table | OutputFormat::Markdown => format!(
                "{}\n\nShowing {} of {} stored products",
                self.format_products(&page.items),
                page.count(),
                page.total
            ),
        }
    }

    // JSON formatting

    fn json_products(&self, products: &[ProductRecord]) -> String {
        serde_json::to_string_pretty(products).unwrap_or_else(|_| "[]".to_string())
    }

    // Table formatting

    fn table_products(&self, products: &[ProductRecord]) -> String {
        let index_width = 3;
        let price_width = 14;

        let mut lines = Vec::new();

        // Header
        lines.push(format!(
            "{:<index_width$}  {:<price_width$}  {:<TITLE_WIDTH$}  {}",
            "#", "Price", "Title", "URL"
        ));
        lines.push(format!(
            "{:-<index_width$}  {:-<price_width$}  {:-<TITLE_WIDTH$}  {:-<20}",
            "", "", "", ""
        ));

        // Rows
        for (i, product) in products.iter().enumerate() {
            let price_str = product.price_display().unwrap_or_else(|| "N/A".to_string());
            let title = truncate(&product.title, TITLE_WIDTH);

            lines.push(format!(
                "{:<index_width$}  {:>price_width$}  {:<TITLE_WIDTH$}  {}",
                i + 1,
                price_str,
                title,
                product.url
            ));
        }

        lines.push(String::new());
        lines.push(format!("Total: {} products", products.len()));

        lines.join("\n")
    }

    // Markdown formatting

    fn markdown_products(&self, products: &[ProductRecord]) -> String {
        let mut lines = Vec::new();

        lines.push("| # | Price | Title |".to_string());
        lines.push("|---|-------|-------|".to_string());

        for (i, product) in products.iter().enumerate() {
            let price_str = product.price_display().unwrap_or_else(|| "N/A".to_string());
            let title = truncate(&product.title, MARKDOWN_TITLE_WIDTH).replace('|', "\\|");

            lines.push(format!("| {} | {} | [{}]({}) |", i + 1, price_str, title, product.url));
        }

        lines.push(String::new());
        lines.push(format!("*{} products found*", products.len()));

        lines.join("\n")
    }

    // CSV formatting

    fn csv_header(&self) -> String {
        "title,price,image,url".to_string()
    }

    fn csv_products(&self, products: &[ProductRecord]) -> String {
        let mut lines = Vec::new();
        lines.push(self.csv_header());

        for product in products {
            let price = product.price.map(|p| p.to_string()).unwrap_or_default();
            let image = product.image.as_deref().map(Self::csv_escape).unwrap_or_default();

            lines.push(format!(
                "{},{},{},{}",
                Self::csv_escape(&product.title),
                price,
                image,
                Self::csv_escape(&product.url)
            ));
        }

        lines.join("\n")
    }

    fn csv_escape(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}

/// Shortens `s` to at most `width` characters, ending in `...` when cut.
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        s.to_string()
    }
}
