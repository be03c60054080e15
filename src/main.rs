//! price-scout - Product-listing extractor CLI for Vietnamese e-commerce search pages.

use anyhow::Result;
use clap::{Parser, Subcommand};
use price_scout::commands::{list_sites, ProductsCommand, SearchCommand};
use price_scout::config::{Config, OutputFormat};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "price-scout",
    version,
    about = "Extract product listings from Vietnamese e-commerce search pages",
    long_about = "Finds product cards on a search page, extracts title, link, image and price, \
                  and drops anything that does not look like a real listing."
)]
struct Cli {
    /// Site profile (cellphones, dienthoaivui, generic, or one from config)
    #[arg(short, long, global = true, env = "SCOUT_SITE")]
    site: Option<String>,

    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "SCOUT_PROXY")]
    proxy: Option<String>,

    /// Delay before each request in milliseconds
    #[arg(long, global = true, env = "SCOUT_DELAY")]
    delay: Option<u64>,

    /// Page load timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Filters shared by the extraction commands.
#[derive(clap::Args)]
struct FilterArgs {
    /// Maximum number of results (0 = no limit)
    #[arg(short, long)]
    max: Option<usize>,

    /// Minimum price filter (VND)
    #[arg(long)]
    min_price: Option<f64>,

    /// Maximum price filter (VND)
    #[arg(long)]
    max_price: Option<f64>,

    /// Required keywords in title (comma-separated)
    #[arg(long, value_delimiter = ',')]
    keywords: Option<Vec<String>>,

    /// Excluded keywords from title (comma-separated)
    #[arg(long, value_delimiter = ',')]
    exclude: Option<Vec<String>>,

    /// Also save the results as a JSON list
    #[arg(short, long)]
    out: Option<PathBuf>,
}

impl FilterArgs {
    fn apply(self, config: &mut Config) -> Option<PathBuf> {
        if let Some(max) = self.max {
            config.max_results = max;
        }
        if self.min_price.is_some() {
            config.min_price = self.min_price;
        }
        if self.max_price.is_some() {
            config.max_price = self.max_price;
        }
        if let Some(kw) = self.keywords {
            config.keywords = kw;
        }
        if let Some(ex) = self.exclude {
            config.exclude_keywords = ex;
        }
        self.out
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Search a site for products
    #[command(alias = "s")]
    Search {
        /// Search query
        query: String,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Extract products from a search page URL
    #[command(alias = "f")]
    Fetch {
        /// Page URL
        url: String,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Extract products from a saved, rendered HTML snapshot
    #[command(alias = "p")]
    Parse {
        /// HTML file
        file: PathBuf,

        /// URL the snapshot was taken from, for resolving links
        #[arg(short, long)]
        base_url: String,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// List a saved product file
    Products {
        /// JSON file written by --out
        file: PathBuf,

        /// Number of products to show (0 = all)
        #[arg(short, long, default_value = "0")]
        limit: usize,

        /// Number of products to skip
        #[arg(short, long, default_value = "0")]
        offset: usize,
    },

    /// List available site profiles
    Sites,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(site) = cli.site {
        config.site = Some(site);
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }
    if let Some(delay) = cli.delay {
        config.delay_ms = delay;
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }
    if let Some(format) = cli.format {
        config.format = format;
    }

    let output = match cli.command {
        Commands::Search { query, filters } => {
            let out = filters.apply(&mut config);
            SearchCommand::new(config).save_to(out).execute(&query).await?
        }

        Commands::Fetch { url, filters } => {
            let out = filters.apply(&mut config);
            SearchCommand::new(config).save_to(out).execute_url(&url).await?
        }

        Commands::Parse { file, base_url, filters } => {
            let out = filters.apply(&mut config);
            SearchCommand::new(config).save_to(out).execute_file(&file, &base_url).await?
        }

        Commands::Products { file, limit, offset } => {
            ProductsCommand::new(config.format).execute(&file, limit, offset)?
        }

        Commands::Sites => list_sites(&config),
    };

    println!("{}", output);

    Ok(())
}
