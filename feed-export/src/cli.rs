//! Command line and environment configuration

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "feed-export",
    version,
    about = "Export a catalog snapshot as a delimited search feed"
)]
pub struct Cli {
    /// Catalog snapshot (JSON)
    #[arg(long, env = "FEED_SNAPSHOT")]
    pub snapshot: PathBuf,

    /// Write the feed to this file instead of stdout
    #[arg(long, short, env = "FEED_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Language ISO code
    #[arg(long, env = "FEED_LANGUAGE")]
    pub language: Option<String>,

    /// Currency ISO code
    #[arg(long, env = "FEED_CURRENCY")]
    pub currency: Option<String>,

    /// Products per repository query
    #[arg(long, env = "FEED_CHUNK_SIZE")]
    pub chunk_size: Option<String>,

    /// Only export this many products (0 exports everything)
    #[arg(long)]
    pub limit: Option<String>,

    /// First product position of the window
    #[arg(long)]
    pub offset: Option<String>,

    /// Emit price columns (yes/no, on/off, 1/0)
    #[arg(long, env = "FEED_PRICES")]
    pub prices: Option<String>,

    /// Prices include tax (yes/no, on/off, 1/0)
    #[arg(long, env = "FEED_TAXES")]
    pub taxes: Option<String>,

    /// ISO-8859-1 output instead of UTF-8 (yes/no, on/off, 1/0)
    #[arg(long, env = "FEED_LATIN1")]
    pub latin1: Option<String>,

    /// Print the discovery document instead of the feed
    #[arg(long)]
    pub config: bool,

    /// Storefront catalog URL used in product and image links
    #[arg(long, env = "FEED_STORE_URL")]
    pub store_url: Option<String>,

    /// Log level filter (overridden by RUST_LOG)
    #[arg(long, env = "FEED_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log as JSON lines
    #[arg(long, env = "FEED_LOG_JSON")]
    pub log_json: bool,

    /// Write logs to daily files in this directory instead of stderr
    #[arg(long, env = "FEED_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

impl Cli {
    /// Flags as feed request parameters, so they follow the same parsing
    /// rules as a query string
    pub fn request_params(&self) -> Vec<(&'static str, String)> {
        let mut params: Vec<(&'static str, String)> = [
            ("language", &self.language),
            ("currency", &self.currency),
            ("chunk_size", &self.chunk_size),
            ("limit", &self.limit),
            ("offset", &self.offset),
            ("prices", &self.prices),
            ("taxes", &self.taxes),
            ("latin1", &self.latin1),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.clone().map(|value| (key, value)))
        .collect();

        if self.config {
            params.push(("config", "1".to_string()));
        }
        params
    }
}
