//! Feed configuration
//!
//! A [`FeedConfig`] is built once per request, validated once, and then
//! passed read-only through the pipeline.
//!
//! # Request parameters
//!
//! | key | default | meaning |
//! |-----|---------|---------|
//! | `language` | `en` | language ISO code |
//! | `currency` | `EUR` | currency ISO code |
//! | `chunk_size` | 100 (or `limit`) | products per query |
//! | `limit` / `offset` | none | only export `[offset, offset + limit)` |
//! | `prices` | on | emit `price` and `sale_price` columns |
//! | `taxes` | on | prices include tax |
//! | `latin1` | off | ISO-8859-1 output instead of UTF-8 |
//! | `config` | off | answer with the discovery document |

use crate::encoding::OutputCharset;
use crate::error::{FeedError, FeedResult};
use crate::sanitize::decode_entities;

/// Products per query when neither `chunk_size` nor a window is given
pub const DEFAULT_CHUNK_SIZE: u32 = 100;

/// Characters the pipeline writes into its own fields: header names, prices,
/// availability words, and URL structure
const RESERVED_FIELD_SEPARATORS: [char; 10] = ['.', ':', '/', '?', '&', '=', '%', '#', '+', '_'];

/// Separators used in the delimited output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Separators {
    /// Between record fields
    pub field: char,
    /// Between category paths within the categories field
    pub category: String,
    /// Between ancestor names within one category path
    pub tree: String,
    /// Written in place of the field separator inside text fields
    pub replacement: char,
}

impl Default for Separators {
    fn default() -> Self {
        Self {
            field: '|',
            category: "%%".to_string(),
            tree: ">".to_string(),
            replacement: '-',
        }
    }
}

impl Separators {
    pub fn validate(&self) -> FeedResult<()> {
        if self.field.is_alphanumeric()
            || (self.field.is_whitespace() && self.field != '\t')
            || RESERVED_FIELD_SEPARATORS.contains(&self.field)
        {
            return Err(FeedError::InvalidConfig(format!(
                "field separator {:?} also occurs inside generated fields",
                self.field
            )));
        }
        if self.replacement == self.field
            || self.replacement.is_alphanumeric()
            || self.replacement.is_whitespace()
            || matches!(self.replacement, '<' | '>' | '&' | '#' | ';' | '/' | '!' | '?')
        {
            return Err(FeedError::InvalidConfig(format!(
                "separator replacement {:?} is not a usable marker",
                self.replacement
            )));
        }
        for (name, value) in [("category", &self.category), ("tree", &self.tree)] {
            if value.is_empty() || value.contains(self.field) {
                return Err(FeedError::InvalidConfig(format!(
                    "{} separator must be non-empty and differ from the field separator",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// `[offset, offset + limit)` slice of the product set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedWindow {
    pub limit: u64,
    pub offset: u64,
}

impl FeedWindow {
    /// Exclusive end position
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.limit)
    }
}

/// Where product pages and images live in the storefront
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLinks {
    /// Catalog root, e.g. `http://shop.example.com/catalog/`
    pub catalog_url: String,
    pub product_page: String,
    pub images_dir: String,
}

impl Default for StoreLinks {
    fn default() -> Self {
        Self {
            catalog_url: "http://localhost/catalog/".to_string(),
            product_page: "product_info.php".to_string(),
            images_dir: "images/".to_string(),
        }
    }
}

impl StoreLinks {
    pub fn new(catalog_url: impl Into<String>) -> Self {
        Self {
            catalog_url: catalog_url.into(),
            ..Self::default()
        }
    }

    fn join(&self, path: &str) -> String {
        let base = self.catalog_url.trim_end_matches('/');
        format!("{}/{}", base, path.trim_start_matches('/'))
    }

    /// Product permalink, before URL cleaning
    pub fn product_url(&self, currency: &str, product_id: i64) -> String {
        let url = self.join(&format!(
            "{}?currency={}&products_id={}",
            self.product_page, currency, product_id
        ));
        decode_entities(&url).into_owned()
    }

    /// Image link from the stored relative path, before URL cleaning
    pub fn image_url(&self, image_path: &str) -> String {
        let dir = self.images_dir.trim_end_matches('/');
        let url = self.join(&format!("{}/{}", dir, image_path.trim_start_matches('/')));
        decode_entities(&url).into_owned()
    }
}

/// Named defaults for values the request leaves out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedDefaults {
    pub language: String,
    pub currency: String,
    pub show_prices: bool,
    pub show_final_prices: bool,
}

impl Default for FeedDefaults {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            currency: "EUR".to_string(),
            show_prices: true,
            show_final_prices: true,
        }
    }
}

/// Immutable options for one feed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    pub language: String,
    /// Upper-cased ISO code
    pub currency: String,
    /// Explicit batch size; see [`FeedConfig::effective_chunk_size`]
    pub chunk_size: Option<u32>,
    pub show_prices: bool,
    /// Prices include tax
    pub show_final_prices: bool,
    pub charset: OutputCharset,
    pub window: Option<FeedWindow>,
    pub separators: Separators,
    pub links: StoreLinks,
}

impl FeedConfig {
    pub fn new(defaults: &FeedDefaults) -> Self {
        Self {
            language: defaults.language.clone(),
            currency: defaults.currency.to_uppercase(),
            chunk_size: None,
            show_prices: defaults.show_prices,
            show_final_prices: defaults.show_final_prices,
            charset: OutputCharset::Utf8,
            window: None,
            separators: Separators::default(),
            links: StoreLinks::default(),
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: u32) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }

    /// Restrict output to `[offset, offset + limit)`; a zero limit clears the window
    pub fn with_window(mut self, limit: u64, offset: u64) -> Self {
        self.window = (limit > 0).then_some(FeedWindow { limit, offset });
        self
    }

    pub fn with_links(mut self, links: StoreLinks) -> Self {
        self.links = links;
        self
    }

    pub fn with_charset(mut self, charset: OutputCharset) -> Self {
        self.charset = charset;
        self
    }

    /// Batch size actually used
    ///
    /// An explicit chunk size wins. Otherwise a window uses its own limit
    /// as the batch size, and the full export uses [`DEFAULT_CHUNK_SIZE`].
    pub fn effective_chunk_size(&self) -> u64 {
        match (self.chunk_size, self.window) {
            (Some(chunk), _) => u64::from(chunk),
            (None, Some(window)) => window.limit,
            (None, None) => u64::from(DEFAULT_CHUNK_SIZE),
        }
    }

    /// The header line is only written at the true start of the feed
    pub fn emits_header(&self) -> bool {
        self.window.is_none_or(|window| window.offset == 0)
    }

    /// Checks that do not need the repository
    pub fn validate(&self) -> FeedResult<()> {
        if self.chunk_size == Some(0) {
            return Err(FeedError::InvalidConfig(
                "chunk size must be a positive integer".to_string(),
            ));
        }
        self.separators.validate()
    }

    /// Build a request from query parameters
    pub fn from_params<I, K, V>(params: I, defaults: &FeedDefaults) -> FeedResult<FeedRequest>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let params = RequestParams::collect(params);
        let mut config = FeedConfig::new(defaults);

        if let Some(language) = params.text("language") {
            config.language = language.to_string();
        }
        if let Some(currency) = params.text("currency") {
            config.currency = currency.to_uppercase();
        }
        if let Some(chunk) = params.int("chunk_size") {
            config.chunk_size = Some(u32::try_from(chunk).map_err(|_| {
                FeedError::InvalidConfig(format!("chunk size {} is out of range", chunk))
            })?);
        }
        config.show_prices = params.flag("prices").unwrap_or(defaults.show_prices);
        config.show_final_prices = params.flag("taxes").unwrap_or(defaults.show_final_prices);
        config.charset = OutputCharset::from_latin1_flag(params.flag("latin1").unwrap_or(false));

        let limit = params.int("limit").unwrap_or(0);
        let offset = params.int("offset").unwrap_or(0);
        if limit > 0 {
            let offset = u64::try_from(offset).map_err(|_| {
                FeedError::InvalidConfig(format!("offset {} must not be negative", offset))
            })?;
            config = config.with_window(limit.unsigned_abs(), offset);
        }

        Ok(FeedRequest {
            config,
            discovery: params.flag("config").unwrap_or(false),
        })
    }
}

/// Parsed request: either a feed run or a discovery document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRequest {
    pub config: FeedConfig,
    pub discovery: bool,
}

/// Last value wins, blank values count as absent
struct RequestParams(Vec<(String, String)>);

impl RequestParams {
    fn collect<I, K, V>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Self(
            params
                .into_iter()
                .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().trim().to_string()))
                .collect(),
        )
    }

    fn text(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .filter(|value| !value.is_empty())
    }

    fn int(&self, name: &str) -> Option<i64> {
        self.text(name).map(parse_int_prefix)
    }

    fn flag(&self, name: &str) -> Option<bool> {
        self.text(name).map(parse_flag)
    }
}

/// Leading integer of a string, `0` when there is none
pub fn parse_int_prefix(value: &str) -> i64 {
    let value = value.trim_start();
    let (sign, digits) = match value.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, value.strip_prefix('+').unwrap_or(value)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end]
        .parse::<i64>()
        .map(|n| sign * n)
        .unwrap_or(0)
}

/// Boolean request flag: yes/no words, otherwise anything but `0` is true
pub fn parse_flag(value: &str) -> bool {
    match value.to_ascii_uppercase().as_str() {
        "TRUE" | "YES" | "ON" => true,
        "FALSE" | "NO" | "OFF" => false,
        other => !other.is_empty() && other != "0",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FeedConfig::new(&FeedDefaults::default());

        assert_eq!(config.language, "en");
        assert_eq!(config.currency, "EUR");
        assert_eq!(config.effective_chunk_size(), 100);
        assert!(config.emits_header());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_window_uses_limit_as_chunk() {
        let config = FeedConfig::new(&FeedDefaults::default()).with_window(25, 50);
        assert_eq!(config.effective_chunk_size(), 25);
        assert!(!config.emits_header());

        let config = config.with_chunk_size(10);
        assert_eq!(config.effective_chunk_size(), 10);
    }

    #[test]
    fn test_header_at_offset_zero() {
        let config = FeedConfig::new(&FeedDefaults::default()).with_window(25, 0);
        assert!(config.emits_header());
    }

    #[test]
    fn test_from_params() {
        let request = FeedConfig::from_params(
            [
                ("language", "es"),
                ("currency", "usd"),
                ("prices", "0"),
                ("taxes", "off"),
                ("latin1", "yes"),
                ("limit", "20"),
                ("offset", "40"),
            ],
            &FeedDefaults::default(),
        )
        .unwrap();

        let config = request.config;
        assert!(!request.discovery);
        assert_eq!(config.language, "es");
        assert_eq!(config.currency, "USD");
        assert!(!config.show_prices);
        assert!(!config.show_final_prices);
        assert_eq!(config.charset, OutputCharset::Latin1);
        assert_eq!(config.window, Some(FeedWindow { limit: 20, offset: 40 }));
        assert_eq!(config.effective_chunk_size(), 20);
    }

    #[test]
    fn test_from_params_blank_and_zero_limit() {
        let request = FeedConfig::from_params(
            [("language", " "), ("limit", "0"), ("offset", "10"), ("config", "1")],
            &FeedDefaults::default(),
        )
        .unwrap();

        assert!(request.discovery);
        assert_eq!(request.config.language, "en");
        assert_eq!(request.config.window, None);
    }

    #[test]
    fn test_from_params_rejects_negative_offset() {
        let result = FeedConfig::from_params(
            [("limit", "10"), ("offset", "-5")],
            &FeedDefaults::default(),
        );
        assert!(matches!(result, Err(FeedError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_chunk_size_is_invalid() {
        let request =
            FeedConfig::from_params([("chunk_size", "0")], &FeedDefaults::default()).unwrap();
        assert!(matches!(
            request.config.validate(),
            Err(FeedError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_int_prefix("42abc"), 42);
        assert_eq!(parse_int_prefix("-7"), -7);
        assert_eq!(parse_int_prefix("abc"), 0);
        assert!(parse_flag("On"));
        assert!(parse_flag("2"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("No"));
    }

    #[test]
    fn test_separator_validation() {
        let bad = Separators {
            replacement: '|',
            ..Separators::default()
        };
        assert!(bad.validate().is_err());

        let bad = Separators {
            tree: "|".to_string(),
            ..Separators::default()
        };
        assert!(bad.validate().is_err());

        let tsv = Separators {
            field: '\t',
            ..Separators::default()
        };
        assert!(tsv.validate().is_ok());

        for field in ['.', ' ', ':', '/', '?', '&', '=', '%', '_', '\n', '\r', 'x', '7'] {
            let bad = Separators {
                field,
                ..Separators::default()
            };
            assert!(bad.validate().is_err(), "{field:?} accepted");
        }

        for field in [';', ',', '~', '^'] {
            let ok = Separators {
                field,
                ..Separators::default()
            };
            assert!(ok.validate().is_ok(), "{field:?} rejected");
        }
    }

    #[test]
    fn test_store_links() {
        let links = StoreLinks::new("http://shop.example.com/catalog");
        assert_eq!(
            links.product_url("EUR", 7),
            "http://shop.example.com/catalog/product_info.php?currency=EUR&products_id=7"
        );
        assert_eq!(
            links.image_url("/shoes/trail.jpg"),
            "http://shop.example.com/catalog/images/shoes/trail.jpg"
        );
    }
}
