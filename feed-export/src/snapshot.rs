//! Catalog snapshot loading
//!
//! A snapshot is a JSON dump of the store tables the feed reads:
//!
//! ```json
//! {
//!   "store": {"catalog_url": "http://shop.example.com/catalog/", "project_version": "osCommerce Online Merchant v2.3.4"},
//!   "currencies": [{"code": "EUR", "rate": "1.0", "decimal_places": 2}],
//!   "languages": [
//!     {"language": {"id": 1, "code": "en", "name": "English"}, "categories": [], "products": []}
//!   ]
//! }
//! ```
//!
//! Dumps taken from Latin-1 tables are repaired to UTF-8 before parsing.

use anyhow::Context;
use feed_core::{MemoryCatalog, StoreInfo, StoreLinks, to_utf8};
use serde::Deserialize;
use shared::{Category, CurrencyInfo, Language, Product};
use std::borrow::Cow;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StoreSection {
    catalog_url: Option<String>,
    product_page: Option<String>,
    images_dir: Option<String>,
    platform_name: Option<String>,
    project_version: Option<String>,
    feed_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LanguageSection {
    language: Language,
    #[serde(default)]
    categories: Vec<Category>,
    #[serde(default)]
    products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    store: StoreSection,
    #[serde(default)]
    currencies: Vec<CurrencyInfo>,
    languages: Vec<LanguageSection>,
}

/// Everything the exporter needs from one snapshot
#[derive(Debug)]
pub struct Snapshot {
    pub catalog: MemoryCatalog,
    pub store: StoreInfo,
    pub links: StoreLinks,
}

pub fn load(path: &Path) -> anyhow::Result<Snapshot> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    let text = to_utf8(&bytes);
    if let Cow::Owned(_) = text {
        warn!(path = %path.display(), "Snapshot is not valid UTF-8, repaired as Windows-1252");
    }
    let file: SnapshotFile = serde_json::from_str(&text)
        .with_context(|| format!("Invalid snapshot {}", path.display()))?;

    info!(
        path = %path.display(),
        languages = file.languages.len(),
        currencies = file.currencies.len(),
        "Snapshot loaded"
    );
    Ok(file.into_snapshot())
}

impl SnapshotFile {
    fn into_snapshot(self) -> Snapshot {
        let Self {
            store,
            currencies,
            languages,
        } = self;

        let mut catalog = MemoryCatalog::new();
        for currency in currencies {
            catalog.add_currency(currency);
        }
        for section in languages {
            let language_id = section.language.id;
            catalog.add_language(section.language);
            for category in section.categories {
                catalog.add_category(language_id, category);
            }
            for product in section.products {
                catalog.add_product(language_id, product);
            }
        }

        let mut links = store
            .catalog_url
            .map(StoreLinks::new)
            .unwrap_or_default();
        if let Some(page) = store.product_page {
            links.product_page = page;
        }
        if let Some(dir) = store.images_dir {
            links.images_dir = dir;
        }

        let defaults = StoreInfo::default();
        let store = StoreInfo {
            platform_name: store.platform_name.unwrap_or(defaults.platform_name),
            project_version: store.project_version,
            feed_url: store.feed_url.unwrap_or(defaults.feed_url),
        };

        Snapshot {
            catalog,
            store,
            links,
        }
    }
}
