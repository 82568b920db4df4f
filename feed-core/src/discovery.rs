//! Discovery document
//!
//! Answers `config=1` requests: which platform serves the feed, where the
//! feed lives and which languages and currencies it can be asked for.

use crate::config::FeedDefaults;
use crate::error::FeedResult;
use crate::repository::ProductRepository;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;

pub const UNKNOWN_VERSION: &str = "UNKNOWN";

/// Trailing `vX.Y[.Z]` of a project version string, with an optional suffix
static PROJECT_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"v(([0-9]+\.[0-9]+(?:\.[0-9]+)?)(\s.*)?)$").expect("valid regex"));

/// Storefront identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreInfo {
    pub platform_name: String,
    /// Raw project version, e.g. "osCommerce Online Merchant v2.3.4"
    pub project_version: Option<String>,
    /// Public URL of the feed endpoint
    pub feed_url: String,
}

impl Default for StoreInfo {
    fn default() -> Self {
        Self {
            platform_name: "osCommerce".to_string(),
            project_version: None,
            feed_url: "http://localhost/catalog/doofinder.php".to_string(),
        }
    }
}

impl StoreInfo {
    /// Platform version number, or [`UNKNOWN_VERSION`]
    ///
    /// 2.2 release candidates identify themselves as 2.3.0.
    pub fn platform_version(&self) -> String {
        let Some(caps) = self
            .project_version
            .as_deref()
            .and_then(|raw| PROJECT_VERSION.captures(raw))
        else {
            return UNKNOWN_VERSION.to_string();
        };

        let version = &caps[2];
        let is_release_candidate = caps
            .get(3)
            .is_some_and(|suffix| suffix.as_str().trim().starts_with("RC"));
        if version == "2.2" && is_release_candidate {
            return "2.3.0".to_string();
        }
        version.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleOptions {
    /// Upper-cased language codes
    pub language: Vec<String>,
    pub currency: Vec<String>,
}

/// Per-language feed options
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageOptions {
    pub language: String,
    pub prices: bool,
    pub taxes: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleInfo {
    pub version: String,
    pub feed: String,
    pub options: ModuleOptions,
    pub configuration: BTreeMap<String, LanguageOptions>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveryDocument {
    pub platform: PlatformInfo,
    pub module: ModuleInfo,
}

impl DiscoveryDocument {
    pub fn build<R: ProductRepository + ?Sized>(
        repo: &R,
        store: &StoreInfo,
        defaults: &FeedDefaults,
    ) -> FeedResult<Self> {
        let languages: Vec<String> = repo
            .languages()?
            .into_iter()
            .map(|l| l.code.to_uppercase())
            .collect();
        let currencies = repo
            .currencies()?
            .into_iter()
            .map(|c| c.code.to_uppercase())
            .collect();

        let configuration = languages
            .iter()
            .map(|code| {
                let options = LanguageOptions {
                    language: code.clone(),
                    prices: defaults.show_prices,
                    taxes: defaults.show_final_prices,
                };
                (code.clone(), options)
            })
            .collect();

        Ok(Self {
            platform: PlatformInfo {
                name: store.platform_name.clone(),
                version: store.platform_version(),
            },
            module: ModuleInfo {
                version: env!("CARGO_PKG_VERSION").to_string(),
                feed: store.feed_url.clone(),
                options: ModuleOptions {
                    language: languages,
                    currency: currencies,
                },
                configuration,
            },
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryCatalog;
    use shared::{CurrencyInfo, Language};

    fn store(version: &str) -> StoreInfo {
        StoreInfo {
            project_version: Some(version.to_string()),
            ..StoreInfo::default()
        }
    }

    #[test]
    fn test_platform_version() {
        assert_eq!(store("osCommerce Online Merchant v2.3.4").platform_version(), "2.3.4");
        assert_eq!(store("osCommerce v2.3").platform_version(), "2.3");
        assert_eq!(store("osCommerce 2.2-MS2").platform_version(), UNKNOWN_VERSION);
        assert_eq!(StoreInfo::default().platform_version(), UNKNOWN_VERSION);
    }

    #[test]
    fn test_release_candidate_reports_next_version() {
        assert_eq!(store("osCommerce v2.2 RC2a").platform_version(), "2.3.0");
        assert_eq!(store("osCommerce v2.2 MS2").platform_version(), "2.2");
    }

    #[test]
    fn test_document_layout() {
        let catalog = MemoryCatalog::new()
            .with_language(Language::new(1, "en", "English"))
            .with_language(Language::new(2, "es", "Español"))
            .with_currency(CurrencyInfo::base("EUR"))
            .with_currency(CurrencyInfo::base("usd"));
        let document =
            DiscoveryDocument::build(&catalog, &store("v2.3.4"), &FeedDefaults::default()).unwrap();

        let json: serde_json::Value = serde_json::from_str(&document.to_json().unwrap()).unwrap();
        assert_eq!(json["platform"]["name"], "osCommerce");
        assert_eq!(json["platform"]["version"], "2.3.4");
        assert_eq!(json["module"]["options"]["language"], serde_json::json!(["EN", "ES"]));
        assert_eq!(json["module"]["options"]["currency"], serde_json::json!(["EUR", "USD"]));
        assert_eq!(
            json["module"]["configuration"]["ES"],
            serde_json::json!({"language": "ES", "prices": true, "taxes": true})
        );
        assert_eq!(json["module"]["version"], env!("CARGO_PKG_VERSION"));
    }
}
