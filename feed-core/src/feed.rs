//! Feed run orchestration
//!
//! A [`FeedRun`] validates the request against the repository, prepares
//! the per-run lookups once (category paths, currency, sanitizer) and then
//! streams one record per active product. Validation failures are answered
//! with an [`ErrorPayload`] instead of the feed; nothing else is written.

use crate::category::CategoryIndex;
use crate::config::FeedConfig;
use crate::currency::CurrencyConverter;
use crate::error::{FeedError, FeedResult};
use crate::paginator::FeedPaginator;
use crate::repository::ProductRepository;
use crate::sanitize::{TextSanitizer, clean_references, split_references};
use crate::writer::{Availability, FeedRecord, FeedSink, FeedWriter};
use shared::{CurrencyInfo, ErrorPayload, Language, Product};
use tracing::{info, instrument, warn};

/// Counters for a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedSummary {
    pub batches: u64,
    pub rows_read: u64,
    pub records_written: u64,
    pub skipped_inactive: u64,
    pub header_written: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedOutcome {
    /// The feed was streamed
    Completed(FeedSummary),
    /// The request was rejected before any feed output; the payload was
    /// written to the sink instead
    Rejected(ErrorPayload),
}

/// Turns products into cleaned records; built once per run
pub struct RecordBuilder<'a> {
    config: &'a FeedConfig,
    categories: CategoryIndex,
    converter: CurrencyConverter,
    sanitizer: TextSanitizer,
}

impl RecordBuilder<'_> {
    pub fn build(&self, product: &Product) -> FeedRecord {
        let clean = |text: &str| self.sanitizer.clean(text);
        let title = clean(&product.title);

        let link = self
            .config
            .links
            .product_url(&self.config.currency, product.id);
        let image_link = self.config.links.image_url(&product.image_path);
        let categories = self
            .categories
            .product_paths(&product.category_ids)
            .join(&self.config.separators.category);

        let (price, sale_price) = if self.config.show_prices {
            let tax = product.tax_rate.as_deref();
            (
                self.converter.price(product.price.as_deref(), tax),
                self.converter.price(product.sale_price.as_deref(), tax),
            )
        } else {
            (None, None)
        };

        FeedRecord {
            id: product.id,
            link: self.sanitizer.clean_url(&link),
            description: clean(&product.description),
            image_link: self.sanitizer.clean_url(&image_link),
            categories: clean(&categories),
            availability: Availability::from_quantity(product.quantity),
            brand: clean(product.brand.as_deref().unwrap_or_default()),
            mpn: clean(product.mpn.as_deref().unwrap_or_default()),
            price,
            sale_price,
            extra_title_1: clean_references(&title),
            extra_title_2: split_references(&title),
            title,
        }
    }
}

/// One export over a repository
pub struct FeedRun<R> {
    repo: R,
    config: FeedConfig,
}

impl<R: ProductRepository> FeedRun<R> {
    pub fn new(repo: R, config: FeedConfig) -> Self {
        Self { repo, config }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Pre-flight checks: options, then currency, then language
    ///
    /// Returns the resolved language.
    pub fn validate(&self) -> FeedResult<Language> {
        self.config.validate()?;

        let currencies = self.repo.currencies()?;
        if !currencies
            .iter()
            .any(|c| c.code.eq_ignore_ascii_case(&self.config.currency))
        {
            return Err(FeedError::InvalidCurrency {
                code: self.config.currency.clone(),
                valid: currencies.iter().map(|c| c.code.to_uppercase()).collect(),
            });
        }

        let languages = self.repo.languages()?;
        match languages.iter().find(|l| l.matches(&self.config.language)) {
            Some(language) => Ok(language.clone()),
            None => Err(FeedError::InvalidLanguage {
                code: self.config.language.clone(),
                valid: languages
                    .iter()
                    .map(|l| format!("{} ({})", l.code, l.name))
                    .collect(),
            }),
        }
    }

    /// Build the per-run lookups for a validated language
    pub fn prepare(&self, language: &Language) -> FeedResult<RecordBuilder<'_>> {
        let categories = self.repo.categories(language.id)?;
        let index = CategoryIndex::build(&categories, &self.config.separators.tree)?;

        let currency = match self.repo.currency(&self.config.currency)? {
            Some(currency) => currency,
            None => {
                warn!(
                    currency = %self.config.currency,
                    "Currency row missing, falling back to base rate"
                );
                CurrencyInfo::base(self.config.currency.clone())
            }
        };

        Ok(RecordBuilder {
            config: &self.config,
            categories: index,
            converter: CurrencyConverter::new(currency, self.config.show_final_prices),
            sanitizer: TextSanitizer::new(&self.config.separators),
        })
    }

    /// Stream the feed into `sink`
    ///
    /// Pre-flight failures write the error payload JSON to the sink and
    /// return [`FeedOutcome::Rejected`]. Repository and sink failures after
    /// that are returned as errors; the output is then incomplete.
    #[instrument(skip_all, fields(language = %self.config.language, currency = %self.config.currency))]
    pub fn execute<S: FeedSink>(&self, mut sink: S) -> FeedResult<FeedOutcome> {
        let prepared = self
            .validate()
            .and_then(|language| Ok((self.prepare(&language)?, language)));

        let (builder, language) = match prepared {
            Ok(prepared) => prepared,
            Err(e) if e.is_preflight() => {
                warn!(error = %e, "Feed request rejected");
                let payload = e.payload();
                let mut json = payload.to_json();
                json.push('\n');
                sink.write_record(json.as_bytes())?;
                sink.flush()?;
                return Ok(FeedOutcome::Rejected(payload));
            }
            Err(e) => return Err(e),
        };

        info!(
            language_id = language.id,
            rate = %builder.converter.currency().rate,
            chunk_size = self.config.effective_chunk_size(),
            window = ?self.config.window,
            "Feed run started"
        );

        let mut summary = FeedSummary::default();
        let mut writer = FeedWriter::new(sink, &self.config);
        if self.config.emits_header() {
            writer.write_header()?;
            summary.header_written = true;
        }

        for batch in FeedPaginator::new(&self.repo, language.id, &self.config) {
            let batch = batch?;
            summary.batches += 1;
            summary.rows_read += batch.products.len() as u64;
            summary.skipped_inactive += (batch.products.len() - batch.active().count()) as u64;

            for product in batch.active() {
                writer.write_record(&builder.build(product))?;
            }
        }

        summary.records_written = writer.records();
        writer.finish()?;

        info!(
            batches = summary.batches,
            rows = summary.rows_read,
            records = summary.records_written,
            skipped = summary.skipped_inactive,
            "Feed run finished"
        );
        Ok(FeedOutcome::Completed(summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeedDefaults;
    use crate::repository::MemoryCatalog;
    use rust_decimal::Decimal;
    use shared::{Category, FeedErrorCode};

    fn catalog() -> MemoryCatalog {
        let mut product = Product::new(7, "Trail <b>Runner</b> Model5X-Pro");
        product.description = "Light &amp; fast | grippy".into();
        product.brand = Some("Acme".into());
        product.quantity = 2;
        product.price = Some("100".into());
        product.sale_price = Some("0".into());
        product.tax_rate = Some("21".into());
        product.image_path = "shoes/trail runner.jpg".into();
        product.category_ids = vec![1, 2];

        MemoryCatalog::new()
            .with_language(Language::new(1, "en", "English"))
            .with_language(Language::new(2, "es", "Español"))
            .with_currency(CurrencyInfo::base("EUR"))
            .with_currency(CurrencyInfo::new("USD", Decimal::new(11, 1), 2))
            .with_category(1, Category::new(1, 0, "Shoes"))
            .with_category(1, Category::new(2, 1, "Running"))
            .with_product(1, product)
    }

    #[test]
    fn test_build_record() {
        let catalog = catalog();
        let run = FeedRun::new(&catalog, FeedConfig::new(&FeedDefaults::default()));
        let language = run.validate().unwrap();
        let builder = run.prepare(&language).unwrap();

        let product = &catalog.products(1, 1, 0).unwrap()[0];
        let record = builder.build(product);

        assert_eq!(record.title, "Trail Runner Model5X-Pro");
        assert_eq!(
            record.link,
            "http://localhost/catalog/product_info.php?currency=EUR&products_id=7"
        );
        assert_eq!(record.description, "Light & fast - grippy");
        assert_eq!(
            record.image_link,
            "http://localhost/catalog/images/shoes/trail%20runner.jpg"
        );
        assert_eq!(record.categories, "Shoes>Running");
        assert_eq!(record.availability, Availability::InStock);
        assert_eq!(record.brand, "Acme");
        assert_eq!(record.mpn, "");
        assert_eq!(record.price.as_deref(), Some("121.00"));
        assert_eq!(record.sale_price, None);
        assert_eq!(record.extra_title_1, "Trail Runner Model5XPro");
        assert_eq!(record.extra_title_2, "Trail Runner Model 5X-Pro");
    }

    #[test]
    fn test_currency_checked_before_language() {
        let catalog = catalog();
        let mut config = FeedConfig::new(&FeedDefaults::default());
        config.currency = "GBP".into();
        config.language = "fr".into();

        let err = FeedRun::new(&catalog, config).validate().unwrap_err();
        assert_eq!(err.code(), FeedErrorCode::InvalidCurrency);
        assert_eq!(err.hint().as_deref(), Some("Valid values are: EUR, USD"));
    }

    #[test]
    fn test_language_hint_lists_names() {
        let catalog = catalog();
        let mut config = FeedConfig::new(&FeedDefaults::default());
        config.language = "fr".into();

        let err = FeedRun::new(&catalog, config).validate().unwrap_err();
        assert_eq!(
            err.hint().as_deref(),
            Some("Valid values are: en (English), es (Español)")
        );
    }

    #[test]
    fn test_language_code_ignores_case() {
        let catalog = catalog();
        let mut config = FeedConfig::new(&FeedDefaults::default());
        config.language = "ES".into();

        assert_eq!(FeedRun::new(&catalog, config).validate().unwrap().id, 2);
    }

    #[test]
    fn test_prices_hidden() {
        let catalog = catalog();
        let mut config = FeedConfig::new(&FeedDefaults::default());
        config.show_prices = false;
        let run = FeedRun::new(&catalog, config);
        let builder = run.prepare(&run.validate().unwrap()).unwrap();

        let record = builder.build(&catalog.products(1, 1, 0).unwrap()[0]);
        assert_eq!(record.price, None);
    }
}
