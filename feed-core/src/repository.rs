//! Catalog repository
//!
//! [`ProductRepository`] is the only way the pipeline reads the store. A SQL
//! backend, an HTTP client or the in-memory [`MemoryCatalog`] all plug in
//! behind it.

use crate::error::RepoResult;
use shared::{Category, CurrencyInfo, Language, Product};
use std::collections::BTreeMap;

/// Read-only access to the catalog
///
/// Implementations must return products in ascending id order so that
/// `LIMIT`/`OFFSET` batches never overlap or skip rows.
pub trait ProductRepository {
    /// Languages in store sort order
    fn languages(&self) -> RepoResult<Vec<Language>>;

    fn currencies(&self) -> RepoResult<Vec<CurrencyInfo>>;

    /// Currency by ISO code (case-insensitive)
    fn currency(&self, code: &str) -> RepoResult<Option<CurrencyInfo>> {
        Ok(self
            .currencies()?
            .into_iter()
            .find(|c| c.code.eq_ignore_ascii_case(code)))
    }

    /// All categories of one language
    fn categories(&self, language_id: i64) -> RepoResult<Vec<Category>>;

    /// Rows eligible for the feed, inactive ones included
    fn count_products(&self, language_id: i64) -> RepoResult<u64>;

    /// One page of products, ascending by id
    fn products(&self, language_id: i64, limit: u64, offset: u64) -> RepoResult<Vec<Product>>;
}

impl<R: ProductRepository + ?Sized> ProductRepository for &R {
    fn languages(&self) -> RepoResult<Vec<Language>> {
        (**self).languages()
    }

    fn currencies(&self) -> RepoResult<Vec<CurrencyInfo>> {
        (**self).currencies()
    }

    fn currency(&self, code: &str) -> RepoResult<Option<CurrencyInfo>> {
        (**self).currency(code)
    }

    fn categories(&self, language_id: i64) -> RepoResult<Vec<Category>> {
        (**self).categories(language_id)
    }

    fn count_products(&self, language_id: i64) -> RepoResult<u64> {
        (**self).count_products(language_id)
    }

    fn products(&self, language_id: i64, limit: u64, offset: u64) -> RepoResult<Vec<Product>> {
        (**self).products(language_id, limit, offset)
    }
}

/// In-memory catalog
///
/// Rows are keyed by `(language_id, id)`, so product pages come out in id
/// order without sorting.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    languages: Vec<Language>,
    currencies: Vec<CurrencyInfo>,
    categories: BTreeMap<(i64, i64), Category>,
    products: BTreeMap<(i64, i64), Product>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.add_language(language);
        self
    }

    pub fn with_currency(mut self, currency: CurrencyInfo) -> Self {
        self.add_currency(currency);
        self
    }

    pub fn with_category(mut self, language_id: i64, category: Category) -> Self {
        self.add_category(language_id, category);
        self
    }

    pub fn with_product(mut self, language_id: i64, product: Product) -> Self {
        self.add_product(language_id, product);
        self
    }

    pub fn add_language(&mut self, language: Language) {
        self.languages.push(language);
    }

    pub fn add_currency(&mut self, currency: CurrencyInfo) {
        self.currencies.push(currency);
    }

    /// Insert or replace a category translation
    pub fn add_category(&mut self, language_id: i64, category: Category) {
        self.categories.insert((language_id, category.id), category);
    }

    /// Insert or replace a product translation
    pub fn add_product(&mut self, language_id: i64, product: Product) {
        self.products.insert((language_id, product.id), product);
    }
}

impl ProductRepository for MemoryCatalog {
    fn languages(&self) -> RepoResult<Vec<Language>> {
        Ok(self.languages.clone())
    }

    fn currencies(&self) -> RepoResult<Vec<CurrencyInfo>> {
        Ok(self.currencies.clone())
    }

    fn categories(&self, language_id: i64) -> RepoResult<Vec<Category>> {
        Ok(self
            .categories
            .range((language_id, i64::MIN)..=(language_id, i64::MAX))
            .map(|(_, category)| category.clone())
            .collect())
    }

    fn count_products(&self, language_id: i64) -> RepoResult<u64> {
        let count = self
            .products
            .range((language_id, i64::MIN)..=(language_id, i64::MAX))
            .count();
        Ok(count as u64)
    }

    fn products(&self, language_id: i64, limit: u64, offset: u64) -> RepoResult<Vec<Product>> {
        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(self
            .products
            .range((language_id, i64::MIN)..=(language_id, i64::MAX))
            .skip(skip)
            .take(take)
            .map(|(_, product)| product.clone())
            .collect())
    }
}
