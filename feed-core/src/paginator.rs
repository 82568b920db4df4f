//! Batched product retrieval
//!
//! [`FeedPaginator`] walks the product set in `LIMIT chunk OFFSET pos`
//! pages. Without a window it counts the rows first and covers
//! `[0, count)`; with a window it covers `[offset, offset + limit)` and
//! shortens the last page so nothing past the window is fetched.

use crate::config::FeedConfig;
use crate::error::RepoResult;
use crate::repository::ProductRepository;
use shared::Product;
use tracing::debug;

/// One page of products
#[derive(Debug, Clone)]
pub struct Batch {
    /// Position of the first row
    pub offset: u64,
    /// Page size asked for
    pub requested: u64,
    pub products: Vec<Product>,
}

impl Batch {
    /// Products that belong in the feed; inactive rows still used their slot
    pub fn active(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| p.is_active())
    }

    /// Fewer rows than requested means the store has no more
    pub fn is_short(&self) -> bool {
        (self.products.len() as u64) < self.requested
    }
}

#[derive(Debug, Clone, Copy)]
enum Range {
    /// Not resolved yet (row count still unknown)
    Pending,
    Active { position: u64, end: u64 },
    Finished,
}

/// Iterator over product batches
///
/// Any repository error is yielded once and ends the iteration.
pub struct FeedPaginator<'a, R: ?Sized> {
    repo: &'a R,
    language_id: i64,
    chunk: u64,
    window: Option<(u64, u64)>,
    range: Range,
}

impl<'a, R: ProductRepository + ?Sized> FeedPaginator<'a, R> {
    pub fn new(repo: &'a R, language_id: i64, config: &FeedConfig) -> Self {
        Self {
            repo,
            language_id,
            chunk: config.effective_chunk_size().max(1),
            window: config.window.map(|w| (w.offset, w.end())),
            range: Range::Pending,
        }
    }

    fn resolve_range(&self) -> RepoResult<Range> {
        let (position, end) = match self.window {
            Some(bounds) => bounds,
            None => (0, self.repo.count_products(self.language_id)?),
        };
        debug!(start = position, end, chunk = self.chunk, "Pagination range resolved");
        Ok(Range::Active { position, end })
    }
}

impl<R: ProductRepository + ?Sized> Iterator for FeedPaginator<'_, R> {
    type Item = RepoResult<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Range::Pending = self.range {
            match self.resolve_range() {
                Ok(range) => self.range = range,
                Err(e) => {
                    self.range = Range::Finished;
                    return Some(Err(e));
                }
            }
        }

        let Range::Active { position, end } = self.range else {
            return None;
        };
        if position >= end {
            self.range = Range::Finished;
            return None;
        }

        let size = self.chunk.min(end - position);
        let products = match self.repo.products(self.language_id, size, position) {
            Ok(products) => products,
            Err(e) => {
                self.range = Range::Finished;
                return Some(Err(e));
            }
        };

        let batch = Batch {
            offset: position,
            requested: size,
            products,
        };
        debug!(
            offset = batch.offset,
            size = batch.requested,
            rows = batch.products.len(),
            "Fetched product batch"
        );

        self.range = if batch.is_short() {
            Range::Finished
        } else {
            Range::Active {
                position: position + size,
                end,
            }
        };
        Some(Ok(batch))
    }
}
