use std::future::Future;
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{CatalogItem, Category, ReleaseYear},
    services::providers::CatalogProvider,
};

/// Incrementally filled read buffer over one catalog query
///
/// Pages are fetched lazily, appended to `cache`, and handed out in batches
/// from `cursor`. `cursor <= cache.len()` always holds and `next_page` only
/// grows. Once the query reports no further pages and the buffer is drained
/// the browser stays exhausted.
pub struct PagedBrowser {
    provider: Arc<dyn CatalogProvider>,
    category: Category,
    year: Option<ReleaseYear>,
    cache: Vec<CatalogItem>,
    cursor: usize,
    next_page: u32,
    total_pages: Option<u32>,
}

impl PagedBrowser {
    pub fn new(
        provider: Arc<dyn CatalogProvider>,
        category: Category,
        year: Option<ReleaseYear>,
    ) -> Self {
        Self {
            provider,
            category,
            year,
            cache: Vec::new(),
            cursor: 0,
            next_page: 1,
            total_pages: None,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn buffered(&self) -> usize {
        self.cache.len()
    }

    pub fn next_page(&self) -> u32 {
        self.next_page
    }

    pub fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    fn is_exhausted(&self) -> bool {
        self.cursor >= self.cache.len()
            && self
                .total_pages
                .is_some_and(|total| self.next_page > total)
    }

    /// Makes sure at least one unread item is buffered
    ///
    /// Returns `false` once the query has no more data. A failed fetch is
    /// returned as-is and leaves the browser untouched, so calling again
    /// retries the same page.
    pub async fn ensure_available(&mut self) -> AppResult<bool> {
        while self.cursor >= self.cache.len() {
            if self.is_exhausted() {
                return Ok(false);
            }

            let page = self
                .provider
                .fetch_page(self.category, self.next_page, self.year)
                .await?;

            // The first response fixes the page count for this query
            let total = *self.total_pages.get_or_insert(page.total_pages);
            if total != page.total_pages {
                tracing::debug!(
                    page = self.next_page,
                    reported = page.total_pages,
                    total,
                    "Ignoring changed page count"
                );
            }

            tracing::debug!(
                page = self.next_page,
                items = page.items.len(),
                total_pages = total,
                "Buffered catalog page"
            );

            self.cache.extend(page.items);
            self.next_page += 1;
        }

        Ok(true)
    }

    /// Returns up to `batch_size` unread items and advances the cursor
    pub async fn next_batch(&mut self, batch_size: usize) -> AppResult<&[CatalogItem]> {
        if batch_size == 0 || !self.ensure_available().await? {
            return Ok(&[]);
        }

        let start = self.cursor;
        let end = start.saturating_add(batch_size).min(self.cache.len());
        self.cursor = end;
        Ok(&self.cache[start..end])
    }
}

/// Why an interactive browsing session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseEnd {
    /// The query ran out of movies
    Exhausted,
    /// The user chose not to continue
    Declined,
}

/// Summary of a finished browsing session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrowseOutcome {
    pub shown: usize,
    pub end: BrowseEnd,
}

/// Drives the show-a-batch / ask-to-continue loop
///
/// After each batch the next page is pre-fetched so the user is only asked
/// to continue when there is something left to show.
pub async fn run_browse_loop<R, C, F>(
    browser: &mut PagedBrowser,
    batch_size: usize,
    mut render: R,
    mut keep_going: C,
) -> AppResult<BrowseOutcome>
where
    R: FnMut(&[CatalogItem]),
    C: FnMut() -> F,
    F: Future<Output = bool>,
{
    let mut shown = 0;

    loop {
        let batch = browser.next_batch(batch_size).await?;
        if batch.is_empty() {
            return Ok(BrowseOutcome {
                shown,
                end: BrowseEnd::Exhausted,
            });
        }

        render(batch);
        shown += batch.len();

        if !browser.ensure_available().await? {
            return Ok(BrowseOutcome {
                shown,
                end: BrowseEnd::Exhausted,
            });
        }

        if !keep_going().await {
            return Ok(BrowseOutcome {
                shown,
                end: BrowseEnd::Declined,
            });
        }
    }
}
