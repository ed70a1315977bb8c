use crate::{
    error::{AppError, AppResult},
    models::{CatalogItem, Category},
    services::providers::CatalogProvider,
};

/// Extra pages requested on top of the caller's page count
///
/// A few failed pages still leave a full-size shortlist.
pub const SHORTLIST_PAGE_MARGIN: u32 = 3;

/// Collects pages `1..=page_count + SHORTLIST_PAGE_MARGIN` into one list
///
/// Pages are fetched one after another. A failed page is logged and skipped;
/// only an entirely empty result is an error.
pub async fn build_shortlist(
    provider: &dyn CatalogProvider,
    category: Category,
    page_count: u32,
) -> AppResult<Vec<CatalogItem>> {
    let attempts = shortlist_attempts(page_count);
    let mut shortlist = Vec::new();
    let mut failed = 0;

    for page in 1..=attempts {
        match provider.fetch_page(category, page, None).await {
            Ok(page_data) => shortlist.extend(page_data.items),
            Err(e) => {
                failed += 1;
                tracing::warn!(error = %e, page = page, "Failed to fetch shortlist page");
            }
        }
    }

    if shortlist.is_empty() {
        return Err(AppError::EmptyShortlist);
    }

    tracing::info!(
        category = %category,
        attempts = attempts,
        failed = failed,
        items = shortlist.len(),
        "Shortlist built"
    );

    Ok(shortlist)
}

fn shortlist_attempts(page_count: u32) -> u32 {
    page_count.saturating_add(SHORTLIST_PAGE_MARGIN)
}
