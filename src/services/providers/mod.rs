//! Catalog data provider abstraction
//!
//! The browsing cache and shortlist builder only talk to the catalog through
//! this trait, so they can be exercised without a network.

use crate::{
    error::AppResult,
    models::{Category, GenreTaxonomy, Page, ReleaseYear},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Trait for movie catalog providers
///
/// Implementations perform exactly one request per call: no caching and no
/// retries. Every failure (transport, timeout, status, decoding) surfaces as
/// `AppError::CatalogFetch`.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Fetch one page (1-based) of movies
    ///
    /// Without a year this lists the category; with a year it switches to a
    /// discover query sorted by popularity and filtered by release year.
    async fn fetch_page(
        &self,
        category: Category,
        page: u32,
        year: Option<ReleaseYear>,
    ) -> AppResult<Page>;

    /// Fetch the genre id → name taxonomy
    async fn fetch_genres(&self) -> AppResult<GenreTaxonomy>;
}
