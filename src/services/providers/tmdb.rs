//! TMDB (The Movie Database) provider
//!
//! API Flow:
//! 1. Category listing: /movie/{now_playing|popular|upcoming|top_rated}
//! 2. Year filter: /discover/movie sorted by popularity
//! 3. Genre taxonomy: /genre/movie/list

use crate::{
    error::{AppError, AppResult, FetchCause},
    models::{Category, GenreTaxonomy, Page, ReleaseYear},
    services::providers::CatalogProvider,
};
use reqwest::{header, Client as HttpClient, Request};
use serde::de::DeserializeOwned;
use std::time::Duration;

const LANGUAGE: &str = "en-US";

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbProvider {
    /// Creates a provider whose requests give up after `timeout`
    pub fn new(api_key: String, api_url: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    /// The credential is used verbatim if it already carries a scheme
    fn authorization(&self) -> String {
        if self.api_key.starts_with("Bearer ") {
            self.api_key.clone()
        } else {
            format!("Bearer {}", self.api_key)
        }
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http_client
            .get(format!("{}{}", self.api_url, path))
            .header(header::ACCEPT, "application/json")
            .header(header::AUTHORIZATION, self.authorization())
    }

    /// Builds the request for one page; the year switches to the discover endpoint
    fn page_request(
        &self,
        category: Category,
        page: u32,
        year: Option<ReleaseYear>,
    ) -> AppResult<Request> {
        let page = page.to_string();
        let builder = match year {
            None => self
                .get(&format!("/movie/{}", category.path_segment()))
                .query(&[("language", LANGUAGE), ("page", page.as_str())]),
            Some(year) => {
                let year = year.to_string();
                self.get("/discover/movie").query(&[
                    ("include_adult", "false"),
                    ("include_video", "false"),
                    ("language", LANGUAGE),
                    ("page", page.as_str()),
                    ("primary_release_year", year.as_str()),
                    ("sort_by", "popularity.desc"),
                ])
            }
        };

        builder.build().map_err(|e| FetchCause::Transport(e).into())
    }

    fn genres_request(&self) -> AppResult<Request> {
        self.get("/genre/movie/list")
            .query(&[("language", "en")])
            .build()
            .map_err(|e| FetchCause::Transport(e).into())
    }

    /// Sends a request and decodes the JSON body
    async fn execute<T: DeserializeOwned>(&self, request: Request) -> AppResult<T> {
        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(FetchCause::Transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchCause::Status { status, body }.into());
        }

        let body = response.text().await.map_err(FetchCause::Transport)?;
        decode(&body)
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> AppResult<T> {
    serde_json::from_str(body).map_err(|e| {
        tracing::debug!(error = %e, response = %body, "Failed to deserialize TMDB response");
        FetchCause::Decode(e).into()
    })
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbProvider {
    async fn fetch_page(
        &self,
        category: Category,
        page: u32,
        year: Option<ReleaseYear>,
    ) -> AppResult<Page> {
        if page == 0 {
            return Err(AppError::InvalidInput("Page numbers start at 1".to_string()));
        }

        let request = self.page_request(category, page, year)?;
        let page_data: Page = self.execute(request).await?;

        tracing::info!(
            category = %category,
            page = page,
            year = ?year.map(|y| y.value()),
            results = page_data.items.len(),
            total_pages = page_data.total_pages,
            provider = "tmdb",
            "Catalog page fetched"
        );

        Ok(page_data)
    }

    async fn fetch_genres(&self) -> AppResult<GenreTaxonomy> {
        let request = self.genres_request()?;
        let genres: GenreTaxonomy = self.execute(request).await?;

        tracing::info!(genres = genres.len(), provider = "tmdb", "Genre taxonomy loaded");

        Ok(genres)
    }
}
