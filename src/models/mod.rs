use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

pub mod genre;
pub mod preferences;

pub use genre::{Genre, GenreTaxonomy};
pub use preferences::{GenreSelector, PreferenceSet};

/// Catalog browsing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Currently in theatres
    Playing,
    Popular,
    Upcoming,
    /// Highest rated of all time
    Top,
}

impl Category {
    /// TMDB path segment for the "list by category" endpoint
    pub fn path_segment(&self) -> &'static str {
        match self {
            Category::Playing => "now_playing",
            Category::Popular => "popular",
            Category::Upcoming => "upcoming",
            Category::Top => "top_rated",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Category::Playing => "playing",
            Category::Popular => "popular",
            Category::Upcoming => "upcoming",
            Category::Top => "top",
        };
        write!(f, "{}", name)
    }
}

pub const EARLIEST_RELEASE_YEAR: i32 = 1900;

/// A release year accepted by the discover endpoint
///
/// Bounded to `[1900, current_year + 1]` so upcoming releases can still be
/// browsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ReleaseYear(i32);

impl ReleaseYear {
    pub fn new(year: i32) -> Result<Self, String> {
        let latest = chrono::Utc::now().year() + 1;
        if (EARLIEST_RELEASE_YEAR..=latest).contains(&year) {
            Ok(Self(year))
        } else {
            Err(format!(
                "{} is not in the range {}..={}",
                year, EARLIEST_RELEASE_YEAR, latest
            ))
        }
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

impl FromStr for ReleaseYear {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let year: i32 = s
            .trim()
            .parse()
            .map_err(|_| format!("'{}' is not a year", s))?;
        Self::new(year)
    }
}

impl Display for ReleaseYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A movie as returned by the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub release_date: String,
    /// Average rating on a 0-10 scale
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
}

/// One page of catalog results
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Page {
    #[serde(rename = "results")]
    pub items: Vec<CatalogItem>,
    pub total_pages: u32,
}

/// A candidate movie, optionally carrying the ranking service's justification
#[derive(Debug, Clone, PartialEq)]
pub struct ShortlistEntry {
    pub item: CatalogItem,
    pub reason: Option<String>,
}

impl ShortlistEntry {
    /// Copies `item` and attaches a justification
    pub fn ranked(item: &CatalogItem, reason: impl Into<String>) -> Self {
        Self {
            item: item.clone(),
            reason: Some(reason.into()),
        }
    }
}

/// A validated (identifier, justification) pair from the ranking service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingPick {
    pub id: u64,
    pub reason: String,
}
