use serde::Deserialize;
use std::borrow::Cow;

/// A single genre entry from the taxonomy endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

/// Genre id → display name mapping, fetched once per process
///
/// Keeps the order the API listed genres in, which is also the numbering
/// used by the interactive preferences menu. Unknown ids resolve to the raw
/// id instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GenreTaxonomy {
    genres: Vec<Genre>,
}

impl GenreTaxonomy {
    pub fn new(genres: Vec<Genre>) -> Self {
        Self { genres }
    }

    /// A taxonomy with no entries; every lookup falls back to the raw id
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.genres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genres.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Genre> {
        self.genres.iter()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.genres.iter().any(|g| g.id == id)
    }

    pub fn get(&self, id: u32) -> Option<&str> {
        self.genres
            .iter()
            .find(|g| g.id == id)
            .map(|g| g.name.as_str())
    }

    /// Display name for `id`, or the id itself when unknown
    pub fn name_or_id(&self, id: u32) -> Cow<'_, str> {
        match self.get(id) {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(id.to_string()),
        }
    }

    /// Case-insensitive lookup by display name
    pub fn find_by_name(&self, name: &str) -> Option<u32> {
        let needle = name.trim().to_lowercase();
        self.genres
            .iter()
            .find(|g| g.name.to_lowercase() == needle)
            .map(|g| g.id)
    }

    /// Comma-separated names for a list of genre ids
    pub fn describe(&self, ids: &[u32]) -> String {
        ids.iter()
            .map(|id| self.name_or_id(*id))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
