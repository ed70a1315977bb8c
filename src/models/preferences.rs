use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt::Display, str::FromStr};

use super::GenreTaxonomy;

/// Identifies a genre either by its numeric id or by display name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenreSelector {
    ById(u32),
    /// Matched case-insensitively against the taxonomy
    ByName(String),
}

impl GenreSelector {
    /// Resolves the selector to an id known to the taxonomy
    pub fn resolve(&self, genres: &GenreTaxonomy) -> Option<u32> {
        match self {
            GenreSelector::ById(id) => genres.contains(*id).then_some(*id),
            GenreSelector::ByName(name) => genres.find_by_name(name),
        }
    }
}

impl FromStr for GenreSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("genre cannot be empty".to_string());
        }
        Ok(match s.parse::<u32>() {
            Ok(id) => GenreSelector::ById(id),
            Err(_) => GenreSelector::ByName(s.to_string()),
        })
    }
}

impl Display for GenreSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenreSelector::ById(id) => write!(f, "{}", id),
            GenreSelector::ByName(name) => write!(f, "{}", name),
        }
    }
}

/// The user's preferred genre ids
///
/// Backed by an ordered set so that serialization is always sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreferenceSet {
    ids: BTreeSet<u32>,
}

impl PreferenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.ids.contains(&id)
    }

    /// Ids in ascending order
    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.ids.iter().copied()
    }

    pub fn insert(&mut self, id: u32) -> bool {
        self.ids.insert(id)
    }

    pub fn remove(&mut self, id: u32) -> bool {
        self.ids.remove(&id)
    }

    /// Adds every known genre; unknown selectors are ignored
    pub fn add(&mut self, selectors: &[GenreSelector], genres: &GenreTaxonomy) {
        for selector in selectors {
            if let Some(id) = selector.resolve(genres) {
                self.ids.insert(id);
            }
        }
    }

    /// Removes genres. Ids are dropped even if the taxonomy no longer lists them.
    pub fn remove_all(&mut self, selectors: &[GenreSelector], genres: &GenreTaxonomy) {
        for selector in selectors {
            let id = match selector {
                GenreSelector::ById(id) => Some(*id),
                GenreSelector::ByName(name) => genres.find_by_name(name),
            };
            if let Some(id) = id {
                self.ids.remove(&id);
            }
        }
    }

    /// Removes ids already present and adds the rest
    pub fn toggle(&mut self, ids: impl IntoIterator<Item = u32>) {
        for id in ids {
            if !self.ids.remove(&id) {
                self.ids.insert(id);
            }
        }
    }

    /// Display names in ascending id order
    pub fn names(&self, genres: &GenreTaxonomy) -> Vec<String> {
        self.ids
            .iter()
            .map(|id| genres.name_or_id(*id).into_owned())
            .collect()
    }
}

impl FromIterator<u32> for PreferenceSet {
    fn from_iter<T: IntoIterator<Item = u32>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}
