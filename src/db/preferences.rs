use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{GenreSelector, GenreTaxonomy, PreferenceSet},
};

const PREFERENCES_DIR: &str = "userPreferences";
const PREFERENCES_FILE: &str = "preferences.json";

/// `<home>/userPreferences/preferences.json`, if a home directory exists
pub fn default_preferences_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(PREFERENCES_DIR).join(PREFERENCES_FILE))
}

/// File-backed store for the user's preferred genres
///
/// The file holds a single JSON array of genre ids. Reads never fail: a
/// missing, unreadable or malformed file is treated as "no preferences".
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
    genres: Arc<GenreTaxonomy>,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>, genres: Arc<GenreTaxonomy>) -> Self {
        Self {
            path: path.into(),
            genres,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn genres(&self) -> &GenreTaxonomy {
        &self.genres
    }

    /// Loads the saved preference set
    pub async fn load(&self) -> PreferenceSet {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No preferences file yet");
                return PreferenceSet::new();
            }
            Err(e) => {
                tracing::warn!(error = %e, path = %self.path.display(), "Failed to read preferences");
                return PreferenceSet::new();
            }
        };

        match serde_json::from_str::<PreferenceSet>(&raw) {
            Ok(prefs) => prefs,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %self.path.display(),
                    "Ignoring malformed preferences file"
                );
                PreferenceSet::new()
            }
        }
    }

    /// Writes the set as a pretty-printed, sorted JSON array
    pub async fn save(&self, prefs: &PreferenceSet) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(prefs)
            .map_err(|e| AppError::Preferences(std::io::Error::other(e)))?;
        tokio::fs::write(&self.path, json).await?;

        tracing::debug!(
            path = %self.path.display(),
            count = prefs.len(),
            "Preferences saved"
        );
        Ok(())
    }

    /// Human-readable names of the saved genres, in ascending id order
    pub async fn list_names(&self) -> Vec<String> {
        self.load().await.names(&self.genres)
    }

    /// Adds genres by id or case-insensitive name; unknown entries are ignored
    pub async fn add(&self, selectors: &[GenreSelector]) -> AppResult<PreferenceSet> {
        let mut prefs = self.load().await;
        prefs.add(selectors, &self.genres);
        self.save(&prefs).await?;
        Ok(prefs)
    }

    /// Removes genres by id or case-insensitive name
    pub async fn remove(&self, selectors: &[GenreSelector]) -> AppResult<PreferenceSet> {
        let mut prefs = self.load().await;
        prefs.remove_all(selectors, &self.genres);
        self.save(&prefs).await?;
        Ok(prefs)
    }

    /// Selects ids that are not saved yet and deselects the ones that are
    pub async fn toggle_ids(
        &self,
        ids: impl IntoIterator<Item = u32>,
    ) -> AppResult<PreferenceSet> {
        let mut prefs = self.load().await;
        prefs.toggle(ids);
        self.save(&prefs).await?;
        Ok(prefs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Genre;

    fn genres() -> Arc<GenreTaxonomy> {
        Arc::new(GenreTaxonomy::new(vec![
            Genre { id: 28, name: "Action".to_string() },
            Genre { id: 3, name: "Three".to_string() },
            Genre { id: 8, name: "Eight".to_string() },
        ]))
    }

    fn store_in(dir: &tempfile::TempDir) -> PreferenceStore {
        PreferenceStore::new(dir.path().join("nested").join("prefs.json"), genres())
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = PreferenceStore::new(&path, genres());
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_wrong_type_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, r#"["Action", "Drama"]"#).unwrap();
        let store = PreferenceStore::new(&path, genres());
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_toggle_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&[3].into_iter().collect()).await.unwrap();

        let toggled = store.toggle_ids([3, 8]).await.unwrap();
        assert_eq!(toggled.ids().collect::<Vec<_>>(), vec![8]);

        let reloaded = store.load().await;
        assert_eq!(reloaded, toggled);
    }

    #[tokio::test]
    async fn test_saved_file_is_sorted_array() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store
            .save(&[28, 3, 8].into_iter().collect())
            .await
            .unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let ids: Vec<u32> = serde_json::from_str(&raw).unwrap();
        assert_eq!(ids, vec![3, 8, 28]);
    }

    #[tokio::test]
    async fn test_add_by_name_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store
            .add(&[GenreSelector::ByName("ACTION".to_string())])
            .await
            .unwrap();
        assert_eq!(store.list_names().await, vec!["Action"]);

        store
            .remove(&[GenreSelector::ByName("action".to_string())])
            .await
            .unwrap();
        assert!(store.list_names().await.is_empty());
    }
}
