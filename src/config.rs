use serde::Deserialize;
use std::path::PathBuf;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB read access token (sent as a bearer credential)
    #[serde(default)]
    api_key: Option<String>,

    /// Fallback name for `API_KEY`
    #[serde(default)]
    tmdb_api_key: Option<String>,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Gemini API key, only needed by `match`
    #[serde(default)]
    gem_api_key: Option<String>,

    /// Fallback name for `GEM_API_KEY`
    #[serde(default)]
    gemini_api_key: Option<String>,

    /// Gemini API base URL
    #[serde(default = "default_gemini_api_url")]
    pub gemini_api_url: String,

    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// Overrides the preferences file location
    #[serde(default)]
    pub prefs_path: Option<PathBuf>,

    /// Per-request timeout for every outbound HTTP call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Pages requested for a recommendation shortlist (before the margin)
    #[serde(default = "default_shortlist_pages")]
    pub shortlist_pages: u32,

    /// Movies shown per batch by `fetch`
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

/// First of the given values that is set and not blank
fn first_set<'a>(primary: &'a Option<String>, fallback: &'a Option<String>) -> Option<&'a str> {
    [primary, fallback]
        .into_iter()
        .filter_map(|value| value.as_deref())
        .find(|value| !value.trim().is_empty())
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_gemini_api_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_shortlist_pages() -> u32 {
    3
}

fn default_batch_size() -> usize {
    5
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from an explicit set of variables
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

        if config.tmdb_credential().is_none() {
            anyhow::bail!("Failed to load config: API_KEY (or TMDB_API_KEY) must be set");
        }

        if config.batch_size == 0 {
            anyhow::bail!("Failed to load config: BATCH_SIZE must be at least 1");
        }

        Ok(config)
    }

    fn tmdb_credential(&self) -> Option<&str> {
        first_set(&self.api_key, &self.tmdb_api_key)
    }

    /// TMDB credential; `API_KEY` wins over `TMDB_API_KEY`
    pub fn api_key(&self) -> &str {
        self.tmdb_credential().unwrap_or_default()
    }

    /// Gemini credential; `GEM_API_KEY` wins over `GEMINI_API_KEY`
    pub fn gemini_api_key(&self) -> Option<&str> {
        first_set(&self.gem_api_key, &self.gemini_api_key)
    }

    /// Resolved preferences file path
    pub fn preferences_path(&self) -> Option<PathBuf> {
        self.prefs_path
            .clone()
            .or_else(crate::db::default_preferences_path)
    }
}
