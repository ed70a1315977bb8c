use reqwest::StatusCode;

/// Underlying cause of a failed catalog request
#[derive(thiserror::Error, Debug)]
pub enum FetchCause {
    /// Connection failure, timeout or body read error
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("API returned status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Catalog request failed: {0}")]
    CatalogFetch(#[from] FetchCause),

    #[error("Failed to fetch any catalog data - see earlier warnings")]
    EmptyShortlist,

    #[error("No preferences saved - run `reelpick prefs` first")]
    NoPreferences,

    #[error("Ranking service did not return a valid JSON object array: {0}")]
    RankingParse(String),

    #[error("Ranking service error: {0}")]
    RankingService(String),

    #[error("Could not save preferences: {0}")]
    Preferences(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Process exit code reported at the CLI boundary
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::InvalidInput(_) | AppError::Config(_) => 2,
            _ => 1,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
