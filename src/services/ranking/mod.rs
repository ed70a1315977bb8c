//! External ranking service abstraction
//!
//! A ranking service receives a system instruction plus one user message and
//! returns the model's raw text. Interpreting that text is the caller's job.

use crate::error::AppResult;

pub mod gemini;

pub use gemini::GeminiClient;

/// A single completion request
#[derive(Debug, Clone, PartialEq)]
pub struct RankingRequest {
    pub system_instruction: String,
    pub user_message: String,
    pub temperature: f32,
}

/// Trait for language-model backed ranking services
///
/// Implementations make one blocking round trip per call with no retries.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RankingService: Send + Sync {
    /// Returns the raw response text
    async fn complete(&self, request: RankingRequest) -> AppResult<String>;
}
