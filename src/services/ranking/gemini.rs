//! Google Gemini `generateContent` client

use crate::{
    error::{AppError, AppResult},
    services::ranking::{RankingRequest, RankingService},
};
use reqwest::{Client as HttpClient, Request};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::{Duration, Instant};

#[derive(Clone)]
pub struct GeminiClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(
        api_key: String,
        api_url: String,
        model: String,
        timeout: Duration,
    ) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            model,
        })
    }

    fn build_request(&self, request: &RankingRequest) -> AppResult<Request> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_url, self.model
        );

        let body = json!({
            "systemInstruction": {
                "parts": [{ "text": request.system_instruction }]
            },
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.user_message }]
            }],
            "generationConfig": {
                "temperature": request.temperature,
                "responseMimeType": "application/json"
            }
        });

        self.http_client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .build()
            .map_err(|e| AppError::RankingService(e.to_string()))
    }
}

/// Joins the text parts of the first candidate
fn extract_text(response: &GenerateContentResponse) -> Option<String> {
    let candidate = response.candidates.first()?;
    let text: String = candidate
        .content
        .as_ref()?
        .parts
        .iter()
        .filter_map(|part| part.text.as_deref())
        .collect();

    (!text.trim().is_empty()).then_some(text)
}

#[async_trait::async_trait]
impl RankingService for GeminiClient {
    async fn complete(&self, request: RankingRequest) -> AppResult<String> {
        let http_request = self.build_request(&request)?;

        let start = Instant::now();
        let response = self
            .http_client
            .execute(http_request)
            .await
            .map_err(|e| AppError::RankingService(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::RankingService(format!(
                "Gemini API returned status {}: {}",
                status, body
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| AppError::RankingService(e.to_string()))?;
        let parsed: GenerateContentResponse = serde_json::from_value(payload)
            .map_err(|e| AppError::RankingParse(format!("unexpected Gemini payload: {}", e)))?;

        let finish_reason = parsed
            .candidates
            .first()
            .and_then(|c| c.finish_reason.clone())
            .unwrap_or_else(|| "unknown".to_string());

        tracing::info!(
            model = %self.model,
            elapsed_ms = start.elapsed().as_millis() as u64,
            finish_reason = %finish_reason,
            provider = "gemini",
            "Ranking response received"
        );

        extract_text(&parsed)
            .ok_or_else(|| AppError::RankingParse("response contained no text".to_string()))
    }
}
