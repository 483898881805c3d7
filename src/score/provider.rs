// src/score/provider.rs
//! Judge provider abstraction. The scoring client only ever sees the trait,
//! so the retry/parse machinery is testable against canned responses.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ScoreError;
use crate::sources::API_USER_AGENT;

pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";

/// One logical RPC to the scoring judge: prompt in, raw response text out.
#[async_trait::async_trait]
pub trait ScoreProvider: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ScoreError>;
    fn name(&self) -> &'static str;
}

/// Gemini `generateContent` provider.
pub struct GeminiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
    temperature: f32,
}

impl GeminiProvider {
    pub fn new(api_key: String, model: &str, temperature: f32) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(API_USER_AGENT)
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(60))
            .build()
            .expect("reqwest client");
        Self {
            http,
            api_key,
            model: model.to_string(),
            temperature,
        }
    }

    /// Reads `GEMINI_API_KEY`; an empty key surfaces as `NotConfigured` on
    /// the first call rather than at construction.
    pub fn from_env(model: &str, temperature: f32) -> Self {
        let api_key = std::env::var(ENV_GEMINI_API_KEY).unwrap_or_default();
        Self::new(api_key, model, temperature)
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[async_trait::async_trait]
impl ScoreProvider for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<String, ScoreError> {
        if self.api_key.is_empty() {
            return Err(ScoreError::NotConfigured(ENV_GEMINI_API_KEY));
        }

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            self.model
        );
        let req = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                response_mime_type: "application/json",
            },
        };

        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&req)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScoreError::Status(status.as_u16()));
        }

        let body: GenerateResponse = resp.json().await?;
        let text = body
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<String>()
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(ScoreError::Parse("empty candidate text".to_string()));
        }
        Ok(text)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}
