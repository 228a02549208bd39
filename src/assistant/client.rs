use crate::scaffold::{scaffold_to_map, ScaffoldSlot};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

const REQUEST_TIMEOUT_SECS: u64 = 30;
const MAX_ATTEMPTS: u32 = 3;
const RETRY_BASE_DELAY_MS: u64 = 500;
const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("failed to create HTTP client: {0}")]
    Client(reqwest::Error),
    #[error("assistant request timed out")]
    Timeout,
    #[error("assistant request failed: {0}")]
    Request(reqwest::Error),
    #[error("assistant returned status {0}")]
    Status(u16),
    #[error("assistant response was empty")]
    EmptyResponse,
    #[error("could not parse scaffold from response: {0}")]
    Parse(String),
}

fn is_retryable(error: &AssistantError) -> bool {
    matches!(
        error,
        AssistantError::Timeout | AssistantError::Request(_) | AssistantError::Status(_)
    )
}

#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl AssistantConfig {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

/// Thin client for the remote assistant model. Transport failures retry
/// with a linear backoff; everything past simple retry is the caller's
/// problem.
pub struct AssistantClient {
    config: AssistantConfig,
    http: reqwest::Client,
}

impl AssistantClient {
    pub fn new(config: AssistantConfig) -> Result<Self, AssistantError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(AssistantError::Client)?;
        Ok(Self { config, http })
    }

    /// Ask the model to decompose a description into a seven-slot scaffold.
    pub async fn extract_scaffold(
        &self,
        description: &str,
    ) -> Result<Vec<ScaffoldSlot>, AssistantError> {
        let prompt = super::prompts::scaffold_extraction_prompt(description);
        let response = self.generate(&prompt).await?;
        super::parser::parse_scaffold_response(&response).map_err(AssistantError::Parse)
    }

    /// Ask the model to revise an existing scaffold against an instruction.
    pub async fn refine_scaffold(
        &self,
        scaffold: &[ScaffoldSlot],
        instruction: &str,
    ) -> Result<Vec<ScaffoldSlot>, AssistantError> {
        let slots: HashMap<&str, String> = scaffold_to_map(scaffold)
            .into_iter()
            .map(|(key, content)| (key.token(), content))
            .collect();
        let current = serde_json::to_string(&slots)
            .map_err(|e| AssistantError::Parse(e.to_string()))?;
        let prompt = super::prompts::scaffold_refinement_prompt(&current, instruction);
        let response = self.generate(&prompt).await?;
        super::parser::parse_scaffold_response(&response).map_err(AssistantError::Parse)
    }

    /// Raw generation with simple retry. Transport errors retry, parse and
    /// empty-body errors do not.
    pub async fn generate(&self, prompt: &str) -> Result<String, AssistantError> {
        let mut last_error: Option<AssistantError> = None;
        for attempt in 1..=MAX_ATTEMPTS {
            match self.generate_once(prompt).await {
                Ok(text) => return Ok(text),
                Err(error) if is_retryable(&error) => {
                    log::warn!(
                        "assistant attempt {}/{} failed: {}",
                        attempt,
                        MAX_ATTEMPTS,
                        error
                    );
                    last_error = Some(error);
                    if attempt < MAX_ATTEMPTS {
                        tokio::time::sleep(Duration::from_millis(
                            RETRY_BASE_DELAY_MS * attempt as u64,
                        ))
                        .await;
                    }
                }
                Err(error) => return Err(error),
            }
        }
        Err(last_error.unwrap_or(AssistantError::EmptyResponse))
    }

    async fn generate_once(&self, prompt: &str) -> Result<String, AssistantError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.config.base_url, self.config.model, self.config.api_key
        );
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AssistantError::Timeout
                } else {
                    AssistantError::Request(e)
                }
            })?;

        if !response.status().is_success() {
            return Err(AssistantError::Status(response.status().as_u16()));
        }

        let body: GenerateResponse = response.json().await.map_err(AssistantError::Request)?;
        let text = body
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .map(|part| part.text)
                    .collect::<Vec<String>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AssistantError::EmptyResponse);
        }
        Ok(text)
    }
}
