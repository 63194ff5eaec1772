//! Ollama chat model asked for a one-word verdict.

use super::{map_request_error, Classifier, ClassifierError};
use crate::config::LlmConfig;
use crate::models::{Judgment, SentimentLabel, SourceTier};
use anyhow::{Context, Result};
use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Confidence given to a well-formed verdict.
const VERDICT_CONFIDENCE: f64 = 0.9;

const SYSTEM_PROMPT: &str = "You are a sentiment classifier for customer service feedback. \
Respond with exactly one word: Positive, Negative, or Neutral.";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: ChatMessage,
}

/// Turn the model's reply into a judgment.
///
/// Anything other than one of the three labels counts as an unsure
/// Neutral rather than an error.
fn verdict_to_judgment(reply: &str, source: &str) -> Judgment {
    let first_word = reply.split_whitespace().next().unwrap_or("");
    match SentimentLabel::from_verdict(first_word) {
        Some(label) => Judgment::model(label, VERDICT_CONFIDENCE, source),
        None => Judgment::model(SentimentLabel::Neutral, 0.5, source),
    }
}

/// Classifier backed by a local Ollama model.
pub struct LlmClassifier {
    config: LlmConfig,
    http_client: reqwest::Client,
}

impl LlmClassifier {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            config,
            http_client,
        })
    }

    async fn ask(&self, text: &str) -> Result<Judgment, ClassifierError> {
        let url = format!("{}/api/chat", self.config.ollama_url.trim_end_matches('/'));

        let request = OllamaChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: format!("Text: '{}'", text),
                },
            ],
            stream: false,
            options: OllamaOptions {
                temperature: self.config.temperature,
                num_predict: 10,
            },
        };

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                map_request_error(e, &self.config.ollama_url, self.config.timeout_seconds)
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Api { status, body });
        }

        let chat_response: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::InvalidResponse(e.to_string()))?;

        debug!("{} replied: {:?}", self.config.model, chat_response.message.content);

        Ok(verdict_to_judgment(&chat_response.message.content, self.name()))
    }
}

impl Classifier for LlmClassifier {
    fn name(&self) -> &'static str {
        "llm"
    }

    fn tier(&self) -> SourceTier {
        SourceTier::Model
    }

    fn description(&self) -> &'static str {
        "Local Ollama chat model, one-word verdict"
    }

    fn classify<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Judgment, ClassifierError>> {
        self.ask(text).boxed()
    }
}
