//! Hosted transformer sentiment model.
//!
//! Talks to a Hugging Face Inference API compatible endpoint:
//! `POST {url}/models/{model}` with `{"inputs": "..."}`, answering with a
//! list of `{label, score}` candidates.

use super::{map_request_error, Classifier, ClassifierError};
use crate::config::TransformerConfig;
use crate::models::{Judgment, SentimentLabel, SourceTier};
use anyhow::{Context, Result};
use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

/// Pipelines answer either `[[...]]` (one list per input) or `[...]`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl InferenceResponse {
    fn best(self) -> Option<LabelScore> {
        let candidates = match self {
            InferenceResponse::Nested(lists) => lists.into_iter().next().unwrap_or_default(),
            InferenceResponse::Flat(list) => list,
        };
        candidates
            .into_iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
    }
}

/// Map a model's label onto the three-way label set.
///
/// Handles `POSITIVE`/`NEG`-style names, `LABEL_0..2` (negative, neutral,
/// positive) and `1 star`..`5 stars` review ratings.
pub fn normalize_label(raw: &str) -> SentimentLabel {
    let upper = raw.trim().to_uppercase();

    if upper.contains("POS") {
        return SentimentLabel::Positive;
    }
    if upper.contains("NEG") {
        return SentimentLabel::Negative;
    }

    if let Some(index) = upper.strip_prefix("LABEL_") {
        return match index {
            "0" => SentimentLabel::Negative,
            "2" => SentimentLabel::Positive,
            _ => SentimentLabel::Neutral,
        };
    }

    if upper.contains("STAR") {
        let stars = upper
            .split_whitespace()
            .next()
            .and_then(|n| n.parse::<u8>().ok());
        return match stars {
            Some(1 | 2) => SentimentLabel::Negative,
            Some(4 | 5) => SentimentLabel::Positive,
            _ => SentimentLabel::Neutral,
        };
    }

    SentimentLabel::Neutral
}

/// Truncate to at most `max_chars` characters on a char boundary.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Classifier backed by a hosted transformer model.
pub struct TransformerClassifier {
    config: TransformerConfig,
    http_client: reqwest::Client,
}

impl TransformerClassifier {
    pub fn new(config: TransformerConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}",
            self.config.url.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn infer(&self, text: &str) -> Result<Judgment, ClassifierError> {
        let url = self.endpoint();
        let inputs = truncate_chars(text, self.config.max_chars);

        let mut request = self
            .http_client
            .post(&url)
            .json(&InferenceRequest { inputs });
        if let Some(ref token) = self.config.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| map_request_error(e, &self.config.url, self.config.timeout_seconds))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Api { status, body });
        }

        let parsed: InferenceResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::InvalidResponse(e.to_string()))?;

        let best = parsed
            .best()
            .ok_or_else(|| ClassifierError::InvalidResponse("no label candidates".to_string()))?;

        debug!("{} -> {} ({:.3})", self.config.model, best.label, best.score);

        Ok(Judgment::model(
            normalize_label(&best.label),
            best.score,
            self.name(),
        ))
    }
}

impl Classifier for TransformerClassifier {
    fn name(&self) -> &'static str {
        "transformer"
    }

    fn tier(&self) -> SourceTier {
        SourceTier::Model
    }

    fn description(&self) -> &'static str {
        "Hosted transformer sentiment model (BERT/RoBERTa family)"
    }

    fn classify<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Judgment, ClassifierError>> {
        self.infer(text).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_label_names() {
        assert_eq!(normalize_label("POSITIVE"), SentimentLabel::Positive);
        assert_eq!(normalize_label("negative"), SentimentLabel::Negative);
        assert_eq!(normalize_label("neutral"), SentimentLabel::Neutral);
        assert_eq!(normalize_label("mixed"), SentimentLabel::Neutral);
    }

    #[test]
    fn test_normalize_indexed_labels() {
        assert_eq!(normalize_label("LABEL_0"), SentimentLabel::Negative);
        assert_eq!(normalize_label("LABEL_1"), SentimentLabel::Neutral);
        assert_eq!(normalize_label("LABEL_2"), SentimentLabel::Positive);
    }

    #[test]
    fn test_normalize_star_ratings() {
        assert_eq!(normalize_label("1 star"), SentimentLabel::Negative);
        assert_eq!(normalize_label("2 stars"), SentimentLabel::Negative);
        assert_eq!(normalize_label("3 stars"), SentimentLabel::Neutral);
        assert_eq!(normalize_label("5 stars"), SentimentLabel::Positive);
    }

    #[test]
    fn test_parse_nested_response() {
        let body = r#"[[{"label":"negative","score":0.1},{"label":"positive","score":0.85},{"label":"neutral","score":0.05}]]"#;
        let parsed: InferenceResponse = serde_json::from_str(body).unwrap();
        let best = parsed.best().unwrap();
        assert_eq!(best.label, "positive");
        assert!((best.score - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_parse_flat_response() {
        let body = r#"[{"label":"NEGATIVE","score":0.99}]"#;
        let parsed: InferenceResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.best().unwrap().label, "NEGATIVE");
    }

    #[test]
    fn test_empty_response_has_no_best() {
        let parsed: InferenceResponse = serde_json::from_str("[[]]").unwrap();
        assert!(parsed.best().is_none());
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn test_endpoint() {
        let config = TransformerConfig {
            url: "https://api-inference.huggingface.co/".to_string(),
            model: "org/model".to_string(),
            ..TransformerConfig::default()
        };
        let classifier = TransformerClassifier::new(config).unwrap();
        assert_eq!(
            classifier.endpoint(),
            "https://api-inference.huggingface.co/models/org/model"
        );
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_an_error() {
        let config = TransformerConfig {
            url: "http://127.0.0.1:9".to_string(),
            timeout_seconds: 2,
            ..TransformerConfig::default()
        };
        let classifier = TransformerClassifier::new(config).unwrap();
        assert!(classifier.classify("The agent was great").await.is_err());
    }
}
