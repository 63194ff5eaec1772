//! Sentiment classifiers.
//!
//! Every source implements [`Classifier`]. Lexicon classifiers run
//! in-process and never fail; model classifiers call out over HTTP and may
//! report themselves unavailable, in which case the ensemble leaves them out.

pub mod domain;
pub mod lexicon;
pub mod llm;
pub mod transformer;

pub use domain::DomainClassifier;
pub use lexicon::{PolarityClassifier, ValenceClassifier};
pub use llm::LlmClassifier;
pub use transformer::TransformerClassifier;

use crate::config::Config;
use crate::models::{Judgment, SourceTier};
use anyhow::Result;
use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Text sent when probing whether a classifier can run.
const PROBE_TEXT: &str = "The support team answered my question.";

/// Why a classifier could not produce a judgment.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("cannot connect to {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Classify a transport error the same way for every HTTP classifier.
pub(crate) fn map_request_error(e: reqwest::Error, base_url: &str, timeout: u64) -> ClassifierError {
    if e.is_timeout() {
        ClassifierError::Timeout { seconds: timeout }
    } else if e.is_connect() {
        ClassifierError::Connect(base_url.to_string())
    } else {
        ClassifierError::Request(e)
    }
}

/// Result of probing a classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Available,
    Unavailable(String),
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }
}

/// A source of sentiment judgments.
pub trait Classifier: Send + Sync {
    /// Identifier used in provenance strings and config.
    fn name(&self) -> &'static str;

    fn tier(&self) -> SourceTier;

    /// One-line human description.
    fn description(&self) -> &'static str;

    /// Judge one text. An error means the source is unavailable for it.
    fn classify<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Judgment, ClassifierError>>;

    /// Check whether the classifier can currently run.
    fn probe(&self) -> BoxFuture<'_, Availability> {
        async move {
            match self.classify(PROBE_TEXT).await {
                Ok(_) => Availability::Available,
                Err(e) => Availability::Unavailable(e.to_string()),
            }
        }
        .boxed()
    }
}

/// Known classifier kinds, selectable from config and CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    /// Hosted transformer model
    Transformer,
    /// Local Ollama chat model
    Llm,
    /// Valence lexicon with negation and emphasis handling
    Valence,
    /// Customer-service keyword vote
    Domain,
    /// Averaged word polarity
    Polarity,
}

impl ClassifierKind {
    #[cfg(test)]
    pub const ALL: [ClassifierKind; 5] = [
        ClassifierKind::Transformer,
        ClassifierKind::Llm,
        ClassifierKind::Valence,
        ClassifierKind::Domain,
        ClassifierKind::Polarity,
    ];
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifierKind::Transformer => write!(f, "transformer"),
            ClassifierKind::Llm => write!(f, "llm"),
            ClassifierKind::Valence => write!(f, "valence"),
            ClassifierKind::Domain => write!(f, "domain"),
            ClassifierKind::Polarity => write!(f, "polarity"),
        }
    }
}

/// Build one classifier from configuration.
pub fn build_classifier(kind: ClassifierKind, config: &Config) -> Result<Box<dyn Classifier>> {
    let classifier: Box<dyn Classifier> = match kind {
        ClassifierKind::Transformer => {
            Box::new(TransformerClassifier::new(config.transformer.clone())?)
        }
        ClassifierKind::Llm => Box::new(LlmClassifier::new(config.llm.clone())?),
        ClassifierKind::Valence => Box::new(ValenceClassifier::new()),
        ClassifierKind::Domain => Box::new(DomainClassifier::new()),
        ClassifierKind::Polarity => Box::new(PolarityClassifier::new()),
    };
    Ok(classifier)
}

/// Build the enabled classifiers, in configured order, without duplicates.
pub fn build_classifiers(config: &Config) -> Result<Vec<Box<dyn Classifier>>> {
    let mut seen = Vec::new();
    let mut classifiers = Vec::new();

    for kind in &config.classifiers.enabled {
        if seen.contains(kind) {
            continue;
        }
        seen.push(*kind);
        classifiers.push(build_classifier(*kind, config)?);
    }

    Ok(classifiers)
}
