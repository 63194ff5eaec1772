//! Customer-service keyword classifier.
//!
//! Counts service-specific positive and negative keywords and votes by
//! majority. Phrases of two words (e.g. "hung up") are matched as bigrams.

use super::lexicon::tokenize;
use super::{Classifier, ClassifierError};
use crate::models::{Judgment, SentimentLabel, SourceTier};
use futures::future::{BoxFuture, FutureExt};
use std::collections::HashSet;
use std::sync::LazyLock;

static POSITIVE_KEYWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        // service quality
        "professional", "helpful", "courteous", "patient", "knowledgeable",
        "efficient", "quick", "responsive", "thorough", "excellent",
        // problem solved
        "resolved", "solved", "fixed", "helped", "assisted", "guided",
        "explained", "clarified", "understood", "satisfied",
        // gratitude
        "thank", "appreciate", "grateful", "pleased", "happy",
        "recommend", "impressed", "outstanding", "amazing", "perfect",
    ]
    .into_iter()
    .collect()
});

static NEGATIVE_KEYWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        // service problems
        "unprofessional", "rude", "impatient", "unhelpful", "slow",
        "confusing", "unclear", "difficult", "complicated", "frustrated",
        // problem not solved
        "unresolved", "unsolved", "failed", "unable", "refused",
        "ignored", "dismissed", "hung up", "transferred", "waiting",
        // complaints
        "disappointed", "angry", "upset", "annoyed", "complain",
        "terrible", "awful", "worst", "horrible", "disgusted",
    ]
    .into_iter()
    .collect()
});

/// Keyword-count classifier for customer-service vocabulary.
#[derive(Debug, Default)]
pub struct DomainClassifier;

impl DomainClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Count (positive, negative) keyword hits in `text`.
    pub fn counts(&self, text: &str) -> (usize, usize) {
        let words: Vec<String> = tokenize(text).iter().map(|t| t.to_lowercase()).collect();

        let mut positive = 0;
        let mut negative = 0;
        let mut tally = |term: &str| {
            if POSITIVE_KEYWORDS.contains(term) {
                positive += 1;
            } else if NEGATIVE_KEYWORDS.contains(term) {
                negative += 1;
            }
        };

        for word in &words {
            tally(word);
        }
        for pair in words.windows(2) {
            tally(&format!("{} {}", pair[0], pair[1]));
        }

        (positive, negative)
    }

    fn judge(&self, text: &str) -> Judgment {
        let (positive, negative) = self.counts(text);
        let total = positive + negative;

        let (label, confidence) = if total == 0 || positive == negative {
            (SentimentLabel::Neutral, 0.5)
        } else if positive > negative {
            (SentimentLabel::Positive, positive as f64 / total as f64)
        } else {
            (SentimentLabel::Negative, negative as f64 / total as f64)
        };

        Judgment::lexicon(label, confidence, self.name())
    }
}

impl Classifier for DomainClassifier {
    fn name(&self) -> &'static str {
        "domain"
    }

    fn tier(&self) -> SourceTier {
        SourceTier::Lexicon
    }

    fn description(&self) -> &'static str {
        "Customer-service keyword vote"
    }

    fn classify<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Judgment, ClassifierError>> {
        futures::future::ready(Ok(self.judge(text))).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_sets_are_disjoint() {
        assert!(POSITIVE_KEYWORDS.is_disjoint(&NEGATIVE_KEYWORDS));
        assert_eq!(POSITIVE_KEYWORDS.len(), 30);
        assert_eq!(NEGATIVE_KEYWORDS.len(), 30);
    }

    #[test]
    fn test_counts_ignore_punctuation_and_case() {
        let c = DomainClassifier::new();
        assert_eq!(c.counts("Resolved quickly. Very PROFESSIONAL!"), (2, 0));
    }

    #[test]
    fn test_bigram_phrase() {
        let c = DomainClassifier::new();
        assert_eq!(c.counts("The agent hung up on me"), (0, 1));
    }

    #[test]
    fn test_majority_vote() {
        let c = DomainClassifier::new();

        let j = c.judge("Helpful and patient, but I was transferred twice");
        assert_eq!(j.label, SentimentLabel::Positive);
        assert!((j.confidence - 2.0 / 3.0).abs() < 1e-9);

        let j = c.judge("Rude agent, issue unresolved");
        assert_eq!(j.label, SentimentLabel::Negative);
        assert_eq!(j.confidence, 1.0);
    }

    #[test]
    fn test_no_keywords_or_tie_is_neutral() {
        let c = DomainClassifier::new();
        assert_eq!(c.judge("I called yesterday.").confidence, 0.5);
        let j = c.judge("helpful but slow");
        assert_eq!(j.label, SentimentLabel::Neutral);
        assert_eq!(j.confidence, 0.5);
    }

    #[test]
    fn test_classify_future_is_ready() {
        let c = DomainClassifier::new();
        let j = tokio_test::block_on(c.classify("Thank you, very helpful")).unwrap();
        assert_eq!(j.label, SentimentLabel::Positive);
        assert_eq!(j.source, "domain");
        assert_eq!(j.tier, SourceTier::Lexicon);
    }
}
