//! General-purpose sentiment lexicon and the two classifiers built on it.
//!
//! - [`ValenceClassifier`] sums word valences with negation, booster,
//!   contrast ("but"), capitalisation and exclamation handling, then
//!   normalises the sum into a compound score in [-1, 1].
//! - [`PolarityClassifier`] averages word polarities, which is cruder but
//!   less sensitive to text length.

use super::{Classifier, ClassifierError};
use crate::models::{Judgment, SentimentLabel, SourceTier};
use futures::future::{BoxFuture, FutureExt};
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// Shared lexicon, built once.
pub static LEXICON: LazyLock<Lexicon> = LazyLock::new(Lexicon::new);

/// Word polarities in [-1, 1] plus negation and booster words.
pub struct Lexicon {
    words: HashMap<&'static str, f64>,
    negations: HashSet<&'static str>,
    boosters: HashMap<&'static str, f64>,
}

impl Lexicon {
    fn new() -> Self {
        let words: HashMap<&'static str, f64> = [
            // Positive
            ("good", 0.5),
            ("great", 0.8),
            ("excellent", 1.0),
            ("outstanding", 0.9),
            ("amazing", 0.9),
            ("awesome", 0.9),
            ("fantastic", 0.9),
            ("wonderful", 0.9),
            ("perfect", 1.0),
            ("superb", 0.9),
            ("nice", 0.5),
            ("fine", 0.3),
            ("love", 0.8),
            ("loved", 0.8),
            ("like", 0.3),
            ("liked", 0.3),
            ("happy", 0.7),
            ("glad", 0.6),
            ("pleased", 0.6),
            ("satisfied", 0.6),
            ("delighted", 0.9),
            ("thank", 0.5),
            ("thanks", 0.5),
            ("grateful", 0.7),
            ("appreciate", 0.6),
            ("appreciated", 0.6),
            ("helpful", 0.7),
            ("friendly", 0.6),
            ("kind", 0.6),
            ("polite", 0.5),
            ("courteous", 0.6),
            ("patient", 0.5),
            ("professional", 0.5),
            ("knowledgeable", 0.5),
            ("quick", 0.4),
            ("quickly", 0.4),
            ("fast", 0.4),
            ("efficient", 0.5),
            ("easy", 0.4),
            ("smooth", 0.4),
            ("best", 0.9),
            ("better", 0.4),
            ("recommend", 0.6),
            ("impressed", 0.7),
            ("resolved", 0.4),
            ("solved", 0.4),
            ("fixed", 0.4),
            ("reliable", 0.5),
            ("clear", 0.3),
            ("positive", 0.5),
            ("enjoyed", 0.6),
            ("beyond", 0.2),
            // Negative
            ("bad", -0.6),
            ("poor", -0.6),
            ("terrible", -1.0),
            ("awful", -1.0),
            ("horrible", -1.0),
            ("worst", -1.0),
            ("worse", -0.6),
            ("hate", -0.8),
            ("hated", -0.8),
            ("dislike", -0.5),
            ("angry", -0.8),
            ("upset", -0.6),
            ("annoyed", -0.6),
            ("annoying", -0.6),
            ("frustrated", -0.7),
            ("frustrating", -0.7),
            ("disappointed", -0.7),
            ("disappointing", -0.7),
            ("unhappy", -0.7),
            ("unacceptable", -0.8),
            ("rude", -0.8),
            ("unhelpful", -0.7),
            ("unprofessional", -0.7),
            ("useless", -0.8),
            ("slow", -0.4),
            ("late", -0.3),
            ("broken", -0.6),
            ("crash", -0.6),
            ("crashing", -0.6),
            ("error", -0.4),
            ("errors", -0.4),
            ("problem", -0.4),
            ("problems", -0.4),
            ("issue", -0.2),
            ("fail", -0.6),
            ("failed", -0.6),
            ("wasted", -0.7),
            ("waste", -0.7),
            ("confusing", -0.5),
            ("difficult", -0.4),
            ("complicated", -0.4),
            ("ignored", -0.6),
            ("refused", -0.6),
            ("complain", -0.5),
            ("complaint", -0.5),
            ("sorry", -0.2),
            ("negative", -0.5),
            ("disgusted", -0.9),
            ("ridiculous", -0.7),
        ]
        .into_iter()
        .collect();

        let negations = [
            "not", "no", "never", "neither", "nor", "nobody", "nothing", "nowhere", "none",
            "cannot", "cant", "can't", "don't", "dont", "doesn't", "doesnt", "didn't", "didnt",
            "won't", "wont", "wouldn't", "wouldnt", "isn't", "isnt", "aren't", "arent", "wasn't",
            "wasnt", "weren't", "werent", "hardly", "barely", "without",
        ]
        .into_iter()
        .collect();

        let boosters = [
            ("very", 1.3),
            ("really", 1.3),
            ("extremely", 1.6),
            ("incredibly", 1.5),
            ("absolutely", 1.5),
            ("highly", 1.3),
            ("so", 1.2),
            ("totally", 1.3),
            ("completely", 1.3),
            ("super", 1.3),
            ("quite", 1.1),
            ("slightly", 0.6),
            ("somewhat", 0.7),
            ("barely", 0.5),
        ]
        .into_iter()
        .collect();

        Self {
            words,
            negations,
            boosters,
        }
    }

    /// Polarity of a lowercase word, if it carries sentiment.
    pub fn score(&self, word: &str) -> Option<f64> {
        self.words.get(word).copied()
    }

    pub fn is_negation(&self, word: &str) -> bool {
        self.negations.contains(word)
    }

    /// Booster multiplier (1.0 means no change).
    pub fn booster(&self, word: &str) -> Option<f64> {
        self.boosters.get(word).copied()
    }
}

/// Split text into word tokens, keeping apostrophes inside words.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .collect()
}

/// Valence scale used before normalisation, per unit of polarity.
const VALENCE_SCALE: f64 = 4.0;
/// Normalisation constant for the compound score.
const NORMALIZATION_ALPHA: f64 = 15.0;
/// Negation flips and dampens the following sentiment word.
const NEGATION_FACTOR: f64 = -0.74;
/// Extra valence for an ALL-CAPS sentiment word in mixed-case text.
const CAPS_EMPHASIS: f64 = 0.733;
/// Extra valence per exclamation mark, up to [`MAX_EXCLAMATIONS`].
const EXCLAMATION_EMPHASIS: f64 = 0.292;
const MAX_EXCLAMATIONS: usize = 4;
/// How many preceding tokens are checked for negations and boosters.
const LOOKBACK: usize = 3;
/// Compound scores inside (-0.05, 0.05) are neutral.
const VALENCE_THRESHOLD: f64 = 0.05;

/// Lexicon classifier producing a normalised compound score.
#[derive(Debug, Default)]
pub struct ValenceClassifier;

impl ValenceClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Compound score in [-1, 1].
    pub fn compound(&self, text: &str) -> f64 {
        let lexicon = &*LEXICON;
        let tokens = tokenize(text);
        let lowered: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();

        let has_lower = tokens.iter().any(|t| t.chars().any(char::is_lowercase));
        let but_index = lowered.iter().position(|t| t == "but");

        let mut valences: Vec<f64> = Vec::with_capacity(tokens.len());
        for (i, word) in lowered.iter().enumerate() {
            let Some(score) = lexicon.score(word) else {
                continue;
            };
            let mut valence = score * VALENCE_SCALE;

            let raw = tokens[i];
            if has_lower && raw.chars().count() > 1 && raw.chars().all(|c| !c.is_lowercase()) {
                valence += CAPS_EMPHASIS * valence.signum();
            }

            for back in 1..=LOOKBACK.min(i) {
                let prev = lowered[i - back].as_str();
                if let Some(boost) = lexicon.booster(prev) {
                    let decay = 1.0 - 0.05 * (back - 1) as f64;
                    valence *= 1.0 + (boost - 1.0) * decay;
                }
                if lexicon.is_negation(prev) {
                    valence *= NEGATION_FACTOR;
                    break;
                }
            }

            if let Some(b) = but_index {
                if i < b {
                    valence *= 0.5;
                } else if i > b {
                    valence *= 1.5;
                }
            }

            valences.push(valence);
        }

        let mut sum: f64 = valences.iter().sum();
        if sum != 0.0 {
            let bangs = text.chars().filter(|c| *c == '!').count().min(MAX_EXCLAMATIONS);
            sum += EXCLAMATION_EMPHASIS * bangs as f64 * sum.signum();
        }

        let compound = sum / (sum * sum + NORMALIZATION_ALPHA).sqrt();
        compound.clamp(-1.0, 1.0)
    }

    fn judge(&self, text: &str) -> Judgment {
        let compound = self.compound(text);
        let (label, confidence) = if compound >= VALENCE_THRESHOLD {
            (SentimentLabel::Positive, compound.abs())
        } else if compound <= -VALENCE_THRESHOLD {
            (SentimentLabel::Negative, compound.abs())
        } else {
            (SentimentLabel::Neutral, 1.0 - compound.abs())
        };
        Judgment::lexicon(label, confidence, self.name())
    }
}

impl Classifier for ValenceClassifier {
    fn name(&self) -> &'static str {
        "valence"
    }

    fn tier(&self) -> SourceTier {
        SourceTier::Lexicon
    }

    fn description(&self) -> &'static str {
        "Rule-based valence lexicon with negation and emphasis handling"
    }

    fn classify<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Judgment, ClassifierError>> {
        futures::future::ready(Ok(self.judge(text))).boxed()
    }
}

/// Polarities inside [-0.1, 0.1] are neutral.
const POLARITY_THRESHOLD: f64 = 0.1;
/// Negation flips and halves a word's polarity.
const POLARITY_NEGATION: f64 = -0.5;

/// Lexicon classifier averaging word polarities.
#[derive(Debug, Default)]
pub struct PolarityClassifier;

impl PolarityClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Mean polarity of the sentiment words in `text`, in [-1, 1].
    pub fn polarity(&self, text: &str) -> f64 {
        let lexicon = &*LEXICON;
        let lowered: Vec<String> = tokenize(text).iter().map(|t| t.to_lowercase()).collect();

        let mut scores = Vec::new();
        let mut modifier = 1.0;
        let mut negate = false;

        for word in &lowered {
            if lexicon.is_negation(word) {
                negate = true;
                continue;
            }
            if let Some(boost) = lexicon.booster(word) {
                modifier *= boost;
                continue;
            }
            if let Some(score) = lexicon.score(word) {
                let mut p = score * modifier;
                if negate {
                    p *= POLARITY_NEGATION;
                }
                scores.push(p.clamp(-1.0, 1.0));
            }
            modifier = 1.0;
            negate = false;
        }

        if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<f64>() / scores.len() as f64
        }
    }

    fn judge(&self, text: &str) -> Judgment {
        let polarity = self.polarity(text);
        let label = if polarity > POLARITY_THRESHOLD {
            SentimentLabel::Positive
        } else if polarity < -POLARITY_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        };
        Judgment::lexicon(label, polarity.abs(), self.name())
    }
}

impl Classifier for PolarityClassifier {
    fn name(&self) -> &'static str {
        "polarity"
    }

    fn tier(&self) -> SourceTier {
        SourceTier::Lexicon
    }

    fn description(&self) -> &'static str {
        "Averaged word polarity, fast and simple"
    }

    fn classify<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Judgment, ClassifierError>> {
        futures::future::ready(Ok(self.judge(text))).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize() {
        let tokens = tokenize("Didn't help, AT ALL!! 2 hours...");
        assert_eq!(tokens, vec!["Didn't", "help", "AT", "ALL", "2", "hours"]);
    }

    #[test]
    fn test_valence_positive() {
        let c = ValenceClassifier::new();
        let compound = c.compound("The representative was extremely helpful. Excellent service!");
        assert!(compound > 0.5, "compound = {}", compound);
        assert_eq!(c.judge("Great support, thank you").label, SentimentLabel::Positive);
    }

    #[test]
    fn test_valence_negative() {
        let c = ValenceClassifier::new();
        let j = c.judge("I waited 2 hours and the agent was rude. Terrible experience.");
        assert_eq!(j.label, SentimentLabel::Negative);
        assert!(j.confidence > 0.5);
    }

    #[test]
    fn test_valence_neutral() {
        let c = ValenceClassifier::new();
        let j = c.judge("I called on Tuesday about my account.");
        assert_eq!(j.label, SentimentLabel::Neutral);
        assert_eq!(j.confidence, 1.0);
    }

    #[test]
    fn test_valence_negation_flips() {
        let c = ValenceClassifier::new();
        assert!(c.compound("The agent was helpful") > 0.0);
        assert!(c.compound("The agent was not helpful") < 0.0);
    }

    #[test]
    fn test_valence_emphasis_increases_intensity() {
        let c = ValenceClassifier::new();
        let plain = c.compound("the service was good");
        let boosted = c.compound("the service was very good");
        let shouted = c.compound("the service was GOOD!!!");
        assert!(boosted > plain);
        assert!(shouted > plain);
    }

    #[test]
    fn test_valence_but_shifts_weight() {
        let c = ValenceClassifier::new();
        let j = c.judge("The agent was friendly but the problem is still broken");
        assert_eq!(j.label, SentimentLabel::Negative);
    }

    #[test]
    fn test_compound_bounded() {
        let c = ValenceClassifier::new();
        let text = "excellent ".repeat(200);
        let compound = c.compound(&text);
        assert!(compound <= 1.0 && compound > 0.99);
    }

    #[test]
    fn test_polarity_classifier() {
        let c = PolarityClassifier::new();
        assert_eq!(
            c.judge("Perfect service, highly recommend!").label,
            SentimentLabel::Positive
        );
        assert_eq!(
            c.judge("System keeps crashing. Very frustrated.").label,
            SentimentLabel::Negative
        );
        let neutral = c.judge("The ticket was handled on Monday.");
        assert_eq!(neutral.label, SentimentLabel::Neutral);
        assert!(neutral.confidence <= POLARITY_THRESHOLD);
    }

    #[test]
    fn test_polarity_negation_halves() {
        let c = PolarityClassifier::new();
        let p = c.polarity("not good");
        assert!((p - (-0.25)).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_lexicon_classifiers_never_fail() {
        let valence = ValenceClassifier::new();
        let polarity = PolarityClassifier::new();
        assert!(valence.classify("").await.is_ok());
        assert!(polarity.classify("???").await.is_ok());
    }
}
