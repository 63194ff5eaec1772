//! Ensemble runner: consults classifiers and aggregates their judgments.

use super::aggregator::{aggregate, is_too_short, WeightPolicy, EMPTY_METHOD};
use crate::classifiers::{Availability, Classifier};
use crate::models::{AggregateResult, Judgment, SourceTier};
use futures::future::join_all;
use tracing::{debug, warn};

/// The configured set of classifiers plus the weighting policy.
pub struct Ensemble {
    classifiers: Vec<Box<dyn Classifier>>,
    policy: WeightPolicy,
}

impl Ensemble {
    /// Create an ensemble. Model-tier classifiers are moved to the front;
    /// the relative order within each tier is kept.
    pub fn new(mut classifiers: Vec<Box<dyn Classifier>>, policy: WeightPolicy) -> Self {
        classifiers.sort_by_key(|c| match c.tier() {
            SourceTier::Model => 0,
            SourceTier::Lexicon => 1,
        });
        Self {
            classifiers,
            policy,
        }
    }

    /// Names of the classifiers in evaluation order.
    pub fn classifier_names(&self) -> Vec<&'static str> {
        self.classifiers.iter().map(|c| c.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.classifiers.is_empty()
    }

    /// Probe every classifier and report availability, in evaluation order.
    pub async fn probe_all(&self) -> Vec<(&'static str, &'static str, Availability)> {
        let probes = self.classifiers.iter().map(|c| async move {
            let availability = c.probe().await;
            (c.name(), c.description(), availability)
        });
        join_all(probes).await
    }

    /// Probe model classifiers and drop those that cannot run.
    ///
    /// Lexicon classifiers are always kept. Returns the names removed.
    pub async fn retain_available(&mut self) -> Vec<&'static str> {
        let checks = self.classifiers.iter().map(|c| async move {
            match c.tier() {
                SourceTier::Lexicon => Availability::Available,
                SourceTier::Model => c.probe().await,
            }
        });
        let results = join_all(checks).await;

        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.classifiers.len());
        for (classifier, availability) in self.classifiers.drain(..).zip(results) {
            match availability {
                Availability::Available => kept.push(classifier),
                Availability::Unavailable(reason) => {
                    warn!("Classifier '{}' unavailable: {}", classifier.name(), reason);
                    removed.push(classifier.name());
                }
            }
        }
        self.classifiers = kept;

        removed
    }

    /// Collect judgments from every classifier, skipping the ones that fail.
    pub async fn judgments(&self, text: &str) -> Vec<Judgment> {
        let calls = self.classifiers.iter().map(|c| c.classify(text));
        let outcomes = join_all(calls).await;

        let mut judgments = Vec::with_capacity(outcomes.len());
        for (classifier, outcome) in self.classifiers.iter().zip(outcomes) {
            match outcome {
                Ok(judgment) => {
                    debug!(
                        "{}: {} ({:.3})",
                        judgment.source, judgment.label, judgment.confidence
                    );
                    judgments.push(judgment);
                }
                Err(e) => warn!("Classifier '{}' skipped: {}", classifier.name(), e),
            }
        }

        judgments
    }

    /// Analyse one text.
    pub async fn analyze(&self, text: &str) -> AggregateResult {
        if is_too_short(text) {
            return AggregateResult::neutral(EMPTY_METHOD);
        }

        let judgments = self.judgments(text).await;
        aggregate(text, &judgments, &self.policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::{ClassifierError, DomainClassifier, PolarityClassifier, ValenceClassifier};
    use crate::models::SentimentLabel;
    use futures::future::{BoxFuture, FutureExt};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Model-tier stand-in returning a fixed judgment or failing.
    struct FixedModel {
        label: SentimentLabel,
        confidence: f64,
        fail: bool,
        calls: Arc<AtomicUsize>,
    }

    impl FixedModel {
        fn new(label: SentimentLabel, confidence: f64) -> Self {
            Self {
                label,
                confidence,
                fail: false,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new(SentimentLabel::Neutral, 0.0)
            }
        }
    }

    impl Classifier for FixedModel {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn tier(&self) -> SourceTier {
            SourceTier::Model
        }

        fn description(&self) -> &'static str {
            "test model"
        }

        fn classify<'a>(
            &'a self,
            _text: &'a str,
        ) -> BoxFuture<'a, Result<Judgment, ClassifierError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let outcome = if self.fail {
                Err(ClassifierError::Connect("http://nowhere".to_string()))
            } else {
                Ok(Judgment::model(self.label, self.confidence, self.name()))
            };
            futures::future::ready(outcome).boxed()
        }
    }

    fn lexicon_set() -> Vec<Box<dyn Classifier>> {
        vec![
            Box::new(ValenceClassifier::new()),
            Box::new(DomainClassifier::new()),
            Box::new(PolarityClassifier::new()),
        ]
    }

    #[test]
    fn test_model_classifiers_evaluated_first() {
        let mut classifiers = lexicon_set();
        classifiers.push(Box::new(FixedModel::new(SentimentLabel::Positive, 0.9)));
        let ensemble = Ensemble::new(classifiers, WeightPolicy::default());
        assert_eq!(
            ensemble.classifier_names(),
            vec!["fixed", "valence", "domain", "polarity"]
        );
    }

    #[tokio::test]
    async fn test_lexicon_ensemble_positive() {
        let ensemble = Ensemble::new(lexicon_set(), WeightPolicy::default());
        let result = ensemble
            .analyze("The customer service representative was extremely helpful and resolved my issue quickly!")
            .await;
        assert_eq!(result.label, SentimentLabel::Positive);
        assert_eq!(result.method, "ensemble(valence+domain+polarity)");
        assert!((0.0..=1.0).contains(&result.confidence));
    }

    #[tokio::test]
    async fn test_lexicon_ensemble_negative() {
        let ensemble = Ensemble::new(lexicon_set(), WeightPolicy::default());
        let result = ensemble
            .analyze("I waited 2 hours and the agent was rude. Terrible experience.")
            .await;
        assert_eq!(result.label, SentimentLabel::Negative);
    }

    #[tokio::test]
    async fn test_short_text_skips_classifiers() {
        let model = FixedModel::new(SentimentLabel::Positive, 0.9);
        let calls = model.calls.clone();
        let ensemble = Ensemble::new(vec![Box::new(model)], WeightPolicy::default());

        let result = ensemble.analyze(" ok ").await;

        assert_eq!(result, AggregateResult::neutral("empty"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failing_source_is_excluded() {
        let mut classifiers = lexicon_set();
        classifiers.push(Box::new(FixedModel::failing()));
        let ensemble = Ensemble::new(classifiers, WeightPolicy::default());

        let judgments = ensemble.judgments("Rude and unhelpful agent").await;
        assert_eq!(judgments.len(), 3);
        assert!(judgments.iter().all(|j| j.tier == SourceTier::Lexicon));

        let result = ensemble.analyze("Rude and unhelpful agent").await;
        assert_eq!(result.label, SentimentLabel::Negative);
        assert!(!result.method.contains("fixed"));
    }

    #[tokio::test]
    async fn test_all_sources_failing_falls_back() {
        let ensemble = Ensemble::new(vec![Box::new(FixedModel::failing())], WeightPolicy::default());
        let result = ensemble.analyze("Anything long enough").await;
        assert_eq!(result, AggregateResult::neutral("fallback"));
    }

    #[tokio::test]
    async fn test_model_judgment_carries_primary_weight() {
        let mut classifiers = lexicon_set();
        classifiers.push(Box::new(FixedModel::new(SentimentLabel::Negative, 1.0)));
        let ensemble = Ensemble::new(classifiers, WeightPolicy::default());

        // Lexicons see nothing; the model alone decides.
        let result = ensemble.analyze("I called on Tuesday about my account.").await;
        assert_eq!(result.label, SentimentLabel::Negative);
        assert!((result.confidence - 0.5).abs() < 1e-9);
        assert_eq!(result.method, "ensemble(fixed+valence+domain+polarity)");
    }

    #[tokio::test]
    async fn test_retain_available_drops_unreachable_models() {
        let mut classifiers = lexicon_set();
        classifiers.push(Box::new(FixedModel::failing()));
        let mut ensemble = Ensemble::new(classifiers, WeightPolicy::default());

        let removed = ensemble.retain_available().await;

        assert_eq!(removed, vec!["fixed"]);
        assert_eq!(ensemble.classifier_names(), vec!["valence", "domain", "polarity"]);
    }

    #[tokio::test]
    async fn test_analysis_is_idempotent() {
        let ensemble = Ensemble::new(lexicon_set(), WeightPolicy::default());
        let text = "Helpful agent but the system is slow";
        let first = ensemble.analyze(text).await;
        let second = ensemble.analyze(text).await;
        assert_eq!(first, second);
    }
}
