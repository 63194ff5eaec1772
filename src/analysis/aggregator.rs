//! Weighted ensemble aggregation.
//!
//! This module reduces the judgments of several independent classifiers
//! to one final label using weighted voting. Aggregation is pure: it never
//! fails and never consults a classifier itself.

use crate::models::{AggregateResult, Judgment, SentimentLabel, SourceTier};
use serde::{Deserialize, Serialize};

/// Texts shorter than this (in chars, after trimming) are not analysed.
pub const MIN_TEXT_CHARS: usize = 3;

/// Provenance for texts that were too short to analyse.
pub const EMPTY_METHOD: &str = "empty";

/// Provenance when no judgment was available.
pub const FALLBACK_METHOD: &str = "fallback";

/// Weight schedules used to combine judgments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightPolicy {
    /// Weight of the first model-tier judgment, when one is present.
    pub primary_weight: f64,
    /// Weights for the remaining judgments when a model-tier judgment leads.
    pub secondary_weights: Vec<f64>,
    /// Weights used when no model-tier judgment is present.
    pub fallback_weights: Vec<f64>,
}

/// Primary weight used when the configured one is unusable.
const DEFAULT_PRIMARY_WEIGHT: f64 = 0.5;

impl Default for WeightPolicy {
    fn default() -> Self {
        Self {
            primary_weight: DEFAULT_PRIMARY_WEIGHT,
            secondary_weights: vec![0.25, 0.15, 0.10],
            fallback_weights: vec![0.4, 0.3, 0.3],
        }
    }
}

impl WeightPolicy {
    /// Compute normalised weights, one per judgment, in judgment order.
    ///
    /// The schedule is truncated to the number of judgments; surplus
    /// judgments repeat the last schedule entry. Weights always sum to 1.0
    /// for a non-empty input.
    pub fn weights_for(&self, judgments: &[Judgment]) -> Vec<f64> {
        if judgments.is_empty() {
            return Vec::new();
        }

        let primary = judgments.iter().position(|j| j.tier == SourceTier::Model);

        let raw: Vec<f64> = match primary {
            Some(primary_idx) => {
                let mut rest = 0;
                judgments
                    .iter()
                    .enumerate()
                    .map(|(i, _)| {
                        if i == primary_idx {
                            usable_weight(self.primary_weight).unwrap_or(DEFAULT_PRIMARY_WEIGHT)
                        } else {
                            let w = schedule_at(&self.secondary_weights, rest);
                            rest += 1;
                            w
                        }
                    })
                    .collect()
            }
            None => (0..judgments.len())
                .map(|i| schedule_at(&self.fallback_weights, i))
                .collect(),
        };

        normalize(raw)
    }
}

/// A weight is usable when it is finite and not negative.
fn usable_weight(w: f64) -> Option<f64> {
    Some(w).filter(|w| w.is_finite() && *w >= 0.0)
}

fn schedule_at(schedule: &[f64], i: usize) -> f64 {
    schedule
        .get(i)
        .or_else(|| schedule.last())
        .copied()
        .and_then(usable_weight)
        .unwrap_or(1.0)
}

/// Scale weights to sum to 1.0; a degenerate schedule becomes uniform.
fn normalize(raw: Vec<f64>) -> Vec<f64> {
    let sum: f64 = raw.iter().sum();
    if sum > 0.0 && sum.is_finite() {
        raw.into_iter().map(|w| w / sum).collect()
    } else {
        let n = raw.len() as f64;
        raw.into_iter().map(|_| 1.0 / n).collect()
    }
}

/// Returns true if the text is too short to analyse.
pub fn is_too_short(text: &str) -> bool {
    text.trim().chars().count() < MIN_TEXT_CHARS
}

/// Combine judgments for `text` into one result.
pub fn aggregate(text: &str, judgments: &[Judgment], policy: &WeightPolicy) -> AggregateResult {
    if is_too_short(text) {
        return AggregateResult::neutral(EMPTY_METHOD);
    }

    if judgments.is_empty() {
        return AggregateResult::neutral(FALLBACK_METHOD);
    }

    let weights = policy.weights_for(judgments);

    let mut scores = [0.0_f64; 3];
    for (judgment, weight) in judgments.iter().zip(&weights) {
        scores[judgment.label.index()] += weight * judgment.confidence;
    }

    // Strictly-greater comparison keeps the earlier label in ALL on ties.
    let mut winner = SentimentLabel::ALL[0];
    for label in SentimentLabel::ALL.iter().skip(1) {
        if scores[label.index()] > scores[winner.index()] {
            winner = *label;
        }
    }

    let confidence = scores[winner.index()].clamp(0.0, 1.0);

    AggregateResult {
        label: winner,
        confidence,
        method: provenance(judgments),
    }
}

/// Provenance string listing the contributing sources in order.
fn provenance(judgments: &[Judgment]) -> String {
    let sources: Vec<&str> = judgments.iter().map(|j| j.source.as_str()).collect();
    format!("ensemble({})", sources.join("+"))
}
