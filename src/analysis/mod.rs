//! Ensemble analysis.
//!
//! `aggregator` holds the pure weighted vote; `ensemble` drives the
//! configured classifiers and feeds their judgments to it.

pub mod aggregator;
pub mod ensemble;

pub use aggregator::WeightPolicy;
pub use ensemble::Ensemble;
