//! Classification side of the next-word system.
//!
//! - The classifier seam (`SequenceClassifier`) and its evaluation helpers
//! - The built-in count back-off backend (`BackoffClassifier`)
//! - Inference over free-form text (`Predictor`)
//! - The end-to-end training pipeline (`NextWordModel`)

/// Classifier contract, argmax and held-out evaluation.
pub mod classifier;

/// Count back-off classifier made of one context model per length.
///
/// Supports parallel fitting, merging and postcard persistence.
pub mod backoff_model;

/// Label counts for every context of one fixed length.
pub mod context_model;

/// Label counts after a single context.
///
/// This module is not exposed publicly.
mod state;

/// Text to next word, and iterative generation.
pub mod predictor;

/// Vocabulary, sequences, padding, split, fit and evaluation chained
/// together, plus the on-disk cache next to a corpus file.
pub mod pipeline;
