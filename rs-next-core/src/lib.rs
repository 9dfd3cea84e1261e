//! Next-word prediction library.
//!
//! This crate provides a word-level next-word prediction system including:
//! - A frequency-ordered vocabulary built from a line corpus
//! - Prefix sequence expansion, left padding and one-hot labels
//! - A pluggable sequence classifier with a built-in back-off backend
//! - Prediction and iterative generation from free-form text
//!
//! The usual entry point is [`BackoffModel::new`], which trains a model from
//! a corpus file or loads the copy cached next to it.

/// Error type shared by every module.
pub mod error;

/// Pipeline settings and `RS_NEXT_*` environment helpers.
pub mod config;

/// Tokenizer and vocabulary.
pub mod text;

/// Sequence expansion, padding and train/test split.
pub mod dataset;

/// Classifiers, prediction and the training pipeline.
pub mod model;

/// Saving and loading of trained artifacts.
pub mod persist;

/// I/O utilities (corpus loading, path helpers).
///
/// Only directory listing is exposed.
pub mod io;

pub use config::PipelineConfig;
pub use error::{NextWordError, Result};
pub use model::backoff_model::BackoffClassifier;
pub use model::classifier::{Evaluation, SequenceClassifier};
pub use model::pipeline::{BackoffModel, NextWordModel};
pub use model::predictor::Predictor;
pub use text::vocabulary::Vocabulary;
