//! Text-to-tensor preparation.
//!
//! Lines are expanded into prefix sequences, padded to a single corpus-wide
//! width, split into inputs and one-hot labels, and finally partitioned into
//! train and test examples.

/// Prefix n-gram expansion of encoded lines.
pub mod sequences;

/// Left padding, label extraction and one-hot encoding.
pub mod padding;

/// Random train/test partition.
pub mod split;
