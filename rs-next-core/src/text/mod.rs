//! Text side of the pipeline: word splitting and the frozen vocabulary.

/// Case-folding, punctuation-aware word splitting.
pub mod tokenizer;

/// Word ↔ id mapping with the reserved padding id.
pub mod vocabulary;
