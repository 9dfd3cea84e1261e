use log::info;
use ndarray::Array2;

use super::sequences::Sequence;
use crate::error::{NextWordError, Result};
use crate::text::vocabulary::PADDING_ID;

/// Classifier inputs and their one-hot labels, one example per row.
#[derive(Clone, Debug, PartialEq)]
pub struct Examples {
	/// Left-padded ids, `W - 1` columns.
	pub inputs: Array2<u32>,
	/// One-hot labels, one column per class.
	pub labels: Array2<f32>,
}

impl Examples {
	pub fn len(&self) -> usize {
		self.inputs.nrows()
	}

	pub fn is_empty(&self) -> bool {
		self.inputs.nrows() == 0
	}
}

/// Output of [`encode`]: the examples plus the width they were padded to.
#[derive(Clone, Debug)]
pub struct EncodedCorpus {
	pub examples: Examples,
	/// `W`, the longest sequence length in the corpus.
	pub width: usize,
	/// Number of label classes (`total_words`).
	pub classes: usize,
}

/// Longest sequence length, `0` for an empty set.
pub fn max_sequence_len(sequences: &[Sequence]) -> usize {
	sequences.iter().map(Vec::len).max().unwrap_or(0)
}

/// Fits `ids` into exactly `width` slots.
///
/// Longer inputs keep their last `width` ids; shorter ones are left-padded
/// with [`PADDING_ID`].
pub fn pad_input(ids: &[u32], width: usize) -> Vec<u32> {
	let kept = &ids[ids.len().saturating_sub(width)..];
	let mut row = vec![PADDING_ID; width - kept.len()];
	row.extend_from_slice(kept);
	row
}

/// Pads every sequence to `width` columns with [`pad_input`] semantics.
pub fn pad_sequences(sequences: &[Sequence], width: usize) -> Array2<u32> {
	let mut matrix = Array2::from_elem((sequences.len(), width), PADDING_ID);
	for (mut row, sequence) in matrix.rows_mut().into_iter().zip(sequences) {
		for (cell, id) in row.iter_mut().zip(pad_input(sequence, width)) {
			*cell = id;
		}
	}
	matrix
}

/// Drops the leading padding of a row.
pub fn strip_padding(row: &[u32]) -> &[u32] {
	let start = row.iter().position(|id| *id != PADDING_ID).unwrap_or(row.len());
	&row[start..]
}

/// One-hot encodes `labels` over `classes` columns.
///
/// # Errors
/// Returns [`NextWordError::Shape`] if a label is not a valid class.
pub fn one_hot(labels: &[u32], classes: usize) -> Result<Array2<f32>> {
	let mut matrix = Array2::zeros((labels.len(), classes));
	for (row, label) in labels.iter().enumerate() {
		let column = *label as usize;
		if column >= classes {
			return Err(NextWordError::Shape(format!(
				"label {label} does not fit {classes} classes"
			)));
		}
		matrix[[row, column]] = 1.0;
	}
	Ok(matrix)
}

/// Pads the expanded sequences to the corpus width and splits off labels.
///
/// `W` is computed once over all sequences; the inputs keep the first
/// `W - 1` columns and the last column becomes the one-hot label.
///
/// # Errors
/// - [`NextWordError::InsufficientData`] if there is no sequence
/// - [`NextWordError::Shape`] if a sequence is shorter than 2 or a label
///   exceeds `total_words`
pub fn encode(sequences: &[Sequence], total_words: usize) -> Result<EncodedCorpus> {
	if sequences.is_empty() {
		return Err(NextWordError::InsufficientData("no sequence to encode".to_owned()));
	}
	if let Some(short) = sequences.iter().find(|s| s.len() < 2) {
		return Err(NextWordError::Shape(format!(
			"sequence of length {} has no label",
			short.len()
		)));
	}

	let width = max_sequence_len(sequences);
	let padded = pad_sequences(sequences, width);

	let inputs = padded.slice(ndarray::s![.., ..width - 1]).to_owned();
	let label_ids: Vec<u32> = padded.column(width - 1).to_vec();
	let labels = one_hot(&label_ids, total_words)?;

	info!(
		"Encoded {} examples, width {}, {} classes",
		inputs.nrows(),
		width,
		total_words
	);

	Ok(EncodedCorpus {
		examples: Examples { inputs, labels },
		width,
		classes: total_words,
	})
}
