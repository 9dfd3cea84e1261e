use log::{debug, info};

use crate::error::{NextWordError, Result};
use crate::text::vocabulary::Vocabulary;

/// Ordered token ids; the last id is the word to predict.
pub type Sequence = Vec<u32>;

/// Expands one encoded line into all of its prefixes of length `2..=N`.
///
/// A line of `N >= 2` ids yields exactly `N - 1` sequences, shortest
/// first. Shorter lines yield nothing.
pub fn expand_line(ids: &[u32]) -> Vec<Sequence> {
	(2..=ids.len()).map(|len| ids[..len].to_vec()).collect()
}

/// Expands every corpus line with the frozen vocabulary.
///
/// Words missing from the vocabulary are skipped before expansion.
///
/// # Errors
/// Returns [`NextWordError::InsufficientData`] if no line holds at least
/// two known words.
pub fn expand_corpus<I, S>(lines: I, vocabulary: &Vocabulary) -> Result<Vec<Sequence>>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let mut sequences = Vec::new();
	let mut skipped = 0;
	for line in lines {
		let ids = vocabulary.encode(line.as_ref());
		if ids.len() < 2 {
			skipped += 1;
			continue;
		}
		sequences.extend(expand_line(&ids));
	}

	if sequences.is_empty() {
		return Err(NextWordError::InsufficientData(
			"no line contains two known words".to_owned(),
		));
	}

	debug!("{skipped} line(s) produced no sequence");
	info!("Expanded corpus into {} sequences", sequences.len());
	Ok(sequences)
}
