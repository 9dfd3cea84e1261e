use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::tokenizer::tokenize;
use crate::error::{NextWordError, Result};

/// Id reserved for padding. Never assigned to a word.
pub const PADDING_ID: u32 = 0;

/// Frozen word ↔ id mapping.
///
/// Ids are dense and start at 1: the word at `words[i]` has id `i + 1`.
/// Words are ordered by descending corpus frequency, ties keep the order of
/// first occurrence.
///
/// # Invariants
/// - The mapping is a bijection between `words` and `1..=len()`
/// - No word is empty
/// - The mapping never changes after construction
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
	words: Vec<String>,
	index: HashMap<String, u32>,
}

impl Vocabulary {
	/// Builds the vocabulary from corpus lines.
	pub fn fit<I, S>(lines: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		// word -> (count, first occurrence)
		let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
		let mut seen = 0;
		for line in lines {
			for word in tokenize(line.as_ref()) {
				let entry = counts.entry(word).or_insert((0, seen));
				entry.0 += 1;
				seen += 1;
			}
		}

		let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
		ranked.sort_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
			count_b.cmp(count_a).then(first_a.cmp(first_b))
		});

		let words: Vec<String> = ranked.into_iter().map(|(word, _)| word).collect();
		let index = Self::build_index(&words);
		Self { words, index }
	}

	/// Builds the vocabulary from a single corpus string.
	pub fn fit_text(corpus: &str) -> Self {
		Self::fit(corpus.lines())
	}

	/// Same as [`Vocabulary::fit`] but rejects a corpus without any word.
	///
	/// # Errors
	/// Returns [`NextWordError::InsufficientData`] if no word was found.
	pub fn fit_non_empty<I, S>(lines: I) -> Result<Self>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let vocabulary = Self::fit(lines);
		if vocabulary.is_empty() {
			return Err(NextWordError::InsufficientData("corpus contains no word".to_owned()));
		}
		Ok(vocabulary)
	}

	fn build_index(words: &[String]) -> HashMap<String, u32> {
		words
			.iter()
			.enumerate()
			.map(|(i, word)| (word.clone(), i as u32 + 1))
			.collect()
	}

	/// Id of a word, `None` if unknown.
	pub fn id(&self, word: &str) -> Option<u32> {
		self.index.get(word).copied()
	}

	/// Word for an id. The padding id and out-of-range ids have no word.
	pub fn word(&self, id: u32) -> Option<&str> {
		if id == PADDING_ID {
			return None;
		}
		self.words.get(id as usize - 1).map(String::as_str)
	}

	/// Number of distinct words.
	pub fn len(&self) -> usize {
		self.words.len()
	}

	pub fn is_empty(&self) -> bool {
		self.words.is_empty()
	}

	/// Number of classes a classifier must score: every word plus padding.
	pub fn total_words(&self) -> usize {
		self.words.len() + 1
	}

	/// Iterates over `(word, id)` pairs in id order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
		self.words.iter().enumerate().map(|(i, w)| (w.as_str(), i as u32 + 1))
	}

	/// Tokenizes `text` and maps every known word to its id.
	///
	/// Unknown words are dropped, they are not replaced by a placeholder.
	pub fn encode(&self, text: &str) -> Vec<u32> {
		tokenize(text).iter().filter_map(|word| self.id(word)).collect()
	}
}

impl TryFrom<Vec<String>> for Vocabulary {
	type Error = String;

	fn try_from(words: Vec<String>) -> std::result::Result<Self, Self::Error> {
		if words.iter().any(String::is_empty) {
			return Err("vocabulary contains an empty word".to_owned());
		}
		let index = Self::build_index(&words);
		if index.len() != words.len() {
			return Err("vocabulary contains duplicate words".to_owned());
		}
		Ok(Self { words, index })
	}
}

impl From<Vocabulary> for Vec<String> {
	fn from(vocabulary: Vocabulary) -> Self {
		vocabulary.words
	}
}
