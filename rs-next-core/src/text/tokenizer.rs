/// Characters replaced by a space before splitting.
///
/// The apostrophe is deliberately absent so contractions stay one word.
pub const FILTERS: &str = "!\"#$%&()*+,-./:;<=>?@[\\]^_`{|}~\t\n";

/// Splits text into case-folded words.
///
/// Every character of [`FILTERS`] acts as a separator, then the text is
/// split on whitespace and empty pieces are dropped. The same rule is used
/// when building the vocabulary, expanding training lines and predicting.
pub fn tokenize(text: &str) -> Vec<String> {
	let cleaned: String = text
		.chars()
		.flat_map(|c| c.to_lowercase())
		.map(|c| if FILTERS.contains(c) { ' ' } else { c })
		.collect();

	cleaned.split_whitespace().map(str::to_owned).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_lowercases_and_splits() {
		assert_eq!(tokenize("The King  is\tDead"), vec!["the", "king", "is", "dead"]);
	}

	#[test]
	fn test_punctuation_separates_words() {
		assert_eq!(tokenize("dead.Long live,the-king!"), vec!["dead", "long", "live", "the", "king"]);
	}

	#[test]
	fn test_apostrophe_is_kept() {
		assert_eq!(tokenize("Don't stop"), vec!["don't", "stop"]);
	}

	#[test]
	fn test_empty_and_punctuation_only() {
		assert!(tokenize("").is_empty());
		assert!(tokenize(" ?! ... ").is_empty());
	}
}
