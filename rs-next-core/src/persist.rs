//! On-disk layout of a trained model.
//!
//! A model is stored as two files:
//! - the vocabulary file: postcard blob of the padding width `W` and the
//!   words in id order
//! - the classifier file: the backend's opaque bytes, written and read
//!   back unchanged

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{NextWordError, Result};
use crate::text::vocabulary::Vocabulary;

#[derive(Serialize, Deserialize)]
struct VocabularyFile {
	width: usize,
	vocabulary: Vocabulary,
}

fn create_parent(path: &Path) -> Result<()> {
	if let Some(parent) = path.parent()
		&& !parent.as_os_str().is_empty()
	{
		fs::create_dir_all(parent)?;
	}
	Ok(())
}

/// Writes the vocabulary together with the padding width it was trained with.
pub fn save_vocabulary<P: AsRef<Path>>(path: P, vocabulary: &Vocabulary, width: usize) -> Result<()> {
	let path = path.as_ref();
	let file = VocabularyFile { width, vocabulary: vocabulary.clone() };
	let bytes = postcard::to_stdvec(&file)?;
	create_parent(path)?;
	fs::write(path, bytes)?;
	Ok(())
}

/// Reads a vocabulary file written by [`save_vocabulary`].
///
/// # Errors
/// - [`NextWordError::Io`] if the file cannot be read
/// - [`NextWordError::Serialization`] if the content is not a vocabulary
/// - [`NextWordError::Shape`] if the stored width cannot hold a label
pub fn load_vocabulary<P: AsRef<Path>>(path: P) -> Result<(Vocabulary, usize)> {
	let bytes = fs::read(path)?;
	let file: VocabularyFile = postcard::from_bytes(&bytes)?;
	if file.width < 2 {
		return Err(NextWordError::Shape(format!("stored width {} is below 2", file.width)));
	}
	Ok((file.vocabulary, file.width))
}

/// Writes opaque classifier state.
pub fn save_classifier_state<P: AsRef<Path>>(path: P, state: &[u8]) -> Result<()> {
	let path = path.as_ref();
	create_parent(path)?;
	fs::write(path, state)?;
	Ok(())
}

/// Reads opaque classifier state.
pub fn load_classifier_state<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
	Ok(fs::read(path)?)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_vocabulary_round_trip() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("nested").join("corpus.vocab");
		let vocabulary = Vocabulary::fit(["the king is dead", "long live the king"]);

		save_vocabulary(&path, &vocabulary, 4).unwrap();
		let (restored, width) = load_vocabulary(&path).unwrap();

		assert_eq!(width, 4);
		assert_eq!(restored, vocabulary);
		for (word, id) in vocabulary.iter() {
			assert_eq!(restored.id(word), Some(id));
		}
	}

	#[test]
	fn test_load_rejects_garbage() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("broken.vocab");
		fs::write(&path, [0xff, 0xff, 0xff]).unwrap();
		assert!(matches!(load_vocabulary(&path), Err(NextWordError::Serialization(_))));
		assert!(matches!(load_vocabulary(dir.path().join("missing")), Err(NextWordError::Io(_))));
	}

	#[test]
	fn test_load_rejects_tiny_width() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("tiny.vocab");
		save_vocabulary(&path, &Vocabulary::fit(["a b"]), 1).unwrap();
		assert!(matches!(load_vocabulary(&path), Err(NextWordError::Shape(_))));
	}

	#[test]
	fn test_save_creates_missing_directories() {
		let dir = tempfile::tempdir().unwrap();
		let nested = dir.path().join("a").join("b").join("corpus.model");
		save_classifier_state(&nested, &[1]).unwrap();
		assert!(nested.is_file());
		assert!(create_parent(Path::new("corpus.model")).is_ok());
	}

	#[test]
	fn test_classifier_state_is_kept_verbatim() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("corpus.model");
		let state = vec![0u8, 1, 2, 254, 255];
		save_classifier_state(&path, &state).unwrap();
		assert_eq!(load_classifier_state(&path).unwrap(), state);
	}
}
