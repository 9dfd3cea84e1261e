use thiserror::Error;

/// Errors produced by the next-word pipeline.
///
/// Each stage maps its failures onto one of these variants. Classifier
/// backends report every internal problem (bad shapes, corrupted state)
/// as [`NextWordError::Classifier`] so callers see a single failure kind
/// for the opaque component.
#[derive(Error, Debug)]
pub enum NextWordError {
	/// The corpus cannot produce a single training sequence.
	#[error("insufficient training data: {0}")]
	InsufficientData(String),

	#[error("classifier failure: {0}")]
	Classifier(String),

	/// Tensor dimensions disagree with the vocabulary or padding width.
	#[error("shape error: {0}")]
	Shape(String),

	#[error("config error: {0}")]
	Config(String),

	#[error("io error: {0}")]
	Io(#[from] std::io::Error),

	#[error("serialization error: {0}")]
	Serialization(#[from] postcard::Error),
}

pub type Result<T> = std::result::Result<T, NextWordError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_error_display() {
		let err = NextWordError::InsufficientData("no line has two words".to_owned());
		assert!(err.to_string().contains("insufficient training data"));

		let err = NextWordError::Classifier("row 3 is not one-hot".to_owned());
		assert!(err.to_string().contains("classifier failure"));

		let err = NextWordError::Shape("expected 12 columns".to_owned());
		assert!(err.to_string().contains("shape error"));

		let err = NextWordError::Config("test_fraction must be in (0, 1)".to_owned());
		assert!(err.to_string().contains("config error"));
	}

	#[test]
	fn test_from_io_error() {
		let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
		let err: NextWordError = io.into();
		assert!(matches!(err, NextWordError::Io(_)));
	}

	#[test]
	fn test_from_postcard_error() {
		let bad: &[u8] = &[0xff];
		let decoded: std::result::Result<String, _> = postcard::from_bytes(bad);
		if let Err(e) = decoded {
			let err: NextWordError = e.into();
			assert!(matches!(err, NextWordError::Serialization(_)));
		}
	}
}
