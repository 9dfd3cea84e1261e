use std::path::Path;

use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::backoff_model::BackoffClassifier;
use super::classifier::{Evaluation, SequenceClassifier, evaluate};
use super::predictor::Predictor;
use crate::config::PipelineConfig;
use crate::dataset::padding::encode;
use crate::dataset::sequences::expand_corpus;
use crate::dataset::split::train_test_split;
use crate::error::{NextWordError, Result};
use crate::io::{build_output_path, get_filename, read_file};
use crate::persist;
use crate::text::vocabulary::Vocabulary;

/// Extension of the cached vocabulary file.
pub const VOCABULARY_EXTENSION: &str = "vocab";
/// Extension of the cached classifier file.
pub const MODEL_EXTENSION: &str = "model";

/// A trained next-word model.
///
/// Owns everything needed at inference time: the frozen vocabulary, the
/// sequence width `W` seen during training and the fitted classifier.
#[derive(Debug)]
pub struct NextWordModel<C> {
	name: String,
	vocabulary: Vocabulary,
	width: usize,
	classifier: C,
}

/// Next-word model backed by the built-in [`BackoffClassifier`].
pub type BackoffModel = NextWordModel<BackoffClassifier>;

impl<C: SequenceClassifier> NextWordModel<C> {
	/// Assembles a model from already trained parts.
	///
	/// # Errors
	/// - [`NextWordError::Shape`] if `width < 2`
	/// - [`NextWordError::Classifier`] if the classifier does not score
	///   exactly `total_words` classes
	pub fn from_parts(name: &str, vocabulary: Vocabulary, width: usize, classifier: C) -> Result<Self> {
		if width < 2 {
			return Err(NextWordError::Shape(format!("width must be >= 2, got {width}")));
		}
		if classifier.classes() != vocabulary.total_words() {
			return Err(NextWordError::Classifier(format!(
				"classifier scores {} classes, vocabulary needs {}",
				classifier.classes(),
				vocabulary.total_words()
			)));
		}
		Ok(Self { name: name.to_owned(), vocabulary, width, classifier })
	}

	/// Trains a model on `lines`.
	///
	/// `make_classifier` receives the number of label classes and returns an
	/// untrained classifier for them.
	///
	/// # Behavior
	/// - Builds the vocabulary and expands every line into prefix sequences.
	/// - Pads them to the longest length `W` and splits off a test set.
	/// - Fits the classifier on the train side and scores it on the test side.
	///
	/// # Errors
	/// - [`NextWordError::Config`] if `config` is invalid
	/// - [`NextWordError::InsufficientData`] if the corpus is too small to
	///   produce a training example
	/// - any error raised by the classifier
	pub fn train_with<S, F>(
		name: &str,
		lines: &[S],
		config: &PipelineConfig,
		make_classifier: F,
	) -> Result<(Self, Evaluation)>
	where
		S: AsRef<str>,
		F: FnOnce(usize) -> C,
	{
		config.validate()?;

		let vocabulary = Vocabulary::fit_non_empty(lines)?;
		info!("Vocabulary has {} words", vocabulary.len());

		let sequences = expand_corpus(lines, &vocabulary)?;
		let corpus = encode(&sequences, vocabulary.total_words())?;
		info!("Padded {} sequences to width {}", corpus.examples.len(), corpus.width);

		let split = match config.seed {
			Some(seed) => train_test_split(&corpus.examples, config.test_fraction, &mut StdRng::seed_from_u64(seed))?,
			None => train_test_split(&corpus.examples, config.test_fraction, &mut rand::rng())?,
		};

		let mut classifier = make_classifier(corpus.classes);
		classifier.fit(&split.train)?;
		let evaluation = evaluate(&classifier, &split.test)?;

		let model = Self::from_parts(name, vocabulary, corpus.width, classifier)?;
		Ok((model, evaluation))
	}

	/// Writes the vocabulary and classifier next to each other.
	pub fn save<P: AsRef<Path>>(&self, vocabulary_path: P, classifier_path: P) -> Result<()> {
		persist::save_vocabulary(vocabulary_path, &self.vocabulary, self.width)?;
		persist::save_classifier_state(classifier_path, &self.classifier.to_bytes()?)?;
		Ok(())
	}

	/// Borrowing predictor over this model.
	pub fn predictor(&self) -> Predictor<'_, C> {
		Predictor::new(&self.vocabulary, &self.classifier)
	}

	/// Predicts the word following `text`, `None` if there is no match.
	pub fn predict(&self, text: &str) -> Result<Option<String>> {
		self.predictor().predict(text, self.width)
	}

	/// Extends `text` by up to `count` predicted words.
	pub fn generate(&self, text: &str, count: usize) -> Result<String> {
		self.predictor().generate(text, self.width, count)
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn vocabulary(&self) -> &Vocabulary {
		&self.vocabulary
	}

	/// `W`, the padded sequence length used in training.
	pub fn width(&self) -> usize {
		self.width
	}

	pub fn classifier(&self) -> &C {
		&self.classifier
	}
}

impl NextWordModel<BackoffClassifier> {
	/// Trains the built-in back-off classifier on `lines`.
	pub fn train<S: AsRef<str>>(name: &str, lines: &[S], config: &PipelineConfig) -> Result<(Self, Evaluation)> {
		Self::train_with(name, lines, config, |classes| BackoffClassifier::new(classes, config.max_context))
	}

	/// Loads a model for a corpus file, training it if needed.
	///
	/// # Behavior
	/// - If `<stem>.vocab` and `<stem>.model` exist next to the corpus,
	///   they are loaded.
	/// - Otherwise the corpus is read, a model is trained, and both files
	///   are written for the next call.
	/// - Cached files that cannot be read are replaced by a fresh training run.
	///
	/// The model name is the corpus file stem.
	pub fn new<P: AsRef<Path>>(corpus_path: P, config: &PipelineConfig) -> Result<Self> {
		let corpus_path = corpus_path.as_ref();
		let name = get_filename(corpus_path)?;
		let vocabulary_path = build_output_path(corpus_path, VOCABULARY_EXTENSION)?;
		let classifier_path = build_output_path(corpus_path, MODEL_EXTENSION)?;

		if vocabulary_path.exists() && classifier_path.exists() {
			match Self::load(&name, &vocabulary_path, &classifier_path) {
				Ok(model) => {
					info!("Loaded cached model {name:?}");
					return Ok(model);
				}
				Err(e) => warn!("Cannot use cached model {name:?}, retraining: {e}"),
			}
		}

		let lines = read_file(corpus_path)?;
		let (model, evaluation) = Self::train(&name, &lines, config)?;
		info!(
			"Trained model {name:?}: accuracy {:.3} on {} held-out example(s)",
			evaluation.accuracy, evaluation.samples
		);
		model.save(&vocabulary_path, &classifier_path)?;
		Ok(model)
	}

	/// Restores a model from its vocabulary and classifier files.
	pub fn load<P: AsRef<Path>>(name: &str, vocabulary_path: P, classifier_path: P) -> Result<Self> {
		let (vocabulary, width) = persist::load_vocabulary(vocabulary_path)?;
		let classifier = BackoffClassifier::from_bytes(&persist::load_classifier_state(classifier_path)?)?;
		Self::from_parts(name, vocabulary, width, classifier)
	}
}
