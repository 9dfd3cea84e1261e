use std::fs;
use std::path::PathBuf;

use rs_next_core::{BackoffModel, NextWordError, PipelineConfig, SequenceClassifier};

/// "the king is dead" / "long live the king", repeated so that every
/// context survives the held-out split.
fn king_lines() -> Vec<String> {
	let mut lines = Vec::new();
	for _ in 0..10 {
		lines.push("The king is dead.".to_owned());
		lines.push("Long live the king!".to_owned());
	}
	lines
}

fn config() -> PipelineConfig {
	PipelineConfig { seed: Some(7), ..PipelineConfig::default() }
}

fn write_corpus(dir: &tempfile::TempDir, name: &str, lines: &[String]) -> PathBuf {
	let path = dir.path().join(format!("{name}.txt"));
	fs::write(&path, lines.join("\n")).unwrap();
	path
}

#[test]
fn predicts_next_word_end_to_end() {
	let (model, evaluation) = BackoffModel::train("king", &king_lines(), &config()).unwrap();

	assert_eq!(model.width(), 4);
	assert_eq!(model.vocabulary().id("the"), Some(1));
	assert_eq!(model.vocabulary().id("king"), Some(2));
	assert_eq!(evaluation.samples, 12);

	assert_eq!(model.predict("the").unwrap().as_deref(), Some("king"));
	assert_eq!(model.predict("the king").unwrap().as_deref(), Some("is"));
	assert_eq!(model.predict("Long live").unwrap().as_deref(), Some("the"));
}

#[test]
fn long_input_uses_most_recent_words() {
	let (model, _) = BackoffModel::train("king", &king_lines(), &config()).unwrap();
	assert_eq!(model.predict("long live the king is").unwrap().as_deref(), Some("dead"));
	assert_eq!(model.predictor().encode_input("long live the king is", model.width()).unwrap(), vec![1, 2, 3]);
}

#[test]
fn empty_or_unknown_input_is_no_match() {
	let (model, _) = BackoffModel::train("king", &king_lines(), &config()).unwrap();
	assert_eq!(model.predict("").unwrap(), None);
	assert_eq!(model.predict("   ").unwrap(), None);
	assert_eq!(model.predict("queen").unwrap(), None);
	assert_eq!(model.generate("queen", 5).unwrap(), "queen");
}

#[test]
fn generates_continuation() {
	let (model, _) = BackoffModel::train("king", &king_lines(), &config()).unwrap();
	assert_eq!(model.generate("long live", 4).unwrap(), "long live the king is dead");
	assert_eq!(model.generate("long live", 0).unwrap(), "long live");
}

#[test]
fn caches_model_next_to_corpus() {
	let dir = tempfile::tempdir().unwrap();
	let corpus = write_corpus(&dir, "king", &king_lines());

	let trained = BackoffModel::new(&corpus, &config()).unwrap();
	assert_eq!(trained.name(), "king");
	assert!(dir.path().join("king.vocab").is_file());
	assert!(dir.path().join("king.model").is_file());

	// Removing the corpus proves the second call reads the cache
	fs::remove_file(&corpus).unwrap();
	let loaded = BackoffModel::new(&corpus, &config()).unwrap();
	assert_eq!(loaded.vocabulary(), trained.vocabulary());
	assert_eq!(loaded.width(), trained.width());
	assert_eq!(loaded.classifier(), trained.classifier());
	assert_eq!(loaded.predict("the king").unwrap(), trained.predict("the king").unwrap());
}

#[test]
fn broken_cache_is_retrained() {
	let dir = tempfile::tempdir().unwrap();
	let corpus = write_corpus(&dir, "king", &king_lines());
	fs::write(dir.path().join("king.vocab"), b"not a vocabulary").unwrap();
	fs::write(dir.path().join("king.model"), b"not a model").unwrap();

	let model = BackoffModel::new(&corpus, &config()).unwrap();
	assert_eq!(model.predict("the").unwrap().as_deref(), Some("king"));

	let reloaded = BackoffModel::new(&corpus, &config()).unwrap();
	assert_eq!(reloaded.classifier(), model.classifier());
}

#[test]
fn insufficient_corpus_is_rejected() {
	let dir = tempfile::tempdir().unwrap();
	let lonely = write_corpus(&dir, "lonely", &["hello".to_owned(), "world".to_owned()]);
	assert!(matches!(BackoffModel::new(&lonely, &config()), Err(NextWordError::InsufficientData(_))));
	assert!(!dir.path().join("lonely.vocab").exists());

	let missing = dir.path().join("missing.txt");
	assert!(matches!(BackoffModel::new(&missing, &config()), Err(NextWordError::Io(_))));
}

#[test]
fn max_context_is_honoured() {
	let config = PipelineConfig { max_context: 1, ..config() };
	let (model, _) = BackoffModel::train("king", &king_lines(), &config).unwrap();
	assert_eq!(model.classifier().classes(), 7);
	// With one word of context, "king" is followed by "is" in the corpus
	assert_eq!(model.predict("long live the king").unwrap().as_deref(), Some("is"));
}
