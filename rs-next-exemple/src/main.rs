use log::info;
use rs_next_core::config::{env_key, env_string};
use rs_next_core::{BackoffModel, PipelineConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    // One sentence per line, e.g. "the king is dead"
    let corpus = env_string(&env_key("CORPUS"))?.unwrap_or_else(|| "./data/corpus.txt".to_owned());

    // RS_NEXT_TEST_FRACTION, RS_NEXT_SEED and RS_NEXT_MAX_CONTEXT tune training
    let config = PipelineConfig::from_env()?;

    // Trains on the first run and writes corpus.vocab / corpus.model next to
    // the corpus; later runs load those files instead
    let model = BackoffModel::new(&corpus, &config)?;
    info!(
        "Model {:?}: {} words, sequence width {}",
        model.name(),
        model.vocabulary().len(),
        model.width()
    );

    // Unknown words are ignored, so "queen" alone has no prediction
    for seed in ["the", "the king", "long live the", "queen"] {
        match model.predict(seed)? {
            Some(word) => println!("{seed} -> {word}"),
            None => println!("{seed} -> (no prediction)"),
        }
    }

    // Generation stops early if a prediction is missing
    println!("Generated: {}", model.generate("the", 10)?);

    Ok(())
}
