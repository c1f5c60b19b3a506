//! `wordsplit model`: Build segmentation model artifacts.

use std::path::{Path, PathBuf};

use wordsplit_config::AppConfig;
use wordsplit_core::{Language, Segmenter};
use wordsplit_models::{ModelRegistry, build_unigram_from_counts, parse_word_counts};

pub async fn build(
    language: &str,
    words: &Path,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let language = Language::parse(language)?;

    let output = match output {
        Some(path) => path,
        None => ModelRegistry::from_config(&config)
            .spec(language)
            .map(|spec| spec.path.clone())
            .ok_or_else(|| format!("No model configured for '{language}'"))?,
    };
    let (model, _) = config.model_for(language);

    println!("🔨 Building {language} model '{model}' from {}", words.display());
    let summary = build_artifact(&model, words, &output)?;
    println!("   Words:  {}", summary.words);
    println!("   Vocab:  {} pieces", summary.vocab_size);
    println!("   Probe:  teste → {}", summary.sample.join(" | "));
    println!("✅ Wrote {}", output.display());

    Ok(())
}

#[derive(Debug)]
pub struct BuildSummary {
    pub words: usize,
    pub vocab_size: usize,
    pub sample: Vec<String>,
}

/// Read a word list, build the model, and save it to `output`.
pub fn build_artifact(
    model: &str,
    words: &Path,
    output: &Path,
) -> Result<BuildSummary, Box<dyn std::error::Error>> {
    let input = std::fs::read_to_string(words)
        .map_err(|e| format!("Cannot read {}: {e}", words.display()))?;
    let counts = parse_word_counts(&input)?;
    let words = counts.len();

    let segmenter = build_unigram_from_counts(model, counts)?;
    segmenter.save(output)?;

    Ok(BuildSummary {
        words,
        vocab_size: segmenter.vocab_size(),
        sample: segmenter.tokenize("teste")?,
    })
}
