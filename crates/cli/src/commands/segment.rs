//! `wordsplit segment`: One-shot segmentation from the command line.

use wordsplit_config::AppConfig;
use wordsplit_models::WordSegmenter;

pub async fn run(text: &str, language: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let segmenter = WordSegmenter::from_config(&config);

    let formatted = segmenter.segment_and_format(text, language)?;
    println!("{formatted}");

    Ok(())
}
