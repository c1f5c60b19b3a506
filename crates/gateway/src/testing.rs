//! Shared fixtures for the gateway unit tests.

use std::sync::Arc;

use wordsplit_config::AppConfig;
use wordsplit_core::Language;
use wordsplit_models::{TokenizerSegmenter, WordSegmenter};
use wordsplit_security::AuthService;

use crate::api_v1::{ApiV1State, SharedApiState};

fn model(name: &str, words: &[&str]) -> Arc<TokenizerSegmenter> {
    let pieces = words.iter().map(|w| (w.to_string(), -2.0)).collect();
    Arc::new(TokenizerSegmenter::from_vocab(name, pieces).unwrap())
}

/// State with small in-memory models for both languages.
pub fn test_state() -> SharedApiState {
    test_state_with(AppConfig::default(), true)
}

/// State built from `config`. Model artifacts never resolve on disk; with
/// `with_models` the in-memory models are injected instead.
pub fn test_state_with(mut config: AppConfig, with_models: bool) -> SharedApiState {
    config.models.dir = Some("/nonexistent/wordsplit-models".into());
    let segmenter = WordSegmenter::from_config(&config);

    if with_models {
        segmenter.registry().insert(
            Language::Pt,
            model("pt_test", &["minha", "casa", "tem", "sp", "teste"]),
        );
        segmenter.registry().insert(
            Language::En,
            model("en_test", &["my", "house", "usa", "teste"]),
        );
    }

    let auth = AuthService::new(Some("gateway-test-key".into()), 30);
    Arc::new(ApiV1State {
        config,
        segmenter: Arc::new(segmenter),
        auth,
    })
}
