//! The word segmentation service.
//!
//! Ties the model registry to the per-language acronym lists and exposes the
//! two operations the HTTP layer needs: segment-and-format, and a status
//! probe.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;
use wordsplit_config::AppConfig;
use wordsplit_core::{AcronymSet, Language, SegmentError, segment_and_format};

use crate::registry::ModelRegistry;

/// Word used to check that a model is loaded and answers.
const PROBE_TEXT: &str = "teste";

/// Health of a single language model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelState {
    pub model: String,
    pub path: String,
    pub loaded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of [`WordSegmenter::check_status`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub service: String,
    pub status: String,
    pub model_loaded: bool,
    pub models: BTreeMap<String, ModelState>,
}

impl ServiceStatus {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}

pub struct WordSegmenter {
    registry: Arc<ModelRegistry>,
    acronyms: HashMap<Language, AcronymSet>,
}

impl WordSegmenter {
    /// Create a service with the built-in acronym lists.
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        let acronyms = Language::ALL
            .into_iter()
            .map(|lang| (lang, AcronymSet::new(lang.default_acronyms())))
            .collect();
        Self { registry, acronyms }
    }

    /// Create a service whose registry and acronym lists come from config.
    pub fn from_config(config: &AppConfig) -> Self {
        let registry = Arc::new(ModelRegistry::from_config(config));
        let acronyms = Language::ALL
            .into_iter()
            .map(|lang| (lang, AcronymSet::new(config.acronyms_for(lang))))
            .collect();
        Self { registry, acronyms }
    }

    pub fn with_acronyms(mut self, language: Language, acronyms: AcronymSet) -> Self {
        self.acronyms.insert(language, acronyms);
        self
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    pub fn acronyms(&self, language: Language) -> Option<&AcronymSet> {
        self.acronyms.get(&language)
    }

    /// Segment a run-on string and render it with acronym-aware capitalization.
    ///
    /// The language code is validated before anything else, so an unsupported
    /// language fails even for empty text. Empty text never loads a model.
    pub fn segment_and_format(&self, text: &str, language: &str) -> Result<String, SegmentError> {
        let language = Language::parse(language)?;
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let segmenter = self.registry.get(language)?;
        let empty = AcronymSet::default();
        let acronyms = self.acronyms.get(&language).unwrap_or(&empty);
        let formatted = segment_and_format(segmenter.as_ref(), text, acronyms)?;

        debug!(
            language = %language,
            model = segmenter.name(),
            input_len = text.len(),
            output_len = formatted.len(),
            "Text segmented"
        );
        Ok(formatted)
    }

    /// Probe every configured model with a short word.
    pub fn check_status(&self) -> ServiceStatus {
        let mut models = BTreeMap::new();

        for spec in self.registry.specs() {
            let outcome = self
                .registry
                .get(spec.language)
                .and_then(|segmenter| segmenter.tokenize(PROBE_TEXT));

            models.insert(
                spec.language.code().to_string(),
                ModelState {
                    model: spec.model.clone(),
                    path: spec.path.display().to_string(),
                    loaded: outcome.is_ok(),
                    error: outcome.err().map(|e| e.to_string()),
                },
            );
        }

        let model_loaded = !models.is_empty() && models.values().all(|m| m.loaded);
        ServiceStatus {
            service: "word_segmentation".into(),
            status: if model_loaded { "active" } else { "error" }.into(),
            model_loaded,
            models,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ModelSpec;
    use crate::tokenizer::TokenizerSegmenter;
    use std::path::Path;

    fn vocab(words: &[&str]) -> Vec<(String, f64)> {
        words.iter().map(|w| (w.to_string(), -2.0)).collect()
    }

    /// Registry pointing at an empty directory, with models injected.
    fn service_with_models() -> WordSegmenter {
        let registry = ModelRegistry::new(Language::ALL.into_iter().map(|lang| {
            ModelSpec::resolve(lang, lang.default_model(), None, Path::new("/nonexistent"))
        }));
        registry.insert(
            Language::Pt,
            Arc::new(
                TokenizerSegmenter::from_vocab(
                    "pt_test",
                    vocab(&[
                        "minha", "casa", "tem", "sp", "ti", "mg", "pi", "pr", "azul", "teste",
                    ]),
                )
                .unwrap(),
            ),
        );
        registry.insert(
            Language::En,
            Arc::new(
                TokenizerSegmenter::from_vocab(
                    "en_test",
                    vocab(&["house", "usa", "uk", "ai", "it", "hr", "teste"]),
                )
                .unwrap(),
            ),
        );
        WordSegmenter::new(Arc::new(registry))
    }

    #[test]
    fn segments_portuguese() {
        let service = service_with_models();
        let out = service.segment_and_format("minhacasatemsp", "pt").unwrap();
        assert_eq!(out, "MinhaCasaTemSP");
    }

    #[test]
    fn segments_english() {
        let service = service_with_models();
        assert_eq!(service.segment_and_format("house", "en").unwrap(), "House");
    }

    #[test]
    fn preserves_portuguese_acronyms() {
        let service = service_with_models();
        for (input, expected) in [("sp", "SP"), ("ti", "TI"), ("mg", "MG"), ("pi", "PI"), ("pr", "PR")] {
            let out = service.segment_and_format(input, "pt").unwrap();
            assert!(out.contains(expected), "{input} -> {out}");
        }
    }

    #[test]
    fn preserves_english_acronyms() {
        let service = service_with_models();
        for (input, expected) in [("usa", "USA"), ("uk", "UK"), ("ai", "AI"), ("it", "IT"), ("hr", "HR")] {
            let out = service.segment_and_format(input, "en").unwrap();
            assert!(out.contains(expected), "{input} -> {out}");
        }
    }

    #[test]
    fn acronyms_are_language_specific() {
        let service = service_with_models();
        // "it" is an acronym in English only.
        assert_eq!(service.segment_and_format("casa", "pt").unwrap(), "Casa");
        assert_eq!(service.segment_and_format("it", "en").unwrap(), "IT");
    }

    #[test]
    fn special_characters_are_filtered() {
        let service = service_with_models();
        for text in ["casa123", "casa!@#", "casa-azul", "casa_azul"] {
            let out = service.segment_and_format(text, "pt").unwrap();
            assert!(out.chars().all(char::is_alphabetic), "{text} -> {out}");
            assert!(out.starts_with("Casa"), "{text} -> {out}");
        }
    }

    #[test]
    fn empty_string_returns_empty() {
        let service = service_with_models();
        assert_eq!(service.segment_and_format("", "pt").unwrap(), "");
    }

    #[test]
    fn invalid_language_rejected() {
        let service = service_with_models();
        let err = service.segment_and_format("test", "fr").unwrap_err();
        assert!(err.to_string().contains("não suportado"));

        // Language is checked before the empty-text shortcut.
        assert!(service.segment_and_format("", "fr").is_err());
    }

    #[test]
    fn missing_model_is_reported() {
        let registry = ModelRegistry::new([ModelSpec::resolve(
            Language::Pt,
            "pt_core_news_sm",
            None,
            Path::new("/nonexistent"),
        )]);
        let service = WordSegmenter::new(Arc::new(registry));
        let err = service.segment_and_format("casa", "pt").unwrap_err();
        assert!(matches!(err, SegmentError::ModelNotFound { .. }));
    }

    #[test]
    fn custom_acronyms_override_defaults() {
        let service =
            service_with_models().with_acronyms(Language::Pt, AcronymSet::new(["casa"]));
        assert_eq!(service.segment_and_format("casasp", "pt").unwrap(), "CASASp");
    }

    #[test]
    fn from_config_uses_acronym_overrides() {
        let mut config = AppConfig::default();
        config.acronyms.insert("en".into(), vec!["nasa".into()]);
        let service = WordSegmenter::from_config(&config);
        assert!(service.acronyms(Language::En).unwrap().contains("nasa"));
        assert!(!service.acronyms(Language::En).unwrap().contains("usa"));
        assert!(service.acronyms(Language::Pt).unwrap().contains("sp"));
    }

    #[test]
    fn status_active_when_all_models_answer() {
        let status = service_with_models().check_status();
        assert_eq!(status.service, "word_segmentation");
        assert!(status.is_active());
        assert!(status.model_loaded);
        assert_eq!(status.models.len(), 2);
        assert!(status.models["pt"].error.is_none());
    }

    #[test]
    fn status_error_when_a_model_is_missing() {
        let registry = ModelRegistry::new(Language::ALL.into_iter().map(|lang| {
            ModelSpec::resolve(lang, lang.default_model(), None, Path::new("/nonexistent"))
        }));
        registry.insert(
            Language::Pt,
            Arc::new(TokenizerSegmenter::from_vocab("pt_test", vocab(&["teste"])).unwrap()),
        );
        let status = WordSegmenter::new(Arc::new(registry)).check_status();

        assert_eq!(status.status, "error");
        assert!(!status.model_loaded);
        assert!(status.models["pt"].loaded);
        assert!(!status.models["en"].loaded);
        assert!(status.models["en"].error.as_deref().unwrap().contains("en_core_web_sm"));
    }
}
