//! Model registry: selects and lazily loads the model for each language.
//!
//! Handles artifact path resolution, load-once caching, and injection of
//! prebuilt segmenters. Failed loads are not cached: a request after the
//! artifact shows up on disk will succeed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Instant;

use tracing::{info, warn};
use wordsplit_config::AppConfig;
use wordsplit_core::{Language, SegmentError, Segmenter};

use crate::tokenizer::TokenizerSegmenter;

/// Where the model for one language lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub language: Language,
    pub model: String,
    pub path: PathBuf,
}

impl ModelSpec {
    /// Resolve the artifact path for a model.
    ///
    /// An explicit path wins. Otherwise a model name ending in `.json` is
    /// taken as a file inside `models_dir`, and anything else as a
    /// directory holding `tokenizer.json`.
    pub fn resolve(
        language: Language,
        model: impl Into<String>,
        explicit: Option<PathBuf>,
        models_dir: &Path,
    ) -> Self {
        let model = model.into();
        let path = match explicit {
            Some(path) => path,
            None if model.ends_with(".json") => models_dir.join(&model),
            None => models_dir.join(&model).join("tokenizer.json"),
        };
        Self {
            language,
            model,
            path,
        }
    }

    fn not_found(&self) -> SegmentError {
        SegmentError::ModelNotFound {
            language: self.language.code().to_string(),
            model: self.model.clone(),
            path: self.path.display().to_string(),
        }
    }
}

/// Per-language model cache.
pub struct ModelRegistry {
    specs: HashMap<Language, ModelSpec>,
    loaded: RwLock<HashMap<Language, Arc<dyn Segmenter>>>,
}

impl ModelRegistry {
    pub fn new(specs: impl IntoIterator<Item = ModelSpec>) -> Self {
        Self {
            specs: specs.into_iter().map(|s| (s.language, s)).collect(),
            loaded: RwLock::new(HashMap::new()),
        }
    }

    /// Build the registry for every supported language from configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        let models_dir = config.models_dir();
        Self::new(Language::ALL.into_iter().map(|language| {
            let (model, path) = config.model_for(language);
            ModelSpec::resolve(language, model, path, &models_dir)
        }))
    }

    pub fn spec(&self, language: Language) -> Option<&ModelSpec> {
        self.specs.get(&language)
    }

    /// All configured specs, ordered by language.
    pub fn specs(&self) -> Vec<&ModelSpec> {
        let mut specs: Vec<&ModelSpec> = self.specs.values().collect();
        specs.sort_by_key(|s| s.language);
        specs
    }

    /// Register a ready-made segmenter, replacing anything cached.
    pub fn insert(&self, language: Language, segmenter: Arc<dyn Segmenter>) {
        let mut loaded = self.loaded.write().unwrap_or_else(|e| e.into_inner());
        loaded.insert(language, segmenter);
    }

    pub fn is_loaded(&self, language: Language) -> bool {
        let loaded = self.loaded.read().unwrap_or_else(|e| e.into_inner());
        loaded.contains_key(&language)
    }

    /// Get the segmenter for a language, loading it on first use.
    pub fn get(&self, language: Language) -> Result<Arc<dyn Segmenter>, SegmentError> {
        {
            let loaded = self.loaded.read().unwrap_or_else(|e| e.into_inner());
            if let Some(segmenter) = loaded.get(&language) {
                return Ok(segmenter.clone());
            }
        }

        let spec = self
            .specs
            .get(&language)
            .ok_or_else(|| SegmentError::ModelNotFound {
                language: language.code().to_string(),
                model: language.default_model().to_string(),
                path: "<not configured>".into(),
            })?;

        // Load without holding the lock; parsing a large artifact can take a while.
        let segmenter = load_spec(spec)?;

        let mut loaded = self.loaded.write().unwrap_or_else(|e| e.into_inner());
        // Another request may have finished loading first; keep that one.
        let segmenter = loaded.entry(language).or_insert(segmenter).clone();
        Ok(segmenter)
    }

    /// Load every configured language now. Stops at the first failure.
    pub fn preload(&self) -> Result<(), SegmentError> {
        for spec in self.specs() {
            self.get(spec.language)?;
        }
        Ok(())
    }
}

fn load_spec(spec: &ModelSpec) -> Result<Arc<dyn Segmenter>, SegmentError> {
    if !spec.path.is_file() {
        warn!(
            language = %spec.language,
            model = %spec.model,
            path = %spec.path.display(),
            "Model artifact not found"
        );
        return Err(spec.not_found());
    }

    let started = Instant::now();
    let segmenter = TokenizerSegmenter::from_file(&spec.model, &spec.path)?;
    info!(
        language = %spec.language,
        model = %spec.model,
        vocab_size = segmenter.vocab_size(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Segmentation model loaded"
    );
    Ok(Arc::new(segmenter))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSegmenter(&'static str);

    impl Segmenter for FixedSegmenter {
        fn name(&self) -> &str {
            self.0
        }

        fn tokenize(&self, text: &str) -> Result<Vec<String>, SegmentError> {
            Ok(vec![text.to_string()])
        }
    }

    fn write_model(dir: &Path, model: &str) -> PathBuf {
        let path = dir.join(model).join("tokenizer.json");
        TokenizerSegmenter::from_vocab(model, vec![("casa".into(), -1.0)])
            .unwrap()
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn resolve_paths() {
        let dir = Path::new("/models");
        let spec = ModelSpec::resolve(Language::Pt, "pt_core_news_sm", None, dir);
        assert_eq!(spec.path, PathBuf::from("/models/pt_core_news_sm/tokenizer.json"));

        let spec = ModelSpec::resolve(Language::En, "en.json", None, dir);
        assert_eq!(spec.path, PathBuf::from("/models/en.json"));

        let spec = ModelSpec::resolve(
            Language::En,
            "en_core_web_sm",
            Some(PathBuf::from("/elsewhere/en.json")),
            dir,
        );
        assert_eq!(spec.path, PathBuf::from("/elsewhere/en.json"));
    }

    #[test]
    fn from_config_covers_every_language() {
        let mut config = AppConfig::default();
        config.models.dir = Some("/srv/models".into());
        let registry = ModelRegistry::from_config(&config);
        let specs = registry.specs();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].language, Language::Pt);
        assert_eq!(
            specs[0].path,
            PathBuf::from("/srv/models/pt_core_news_sm/tokenizer.json")
        );
        assert_eq!(specs[1].model, "en_core_web_sm");
    }

    #[test]
    fn missing_artifact_is_model_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ModelRegistry::new([ModelSpec::resolve(
            Language::Pt,
            "pt_core_news_sm",
            None,
            dir.path(),
        )]);

        let err = registry.get(Language::Pt).err().unwrap();
        assert!(matches!(err, SegmentError::ModelNotFound { .. }));
        assert!(err.to_string().contains("pt_core_news_sm"));
        assert!(!registry.is_loaded(Language::Pt));
    }

    #[test]
    fn unconfigured_language_is_model_not_found() {
        let registry = ModelRegistry::new(Vec::<ModelSpec>::new());
        let err = registry.get(Language::En).err().unwrap();
        assert!(matches!(err, SegmentError::ModelNotFound { .. }));
    }

    #[test]
    fn loads_lazily_and_caches() {
        let dir = tempfile::tempdir().unwrap();
        write_model(dir.path(), "pt_core_news_sm");
        let registry = ModelRegistry::new([ModelSpec::resolve(
            Language::Pt,
            "pt_core_news_sm",
            None,
            dir.path(),
        )]);

        assert!(!registry.is_loaded(Language::Pt));
        let first = registry.get(Language::Pt).unwrap();
        assert!(registry.is_loaded(Language::Pt));
        let second = registry.get(Language::Pt).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.name(), "pt_core_news_sm");
    }

    #[test]
    fn failed_load_is_retried_once_artifact_appears() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ModelRegistry::new([ModelSpec::resolve(
            Language::En,
            "en_core_web_sm",
            None,
            dir.path(),
        )]);

        assert!(registry.get(Language::En).is_err());
        write_model(dir.path(), "en_core_web_sm");
        assert!(registry.get(Language::En).is_ok());
    }

    #[test]
    fn inserted_segmenter_wins() {
        let registry = ModelRegistry::new(Vec::<ModelSpec>::new());
        registry.insert(Language::Pt, Arc::new(FixedSegmenter("fixed")));
        assert!(registry.is_loaded(Language::Pt));
        assert_eq!(registry.get(Language::Pt).unwrap().name(), "fixed");
    }

    #[test]
    fn preload_reports_first_missing_model() {
        let dir = tempfile::tempdir().unwrap();
        write_model(dir.path(), "pt_core_news_sm");
        let registry = ModelRegistry::new(Language::ALL.into_iter().map(|lang| {
            ModelSpec::resolve(lang, lang.default_model(), None, dir.path())
        }));

        let err = registry.preload().unwrap_err();
        assert!(err.to_string().contains("en_core_web_sm"));
        assert!(registry.is_loaded(Language::Pt));
    }
}
