//! `tokenizers`-backed segmenter.
//!
//! A model artifact is a HuggingFace `tokenizer.json`. The service does not
//! care which model family is inside as long as encoding a run-on string
//! yields word pieces; in practice a Unigram model over a word-frequency
//! vocabulary with a `Whitespace` pre-tokenizer is what [`crate::builder`]
//! produces.

use std::path::Path;
use std::str::FromStr;

use tokenizers::Tokenizer;
use tracing::debug;
use wordsplit_core::{SegmentError, Segmenter};

/// Token string reserved for unknown characters.
pub const UNK_TOKEN: &str = "<unk>";

/// A [`Segmenter`] that delegates to a pretrained `tokenizers` model.
pub struct TokenizerSegmenter {
    name: String,
    tokenizer: Tokenizer,
}

impl std::fmt::Debug for TokenizerSegmenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenizerSegmenter")
            .field("name", &self.name)
            .field("vocab_size", &self.vocab_size())
            .finish()
    }
}

impl TokenizerSegmenter {
    /// Wrap an already-built tokenizer.
    pub fn new(name: impl Into<String>, tokenizer: Tokenizer) -> Self {
        Self {
            name: name.into(),
            tokenizer,
        }
    }

    /// Load a `tokenizer.json` artifact from disk.
    pub fn from_file(name: impl Into<String>, path: &Path) -> Result<Self, SegmentError> {
        let name = name.into();
        let tokenizer = Tokenizer::from_file(path).map_err(|e| SegmentError::ModelLoad {
            model: name.clone(),
            reason: e.to_string(),
        })?;
        debug!(model = %name, path = %path.display(), "Tokenizer artifact parsed");
        Ok(Self::new(name, tokenizer))
    }

    /// Build an in-memory Unigram model from `(piece, log-probability)` pairs.
    ///
    /// The unknown token is prepended when the vocabulary does not already
    /// contain it, so the model never fails on characters it has not seen.
    pub fn from_vocab(
        name: impl Into<String>,
        pieces: Vec<(String, f64)>,
    ) -> Result<Self, SegmentError> {
        let name = name.into();
        let mut vocab = Vec::with_capacity(pieces.len() + 1);
        if !pieces.iter().any(|(p, _)| p == UNK_TOKEN) {
            vocab.push((UNK_TOKEN.to_string(), 0.0));
        }
        vocab.extend(pieces);
        let unk_id = vocab
            .iter()
            .position(|(p, _)| p == UNK_TOKEN)
            .unwrap_or_default();

        let spec = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [],
            "normalizer": null,
            "pre_tokenizer": { "type": "Whitespace" },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "Unigram",
                "unk_id": unk_id,
                "vocab": vocab,
                "byte_fallback": false,
            },
        });

        let tokenizer =
            Tokenizer::from_str(&spec.to_string()).map_err(|e| SegmentError::ModelLoad {
                model: name.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self::new(name, tokenizer))
    }

    /// Write the model as a `tokenizer.json`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), SegmentError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SegmentError::ModelLoad {
                model: self.name.clone(),
                reason: format!("cannot create {}: {e}", parent.display()),
            })?;
        }
        self.tokenizer
            .save(path, true)
            .map_err(|e| SegmentError::ModelLoad {
                model: self.name.clone(),
                reason: format!("cannot write {}: {e}", path.display()),
            })
    }

    /// Number of pieces in the model vocabulary.
    pub fn vocab_size(&self) -> usize {
        self.tokenizer.get_vocab_size(true)
    }
}

impl Segmenter for TokenizerSegmenter {
    fn name(&self) -> &str {
        &self.name
    }

    fn tokenize(&self, text: &str) -> Result<Vec<String>, SegmentError> {
        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| SegmentError::Tokenization(e.to_string()))?;
        Ok(encoding.get_tokens().to_vec())
    }
}
