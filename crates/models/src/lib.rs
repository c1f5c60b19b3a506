//! Segmentation models for wordsplit.
//!
//! Models are HuggingFace `tokenizers` artifacts loaded lazily per language
//! by the [`ModelRegistry`]. [`WordSegmenter`] combines a registry with the
//! acronym lists and is what the gateway calls.

pub mod builder;
pub mod registry;
pub mod service;
pub mod tokenizer;

pub use builder::{BuildError, build_unigram_from_counts, parse_word_counts};
pub use registry::{ModelRegistry, ModelSpec};
pub use service::{ModelState, ServiceStatus, WordSegmenter};
pub use tokenizer::{TokenizerSegmenter, UNK_TOKEN};
