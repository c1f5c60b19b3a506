//! Segmenter trait: the abstraction over pretrained tokenizer models.
//!
//! A Segmenter takes a lower-cased run-on string and returns the pieces the
//! underlying model recognizes, in order. It does not filter or format
//! anything; that is the job of [`crate::format`].
//!
//! Implementations: `wordsplit_models::TokenizerSegmenter` (HuggingFace
//! `tokenizers` artifacts) and test stubs.

use crate::error::SegmentError;

pub trait Segmenter: Send + Sync {
    /// A short identifier for logs and status output (usually the model name).
    fn name(&self) -> &str;

    /// Split `text` into the model's tokens.
    fn tokenize(&self, text: &str) -> Result<Vec<String>, SegmentError>;
}
