//! # wordsplit core
//!
//! Domain types, traits, and error definitions for the wordsplit
//! segmentation service. This crate has **no framework dependencies**:
//! it defines the vocabulary every other crate implements against.
//!
//! ## Design
//!
//! The heavy lifting (turning a run-on string into word pieces) sits behind
//! the [`Segmenter`] trait so a pretrained tokenizer model can be swapped for
//! a stub in tests. The formatting rules that run on top of it live in
//! [`format`] and are pure functions.

pub mod error;
pub mod format;
pub mod language;
pub mod secrets;
pub mod segmenter;

// Re-export key types at crate root for ergonomics
pub use error::{SecretError, SegmentError};
pub use format::{AcronymSet, capitalize, format_tokens, is_alpha, render_token, segment_and_format};
pub use language::Language;
pub use secrets::SecretStore;
pub use segmenter::Segmenter;
