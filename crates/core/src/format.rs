//! Token formatting: acronym-aware capitalization.
//!
//! The pipeline:
//!
//! 1. lower-case the input
//! 2. hand it to a [`Segmenter`]
//! 3. keep only purely alphabetic tokens
//! 4. uppercase acronyms, capitalize everything else
//! 5. concatenate with no separator
//!
//! `"minhacasatemsp"` therefore becomes `"MinhaCasaTemSP"` when the model
//! splits it into `minha | casa | tem | sp`.

use std::collections::HashSet;

use crate::error::SegmentError;
use crate::segmenter::Segmenter;

/// A set of words rendered fully uppercase. Stored lower-cased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcronymSet {
    words: HashSet<String>,
}

impl AcronymSet {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Sorted view, for stable display.
    pub fn sorted(&self) -> Vec<&str> {
        let mut words: Vec<&str> = self.words.iter().map(String::as_str).collect();
        words.sort_unstable();
        words
    }
}

/// True when the token is non-empty and made only of alphabetic characters.
pub fn is_alpha(token: &str) -> bool {
    !token.is_empty() && token.chars().all(char::is_alphabetic)
}

/// First character uppercased, the rest lowercased.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Render a single token: uppercase if it is an acronym, capitalized otherwise.
pub fn render_token(token: &str, acronyms: &AcronymSet) -> String {
    if acronyms.contains(token) {
        token.to_uppercase()
    } else {
        capitalize(token)
    }
}

/// Drop non-alphabetic tokens, render the rest, and join them.
pub fn format_tokens<I, S>(tokens: I, acronyms: &AcronymSet) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tokens
        .into_iter()
        .filter(|t| is_alpha(t.as_ref()))
        .map(|t| render_token(t.as_ref(), acronyms))
        .collect()
}

/// Run the full pipeline for one string.
///
/// Empty (or whitespace-only) input short-circuits without touching the model.
pub fn segment_and_format(
    segmenter: &dyn Segmenter,
    text: &str,
    acronyms: &AcronymSet,
) -> Result<String, SegmentError> {
    let lowered = text.to_lowercase();
    if lowered.trim().is_empty() {
        return Ok(String::new());
    }

    let tokens = segmenter.tokenize(&lowered)?;
    tracing::trace!(segmenter = segmenter.name(), tokens = ?tokens, "Tokenized input");
    Ok(format_tokens(tokens, acronyms))
}
