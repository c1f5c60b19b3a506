//! Build a segmentation model from a word-frequency list.
//!
//! Input is plain text, one `word [count]` entry per line. Blank lines and
//! lines starting with `#` are ignored, and a missing count means 1. Each
//! word becomes a Unigram piece scored `ln(count / total)`.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::info;
use wordsplit_core::SegmentError;

use crate::tokenizer::TokenizerSegmenter;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("word list has no usable entries")]
    EmptyVocabulary,

    #[error("word counts overflow at '{word}'")]
    CountOverflow { word: String },

    #[error(transparent)]
    Model(#[from] SegmentError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Parse a `word [count]` list.
pub fn parse_word_counts(input: &str) -> Result<Vec<(String, u64)>, BuildError> {
    let mut counts = Vec::new();

    for (idx, raw) in input.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line.split_whitespace();
        let Some(word) = fields.next() else { continue };
        let count = match fields.next() {
            Some(value) => value.parse::<u64>().map_err(|_| BuildError::Parse {
                line: idx + 1,
                reason: format!("invalid count '{value}' for '{word}'"),
            })?,
            None => 1,
        };
        if let Some(extra) = fields.next() {
            return Err(BuildError::Parse {
                line: idx + 1,
                reason: format!("unexpected field '{extra}'"),
            });
        }

        counts.push((word.to_string(), count));
    }

    Ok(counts)
}

/// Build a Unigram segmenter from word counts.
///
/// Words are lower-cased and duplicates summed; zero counts are dropped.
pub fn build_unigram_from_counts(
    name: &str,
    counts: impl IntoIterator<Item = (String, u64)>,
) -> Result<TokenizerSegmenter, BuildError> {
    let mut merged: BTreeMap<String, u64> = BTreeMap::new();
    for (word, count) in counts {
        if count == 0 {
            continue;
        }
        let word = word.to_lowercase();
        let entry = merged.entry(word.clone()).or_default();
        *entry = entry
            .checked_add(count)
            .ok_or(BuildError::CountOverflow { word })?;
    }
    if merged.is_empty() {
        return Err(BuildError::EmptyVocabulary);
    }

    let mut total: u64 = 0;
    for (word, count) in &merged {
        total = total
            .checked_add(*count)
            .ok_or_else(|| BuildError::CountOverflow { word: word.clone() })?;
    }
    let total = total as f64;
    let pieces: Vec<(String, f64)> = merged
        .into_iter()
        .map(|(word, count)| (word, (count as f64 / total).ln()))
        .collect();

    let words = pieces.len();
    let segmenter = TokenizerSegmenter::from_vocab(name, pieces)?;
    info!(model = name, words, "Unigram model built");
    Ok(segmenter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wordsplit_core::Segmenter;

    #[test]
    fn parses_counts_comments_and_defaults() {
        let input = "# frequencies\nminha 50\n\ncasa 80\n  tem\t100 \nsp\n";
        let counts = parse_word_counts(input).unwrap();
        assert_eq!(
            counts,
            vec![
                ("minha".to_string(), 50),
                ("casa".to_string(), 80),
                ("tem".to_string(), 100),
                ("sp".to_string(), 1),
            ]
        );
    }

    #[test]
    fn bad_count_names_the_line() {
        let err = parse_word_counts("casa 10\nazul muitos\n").unwrap_err();
        match err {
            BuildError::Parse { line, reason } => {
                assert_eq!(line, 2);
                assert!(reason.contains("muitos"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn extra_fields_rejected() {
        assert!(matches!(
            parse_word_counts("casa 1 2"),
            Err(BuildError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn empty_vocabulary_rejected() {
        assert!(matches!(
            build_unigram_from_counts("empty", Vec::new()),
            Err(BuildError::EmptyVocabulary)
        ));
        assert!(matches!(
            build_unigram_from_counts("zeros", vec![("casa".to_string(), 0)]),
            Err(BuildError::EmptyVocabulary)
        ));
    }

    #[test]
    fn overflowing_counts_rejected() {
        let counts = parse_word_counts("casa 18446744073709551615\nazul 1\n").unwrap();
        let err = build_unigram_from_counts("big", counts).err().unwrap();
        assert!(matches!(err, BuildError::CountOverflow { .. }));

        let dupes = vec![("Casa".to_string(), u64::MAX), ("casa".to_string(), 1)];
        match build_unigram_from_counts("big", dupes).err().unwrap() {
            BuildError::CountOverflow { word } => assert_eq!(word, "casa"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn largest_count_alone_is_accepted() {
        let model =
            build_unigram_from_counts("big", vec![("casa".to_string(), u64::MAX)]).unwrap();
        assert_eq!(model.tokenize("casa").unwrap(), vec!["casa"]);
    }

    #[test]
    fn duplicates_merge_case_insensitively() {
        let model = build_unigram_from_counts(
            "pt",
            vec![("Casa".to_string(), 3), ("casa".to_string(), 2), ("sp".to_string(), 1)],
        )
        .unwrap();
        // <unk>, casa, sp
        assert_eq!(model.vocab_size(), 3);
    }

    #[test]
    fn built_model_segments_by_frequency() {
        let counts = parse_word_counts(
            "minha 50\ncasa 80\ntem 100\nsp 20\na 300\nem 150\nas 100\n",
        )
        .unwrap();
        let model = build_unigram_from_counts("pt_freq", counts).unwrap();
        assert_eq!(
            model.tokenize("minhacasatemsp").unwrap(),
            vec!["minha", "casa", "tem", "sp"]
        );
    }
}
