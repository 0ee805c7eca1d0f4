use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::models::CandidateToken;

/// Configuration for Stage 0
#[derive(Debug, Clone)]
pub struct TokenizerConfig {
    /// Tokens this short or shorter (in chars) are never matched
    pub min_token_chars: usize,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self { min_token_chars: 2 }
    }
}

/// Perform Stage 0: split a transcript into candidate name tokens
///
/// Words are split on whitespace, stripped of edge punctuation and
/// lowercased. Words whose normalized length is at or below the floor are
/// dropped so pronouns and articles never reach the matcher.
pub fn tokenize(text: &str, config: &TokenizerConfig) -> Vec<CandidateToken> {
    let tokens: Vec<CandidateToken> = text
        .split_whitespace()
        .enumerate()
        .filter_map(|(position, word)| {
            let surface = trim_edge_punctuation(word);
            let normalized = surface.to_lowercase();
            (normalized.chars().count() > config.min_token_chars).then(|| CandidateToken {
                surface: surface.to_string(),
                normalized,
                position,
            })
        })
        .collect();

    debug!("Tokenized transcript into {} candidates", tokens.len());
    tokens
}

/// Non-word runs at either end of a word, using the same word class as the
/// rewrite's `\b` boundaries
static EDGE_TRIM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\W*(.*?)\W*$").unwrap());

fn trim_edge_punctuation(word: &str) -> &str {
    EDGE_TRIM
        .captures(word)
        .and_then(|caps| caps.get(1))
        .map_or("", |m| m.as_str())
}
