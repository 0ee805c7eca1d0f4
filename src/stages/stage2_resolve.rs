use regex::RegexBuilder;
use tracing::{debug, info};

use crate::models::{MatchResult, PendingSuggestion};

/// Configuration for Stage 2
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Top matches scoring below this are applied without confirmation
    pub confidence_threshold: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.3,
        }
    }
}

/// Outcome of resolving one utterance
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Nothing matched; the transcript is final as captured
    PassThrough { text: String },
    /// The top match was confident enough to apply directly
    AutoApplied { text: String, applied: MatchResult },
    /// The top match needs an explicit accept or reject
    NeedsConfirmation(PendingSuggestion),
}

impl Resolution {
    /// Final text, unless a confirmation is still outstanding
    pub fn final_text(&self) -> Option<&str> {
        match self {
            Resolution::PassThrough { text } | Resolution::AutoApplied { text, .. } => Some(text),
            Resolution::NeedsConfirmation(_) => None,
        }
    }

    pub fn needs_confirmation(&self) -> bool {
        matches!(self, Resolution::NeedsConfirmation(_))
    }
}

/// Perform Stage 2: apply the confidence policy to the ranked matches
///
/// Only the top-ranked match drives substitution. Lower-ranked matches in
/// the same utterance are left untouched.
pub fn resolve(text: &str, ranked: Vec<MatchResult>, config: &ResolverConfig) -> Resolution {
    let Some(top) = ranked.into_iter().next() else {
        debug!("No roster matches, passing transcript through");
        return Resolution::PassThrough {
            text: text.to_string(),
        };
    };

    let updated = rewrite_mention(text, &top);

    if top.score < config.confidence_threshold {
        info!(
            "Stage 2: auto-applied {} for {:?} (score {:.3})",
            top.mention(),
            top.original.surface,
            top.score
        );
        Resolution::AutoApplied {
            text: updated,
            applied: top,
        }
    } else {
        info!(
            "Stage 2: {} for {:?} needs confirmation (score {:.3})",
            top.mention(),
            top.original.surface,
            top.score
        );
        Resolution::NeedsConfirmation(PendingSuggestion {
            original: text.to_string(),
            top_match: top,
            updated,
        })
    }
}

/// Replace every whole-word, case-insensitive occurrence of the matched
/// word with the member's mention token
pub fn rewrite_mention(text: &str, matched: &MatchResult) -> String {
    let surface = matched.original.surface.as_str();
    if surface.is_empty() {
        return text.to_string();
    }

    let pattern = format!(r"\b{}\b", regex::escape(surface));
    let regex = match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(regex) => regex,
        Err(e) => {
            debug!("Could not build rewrite pattern for {:?}: {}", surface, e);
            return text.to_string();
        }
    };

    let mention = matched.mention();
    regex
        .replace_all(text, regex::NoExpand(mention.as_str()))
        .into_owned()
}
