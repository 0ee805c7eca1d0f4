use tracing::info;

use crate::fuzzy::MatcherConfig;
use crate::models::Roster;
use crate::stages::{
    match_candidates, resolve, tokenize, Resolution, ResolverConfig, TokenizerConfig,
};

/// Configuration for all stages
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub tokenizer: TokenizerConfig,
    pub matcher: MatcherConfig,
    pub resolver: ResolverConfig,
}

/// Run stages 0-2 over one finalized transcript
///
/// The roster and transcript are only read. Empty transcripts, empty
/// rosters and unmatched text all pass through unchanged.
pub fn process_transcript(text: &str, roster: &Roster, config: &PipelineConfig) -> Resolution {
    let candidates = tokenize(text, &config.tokenizer);
    let ranked = match_candidates(&candidates, roster, &config.matcher);
    let resolution = resolve(text, ranked, &config.resolver);

    info!(
        "Processed transcript: {} candidates, confirmation needed: {}",
        candidates.len(),
        resolution.needs_confirmation()
    );

    resolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TeamMember;

    #[test]
    fn test_empty_roster_is_identity() {
        let config = PipelineConfig::default();
        for text in ["", "   ", "tell joseph to frame the bathroom", "Joseph, call me"] {
            let resolution = process_transcript(text, &Roster::default(), &config);
            assert_eq!(resolution.final_text(), Some(text));
        }
    }

    #[test]
    fn test_strict_confidence_threshold_forces_confirmation() {
        let roster = Roster::new(vec![TeamMember::new("joseph", "Joseph Smith")]);
        let config = PipelineConfig {
            resolver: ResolverConfig {
                confidence_threshold: 0.0,
            },
            ..Default::default()
        };
        let resolution = process_transcript("tell joseph", &roster, &config);
        assert!(resolution.needs_confirmation());
    }
}
