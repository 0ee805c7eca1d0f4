use serde::{Deserialize, Serialize};

use super::TeamMember;

/// A transcript word considered for name matching
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateToken {
    /// The word as it appears in the transcript, edge punctuation removed
    pub surface: String,
    /// Lowercase form used for matching
    pub normalized: String,
    /// Ordinal position among the transcript's whitespace-separated words
    pub position: usize,
}

/// Best roster match for one candidate token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// The candidate that produced this match
    pub original: CandidateToken,
    /// The roster entry it matched
    pub matched_member: TeamMember,
    /// Distance-like score: 0 is exact, higher is worse
    pub score: f64,
}

impl MatchResult {
    /// Mention token that replaces the candidate on rewrite
    pub fn mention(&self) -> String {
        self.matched_member.mention()
    }
}

/// Sort matches best-first, keeping scan order among equal scores
pub fn rank_matches(matches: &mut [MatchResult]) {
    matches.sort_by(|a, b| a.score.total_cmp(&b.score));
}
