use tracing::{debug, info};

use crate::fuzzy::{score_field, MatcherConfig};
use crate::models::{rank_matches, CandidateToken, MatchResult, Roster, TeamMember};

/// Perform Stage 1: fuzzy-match candidates against the roster
///
/// Each candidate keeps at most its single best roster entry. Candidates
/// without an acceptable match are dropped. The result is ranked best
/// first; equal scores keep transcript order.
pub fn match_candidates(
    candidates: &[CandidateToken],
    roster: &Roster,
    config: &MatcherConfig,
) -> Vec<MatchResult> {
    if roster.is_empty() {
        debug!("Empty roster, skipping matching");
        return Vec::new();
    }

    let members: Vec<&TeamMember> = roster.well_formed().collect();
    let skipped = roster.len() - members.len();
    if skipped > 0 {
        debug!("Skipping {} malformed roster entries", skipped);
    }

    let mut matches: Vec<MatchResult> = candidates
        .iter()
        .filter_map(|candidate| best_member(candidate, &members, config))
        .collect();

    rank_matches(&mut matches);

    info!(
        "Stage 1: {} of {} candidates matched {} roster members",
        matches.len(),
        candidates.len(),
        members.len()
    );

    matches
}

/// Best-scoring member for one candidate; earlier members win ties
fn best_member(
    candidate: &CandidateToken,
    members: &[&TeamMember],
    config: &MatcherConfig,
) -> Option<MatchResult> {
    let mut best: Option<(f64, &TeamMember)> = None;

    for &member in members {
        let Some(score) = member_score(&candidate.normalized, member, config) else {
            continue;
        };
        if best.is_none_or(|(s, _)| score < s) {
            best = Some((score, member));
        }
    }

    best.map(|(score, member)| {
        debug!(
            "Candidate {:?} matched {} ({:.3})",
            candidate.normalized, member.id, score
        );
        MatchResult {
            original: candidate.clone(),
            matched_member: member.clone(),
            score,
        }
    })
}

/// Best score over the member's name and id
fn member_score(pattern: &str, member: &TeamMember, config: &MatcherConfig) -> Option<f64> {
    [member.name.as_str(), member.id.as_str()]
        .into_iter()
        .filter_map(|field| score_field(pattern, field, config))
        .map(|m| m.score)
        .reduce(f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::{tokenize, TokenizerConfig};

    fn run(text: &str, roster: &Roster) -> Vec<MatchResult> {
        let tokens = tokenize(text, &TokenizerConfig::default());
        match_candidates(&tokens, roster, &MatcherConfig::default())
    }

    fn joseph_roster() -> Roster {
        Roster::new(vec![TeamMember::new("joseph", "Joseph Smith")])
    }

    #[test]
    fn test_empty_roster_short_circuits() {
        assert!(run("tell joseph to frame the bathroom", &Roster::default()).is_empty());
    }

    #[test]
    fn test_exact_match() {
        let matches = run("tell joseph to frame the bathroom", &joseph_roster());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].original.normalized, "joseph");
        assert_eq!(matches[0].matched_member.id, "joseph");
        assert_eq!(matches[0].score, 0.0);
    }

    #[test]
    fn test_fuzzy_match_is_low_confidence() {
        let matches = run("call jasef about the tile", &joseph_roster());
        assert_eq!(matches.len(), 1);
        assert!(matches[0].score >= 0.3 && matches[0].score <= 0.4);
    }

    #[test]
    fn test_no_match_drops_candidates() {
        assert!(run("check on the plumbing", &joseph_roster()).is_empty());
    }

    #[test]
    fn test_ranked_best_first() {
        let roster = Roster::new(vec![
            TeamMember::new("joseph", "Joseph Smith"),
            TeamMember::new("maria", "Maria Lopez"),
        ]);
        let matches = run("jasef and maria", &roster);
        let ids: Vec<&str> = matches.iter().map(|m| m.matched_member.id.as_str()).collect();
        assert_eq!(ids, vec!["maria", "joseph"]);
    }

    #[test]
    fn test_roster_order_breaks_ties() {
        let roster = Roster::new(vec![
            TeamMember::new("dan1", "Dan Brown"),
            TeamMember::new("dan2", "Dan Green"),
        ]);
        let matches = run("ask dan today", &roster);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].matched_member.id, "dan1");
    }

    #[test]
    fn test_malformed_members_skipped() {
        let roster = Roster::new(vec![
            TeamMember::new("", "Joseph Smith"),
            TeamMember::new("joseph", "Joseph Smith"),
        ]);
        let matches = run("tell joseph", &roster);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].matched_member.id, "joseph");
    }

    #[test]
    fn test_matches_on_id_field() {
        let roster = Roster::new(vec![TeamMember::new("jsmith", "Joseph Smith")]);
        let matches = run("ping jsmith now", &roster);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].score, 0.0);
    }

    #[test]
    fn test_deterministic() {
        let roster = joseph_roster();
        let text = "call jasef about joseph";
        assert_eq!(run(text, &roster), run(text, &roster));
    }
}
