//! Approximate name scoring
//!
//! A pattern is aligned against a field starting at each word start of the
//! field. The alignment is a Levenshtein distance between the whole pattern
//! and a prefix of the remaining field text (free end), bounded by an edit
//! budget proportional to the pattern length. The score combines the error
//! rate with a proximity penalty for matches that start later in the field:
//!
//! `score = errors / pattern_len + start / distance`
//!
//! 0 is an exact match at the start of the field; higher is worse.

/// Configuration for approximate matching
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// Matches scoring above this are discarded (inclusive bound)
    pub threshold: f64,
    /// Edit budget as a fraction of pattern length
    pub max_edit_ratio: f64,
    /// Characters of offset that add 1.0 to the score; 0 rejects offset matches
    pub distance: usize,
    /// Minimum number of field characters a match must cover
    pub min_match_chars: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            threshold: 0.4,
            max_edit_ratio: 0.4,
            distance: 100,
            min_match_chars: 3,
        }
    }
}

impl MatcherConfig {
    /// Maximum edit operations allowed for a pattern of `pattern_len` chars
    pub fn edit_budget(&self, pattern_len: usize) -> usize {
        // Nudge so ratios like 0.4 * 5 land on the integer they denote
        (self.max_edit_ratio * pattern_len as f64 + 1e-9).floor().max(0.0) as usize
    }
}

/// Best alignment of a pattern inside one field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldMatch {
    /// Edit operations needed
    pub errors: usize,
    /// Char offset in the field where the match starts
    pub start: usize,
    /// Number of field chars covered
    pub matched_len: usize,
    pub score: f64,
}

/// Score a normalized pattern against a field, returning the best
/// acceptable alignment
pub fn score_field(pattern: &str, field: &str, config: &MatcherConfig) -> Option<FieldMatch> {
    let pattern: Vec<char> = pattern.chars().collect();
    if pattern.is_empty() {
        return None;
    }

    let text: Vec<char> = field.to_lowercase().chars().collect();
    let budget = config.edit_budget(pattern.len());
    let mut best: Option<FieldMatch> = None;

    for start in word_starts(&text) {
        let Some((errors, matched_len)) =
            anchored_distance(&pattern, &text[start..], budget, config.min_match_chars)
        else {
            continue;
        };

        let score = compute_score(errors, pattern.len(), start, config.distance);
        if score > config.threshold {
            continue;
        }

        if best.is_none_or(|b| score < b.score) {
            best = Some(FieldMatch {
                errors,
                start,
                matched_len,
                score,
            });
        }

        if score == 0.0 {
            break;
        }
    }

    best
}

/// Error rate plus proximity penalty
pub fn compute_score(errors: usize, pattern_len: usize, start: usize, distance: usize) -> f64 {
    let accuracy = errors as f64 / pattern_len as f64;
    if distance == 0 {
        return if start == 0 { accuracy } else { 1.0 };
    }
    accuracy + start as f64 / distance as f64
}

/// Char offsets where a whitespace-separated word begins
fn word_starts(text: &[char]) -> Vec<usize> {
    text.iter()
        .enumerate()
        .filter(|&(i, c)| !c.is_whitespace() && (i == 0 || text[i - 1].is_whitespace()))
        .map(|(i, _)| i)
        .collect()
}

/// Minimum edits turning `pattern` into some prefix of `text` that is at
/// least `min_len` chars long. Returns `(errors, prefix_len)`, or `None`
/// when no prefix fits within `budget`.
fn anchored_distance(
    pattern: &[char],
    text: &[char],
    budget: usize,
    min_len: usize,
) -> Option<(usize, usize)> {
    let n = text.len();
    let min_len = min_len.max(1);
    if n < min_len {
        return None;
    }

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut cur = vec![0usize; n + 1];

    for (i, &pc) in pattern.iter().enumerate() {
        cur[0] = i + 1;
        for j in 1..=n {
            let cost = usize::from(pc != text[j - 1]);
            cur[j] = (prev[j - 1] + cost).min(prev[j] + 1).min(cur[j - 1] + 1);
        }
        // Row minima never decrease, so the whole search can stop here
        if cur.iter().min().is_some_and(|&m| m > budget) {
            return None;
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    (min_len..=n)
        .map(|j| (prev[j], j))
        .min_by_key(|&(errors, _)| errors)
        .filter(|&(errors, _)| errors <= budget)
}
