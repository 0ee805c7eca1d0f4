use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::MatchResult;

/// A low-confidence rewrite awaiting an explicit accept or reject
///
/// Both resolution methods consume the suggestion, so it can be closed
/// exactly once and never partially applied.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSuggestion {
    /// Transcript exactly as captured
    pub original: String,
    /// The best-ranked match that produced the rewrite
    pub top_match: MatchResult,
    /// Transcript with the match substituted, not yet committed
    pub updated: String,
}

impl PendingSuggestion {
    pub fn accept(self) -> String {
        self.updated
    }

    pub fn reject(self) -> String {
        self.original
    }

    pub fn resolve(self, decision: Decision) -> String {
        match decision {
            Decision::Accept => self.accept(),
            Decision::Reject => self.reject(),
        }
    }

    /// View handed to a confirmation prompt
    pub fn payload(&self) -> SuggestionPayload {
        SuggestionPayload {
            original: self.original.clone(),
            updated: self.updated.clone(),
            matched_member_name: self.top_match.matched_member.name.clone(),
        }
    }
}

/// Serializable confirmation prompt contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionPayload {
    pub original: String,
    pub updated: String,
    pub matched_member_name: String,
}

/// The only two answers a confirmation prompt may give
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Accept,
    Reject,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("expected \"accept\" or \"reject\", got {0:?}")]
pub struct DecisionParseError(pub String);

impl FromStr for Decision {
    type Err = DecisionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accept" => Ok(Decision::Accept),
            "reject" => Ok(Decision::Reject),
            other => Err(DecisionParseError(other.to_string())),
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Accept => write!(f, "accept"),
            Decision::Reject => write!(f, "reject"),
        }
    }
}
