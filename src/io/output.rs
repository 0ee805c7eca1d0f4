use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::models::{MatchResult, SuggestionPayload};

/// How an utterance reached its final text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    PassThrough,
    AutoApplied,
    Accepted,
    Rejected,
    Pending,
}

/// A ranked match as written to reports
#[derive(Debug, Clone, Serialize)]
pub struct ReportMatch {
    pub word: String,
    pub member_id: String,
    pub member_name: String,
    pub score: f64,
}

impl From<&MatchResult> for ReportMatch {
    fn from(m: &MatchResult) -> Self {
        Self {
            word: m.original.surface.clone(),
            member_id: m.matched_member.id.clone(),
            member_name: m.matched_member.name.clone(),
            score: m.score,
        }
    }
}

/// Machine-readable summary of one dictation
#[derive(Debug, Clone, Serialize)]
pub struct DictationReport {
    pub session_id: String,
    /// RFC 3339 timestamp
    pub processed_at: String,
    pub original: String,
    /// Absent while a suggestion is still pending
    pub final_text: Option<String>,
    pub outcome: OutcomeKind,
    pub matches: Vec<ReportMatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<SuggestionPayload>,
}

impl DictationReport {
    pub fn new(session_id: impl Into<String>, original: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            processed_at: chrono::Utc::now().to_rfc3339(),
            original: original.into(),
            final_text: None,
            outcome: OutcomeKind::Pending,
            matches: Vec::new(),
            suggestion: None,
        }
    }

    /// Write to a JSON file
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        serde_json::to_writer_pretty(file, self).context("Failed to write JSON")?;
        Ok(())
    }
}

/// Format a confirmation prompt for a terminal
pub fn render_suggestion(payload: &SuggestionPayload) -> String {
    format!(
        "Did you mean?\n\n  I heard:   {}\n  Suggested: {}\n  Matched:   {}\n",
        payload.original, payload.updated, payload.matched_member_name
    )
}

/// Format ranked matches as an aligned table
pub fn render_matches(matches: &[MatchResult]) -> String {
    if matches.is_empty() {
        return "No roster matches\n".to_string();
    }

    let width = matches
        .iter()
        .map(|m| m.original.surface.chars().count())
        .max()
        .unwrap_or(0);

    matches
        .iter()
        .map(|m| {
            format!(
                "{:<width$}  -> {} ({}) score {:.3}\n",
                m.original.surface,
                m.matched_member.mention(),
                m.matched_member.name,
                m.score,
                width = width
            )
        })
        .collect()
}
