use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::models::{Roster, TeamMember, UserProfile};

/// Roster documents are either a bare array or wrapped in `members`/`users`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RosterDocument {
    List(Vec<Value>),
    Members { members: Vec<Value> },
    Users { users: Vec<Value> },
}

/// A saved login: either the login response (`{ token, user }`) or the bare user
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UserDocument {
    Login { user: UserProfile },
    Profile(UserProfile),
}

/// Parse a roster JSON file
pub fn parse_roster_file(path: &Path) -> Result<Roster> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    parse_roster_json(&content)
}

/// Parse a roster JSON string, skipping entries without a usable id and name
pub fn parse_roster_json(json: &str) -> Result<Roster> {
    let document: RosterDocument =
        serde_json::from_str(json).context("Failed to parse roster JSON")?;
    let entries = match document {
        RosterDocument::List(entries)
        | RosterDocument::Members { members: entries }
        | RosterDocument::Users { users: entries } => entries,
    };
    Ok(roster_from_values(&entries))
}

/// Build a roster from loosely-typed member records
pub fn roster_from_values(entries: &[Value]) -> Roster {
    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let member = member_from_value(entry);
            if member.is_none() {
                warn!("Skipping malformed roster entry {}: {}", index, entry);
            }
            member
        })
        .collect()
}

fn member_from_value(entry: &Value) -> Option<TeamMember> {
    let id = match entry.get("id")? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let name = entry.get("name")?.as_str()?.trim().to_string();

    let member = TeamMember { id, name };
    member.is_well_formed().then_some(member)
}

/// Parse a user profile JSON file
pub fn parse_user_file(path: &Path) -> Result<UserProfile> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    let document: UserDocument =
        serde_json::from_str(&content).context("Failed to parse user profile JSON")?;
    Ok(match document {
        UserDocument::Login { user } | UserDocument::Profile(user) => user,
    })
}

/// Read a transcript from a UTF-8 text file
pub fn read_transcript_file(path: &Path) -> Result<String> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    Ok(content.trim_end_matches(['\n', '\r']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_roster_skips_malformed() {
        let json = r#"[
            {"id": "joseph", "name": "Joseph Smith"},
            {"id": 42, "name": "Maria Lopez"},
            {"name": "No Id"},
            {"id": "noname"},
            {"id": "", "name": "Blank"},
            {"id": {"nested": true}, "name": "Odd"},
            "not an object"
        ]"#;

        let roster = parse_roster_json(json).unwrap();
        let ids: Vec<&str> = roster.members.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["joseph", "42"]);
    }

    #[test]
    fn test_parse_wrapped_roster() {
        let json = r#"{"members": [{"id": "joseph", "name": "Joseph Smith"}]}"#;
        assert_eq!(parse_roster_json(json).unwrap().len(), 1);

        let json = r#"{"users": [{"id": 7, "name": "Sam Lee", "role": "trade"}]}"#;
        assert_eq!(parse_roster_json(json).unwrap().members[0].id, "7");
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(parse_roster_json("{not json").is_err());
    }

    #[test]
    fn test_read_files() {
        let dir = tempfile::tempdir().unwrap();

        let transcript_path = dir.path().join("note.txt");
        let mut file = std::fs::File::create(&transcript_path).unwrap();
        writeln!(file, "call jasef about the tile").unwrap();
        assert_eq!(
            read_transcript_file(&transcript_path).unwrap(),
            "call jasef about the tile"
        );

        let roster_path = dir.path().join("roster.json");
        std::fs::write(&roster_path, r#"[{"id": "joseph", "name": "Joseph Smith"}]"#).unwrap();
        assert_eq!(parse_roster_file(&roster_path).unwrap().len(), 1);

        assert!(parse_roster_file(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_parse_user_file() {
        let dir = tempfile::tempdir().unwrap();

        let login_path = dir.path().join("login.json");
        let login = serde_json::json!({
            "token": "abc",
            "user": {"username": "sam", "role": "trade", "tradeRole": "hvac"}
        });
        std::fs::write(&login_path, login.to_string()).unwrap();
        let user = parse_user_file(&login_path).unwrap();
        assert_eq!(user.username.as_deref(), Some("sam"));
        assert_eq!(user.trade_role.as_deref(), Some("hvac"));

        let profile_path = dir.path().join("user.json");
        std::fs::write(&profile_path, r#"{"username": "ana", "role": "admin"}"#).unwrap();
        assert_eq!(parse_user_file(&profile_path).unwrap().role.as_deref(), Some("admin"));

        let bad_path = dir.path().join("bad.json");
        std::fs::write(&bad_path, "[1, 2]").unwrap();
        assert!(parse_user_file(&bad_path).is_err());
    }
}
