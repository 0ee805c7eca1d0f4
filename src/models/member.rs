use serde::{Deserialize, Serialize};

/// A team member that dictated notes can mention
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    /// Canonical identifier, used verbatim in `@<id>` mention tokens
    pub id: String,
    /// Display name used for matching and confirmation prompts
    pub name: String,
}

impl TeamMember {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Both fields must be non-blank for the entry to take part in matching
    pub fn is_well_formed(&self) -> bool {
        !self.id.trim().is_empty() && !self.name.trim().is_empty()
    }

    /// The inline mention token for this member
    pub fn mention(&self) -> String {
        format!("{}{}", MENTION_MARKER, self.id)
    }
}

/// Marker prefixed to a member id to form a mention token
pub const MENTION_MARKER: char = '@';

/// The set of team members available for one dictation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    pub members: Vec<TeamMember>,
}

impl Roster {
    pub fn new(members: Vec<TeamMember>) -> Self {
        Self { members }
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Members eligible for matching, in roster order
    pub fn well_formed(&self) -> impl Iterator<Item = &TeamMember> {
        self.members.iter().filter(|m| m.is_well_formed())
    }
}

impl FromIterator<TeamMember> for Roster {
    fn from_iter<I: IntoIterator<Item = TeamMember>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
