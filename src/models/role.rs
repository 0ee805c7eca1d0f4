use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Trades a worker can be assigned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trade {
    Painter,
    Plumber,
    Electrician,
    Hvac,
    Flooring,
    Cabinets,
}

impl Trade {
    pub const ALL: [Trade; 6] = [
        Trade::Painter,
        Trade::Plumber,
        Trade::Electrician,
        Trade::Hvac,
        Trade::Flooring,
        Trade::Cabinets,
    ];

    /// Short key used by the jobs API (`tradeRole`)
    pub fn key(&self) -> &'static str {
        match self {
            Trade::Painter => "painter",
            Trade::Plumber => "plumber",
            Trade::Electrician => "electrician",
            Trade::Hvac => "hvac",
            Trade::Flooring => "flooring",
            Trade::Cabinets => "cabinets",
        }
    }

    pub fn from_key(key: &str) -> Result<Self, RoleError> {
        Trade::ALL
            .into_iter()
            .find(|t| t.key() == key)
            .ok_or_else(|| RoleError::UnknownTrade(key.to_string()))
    }
}

/// Closed set of user roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Trade(Trade),
}

/// Actions gated by role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    CreateJob,
    AssignTrades,
    ReviewProgress,
    ManageSettings,
    ViewAssignedTasks,
    ToggleTasks,
    LogNotes,
    DictateNotes,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoleError {
    #[error("unknown role: {0:?}")]
    UnknownRole(String),
    #[error("unknown trade: {0:?}")]
    UnknownTrade(String),
    #[error("role {role} may not {capability:?}")]
    Forbidden { role: Role, capability: Capability },
}

impl Role {
    pub fn is_trade(&self) -> bool {
        matches!(self, Role::Trade(_))
    }

    /// Trade key for trade roles, `None` for admins
    pub fn trade_key(&self) -> Option<&'static str> {
        match self {
            Role::Trade(trade) => Some(trade.key()),
            Role::Admin => None,
        }
    }

    pub fn can(&self, capability: Capability) -> bool {
        use Capability::*;
        match self {
            Role::Admin => matches!(
                capability,
                CreateJob
                    | AssignTrades
                    | ReviewProgress
                    | ManageSettings
                    | ToggleTasks
                    | LogNotes
                    | DictateNotes
            ),
            Role::Trade(_) => matches!(capability, ViewAssignedTasks | LogNotes | DictateNotes),
        }
    }

    pub fn matches_any(&self, selectors: &[RoleSelector]) -> bool {
        selectors.iter().any(|s| s.matches(self))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Trade(trade) => write!(f, "trade-{}", trade.key()),
        }
    }
}

impl FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "admin" {
            return Ok(Role::Admin);
        }
        match s.strip_prefix("trade-") {
            Some(key) => Trade::from_key(key).map(Role::Trade),
            None => Err(RoleError::UnknownRole(s.to_string())),
        }
    }
}

/// A role requirement: one exact role, or any trade (`trade-*`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleSelector {
    Exact(Role),
    AnyTrade,
}

impl RoleSelector {
    pub fn matches(&self, role: &Role) -> bool {
        match self {
            RoleSelector::Exact(expected) => expected == role,
            RoleSelector::AnyTrade => role.is_trade(),
        }
    }
}

impl FromStr for RoleSelector {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "trade-*" {
            Ok(RoleSelector::AnyTrade)
        } else {
            s.parse().map(RoleSelector::Exact)
        }
    }
}

/// User record as returned at login
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub trade_role: Option<String>,
}

/// Resolve the role a user acts as
///
/// A mocked test role always wins. Users without any role information are
/// treated as admins, matching how the jobs API provisions accounts.
pub fn effective_role(user: &UserProfile, mock: Option<Role>) -> Result<Role, RoleError> {
    if let Some(role) = mock {
        return Ok(role);
    }
    if user.role.as_deref() == Some("admin") {
        return Ok(Role::Admin);
    }
    if let Some(key) = user.trade_role.as_deref() {
        return Trade::from_key(key).map(Role::Trade);
    }
    match user.role.as_deref() {
        Some(role) if !role.is_empty() => role.parse(),
        _ => Ok(Role::Admin),
    }
}

/// Resolve the acting role and require it to hold `capability`
pub fn authorize(
    user: &UserProfile,
    mock: Option<Role>,
    capability: Capability,
) -> Result<Role, RoleError> {
    let role = effective_role(user, mock)?;
    if role.can(capability) {
        Ok(role)
    } else {
        Err(RoleError::Forbidden { role, capability })
    }
}
