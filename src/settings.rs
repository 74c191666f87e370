//! Dashboard settings: revenue target, manual revenue adjustment and the team roster.
//!
//! Numeric setters are permissive: anything that is not a finite number becomes 0.
//! The roster is an ordered list; owners on tasks are free text, so removing a member
//! never touches tasks.

use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

pub const DEFAULT_REVENUE_TARGET: f64 = 850_000.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_revenue_target")]
    pub revenue_target: f64,
    #[serde(default)]
    pub manual_revenue_adjustment: f64,
    #[serde(default)]
    pub team_members: Vec<TeamMember>,
}

fn default_revenue_target() -> f64 {
    DEFAULT_REVENUE_TARGET
}

impl Default for Settings {
    fn default() -> Self {
        let team_members = ["Comms Team", "Sponsorship Team", "Finance Team"]
            .iter()
            .zip(1..)
            .map(|(name, id)| TeamMember { id, name: (*name).to_string(), email: None })
            .collect();
        Settings {
            revenue_target: DEFAULT_REVENUE_TARGET,
            manual_revenue_adjustment: 0.0,
            team_members,
        }
    }
}

/// Coerce a numeric setting: NaN and infinities become 0.
pub fn coerce_amount(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Parse a numeric setting from text; anything unparsable becomes 0.
pub fn parse_amount_or_zero(input: &str) -> f64 {
    input.trim().parse::<f64>().map(coerce_amount).unwrap_or(0.0)
}

impl Settings {
    /// Defaults with a different starting revenue target.
    pub fn with_revenue_target(target: f64) -> Self {
        Settings {
            revenue_target: coerce_amount(target),
            ..Settings::default()
        }
    }

    pub fn set_revenue_target(&mut self, value: f64) {
        self.revenue_target = coerce_amount(value);
    }

    pub fn set_manual_adjustment(&mut self, value: f64) {
        self.manual_revenue_adjustment = coerce_amount(value);
    }

    pub fn member(&self, id: u64) -> Option<&TeamMember> {
        self.team_members.iter().find(|m| m.id == id)
    }

    /// Append a member with a fresh id. The name is trimmed and must not be empty.
    pub fn add_member(&mut self, name: &str, email: Option<&str>) -> Result<u64, DashboardError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DashboardError::EmptyMemberName);
        }
        let id = self.team_members.iter().map(|m| m.id).max().unwrap_or(0) + 1;
        let email = email.map(str::trim).filter(|e| !e.is_empty()).map(str::to_string);
        self.team_members.push(TeamMember { id, name: name.to_string(), email });
        Ok(id)
    }

    /// Rename a member. Returns `Ok(false)` when the id is unknown.
    pub fn rename_member(&mut self, id: u64, name: &str) -> Result<bool, DashboardError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DashboardError::EmptyMemberName);
        }
        match self.team_members.iter_mut().find(|m| m.id == id) {
            Some(member) => {
                member.name = name.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove a member. Returns `false` when the id is unknown.
    pub fn remove_member(&mut self, id: u64) -> bool {
        let before = self.team_members.len();
        self.team_members.retain(|m| m.id != id);
        self.team_members.len() != before
    }
}
