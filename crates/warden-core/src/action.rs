// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Action tags for access-rule lookups.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The action an endpoint declares against a business element.
///
/// "Own"-scoped actions (`Read`, `Update`, `Delete`) and "all"-scoped actions
/// (`ReadAll`, `UpdateAll`, `DeleteAll`) are independent grants: a rule may
/// permit one without the other, and no hierarchy is assumed between them.
/// The engine answers only whether the action class is permitted; any
/// ownership filtering is the caller's query logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Read resources the caller owns.
    Read,
    /// Read any resource of the element.
    ReadAll,
    /// Create a new resource.
    Create,
    /// Update resources the caller owns.
    Update,
    /// Update any resource of the element.
    UpdateAll,
    /// Delete resources the caller owns.
    Delete,
    /// Delete any resource of the element.
    DeleteAll,
}

impl Action {
    /// Returns the action tag as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::ReadAll => "read_all",
            Action::Create => "create",
            Action::Update => "update",
            Action::UpdateAll => "update_all",
            Action::Delete => "delete",
            Action::DeleteAll => "delete_all",
        }
    }

    /// Parses an action tag. Unrecognized tags yield `None` and callers
    /// must treat that as a denial, never an error.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "read" => Some(Action::Read),
            "read_all" => Some(Action::ReadAll),
            "create" => Some(Action::Create),
            "update" => Some(Action::Update),
            "update_all" => Some(Action::UpdateAll),
            "delete" => Some(Action::Delete),
            "delete_all" => Some(Action::DeleteAll),
            _ => None,
        }
    }

    /// Returns all recognized action tags.
    pub fn all() -> &'static [Action] {
        &[
            Action::Read,
            Action::ReadAll,
            Action::Create,
            Action::Update,
            Action::UpdateAll,
            Action::Delete,
            Action::DeleteAll,
        ]
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_round_trip() {
        for action in Action::all() {
            assert_eq!(Action::parse(action.as_str()), Some(*action));
        }
    }

    #[test]
    fn test_action_unknown_tag() {
        assert_eq!(Action::parse("write"), None);
        assert_eq!(Action::parse("READ"), None);
        assert_eq!(Action::parse(""), None);
    }
}
