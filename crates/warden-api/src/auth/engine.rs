// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authorization engine.

use warden_core::{Action, Identity};
use warden_store::{Database, StoreError};

/// Decides whether a caller may perform an action on a business element.
///
/// The decision reads the access matrix: one rule per (role, element) pair,
/// seven independent flags per rule. There is no hierarchy between flags;
/// `update_all` implies nothing about `update`. Every missing link in the
/// chain (no role, unknown element, no rule, flag unset) is a plain deny,
/// while store failures propagate as errors so infrastructure trouble is
/// never mistaken for "no".
#[derive(Clone)]
pub struct AccessEngine {
    db: Database,
}

impl AccessEngine {
    /// Creates a new engine over the given database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Returns `true` if `identity` may perform `action` on `element`.
    ///
    /// The verdict is the rule flag and nothing else. The admin role gets no
    /// special treatment here; it only matters on the management surface.
    pub async fn authorize(
        &self,
        identity: &Identity,
        element: &str,
        action: Action,
    ) -> Result<bool, StoreError> {
        let role = match &identity.role {
            Some(role) => role,
            None => return Ok(false),
        };

        let element = match self.db.access().find_element_by_name(element).await? {
            Some(element) => element,
            None => return Ok(false),
        };

        let rule = match self.db.access().find_rule(role.id, element.id).await? {
            Some(rule) => rule,
            None => return Ok(false),
        };

        Ok(rule.allows(action))
    }

    /// Like [`authorize`], but takes the action as a string tag.
    ///
    /// Unknown tags deny rather than erroring: a caller asking for a
    /// permission this system does not know about holds no such permission.
    ///
    /// [`authorize`]: AccessEngine::authorize
    pub async fn authorize_named(
        &self,
        identity: &Identity,
        element: &str,
        action: &str,
    ) -> Result<bool, StoreError> {
        match Action::parse(action) {
            Some(action) => self.authorize(identity, element, action).await,
            None => Ok(false),
        }
    }
}

impl std::fmt::Debug for AccessEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessEngine").finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
