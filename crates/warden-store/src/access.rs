// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Access matrix: roles, business elements, and per-pair access rules.

use sqlx::SqlitePool;

use warden_core::{AccessRule, BusinessElement, Role};

use crate::StoreError;

type NamedRow = (i64, String, Option<String>);
type RuleRow = (i64, i64, i64, bool, bool, bool, bool, bool, bool, bool);

const RULE_COLUMNS: &str = r#"id, role_id, element_id, "read", read_all, "create", "update", update_all, "delete", delete_all"#;

/// The seven flags for a new (role, element) rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewAccessRule {
    /// Read own records.
    pub read: bool,
    /// Read any record.
    pub read_all: bool,
    /// Create records.
    pub create: bool,
    /// Update own records.
    pub update: bool,
    /// Update any record.
    pub update_all: bool,
    /// Delete own records.
    pub delete: bool,
    /// Delete any record.
    pub delete_all: bool,
}

/// Repository for the access matrix.
pub struct AccessRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AccessRepository<'a> {
    /// Create a new access repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Roles
    // =========================================================================

    /// Create a role.
    pub async fn create_role(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Role, StoreError> {
        let id: i64 =
            sqlx::query_scalar("INSERT INTO roles (name, description) VALUES (?, ?) RETURNING id")
                .bind(name)
                .bind(description)
                .fetch_one(self.pool)
                .await
                .map_err(|e| unique_to(e, StoreError::RoleExists(name.to_string())))?;

        Ok(Role {
            id,
            name: name.to_string(),
            description: description.map(str::to_string),
        })
    }

    /// List all roles, ordered by id.
    pub async fn list_roles(&self) -> Result<Vec<Role>, StoreError> {
        let rows = sqlx::query_as::<_, NamedRow>(
            "SELECT id, name, description FROM roles ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, description)| Role {
                id,
                name,
                description,
            })
            .collect())
    }

    /// Find a role by id.
    pub async fn find_role(&self, id: i64) -> Result<Option<Role>, StoreError> {
        let row = sqlx::query_as::<_, NamedRow>(
            "SELECT id, name, description FROM roles WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|(id, name, description)| Role {
            id,
            name,
            description,
        }))
    }

    /// Find a role by name.
    pub async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>, StoreError> {
        let row = sqlx::query_as::<_, NamedRow>(
            "SELECT id, name, description FROM roles WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|(id, name, description)| Role {
            id,
            name,
            description,
        }))
    }

    // =========================================================================
    // Business elements
    // =========================================================================

    /// Create a business element.
    pub async fn create_element(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<BusinessElement, StoreError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO business_elements (name, description) VALUES (?, ?) RETURNING id",
        )
        .bind(name)
        .bind(description)
        .fetch_one(self.pool)
        .await
        .map_err(|e| unique_to(e, StoreError::ElementExists(name.to_string())))?;

        Ok(BusinessElement {
            id,
            name: name.to_string(),
            description: description.map(str::to_string),
        })
    }

    /// List all business elements, ordered by id.
    pub async fn list_elements(&self) -> Result<Vec<BusinessElement>, StoreError> {
        let rows = sqlx::query_as::<_, NamedRow>(
            "SELECT id, name, description FROM business_elements ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, description)| BusinessElement {
                id,
                name,
                description,
            })
            .collect())
    }

    /// Find a business element by id.
    pub async fn find_element(&self, id: i64) -> Result<Option<BusinessElement>, StoreError> {
        let row = sqlx::query_as::<_, NamedRow>(
            "SELECT id, name, description FROM business_elements WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|(id, name, description)| BusinessElement {
            id,
            name,
            description,
        }))
    }

    /// Find a business element by name.
    pub async fn find_element_by_name(
        &self,
        name: &str,
    ) -> Result<Option<BusinessElement>, StoreError> {
        let row = sqlx::query_as::<_, NamedRow>(
            "SELECT id, name, description FROM business_elements WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|(id, name, description)| BusinessElement {
            id,
            name,
            description,
        }))
    }

    // =========================================================================
    // Access rules
    // =========================================================================

    /// Create an access rule for a (role, element) pair.
    ///
    /// The pair is unique; a second rule for the same pair fails with
    /// [`StoreError::RuleExists`] rather than silently merging flags.
    pub async fn create_rule(
        &self,
        role_id: i64,
        element_id: i64,
        flags: NewAccessRule,
    ) -> Result<AccessRule, StoreError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO access_rules (role_id, element_id, "read", read_all, "create", "update", update_all, "delete", delete_all)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(role_id)
        .bind(element_id)
        .bind(flags.read)
        .bind(flags.read_all)
        .bind(flags.create)
        .bind(flags.update)
        .bind(flags.update_all)
        .bind(flags.delete)
        .bind(flags.delete_all)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            unique_to(
                e,
                StoreError::RuleExists {
                    role_id,
                    element_id,
                },
            )
        })?;

        Ok(AccessRule {
            id,
            role_id,
            element_id,
            read: flags.read,
            read_all: flags.read_all,
            create: flags.create,
            update: flags.update,
            update_all: flags.update_all,
            delete: flags.delete,
            delete_all: flags.delete_all,
        })
    }

    /// List all access rules, ordered by id.
    pub async fn list_rules(&self) -> Result<Vec<AccessRule>, StoreError> {
        let rows = sqlx::query_as::<_, RuleRow>(&format!(
            "SELECT {RULE_COLUMNS} FROM access_rules ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(row_to_rule).collect())
    }

    /// Find the rule for a (role, element) pair, if one exists.
    pub async fn find_rule(
        &self,
        role_id: i64,
        element_id: i64,
    ) -> Result<Option<AccessRule>, StoreError> {
        let row = sqlx::query_as::<_, RuleRow>(&format!(
            "SELECT {RULE_COLUMNS} FROM access_rules WHERE role_id = ? AND element_id = ?"
        ))
        .bind(role_id)
        .bind(element_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(row_to_rule))
    }
}

fn row_to_rule(row: RuleRow) -> AccessRule {
    let (id, role_id, element_id, read, read_all, create, update, update_all, delete, delete_all) =
        row;
    AccessRule {
        id,
        role_id,
        element_id,
        read,
        read_all,
        create,
        update,
        update_all,
        delete,
        delete_all,
    }
}

/// Map a unique-constraint violation to a domain error, pass anything
/// else through.
fn unique_to(err: sqlx::Error, mapped: StoreError) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return mapped;
        }
    }
    StoreError::from(err)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    #[tokio::test]
    async fn test_role_and_element_uniqueness() {
        let db = Database::new(":memory:").await.unwrap();
        let access = db.access();

        access.create_role("manager", None).await.unwrap();
        assert!(matches!(
            access.create_role("manager", Some("again")).await,
            Err(StoreError::RoleExists(_))
        ));

        access.create_element("orders", None).await.unwrap();
        assert!(matches!(
            access.create_element("orders", None).await,
            Err(StoreError::ElementExists(_))
        ));
    }

    #[tokio::test]
    async fn test_one_rule_per_role_element_pair() {
        let db = Database::new(":memory:").await.unwrap();
        let access = db.access();

        let role = access.create_role("manager", None).await.unwrap();
        let element = access.create_element("orders", None).await.unwrap();

        let flags = NewAccessRule {
            read: true,
            ..Default::default()
        };
        access.create_rule(role.id, element.id, flags).await.unwrap();

        let second = access
            .create_rule(
                role.id,
                element.id,
                NewAccessRule {
                    delete_all: true,
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(second, Err(StoreError::RuleExists { .. })));

        // The surviving rule is the first one, flags untouched.
        let rule = access.find_rule(role.id, element.id).await.unwrap().unwrap();
        assert!(rule.read);
        assert!(!rule.delete_all);
    }

    #[tokio::test]
    async fn test_rule_flags_round_trip() {
        let db = Database::new(":memory:").await.unwrap();
        let access = db.access();

        let role = access.create_role("auditor", None).await.unwrap();
        let element = access.create_element("reports", None).await.unwrap();

        let flags = NewAccessRule {
            read: true,
            read_all: true,
            update: true,
            ..Default::default()
        };
        access.create_rule(role.id, element.id, flags).await.unwrap();

        let rule = access.find_rule(role.id, element.id).await.unwrap().unwrap();
        assert!(rule.read && rule.read_all && rule.update);
        assert!(!rule.create && !rule.update_all && !rule.delete && !rule.delete_all);
    }

    #[tokio::test]
    async fn test_missing_rule_is_none() {
        let db = Database::new(":memory:").await.unwrap();
        let access = db.access();

        let role = access.create_role("viewer", None).await.unwrap();
        let element = access.create_element("invoices", None).await.unwrap();

        assert!(access.find_rule(role.id, element.id).await.unwrap().is_none());
        assert!(access.find_rule(999, 999).await.unwrap().is_none());
    }
}
