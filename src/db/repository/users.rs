// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Beacon Labs

//! User mapper over the generic access layer.
//!
//! The `invalid` column is declared with the `bit` type name so the access
//! layer decodes it as a boolean, and `role_level` is nullable: an absent
//! level means the default non-privileged level applies.

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::db::{BindValue, Database, Row, StorageResult};
use crate::models::Identity;

/// Issued tokens carry an expiry stamp one week out.
const TOKEN_TTL_MILLIS: i64 = 7 * 24 * 3600 * 1000;

/// Mapper for user records.
pub struct UserRepository<'a> {
    db: &'a Database,
}

impl<'a> UserRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Create the users table if it does not exist yet.
    pub fn ensure_schema(&self) -> StorageResult<()> {
        self.db.execute(
            "CREATE TABLE IF NOT EXISTS users (\
             id INTEGER PRIMARY KEY AUTOINCREMENT, \
             name TEXT NOT NULL UNIQUE, \
             password TEXT NOT NULL, \
             token TEXT UNIQUE, \
             app_id INTEGER NOT NULL DEFAULT 0, \
             role_level INTEGER, \
             invalid bit NOT NULL DEFAULT 0, \
             agent TEXT, \
             stamp INTEGER)",
            &[],
        )
    }

    /// Resolve an identity by bearer token.
    ///
    /// The client agent string is written back to the matched record as an
    /// audit trail; it never participates in matching.
    pub fn find_by_token(&self, token: &str, agent: &str) -> StorageResult<Option<Identity>> {
        tracing::debug!(agent, "identity lookup by token");
        let rows = self.db.query(
            "SELECT id, name, token, app_id, role_level, invalid FROM users WHERE token = :1",
            &[BindValue::from(token)],
        )?;
        let identity = rows
            .as_deref()
            .and_then(|rows| rows.first())
            .and_then(identity_from_row);
        if identity.is_some() {
            self.db.execute(
                "UPDATE users SET agent = :2 WHERE token = :1",
                &[BindValue::from(token), BindValue::from(agent)],
            )?;
        }
        Ok(identity)
    }

    /// Refresh a stale token record: clear the staleness flag and bump the
    /// expiry stamp. Fired from the gateway as a detached task.
    pub fn refresh_by_token(&self, token: &str) -> StorageResult<()> {
        self.db.execute(
            "UPDATE users SET invalid = :2, stamp = :3 WHERE token = :1",
            &[
                BindValue::from(token),
                BindValue::Bool(false),
                BindValue::Int64(now_millis() + TOKEN_TTL_MILLIS),
            ],
        )
    }

    /// Verify credentials and rotate the user's token on success.
    pub fn login(&self, name: &str, password: &str) -> StorageResult<Option<Identity>> {
        let rows = self.db.query(
            "SELECT id, name, token, app_id, role_level, invalid FROM users \
             WHERE name = :1 AND password = :2",
            &[BindValue::from(name), BindValue::from(digest(password))],
        )?;
        let Some(mut identity) = rows
            .as_deref()
            .and_then(|rows| rows.first())
            .and_then(identity_from_row)
        else {
            return Ok(None);
        };

        let token = Uuid::new_v4().simple().to_string();
        self.db.execute(
            "UPDATE users SET token = :1, stamp = :2, invalid = :3 WHERE id = :4",
            &[
                BindValue::from(token.clone()),
                BindValue::Int64(now_millis() + TOKEN_TTL_MILLIS),
                BindValue::Bool(false),
                BindValue::Int64(identity.id),
            ],
        )?;
        identity.token = token;
        identity.invalid = false;
        Ok(Some(identity))
    }

    /// Insert a new user with a freshly issued token.
    pub fn insert(
        &self,
        name: &str,
        password: &str,
        role_level: Option<i64>,
        app_id: i64,
    ) -> StorageResult<()> {
        self.db.execute(
            "INSERT INTO users (name, password, token, app_id, role_level, stamp) \
             VALUES (:1, :2, :3, :4, :5, :6)",
            &[
                BindValue::from(name),
                BindValue::from(digest(password)),
                BindValue::from(Uuid::new_v4().simple().to_string()),
                BindValue::Int64(app_id),
                role_level.map_or(BindValue::Null, BindValue::Int64),
                BindValue::Int64(now_millis() + TOKEN_TTL_MILLIS),
            ],
        )
    }

    /// Update a user's role level and, when supplied, password.
    pub fn update(
        &self,
        id: i64,
        role_level: Option<i64>,
        password: Option<&str>,
    ) -> StorageResult<()> {
        if let Some(password) = password {
            self.db.execute(
                "UPDATE users SET password = :1 WHERE id = :2",
                &[BindValue::from(digest(password)), BindValue::Int64(id)],
            )?;
        }
        self.db.execute(
            "UPDATE users SET role_level = :1 WHERE id = :2",
            &[
                role_level.map_or(BindValue::Null, BindValue::Int64),
                BindValue::Int64(id),
            ],
        )
    }

    /// Delete a user by id.
    pub fn delete(&self, id: i64) -> StorageResult<()> {
        self.db.execute(
            "DELETE FROM users WHERE id = :1",
            &[BindValue::Int64(id)],
        )
    }

    /// Mark a user's cached identity stale; the gateway will trigger a
    /// refresh on the next request bearing this user's token.
    pub fn invalidate(&self, id: i64) -> StorageResult<()> {
        self.db.execute(
            "UPDATE users SET invalid = :1 WHERE id = :2",
            &[BindValue::Bool(true), BindValue::Int64(id)],
        )
    }

    /// List all users with their role levels. `None` when the table is empty.
    pub fn list(&self) -> StorageResult<Option<Vec<Row>>> {
        self.db.query(
            "SELECT id, name, app_id, role_level, invalid FROM users ORDER BY id",
            &[],
        )
    }
}

/// Decode one user row into an [`Identity`]. Rows missing the required
/// columns (always a schema mismatch) decode to `None`.
fn identity_from_row(row: &Row) -> Option<Identity> {
    Some(Identity {
        id: row.get("id")?.as_i64()?,
        name: row.get("name")?.as_str()?.to_string(),
        token: row.get("token")?.as_str()?.to_string(),
        app_id: row.get("app_id").and_then(|v| v.as_i64()).unwrap_or(0),
        role_level: row.get("role_level").and_then(|v| v.as_i64()),
        invalid: row.get("invalid").and_then(|v| v.as_bool()).unwrap_or(false),
        project: None,
    })
}

/// Hex-encoded SHA-256 digest for stored credentials.
fn digest(password: &str) -> String {
    let hash = Sha256::digest(password.as_bytes());
    hash.iter().map(|b| format!("{b:02x}")).collect()
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        UserRepository::new(&db).ensure_schema().unwrap();
        db
    }

    #[test]
    fn insert_and_find_by_token() {
        let db = repo_db();
        let repo = UserRepository::new(&db);
        repo.insert("ops", "secret", Some(0), 7).unwrap();

        let rows = repo.list().unwrap().unwrap();
        assert_eq!(rows.len(), 1);

        // Fetch the issued token straight from storage.
        let token_rows = db
            .query("SELECT token FROM users WHERE name = :1", &[BindValue::from("ops")])
            .unwrap()
            .unwrap();
        let token = token_rows[0]["token"].as_str().unwrap().to_string();

        let identity = repo.find_by_token(&token, "test-agent").unwrap().unwrap();
        assert_eq!(identity.name, "ops");
        assert_eq!(identity.app_id, 7);
        assert_eq!(identity.role_level, Some(0));
        assert!(!identity.invalid);
    }

    #[test]
    fn unknown_token_resolves_to_none() {
        let db = repo_db();
        let repo = UserRepository::new(&db);
        assert!(repo.find_by_token("nope", "agent").unwrap().is_none());
    }

    #[test]
    fn login_verifies_and_rotates_token() {
        let db = repo_db();
        let repo = UserRepository::new(&db);
        repo.insert("dev", "hunter2", None, 0).unwrap();

        assert!(repo.login("dev", "wrong").unwrap().is_none());

        let first = repo.login("dev", "hunter2").unwrap().unwrap();
        let second = repo.login("dev", "hunter2").unwrap().unwrap();
        assert_ne!(first.token, second.token);

        // Only the latest token resolves.
        assert!(repo.find_by_token(&first.token, "a").unwrap().is_none());
        assert!(repo.find_by_token(&second.token, "a").unwrap().is_some());
    }

    #[test]
    fn invalidate_and_refresh_round_trip() {
        let db = repo_db();
        let repo = UserRepository::new(&db);
        repo.insert("dev", "pw", None, 0).unwrap();
        let identity = repo.login("dev", "pw").unwrap().unwrap();

        repo.invalidate(identity.id).unwrap();
        let stale = repo.find_by_token(&identity.token, "a").unwrap().unwrap();
        assert!(stale.invalid);

        repo.refresh_by_token(&identity.token).unwrap();
        let fresh = repo.find_by_token(&identity.token, "a").unwrap().unwrap();
        assert!(!fresh.invalid);
    }

    #[test]
    fn find_by_token_records_the_client_agent() {
        let db = repo_db();
        let repo = UserRepository::new(&db);
        repo.insert("dev", "pw", None, 0).unwrap();
        let identity = repo.login("dev", "pw").unwrap().unwrap();

        repo.find_by_token(&identity.token, "curl/8.5").unwrap().unwrap();
        let rows = db
            .query(
                "SELECT agent FROM users WHERE id = :1",
                &[BindValue::Int64(identity.id)],
            )
            .unwrap()
            .unwrap();
        assert_eq!(rows[0]["agent"].as_str(), Some("curl/8.5"));

        // A lookup miss writes nothing.
        assert!(repo.find_by_token("nope", "other-agent").unwrap().is_none());
        let rows = db
            .query(
                "SELECT agent FROM users WHERE id = :1",
                &[BindValue::Int64(identity.id)],
            )
            .unwrap()
            .unwrap();
        assert_eq!(rows[0]["agent"].as_str(), Some("curl/8.5"));
    }

    #[test]
    fn update_changes_role_level() {
        let db = repo_db();
        let repo = UserRepository::new(&db);
        repo.insert("dev", "pw", Some(2), 0).unwrap();
        let identity = repo.login("dev", "pw").unwrap().unwrap();

        repo.update(identity.id, Some(0), None).unwrap();
        let updated = repo.find_by_token(&identity.token, "a").unwrap().unwrap();
        assert_eq!(updated.role_level, Some(0));
    }

    #[test]
    fn delete_removes_the_user() {
        let db = repo_db();
        let repo = UserRepository::new(&db);
        repo.insert("dev", "pw", None, 0).unwrap();
        let identity = repo.login("dev", "pw").unwrap().unwrap();

        repo.delete(identity.id).unwrap();
        assert!(repo.find_by_token(&identity.token, "a").unwrap().is_none());
        assert!(repo.list().unwrap().is_none());
    }

    #[test]
    fn digest_is_stable_hex() {
        assert_eq!(digest("abc").len(), 64);
        assert_eq!(digest("abc"), digest("abc"));
        assert_ne!(digest("abc"), digest("abd"));
    }
}
