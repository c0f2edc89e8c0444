// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Beacon Labs

//! Project mapper over the generic access layer.
//!
//! Projects are the owning applications attached to identities at
//! resolution time. The gateway only ever reads them.

use crate::db::{BindValue, Database, Row, StorageResult};
use crate::models::Project;

/// Mapper for project records.
pub struct ProjectRepository<'a> {
    db: &'a Database,
}

impl<'a> ProjectRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Create the projects table if it does not exist yet.
    pub fn ensure_schema(&self) -> StorageResult<()> {
        self.db.execute(
            "CREATE TABLE IF NOT EXISTS projects (\
             id INTEGER PRIMARY KEY AUTOINCREMENT, \
             name TEXT NOT NULL, \
             bundle_id TEXT)",
            &[],
        )
    }

    /// Look up the project owning the given application id.
    pub fn find_by_app_id(&self, app_id: i64) -> StorageResult<Option<Project>> {
        let rows = self.db.query(
            "SELECT id, name, bundle_id FROM projects WHERE id = :1",
            &[BindValue::Int64(app_id)],
        )?;
        Ok(rows
            .as_deref()
            .and_then(|rows| rows.first())
            .and_then(project_from_row))
    }

    /// Register a project; returns nothing, the caller re-reads if needed.
    pub fn insert(&self, name: &str, bundle_id: Option<&str>) -> StorageResult<()> {
        self.db.execute(
            "INSERT INTO projects (name, bundle_id) VALUES (:1, :2)",
            &[
                BindValue::from(name),
                bundle_id.map_or(BindValue::Null, |b| BindValue::Text(b.to_string())),
            ],
        )
    }
}

fn project_from_row(row: &Row) -> Option<Project> {
    Some(Project {
        id: row.get("id")?.as_i64()?,
        name: row.get("name")?.as_str()?.to_string(),
        bundle_id: row.get("bundle_id").and_then(|v| v.as_str()).map(String::from),
    })
}
