// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Beacon Labs

//! Shared application state.
//!
//! One [`Database`] instance, one [`SessionStore`], one [`Config`]. The
//! state is constructed explicitly at startup and injected into the router
//! and middleware; nothing reaches it through ambient globals.

use std::sync::Arc;

use crate::auth::SessionStore;
use crate::config::Config;
use crate::db::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub sessions: SessionStore,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: Database, config: Config) -> Self {
        Self {
            db: Arc::new(db),
            sessions: SessionStore::new(),
            config: Arc::new(config),
        }
    }

    /// Close the shared database connection. Called once at shutdown, after
    /// the server has drained; a straggling background task keeping the
    /// handle alive falls back to close-on-drop.
    pub fn close(self) {
        let AppState { db, .. } = self;
        match Arc::try_unwrap(db) {
            Ok(db) => {
                if let Err(err) = db.close() {
                    tracing::warn!(error = %err, "database close failed");
                }
            }
            Err(_) => tracing::warn!("database handle still shared at shutdown, closing on drop"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_consumes_the_sole_handle() {
        let db = Database::open_in_memory().unwrap();
        let state = AppState::new(db, Config::for_tests());
        state.close();
    }
}
