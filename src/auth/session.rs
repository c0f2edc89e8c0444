// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Beacon Labs

//! Typed per-client sessions.
//!
//! A session is keyed by an opaque id transported in an `HttpOnly` cookie.
//! It holds the resolved numeric user id (as a string) and the cached
//! [`Identity`]. The gateway is the only writer. Sessions idle past
//! [`SESSION_TTL`] expire: `get` stops returning them and writes purge them,
//! so clients that never send the cookie back cannot grow the map without
//! bound.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use tokio::sync::RwLock;

use crate::models::Identity;

/// Cookie carrying the opaque session id.
pub const SESSION_COOKIE: &str = "beacon-session";

/// Sessions idle longer than this are evicted.
pub const SESSION_TTL: Duration = Duration::from_secs(30 * 60);

/// Server-held state for one client session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Resolved numeric user id, stored as a string
    pub user_id: String,
    /// Cached identity; once set, the gateway must not re-resolve it from
    /// storage unless it is marked stale
    pub identity: Option<Identity>,
    touched: Instant,
}

/// Process-wide session store.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, Session>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(SESSION_TTL)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store with a custom idle expiry.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: Arc::default(),
            ttl,
        }
    }

    /// Fetch a session snapshot by id. Expired sessions are not returned;
    /// they are physically removed on the next write.
    pub async fn get(&self, session_id: &str) -> Option<Session> {
        let sessions = self.inner.read().await;
        let session = sessions.get(session_id)?;
        if session.touched.elapsed() > self.ttl {
            return None;
        }
        Some(session.clone())
    }

    /// Attach a resolved identity to the session, creating the session if
    /// this is the client's first authenticated request. Writes double as
    /// the eviction point: idle sessions are dropped before the new entry
    /// goes in, and re-attaching resets the idle clock.
    pub async fn attach_identity(&self, session_id: &str, identity: Identity) {
        let mut sessions = self.inner.write().await;
        sessions.retain(|_, session| session.touched.elapsed() <= self.ttl);
        sessions.insert(
            session_id.to_string(),
            Session {
                user_id: identity.id.to_string(),
                identity: Some(identity),
                touched: Instant::now(),
            },
        );
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

/// Extract the session id from the request's cookie header, if present.
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(COOKIE)?.to_str().ok()?;
    for pair in cookies.split(';') {
        let pair = pair.trim();
        if let Some(value) = pair.strip_prefix(SESSION_COOKIE) {
            if let Some(value) = value.strip_prefix('=') {
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

/// Build the `Set-Cookie` value for a freshly minted session id.
pub fn cookie(session_id: &str) -> String {
    format!("{SESSION_COOKIE}={session_id}; Path=/; HttpOnly")
}
