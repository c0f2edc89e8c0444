// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Beacon Labs

//! Authorization gateway middleware.
//!
//! Intercepts every request before it reaches a handler:
//!
//! 1. Strip the configured base path prefix to get the context path.
//! 2. Context paths on the public allow-list pass with no identity.
//! 3. Otherwise a bearer token header is required.
//! 4. A session already holding a non-stale identity reuses it without a
//!    storage lookup; a stale one triggers a detached refresh and proceeds
//!    with the cached identity.
//! 5. A fresh token is resolved through the user mapper (joined with the
//!    client agent for audit logging only) and the owning project is
//!    attached when its lookup succeeds.
//! 6. Admin-restricted paths additionally require a privileged role level.
//!
//! Every deny renders the same unauthorized payload; storage failures
//! during resolution fail closed.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::{HeaderValue, SET_COOKIE, USER_AGENT},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use super::error::AuthError;
use super::session;
use crate::db::{Database, ProjectRepository, UserRepository};
use crate::models::Identity;
use crate::state::AppState;

/// Custom header carrying the bearer token.
pub const ACCESS_TOKEN_HEADER: &str = "Beacon-Access-Token";

/// Context paths reachable with no identity. Matching is by prefix: the
/// context path must start with a list entry. The root path (empty context
/// path) is always public.
pub const PUBLIC_PATHS: &[&str] = &[
    "/channel",
    "/conf/full",
    "/info",
    "/user/login",
    "/api-doc",
    "/env",
    "/net/snapshot",
];

/// Context paths restricted to privileged roles. Matching runs in the
/// opposite direction from the allow-list: a list entry must start with the
/// context path, so ancestor segments of a restricted entry are restricted
/// too. The asymmetry is intentional and load-bearing; see DESIGN.md.
pub const ADMIN_PATHS: &[&str] = &[
    "/user/add",
    "/user/update",
    "/user/delete",
    "/user/role/list",
];

/// Role levels at or below this value are privileged.
pub const ADMIN_ROLE_LEVEL: i64 = 0;

/// Role level assumed when an identity carries none.
pub const DEFAULT_ROLE_LEVEL: i64 = 2;

/// `authorize(request) -> allow | deny`.
///
/// On allow, the resolved identity (if any) is inserted into the request
/// extensions so handlers see a consistent view; on deny, the exchange is
/// halted with the uniform unauthorized payload. A freshly minted session
/// id is set on the response either way.
pub async fn authorize(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let context = context_path(request.uri().path(), state.config.base_uri()).to_string();

    let (session_id, minted) = match session::session_id(request.headers()) {
        Some(id) => (id, false),
        None => (Uuid::new_v4().simple().to_string(), true),
    };

    let mut response = match decide(&state, &session_id, &context, request.headers()).await {
        Ok(Some(identity)) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Ok(None) => next.run(request).await,
        Err(err) => {
            tracing::debug!(context, error = %err, "request denied");
            err.into_response()
        }
    };

    if minted {
        if let Ok(value) = HeaderValue::from_str(&session::cookie(&session_id)) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }
    response
}

/// The authorization decision proper. `Ok(None)` is a public-path allow.
async fn decide(
    state: &AppState,
    session_id: &str,
    context: &str,
    headers: &HeaderMap,
) -> Result<Option<Identity>, AuthError> {
    if is_public(context) {
        return Ok(None);
    }

    let token = headers
        .get(ACCESS_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)?;

    let cached = state
        .sessions
        .get(session_id)
        .await
        .and_then(|s| s.identity);

    let identity = match cached {
        // Cache contract: a non-stale cached identity is reused without a
        // storage lookup. A stale one still serves this request; the
        // refresh happens off the request path.
        Some(identity) => {
            if identity.invalid {
                spawn_refresh(Arc::clone(&state.db), token.to_string());
            }
            identity
        }
        None => {
            let agent = headers
                .get(USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown");
            resolve(&state.db, token, agent)?
        }
    };

    // Attach before the handler runs, including the freshly resolved case.
    state
        .sessions
        .attach_identity(session_id, identity.clone())
        .await;

    if is_admin_restricted(context)
        && identity.role_level.unwrap_or(DEFAULT_ROLE_LEVEL) > ADMIN_ROLE_LEVEL
    {
        return Err(AuthError::Forbidden);
    }

    Ok(Some(identity))
}

/// Resolve a token to an identity, attaching the owning project.
///
/// Any storage error counts as "no identity": resolution fails closed.
fn resolve(db: &Database, token: &str, agent: &str) -> Result<Identity, AuthError> {
    let mut identity = match UserRepository::new(db).find_by_token(token, agent) {
        Ok(Some(identity)) => identity,
        Ok(None) => return Err(AuthError::UnknownToken),
        Err(err) => {
            tracing::warn!(error = %err, "identity resolution failed");
            return Err(AuthError::UnknownToken);
        }
    };

    // Project lookup failures are tolerated; the identity stays usable.
    match ProjectRepository::new(db).find_by_app_id(identity.app_id) {
        Ok(project) => identity.project = project,
        Err(err) => tracing::debug!(error = %err, "project lookup failed"),
    }

    Ok(identity)
}

/// Detached refresh of a stale token record. Does not block the current
/// authorization decision; the guarantee is eventual, not strict.
fn spawn_refresh(db: Arc<Database>, token: String) {
    tokio::task::spawn_blocking(move || {
        if let Err(err) = UserRepository::new(&db).refresh_by_token(&token) {
            tracing::warn!(error = %err, "stale identity refresh failed");
        }
    });
}

/// The request path with the configured base prefix removed.
fn context_path<'a>(path: &'a str, base: &str) -> &'a str {
    path.strip_prefix(base).unwrap_or(path)
}

fn is_public(context: &str) -> bool {
    if context.is_empty() || context == "/" {
        return true;
    }
    PUBLIC_PATHS.iter().any(|entry| context.starts_with(entry))
}

fn is_admin_restricted(context: &str) -> bool {
    ADMIN_PATHS.iter().any(|entry| entry.starts_with(context))
}
