// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Beacon Labs

//! Authorization errors.
//!
//! The variants matter internally (logging, tests); on the wire every one
//! of them renders the same uniform unauthorized payload. Whether a request
//! failed for missing authentication or for insufficient role is never
//! exposed to the caller.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::models::ApiResult;

/// Authorization gateway error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// No access token header on a non-public path
    MissingToken,
    /// The token resolved to no identity (or resolution failed)
    UnknownToken,
    /// Authenticated, but the role level does not clear the admin threshold
    Forbidden,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingToken => write!(f, "access token header is required"),
            AuthError::UnknownToken => write!(f, "no identity matches the access token"),
            AuthError::Forbidden => write!(f, "insufficient role level"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // One payload for every deny cause.
        (StatusCode::UNAUTHORIZED, Json(ApiResult::unauthorized())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(err: AuthError) -> serde_json::Value {
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn all_variants_render_the_same_payload() {
        let missing = body_of(AuthError::MissingToken).await;
        let unknown = body_of(AuthError::UnknownToken).await;
        let forbidden = body_of(AuthError::Forbidden).await;

        let expected = serde_json::json!({"code": 401, "msg": "unauthorized"});
        assert_eq!(missing, expected);
        assert_eq!(unknown, expected);
        assert_eq!(forbidden, expected);
    }
}
