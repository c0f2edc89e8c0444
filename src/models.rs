// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Beacon Labs

//! # API Data Models
//!
//! Request and response data structures shared across the gateway, the
//! mappers, and the API handlers. All types derive `Serialize`,
//! `Deserialize`, and `ToSchema` for JSON handling and OpenAPI docs.
//!
//! ## Model Categories
//!
//! - **Identity / Project**: the resolved caller and its owning application
//! - **ApiResult**: the uniform `{code, msg, data}` response envelope

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Identity
// =============================================================================

/// A resolved caller identity.
///
/// Resolved lazily on the first request bearing a token, cached on the
/// session for its lifetime, and refreshed (not recreated) when the
/// `invalid` flag marks it stale.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Identity {
    /// Unique user id
    pub id: i64,
    /// Display / login name
    pub name: String,
    /// Bearer token, unique, used as the lookup key
    pub token: String,
    /// Id of the owning application
    pub app_id: i64,
    /// Role level; lower value = higher privilege, `0` = admin.
    /// Absent means the default (non-privileged) level applies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_level: Option<i64>,
    /// Staleness flag: the cached identity must be refreshed from storage
    pub invalid: bool,
    /// Owning application, attached at resolution time when the lookup
    /// succeeds. May stay unset; read-only from the gateway's perspective.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<Project>,
}

/// The application a caller belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Project {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,
}

// =============================================================================
// Response Envelope
// =============================================================================

/// Uniform response envelope: `{code, msg, data}`.
///
/// `code` 0 means success; non-zero codes carry a short machine-readable
/// failure reason. Deny responses from the gateway always use
/// [`ApiResult::unauthorized`] with no further detail.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResult {
    pub code: i32,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<serde_json::Value>,
}

impl ApiResult {
    pub const UNAUTHORIZED: i32 = 401;

    /// Successful result carrying `data`.
    pub fn ok(data: impl Serialize) -> Self {
        Self {
            code: 0,
            msg: "success".to_string(),
            data: serde_json::to_value(data).ok(),
        }
    }

    /// Successful result with no payload.
    pub fn ok_empty() -> Self {
        Self {
            code: 0,
            msg: "success".to_string(),
            data: None,
        }
    }

    /// Failed result with a code and message.
    pub fn failed(code: i32, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: msg.into(),
            data: None,
        }
    }

    /// The single deny payload produced by the authorization gateway.
    pub fn unauthorized() -> Self {
        Self::failed(Self::UNAUTHORIZED, "unauthorized")
    }
}

// =============================================================================
// Request Payloads
// =============================================================================

/// Login request body.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub name: String,
    pub password: String,
}

/// Admin request to create a user.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AddUserRequest {
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub role_level: Option<i64>,
    #[serde(default)]
    pub app_id: i64,
}

/// Admin request to update a user.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub id: i64,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role_level: Option<i64>,
}
