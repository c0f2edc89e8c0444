// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Beacon Labs

//! # Authorization Module
//!
//! Bearer-token authorization for the Beacon admin API.
//!
//! ## Flow
//!
//! 1. Every request passes the [`gateway::authorize`] middleware before any
//!    handler runs.
//! 2. Public context paths pass with no identity; everything else requires
//!    the `Beacon-Access-Token` header.
//! 3. The first request on a session resolves the token through storage;
//!    later requests reuse the session-cached identity until it is marked
//!    stale, at which point a detached refresh is fired.
//! 4. Admin-restricted paths additionally require a privileged role level
//!    (level ≤ 0).
//!
//! ## Security
//!
//! - Deny responses never reveal whether authentication or authorization
//!   failed; both render one uniform unauthorized payload.
//! - Storage failures during resolution fail closed.

pub mod error;
pub mod gateway;
pub mod session;

pub use error::AuthError;
pub use gateway::{authorize, ACCESS_TOKEN_HEADER, ADMIN_ROLE_LEVEL, DEFAULT_ROLE_LEVEL};
pub use session::{Session, SessionStore, SESSION_COOKIE};
