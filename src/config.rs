// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Beacon Labs

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `BEACON_DB` | SQLite database path (may be a symlink) | `beacon.db` |
//! | `BEACON_BASE_URI` | Base path prefix stripped before gate checks | `/api` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::env;

/// Environment variable name for the database path.
pub const DB_PATH_ENV: &str = "BEACON_DB";

/// Environment variable name for the base URI prefix.
pub const BASE_URI_ENV: &str = "BEACON_BASE_URI";

/// Immutable process-wide configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub base_uri: String,
    pub host: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: "beacon.db".to_string(),
            base_uri: "/api".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Config {
    /// Load configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            db_path: env::var(DB_PATH_ENV).unwrap_or(defaults.db_path),
            base_uri: env::var(BASE_URI_ENV)
                .map(|b| normalize_base_uri(&b))
                .unwrap_or(defaults.base_uri),
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
        }
    }

    /// The base path prefix stripped from request paths by the gateway.
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            db_path: ":memory:".to_string(),
            ..Self::default()
        }
    }
}

/// Strip a trailing slash so prefix-stripping leaves context paths with
/// their leading slash intact.
fn normalize_base_uri(base: &str) -> String {
    let trimmed = base.trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.base_uri(), "/api");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn normalize_strips_trailing_slash() {
        assert_eq!(normalize_base_uri("/api/"), "/api");
        assert_eq!(normalize_base_uri("/api"), "/api");
        assert_eq!(normalize_base_uri("/"), "");
        assert_eq!(normalize_base_uri(""), "");
    }
}
