// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Beacon Labs

//! Public service metadata endpoints. Both are on the allow-list and
//! reachable with no identity.

use axum::Json;
use serde_json::json;

use crate::models::ApiResult;

/// Service banner.
#[utoipa::path(
    get,
    path = "/",
    tag = "Info",
    responses((status = 200, description = "Service banner", body = ApiResult))
)]
pub async fn root() -> Json<ApiResult> {
    Json(ApiResult::ok(json!({
        "name": env!("CARGO_PKG_NAME"),
    })))
}

/// Service name and version.
#[utoipa::path(
    get,
    path = "/info",
    tag = "Info",
    responses((status = 200, description = "Build information", body = ApiResult))
)]
pub async fn info() -> Json<ApiResult> {
    Json(ApiResult::ok(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn info_reports_crate_version() {
        let Json(result) = info().await;
        assert_eq!(result.code, 0);
        let data = result.data.unwrap();
        assert_eq!(data["version"], env!("CARGO_PKG_VERSION"));
    }
}
