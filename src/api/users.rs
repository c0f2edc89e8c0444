// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Beacon Labs

//! User and role management handlers.
//!
//! The gateway has already authorized these requests; mutating endpoints
//! read the acting identity from the request extensions for audit logging.

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::db::UserRepository;
use crate::models::{AddUserRequest, ApiResult, Identity, LoginRequest, UpdateUserRequest};
use crate::state::AppState;

/// Wrong name or password.
const ERR_BAD_CREDENTIALS: i32 = 1001;
/// Conflicting user record (duplicate name).
const ERR_DUPLICATE: i32 = 1002;
/// Storage failure surfaced to the handler layer.
const ERR_STORAGE: i32 = 1500;

/// Verify credentials and issue a fresh token.
#[utoipa::path(
    post,
    path = "/user/login",
    tag = "Users",
    request_body = LoginRequest,
    responses((status = 200, description = "Identity with rotated token", body = ApiResult))
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Json<ApiResult> {
    let repo = UserRepository::new(&state.db);
    match repo.login(&request.name, &request.password) {
        Ok(Some(identity)) => Json(ApiResult::ok(identity)),
        Ok(None) => Json(ApiResult::failed(ERR_BAD_CREDENTIALS, "invalid name or password")),
        Err(err) => {
            tracing::warn!(error = %err, "login failed");
            Json(ApiResult::failed(ERR_STORAGE, "storage failure"))
        }
    }
}

/// List users with their role levels. Admin-restricted.
#[utoipa::path(
    get,
    path = "/user/role/list",
    tag = "Users",
    responses((status = 200, description = "User list", body = ApiResult))
)]
pub async fn role_list(State(state): State<AppState>) -> Json<ApiResult> {
    match UserRepository::new(&state.db).list() {
        Ok(rows) => Json(ApiResult::ok(rows.unwrap_or_default())),
        Err(err) => {
            tracing::warn!(error = %err, "user list failed");
            Json(ApiResult::failed(ERR_STORAGE, "storage failure"))
        }
    }
}

/// Create a user. Admin-restricted.
#[utoipa::path(
    post,
    path = "/user/add",
    tag = "Users",
    request_body = AddUserRequest,
    responses((status = 200, description = "Creation result", body = ApiResult))
)]
pub async fn add_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Identity>,
    Json(request): Json<AddUserRequest>,
) -> Json<ApiResult> {
    tracing::info!(actor = %actor.name, user = %request.name, "user add");
    let repo = UserRepository::new(&state.db);
    match repo.insert(&request.name, &request.password, request.role_level, request.app_id) {
        Ok(()) => Json(ApiResult::ok_empty()),
        Err(err) => {
            tracing::warn!(error = %err, "user add failed");
            Json(ApiResult::failed(ERR_DUPLICATE, "user already exists"))
        }
    }
}

/// Update a user's role level or password. Admin-restricted.
#[utoipa::path(
    post,
    path = "/user/update",
    tag = "Users",
    request_body = UpdateUserRequest,
    responses((status = 200, description = "Update result", body = ApiResult))
)]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Identity>,
    Json(request): Json<UpdateUserRequest>,
) -> Json<ApiResult> {
    tracing::info!(actor = %actor.name, user_id = request.id, "user update");
    let repo = UserRepository::new(&state.db);
    match repo.update(request.id, request.role_level, request.password.as_deref()) {
        Ok(()) => Json(ApiResult::ok_empty()),
        Err(err) => {
            tracing::warn!(error = %err, "user update failed");
            Json(ApiResult::failed(ERR_STORAGE, "storage failure"))
        }
    }
}

/// Delete a user by id. Admin-restricted.
#[utoipa::path(
    post,
    path = "/user/delete/{uid}",
    tag = "Users",
    params(("uid" = i64, Path, description = "User id")),
    responses((status = 200, description = "Deletion result", body = ApiResult))
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Identity>,
    Path(uid): Path<i64>,
) -> Json<ApiResult> {
    tracing::info!(actor = %actor.name, user_id = uid, "user delete");
    match UserRepository::new(&state.db).delete(uid) {
        Ok(()) => Json(ApiResult::ok_empty()),
        Err(err) => {
            tracing::warn!(error = %err, "user delete failed");
            Json(ApiResult::failed(ERR_STORAGE, "storage failure"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api;
    use crate::auth::ACCESS_TOKEN_HEADER;
    use crate::config::Config;
    use crate::db::{Database, ProjectRepository};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let db = Database::open_in_memory().unwrap();
        UserRepository::new(&db).ensure_schema().unwrap();
        ProjectRepository::new(&db).ensure_schema().unwrap();
        AppState::new(db, Config::for_tests())
    }

    fn admin_token(state: &AppState) -> String {
        let repo = UserRepository::new(&state.db);
        repo.insert("root", "rootpw", Some(0), 0).unwrap();
        repo.login("root", "rootpw").unwrap().unwrap().token
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, token: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .header(ACCESS_TOKEN_HEADER, token)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn login_rejects_bad_credentials() {
        let state = test_state();
        UserRepository::new(&state.db)
            .insert("dev", "pw", None, 0)
            .unwrap();
        let app = api::router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/user/login")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"name":"dev","password":"wrong"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["code"], ERR_BAD_CREDENTIALS);
    }

    #[tokio::test]
    async fn login_returns_identity_with_token() {
        let state = test_state();
        UserRepository::new(&state.db)
            .insert("dev", "pw", Some(1), 3)
            .unwrap();
        let app = api::router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/user/login")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"name":"dev","password":"pw"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["code"], 0);
        assert_eq!(body["data"]["name"], "dev");
        assert!(body["data"]["token"].as_str().unwrap().len() > 0);
    }

    #[tokio::test]
    async fn admin_can_add_then_list_users() {
        let state = test_state();
        let token = admin_token(&state);
        let app = api::router(state);

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/user/add",
                &token,
                serde_json::json!({"name": "new-dev", "password": "pw", "role_level": 2}),
            ))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["code"], 0);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/user/role/list")
                    .header(ACCESS_TOKEN_HEADER, &token)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = body_json(response).await;
        let users = body["data"].as_array().unwrap();
        assert_eq!(users.len(), 2);
        assert!(users.iter().any(|u| u["name"] == "new-dev"));
    }

    #[tokio::test]
    async fn duplicate_user_reports_conflict() {
        let state = test_state();
        let token = admin_token(&state);
        let app = api::router(state);

        let add = serde_json::json!({"name": "dup", "password": "pw"});
        let first = app
            .clone()
            .oneshot(post_json("/api/user/add", &token, add.clone()))
            .await
            .unwrap();
        assert_eq!(body_json(first).await["code"], 0);

        let second = app
            .oneshot(post_json("/api/user/add", &token, add))
            .await
            .unwrap();
        assert_eq!(body_json(second).await["code"], ERR_DUPLICATE);
    }

    #[tokio::test]
    async fn delete_removes_a_user() {
        let state = test_state();
        let token = admin_token(&state);
        let repo = UserRepository::new(&state.db);
        repo.insert("victim", "pw", None, 0).unwrap();
        let victim = repo.login("victim", "pw").unwrap().unwrap();
        let app = api::router(state.clone());

        let response = app
            .oneshot(post_json(
                &format!("/api/user/delete/{}", victim.id),
                &token,
                serde_json::json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["code"], 0);
        assert!(UserRepository::new(&state.db)
            .find_by_token(&victim.token, "a")
            .unwrap()
            .is_none());
    }
}
