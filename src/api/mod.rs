// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Beacon Labs

//! HTTP API surface.
//!
//! Handlers are deliberately thin collaborators: the real invariants live
//! in the authorization gateway and the data access layer. Every route is
//! nested under the configured base URI and wrapped by
//! [`crate::auth::authorize`].

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth,
    models::{AddUserRequest, ApiResult, Identity, LoginRequest, Project, UpdateUserRequest},
    state::AppState,
};

pub mod info;
pub mod users;

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/", get(info::root))
        .route("/info", get(info::info))
        .route("/user/login", post(users::login))
        .route("/user/role/list", get(users::role_list))
        .route("/user/add", post(users::add_user))
        .route("/user/update", post(users::update_user))
        .route("/user/delete/{uid}", post(users::delete_user))
        .merge(SwaggerUi::new("/api-docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .with_state(state.clone());

    let base = state.config.base_uri().to_string();
    let app = if base.is_empty() {
        routes
    } else {
        Router::new().nest(&base, routes)
    };

    app.layer(middleware::from_fn_with_state(state, auth::authorize))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        info::root,
        info::info,
        users::login,
        users::role_list,
        users::add_user,
        users::update_user,
        users::delete_user
    ),
    components(
        schemas(
            ApiResult,
            Identity,
            Project,
            LoginRequest,
            AddUserRequest,
            UpdateUserRequest
        )
    ),
    tags(
        (name = "Info", description = "Service metadata"),
        (name = "Users", description = "User and role management")
    )
)]
struct ApiDoc;
