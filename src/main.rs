// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Beacon Labs

use std::net::SocketAddr;

use beacon_server::api::router;
use beacon_server::config::Config;
use beacon_server::db::{Database, ProjectRepository, UserRepository};
use beacon_server::state::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = Config::from_env();

    // One connection for the whole process; symlinked paths resolve to
    // their target before opening.
    let db = Database::open(&config.db_path).expect("Failed to open database");
    UserRepository::new(&db)
        .ensure_schema()
        .expect("Failed to ensure users schema");
    ProjectRepository::new(&db)
        .ensure_schema()
        .expect("Failed to ensure projects schema");

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Failed to parse bind address");

    let state = AppState::new(db, config);
    let app = router(state.clone());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind");
    tracing::info!(%addr, base_uri = state.config.base_uri(), "beacon server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed");

    // The router is gone; this is the last handle.
    state.close();
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f == "json");
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install shutdown handler");
        return;
    }
    tracing::info!("shutdown signal received");
}
