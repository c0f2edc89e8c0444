// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Beacon Labs

//! Beacon - Device Management Admin Backend
//!
//! The request-gatekeeping and persistence core of a small
//! device-management admin service: every inbound request passes the
//! authorization gateway, and every structured read/write flows through
//! the serialized data access layer over one embedded SQLite connection.
//!
//! ## Modules
//!
//! - `api` - HTTP handlers (Axum), thin collaborators
//! - `auth` - Authorization gateway, sessions, deny semantics
//! - `db` - Generic data access layer and the domain mappers
//! - `config` - Environment-driven runtime configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod models;
pub mod state;
