// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Beacon Labs

//! # Data Access Module
//!
//! Generic, serialized access to the single embedded SQLite database.
//!
//! ## Design
//!
//! - One [`Database`] instance is opened at process start (resolving a
//!   symlinked path to its target) and closed once at shutdown.
//! - All reads and writes flow through [`Database::execute`] and
//!   [`Database::query`]; a process-wide mutex serializes them because the
//!   single connection handle is not safe for concurrent use.
//! - Bind parameters and decoded columns are closed tagged enums
//!   ([`BindValue`], [`ColumnValue`]); unsupported kinds do not exist.
//! - The repository submodule holds the domain mappers (users, projects)
//!   built on top of the generic layer.

pub mod database;
pub mod repository;
pub mod value;

pub use database::{Database, StorageError, StorageResult};
pub use repository::{ProjectRepository, UserRepository};
pub use value::{BindValue, ColumnValue, Row};
