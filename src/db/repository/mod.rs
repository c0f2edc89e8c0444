// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Beacon Labs

//! Mapper layer providing typed access to the shared database.
//!
//! Each repository wraps the generic [`Database`](super::Database) façade
//! with parameterized statements for one entity type. The gateway consumes
//! the user and project mappers during identity resolution.

pub mod projects;
pub mod users;

pub use projects::ProjectRepository;
pub use users::UserRepository;
