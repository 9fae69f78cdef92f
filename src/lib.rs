// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Casting Gate - Permission-gated Movies & Actors API
//!
//! Verifies Auth0-issued RS256 bearer tokens against the tenant's JWKS and
//! checks the token's `permissions` claim before any resource handler runs.
//!
//! ## Modules
//!
//! - `auth` - Key set cache, token verification and the authorization gate
//! - `api` - HTTP API handlers (Axum)
//! - `config` - Environment-driven settings
//! - `store` - In-memory movie and actor catalog

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod store;
