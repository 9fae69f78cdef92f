// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response structures for the casting catalog. All types derive
//! `Serialize`/`Deserialize` and `ToSchema` for JSON handling and OpenAPI
//! documentation.
//!
//! ## Model Categories
//!
//! - **Movies**: title and release date
//! - **Actors**: name, age and gender
//! - **Envelopes**: `{ "success": true, ... }` wrappers returned by handlers

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Upper bound on movie titles, in characters.
pub const MAX_TITLE_LEN: usize = 120;

/// Upper bound on actor names, in characters.
pub const MAX_NAME_LEN: usize = 120;

/// Upper bound on stored gender labels.
pub const MAX_GENDER_LEN: usize = 10;

// =============================================================================
// Movie Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Movie {
    pub id: u64,
    pub title: String,
    /// Release date (`YYYY-MM-DD`).
    #[schema(value_type = String, format = Date, example = "2024-05-17")]
    pub release_date: NaiveDate,
}

/// Body of `POST` and `PUT` on movies.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MovieRequest {
    pub title: String,
    #[schema(value_type = String, format = Date, example = "2024-05-17")]
    pub release_date: NaiveDate,
}

/// Body of `PATCH` on a movie; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct MoviePatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>, format = Date)]
    pub release_date: Option<NaiveDate>,
}

// =============================================================================
// Actor Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Actor {
    pub id: u64,
    pub name: String,
    pub age: u32,
    pub gender: String,
}

/// Body of `POST` and `PUT` on actors.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActorRequest {
    pub name: String,
    pub age: u32,
    pub gender: String,
}

/// Body of `PATCH` on an actor; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ActorPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
}

// =============================================================================
// Response Envelopes
// =============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MovieListResponse {
    pub success: bool,
    pub movies: Vec<Movie>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MovieResponse {
    pub success: bool,
    pub movie: Movie,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ActorListResponse {
    pub success: bool,
    pub actors: Vec<Actor>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ActorResponse {
    pub success: bool,
    pub actor: Actor,
}

/// Returned by `DELETE` on movies and actors.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeletedResponse {
    pub success: bool,
    /// Identifier of the removed record
    pub deleted: u64,
    pub message: String,
}

/// Returned by the public `GET /`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WelcomeResponse {
    pub success: bool,
    pub message: String,
}

impl From<Vec<Movie>> for MovieListResponse {
    fn from(movies: Vec<Movie>) -> Self {
        Self {
            success: true,
            movies,
        }
    }
}

impl From<Movie> for MovieResponse {
    fn from(movie: Movie) -> Self {
        Self {
            success: true,
            movie,
        }
    }
}

impl From<Vec<Actor>> for ActorListResponse {
    fn from(actors: Vec<Actor>) -> Self {
        Self {
            success: true,
            actors,
        }
    }
}

impl From<Actor> for ActorResponse {
    fn from(actor: Actor) -> Self {
        Self {
            success: true,
            actor,
        }
    }
}

impl DeletedResponse {
    pub fn new(deleted: u64, message: impl Into<String>) -> Self {
        Self {
            success: true,
            deleted,
            message: message.into(),
        }
    }
}
