// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Movie endpoints. Every handler runs behind a route guard.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::{
    auth::Authorized,
    error::{ApiError, ErrorBody},
    models::{DeletedResponse, MovieListResponse, MoviePatch, MovieRequest, MovieResponse},
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/movies",
    tag = "Movies",
    security(("bearer" = [])),
    responses(
        (status = 200, body = MovieListResponse),
        (status = 404, description = "No movies stored", body = ErrorBody),
        (status = 401, body = ErrorBody),
        (status = 403, body = ErrorBody)
    )
)]
pub async fn list_movies(
    Authorized(_caller): Authorized,
    State(state): State<AppState>,
) -> Result<Json<MovieListResponse>, ApiError> {
    let movies = state.store.read().await.list_movies();
    if movies.is_empty() {
        return Err(ApiError::not_found("No movies found!"));
    }
    Ok(Json(movies.into()))
}

#[utoipa::path(
    get,
    path = "/movies/{id}",
    params(("id" = u64, Path, description = "Movie identifier")),
    tag = "Movies",
    security(("bearer" = [])),
    responses(
        (status = 200, body = MovieResponse),
        (status = 404, body = ErrorBody)
    )
)]
pub async fn get_movie(
    Authorized(_caller): Authorized,
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<MovieResponse>, ApiError> {
    let Path(id) = id?;
    let movie = state.store.read().await.movie(id)?;
    Ok(Json(movie.into()))
}

#[utoipa::path(
    post,
    path = "/movies",
    request_body = MovieRequest,
    tag = "Movies",
    security(("bearer" = [])),
    responses(
        (status = 201, body = MovieResponse),
        (status = 400, body = ErrorBody)
    )
)]
pub async fn create_movie(
    Authorized(caller): Authorized,
    State(state): State<AppState>,
    payload: Result<Json<MovieRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MovieResponse>), ApiError> {
    let Json(request) = payload?;
    let movie = state.store.write().await.create_movie(request)?;
    info!(sub = caller.subject(), movie_id = movie.id, "Movie created");
    Ok((StatusCode::CREATED, Json(movie.into())))
}

#[utoipa::path(
    put,
    path = "/movies/{id}",
    params(("id" = u64, Path, description = "Movie identifier")),
    request_body = MovieRequest,
    tag = "Movies",
    security(("bearer" = [])),
    responses(
        (status = 200, body = MovieResponse),
        (status = 400, body = ErrorBody),
        (status = 404, body = ErrorBody)
    )
)]
pub async fn replace_movie(
    Authorized(caller): Authorized,
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<MovieRequest>, JsonRejection>,
) -> Result<Json<MovieResponse>, ApiError> {
    let Path(id) = id?;
    let Json(request) = payload?;
    let movie = state.store.write().await.replace_movie(id, request)?;
    info!(sub = caller.subject(), movie_id = id, "Movie replaced");
    Ok(Json(movie.into()))
}

#[utoipa::path(
    patch,
    path = "/movies/{id}",
    params(("id" = u64, Path, description = "Movie identifier")),
    request_body = MoviePatch,
    tag = "Movies",
    security(("bearer" = [])),
    responses(
        (status = 200, body = MovieResponse),
        (status = 400, body = ErrorBody),
        (status = 404, body = ErrorBody)
    )
)]
pub async fn patch_movie(
    Authorized(caller): Authorized,
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<MoviePatch>, JsonRejection>,
) -> Result<Json<MovieResponse>, ApiError> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    let movie = state.store.write().await.patch_movie(id, patch)?;
    info!(sub = caller.subject(), movie_id = id, "Movie updated");
    Ok(Json(movie.into()))
}

#[utoipa::path(
    delete,
    path = "/movies/{id}",
    params(("id" = u64, Path, description = "Movie identifier")),
    tag = "Movies",
    security(("bearer" = [])),
    responses(
        (status = 200, body = DeletedResponse),
        (status = 404, body = ErrorBody)
    )
)]
pub async fn delete_movie(
    Authorized(caller): Authorized,
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let Path(id) = id?;
    state.store.write().await.delete_movie(id)?;
    info!(sub = caller.subject(), movie_id = id, "Movie deleted");
    Ok(Json(DeletedResponse::new(id, "Movie deleted successfully!")))
}
