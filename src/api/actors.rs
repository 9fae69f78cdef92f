// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Actor endpoints.

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
    models::{ActorListResponse, ActorPatch, ActorRequest, ActorResponse, DeletedResponse},
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/actors",
    tag = "Actors",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "All actors, possibly none", body = ActorListResponse),
        (status = 401, body = ErrorBody),
        (status = 403, body = ErrorBody)
    )
)]
pub async fn list_actors(
    Authorized(_caller): Authorized,
    State(state): State<AppState>,
) -> Result<Json<ActorListResponse>, ApiError> {
    let actors = state.store.read().await.list_actors();
    Ok(Json(actors.into()))
}

#[utoipa::path(
    get,
    path = "/actors/{id}",
    params(("id" = u64, Path, description = "Actor identifier")),
    tag = "Actors",
    security(("bearer" = [])),
    responses(
        (status = 200, body = ActorResponse),
        (status = 404, body = ErrorBody)
    )
)]
pub async fn get_actor(
    Authorized(_caller): Authorized,
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<ActorResponse>, ApiError> {
    let Path(id) = id?;
    let actor = state.store.read().await.actor(id)?;
    Ok(Json(actor.into()))
}

#[utoipa::path(
    post,
    path = "/actors",
    request_body = ActorRequest,
    tag = "Actors",
    security(("bearer" = [])),
    responses(
        (status = 201, body = ActorResponse),
        (status = 400, body = ErrorBody)
    )
)]
pub async fn create_actor(
    Authorized(caller): Authorized,
    State(state): State<AppState>,
    payload: Result<Json<ActorRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ActorResponse>), ApiError> {
    let Json(request) = payload?;
    let actor = state.store.write().await.create_actor(request)?;
    info!(sub = caller.subject(), actor_id = actor.id, "Actor created");
    Ok((StatusCode::CREATED, Json(actor.into())))
}

#[utoipa::path(
    put,
    path = "/actors/{id}",
    params(("id" = u64, Path, description = "Actor identifier")),
    request_body = ActorRequest,
    tag = "Actors",
    security(("bearer" = [])),
    responses(
        (status = 200, body = ActorResponse),
        (status = 400, body = ErrorBody),
        (status = 404, body = ErrorBody)
    )
)]
pub async fn replace_actor(
    Authorized(caller): Authorized,
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<ActorRequest>, JsonRejection>,
) -> Result<Json<ActorResponse>, ApiError> {
    let Path(id) = id?;
    let Json(request) = payload?;
    let actor = state.store.write().await.replace_actor(id, request)?;
    info!(sub = caller.subject(), actor_id = id, "Actor replaced");
    Ok(Json(actor.into()))
}

#[utoipa::path(
    patch,
    path = "/actors/{id}",
    params(("id" = u64, Path, description = "Actor identifier")),
    request_body = ActorPatch,
    tag = "Actors",
    security(("bearer" = [])),
    responses(
        (status = 200, body = ActorResponse),
        (status = 400, body = ErrorBody),
        (status = 404, body = ErrorBody)
    )
)]
pub async fn patch_actor(
    Authorized(caller): Authorized,
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<ActorPatch>, JsonRejection>,
) -> Result<Json<ActorResponse>, ApiError> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    let actor = state.store.write().await.patch_actor(id, patch)?;
    info!(sub = caller.subject(), actor_id = id, "Actor updated");
    Ok(Json(actor.into()))
}

#[utoipa::path(
    delete,
    path = "/actors/{id}",
    params(("id" = u64, Path, description = "Actor identifier")),
    tag = "Actors",
    security(("bearer" = [])),
    responses(
        (status = 200, body = DeletedResponse),
        (status = 404, body = ErrorBody)
    )
)]
pub async fn delete_actor(
    Authorized(caller): Authorized,
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let Path(id) = id?;
    state.store.write().await.delete_actor(id)?;
    info!(sub = caller.subject(), actor_id = id, "Actor deleted");
    Ok(Json(DeletedResponse::new(id, "Actor deleted successfully!")))
}
