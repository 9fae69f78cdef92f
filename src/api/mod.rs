// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    middleware,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{require_permission, Operation, RouteGuard},
    error::{ApiError, ErrorBody},
    models::{
        Actor, ActorListResponse, ActorPatch, ActorRequest, ActorResponse, DeletedResponse, Movie,
        MovieListResponse, MoviePatch, MovieRequest, MovieResponse, WelcomeResponse,
    },
    state::AppState,
};

pub mod actors;
pub mod health;
pub mod movies;
pub mod users;

pub fn router(state: AppState) -> Router {
    let gate = state.gate.clone();
    let guard = move |operation: Operation| {
        middleware::from_fn_with_state(RouteGuard::new(gate.clone(), operation), require_permission)
    };

    let catalog = Router::new()
        .route(
            "/movies",
            get(movies::list_movies)
                .layer(guard(Operation::ListMovies))
                .merge(post(movies::create_movie).layer(guard(Operation::CreateMovie))),
        )
        .route(
            "/movies/{id}",
            get(movies::get_movie)
                .layer(guard(Operation::ViewMovie))
                .merge(put(movies::replace_movie).layer(guard(Operation::ReplaceMovie)))
                .merge(patch(movies::patch_movie).layer(guard(Operation::EditMovie)))
                .merge(delete(movies::delete_movie).layer(guard(Operation::DeleteMovie))),
        )
        .route(
            "/actors",
            get(actors::list_actors)
                .layer(guard(Operation::ListActors))
                .merge(post(actors::create_actor).layer(guard(Operation::CreateActor))),
        )
        .route(
            "/actors/{id}",
            get(actors::get_actor)
                .layer(guard(Operation::ViewActor))
                .merge(put(actors::replace_actor).layer(guard(Operation::ReplaceActor)))
                .merge(patch(actors::patch_actor).layer(guard(Operation::EditActor)))
                .merge(delete(actors::delete_actor).layer(guard(Operation::DeleteActor))),
        )
        .route(
            "/me",
            get(users::get_profile).layer(guard(Operation::ViewProfile)),
        )
        .route("/", get(home))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state);

    Router::new()
        .merge(catalog)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        // propagate must sit inside set so the id exists when the response is copied
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Public welcome message.
#[utoipa::path(
    get,
    path = "/",
    tag = "Home",
    responses((status = 200, body = WelcomeResponse))
)]
pub async fn home() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        success: true,
        message: "Welcome to the Movie and Actor API!".to_string(),
    })
}

async fn not_found() -> ApiError {
    ApiError::not_found("Resource not found!")
}

async fn method_not_allowed() -> ApiError {
    ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed!")
}

#[derive(OpenApi)]
#[openapi(
    paths(
        home,
        movies::list_movies,
        movies::get_movie,
        movies::create_movie,
        movies::replace_movie,
        movies::patch_movie,
        movies::delete_movie,
        actors::list_actors,
        actors::get_actor,
        actors::create_actor,
        actors::replace_actor,
        actors::patch_actor,
        actors::delete_actor,
        users::get_profile,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            Movie,
            MovieRequest,
            MoviePatch,
            MovieListResponse,
            MovieResponse,
            Actor,
            ActorRequest,
            ActorPatch,
            ActorListResponse,
            ActorResponse,
            DeletedResponse,
            WelcomeResponse,
            ErrorBody,
            users::ProfileResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Home", description = "Public entry point"),
        (name = "Movies", description = "Movie catalog"),
        (name = "Actors", description = "Actor roster"),
        (name = "Users", description = "Caller identity"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
