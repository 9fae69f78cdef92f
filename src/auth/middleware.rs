// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-route authorization middleware for Axum.
//!
//! Each protected route carries a [`RouteGuard`] naming its [`Operation`].
//! The gate runs before the handler (and before its body is read); on
//! denial the handler is never called.
//!
//! ```rust,ignore
//! let guard = RouteGuard::new(gate.clone(), Operation::DeleteMovie);
//! let route = delete(movies::delete_movie)
//!     .layer(axum::middleware::from_fn_with_state(guard, require_permission));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::gate::{AuthorizationGate, Decision};
use super::permissions::Operation;

/// Middleware state: the shared gate and the operation being guarded.
#[derive(Clone)]
pub struct RouteGuard {
    gate: Arc<AuthorizationGate>,
    operation: Operation,
}

impl RouteGuard {
    pub fn new(gate: Arc<AuthorizationGate>, operation: Operation) -> Self {
        Self { gate, operation }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }
}

/// Authorization middleware function.
///
/// On success the [`AuthContext`](super::AuthContext) is added to the
/// request extensions for the `Authorized` extractor.
pub async fn require_permission(
    State(guard): State<RouteGuard>,
    mut request: Request,
    next: Next,
) -> Response {
    match guard
        .gate
        .authorize_operation(guard.operation, request.headers())
        .await
    {
        Decision::Allowed(context) => {
            request.extensions_mut().insert(context);
            next.run(request).await
        }
        Decision::Denied(error) => error.into_response(),
    }
}
