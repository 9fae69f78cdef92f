// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::auth::AuthorizationGate;
use crate::store::InMemoryStore;

#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<AuthorizationGate>,
    pub store: Arc<RwLock<InMemoryStore>>,
}

impl AppState {
    pub fn new(gate: AuthorizationGate, store: InMemoryStore) -> Self {
        Self {
            gate: Arc::new(gate),
            store: Arc::new(RwLock::new(store)),
        }
    }
}
