// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Permission requirements of protected operations.
//!
//! ## Default catalog
//!
//! | Operation | Permission |
//! |-----------|------------|
//! | `list_movies`, `view_movie` | `get:movies` |
//! | `create_movie` | `post:movies` |
//! | `replace_movie`, `edit_movie` | `patch:movies` |
//! | `delete_movie` | `delete:movies` |
//! | `list_actors`, `view_actor` | `get:actors` |
//! | `create_actor` | `post:actors` |
//! | `replace_actor`, `edit_actor` | `patch:actors` |
//! | `delete_actor` | `delete:actors` |
//! | `view_profile` | none (any authenticated caller) |

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::{AuthError, Claims};

/// Check that `claims` grant `required`.
///
/// An empty requirement admits any verified caller.
pub fn check(required: &str, claims: &Claims) -> Result<(), AuthError> {
    if required.is_empty() {
        return Ok(());
    }

    let granted = claims
        .permissions
        .as_ref()
        .ok_or(AuthError::PermissionsClaimMissing)?;

    if granted.contains(required) {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}

/// Protected operations of the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    ListMovies,
    ViewMovie,
    CreateMovie,
    ReplaceMovie,
    EditMovie,
    DeleteMovie,
    ListActors,
    ViewActor,
    CreateActor,
    ReplaceActor,
    EditActor,
    DeleteActor,
    ViewProfile,
}

impl Operation {
    pub const ALL: [Operation; 13] = [
        Operation::ListMovies,
        Operation::ViewMovie,
        Operation::CreateMovie,
        Operation::ReplaceMovie,
        Operation::EditMovie,
        Operation::DeleteMovie,
        Operation::ListActors,
        Operation::ViewActor,
        Operation::CreateActor,
        Operation::ReplaceActor,
        Operation::EditActor,
        Operation::DeleteActor,
        Operation::ViewProfile,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Operation::ListMovies => "list_movies",
            Operation::ViewMovie => "view_movie",
            Operation::CreateMovie => "create_movie",
            Operation::ReplaceMovie => "replace_movie",
            Operation::EditMovie => "edit_movie",
            Operation::DeleteMovie => "delete_movie",
            Operation::ListActors => "list_actors",
            Operation::ViewActor => "view_actor",
            Operation::CreateActor => "create_actor",
            Operation::ReplaceActor => "replace_actor",
            Operation::EditActor => "edit_actor",
            Operation::DeleteActor => "delete_actor",
            Operation::ViewProfile => "view_profile",
        }
    }

    /// Permission required when no override is configured.
    pub fn default_permission(self) -> &'static str {
        match self {
            Operation::ListMovies | Operation::ViewMovie => "get:movies",
            Operation::CreateMovie => "post:movies",
            Operation::ReplaceMovie | Operation::EditMovie => "patch:movies",
            Operation::DeleteMovie => "delete:movies",
            Operation::ListActors | Operation::ViewActor => "get:actors",
            Operation::CreateActor => "post:actors",
            Operation::ReplaceActor | Operation::EditActor => "patch:actors",
            Operation::DeleteActor => "delete:actors",
            Operation::ViewProfile => "",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown operation `{0}`")]
pub struct UnknownOperation(pub String);

impl FromStr for Operation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|operation| operation.name() == s)
            .ok_or_else(|| UnknownOperation(s.to_string()))
    }
}

/// Required permission for every [`Operation`].
///
/// Always total: built from the default catalog, entries can only be
/// replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionTable {
    requirements: HashMap<Operation, String>,
}

impl Default for PermissionTable {
    fn default() -> Self {
        Self {
            requirements: Operation::ALL
                .into_iter()
                .map(|operation| (operation, operation.default_permission().to_string()))
                .collect(),
        }
    }
}

impl PermissionTable {
    /// Replace the requirement of `operation`. An empty permission makes it
    /// authenticated-only.
    pub fn require(mut self, operation: Operation, permission: impl Into<String>) -> Self {
        self.requirements.insert(operation, permission.into());
        self
    }

    pub fn required(&self, operation: Operation) -> &str {
        self.requirements
            .get(&operation)
            .map(String::as_str)
            .unwrap_or_else(|| operation.default_permission())
    }

    /// Entries sorted by operation.
    pub fn entries(&self) -> Vec<(Operation, &str)> {
        let mut entries: Vec<_> = self
            .requirements
            .iter()
            .map(|(operation, permission)| (*operation, permission.as_str()))
            .collect();
        entries.sort();
        entries
    }
}
