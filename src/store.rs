// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory movie and actor catalog.
//!
//! Identifiers are assigned sequentially from 1 and never reused. Listing
//! returns records in identifier order.

use std::collections::BTreeMap;

use crate::error::ApiError;
use crate::models::{
    Actor, ActorPatch, ActorRequest, Movie, MoviePatch, MovieRequest, MAX_GENDER_LEN, MAX_NAME_LEN,
    MAX_TITLE_LEN,
};

#[derive(Default)]
pub struct InMemoryStore {
    movies: BTreeMap<u64, Movie>,
    actors: BTreeMap<u64, Actor>,
    last_movie_id: u64,
    last_actor_id: u64,
}

fn movie_not_found() -> ApiError {
    ApiError::not_found("Movie not found")
}

fn actor_not_found() -> ApiError {
    ApiError::not_found("Actor not found")
}

fn check_title(title: &str) -> Result<(), ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::bad_request("Movie title must not be empty"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ApiError::bad_request(format!(
            "Movie title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

fn check_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::bad_request("Actor name must not be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ApiError::bad_request(format!(
            "Actor name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

fn check_gender(gender: &str) -> Result<(), ApiError> {
    if gender.trim().is_empty() || gender.chars().count() > MAX_GENDER_LEN {
        return Err(ApiError::bad_request(format!(
            "Actor gender must be 1 to {MAX_GENDER_LEN} characters"
        )));
    }
    Ok(())
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Movies
    // -------------------------------------------------------------------------

    pub fn list_movies(&self) -> Vec<Movie> {
        self.movies.values().cloned().collect()
    }

    pub fn movie(&self, id: u64) -> Result<Movie, ApiError> {
        self.movies.get(&id).cloned().ok_or_else(movie_not_found)
    }

    pub fn create_movie(&mut self, request: MovieRequest) -> Result<Movie, ApiError> {
        check_title(&request.title)?;
        self.last_movie_id += 1;
        let movie = Movie {
            id: self.last_movie_id,
            title: request.title,
            release_date: request.release_date,
        };
        self.movies.insert(movie.id, movie.clone());
        Ok(movie)
    }

    pub fn replace_movie(&mut self, id: u64, request: MovieRequest) -> Result<Movie, ApiError> {
        check_title(&request.title)?;
        let movie = self.movies.get_mut(&id).ok_or_else(movie_not_found)?;
        movie.title = request.title;
        movie.release_date = request.release_date;
        Ok(movie.clone())
    }

    pub fn patch_movie(&mut self, id: u64, patch: MoviePatch) -> Result<Movie, ApiError> {
        if let Some(title) = &patch.title {
            check_title(title)?;
        }
        let movie = self.movies.get_mut(&id).ok_or_else(movie_not_found)?;
        if let Some(title) = patch.title {
            movie.title = title;
        }
        if let Some(release_date) = patch.release_date {
            movie.release_date = release_date;
        }
        Ok(movie.clone())
    }

    pub fn delete_movie(&mut self, id: u64) -> Result<Movie, ApiError> {
        self.movies.remove(&id).ok_or_else(movie_not_found)
    }

    // -------------------------------------------------------------------------
    // Actors
    // -------------------------------------------------------------------------

    pub fn list_actors(&self) -> Vec<Actor> {
        self.actors.values().cloned().collect()
    }

    pub fn actor(&self, id: u64) -> Result<Actor, ApiError> {
        self.actors.get(&id).cloned().ok_or_else(actor_not_found)
    }

    pub fn create_actor(&mut self, request: ActorRequest) -> Result<Actor, ApiError> {
        check_name(&request.name)?;
        check_gender(&request.gender)?;
        self.last_actor_id += 1;
        let actor = Actor {
            id: self.last_actor_id,
            name: request.name,
            age: request.age,
            gender: request.gender,
        };
        self.actors.insert(actor.id, actor.clone());
        Ok(actor)
    }

    pub fn replace_actor(&mut self, id: u64, request: ActorRequest) -> Result<Actor, ApiError> {
        check_name(&request.name)?;
        check_gender(&request.gender)?;
        let actor = self.actors.get_mut(&id).ok_or_else(actor_not_found)?;
        actor.name = request.name;
        actor.age = request.age;
        actor.gender = request.gender;
        Ok(actor.clone())
    }

    pub fn patch_actor(&mut self, id: u64, patch: ActorPatch) -> Result<Actor, ApiError> {
        if let Some(name) = &patch.name {
            check_name(name)?;
        }
        if let Some(gender) = &patch.gender {
            check_gender(gender)?;
        }
        let actor = self.actors.get_mut(&id).ok_or_else(actor_not_found)?;
        if let Some(name) = patch.name {
            actor.name = name;
        }
        if let Some(age) = patch.age {
            actor.age = age;
        }
        if let Some(gender) = patch.gender {
            actor.gender = gender;
        }
        Ok(actor.clone())
    }

    pub fn delete_actor(&mut self, id: u64) -> Result<Actor, ApiError> {
        self.actors.remove(&id).ok_or_else(actor_not_found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn movie_request(title: &str) -> MovieRequest {
        MovieRequest {
            title: title.to_string(),
            release_date: date(2024, 5, 17),
        }
    }

    fn actor_request(name: &str) -> ActorRequest {
        ActorRequest {
            name: name.to_string(),
            age: 41,
            gender: "female".to_string(),
        }
    }

    #[test]
    fn movie_lifecycle() {
        let mut store = InMemoryStore::new();
        let first = store.create_movie(movie_request("First")).unwrap();
        let second = store.create_movie(movie_request("Second")).unwrap();
        assert_eq!((first.id, second.id), (1, 2));

        let patched = store
            .patch_movie(
                1,
                MoviePatch {
                    title: Some("First, Recut".to_string()),
                    release_date: None,
                },
            )
            .unwrap();
        assert_eq!(patched.title, "First, Recut");
        assert_eq!(patched.release_date, first.release_date);

        let replaced = store
            .replace_movie(
                2,
                MovieRequest {
                    title: "Second".to_string(),
                    release_date: date(2025, 1, 1),
                },
            )
            .unwrap();
        assert_eq!(replaced.release_date, date(2025, 1, 1));

        store.delete_movie(1).unwrap();
        assert_eq!(store.list_movies(), vec![replaced]);
        assert_eq!(store.movie(1).unwrap_err().status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let mut store = InMemoryStore::new();
        store.create_actor(actor_request("One")).unwrap();
        store.delete_actor(1).unwrap();
        assert_eq!(store.create_actor(actor_request("Two")).unwrap().id, 2);
    }

    #[test]
    fn missing_records_are_not_found() {
        let mut store = InMemoryStore::new();
        assert_eq!(store.delete_movie(9).unwrap_err().message, "Movie not found");
        assert_eq!(
            store.patch_actor(9, ActorPatch::default()).unwrap_err().message,
            "Actor not found"
        );
    }

    #[test]
    fn overlong_title_and_name_are_rejected() {
        let mut store = InMemoryStore::new();
        assert!(store.create_movie(movie_request(&"t".repeat(MAX_TITLE_LEN))).is_ok());
        assert_eq!(
            store
                .create_movie(movie_request(&"t".repeat(MAX_TITLE_LEN + 1)))
                .unwrap_err()
                .status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(store.list_movies().len(), 1);

        store.create_actor(actor_request("Kept")).unwrap();
        let err = store
            .patch_actor(
                1,
                ActorPatch {
                    name: Some("n".repeat(MAX_NAME_LEN + 1)),
                    ..ActorPatch::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(store.actor(1).unwrap().name, "Kept");
    }

    #[test]
    fn invalid_fields_are_rejected_without_changes() {
        let mut store = InMemoryStore::new();
        assert_eq!(
            store.create_movie(movie_request("  ")).unwrap_err().status,
            StatusCode::BAD_REQUEST
        );
        assert!(store.list_movies().is_empty());

        store.create_actor(actor_request("Kept")).unwrap();
        let err = store
            .patch_actor(
                1,
                ActorPatch {
                    name: Some("Changed".to_string()),
                    age: None,
                    gender: Some("x".repeat(MAX_GENDER_LEN + 1)),
                },
            )
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(store.actor(1).unwrap().name, "Kept");
    }
}
