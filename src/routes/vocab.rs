//! Vocabulary CRUD routes.
//!
//! Thin pass-throughs to the vocab collection; no business rules beyond
//! storage.

use crate::error::{AppError, Result};
use crate::models::VocabWord;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

const MAX_PER_PAGE: u32 = 200;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/vocab", get(list_words).post(create_word))
        .route(
            "/api/vocab/{term}",
            get(get_word).put(update_word).delete(delete_word),
        )
}

#[derive(Deserialize)]
struct ListQuery {
    #[serde(default = "default_limit")]
    limit: u32,
    #[serde(default)]
    offset: u32,
}

fn default_limit() -> u32 {
    50
}

/// List vocabulary entries ordered by term.
async fn list_words(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<VocabWord>>> {
    let limit = params.limit.min(MAX_PER_PAGE);
    let words = state.db.list_vocab(limit, params.offset).await?;
    Ok(Json(words))
}

/// Get one vocabulary entry by term.
async fn get_word(
    State(state): State<Arc<AppState>>,
    Path(term): Path<String>,
) -> Result<Json<VocabWord>> {
    let word = state
        .db
        .get_vocab(&term)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Vocab term '{}' not found", term)))?;
    Ok(Json(word))
}

#[derive(Deserialize)]
struct CreateWordRequest {
    term: String,
    definition: String,
    #[serde(default)]
    example: Option<String>,
}

/// Create a vocabulary entry.
async fn create_word(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateWordRequest>,
) -> Result<(StatusCode, Json<VocabWord>)> {
    if req.term.trim().is_empty() {
        return Err(AppError::BadRequest("term must not be empty".to_string()));
    }
    if req.definition.trim().is_empty() {
        return Err(AppError::BadRequest(
            "definition must not be empty".to_string(),
        ));
    }

    let word = VocabWord {
        term: req.term,
        definition: req.definition,
        example: req.example,
    };

    state.db.set_vocab(&word).await?;

    Ok((StatusCode::CREATED, Json(word)))
}

#[derive(Deserialize)]
struct UpdateWordRequest {
    definition: Option<String>,
    example: Option<String>,
}

/// Update fields of an existing vocabulary entry.
async fn update_word(
    State(state): State<Arc<AppState>>,
    Path(term): Path<String>,
    Json(req): Json<UpdateWordRequest>,
) -> Result<Json<VocabWord>> {
    let mut word = state
        .db
        .get_vocab(&term)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Vocab term '{}' not found", term)))?;

    if let Some(definition) = req.definition {
        if definition.trim().is_empty() {
            return Err(AppError::BadRequest(
                "definition must not be empty".to_string(),
            ));
        }
        word.definition = definition;
    }
    if req.example.is_some() {
        word.example = req.example;
    }

    state.db.set_vocab(&word).await?;

    Ok(Json(word))
}

/// Delete a vocabulary entry.
async fn delete_word(
    State(state): State<Arc<AppState>>,
    Path(term): Path<String>,
) -> Result<StatusCode> {
    state.db.delete_vocab(&term).await?;
    Ok(StatusCode::NO_CONTENT)
}
