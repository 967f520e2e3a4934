//! User record routes (bearer-authenticated).

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::AnswerRecord;
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// User routes (require authentication via bearer token).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users/me", get(get_me))
        .route("/api/users/me/answers", post(post_answer))
}

// ─── Current User ────────────────────────────────────────────

/// Current user response. The bearer token is not echoed back.
#[derive(Serialize)]
pub struct UserResponse {
    pub google_id: String,
    pub num_correct: u32,
    pub num_answered: u32,
    pub answer_history: Vec<AnswerRecord>,
}

/// Get the current user's record.
///
/// The bearer filter already resolved the record; this is a straight
/// read of what it attached to the request.
async fn get_me(Extension(auth): Extension<AuthUser>) -> Json<UserResponse> {
    let user = auth.user;
    Json(UserResponse {
        google_id: user.google_id,
        num_correct: user.num_correct,
        num_answered: user.num_answered,
        answer_history: user.answer_history,
    })
}

// ─── Quiz Answers ────────────────────────────────────────────

#[derive(Deserialize)]
struct AnswerRequest {
    /// The vocabulary term that was asked
    term: String,
    /// Whether the user answered correctly
    correct: bool,
}

/// Updated progress after recording an answer.
#[derive(Serialize)]
pub struct ProgressResponse {
    pub num_correct: u32,
    pub num_answered: u32,
}

/// Record a quiz answer: bump counters, append to the history, persist.
async fn post_answer(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<AnswerRequest>,
) -> Result<Json<ProgressResponse>> {
    if req.term.trim().is_empty() {
        return Err(crate::error::AppError::BadRequest(
            "term must not be empty".to_string(),
        ));
    }

    let mut user = auth.user;
    let now = chrono::Utc::now().to_rfc3339();
    user.record_answer(&req.term, req.correct, &now);

    state.db.upsert_user(&user).await?;

    tracing::debug!(
        google_id = %user.google_id,
        term = %req.term,
        correct = req.correct,
        "Answer recorded"
    );

    Ok(Json(ProgressResponse {
        num_correct: user.num_correct,
        num_answered: user.num_answered,
    }))
}
