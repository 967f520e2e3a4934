//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// User record stored in Firestore.
///
/// The Google subject id is also the document id, so there is exactly
/// one record per identity. The access token is rotated on every login
/// and identifies at most one record at any instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Stable Google subject id (also used as document ID)
    pub google_id: String,
    /// Opaque bearer token, rotated on every login
    pub access_token: String,
    /// Number of questions answered correctly
    pub num_correct: u32,
    /// Total number of questions answered
    pub num_answered: u32,
    /// Ordered per-question outcome history
    pub answer_history: Vec<AnswerRecord>,
    /// When the user first logged in
    pub created_at: String,
    /// Most recent login timestamp
    pub last_login: String,
}

/// A single quiz answer outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// The vocabulary term that was asked
    pub term: String,
    /// Whether the answer was correct
    pub correct: bool,
    /// When the answer was recorded (RFC 3339)
    pub answered_at: String,
}

impl User {
    /// Create a fresh record for a first-time login, with zeroed progress.
    pub fn new(google_id: &str, access_token: &str, now: &str) -> Self {
        Self {
            google_id: google_id.to_string(),
            access_token: access_token.to_string(),
            num_correct: 0,
            num_answered: 0,
            answer_history: Vec::new(),
            created_at: now.to_string(),
            last_login: now.to_string(),
        }
    }

    /// Record a quiz answer: bump the counters and append to the history.
    pub fn record_answer(&mut self, term: &str, correct: bool, now: &str) {
        self.num_answered += 1;
        if correct {
            self.num_correct += 1;
        }
        self.answer_history.push(AnswerRecord {
            term: term.to_string(),
            correct,
            answered_at: now.to_string(),
        });
    }
}
