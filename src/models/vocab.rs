//! Vocabulary item model.

use serde::{Deserialize, Serialize};

/// A vocabulary entry presented in the quiz.
///
/// The term doubles as the unique key; the Firestore document id is the
/// URL-encoded term.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabWord {
    /// The word being quizzed
    pub term: String,
    /// Its definition (the expected answer)
    pub definition: String,
    /// Optional example sentence shown after answering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}
