//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (login upsert, bearer-token lookup, progress writes)
//! - Vocabulary entries (CRUD)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{User, VocabWord};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // Use ExternalJwtFunctionSource to provide a dummy token without needing
        // a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by their Google subject id.
    pub async fn get_user(&self, google_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(google_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a user. The Google subject id is the document id,
    /// so repeated writes for the same identity hit the same document.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.google_id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Find the user owning a bearer token, if any.
    ///
    /// Tokens identify at most one record at any instant, so a single
    /// equality query with limit 1 suffices.
    pub async fn find_user_by_token(&self, token: &str) -> Result<Option<User>, AppError> {
        let token = token.to_string();
        let mut matches: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.for_all([q.field("access_token").eq(token.clone())]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(matches.pop())
    }

    // ─── Vocabulary Operations ───────────────────────────────────

    /// List vocabulary entries ordered by term.
    pub async fn list_vocab(&self, limit: u32, offset: u32) -> Result<Vec<VocabWord>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::VOCAB)
            .order_by([("term", firestore::FirestoreQueryDirection::Ascending)])
            .limit(limit)
            .offset(offset)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a vocabulary entry by term.
    pub async fn get_vocab(&self, term: &str) -> Result<Option<VocabWord>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::VOCAB)
            .obj()
            .one(&vocab_doc_id(term))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a vocabulary entry.
    pub async fn set_vocab(&self, word: &VocabWord) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::VOCAB)
            .document_id(vocab_doc_id(&word.term))
            .object(word)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a vocabulary entry.
    pub async fn delete_vocab(&self, term: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::VOCAB)
            .document_id(vocab_doc_id(term))
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

/// Document id for a vocabulary term. Terms can contain characters that
/// are not valid in document names, so they are URL-encoded.
fn vocab_doc_id(term: &str) -> String {
    urlencoding::encode(term).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocab_doc_id_encodes_special_characters() {
        assert_eq!(vocab_doc_id("ephemeral"), "ephemeral");
        assert_eq!(vocab_doc_id("laissez-faire"), "laissez-faire");
        assert_eq!(vocab_doc_id("tête-à-tête"), "t%C3%AAte-%C3%A0-t%C3%AAte");
        assert_eq!(vocab_doc_id("a/b"), "a%2Fb");
    }

    #[tokio::test]
    async fn test_offline_mock_fails_closed() {
        let db = FirestoreDb::new_mock();

        let err = db.get_user("ext-123").await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));

        let err = db.find_user_by_token("tok-A").await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }
}
