//! Account login upsert and bearer-token verification.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::User;
use std::future::Future;
use std::time::Duration;

/// Timeout for each storage operation in the login flow. A stalled
/// Firestore call surfaces as an authentication failure instead of
/// hanging the callback request.
const STORAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Account service: owns the login upsert flow and bearer lookups.
#[derive(Clone)]
pub struct AccountService {
    db: FirestoreDb,
}

impl AccountService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Handle a verified login: upsert the user record for this identity.
    ///
    /// - Existing record: rotate the access token in place, refresh
    ///   `last_login`, leave progress fields untouched.
    /// - No record: create one with zeroed progress.
    ///
    /// The lookup and the write are two separate Firestore operations,
    /// not a transaction. Two concurrent logins for the same identity can
    /// race, with one token silently overwriting the other; the loser's
    /// session sees 401 on its next request and logs in again.
    pub async fn login_upsert(&self, google_id: &str, access_token: &str) -> Result<User, AppError> {
        let existing = self.with_timeout(self.db.get_user(google_id)).await?;

        let now = chrono::Utc::now().to_rfc3339();
        let user = match existing {
            Some(mut user) => {
                user.access_token = access_token.to_string();
                user.last_login = now;
                user
            }
            None => User::new(google_id, access_token, &now),
        };

        self.with_timeout(self.db.upsert_user(&user)).await?;

        tracing::info!(
            google_id,
            new_account = user.created_at == user.last_login,
            "Login upsert complete"
        );

        Ok(user)
    }

    /// Resolve a bearer token to its owning user record.
    ///
    /// Exactly one lookup by token equality. No match means
    /// unauthenticated, and so does a storage error (fail closed).
    pub async fn verify_bearer(&self, token: &str) -> Option<User> {
        if token.is_empty() {
            return None;
        }

        match self.db.find_user_by_token(token).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(error = %e, "Bearer lookup failed, treating as unauthenticated");
                None
            }
        }
    }

    async fn with_timeout<T>(
        &self,
        fut: impl Future<Output = Result<T, AppError>>,
    ) -> Result<T, AppError> {
        tokio::time::timeout(STORAGE_TIMEOUT, fut)
            .await
            .map_err(|_| AppError::Database("Storage operation timed out".to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_service() -> AccountService {
        AccountService::new(FirestoreDb::new_mock())
    }

    #[tokio::test]
    async fn test_login_upsert_fails_on_storage_error() {
        let accounts = offline_service();

        let err = accounts.login_upsert("ext-123", "tok-A").await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }

    #[tokio::test]
    async fn test_verify_bearer_fails_closed_on_storage_error() {
        let accounts = offline_service();

        assert!(accounts.verify_bearer("tok-A").await.is_none());
    }

    #[tokio::test]
    async fn test_verify_bearer_rejects_empty_token() {
        let accounts = offline_service();

        assert!(accounts.verify_bearer("").await.is_none());
    }
}
