use std::sync::Arc;
use vocab_quiz::config::Config;
use vocab_quiz::db::FirestoreDb;
use vocab_quiz::routes::create_router;
use vocab_quiz::services::{AccountService, GoogleAuthClient};
use vocab_quiz::AppState;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test app over the given database.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_app_with_db(db: FirestoreDb) -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();

    let google = GoogleAuthClient::new(
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
    )
    .expect("Failed to build Google OAuth client");

    let accounts = AccountService::new(db.clone());

    let state = Arc::new(AppState {
        config,
        db,
        google,
        accounts,
    });

    (create_router(state.clone()), state)
}

/// Create a test app with offline mock dependencies.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_app_with_db(test_db_offline())
}
