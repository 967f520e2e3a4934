//! Vocab-Quiz API Server
//!
//! Serves the vocabulary quiz client and its REST API: Google OAuth
//! login, user progress tracking, and vocabulary storage in Firestore.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vocab_quiz::{
    config::Config,
    db::FirestoreDb,
    services::{AccountService, GoogleAuthClient},
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Vocab-Quiz API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Initialize Google OAuth client
    let google = GoogleAuthClient::new(
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
    )
    .expect("Failed to initialize Google OAuth client");

    // Account service owns the login upsert and bearer lookups
    let accounts = AccountService::new(db.clone());

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        google,
        accounts,
    });

    // Build router
    let app = vocab_quiz::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vocab_quiz=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
