//! Vocab-Quiz API Server
//!
//! Backend for a vocabulary quiz web application: Google OAuth login
//! with a bearer-token cookie, quiz progress tracking, and vocabulary
//! CRUD backed by Firestore.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::FirestoreDb;
use services::{AccountService, GoogleAuthClient};

/// Shared application state.
///
/// Built once at startup and passed to every handler and filter; there
/// is no ambient process-level state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub google: GoogleAuthClient,
    pub accounts: AccountService,
}
