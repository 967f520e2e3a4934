//! Services module - business logic layer.

pub mod account;
pub mod google;

pub use account::AccountService;
pub use google::{GoogleAuthClient, GoogleProfile};
