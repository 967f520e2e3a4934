//! Bearer-token authentication middleware.
//!
//! The token is an opaque string minted at login; verifying it is a
//! single storage lookup, not a signature check. A token stays valid
//! until the next login for the same identity rotates it.

use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::models::User;

/// Cookie carrying the bearer token. The client script reads this
/// cookie directly, so it is deliberately not HttpOnly.
pub const AUTH_COOKIE: &str = "accessToken";

/// Authenticated user attached to the request after the bearer filter.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
}

/// Middleware that requires a valid bearer token.
///
/// Tries the `accessToken` cookie first, then the Authorization header.
/// Unknown tokens and storage failures both reject with 401.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = if let Some(cookie) = jar.get(AUTH_COOKIE) {
        cookie.value().to_string()
    } else {
        let auth_header = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        match auth_header {
            Some(h) if h.starts_with("Bearer ") => h[7..].to_string(),
            _ => return Err(StatusCode::UNAUTHORIZED),
        }
    };

    let user = state
        .accounts
        .verify_bearer(&token)
        .await
        .ok_or(StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(AuthUser { user });

    Ok(next.run(request).await)
}
