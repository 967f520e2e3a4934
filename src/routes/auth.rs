//! Google OAuth authentication routes.
//!
//! The callback is the only place a bearer token is minted: a verified
//! identity plus a fresh access grant flows through the account upsert,
//! and the grant comes back to the browser in the `accessToken` cookie.
//! Every failure inside the flow collapses to a redirect to `/` with no
//! cookie set.

use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::get,
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{AppError, Result};
use crate::middleware::auth::AUTH_COOKIE;
use crate::AppState;

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/google", get(auth_start))
        .route("/api/auth/google/callback", get(auth_callback))
        .route("/api/auth/logout", get(logout))
}

/// Start OAuth flow - redirect to Google authorization.
async fn auth_start(
    State(state): State<Arc<AppState>>,
    headers: axum::http::HeaderMap,
) -> Result<Redirect> {
    let oauth_state = sign_state(&state.config.oauth_state_key)?;
    let callback_url = callback_url_from_headers(&headers);

    let auth_url = state.google.authorize_url(&callback_url, &oauth_state);

    tracing::info!(
        client_id = %state.config.google_client_id,
        "Starting OAuth flow, redirecting to Google"
    );

    Ok(Redirect::temporary(&auth_url))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - exchange code, upsert the account, set the cookie.
///
/// On success the browser gets the fresh bearer token in the
/// `accessToken` cookie and lands on `/`. On any failure (denied
/// authorization, tampered state, provider or storage error) the
/// browser lands on `/` with no cookie.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    headers: axum::http::HeaderMap,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> (CookieJar, Redirect) {
    let failure = Redirect::temporary("/");

    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from Google");
        return (jar, failure);
    }

    let oauth_state = params.state.unwrap_or_default();
    if !verify_state(&oauth_state, &state.config.oauth_state_key) {
        tracing::warn!("Invalid or tampered OAuth state parameter");
        return (jar, failure);
    }

    let code = match params.code {
        Some(code) if !code.is_empty() => code,
        _ => {
            tracing::warn!("OAuth callback missing authorization code");
            return (jar, failure);
        }
    };

    let callback_url = callback_url_from_headers(&headers);

    let user = match run_login(&state, &code, &callback_url).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(error = %e, "Login flow failed");
            return (jar, failure);
        }
    };

    tracing::info!(google_id = %user.google_id, "Login successful, setting cookie");

    // Session cookie, readable by the client script (not HttpOnly): the
    // SPA reads the token from this cookie and echoes it on API calls.
    let cookie = Cookie::build((AUTH_COOKIE, user.access_token.clone()))
        .path("/")
        .same_site(SameSite::Lax)
        .build();

    (jar.add(cookie), Redirect::temporary("/"))
}

/// The provider exchange and account upsert as one sequential chain.
async fn run_login(
    state: &Arc<AppState>,
    code: &str,
    callback_url: &str,
) -> Result<crate::models::User> {
    let token_response = state.google.exchange_code(code, callback_url).await?;
    let profile = state.google.fetch_profile(&token_response.access_token).await?;

    state
        .accounts
        .login_upsert(&profile.sub, &token_response.access_token)
        .await
}

/// Logout - clear the token cookie and return to the landing page.
///
/// The token itself is not invalidated server-side; it stays valid
/// until the next login rotates it.
async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    let removal = Cookie::build((AUTH_COOKIE, "")).path("/").build();
    (jar.remove(removal), Redirect::temporary("/"))
}

/// Derive the OAuth callback URL from the request Host header.
fn callback_url_from_headers(headers: &axum::http::HeaderMap) -> String {
    let host = headers
        .get(axum::http::header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost:8080");

    let scheme = if host.contains("localhost") || host.contains("127.0.0.1") {
        "http"
    } else {
        "https"
    };

    format!("{}://{}/api/auth/google/callback", scheme, host)
}

/// Build a signed OAuth state parameter: "timestamp_hex|signature_hex",
/// base64-encoded for the URL.
fn sign_state(secret: &[u8]) -> Result<String> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_millis();

    let payload = format!("{:x}", timestamp);

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(payload.as_bytes());
    let signature = mac.finalize().into_bytes();

    let signed = format!("{}|{}", payload, hex::encode(signature));
    Ok(URL_SAFE_NO_PAD.encode(signed.as_bytes()))
}

/// Verify the HMAC signature on an OAuth state parameter.
fn verify_state(state: &str, secret: &[u8]) -> bool {
    let Ok(bytes) = URL_SAFE_NO_PAD.decode(state) else {
        return false;
    };
    let Ok(state_str) = String::from_utf8(bytes) else {
        return false;
    };

    // Format is "timestamp_hex|signature_hex"
    let parts: Vec<&str> = state_str.splitn(2, '|').collect();
    if parts.len() != 2 {
        return false;
    }

    let payload = parts[0];
    let signature_hex = parts[1];

    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(payload.as_bytes());

    let expected_signature = hex::encode(mac.finalize().into_bytes());

    if signature_hex != expected_signature {
        tracing::error!("OAuth state signature mismatch! Potential tampering.");
        return false;
    }

    true
}
