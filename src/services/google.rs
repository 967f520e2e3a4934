//! Google OAuth 2.0 client.
//!
//! Handles:
//! - Building the authorization redirect URL
//! - Exchanging the authorization code for an access token
//! - Fetching the userinfo profile for the stable subject id

use crate::error::AppError;
use anyhow::Context;
use serde::Deserialize;
use std::time::Duration;

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Timeout for all requests to Google. A provider call that never
/// returns must not stall the login request indefinitely.
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Google OAuth client.
pub struct GoogleAuthClient {
    http: reqwest::Client,
    auth_url: String,
    token_url: String,
    userinfo_url: String,
    client_id: String,
    client_secret: String,
}

impl GoogleAuthClient {
    /// Create a new client with OAuth credentials.
    pub fn new(client_id: String, client_secret: String) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("failed building Google OAuth HTTP client")?;

        Ok(Self {
            http,
            auth_url: AUTH_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
            userinfo_url: USERINFO_URL.to_string(),
            client_id,
            client_secret,
        })
    }

    /// Create a client pointed at custom endpoints, for tests.
    pub fn new_with_base_urls(
        client_id: String,
        client_secret: String,
        auth_url: String,
        token_url: String,
        userinfo_url: String,
    ) -> anyhow::Result<Self> {
        let mut client = Self::new(client_id, client_secret)?;
        client.auth_url = auth_url;
        client.token_url = token_url;
        client.userinfo_url = userinfo_url;
        Ok(client)
    }

    /// Build the authorization redirect URL for the login flow.
    pub fn authorize_url(&self, callback_url: &str, state: &str) -> String {
        format!(
            "{}?\
             client_id={}&\
             redirect_uri={}&\
             response_type=code&\
             scope=openid%20profile&\
             state={}",
            self.auth_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(callback_url),
            state
        )
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<GoogleTokenResponse, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AppError::GoogleApi(format!("Token exchange failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Google token exchange failed");
            return Err(AppError::GoogleApi(format!(
                "Token exchange failed with status {}",
                status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::GoogleApi(format!("Failed to parse token response: {}", e)))
    }

    /// Fetch the userinfo profile for an access token.
    ///
    /// The `sub` claim is the stable subject id that keys user records.
    pub async fn fetch_profile(&self, access_token: &str) -> Result<GoogleProfile, AppError> {
        let response = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::GoogleApi(format!("Userinfo request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Google userinfo request failed");
            return Err(AppError::GoogleApi(format!(
                "Userinfo request failed with status {}",
                status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::GoogleApi(format!("Failed to parse userinfo: {}", e)))
    }
}

/// Token exchange response from Google OAuth.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// Userinfo profile returned by Google.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    /// Stable subject id for this Google account
    pub sub: String,
    #[serde(default)]
    pub name: Option<String>,
}
