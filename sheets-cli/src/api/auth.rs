//! Service-account authentication for the Google APIs
//!
//! The key file is loaded and the scopes are bound once, when the
//! `AuthManager` is constructed. Access tokens are obtained with the JWT
//! bearer grant on first use and cached until they are about to expire.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::Mutex;

use super::constants::{
    ASSERTION_LIFETIME_SECS, DEFAULT_TOKEN_URI, JWT_BEARER_GRANT, TOKEN_EXPIRY_MARGIN_SECS,
};
use super::error::ApiError;

/// The fields of a Google service-account JSON key that the token flow needs
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self, ApiError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ApiError::Auth(format!(
                "failed to read credentials file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ApiError> {
        serde_json::from_str(content)
            .map_err(|e| ApiError::Auth(format!("invalid service account key: {}", e)))
    }
}

/// An access token and the instant it stops being valid
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl TokenInfo {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(TOKEN_EXPIRY_MARGIN_SECS) >= self.expires_at
    }
}

/// Claims of the signed assertion exchanged for an access token
#[derive(Debug, Serialize, PartialEq, Eq)]
pub(crate) struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

/// Owns the service-account identity and the cached access token
pub struct AuthManager {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    scopes: Vec<String>,
    token: Mutex<Option<TokenInfo>>,
}

impl AuthManager {
    /// Bind a parsed key to a scope list. Fails if the private key is not valid PEM.
    pub fn new(key: ServiceAccountKey, scopes: Vec<String>) -> Result<Self, ApiError> {
        if scopes.is_empty() {
            return Err(ApiError::Auth("at least one OAuth scope is required".to_string()));
        }
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| ApiError::Auth(format!("invalid private key: {}", e)))?;

        Ok(Self {
            key,
            encoding_key,
            scopes,
            token: Mutex::new(None),
        })
    }

    pub fn from_service_account_file(path: &Path, scopes: Vec<String>) -> Result<Self, ApiError> {
        let key = ServiceAccountKey::from_file(path)?;
        Self::new(key, scopes)
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Return a valid access token, exchanging a fresh assertion if the cached one expired
    pub async fn access_token(&self, http: &reqwest::Client) -> Result<String, ApiError> {
        let mut cached = self.token.lock().await;
        let now = Utc::now();

        if let Some(token) = cached.as_ref() {
            if !token.is_expired(now) {
                return Ok(token.access_token.clone());
            }
            debug!("Access token for {} expired, refreshing", self.key.client_email);
        }

        let token = self.fetch_token(http, now).await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    async fn fetch_token(
        &self,
        http: &reqwest::Client,
        now: DateTime<Utc>,
    ) -> Result<TokenInfo, ApiError> {
        let assertion = self.sign_assertion(now)?;

        debug!("Requesting access token from {}", self.key.token_uri);
        let response = http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match ApiError::from_status(status, &body) {
                ApiError::Transient(msg) => ApiError::Transient(msg),
                _ => ApiError::Auth(format!("token exchange failed: {} {}", status, body.trim())),
            });
        }

        let body: TokenResponse = response.json().await?;
        Ok(TokenInfo {
            access_token: body.access_token,
            expires_at: now + Duration::seconds(body.expires_in),
        })
    }

    fn sign_assertion(&self, now: DateTime<Utc>) -> Result<String, ApiError> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        let claims = build_claims(&self.key, &self.scopes, now);
        jsonwebtoken::encode(&header, &claims, &self.encoding_key)
            .map_err(|e| ApiError::Auth(format!("failed to sign assertion: {}", e)))
    }
}

pub(crate) fn build_claims(
    key: &ServiceAccountKey,
    scopes: &[String],
    now: DateTime<Utc>,
) -> AssertionClaims {
    let iat = now.timestamp();
    AssertionClaims {
        iss: key.client_email.clone(),
        scope: scopes.join(" "),
        aud: key.token_uri.clone(),
        iat,
        exp: iat + ASSERTION_LIFETIME_SECS,
    }
}
