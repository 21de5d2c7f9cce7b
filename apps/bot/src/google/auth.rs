//! Service-account OAuth for the Google REST APIs.
//!
//! A signed RS256 JWT assertion is exchanged for a bearer token at the
//! service account's token endpoint; tokens are cached until shortly before
//! expiry so concurrent Sheets/Drive calls share one token.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::Config;

/// Refresh this long before the reported expiry.
const EXPIRY_SLACK_SECS: i64 = 60;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("credentials error: {0}")]
    Credentials(String),

    #[error("JWT signing error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("token endpoint error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// The fields of a service-account key file the bot actually uses.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// Loads the key the way the config prefers: inline JSON from the
/// environment first, the credentials file otherwise.
pub fn load_service_account_key(config: &Config) -> Result<ServiceAccountKey, AuthError> {
    let raw = match &config.google_credentials_json {
        Some(inline) => inline.clone(),
        None => std::fs::read_to_string(&config.google_credentials_file).map_err(|e| {
            AuthError::Credentials(format!(
                "cannot read {}: {e}",
                config.google_credentials_file.display()
            ))
        })?,
    };
    serde_json::from_str(&raw).map_err(|e| AuthError::Credentials(format!("bad key JSON: {e}")))
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Issues and caches bearer tokens for one scope set.
pub struct TokenProvider {
    http: Client,
    key: ServiceAccountKey,
    scope: String,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    pub fn new(key: ServiceAccountKey, scope: &str) -> Self {
        Self {
            http: Client::new(),
            key,
            scope: scope.to_string(),
            cached: Mutex::new(None),
        }
    }

    /// A provider pre-loaded with a non-expiring token, for HTTP-client tests.
    #[cfg(test)]
    pub fn test_static(token: &str) -> Self {
        Self {
            http: Client::new(),
            key: ServiceAccountKey {
                client_email: "test@test".to_string(),
                private_key: String::new(),
                token_uri: String::new(),
            },
            scope: String::new(),
            cached: Mutex::new(Some(CachedToken {
                token: token.to_string(),
                expires_at: Utc::now() + Duration::hours(24),
            })),
        }
    }

    /// Returns a valid bearer token, fetching a fresh one when the cache is
    /// empty or about to expire.
    pub async fn bearer(&self) -> Result<String, AuthError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at - Duration::seconds(EXPIRY_SLACK_SECS) > Utc::now() {
                return Ok(token.token.clone());
            }
        }

        let fresh = self.fetch_token().await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }

    async fn fetch_token(&self) -> Result<CachedToken, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            iss: &self.key.client_email,
            scope: &self.scope,
            aud: &self.key.token_uri,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        let assertion = jsonwebtoken::encode(
            &Header::new(Algorithm::RS256),
            &claims,
            &EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())?,
        )?;

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AuthError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let token: TokenResponse = response.json().await?;
        debug!(
            "obtained google access token for {} (expires in {}s)",
            self.key.client_email, token.expires_in
        );
        Ok(CachedToken {
            token: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_deserializes_with_default_token_uri() {
        let key: ServiceAccountKey = serde_json::from_str(
            r#"{"client_email": "bot@project.iam.gserviceaccount.com", "private_key": "---"}"#,
        )
        .unwrap();
        assert_eq!(key.token_uri, "https://oauth2.googleapis.com/token");
    }

    #[test]
    fn test_key_rejects_missing_email() {
        let result: Result<ServiceAccountKey, _> =
            serde_json::from_str(r#"{"private_key": "---"}"#);
        assert!(result.is_err());
    }
}
