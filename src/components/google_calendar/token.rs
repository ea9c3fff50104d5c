use crate::config::Config;
use crate::error::{auth_error, SkillResult};
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// OAuth scope needed to read and write events
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
/// Lifetime requested for the signed assertion
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Tokens are refreshed this long before they expire
const EXPIRY_MARGIN_SECS: i64 = 60;

/// The fields of a Google service account key the skill needs
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    pub token_uri: String,
}

impl ServiceAccountKey {
    /// Read a key file as downloaded from the Google Cloud console
    pub fn from_file(path: &Path) -> SkillResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            auth_error(&format!(
                "Failed to read service account file {}: {}",
                path.display(),
                e
            ))
        })?;
        serde_json::from_str(&content)
            .map_err(|e| auth_error(&format!("Failed to parse service account JSON: {}", e)))
    }
}

/// Claims of the JWT assertion exchanged for an access token
#[derive(Debug, Serialize, PartialEq)]
pub struct Claims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn for_key(key: &ServiceAccountKey, issued_at: i64) -> Self {
        Self {
            iss: key.client_email.clone(),
            scope: CALENDAR_SCOPE.to_string(),
            aud: key.token_uri.clone(),
            exp: issued_at + ASSERTION_LIFETIME_SECS,
            iat: issued_at,
        }
    }
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

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: i64,
}

#[derive(Debug)]
enum TokenSource {
    Static(String),
    ServiceAccount(ServiceAccountKey),
}

/// Hands out bearer tokens for the Calendar API, kept in memory only
#[derive(Clone)]
pub struct TokenManager {
    source: Arc<TokenSource>,
    cached: Arc<RwLock<Option<CachedToken>>>,
    client: Client,
}

impl TokenManager {
    /// Use a fixed bearer token
    pub fn fixed(token: &str) -> Self {
        Self::with_source(TokenSource::Static(token.to_string()), Client::new())
    }

    /// Sign assertions with a service account key
    pub fn service_account(key: ServiceAccountKey, client: Client) -> Self {
        Self::with_source(TokenSource::ServiceAccount(key), client)
    }

    /// Pick the credential source described by the configuration
    pub fn from_config(config: &Config, client: Client) -> SkillResult<Self> {
        if let Some(token) = &config.google_access_token {
            info!("Using static Google access token");
            return Ok(Self::with_source(TokenSource::Static(token.clone()), client));
        }

        let key = ServiceAccountKey::from_file(Path::new(&config.service_account_file))?;
        info!("Using service account {}", key.client_email);
        Ok(Self::service_account(key, client))
    }

    fn with_source(source: TokenSource, client: Client) -> Self {
        Self {
            source: Arc::new(source),
            cached: Arc::new(RwLock::new(None)),
            client,
        }
    }

    /// Get a valid access token, refreshing it when close to expiry
    pub async fn get_token(&self) -> SkillResult<String> {
        let key = match self.source.as_ref() {
            TokenSource::Static(token) => return Ok(token.clone()),
            TokenSource::ServiceAccount(key) => key,
        };

        let now = Utc::now().timestamp();
        {
            let cached = self.cached.read().await;
            if let Some(token) = cached.as_ref() {
                if token.expires_at - EXPIRY_MARGIN_SECS > now {
                    return Ok(token.access_token.clone());
                }
            }
        }

        let mut cached = self.cached.write().await;
        // Another request may have refreshed while we waited for the lock
        if let Some(token) = cached.as_ref() {
            if token.expires_at - EXPIRY_MARGIN_SECS > now {
                return Ok(token.access_token.clone());
            }
        }

        let fresh = self.request_token(key, now).await?;
        let access_token = fresh.access_token.clone();
        *cached = Some(fresh);
        Ok(access_token)
    }

    /// Exchange a signed assertion for an access token
    async fn request_token(&self, key: &ServiceAccountKey, now: i64) -> SkillResult<CachedToken> {
        debug!("Requesting access token from {}", key.token_uri);

        let claims = Claims::for_key(key, now);
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)?;

        let response = self
            .client
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| auth_error(&format!("Failed to request access token: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(auth_error(&format!(
                "Failed to request access token: HTTP {} - {}",
                status, error_body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| auth_error(&format!("Failed to parse token response: {}", e)))?;

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: now + token.expires_in,
        })
    }
}
