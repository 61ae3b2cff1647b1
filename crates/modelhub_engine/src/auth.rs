//! Two-legged credential exchange with the backend.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::BackendError;

/// Scopes the server uses for storage and translation operations.
pub const INTERNAL_SCOPE: &[&str] = &[
    "bucket:create",
    "bucket:read",
    "bucket:delete",
    "data:read",
    "data:write",
    "data:create",
];

/// Scope handed to the browser viewer; read-only access to viewables.
pub const PUBLIC_SCOPE: &[&str] = &["viewables:read"];

/// Tokens are considered stale this many seconds before they expire.
const EXPIRY_MARGIN_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub expires_in: u64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: AccessToken,
    acquired: Instant,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        self.acquired.elapsed().as_secs() + EXPIRY_MARGIN_SECS < self.token.expires_in
    }
}

/// Client-credentials token client with a per-scope cache.
#[derive(Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    cache: Arc<Mutex<HashMap<String, CachedToken>>>,
}

impl AuthClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns a token carrying `scope`, exchanging credentials only when
    /// the cached one is missing or about to expire.
    ///
    /// The lock is not held across the exchange, so a slow exchange for one
    /// scope never stalls requests for another. Concurrent misses for the
    /// same scope may each exchange; the last insert wins.
    pub async fn token(&self, scope: &[&str]) -> Result<AccessToken, BackendError> {
        let scope_key = scope.join(" ");
        {
            let cache = self.cache.lock().await;
            if let Some(cached) = cache.get(&scope_key) {
                if cached.is_fresh() {
                    return Ok(cached.token.clone());
                }
            }
        }

        let token = self.exchange(&scope_key).await?;
        let mut cache = self.cache.lock().await;
        cache.insert(
            scope_key,
            CachedToken {
                token: token.clone(),
                acquired: Instant::now(),
            },
        );
        Ok(token)
    }

    async fn exchange(&self, scope: &str) -> Result<AccessToken, BackendError> {
        let response = self
            .http
            .post(format!("{}/authentication/v2/token", self.base_url))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", &self.client_id),
                ("client_secret", &self.client_secret),
                ("scope", scope),
            ])
            .send()
            .await
            .map_err(BackendError::transport)?;

        if !response.status().is_success() {
            return Err(BackendError::from_response(response).await);
        }
        response.json().await.map_err(BackendError::transport)
    }
}
