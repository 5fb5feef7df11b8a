use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Client, Request, Response, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::domain::model::Credentials;
use crate::domain::ports::KeyValueStorage;
use crate::utils::error::{QuoteError, Result};

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

const REFRESH_ENDPOINT: &str = "auth/token/refresh/";

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
    /// Present only when the server rotates the refresh token.
    refresh: Option<String>,
}

/// Owns the access/refresh credential pair and drives the renewal protocol.
///
/// Every authenticated request goes through [`execute`](Self::execute), which
/// walks one request through the states Initial → Renewing → Retried / Failed:
/// a 401 triggers at most one token renewal and one retry; a second 401 is
/// propagated to the caller unchanged. Renewal failure clears the stored
/// credentials and surfaces [`QuoteError::SessionExpired`], the crate's
/// equivalent of redirecting the browser session to the login page.
pub struct SessionManager<S: KeyValueStorage> {
    client: Client,
    refresh_url: Url,
    storage: S,
}

impl<S: KeyValueStorage> SessionManager<S> {
    pub fn new(client: Client, base_url: &Url, storage: S) -> Result<Self> {
        let mut base = base_url.clone();
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        let refresh_url = base.join(REFRESH_ENDPOINT)?;
        Ok(Self {
            client,
            refresh_url,
            storage,
        })
    }

    pub async fn access_token(&self) -> Option<String> {
        self.token(ACCESS_TOKEN_KEY).await
    }

    pub async fn refresh_token(&self) -> Option<String> {
        self.token(REFRESH_TOKEN_KEY).await
    }

    async fn token(&self, key: &str) -> Option<String> {
        match self.storage.get(key).await {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!("Failed to read '{}': {}", key, e);
                None
            }
        }
    }

    /// Persists both tokens, overwriting any prior pair.
    pub async fn save_credentials(&self, credentials: &Credentials) -> Result<()> {
        self.storage.set(ACCESS_TOKEN_KEY, &credentials.access).await?;
        self.storage
            .set(REFRESH_TOKEN_KEY, &credentials.refresh)
            .await
    }

    pub async fn clear_credentials(&self) -> Result<()> {
        self.storage.remove(ACCESS_TOKEN_KEY).await?;
        self.storage.remove(REFRESH_TOKEN_KEY).await
    }

    /// Sets the bearer authorization header if an access token is stored;
    /// otherwise leaves the request unauthenticated.
    pub async fn attach_authorization(&self, request: &mut Request) -> Result<()> {
        if let Some(token) = self.access_token().await {
            set_bearer(request, &token)?;
        }
        Ok(())
    }

    /// Sends the request with authorization attached, renewing the access
    /// token at most once on a 401.
    pub async fn execute(&self, mut request: Request) -> Result<Response> {
        let retry = request.try_clone();
        self.attach_authorization(&mut request).await?;

        let response = self.client.execute(request).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let Some(refresh_token) = self.refresh_token().await else {
            tracing::debug!("401 without a refresh token, propagating");
            return Ok(response);
        };
        let Some(mut retry) = retry else {
            tracing::warn!("401 on a request with a non-cloneable body, propagating");
            return Ok(response);
        };

        tracing::debug!("Access token rejected, renewing session");
        let credentials = match self.renew(&refresh_token).await {
            Ok(credentials) => credentials,
            Err(e) => {
                tracing::warn!("Token renewal failed: {}", e);
                self.clear_credentials().await?;
                return Err(QuoteError::SessionExpired);
            }
        };
        self.save_credentials(&credentials).await?;

        set_bearer(&mut retry, &credentials.access)?;
        // One retry only; a second 401 goes back to the caller as-is.
        let retried = self.client.execute(retry).await?;
        Ok(retried)
    }

    async fn renew(&self, refresh_token: &str) -> Result<Credentials> {
        let response = self
            .client
            .post(self.refresh_url.clone())
            .json(&serde_json::json!({ "refresh": refresh_token }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(QuoteError::UnexpectedStatus {
                status: response.status().as_u16(),
                endpoint: REFRESH_ENDPOINT.to_string(),
            });
        }

        let payload: RefreshResponse = response.json().await?;
        Ok(Credentials {
            access: payload.access,
            refresh: payload
                .refresh
                .unwrap_or_else(|| refresh_token.to_string()),
        })
    }
}

fn set_bearer(request: &mut Request, token: &str) -> Result<()> {
    let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
        QuoteError::ValidationError {
            field: "authorization".to_string(),
            message: "Access token contains characters not valid in a header".to_string(),
        }
    })?;
    request.headers_mut().insert(AUTHORIZATION, value);
    Ok(())
}
