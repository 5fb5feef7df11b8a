use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

use crate::config::settings::ApiConfig;
use crate::core::session::SessionManager;
use crate::domain::model::{string_or_number, Credentials, OrderRequest, Style};
use crate::domain::ports::KeyValueStorage;
use crate::utils::error::{QuoteError, Result};

const STYLES_ENDPOINT: &str = "services/categories/";
const ORDERS_ENDPOINT: &str = "orders/";
const LOGIN_ENDPOINT: &str = "auth/login/";

#[derive(Debug, Deserialize)]
struct OrderCreated {
    #[serde(deserialize_with = "string_or_number")]
    id: String,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access: String,
    refresh: String,
}

/// Typed client for the renovation API. All authenticated traffic runs
/// through the owned [`SessionManager`], so callers never deal with tokens
/// or 401 renewals themselves.
pub struct ApiClient<S: KeyValueStorage> {
    base_url: Url,
    client: Client,
    session: SessionManager<S>,
}

impl<S: KeyValueStorage> ApiClient<S> {
    pub fn new(config: &ApiConfig, storage: S) -> Result<Self> {
        let mut base_url = Url::parse(&config.base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        let session = SessionManager::new(client.clone(), &base_url, storage)?;
        Ok(Self {
            base_url,
            client,
            session,
        })
    }

    pub fn session(&self) -> &SessionManager<S> {
        &self.session
    }

    /// Fetches the styles catalog. Records that fail to decode are skipped
    /// with a warning so one drifted record upstream does not empty the
    /// calculator; transport failures and non-2xx statuses still error.
    pub async fn fetch_styles(&self) -> Result<Vec<Style>> {
        let url = self.base_url.join(STYLES_ENDPOINT)?;
        tracing::debug!("Fetching styles catalog from {}", url);
        let request = self.client.get(url).build()?;
        let response = self.session.execute(request).await?;

        if !response.status().is_success() {
            return Err(QuoteError::UnexpectedStatus {
                status: response.status().as_u16(),
                endpoint: STYLES_ENDPOINT.to_string(),
            });
        }

        let raw: Vec<serde_json::Value> = response.json().await?;
        let mut styles = Vec::with_capacity(raw.len());
        for value in raw {
            match serde_json::from_value::<Style>(value) {
                Ok(style) => styles.push(style),
                Err(e) => tracing::warn!("Skipping malformed catalog record: {}", e),
            }
        }
        tracing::debug!("Catalog returned {} usable styles", styles.len());
        Ok(styles)
    }

    /// Submits an order and returns the created order id. Field-level
    /// validation errors from the server come back as
    /// [`QuoteError::OrderRejected`] with the messages verbatim.
    pub async fn submit_order(&self, order: &OrderRequest) -> Result<String> {
        let url = self.base_url.join(ORDERS_ENDPOINT)?;
        tracing::debug!("Submitting order to {}", url);
        let request = self.client.post(url).json(order).build()?;
        let response = self.session.execute(request).await?;

        let status = response.status();
        if status == StatusCode::OK || status == StatusCode::CREATED {
            let created: OrderCreated = response.json().await?;
            tracing::info!("Order {} accepted", created.id);
            return Ok(created.id);
        }

        if status.is_client_error() {
            if let Some(fields) = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|body| parse_field_errors(&body))
            {
                return Err(QuoteError::OrderRejected { fields });
            }
        }

        Err(QuoteError::UnexpectedStatus {
            status: status.as_u16(),
            endpoint: ORDERS_ENDPOINT.to_string(),
        })
    }

    /// Exchanges credentials for a token pair and stores it in the session.
    pub async fn login(&self, phone: &str, password: &str) -> Result<()> {
        let url = self.base_url.join(LOGIN_ENDPOINT)?;
        let response = self
            .client
            .post(url)
            .json(&serde_json::json!({ "phone": phone, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(QuoteError::UnexpectedStatus {
                status: response.status().as_u16(),
                endpoint: LOGIN_ENDPOINT.to_string(),
            });
        }

        let payload: LoginResponse = response.json().await?;
        self.session
            .save_credentials(&Credentials {
                access: payload.access,
                refresh: payload.refresh,
            })
            .await
    }

    pub async fn logout(&self) -> Result<()> {
        self.session.clear_credentials().await
    }
}

/// Django-style validation bodies: an object mapping field names to one
/// message or a list of messages. Anything else is not a field-error body.
fn parse_field_errors(body: &serde_json::Value) -> Option<BTreeMap<String, Vec<String>>> {
    let object = body.as_object()?;
    let mut fields = BTreeMap::new();
    for (name, value) in object {
        let messages = match value {
            serde_json::Value::String(message) => vec![message.clone()],
            serde_json::Value::Array(items) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            _ => continue,
        };
        if !messages.is_empty() {
            fields.insert(name.clone(), messages);
        }
    }
    if fields.is_empty() {
        None
    } else {
        Some(fields)
    }
}
