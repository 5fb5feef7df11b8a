use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::model::{OrderRecord, Quote, QuoteHistoryEntry};
use crate::domain::ports::KeyValueStorage;
use crate::utils::error::Result;

pub const LAST_QUOTE_KEY: &str = "last_quote";
pub const QUOTE_HISTORY_KEY: &str = "quote_history";
pub const ORDER_HISTORY_KEY: &str = "order_history";
pub const SELECTED_SERVICE_KEY: &str = "selected_service";

/// Histories keep the ten most recent entries, newest first.
pub const HISTORY_CAPACITY: usize = 10;

/// Durable persistence for the last computed quote and the bounded
/// quote/order histories, shared between the calculator and financing flows.
///
/// The last-quote slot and the histories are independently keyed; saving one
/// never touches the other. Reads degrade to absence: corrupt or unreadable
/// stored data is logged and treated as if nothing was saved.
pub struct QuoteStore<S: KeyValueStorage> {
    storage: S,
}

impl<S: KeyValueStorage> QuoteStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub async fn save_last_quote(&self, quote: &Quote) -> Result<()> {
        let json = serde_json::to_string(quote)?;
        self.storage.set(LAST_QUOTE_KEY, &json).await
    }

    pub async fn load_last_quote(&self) -> Option<Quote> {
        self.load_slot(LAST_QUOTE_KEY).await
    }

    /// Prepends the quote to the history under a generated id, evicting the
    /// oldest entry once the capacity is reached.
    pub async fn append_quote_history(&self, quote: &Quote) -> Result<QuoteHistoryEntry> {
        let now = Utc::now();
        let entry = QuoteHistoryEntry {
            id: format!("calc_{}", now.timestamp_millis()),
            saved_at: now,
            quote: quote.clone(),
        };
        self.prepend_bounded(QUOTE_HISTORY_KEY, entry.clone()).await?;
        Ok(entry)
    }

    pub async fn load_quote_history(&self) -> Vec<QuoteHistoryEntry> {
        self.load_list(QUOTE_HISTORY_KEY).await
    }

    pub async fn append_order_history(&self, record: &OrderRecord) -> Result<()> {
        self.prepend_bounded(ORDER_HISTORY_KEY, record.clone()).await
    }

    pub async fn load_order_history(&self) -> Vec<OrderRecord> {
        self.load_list(ORDER_HISTORY_KEY).await
    }

    pub async fn save_selected_service(&self, service: &str) -> Result<()> {
        self.storage.set(SELECTED_SERVICE_KEY, service).await
    }

    pub async fn load_selected_service(&self) -> Option<String> {
        match self.storage.get(SELECTED_SERVICE_KEY).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Failed to read '{}': {}", SELECTED_SERVICE_KEY, e);
                None
            }
        }
    }

    async fn load_slot<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.storage.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Failed to read '{}': {}", key, e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Corrupt data under '{}', ignoring: {}", key, e);
                None
            }
        }
    }

    async fn load_list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        self.load_slot::<Vec<T>>(key).await.unwrap_or_default()
    }

    async fn prepend_bounded<T: Serialize + DeserializeOwned>(
        &self,
        key: &str,
        item: T,
    ) -> Result<()> {
        // A corrupt list starts over rather than blocking new saves.
        let mut items: Vec<T> = self.load_list(key).await;
        items.insert(0, item);
        items.truncate(HISTORY_CAPACITY);
        let json = serde_json::to_string(&items)?;
        self.storage.set(key, &json).await
    }
}
