use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::error::QuoteError;

/// Renovation style from the remote catalog (`/services/categories/`).
///
/// The upstream API has drifted over time: some records carry `title`
/// instead of `name` and `price` instead of `pricePerSqm`. The aliases
/// absorb that drift at the decode boundary so the rest of the crate only
/// ever sees a typed `Style`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(alias = "title")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "pricePerSqm", alias = "price")]
    pub price_per_sqm: f64,
    #[serde(rename = "timeMultiplier", default = "default_multiplier")]
    pub time_multiplier: f64,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_multiplier() -> f64 {
    1.0
}

fn default_active() -> bool {
    true
}

/// How the customer pays for the renovation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Full,
    Installment,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Full => write!(f, "full"),
            PaymentMethod::Installment => write!(f, "installment"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(PaymentMethod::Full),
            "installment" => Ok(PaymentMethod::Installment),
            other => Err(QuoteError::ValidationError {
                field: "payment_method".to_string(),
                message: format!("unknown payment method '{}', expected 'full' or 'installment'", other),
            }),
        }
    }
}

/// A priced, dated renovation estimate. Immutable once computed; a new user
/// action produces a new quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub area_sqm: f64,
    pub style_id: String,
    pub style_name: String,
    pub total_cost: f64,
    pub estimated_days: u32,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installment_months: Option<u32>,
    pub created_at: DateTime<Utc>,
}

impl Quote {
    /// Equal monthly payment for installment quotes, rounded up to a whole
    /// unit of currency. `None` for full-payment quotes.
    pub fn monthly_payment(&self) -> Option<f64> {
        self.installment_months
            .map(|months| (self.total_cost / months as f64).ceil())
    }
}

/// A quote as kept in the bounded history list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteHistoryEntry {
    pub id: String,
    pub saved_at: DateTime<Utc>,
    #[serde(flatten)]
    pub quote: Quote,
}

/// One row of the financing comparison table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentOption {
    pub months: u32,
    pub monthly_payment: f64,
    pub total_amount: f64,
}

/// Payload for `POST /orders/`. Only these fields are accepted by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub phone: String,
    pub service: u32,
    pub address: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Completed,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

/// A submitted order as kept in the local order history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: String,
    #[serde(flatten)]
    pub request: OrderRequest,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installment_months: Option<u32>,
    #[serde(default)]
    pub status: OrderStatus,
    pub submitted_at: DateTime<Utc>,
}

/// Access/refresh bearer token pair. Owned by the session manager; UI code
/// never sees the raw tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub access: String,
    pub refresh: String,
}

/// Accepts both `"42"` and `42` for identifiers; the catalog and order
/// endpoints are not consistent about which they return.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(i64),
    }

    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_decodes_aliased_fields() {
        let json = serde_json::json!({
            "id": 3,
            "title": "Премиум",
            "price": 22000,
        });
        let style: Style = serde_json::from_value(json).unwrap();
        assert_eq!(style.id, "3");
        assert_eq!(style.name, "Премиум");
        assert_eq!(style.price_per_sqm, 22000.0);
        assert_eq!(style.time_multiplier, 1.0);
        assert!(style.features.is_empty());
        assert!(style.is_active);
    }

    #[test]
    fn style_decode_rejects_missing_price() {
        let json = serde_json::json!({ "id": "1", "name": "Стандарт" });
        assert!(serde_json::from_value::<Style>(json).is_err());
    }

    #[test]
    fn payment_method_round_trips_as_lowercase_string() {
        let json = serde_json::to_string(&PaymentMethod::Installment).unwrap();
        assert_eq!(json, "\"installment\"");
        assert_eq!("full".parse::<PaymentMethod>().unwrap(), PaymentMethod::Full);
        assert!("monthly".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn monthly_payment_rounds_up() {
        let quote = Quote {
            area_sqm: 50.0,
            style_id: "1".to_string(),
            style_name: "Стандарт".to_string(),
            total_cost: 100_000.0,
            estimated_days: 35,
            payment_method: PaymentMethod::Installment,
            installment_months: Some(7),
            created_at: Utc::now(),
        };
        // 100000 / 7 = 14285.71..., must round up
        assert_eq!(quote.monthly_payment(), Some(14286.0));
    }
}
