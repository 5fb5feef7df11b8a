use chrono::Utc;

use crate::config::settings::PricingConfig;
use crate::domain::model::{InstallmentOption, PaymentMethod, Quote, Style};
use crate::utils::error::{QuoteError, Result};

/// Pure quote computation over (area, style, payment method, term).
///
/// No I/O and deterministic apart from the creation timestamp: the same
/// inputs always price to the same quote.
pub struct QuoteCalculator {
    pricing: PricingConfig,
}

impl QuoteCalculator {
    pub fn new(pricing: PricingConfig) -> Self {
        Self { pricing }
    }

    /// Prices a renovation of `area_sqm` square meters in the given style.
    ///
    /// Out-of-range area is rejected rather than clamped, so the customer
    /// never sees a price for an area they did not enter.
    /// `installment_months` is required for installment quotes and must be
    /// absent for full-payment quotes.
    pub fn compute_quote(
        &self,
        area_sqm: f64,
        style: &Style,
        payment_method: PaymentMethod,
        installment_months: Option<u32>,
    ) -> Result<Quote> {
        if !area_sqm.is_finite() || area_sqm <= 0.0 {
            return Err(QuoteError::ValidationError {
                field: "area".to_string(),
                message: "Area must be a positive number of square meters".to_string(),
            });
        }
        if area_sqm > self.pricing.max_area_sqm {
            return Err(QuoteError::ValidationError {
                field: "area".to_string(),
                message: format!(
                    "Area exceeds the supported maximum of {} m²",
                    self.pricing.max_area_sqm
                ),
            });
        }
        if style.price_per_sqm < 0.0 {
            return Err(QuoteError::ValidationError {
                field: "style".to_string(),
                message: format!("Style '{}' has a negative price per m²", style.id),
            });
        }
        if style.time_multiplier <= 0.0 {
            return Err(QuoteError::ValidationError {
                field: "style".to_string(),
                message: format!("Style '{}' has a non-positive time multiplier", style.id),
            });
        }

        let installment_months = match (payment_method, installment_months) {
            (PaymentMethod::Installment, Some(months)) if months >= 1 => Some(months),
            (PaymentMethod::Installment, Some(_)) => {
                return Err(QuoteError::ValidationError {
                    field: "installment_months".to_string(),
                    message: "Installment term must be at least one month".to_string(),
                })
            }
            (PaymentMethod::Installment, None) => {
                return Err(QuoteError::ValidationError {
                    field: "installment_months".to_string(),
                    message: "Installment payment requires a term in months".to_string(),
                })
            }
            (PaymentMethod::Full, Some(_)) => {
                return Err(QuoteError::ValidationError {
                    field: "installment_months".to_string(),
                    message: "Full payment does not take an installment term".to_string(),
                })
            }
            (PaymentMethod::Full, None) => None,
        };

        let mut total_cost = area_sqm * style.price_per_sqm;
        if payment_method == PaymentMethod::Full {
            total_cost *= 1.0 - self.pricing.full_payment_discount;
        }

        // Whole area blocks, then whole days.
        let blocks = (area_sqm / self.pricing.area_unit_sqm).ceil();
        let estimated_days =
            (blocks * self.pricing.days_per_unit * style.time_multiplier).ceil() as u32;

        Ok(Quote {
            area_sqm,
            style_id: style.id.clone(),
            style_name: style.name.clone(),
            total_cost,
            estimated_days,
            payment_method,
            installment_months,
            created_at: Utc::now(),
        })
    }

}

/// Financing comparison rows for every offered term. Installments carry no
/// markup, so the total is the same on each row.
pub fn installment_options(total_amount: f64, terms: &[u32]) -> Vec<InstallmentOption> {
    terms
        .iter()
        .filter(|months| **months >= 1)
        .map(|&months| InstallmentOption {
            months,
            monthly_payment: (total_amount / months as f64).ceil(),
            total_amount,
        })
        .collect()
}
