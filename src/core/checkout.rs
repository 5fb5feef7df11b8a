use chrono::{Duration, NaiveDate};

use crate::config::settings::{FinancingConfig, PricingConfig};
use crate::core::calculator::installment_options;
use crate::domain::model::{InstallmentOption, OrderRequest, PaymentMethod, Quote};
use crate::utils::error::{QuoteError, Result};
use crate::utils::validation::{validate_date_order, validate_phone, validate_required_input};

/// Named states of the financing checkout, replacing the numeric wizard
/// step counter of the original flow.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutState {
    SelectingPayment,
    ChoosingTerm,
    FillingDetails {
        payment_method: PaymentMethod,
        installment_months: Option<u32>,
    },
    Submitted {
        order_id: String,
    },
}

/// What the customer types into the order form. Dates left empty are
/// defaulted from the saved quote's estimated duration.
#[derive(Debug, Clone, Default)]
pub struct OrderDetails {
    pub phone: String,
    pub address: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub comments: Option<String>,
}

/// Finite-state machine for the financing checkout:
/// SelectingPayment → (ChoosingTerm, installment only) → FillingDetails →
/// Submitted. Transitions out of order are rejected, never silently fixed.
///
/// The flow is pure: it validates and builds the [`OrderRequest`], while the
/// actual submission happens at the API boundary and is reported back via
/// [`complete`](Self::complete).
pub struct CheckoutFlow {
    pricing: PricingConfig,
    financing: FinancingConfig,
    saved_quote: Option<Quote>,
    state: CheckoutState,
}

impl CheckoutFlow {
    pub fn new(
        pricing: PricingConfig,
        financing: FinancingConfig,
        saved_quote: Option<Quote>,
    ) -> Self {
        Self {
            pricing,
            financing,
            saved_quote,
            state: CheckoutState::SelectingPayment,
        }
    }

    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    pub fn saved_quote(&self) -> Option<&Quote> {
        self.saved_quote.as_ref()
    }

    /// Amount being financed: the saved quote's total, or the configured
    /// fallback when the customer arrived without calculating first.
    pub fn total_amount(&self) -> f64 {
        self.saved_quote
            .as_ref()
            .map(|q| q.total_cost)
            .unwrap_or(self.financing.fallback_total)
    }

    pub fn installment_options(&self) -> Vec<InstallmentOption> {
        installment_options(self.total_amount(), &self.financing.installment_terms)
    }

    pub fn select_payment(&mut self, method: PaymentMethod) -> Result<()> {
        if self.state != CheckoutState::SelectingPayment {
            return Err(self.invalid_transition("select_payment"));
        }
        self.state = match method {
            PaymentMethod::Full => CheckoutState::FillingDetails {
                payment_method: PaymentMethod::Full,
                installment_months: None,
            },
            PaymentMethod::Installment => CheckoutState::ChoosingTerm,
        };
        Ok(())
    }

    pub fn choose_term(&mut self, months: u32) -> Result<()> {
        if self.state != CheckoutState::ChoosingTerm {
            return Err(self.invalid_transition("choose_term"));
        }
        if !self.financing.installment_terms.contains(&months) {
            return Err(QuoteError::ValidationError {
                field: "installment_months".to_string(),
                message: format!(
                    "Term of {} months is not offered (available: {:?})",
                    months, self.financing.installment_terms
                ),
            });
        }
        self.state = CheckoutState::FillingDetails {
            payment_method: PaymentMethod::Installment,
            installment_months: Some(months),
        };
        Ok(())
    }

    /// Validates the form and builds the order payload. Only legal while
    /// filling details; validation failures keep the state unchanged so the
    /// customer can correct the form and try again.
    pub fn order_request(&self, details: &OrderDetails, today: NaiveDate) -> Result<OrderRequest> {
        let CheckoutState::FillingDetails { .. } = self.state else {
            return Err(self.invalid_transition("order_request"));
        };

        validate_required_input("phone", &details.phone)?;
        validate_phone("phone", &details.phone)?;
        validate_required_input("address", &details.address)?;

        let start_date = details.start_date.unwrap_or(today);
        let duration_days = self
            .saved_quote
            .as_ref()
            .map(|q| q.estimated_days)
            .unwrap_or(self.pricing.default_duration_days);
        let end_date = details
            .end_date
            .unwrap_or(start_date + Duration::days(duration_days as i64));
        validate_date_order(start_date, end_date)?;

        Ok(OrderRequest {
            phone: details.phone.trim().to_string(),
            service: self.pricing.service_id,
            address: details.address.trim().to_string(),
            start_date,
            end_date,
        })
    }

    /// Records the server-assigned order id after a successful submission.
    pub fn complete(&mut self, order_id: String) -> Result<()> {
        let CheckoutState::FillingDetails { .. } = self.state else {
            return Err(self.invalid_transition("complete"));
        };
        self.state = CheckoutState::Submitted { order_id };
        Ok(())
    }

    /// Payment selection carried by the current state, if already made.
    pub fn payment_selection(&self) -> Option<(PaymentMethod, Option<u32>)> {
        match &self.state {
            CheckoutState::FillingDetails {
                payment_method,
                installment_months,
            } => Some((*payment_method, *installment_months)),
            _ => None,
        }
    }

    fn invalid_transition(&self, operation: &str) -> QuoteError {
        QuoteError::ValidationError {
            field: "checkout".to_string(),
            message: format!("'{}' is not allowed in state {:?}", operation, self.state),
        }
    }
}
