//! # Checkout / Payment Validator
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ┌──────┐ select_method ┌────────────────┐ enter_amount ┌─────────────┐ │
//! │   │ Idle │──────────────►│ MethodSelected │─────────────►│AmountEntered│ │
//! │   └──────┘               └────────────────┘              └──────┬──────┘ │
//! │      ▲                          ▲  select_method                │submit  │
//! │      │ cancel (any state)       └───────────────┐     ┌─────────┴──┐     │
//! │      │                                          │     ▼            ▼     │
//! │      │                                     ┌──────────┐     ┌──────────┐ │
//! │      └─────────────────────────────────────│ Rejected │     │ Accepted │ │
//! │                                            └────┬─────┘     └──────────┘ │
//! │                               enter_amount ─────┘ (corrected amount)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The flow never touches the cart. Building the sale record and clearing
//! the cart (in that order) is the caller's job once `submit` accepts.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::pricing;
use crate::types::Tender;
use crate::validation;

/// A tender plus the amount handed over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentAttempt {
    pub tender: Tender,
    pub tendered: Money,
}

/// A payment that covered the total it was submitted against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AcceptedPayment {
    pub tender: Tender,
    pub tendered: Money,
    /// The grand total the payment was accepted against.
    pub total: Money,
    pub change: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CheckoutState {
    Idle,
    MethodSelected {
        tender: Tender,
    },
    AmountEntered {
        attempt: PaymentAttempt,
    },
    Accepted {
        payment: AcceptedPayment,
    },
    Rejected {
        attempt: PaymentAttempt,
        total: Money,
    },
}

impl CheckoutState {
    pub fn name(&self) -> &'static str {
        match self {
            CheckoutState::Idle => "idle",
            CheckoutState::MethodSelected { .. } => "awaiting an amount",
            CheckoutState::AmountEntered { .. } => "ready to submit",
            CheckoutState::Accepted { .. } => "accepted",
            CheckoutState::Rejected { .. } => "rejected",
        }
    }
}

/// One checkout attempt for the active cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutFlow {
    state: CheckoutState,
}

impl Default for CheckoutFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutFlow {
    pub fn new() -> Self {
        CheckoutFlow {
            state: CheckoutState::Idle,
        }
    }

    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, CheckoutState::Idle)
    }

    /// The tender chosen so far, if any.
    pub fn tender(&self) -> Option<&Tender> {
        match &self.state {
            CheckoutState::Idle => None,
            CheckoutState::MethodSelected { tender } => Some(tender),
            CheckoutState::AmountEntered { attempt } | CheckoutState::Rejected { attempt, .. } => {
                Some(&attempt.tender)
            }
            CheckoutState::Accepted { payment } => Some(&payment.tender),
        }
    }

    /// Picks (or re-picks) the payment method.
    ///
    /// Re-selecting from `AmountEntered` or `Rejected` discards the amount.
    pub fn select_method(&mut self, tender: Tender, cart: &Cart) -> CoreResult<()> {
        if let CheckoutState::Accepted { .. } = self.state {
            return Err(self.wrong_state("select a payment method"));
        }
        if cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        self.state = CheckoutState::MethodSelected { tender };
        Ok(())
    }

    /// Records the tendered amount.
    ///
    /// ## Rules
    /// - A method must already be selected (a rejected attempt counts)
    /// - `tendered ≥ 0`
    /// - Mobile money needs a well-formed phone number and a provider
    pub fn enter_amount(&mut self, tendered: Money) -> CoreResult<()> {
        let tender = match &self.state {
            CheckoutState::MethodSelected { tender } => tender.clone(),
            CheckoutState::AmountEntered { attempt } | CheckoutState::Rejected { attempt, .. } => {
                attempt.tender.clone()
            }
            _ => return Err(self.wrong_state("enter an amount")),
        };

        validation::validate_tendered(tendered)?;
        validate_tender_details(&tender)?;

        self.state = CheckoutState::AmountEntered {
            attempt: PaymentAttempt { tender, tendered },
        };
        Ok(())
    }

    /// Decides the attempt against `total`.
    ///
    /// On a short payment the flow moves to `Rejected` and stays open for a
    /// corrected amount.
    pub fn submit(&mut self, total: Money) -> CoreResult<AcceptedPayment> {
        let attempt = match &self.state {
            CheckoutState::AmountEntered { attempt } => attempt.clone(),
            _ => return Err(self.wrong_state("submit a payment")),
        };

        match pricing::change(attempt.tendered, total) {
            Ok(change) => {
                let payment = AcceptedPayment {
                    tender: attempt.tender,
                    tendered: attempt.tendered,
                    total,
                    change,
                };
                self.state = CheckoutState::Accepted {
                    payment: payment.clone(),
                };
                Ok(payment)
            }
            Err(err) => {
                self.state = CheckoutState::Rejected { attempt, total };
                Err(err)
            }
        }
    }

    /// Abandons the attempt, from any state.
    pub fn cancel(&mut self) {
        self.state = CheckoutState::Idle;
    }

    fn wrong_state(&self, action: &str) -> CoreError {
        CoreError::InvalidCheckoutState {
            state: self.state.name().to_string(),
            action: action.to_string(),
        }
    }
}

/// Method-specific required fields.
fn validate_tender_details(tender: &Tender) -> CoreResult<()> {
    if let Tender::MobileMoney { provider, phone } = tender {
        validation::validate_phone(phone)?;
        if provider.is_none() {
            return Err(ValidationError::Required {
                field: "provider".to_string(),
            }
            .into());
        }
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
