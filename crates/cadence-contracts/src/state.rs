//! Mutable per-contract state evolved by the state machine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cadence_core::types::Date;

use crate::terms::{ContractTerms, PerformanceStatus};

/// State of one contract between events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractState {
    /// Owning contract.
    pub contract_id: String,
    /// Signed outstanding notional.
    pub notional: Decimal,
    /// Current nominal rate.
    pub nominal_rate: Decimal,
    /// Interest accrued since the last payment.
    pub accrued_interest: Decimal,
    /// Fees accrued since the last fee payment.
    pub fee_accrued: Decimal,
    /// Interest scaling multiplier.
    pub interest_scaling_multiplier: Decimal,
    /// Notional scaling multiplier.
    pub notional_scaling_multiplier: Decimal,
    /// Date of the last applied event.
    pub status_date: Date,
    /// Performance status.
    pub performance: PerformanceStatus,
}

impl ContractState {
    /// Initial state at the terms' status date.
    ///
    /// The notional carries the role sign. When the initial exchange lies
    /// after the status date the contract is not yet live, so notional and
    /// rate start at zero.
    #[must_use]
    pub fn init_from(terms: &ContractTerms) -> Self {
        let pending = terms
            .initial_exchange_date
            .is_some_and(|ied| ied > terms.status_date);

        let (notional, nominal_rate) = if pending {
            (Decimal::ZERO, Decimal::ZERO)
        } else {
            (
                terms.sign() * terms.notional_principal,
                terms.nominal_interest_rate.unwrap_or(Decimal::ZERO),
            )
        };

        Self {
            contract_id: terms.contract_id.clone(),
            notional,
            nominal_rate,
            accrued_interest: terms.accrued_interest.unwrap_or(Decimal::ZERO),
            fee_accrued: terms.fee_rate.unwrap_or(Decimal::ZERO),
            interest_scaling_multiplier: terms.interest_scaling_multiplier,
            notional_scaling_multiplier: terms.notional_scaling_multiplier,
            status_date: terms.status_date,
            performance: terms.performance,
        }
    }
}
