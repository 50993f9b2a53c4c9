//! Contract terms: the immutable input record for one contract.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use cadence_core::daycounts::DayCountConvention;
use cadence_core::types::{Currency, Date};

use crate::error::{ContractError, ContractResult};

/// Contract family, selecting the processor that values the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ContractFamily {
    /// Principal exchanged in full at maturity, interest paid periodically.
    PrincipalAtMaturity,
    /// Level payments amortizing the principal over the interest schedule.
    Annuity,
}

impl ContractFamily {
    /// Returns the short family code (`PAM`, `ANN`).
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            ContractFamily::PrincipalAtMaturity => "PAM",
            ContractFamily::Annuity => "ANN",
        }
    }
}

impl fmt::Display for ContractFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for ContractFamily {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PAM" | "PRINCIPALATMATURITY" => Ok(ContractFamily::PrincipalAtMaturity),
            "ANN" | "ANNUITY" => Ok(ContractFamily::Annuity),
            other => Err(ContractError::invalid_terms(
                "",
                format!("unknown contract family '{other}'"),
            )),
        }
    }
}

/// Side of the contract held by the valuing party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ContractRole {
    /// Positive notional.
    #[default]
    Payer,
    /// Negative notional.
    Receiver,
}

impl ContractRole {
    /// Returns the role sign: `+1` for payers, `-1` for receivers.
    #[must_use]
    pub fn sign(&self) -> Decimal {
        match self {
            ContractRole::Payer => Decimal::ONE,
            ContractRole::Receiver => Decimal::NEGATIVE_ONE,
        }
    }
}

/// Performance status of a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PerformanceStatus {
    /// Performing as agreed.
    #[default]
    Performing,
    /// Payments delayed.
    Delayed,
    /// Payments delinquent.
    Delinquent,
    /// In default.
    Default,
}

/// One recurrence stream: an optional anchor date and an optional cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecurrenceStream {
    /// First date of the recurrence; falls back to initial exchange or status date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<Date>,
    /// Cycle string such as `P3M`; validated when the contract is scheduled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle: Option<String>,
}

impl RecurrenceStream {
    /// Creates a stream from an anchor and a cycle.
    #[must_use]
    pub fn new(anchor: Option<Date>, cycle: impl Into<String>) -> Self {
        Self {
            anchor,
            cycle: Some(cycle.into()),
        }
    }

    /// Returns the cycle if one is declared and non-blank.
    #[must_use]
    pub fn declared_cycle(&self) -> Option<&str> {
        self.cycle.as_deref().filter(|c| !c.trim().is_empty())
    }
}

/// Which quantities the scaling index acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScalingEffect {
    /// Scales interest payments.
    pub interest: bool,
    /// Scales the notional.
    pub notional: bool,
}

impl ScalingEffect {
    /// Returns true if scaling affects anything.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.interest || self.notional
    }
}

/// Immutable terms of a single contract.
///
/// Built once at load time through [`ContractTerms::builder`] and shared by
/// reference afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractTerms {
    /// Contract identifier.
    pub contract_id: String,
    /// Contract family.
    pub family: ContractFamily,
    /// Settlement currency.
    pub currency: Currency,
    /// Date the terms are valid as of.
    pub status_date: Date,
    /// Initial exchange of principal.
    pub initial_exchange_date: Option<Date>,
    /// Secondary-market purchase date.
    pub purchase_date: Option<Date>,
    /// Early termination date.
    pub termination_date: Option<Date>,
    /// Interest is capitalized up to and including this date.
    pub capitalization_end_date: Option<Date>,
    /// Contractual maturity.
    pub maturity_date: Date,
    /// Principal amount (unsigned; the role fixes the sign).
    pub notional_principal: Decimal,
    /// Nominal interest rate.
    pub nominal_interest_rate: Option<Decimal>,
    /// Pre-agreed rate applied at the first reset.
    pub next_reset_rate: Option<Decimal>,
    /// Fee rate.
    pub fee_rate: Option<Decimal>,
    /// Interest already accrued at the status date.
    pub accrued_interest: Option<Decimal>,
    /// Price paid at the purchase date.
    pub purchase_price: Option<Decimal>,
    /// Price received at termination.
    pub termination_price: Option<Decimal>,
    /// Role of the valuing party.
    pub role: ContractRole,
    /// Accrual day count.
    pub day_count: DayCountConvention,
    /// End-of-month rule for all recurrence streams.
    pub end_of_month: bool,
    /// Interest payment stream.
    pub interest: RecurrenceStream,
    /// Rate reset stream.
    pub rate_reset: RecurrenceStream,
    /// Fee payment stream.
    pub fee: RecurrenceStream,
    /// Scaling index stream.
    pub scaling: RecurrenceStream,
    /// What the scaling index acts on.
    pub scaling_effect: ScalingEffect,
    /// Interest scaling multiplier at the status date.
    pub interest_scaling_multiplier: Decimal,
    /// Notional scaling multiplier at the status date.
    pub notional_scaling_multiplier: Decimal,
    /// Performance status.
    pub performance: PerformanceStatus,
}

impl ContractTerms {
    /// Creates a builder.
    #[must_use]
    pub fn builder() -> ContractTermsBuilder {
        ContractTermsBuilder::default()
    }

    /// Returns the role sign.
    #[must_use]
    pub fn sign(&self) -> Decimal {
        self.role.sign()
    }

    /// Date from which every recurrence stream counts: initial exchange, else status date.
    #[must_use]
    pub fn baseline_date(&self) -> Date {
        self.initial_exchange_date.unwrap_or(self.status_date)
    }

    /// Anchor of a stream, falling back to initial exchange then status date.
    #[must_use]
    pub fn stream_anchor(&self, stream: &RecurrenceStream) -> Date {
        stream.anchor.unwrap_or_else(|| self.baseline_date())
    }

    /// Returns true if the contract carries an interest stream.
    #[must_use]
    pub fn has_interest_stream(&self) -> bool {
        self.nominal_interest_rate.is_some() || self.interest.declared_cycle().is_some()
    }
}

/// Builder for [`ContractTerms`].
#[derive(Debug, Clone, Default)]
pub struct ContractTermsBuilder {
    contract_id: Option<String>,
    family: Option<ContractFamily>,
    currency: Option<Currency>,
    status_date: Option<Date>,
    initial_exchange_date: Option<Date>,
    purchase_date: Option<Date>,
    termination_date: Option<Date>,
    capitalization_end_date: Option<Date>,
    maturity_date: Option<Date>,
    notional_principal: Option<Decimal>,
    nominal_interest_rate: Option<Decimal>,
    next_reset_rate: Option<Decimal>,
    fee_rate: Option<Decimal>,
    accrued_interest: Option<Decimal>,
    purchase_price: Option<Decimal>,
    termination_price: Option<Decimal>,
    role: Option<ContractRole>,
    day_count: Option<String>,
    end_of_month: Option<bool>,
    interest: RecurrenceStream,
    rate_reset: RecurrenceStream,
    fee: RecurrenceStream,
    scaling: RecurrenceStream,
    scaling_effect: ScalingEffect,
    interest_scaling_multiplier: Option<Decimal>,
    notional_scaling_multiplier: Option<Decimal>,
    performance: Option<PerformanceStatus>,
}

impl ContractTermsBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the contract identifier.
    #[must_use]
    pub fn contract_id(mut self, id: impl Into<String>) -> Self {
        self.contract_id = Some(id.into());
        self
    }

    /// Sets the contract family (default: principal at maturity).
    #[must_use]
    pub fn family(mut self, family: ContractFamily) -> Self {
        self.family = Some(family);
        self
    }

    /// Sets the currency (default: USD).
    #[must_use]
    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    /// Sets the status date.
    #[must_use]
    pub fn status_date(mut self, date: Date) -> Self {
        self.status_date = Some(date);
        self
    }

    /// Sets the initial exchange date.
    #[must_use]
    pub fn initial_exchange_date(mut self, date: Date) -> Self {
        self.initial_exchange_date = Some(date);
        self
    }

    /// Sets the purchase date and price.
    #[must_use]
    pub fn purchase(mut self, date: Date, price: Option<Decimal>) -> Self {
        self.purchase_date = Some(date);
        self.purchase_price = price;
        self
    }

    /// Sets the termination date and price.
    #[must_use]
    pub fn termination(mut self, date: Date, price: Option<Decimal>) -> Self {
        self.termination_date = Some(date);
        self.termination_price = price;
        self
    }

    /// Sets the capitalization end date.
    #[must_use]
    pub fn capitalization_end_date(mut self, date: Date) -> Self {
        self.capitalization_end_date = Some(date);
        self
    }

    /// Sets the maturity date.
    #[must_use]
    pub fn maturity_date(mut self, date: Date) -> Self {
        self.maturity_date = Some(date);
        self
    }

    /// Sets the unsigned principal.
    #[must_use]
    pub fn notional_principal(mut self, notional: Decimal) -> Self {
        self.notional_principal = Some(notional);
        self
    }

    /// Sets the nominal interest rate.
    #[must_use]
    pub fn nominal_interest_rate(mut self, rate: Decimal) -> Self {
        self.nominal_interest_rate = Some(rate);
        self
    }

    /// Sets the pre-agreed next reset rate.
    #[must_use]
    pub fn next_reset_rate(mut self, rate: Decimal) -> Self {
        self.next_reset_rate = Some(rate);
        self
    }

    /// Sets the fee rate.
    #[must_use]
    pub fn fee_rate(mut self, rate: Decimal) -> Self {
        self.fee_rate = Some(rate);
        self
    }

    /// Sets the accrued interest at the status date.
    #[must_use]
    pub fn accrued_interest(mut self, accrued: Decimal) -> Self {
        self.accrued_interest = Some(accrued);
        self
    }

    /// Sets the role (default: payer).
    #[must_use]
    pub fn role(mut self, role: ContractRole) -> Self {
        self.role = Some(role);
        self
    }

    /// Sets the day count label (`A360`, `ACT/365F`, `30E360`, `AA`, ...).
    #[must_use]
    pub fn day_count(mut self, label: impl Into<String>) -> Self {
        self.day_count = Some(label.into());
        self
    }

    /// Sets the end-of-month rule.
    #[must_use]
    pub fn end_of_month(mut self, eom: bool) -> Self {
        self.end_of_month = Some(eom);
        self
    }

    /// Sets the interest payment stream.
    #[must_use]
    pub fn interest_cycle(mut self, anchor: Option<Date>, cycle: impl Into<String>) -> Self {
        self.interest = RecurrenceStream::new(anchor, cycle);
        self
    }

    /// Sets the rate reset stream.
    #[must_use]
    pub fn rate_reset_cycle(mut self, anchor: Option<Date>, cycle: impl Into<String>) -> Self {
        self.rate_reset = RecurrenceStream::new(anchor, cycle);
        self
    }

    /// Sets the fee stream.
    #[must_use]
    pub fn fee_cycle(mut self, anchor: Option<Date>, cycle: impl Into<String>) -> Self {
        self.fee = RecurrenceStream::new(anchor, cycle);
        self
    }

    /// Sets the scaling stream and its effect.
    #[must_use]
    pub fn scaling_cycle(
        mut self,
        anchor: Option<Date>,
        cycle: impl Into<String>,
        effect: ScalingEffect,
    ) -> Self {
        self.scaling = RecurrenceStream::new(anchor, cycle);
        self.scaling_effect = effect;
        self
    }

    /// Sets the scaling multipliers (default: 1 and 1).
    #[must_use]
    pub fn scaling_multipliers(mut self, interest: Decimal, notional: Decimal) -> Self {
        self.interest_scaling_multiplier = Some(interest);
        self.notional_scaling_multiplier = Some(notional);
        self
    }

    /// Sets the performance status.
    #[must_use]
    pub fn performance(mut self, status: PerformanceStatus) -> Self {
        self.performance = Some(status);
        self
    }

    /// Builds the terms.
    ///
    /// # Errors
    ///
    /// Returns `MissingRequiredDate` when the status or maturity date is
    /// absent, `Core` for an unknown day count label, and `InvalidTerms` for
    /// inconsistent values. Cycle strings are validated at scheduling time.
    pub fn build(self) -> ContractResult<ContractTerms> {
        let contract_id = self
            .contract_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ContractError::invalid_terms("", "contract_id is required"))?;
        let status_date = self
            .status_date
            .ok_or_else(|| ContractError::missing_date("status_date"))?;
        let maturity_date = self
            .maturity_date
            .ok_or_else(|| ContractError::missing_date("maturity_date"))?;
        let notional_principal = self.notional_principal.unwrap_or(Decimal::ZERO);
        let family = self.family.unwrap_or(ContractFamily::PrincipalAtMaturity);

        if notional_principal < Decimal::ZERO {
            return Err(ContractError::invalid_terms(
                contract_id,
                "notional_principal must be unsigned; the role fixes the sign",
            ));
        }
        if let Some(ied) = self.initial_exchange_date {
            if maturity_date < ied {
                return Err(ContractError::invalid_terms(
                    contract_id,
                    "maturity_date precedes initial_exchange_date",
                ));
            }
        }

        if self.termination_date.is_some_and(|td| td > maturity_date) {
            return Err(ContractError::invalid_terms(
                contract_id,
                "termination_date falls after maturity_date",
            ));
        }

        let day_count = match self.day_count {
            Some(label) => label.parse::<DayCountConvention>()?,
            None => DayCountConvention::default(),
        };

        let terms = ContractTerms {
            contract_id,
            family,
            currency: self.currency.unwrap_or_default(),
            status_date,
            initial_exchange_date: self.initial_exchange_date,
            purchase_date: self.purchase_date,
            termination_date: self.termination_date,
            capitalization_end_date: self.capitalization_end_date,
            maturity_date,
            notional_principal,
            nominal_interest_rate: self.nominal_interest_rate,
            next_reset_rate: self.next_reset_rate,
            fee_rate: self.fee_rate,
            accrued_interest: self.accrued_interest,
            purchase_price: self.purchase_price,
            termination_price: self.termination_price,
            role: self.role.unwrap_or_default(),
            day_count,
            end_of_month: self.end_of_month.unwrap_or(false),
            interest: self.interest,
            rate_reset: self.rate_reset,
            fee: self.fee,
            scaling: self.scaling,
            scaling_effect: self.scaling_effect,
            interest_scaling_multiplier: self.interest_scaling_multiplier.unwrap_or(Decimal::ONE),
            notional_scaling_multiplier: self.notional_scaling_multiplier.unwrap_or(Decimal::ONE),
            performance: self.performance.unwrap_or_default(),
        };

        if family == ContractFamily::Annuity && !terms.has_interest_stream() {
            return Err(ContractError::invalid_terms(
                terms.contract_id,
                "annuity contracts require an interest rate or interest cycle",
            ));
        }

        Ok(terms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::error::CoreError;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    fn base() -> ContractTermsBuilder {
        ContractTerms::builder()
            .contract_id("C1")
            .status_date(d(2024, 1, 1))
            .maturity_date(d(2029, 1, 1))
            .notional_principal(dec!(1000))
    }

    #[test]
    fn test_defaults() {
        let terms = base().build().unwrap();
        assert_eq!(terms.family, ContractFamily::PrincipalAtMaturity);
        assert_eq!(terms.role, ContractRole::Payer);
        assert_eq!(terms.currency, Currency::USD);
        assert_eq!(terms.day_count, DayCountConvention::Act360);
        assert_eq!(terms.interest_scaling_multiplier, Decimal::ONE);
        assert_eq!(terms.baseline_date(), d(2024, 1, 1));
    }

    #[test]
    fn test_missing_dates() {
        let err = ContractTerms::builder()
            .contract_id("C1")
            .status_date(d(2024, 1, 1))
            .build()
            .unwrap_err();
        assert_eq!(err, ContractError::missing_date("maturity_date"));

        let err = ContractTerms::builder()
            .contract_id("C1")
            .maturity_date(d(2024, 1, 1))
            .build()
            .unwrap_err();
        assert_eq!(err, ContractError::missing_date("status_date"));
    }

    #[test]
    fn test_unknown_day_count() {
        let err = base().day_count("BUS/252").build().unwrap_err();
        assert_eq!(err, ContractError::Core(CoreError::invalid_day_count("BUS/252")));
    }

    #[test]
    fn test_day_count_label_parsed() {
        let terms = base().day_count("30E360").build().unwrap();
        assert_eq!(terms.day_count, DayCountConvention::Thirty360E);
    }

    #[test]
    fn test_negative_notional_rejected() {
        let err = base().notional_principal(dec!(-1)).build().unwrap_err();
        assert!(matches!(err, ContractError::InvalidTerms { .. }));
    }

    #[test]
    fn test_termination_after_maturity_rejected() {
        let err = base().termination(d(2030, 1, 1), Some(dec!(990))).build().unwrap_err();
        assert_eq!(
            err,
            ContractError::invalid_terms("C1", "termination_date falls after maturity_date")
        );

        assert!(base().termination(d(2029, 1, 1), None).build().is_ok());
    }

    #[test]
    fn test_annuity_requires_interest_stream() {
        let err = base().family(ContractFamily::Annuity).build().unwrap_err();
        assert!(matches!(err, ContractError::InvalidTerms { .. }));

        let ok = base()
            .family(ContractFamily::Annuity)
            .nominal_interest_rate(dec!(0.04))
            .build();
        assert!(ok.is_ok());
    }

    #[test]
    fn test_role_sign() {
        assert_eq!(ContractRole::Payer.sign(), dec!(1));
        assert_eq!(ContractRole::Receiver.sign(), dec!(-1));
    }

    #[test]
    fn test_stream_anchor_fallbacks() {
        let terms = base()
            .initial_exchange_date(d(2024, 2, 1))
            .interest_cycle(None, "P3M")
            .fee_cycle(Some(d(2024, 6, 1)), "P1Y")
            .build()
            .unwrap();
        assert_eq!(terms.stream_anchor(&terms.interest), d(2024, 2, 1));
        assert_eq!(terms.stream_anchor(&terms.fee), d(2024, 6, 1));
    }

    #[test]
    fn test_blank_cycle_is_undeclared() {
        let stream = RecurrenceStream::new(None, "  ");
        assert_eq!(stream.declared_cycle(), None);
        assert_eq!(RecurrenceStream::default().declared_cycle(), None);
    }

    #[test]
    fn test_family_codes() {
        assert_eq!("pam".parse::<ContractFamily>().unwrap(), ContractFamily::PrincipalAtMaturity);
        assert_eq!("ANN".parse::<ContractFamily>().unwrap(), ContractFamily::Annuity);
        assert!("LAX".parse::<ContractFamily>().is_err());
        assert_eq!(ContractFamily::Annuity.to_string(), "ANN");
    }

    #[test]
    fn test_serde_roundtrip() {
        let terms = base().interest_cycle(None, "P6M").build().unwrap();
        let json = serde_json::to_string(&terms).unwrap();
        let parsed: ContractTerms = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, terms);
    }
}
