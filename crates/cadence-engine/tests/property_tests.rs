//! Property tests for valuation runs.

use cadence_contracts::{ContractFamily, ContractRole, ContractTerms};
use cadence_core::types::Date;
use cadence_engine::prelude::*;
use cadence_scenarios::{standard, ScenarioDefinition};
use proptest::prelude::*;
use rust_decimal::Decimal;

// =============================================================================
// TEST DATA GENERATORS
// =============================================================================

const CYCLES: [&str; 4] = ["P1M", "P3M", "P6M", "P1Y"];

fn contract_strategy() -> impl Strategy<Value = (bool, bool, u32, usize, i64, u32)> {
    (
        any::<bool>(),
        any::<bool>(),
        1u32..6,
        0usize..CYCLES.len(),
        1_000i64..5_000_000,
        0u32..900,
    )
}

fn build(index: usize, shape: (bool, bool, u32, usize, i64, u32)) -> ContractTerms {
    let (annuity, receiver, years, cycle, principal, rate_bps) = shape;
    let start = Date::from_ymd(2024, 1, 1).unwrap();
    ContractTerms::builder()
        .contract_id(format!("C{index:03}"))
        .family(if annuity {
            ContractFamily::Annuity
        } else {
            ContractFamily::PrincipalAtMaturity
        })
        .role(if receiver { ContractRole::Receiver } else { ContractRole::Payer })
        .status_date(start)
        .initial_exchange_date(start)
        .maturity_date(start.add_years(years as i32).unwrap())
        .notional_principal(Decimal::from(principal))
        .nominal_interest_rate(Decimal::new(i64::from(rate_bps), 4))
        .interest_cycle(None, CYCLES[cycle])
        .rate_reset_cycle(None, "P1Y")
        .build()
        .unwrap()
}

fn portfolio_strategy() -> impl Strategy<Value = Vec<ContractTerms>> {
    prop::collection::vec(contract_strategy(), 1..12).prop_map(|shapes| {
        shapes
            .into_iter()
            .enumerate()
            .map(|(i, shape)| build(i, shape))
            .collect()
    })
}

fn scenarios() -> Vec<ScenarioDefinition> {
    let mut scenarios = standard::rates_up_down_100();
    scenarios.push(standard::haircut(5));
    scenarios
}

fn value(portfolio: Vec<ContractTerms>, config: EngineConfig) -> ValuationRun {
    ValuationOrchestrator::new(config)
        .run(portfolio, &scenarios(), 6, &CancellationToken::new(), &NoopProgress)
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn property_chunking_is_invisible(portfolio in portfolio_strategy(), chunk in 1usize..6) {
        let reference = value(portfolio.clone(), EngineConfig::sequential());
        let chunked = value(portfolio, EngineConfig::new().with_threshold(2).with_chunk_size(chunk));
        prop_assert_eq!(reference.buckets, chunked.buckets);
    }

    #[test]
    fn property_buckets_within_horizon_and_totalled(portfolio in portfolio_strategy()) {
        let run = value(portfolio, EngineConfig::default());
        let horizon = run.horizon.unwrap();

        prop_assert!(run.skipped.is_empty());
        prop_assert!(run.buckets.windows(2).all(|w| w[0].date < w[1].date));
        for bucket in &run.buckets {
            prop_assert!(horizon.contains(bucket.date));
            let total: Decimal = bucket.events.iter().map(|e| e.payoff).sum();
            prop_assert_eq!(bucket.total_payoff, total);
        }
    }

    #[test]
    fn property_repeated_runs_are_identical(portfolio in portfolio_strategy()) {
        let first = value(portfolio.clone(), EngineConfig::default());
        let second = value(portfolio, EngineConfig::default());
        prop_assert_eq!(first.to_rows(), second.to_rows());
    }
}
