//! Portfolio dividend metrics derived from holdings and the store.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use divtrack_market_data::{CanonicalIdentity, DividendProfile, SymbolNormalizer};
use log::{debug, warn};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

use super::dividend_store::DividendStore;
use super::dividends_model::{
    DividendEstimates, EstimatedFigure, Holding, HoldingDividend, PortfolioDividendMetrics,
    SafetyBand,
};
use crate::constants::{
    DEFAULT_GROWTH_RATE, DEFAULT_STALE_AFTER_DAYS, DISPLAY_DECIMAL_PRECISION,
    MODERATE_YIELD_CEILING, SAFE_YIELD_CEILING, YIELD_DECIMAL_PRECISION,
};

const MONTHS_PER_YEAR: Decimal = dec!(12);

pub struct MetricsDeriver {
    normalizer: Arc<SymbolNormalizer>,
    stale_after: TimeDelta,
    growth_rate: Decimal,
}

#[derive(Default)]
struct Totals {
    annual: Decimal,
    quarterly: Decimal,
    cost_basis: Decimal,
    market_value: Decimal,
    paying: usize,
    unmatched: usize,
    stale: usize,
}

impl Totals {
    /// Add a matched holding's sums. `None` when any sum would overflow, in
    /// which case the totals are untouched.
    fn absorb(&mut self, entry: &HoldingDividend, holding: &Holding) -> Option<()> {
        let annual = self.annual.checked_add(entry.annual_income)?;
        let quarterly = self.quarterly.checked_add(entry.quarterly_income)?;
        let cost_basis = self.cost_basis.checked_add(holding.checked_cost_basis()?)?;
        let market_value = self
            .market_value
            .checked_add(holding.market_value.max(Decimal::ZERO))?;

        self.annual = annual;
        self.quarterly = quarterly;
        self.cost_basis = cost_basis;
        self.market_value = market_value;
        Some(())
    }
}

impl MetricsDeriver {
    pub fn new(normalizer: Arc<SymbolNormalizer>) -> Self {
        Self {
            normalizer,
            stale_after: TimeDelta::days(DEFAULT_STALE_AFTER_DAYS),
            growth_rate: DEFAULT_GROWTH_RATE,
        }
    }

    pub fn with_stale_after(mut self, stale_after: TimeDelta) -> Self {
        self.stale_after = stale_after;
        self
    }

    pub fn with_growth_rate(mut self, growth_rate: Decimal) -> Self {
        self.growth_rate = growth_rate;
        self
    }

    pub fn derive(&self, holdings: &[Holding], store: &DividendStore) -> PortfolioDividendMetrics {
        self.derive_at(holdings, store, Utc::now())
    }

    /// Derive metrics with an explicit clock for staleness.
    pub fn derive_at(
        &self,
        holdings: &[Holding],
        store: &DividendStore,
        now: DateTime<Utc>,
    ) -> PortfolioDividendMetrics {
        let mut totals = Totals::default();
        let mut breakdown = Vec::with_capacity(holdings.len());

        for holding in holdings {
            let matched = self
                .normalizer
                .resolve_against_store(&holding.symbol, store)
                .and_then(|hit| store.get(hit.identity.as_str()).map(|p| (hit.identity, p)));

            let Some((identity, profile)) = matched else {
                totals.unmatched += 1;
                breakdown.push(HoldingDividend::unmatched(&holding.symbol));
                continue;
            };

            let entry = match self.holding_dividend(holding, identity, &profile, now) {
                Some(entry) if totals.absorb(&entry, holding).is_some() => entry,
                _ => {
                    warn!(
                        "Dividend figures for {} overflow; treating the holding as unmatched",
                        holding.symbol
                    );
                    totals.unmatched += 1;
                    breakdown.push(HoldingDividend::unmatched(&holding.symbol));
                    continue;
                }
            };

            if profile.pays_dividend() {
                totals.paying += 1;
            }
            if entry.stale {
                totals.stale += 1;
            }

            breakdown.push(round_holding(entry));
        }

        debug!(
            "Metrics: {} holdings, {} unmatched, annual income {}",
            holdings.len(),
            totals.unmatched,
            totals.annual
        );

        let estimates = self.estimates(&totals);

        PortfolioDividendMetrics {
            total_annual_income: round_amount(totals.annual),
            total_quarterly_income: round_amount(totals.quarterly),
            monthly_average: round_amount(totals.annual / MONTHS_PER_YEAR),
            yield_on_cost: round_yield(percent_of(totals.annual, totals.cost_basis)),
            total_cost_basis: round_amount(totals.cost_basis),
            dividend_paying_count: totals.paying,
            processed_count: holdings.len(),
            unmatched_count: totals.unmatched,
            newly_added_count: 0,
            error_count: 0,
            stale_count: totals.stale,
            holdings: breakdown,
            estimates,
        }
    }

    /// `None` when a figure overflows.
    fn holding_dividend(
        &self,
        holding: &Holding,
        identity: CanonicalIdentity,
        profile: &DividendProfile,
        now: DateTime<Utc>,
    ) -> Option<HoldingDividend> {
        let shares = holding.effective_shares();
        let annual_income = profile.annual_amount.max(Decimal::ZERO).checked_mul(shares)?;
        let quarterly_income = profile
            .quarterly_amount
            .max(Decimal::ZERO)
            .checked_mul(shares)?;
        let cost_basis = holding.checked_cost_basis()?;

        Some(HoldingDividend {
            symbol: holding.symbol.clone(),
            identity: Some(identity),
            annual_income,
            quarterly_income,
            yield_on_cost: percent_of(annual_income, cost_basis),
            current_yield: profile.yield_percent.max(Decimal::ZERO),
            pay_frequency: profile.pay_frequency,
            next_ex_date: profile.next_ex_date,
            next_pay_date: profile.next_pay_date,
            is_fund: profile.is_fund,
            stale: self.is_stale(profile, now),
        })
    }

    /// Seeded profiles carry no fetch time and are never stale.
    fn is_stale(&self, profile: &DividendProfile, now: DateTime<Utc>) -> bool {
        profile
            .fetched_at
            .map(|at| now.signed_duration_since(at) > self.stale_after)
            .unwrap_or(false)
    }

    fn estimates(&self, totals: &Totals) -> DividendEstimates {
        let growth = Decimal::ONE + self.growth_rate;
        let rate_label = (self.growth_rate * Decimal::ONE_HUNDRED).normalize();
        let blended_yield = percent_of(totals.annual, totals.market_value);

        let band = if blended_yield <= SAFE_YIELD_CEILING {
            SafetyBand::Safe
        } else if blended_yield <= MODERATE_YIELD_CEILING {
            SafetyBand::Moderate
        } else {
            SafetyBand::Elevated
        };

        DividendEstimates {
            blended_current_yield: EstimatedFigure::measured(round_yield(blended_yield)),
            projected_annual_income_next_year: EstimatedFigure::estimated(
                round_amount(totals.annual.saturating_mul(growth)),
                format!("constant {}% annual dividend growth", rate_label),
            ),
            projected_annual_income_five_years: EstimatedFigure::estimated(
                round_amount(totals.annual.saturating_mul(growth.powu(5))),
                format!("constant {}% annual dividend growth for five years", rate_label),
            ),
            safety: EstimatedFigure::estimated(
                band,
                format!(
                    "yield band only: safe up to {}%, moderate up to {}%",
                    SAFE_YIELD_CEILING, MODERATE_YIELD_CEILING
                ),
            ),
        }
    }
}

/// `part / whole * 100`, zero when `whole` is not positive. Saturates at
/// `Decimal::MAX`.
fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::MAX)
}

fn round_amount(value: Decimal) -> Decimal {
    value.round_dp(DISPLAY_DECIMAL_PRECISION)
}

fn round_yield(value: Decimal) -> Decimal {
    value.round_dp(YIELD_DECIMAL_PRECISION)
}

fn round_holding(mut entry: HoldingDividend) -> HoldingDividend {
    entry.annual_income = round_amount(entry.annual_income);
    entry.quarterly_income = round_amount(entry.quarterly_income);
    entry.yield_on_cost = round_yield(entry.yield_on_cost);
    entry.current_yield = round_yield(entry.current_yield);
    entry
}
