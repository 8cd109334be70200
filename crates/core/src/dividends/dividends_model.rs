use chrono::NaiveDate;
use divtrack_market_data::{CanonicalIdentity, PayFrequency};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A brokerage position as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    /// Raw broker symbol, e.g. `MSFT_US_EQ`.
    pub symbol: String,
    pub shares: Decimal,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub market_value: Decimal,
    /// Average cost per share, when the broker reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_cost: Option<Decimal>,
}

impl Holding {
    pub fn new(symbol: impl Into<String>, shares: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            shares,
            price: Decimal::ZERO,
            market_value: Decimal::ZERO,
            average_cost: None,
        }
    }

    /// Set price and derive market value from it.
    pub fn priced_at(mut self, price: Decimal) -> Self {
        self.price = price;
        self.market_value = price.saturating_mul(self.shares);
        self
    }

    pub fn with_average_cost(mut self, average_cost: Decimal) -> Self {
        self.average_cost = Some(average_cost);
        self
    }

    /// Shares clamped at zero.
    pub fn effective_shares(&self) -> Decimal {
        self.shares.max(Decimal::ZERO)
    }

    /// `average_cost * shares` when known, otherwise market value.
    /// Saturates at `Decimal::MAX`.
    pub fn cost_basis(&self) -> Decimal {
        self.checked_cost_basis().unwrap_or(Decimal::MAX)
    }

    /// Like [`Holding::cost_basis`], `None` on overflow.
    pub fn checked_cost_basis(&self) -> Option<Decimal> {
        let basis = match self.average_cost {
            Some(cost) => cost.max(Decimal::ZERO).checked_mul(self.effective_shares())?,
            None => self.market_value,
        };
        Some(basis.max(Decimal::ZERO))
    }
}

/// Result of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileOutcome {
    /// Holdings examined.
    pub processed: usize,
    /// Holdings that matched a stored identity before fetching.
    pub resolved: usize,
    /// Holdings that did not.
    pub unresolved: usize,
    /// Identities that were absent from the store before this run's put.
    pub newly_added: usize,
    /// Failed or timed-out fetches.
    pub errors: usize,
    /// Size of each dispatched batch, in order.
    pub batches: Vec<usize>,
}

impl ReconcileOutcome {
    /// Identities actually sent to the provider.
    pub fn fetched(&self) -> usize {
        self.batches.iter().sum()
    }
}

/// Whether a figure was observed or projected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FigureBasis {
    Measured,
    Estimated,
}

/// A derived figure tagged with how it was obtained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimatedFigure<T = Decimal> {
    pub value: T,
    pub basis: FigureBasis,
    /// The assumption behind an estimate, in plain words.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assumption: Option<String>,
}

impl<T> EstimatedFigure<T> {
    pub fn measured(value: T) -> Self {
        Self {
            value,
            basis: FigureBasis::Measured,
            assumption: None,
        }
    }

    pub fn estimated(value: T, assumption: impl Into<String>) -> Self {
        Self {
            value,
            basis: FigureBasis::Estimated,
            assumption: Some(assumption.into()),
        }
    }

    pub fn is_estimate(&self) -> bool {
        self.basis == FigureBasis::Estimated
    }
}

/// Coarse dividend sustainability band derived from the blended yield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SafetyBand {
    Safe,
    Moderate,
    Elevated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DividendEstimates {
    /// Dividend income divided by market value of matched holdings, percent.
    pub blended_current_yield: EstimatedFigure,
    pub projected_annual_income_next_year: EstimatedFigure,
    pub projected_annual_income_five_years: EstimatedFigure,
    pub safety: EstimatedFigure<SafetyBand>,
}

/// Per-holding dividend breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingDividend {
    pub symbol: String,
    /// Matched identity; `None` when the holding is unmatched.
    pub identity: Option<CanonicalIdentity>,
    pub annual_income: Decimal,
    pub quarterly_income: Decimal,
    /// Percent of cost basis.
    pub yield_on_cost: Decimal,
    /// Trailing yield reported for the identity, percent.
    pub current_yield: Decimal,
    pub pay_frequency: PayFrequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_ex_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_pay_date: Option<NaiveDate>,
    pub is_fund: bool,
    pub stale: bool,
}

impl HoldingDividend {
    pub fn unmatched(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            identity: None,
            annual_income: Decimal::ZERO,
            quarterly_income: Decimal::ZERO,
            yield_on_cost: Decimal::ZERO,
            current_yield: Decimal::ZERO,
            pay_frequency: PayFrequency::Unknown,
            next_ex_date: None,
            next_pay_date: None,
            is_fund: false,
            stale: false,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.identity.is_some()
    }
}

/// Portfolio-level dividend metrics, recomputed on every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioDividendMetrics {
    pub total_annual_income: Decimal,
    pub total_quarterly_income: Decimal,
    pub monthly_average: Decimal,
    /// Percent of the matched holdings' cost basis.
    pub yield_on_cost: Decimal,
    /// Cost basis of matched holdings only.
    pub total_cost_basis: Decimal,
    pub dividend_paying_count: usize,
    pub processed_count: usize,
    pub unmatched_count: usize,
    pub newly_added_count: usize,
    pub error_count: usize,
    pub stale_count: usize,
    pub holdings: Vec<HoldingDividend>,
    pub estimates: DividendEstimates,
}

impl PortfolioDividendMetrics {
    /// Fold the counters of a reconciliation pass into the metrics.
    pub fn with_outcome(mut self, outcome: &ReconcileOutcome) -> Self {
        self.newly_added_count = outcome.newly_added;
        self.error_count = outcome.errors;
        self
    }
}
