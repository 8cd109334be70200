use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How often an instrument pays out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PayFrequency {
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
    Special,
    #[default]
    Unknown,
}

impl PayFrequency {
    /// Number of regular payments per year, if the schedule is regular.
    pub fn payments_per_year(&self) -> Option<u32> {
        match self {
            Self::Monthly => Some(12),
            Self::Quarterly => Some(4),
            Self::SemiAnnual => Some(2),
            Self::Annual => Some(1),
            Self::Special | Self::Unknown => None,
        }
    }
}

impl std::fmt::Display for PayFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Monthly => write!(f, "monthly"),
            Self::Quarterly => write!(f, "quarterly"),
            Self::SemiAnnual => write!(f, "semiAnnual"),
            Self::Annual => write!(f, "annual"),
            Self::Special => write!(f, "special"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Dividend characteristics of one canonical identity.
///
/// An `annual_amount` of zero is a final answer ("pays no dividend"), not a
/// missing value. Missing values are represented by the identity being absent
/// from the reference store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DividendProfile {
    /// Currency units per share per year.
    pub annual_amount: Decimal,

    /// Currency units per share per quarter (`annual_amount / 4`).
    pub quarterly_amount: Decimal,

    /// Trailing dividend yield in percent (4.55 means 4.55%).
    pub yield_percent: Decimal,

    pub pay_frequency: PayFrequency,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_ex_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_pay_date: Option<NaiveDate>,

    /// Pooled vehicle (ETF, mutual fund) rather than a single issuer.
    #[serde(default)]
    pub is_fund: bool,

    /// Provider that produced this profile; `None` for seeded entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<DateTime<Utc>>,
}

impl DividendProfile {
    /// Profile for a payer, under the assumed-quarterly policy.
    ///
    /// Negative inputs are clamped to zero.
    pub fn paying(annual_amount: Decimal, yield_percent: Decimal) -> Self {
        let annual_amount = annual_amount.max(Decimal::ZERO);
        Self {
            annual_amount,
            quarterly_amount: annual_amount / Decimal::from(4),
            yield_percent: yield_percent.max(Decimal::ZERO),
            pay_frequency: PayFrequency::Quarterly,
            next_ex_date: None,
            next_pay_date: None,
            is_fund: false,
            source: None,
            fetched_at: None,
        }
    }

    /// Definitive "no dividend" profile.
    pub fn non_paying() -> Self {
        Self {
            annual_amount: Decimal::ZERO,
            quarterly_amount: Decimal::ZERO,
            yield_percent: Decimal::ZERO,
            pay_frequency: PayFrequency::Unknown,
            next_ex_date: None,
            next_pay_date: None,
            is_fund: false,
            source: None,
            fetched_at: None,
        }
    }

    pub fn pays_dividend(&self) -> bool {
        self.annual_amount > Decimal::ZERO
    }

    pub fn ex_date(mut self, date: Option<NaiveDate>) -> Self {
        self.next_ex_date = date;
        self
    }

    pub fn pay_date(mut self, date: Option<NaiveDate>) -> Self {
        self.next_pay_date = date;
        self
    }

    pub fn fund(mut self, is_fund: bool) -> Self {
        self.is_fund = is_fund;
        self
    }

    /// Stamp the provider and fetch time.
    pub fn fetched_from(mut self, source: impl Into<String>, at: DateTime<Utc>) -> Self {
        self.source = Some(source.into());
        self.fetched_at = Some(at);
        self
    }
}
