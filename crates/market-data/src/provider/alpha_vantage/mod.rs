//! Alpha Vantage dividend data provider.
//!
//! Uses the `OVERVIEW` endpoint, which returns a flat key-value record of
//! company fundamentals. Dividend fields used:
//! - `DividendPerShare` - trailing annual dividend per share
//! - `DividendYield` - trailing yield as a decimal (0.0455 = 4.55%)
//! - `ExDividendDate` / `DividendDate` - next ex/pay dates
//! - `AssetType` - distinguishes funds from single issuers
//!
//! Alpha Vantage does not report payout frequency; profiles assume a
//! quarterly schedule.
//!
//! Note: Alpha Vantage free tier is limited to 5 API calls per minute.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, warn};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::MarketDataError;
use crate::models::{CanonicalIdentity, DividendProfile};
use crate::provider::{DividendDataProvider, RateLimit};

const BASE_URL: &str = "https://www.alphavantage.co/query";
const PROVIDER_ID: &str = "ALPHA_VANTAGE";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Alpha Vantage dividend data provider.
pub struct AlphaVantageProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

// ============================================================================
// Response structures for Alpha Vantage API
// ============================================================================

/// OVERVIEW response.
/// Only the dividend-related fields are mapped; the API returns many more.
#[derive(Debug, Default, Deserialize)]
struct CompanyOverviewResponse {
    #[serde(rename = "AssetType")]
    asset_type: Option<String>,

    // Dividend data
    #[serde(rename = "DividendPerShare")]
    dividend_per_share: Option<String>,
    #[serde(rename = "DividendYield")]
    dividend_yield: Option<String>,
    #[serde(rename = "ExDividendDate")]
    ex_dividend_date: Option<String>,
    #[serde(rename = "DividendDate")]
    dividend_date: Option<String>,

    // Error handling
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

impl CompanyOverviewResponse {
    /// Parse a decimal field, treating "None", "-", "" and "0" as absent.
    fn parse_decimal(s: &Option<String>) -> Option<Decimal> {
        s.as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty() && *v != "None" && *v != "-")
            .and_then(|v| Decimal::from_str(v).ok())
            .filter(|d| *d > Decimal::ZERO)
    }

    /// Parse a YYYY-MM-DD date field, treating "None" and "-" as absent.
    fn parse_date(s: &Option<String>) -> Option<NaiveDate> {
        s.as_deref()
            .and_then(|v| NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").ok())
    }

    fn is_fund(&self) -> bool {
        self.asset_type
            .as_deref()
            .map(|t| matches!(t.trim().to_uppercase().as_str(), "ETF" | "MUTUAL FUND"))
            .unwrap_or(false)
    }

    /// Convert to a DividendProfile.
    ///
    /// A record without a positive `DividendPerShare` is a definitive
    /// "no dividend" answer, including the empty record Alpha Vantage sends
    /// for symbols it has no fundamentals for.
    fn to_dividend_profile(&self, fetched_at: DateTime<Utc>) -> DividendProfile {
        let profile = match Self::parse_decimal(&self.dividend_per_share) {
            Some(annual) => {
                let yield_percent = Self::parse_decimal(&self.dividend_yield)
                    .map(|y| y * Decimal::ONE_HUNDRED)
                    .unwrap_or(Decimal::ZERO);
                DividendProfile::paying(annual, yield_percent)
                    .ex_date(Self::parse_date(&self.ex_dividend_date))
                    .pay_date(Self::parse_date(&self.dividend_date))
            }
            None => DividendProfile::non_paying(),
        };

        profile
            .fund(self.is_fund())
            .fetched_from(PROVIDER_ID, fetched_at)
    }
}

// ============================================================================
// AlphaVantageProvider implementation
// ============================================================================

impl AlphaVantageProvider {
    /// Create a new Alpha Vantage provider with the given API key.
    pub fn new(api_key: String) -> Self {
        Self {
            client: build_client(REQUEST_TIMEOUT),
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the provider at a different endpoint (proxy, compatible API).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Replace the per-request timeout (30s by default).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self
    }

    /// Make a request to the Alpha Vantage API.
    async fn fetch(&self, params: &[(&str, &str)]) -> Result<String, MarketDataError> {
        let mut all_params: Vec<(&str, &str)> = params.to_vec();
        all_params.push(("apikey", &self.api_key));

        let url = reqwest::Url::parse_with_params(&self.base_url, &all_params).map_err(|e| {
            MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to build URL: {}", e),
            }
        })?;

        debug!(
            "Alpha Vantage request: {}",
            url.as_str().replace(&self.api_key, "***")
        );

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if !status.is_success() {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        response.text().await.map_err(transport_error)
    }

    /// Check for API-level errors in the response.
    fn check_api_error(
        error_message: &Option<String>,
        note: &Option<String>,
        information: &Option<String>,
    ) -> Result<(), MarketDataError> {
        if let Some(ref msg) = error_message {
            if msg.contains("Invalid API call") || msg.contains("not found") {
                return Err(MarketDataError::SymbolNotFound(msg.clone()));
            }
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: msg.clone(),
            });
        }

        // "Note" usually indicates rate limiting
        if let Some(ref msg) = note {
            if is_rate_limit_message(msg) {
                return Err(MarketDataError::RateLimited {
                    provider: PROVIDER_ID.to_string(),
                });
            }
            warn!("Alpha Vantage note: {}", msg);
        }

        // "Information" carries rate limit and premium/demo-key notices
        if let Some(ref msg) = information {
            if is_rate_limit_message(msg) {
                return Err(MarketDataError::RateLimited {
                    provider: PROVIDER_ID.to_string(),
                });
            }
            if msg.contains("demo") || msg.contains("premium") {
                return Err(MarketDataError::ProviderError {
                    provider: PROVIDER_ID.to_string(),
                    message: msg.clone(),
                });
            }
            warn!("Alpha Vantage info: {}", msg);
        }

        Ok(())
    }

    /// Parse an OVERVIEW payload into a profile.
    fn parse_overview(
        text: &str,
        fetched_at: DateTime<Utc>,
    ) -> Result<DividendProfile, MarketDataError> {
        let response: CompanyOverviewResponse =
            serde_json::from_str(text).map_err(|e| MarketDataError::MalformedResponse {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to parse company overview response: {}", e),
            })?;

        Self::check_api_error(
            &response.error_message,
            &response.note,
            &response.information,
        )?;

        Ok(response.to_dividend_profile(fetched_at))
    }
}

fn build_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

fn transport_error(e: reqwest::Error) -> MarketDataError {
    if e.is_timeout() {
        MarketDataError::Timeout {
            provider: PROVIDER_ID.to_string(),
        }
    } else {
        MarketDataError::Network(e)
    }
}

fn is_rate_limit_message(msg: &str) -> bool {
    msg.contains("API call frequency") || msg.contains("rate limit")
}

// ============================================================================
// DividendDataProvider trait implementation
// ============================================================================

#[async_trait]
impl DividendDataProvider for AlphaVantageProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            requests_per_minute: 5,             // Free tier is very limited
            max_concurrency: 1,                 // Sequential requests only
            min_delay: Duration::from_secs(12), // ~5 requests per minute
        }
    }

    async fn fetch_dividend_profile(
        &self,
        identity: &CanonicalIdentity,
    ) -> Result<DividendProfile, MarketDataError> {
        let params = [("function", "OVERVIEW"), ("symbol", identity.as_str())];
        let text = self.fetch(&params).await?;
        let profile = Self::parse_overview(&text, Utc::now())?;

        debug!(
            "Alpha Vantage: {} annual dividend {} ({}%)",
            identity, profile.annual_amount, profile.yield_percent
        );

        Ok(profile)
    }
}
