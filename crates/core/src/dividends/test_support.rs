//! Mock collaborators shared by the dividend service tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use divtrack_market_data::{
    CanonicalIdentity, DividendDataProvider, DividendProfile, MarketDataError, RateLimit,
};

use super::pacing::PacingStrategy;

// ============================================================================
// Mock provider
// ============================================================================

#[derive(Clone)]
pub enum MockResponse {
    Profile(DividendProfile),
    Fail,
    Slow(Duration, DividendProfile),
}

/// Provider answering from a fixed table. Unknown identities pay nothing.
pub struct MockDividendProvider {
    responses: HashMap<String, MockResponse>,
    rate_limit: RateLimit,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockDividendProvider {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            rate_limit: RateLimit::default(),
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with(mut self, identity: &str, response: MockResponse) -> Self {
        self.responses.insert(identity.to_string(), response);
        self
    }

    pub fn paying(self, identity: &str, annual: rust_decimal::Decimal) -> Self {
        self.with(
            identity,
            MockResponse::Profile(DividendProfile::paying(annual, rust_decimal::Decimal::ONE)),
        )
    }

    pub fn failing(self, identity: &str) -> Self {
        self.with(identity, MockResponse::Fail)
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimit) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DividendDataProvider for MockDividendProvider {
    fn id(&self) -> &'static str {
        "MOCK"
    }

    fn rate_limit(&self) -> RateLimit {
        self.rate_limit.clone()
    }

    async fn fetch_dividend_profile(
        &self,
        identity: &CanonicalIdentity,
    ) -> Result<DividendProfile, MarketDataError> {
        self.calls.lock().unwrap().push(identity.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let response = self
            .responses
            .get(identity.as_str())
            .cloned()
            .unwrap_or(MockResponse::Profile(DividendProfile::non_paying()));

        let result = match response {
            MockResponse::Profile(profile) => {
                tokio::time::sleep(Duration::from_millis(2)).await;
                Ok(profile)
            }
            MockResponse::Slow(delay, profile) => {
                tokio::time::sleep(delay).await;
                Ok(profile)
            }
            MockResponse::Fail => Err(MarketDataError::Timeout {
                provider: "MOCK".to_string(),
            }),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

// ============================================================================
// Recording pacing
// ============================================================================

/// Pacing that never sleeps and records every callback.
pub struct RecordingPacing {
    batch_size: usize,
    pauses: Mutex<Vec<usize>>,
    gated_fetches: AtomicUsize,
}

impl RecordingPacing {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size,
            pauses: Mutex::new(Vec::new()),
            gated_fetches: AtomicUsize::new(0),
        }
    }

    pub fn pauses(&self) -> Vec<usize> {
        self.pauses.lock().unwrap().clone()
    }

    pub fn gated_fetches(&self) -> usize {
        self.gated_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PacingStrategy for RecordingPacing {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }

    async fn pause_after_batch(&self, completed_batch: usize) {
        self.pauses.lock().unwrap().push(completed_batch);
    }

    async fn before_fetch(&self) {
        self.gated_fetches.fetch_add(1, Ordering::SeqCst);
    }
}
