use async_trait::async_trait;

use super::dividend_store::StoreStats;
use super::dividends_model::{Holding, PortfolioDividendMetrics};

/// Trait for the dividend engine.
#[async_trait]
pub trait DividendEngineTrait: Send + Sync {
    /// Fill store misses for `holdings`, then derive portfolio metrics.
    ///
    /// Provider failures are reported through `error_count`; this never fails.
    async fn reconcile_and_derive(&self, holdings: &[Holding]) -> PortfolioDividendMetrics;

    fn store_stats(&self) -> StoreStats;
}
