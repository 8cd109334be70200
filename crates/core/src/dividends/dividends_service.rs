//! Dividend engine: reconcile then derive.

use std::sync::Arc;

use async_trait::async_trait;
use divtrack_market_data::{DividendDataProvider, SymbolNormalizer};
use log::info;

use super::dividend_store::{DividendStore, StoreStats};
use super::dividends_model::{Holding, PortfolioDividendMetrics};
use super::dividends_traits::DividendEngineTrait;
use super::metrics_deriver::MetricsDeriver;
use super::pacing::{FixedBatchPacing, PacingStrategy, TokenBucketPacing};
use super::reconciler::BatchReconciler;
use crate::config::{EngineConfig, PacingMode};

/// Entry point for callers: one call reconciles holdings against the store
/// and returns freshly derived metrics.
pub struct DividendEngine {
    store: Arc<DividendStore>,
    reconciler: BatchReconciler,
    deriver: MetricsDeriver,
}

impl DividendEngine {
    /// Creates an engine with the default normalizer and the pacing
    /// selected by `config`.
    pub fn new(
        store: Arc<DividendStore>,
        provider: Arc<dyn DividendDataProvider>,
        config: EngineConfig,
    ) -> Self {
        let pacing: Arc<dyn PacingStrategy> = match config.pacing {
            PacingMode::Batch => Arc::new(FixedBatchPacing::new(
                config.batch_size,
                config.batch_pause,
            )),
            PacingMode::TokenBucket => Arc::new(TokenBucketPacing::for_provider(provider.as_ref())),
        };
        Self::with_parts(
            store,
            provider,
            Arc::new(SymbolNormalizer::new()),
            pacing,
            &config,
        )
    }

    /// Creates an engine from explicit collaborators.
    pub fn with_parts(
        store: Arc<DividendStore>,
        provider: Arc<dyn DividendDataProvider>,
        normalizer: Arc<SymbolNormalizer>,
        pacing: Arc<dyn PacingStrategy>,
        config: &EngineConfig,
    ) -> Self {
        let reconciler = BatchReconciler::new(
            Arc::clone(&normalizer),
            Arc::clone(&store),
            provider,
            pacing,
        )
        .with_batch_timeout(config.batch_timeout);

        let deriver = MetricsDeriver::new(normalizer)
            .with_stale_after(config.stale_after)
            .with_growth_rate(config.growth_rate);

        Self {
            store,
            reconciler,
            deriver,
        }
    }

    pub fn store(&self) -> &Arc<DividendStore> {
        &self.store
    }
}

#[async_trait]
impl DividendEngineTrait for DividendEngine {
    async fn reconcile_and_derive(&self, holdings: &[Holding]) -> PortfolioDividendMetrics {
        let outcome = self.reconciler.reconcile(holdings).await;
        let metrics = self
            .deriver
            .derive(holdings, &self.store)
            .with_outcome(&outcome);

        info!(
            "Dividend metrics: annual income {} across {} holdings ({} unmatched, {} errors)",
            metrics.total_annual_income,
            metrics.processed_count,
            metrics.unmatched_count,
            metrics.error_count
        );
        metrics
    }

    fn store_stats(&self) -> StoreStats {
        self.store.stats()
    }
}
