//! Batch reconciler: finds store misses among holdings and fills them in.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use divtrack_market_data::{
    CanonicalIdentity, DividendDataProvider, MarketDataError, SymbolNormalizer,
};
use log::{debug, error, info, warn};
use tokio::task::JoinSet;

use super::dividend_store::DividendStore;
use super::dividends_model::{Holding, ReconcileOutcome};
use super::pacing::PacingStrategy;

/// What one spawned fetch task reports back.
enum FetchReport {
    Stored { newly_added: bool },
    Failed,
}

#[derive(Default)]
struct BatchTally {
    completed: usize,
    newly_added: usize,
    errors: usize,
}

impl BatchTally {
    fn record(&mut self, report: FetchReport) {
        self.completed += 1;
        match report {
            FetchReport::Stored { newly_added } => {
                if newly_added {
                    self.newly_added += 1;
                }
            }
            FetchReport::Failed => self.errors += 1,
        }
    }
}

pub struct BatchReconciler {
    normalizer: Arc<SymbolNormalizer>,
    store: Arc<DividendStore>,
    provider: Arc<dyn DividendDataProvider>,
    pacing: Arc<dyn PacingStrategy>,
    batch_timeout: Option<Duration>,
}

impl BatchReconciler {
    pub fn new(
        normalizer: Arc<SymbolNormalizer>,
        store: Arc<DividendStore>,
        provider: Arc<dyn DividendDataProvider>,
        pacing: Arc<dyn PacingStrategy>,
    ) -> Self {
        Self {
            normalizer,
            store,
            provider,
            pacing,
            batch_timeout: None,
        }
    }

    /// Stop waiting on a batch after `timeout`. Outstanding fetches are
    /// counted as errors and left running in the background.
    pub fn with_batch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.batch_timeout = timeout;
        self
    }

    /// Identities not yet in the store, deduplicated in first-seen order.
    ///
    /// Returns the partially filled outcome alongside the work list.
    fn plan(&self, holdings: &[Holding]) -> (ReconcileOutcome, Vec<CanonicalIdentity>) {
        let mut outcome = ReconcileOutcome {
            processed: holdings.len(),
            ..Default::default()
        };
        let mut seen: HashSet<CanonicalIdentity> = HashSet::new();
        let mut pending = Vec::new();

        for holding in holdings {
            if self
                .normalizer
                .resolve_against_store(&holding.symbol, self.store.as_ref())
                .is_some()
            {
                outcome.resolved += 1;
                continue;
            }

            outcome.unresolved += 1;
            let identity = self.normalizer.normalize(&holding.symbol);
            if identity.is_empty() {
                debug!("Reconcile: '{}' has no usable identity", holding.symbol);
                continue;
            }
            if seen.insert(identity.clone()) {
                pending.push(identity);
            }
        }

        (outcome, pending)
    }

    /// Resolve holdings against the store and fetch every miss.
    ///
    /// Per-identity failures are counted, never returned.
    pub async fn reconcile(&self, holdings: &[Holding]) -> ReconcileOutcome {
        let (mut outcome, pending) = self.plan(holdings);

        if pending.is_empty() {
            debug!(
                "Reconcile: all {} holdings resolved from store",
                outcome.resolved
            );
            return outcome;
        }

        let batch_size = self.pacing.batch_size().max(1);
        info!(
            "Reconcile: fetching {} identities from {} in batches of {} ({} pacing)",
            pending.len(),
            self.provider.id(),
            batch_size,
            self.pacing.name()
        );

        for (index, batch) in pending.chunks(batch_size).enumerate() {
            if index > 0 {
                self.pacing.pause_after_batch(index - 1).await;
            }

            let tally = self.run_batch(batch).await;
            outcome.batches.push(batch.len());
            outcome.newly_added += tally.newly_added;
            outcome.errors += tally.errors;
        }

        info!(
            "Reconcile: {} processed, {} resolved, {} newly added, {} errors",
            outcome.processed, outcome.resolved, outcome.newly_added, outcome.errors
        );
        outcome
    }

    async fn run_batch(&self, batch: &[CanonicalIdentity]) -> BatchTally {
        let mut tasks = JoinSet::new();

        for identity in batch {
            let identity = identity.clone();
            let provider = Arc::clone(&self.provider);
            let pacing = Arc::clone(&self.pacing);
            let store = Arc::clone(&self.store);

            tasks.spawn(async move {
                pacing.before_fetch().await;
                match provider.fetch_dividend_profile(&identity).await {
                    Ok(profile) => {
                        let previous = store.put(identity, profile);
                        FetchReport::Stored {
                            newly_added: previous.is_none(),
                        }
                    }
                    Err(err) => {
                        log_fetch_failure(provider.id(), &identity, &err);
                        FetchReport::Failed
                    }
                }
            });
        }

        let mut tally = BatchTally::default();
        let drained = match self.batch_timeout {
            Some(limit) => tokio::time::timeout(limit, drain(&mut tasks, &mut tally))
                .await
                .is_ok(),
            None => {
                drain(&mut tasks, &mut tally).await;
                true
            }
        };

        if !drained {
            let outstanding = batch.len() - tally.completed;
            warn!(
                "Reconcile: batch timed out with {} of {} fetches outstanding",
                outstanding,
                batch.len()
            );
            tally.errors += outstanding;
            // Late results may still land in the store.
            tasks.detach_all();
        }

        tally
    }
}

async fn drain(tasks: &mut JoinSet<FetchReport>, tally: &mut BatchTally) {
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(report) => tally.record(report),
            Err(err) => {
                error!("Reconcile: fetch task failed: {}", err);
                tally.record(FetchReport::Failed);
            }
        }
    }
}

fn log_fetch_failure(provider: &str, identity: &CanonicalIdentity, err: &MarketDataError) {
    warn!(
        "Dividend fetch for {} from {} failed (retry: {}): {}",
        identity,
        provider,
        err.retry_class(),
        err
    );
}
