//! Unit tests for the batch reconciler.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use divtrack_market_data::{
    DividendProfile, ProviderId, RateLimitConfig, RateLimiter, SymbolNormalizer,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::test_support::{MockDividendProvider, MockResponse, RecordingPacing};
use super::*;

fn reconciler_with(
    store: &Arc<DividendStore>,
    provider: &Arc<MockDividendProvider>,
    pacing: Arc<dyn PacingStrategy>,
) -> BatchReconciler {
    BatchReconciler::new(
        Arc::new(SymbolNormalizer::new()),
        Arc::clone(store),
        Arc::clone(provider) as Arc<dyn divtrack_market_data::DividendDataProvider>,
        pacing,
    )
}

fn holdings(symbols: &[&str]) -> Vec<Holding> {
    symbols.iter().map(|s| Holding::new(*s, dec!(1))).collect()
}

#[tokio::test]
async fn test_only_misses_are_fetched() {
    let store = Arc::new(DividendStore::new());
    store.put("AAPL".into(), DividendProfile::paying(dec!(0.96), dec!(0.5)));
    let provider = Arc::new(MockDividendProvider::new().paying("MSFT", dec!(3.00)));
    let reconciler = reconciler_with(&store, &provider, Arc::new(RecordingPacing::new(10)));

    let outcome = reconciler
        .reconcile(&[
            Holding::new("AAPL", dec!(100)),
            Holding::new("MSFT_US_EQ", dec!(50)),
        ])
        .await;

    assert_eq!(
        outcome,
        ReconcileOutcome {
            processed: 2,
            resolved: 1,
            unresolved: 1,
            newly_added: 1,
            errors: 0,
            batches: vec![1],
        }
    );
    assert_eq!(provider.calls(), vec!["MSFT".to_string()]);
    assert_eq!(store.get("MSFT").unwrap().annual_amount, dec!(3.00));
}

#[tokio::test]
async fn test_twenty_five_misses_run_in_three_batches() {
    let store = Arc::new(DividendStore::new());
    let provider = Arc::new(MockDividendProvider::new());
    let pacing = Arc::new(RecordingPacing::new(10));
    let reconciler = reconciler_with(&store, &provider, pacing.clone());

    let symbols: Vec<String> = (0..25).map(|i| format!("T{:02}", i)).collect();
    let input: Vec<Holding> = symbols.iter().map(|s| Holding::new(s, dec!(1))).collect();

    let outcome = reconciler.reconcile(&input).await;

    assert_eq!(outcome.batches, vec![10, 10, 5]);
    assert_eq!(outcome.fetched(), 25);
    assert_eq!(outcome.newly_added, 25);
    // Pauses after batch 1 and batch 2 only
    assert_eq!(pacing.pauses(), vec![0, 1]);
    assert_eq!(pacing.gated_fetches(), 25);
    // A whole batch is in flight at once, never more
    assert_eq!(provider.max_in_flight(), 10);
    assert_eq!(store.len(), 25);
}

#[tokio::test]
async fn test_failed_fetch_leaves_identity_absent() {
    let store = Arc::new(DividendStore::new());
    let provider = Arc::new(
        MockDividendProvider::new()
            .paying("KO", dec!(1.94))
            .failing("XYZ"),
    );
    let reconciler = reconciler_with(&store, &provider, Arc::new(RecordingPacing::new(10)));

    let outcome = reconciler.reconcile(&holdings(&["KO", "XYZ"])).await;

    assert_eq!(outcome.errors, 1);
    assert_eq!(outcome.newly_added, 1);
    assert!(!store.has("XYZ"));
    assert!(store.has("KO"));
}

#[tokio::test]
async fn test_failed_identity_is_retried_next_run() {
    let store = Arc::new(DividendStore::new());
    let provider = Arc::new(MockDividendProvider::new().failing("XYZ"));
    let reconciler = reconciler_with(&store, &provider, Arc::new(RecordingPacing::new(10)));

    reconciler.reconcile(&holdings(&["XYZ"])).await;
    reconciler.reconcile(&holdings(&["XYZ"])).await;

    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn test_duplicate_spellings_fetch_once() {
    let store = Arc::new(DividendStore::new());
    let provider = Arc::new(MockDividendProvider::new().paying("MSFT", dec!(3.00)));
    let reconciler = reconciler_with(&store, &provider, Arc::new(RecordingPacing::new(10)));

    let outcome = reconciler
        .reconcile(&holdings(&["MSFT_US_EQ", "msft", "MSFT.US"]))
        .await;

    assert_eq!(outcome.unresolved, 3);
    assert_eq!(outcome.batches, vec![1]);
    assert_eq!(outcome.newly_added, 1);
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_empty_symbol_is_never_fetched() {
    let store = Arc::new(DividendStore::new());
    let provider = Arc::new(MockDividendProvider::new());
    let reconciler = reconciler_with(&store, &provider, Arc::new(RecordingPacing::new(10)));

    let outcome = reconciler.reconcile(&holdings(&["   "])).await;

    assert_eq!(outcome.unresolved, 1);
    assert!(outcome.batches.is_empty());
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_zero_dividend_entry_is_a_cache_hit() {
    let store = Arc::new(DividendStore::new());
    store.put("TSLA".into(), DividendProfile::non_paying());
    let provider = Arc::new(MockDividendProvider::new());
    let reconciler = reconciler_with(&store, &provider, Arc::new(RecordingPacing::new(10)));

    let outcome = reconciler.reconcile(&holdings(&["TSLA_US_EQ"])).await;

    assert_eq!(outcome.resolved, 1);
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_fallback_spelling_resolves_without_fetch() {
    let store = Arc::new(DividendStore::new());
    store.put("SHOP".into(), DividendProfile::non_paying());
    let provider = Arc::new(MockDividendProvider::new());
    let reconciler = reconciler_with(&store, &provider, Arc::new(RecordingPacing::new(10)));

    let outcome = reconciler.reconcile(&holdings(&["SHOP.TO"])).await;

    assert_eq!(outcome.resolved, 1);
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_empty_holdings() {
    let store = Arc::new(DividendStore::new());
    let provider = Arc::new(MockDividendProvider::new());
    let reconciler = reconciler_with(&store, &provider, Arc::new(RecordingPacing::new(10)));

    let outcome = reconciler.reconcile(&[]).await;

    assert_eq!(outcome, ReconcileOutcome::default());
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_batch_timeout_counts_outstanding_as_errors() {
    let store = Arc::new(DividendStore::new());
    let provider = Arc::new(
        MockDividendProvider::new()
            .paying("FAST", dec!(1))
            .with(
                "SLOW",
                MockResponse::Slow(
                    Duration::from_millis(200),
                    DividendProfile::paying(dec!(2), dec!(1)),
                ),
            ),
    );
    let reconciler = reconciler_with(&store, &provider, Arc::new(RecordingPacing::new(10)))
        .with_batch_timeout(Some(Duration::from_millis(50)));

    let outcome = reconciler.reconcile(&holdings(&["FAST", "SLOW"])).await;

    assert_eq!(outcome.errors, 1);
    assert_eq!(outcome.newly_added, 1);
    assert!(!store.has("SLOW"));

    // The detached fetch still lands in the store
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(store.get("SLOW").unwrap().annual_amount, dec!(2));
}

#[tokio::test]
async fn test_token_bucket_pacing_batches_by_concurrency() {
    let store = Arc::new(DividendStore::new());
    let provider = Arc::new(MockDividendProvider::new());
    let limiter = Arc::new(RateLimiter::new());
    let id: ProviderId = Cow::Borrowed("MOCK");
    limiter.configure(
        &id,
        RateLimitConfig {
            requests_per_minute: 60_000,
            burst_capacity: 2.0,
        },
    );
    let pacing = Arc::new(TokenBucketPacing::new(limiter, id, 2));
    let reconciler = reconciler_with(&store, &provider, pacing);

    let outcome = reconciler
        .reconcile(&holdings(&["A", "B", "C", "D", "E"]))
        .await;

    assert_eq!(outcome.batches, vec![2, 2, 1]);
    assert_eq!(outcome.errors, 0);
    assert_eq!(store.len(), 5);
    assert!(store
        .snapshot()
        .values()
        .all(|p| p.annual_amount == Decimal::ZERO));
}
