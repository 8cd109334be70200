//! In-memory dividend reference store.
//!
//! Maps canonical identities to dividend profiles. An identity present with a
//! zero profile means "looked up, pays nothing"; an absent identity means
//! "not looked up yet". Entries are only ever added or overwritten.

use std::collections::HashMap;

use dashmap::DashMap;
use divtrack_market_data::{CanonicalIdentity, DividendProfile, IdentityLookup};
use serde::{Deserialize, Serialize};

/// Aggregate counts over the store contents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub total: usize,
    pub dividend_paying: usize,
    pub non_dividend_paying: usize,
    pub fund_count: usize,
}

/// Concurrent identity -> profile map shared by reconciler and deriver.
///
/// Same-key writes are last-write-wins; writes to different keys never
/// interfere. Shard locks are never held across an await point.
#[derive(Debug, Default)]
pub struct DividendStore {
    entries: DashMap<CanonicalIdentity, DividendProfile>,
}

impl DividendStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store from previously persisted profiles.
    pub fn from_profiles(
        profiles: impl IntoIterator<Item = (CanonicalIdentity, DividendProfile)>,
    ) -> Self {
        let store = Self::new();
        store.extend(profiles);
        store
    }

    pub fn get(&self, identity: &str) -> Option<DividendProfile> {
        self.entries.get(identity).map(|entry| entry.value().clone())
    }

    pub fn has(&self, identity: &str) -> bool {
        self.entries.contains_key(identity)
    }

    /// Insert or overwrite, returning the previous profile.
    pub fn put(
        &self,
        identity: CanonicalIdentity,
        profile: DividendProfile,
    ) -> Option<DividendProfile> {
        self.entries.insert(identity, profile)
    }

    /// Bulk insert used for seeding.
    pub fn extend(&self, profiles: impl IntoIterator<Item = (CanonicalIdentity, DividendProfile)>) {
        for (identity, profile) in profiles {
            self.entries.insert(identity, profile);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> StoreStats {
        self.entries
            .iter()
            .fold(StoreStats::default(), |mut stats, entry| {
                stats.total += 1;
                if entry.value().pays_dividend() {
                    stats.dividend_paying += 1;
                } else {
                    stats.non_dividend_paying += 1;
                }
                if entry.value().is_fund {
                    stats.fund_count += 1;
                }
                stats
            })
    }

    /// Point-in-time copy for persistence.
    pub fn snapshot(&self) -> HashMap<CanonicalIdentity, DividendProfile> {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}

impl IdentityLookup for DividendStore {
    fn contains_identity(&self, identity: &str) -> bool {
        self.has(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    #[test]
    fn test_put_then_get_returns_exact_profile() {
        let store = DividendStore::new();
        let profile = DividendProfile::paying(dec!(0.96), dec!(0.52));

        assert_eq!(store.put("AAPL".into(), profile.clone()), None);
        assert_eq!(store.get("AAPL"), Some(profile));
        assert!(store.has("AAPL"));
        assert!(!store.has("MSFT"));
    }

    #[test]
    fn test_put_returns_previous_profile() {
        let store = DividendStore::new();
        let first = DividendProfile::paying(dec!(0.92), dec!(0.5));
        let second = DividendProfile::paying(dec!(0.96), dec!(0.52));

        store.put("AAPL".into(), first.clone());
        assert_eq!(store.put("AAPL".into(), second.clone()), Some(first));
        assert_eq!(store.get("AAPL"), Some(second));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_zero_profile_is_present() {
        let store = DividendStore::new();
        store.put("BRK.B".into(), DividendProfile::non_paying());

        assert!(store.has("BRK.B"));
        assert_eq!(store.get("BRK.B").unwrap().annual_amount, Decimal::ZERO);
    }

    #[test]
    fn test_stats() {
        let store = DividendStore::from_profiles([
            ("AAPL".into(), DividendProfile::paying(dec!(0.96), dec!(0.5))),
            ("SCHD".into(), DividendProfile::paying(dec!(2.66), dec!(3.4)).fund(true)),
            ("TSLA".into(), DividendProfile::non_paying()),
        ]);

        assert_eq!(
            store.stats(),
            StoreStats {
                total: 3,
                dividend_paying: 2,
                non_dividend_paying: 1,
                fund_count: 1,
            }
        );
    }

    #[test]
    fn test_snapshot_round_trips_through_json() {
        let store = DividendStore::new();
        store.put("KO".into(), DividendProfile::paying(dec!(1.94), dec!(3.1)));
        store.put("TSLA".into(), DividendProfile::non_paying());

        let json = serde_json::to_string(&store.snapshot()).unwrap();
        let restored: HashMap<CanonicalIdentity, DividendProfile> =
            serde_json::from_str(&json).unwrap();
        let reloaded = DividendStore::from_profiles(restored);

        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get("KO"), store.get("KO"));
        assert!(reloaded.has("TSLA"));
    }

    #[test]
    fn test_identity_lookup() {
        let store = DividendStore::new();
        store.put("SHOP".into(), DividendProfile::non_paying());

        assert!(store.contains_identity("SHOP"));
        assert!(!store.contains_identity("SHOP.TO"));
    }

    #[tokio::test]
    async fn test_concurrent_puts_on_distinct_keys() {
        let store = Arc::new(DividendStore::new());
        let mut handles = Vec::new();

        for i in 0..32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.put(
                    CanonicalIdentity::new(format!("T{}", i)),
                    DividendProfile::paying(Decimal::from(i + 1), dec!(1)),
                )
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_none());
        }

        assert_eq!(store.len(), 32);
    }
}
