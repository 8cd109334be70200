//! Static alias table for tickers that changed spelling.
//!
//! Corporate actions (renames, mergers) and broker-specific share-class
//! spellings leave old tickers in brokerage exports. Aliases are applied after
//! suffix stripping and uppercasing, and take precedence over the stripped
//! form.

use std::collections::HashMap;

use crate::models::CanonicalIdentity;

use super::traits::SymbolRule;

/// Default aliases: `(seen spelling, canonical spelling)`.
///
/// Targets must not themselves be keys, so applying the table twice is the
/// same as applying it once.
pub const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("FB", "META"),
    ("RDS.A", "SHEL"),
    ("RDS.B", "SHEL"),
    ("RDSA", "SHEL"),
    ("RDSB", "SHEL"),
    ("ANTM", "ELV"),
    ("FISV", "FI"),
    ("PEAK", "DOC"),
    ("BRK/B", "BRK.B"),
    ("BRK B", "BRK.B"),
    ("BRK-B", "BRK.B"),
    ("BRK_B", "BRK.B"),
    ("BF/B", "BF.B"),
    ("BF B", "BF.B"),
    ("BF-B", "BF.B"),
];

#[derive(Clone, Debug)]
pub struct AliasTable {
    aliases: HashMap<String, CanonicalIdentity>,
}

impl Default for AliasTable {
    fn default() -> Self {
        let mut table = Self::empty();
        for (from, to) in DEFAULT_ALIASES {
            table.insert(from, to);
        }
        table
    }
}

impl AliasTable {
    pub fn empty() -> Self {
        Self {
            aliases: HashMap::new(),
        }
    }

    /// Register an alias. Both sides are uppercased.
    pub fn insert(&mut self, from: &str, to: &str) {
        self.aliases.insert(
            from.trim().to_uppercase(),
            CanonicalIdentity::from(to.trim().to_uppercase()),
        );
    }

    /// Look up an uppercased symbol.
    pub fn lookup(&self, symbol: &str) -> Option<&CanonicalIdentity> {
        self.aliases.get(symbol)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    pub fn targets(&self) -> impl Iterator<Item = &CanonicalIdentity> {
        self.aliases.values()
    }
}

impl SymbolRule for AliasTable {
    fn name(&self) -> &'static str {
        "alias"
    }

    fn apply(&self, symbol: &str) -> Option<String> {
        self.lookup(symbol).map(|id| id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_aliases() {
        let table = AliasTable::default();

        assert_eq!(table.lookup("FB").map(|i| i.as_str()), Some("META"));
        assert_eq!(table.lookup("BRK/B").map(|i| i.as_str()), Some("BRK.B"));
        assert_eq!(table.lookup("AAPL"), None);
    }

    #[test]
    fn test_alias_targets_are_not_keys() {
        let table = AliasTable::default();

        for target in table.targets() {
            assert!(
                table.lookup(target.as_str()).is_none(),
                "alias target {} is itself aliased",
                target
            );
        }
    }

    #[test]
    fn test_insert_uppercases() {
        let mut table = AliasTable::empty();
        table.insert(" twtr ", "x");

        assert_eq!(table.lookup("TWTR").map(|i| i.as_str()), Some("X"));
        assert_eq!(table.len(), 1);
    }
}
