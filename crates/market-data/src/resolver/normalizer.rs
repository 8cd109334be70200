//! Symbol normalizer - raw broker symbol to canonical identity.
//!
//! Normalization is an ordered rule pipeline:
//!
//! ```text
//!   raw ──► trim ──► strip suffixes ──► uppercase ──► custom rules ──► alias table
//!            ▲                                              │
//!            └────────────── until nothing changes ─────────┘
//! ```
//!
//! Resolution against a store adds a candidate-list fallback on top, because
//! broker feeds are inconsistent and the store may have been seeded under a
//! different convention than the primary rule.

use log::debug;

use crate::models::CanonicalIdentity;

use super::aliases::AliasTable;
use super::suffix_rules::SuffixRules;
use super::traits::{IdentityLookup, ResolutionSource, ResolvedIdentity, SymbolRule};

/// Characters that separate a ticker from trailing venue/type noise.
const SEPARATORS: &[char] = &['.', '_', '-', ':', '/', ' '];

/// Upper bound on pipeline passes; well-behaved rules converge in two.
const MAX_PASSES: usize = 8;

pub struct SymbolNormalizer {
    suffixes: SuffixRules,
    rules: Vec<Box<dyn SymbolRule>>,
    aliases: AliasTable,
}

impl Default for SymbolNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolNormalizer {
    /// Normalizer with the default broker suffixes and alias table.
    pub fn new() -> Self {
        Self::with_parts(SuffixRules::default(), AliasTable::default())
    }

    pub fn with_parts(suffixes: SuffixRules, aliases: AliasTable) -> Self {
        Self {
            suffixes,
            rules: Vec::new(),
            aliases,
        }
    }

    /// Default rules plus extra aliases on top of the default table.
    pub fn with_aliases<'a>(extra: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut aliases = AliasTable::default();
        for (from, to) in extra {
            aliases.insert(from, to);
        }
        Self::with_parts(SuffixRules::default(), aliases)
    }

    /// Add a custom rewrite rule.
    ///
    /// Custom rules run after uppercasing and before the alias table, which
    /// is always last. Rules must converge (applying one to its own output
    /// must eventually return `None`).
    pub fn add_rule(&mut self, rule: Box<dyn SymbolRule>) {
        self.rules.push(rule);
    }

    pub fn suffix_rules(&self) -> &SuffixRules {
        &self.suffixes
    }

    /// Map a raw broker symbol to its canonical identity.
    ///
    /// Empty input yields the empty identity. Symbols that are nothing but
    /// punctuation pass through unchanged.
    pub fn normalize(&self, raw: &str) -> CanonicalIdentity {
        let form = self.canonical_form(raw);
        match self.aliases.lookup(&form) {
            Some(alias) => {
                debug!("Normalizer: '{}' aliased to '{}'", raw, alias);
                alias.clone()
            }
            None => CanonicalIdentity::from(form),
        }
    }

    /// Strip/uppercase/custom-rule passes, repeated to a fixpoint.
    fn canonical_form(&self, raw: &str) -> String {
        let mut current = raw.trim().to_string();
        for _ in 0..MAX_PASSES {
            let mut next = self.strip_trimmed(&current).to_uppercase();
            for rule in &self.rules {
                if let Some(rewritten) = rule.apply(&next) {
                    debug!(
                        "Normalizer: rule '{}' rewrote '{}' to '{}'",
                        rule.name(),
                        next,
                        rewritten
                    );
                    next = rewritten;
                }
            }
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    fn strip_trimmed<'a>(&self, symbol: &'a str) -> &'a str {
        let mut current = symbol.trim();
        while let Some(stripped) = self.suffixes.strip_longest(current) {
            current = stripped.trim();
        }
        current
    }

    /// Ordered candidate spellings for store resolution, deduplicated.
    ///
    /// 1. the full normalized form
    /// 2. the raw form uppercased
    /// 3. each single-suffix-stripped variant of the raw form
    /// 4. the substring before the first separator
    pub fn candidates(&self, raw: &str) -> Vec<ResolvedIdentity> {
        let trimmed = raw.trim();
        let mut out: Vec<ResolvedIdentity> = Vec::new();
        let mut push = |identity: CanonicalIdentity, source: ResolutionSource| {
            if !identity.is_empty() && !out.iter().any(|c| c.identity == identity) {
                out.push(ResolvedIdentity { identity, source });
            }
        };

        push(self.normalize(trimmed), ResolutionSource::Normalized);
        push(
            CanonicalIdentity::from(trimmed.to_uppercase()),
            ResolutionSource::RawForm,
        );
        for variant in self.suffixes.stripped_variants(trimmed) {
            push(
                CanonicalIdentity::from(variant.trim().to_uppercase()),
                ResolutionSource::SuffixVariant,
            );
        }
        if let Some((prefix, _)) = trimmed.split_once(SEPARATORS) {
            push(
                CanonicalIdentity::from(prefix.to_uppercase()),
                ResolutionSource::SeparatorPrefix,
            );
        }

        out
    }

    /// Find the first candidate spelling known to `lookup`.
    ///
    /// `None` is an ordinary cache miss, not an error.
    pub fn resolve_against_store<L>(&self, raw: &str, lookup: &L) -> Option<ResolvedIdentity>
    where
        L: IdentityLookup + ?Sized,
    {
        let found = self
            .candidates(raw)
            .into_iter()
            .find(|c| lookup.contains_identity(c.identity.as_str()));

        if let Some(ref hit) = found {
            if hit.source != ResolutionSource::Normalized {
                debug!(
                    "Normalizer: '{}' matched '{}' via {} fallback",
                    raw, hit.identity, hit.source
                );
            }
        }
        found
    }
}
