//! Broker suffix stripping.
//!
//! Brokers decorate tickers with venue and instrument-type markers
//! (`MSFT_US_EQ`, `VODl_EQ`, `AAPL.US`, `IBM US Equity`). This module holds the
//! whitelist of known markers and the longest-match-first stripping logic.
//!
//! Share classes like `BRK.B` are preserved because `.B` is not in the
//! whitelist.

use std::borrow::Cow;

use super::traits::SymbolRule;

/// A known broker suffix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SuffixPattern {
    /// Suffix text as it appears at the end of the raw symbol.
    pub text: Cow<'static, str>,
    /// Venue-letter markers (`l_EQ`) must match exactly, otherwise
    /// `AAPL_EQ` would lose its last letter.
    pub case_sensitive: bool,
}

impl SuffixPattern {
    pub const fn insensitive(text: &'static str) -> Self {
        Self {
            text: Cow::Borrowed(text),
            case_sensitive: false,
        }
    }

    pub const fn sensitive(text: &'static str) -> Self {
        Self {
            text: Cow::Borrowed(text),
            case_sensitive: true,
        }
    }

    /// Returns the symbol with this suffix removed, if it matches and leaves
    /// something behind.
    pub fn strip<'a>(&self, symbol: &'a str) -> Option<&'a str> {
        let suffix = self.text.as_ref();
        if symbol.len() <= suffix.len() {
            return None;
        }
        let cut = symbol.len() - suffix.len();
        if !symbol.is_char_boundary(cut) {
            return None;
        }
        let (head, tail) = symbol.split_at(cut);
        let matches = if self.case_sensitive {
            tail == suffix
        } else {
            tail.eq_ignore_ascii_case(suffix)
        };
        matches.then_some(head)
    }
}

/// Known broker suffixes.
///
/// Trading 212 style `_US_EQ` / `_EQ` markers, with a lowercase venue letter
/// for non-US listings (`l` London, `d` Xetra, `p` Paris, `e` Euronext,
/// `s` Swiss, `a` Amsterdam, `m` Milan), plus common `.US` / `-US` / `:US`
/// country markers, Bloomberg-style `US Equity`, and exchange names.
pub const BROKER_SUFFIXES: &[SuffixPattern] = &[
    SuffixPattern::insensitive(" US EQUITY"),
    SuffixPattern::insensitive(".NASDAQ"),
    SuffixPattern::insensitive(" EQUITY"),
    SuffixPattern::insensitive("_US_EQ"),
    SuffixPattern::insensitive(".NYSE"),
    SuffixPattern::insensitive(".XNYS"),
    SuffixPattern::insensitive(".XNAS"),
    SuffixPattern::sensitive("l_EQ"),
    SuffixPattern::sensitive("d_EQ"),
    SuffixPattern::sensitive("p_EQ"),
    SuffixPattern::sensitive("e_EQ"),
    SuffixPattern::sensitive("s_EQ"),
    SuffixPattern::sensitive("a_EQ"),
    SuffixPattern::sensitive("m_EQ"),
    SuffixPattern::insensitive("_EQ"),
    SuffixPattern::insensitive(".US"),
    SuffixPattern::insensitive("-US"),
    SuffixPattern::insensitive(":US"),
    SuffixPattern::insensitive(" US"),
];

/// Ordered set of suffix patterns.
#[derive(Clone, Debug)]
pub struct SuffixRules {
    patterns: Vec<SuffixPattern>,
}

impl Default for SuffixRules {
    fn default() -> Self {
        Self::new(BROKER_SUFFIXES.to_vec())
    }
}

impl SuffixRules {
    /// Build from a custom pattern list. Patterns are kept longest first.
    pub fn new(mut patterns: Vec<SuffixPattern>) -> Self {
        patterns.sort_by(|a, b| b.text.len().cmp(&a.text.len()));
        Self { patterns }
    }

    pub fn patterns(&self) -> &[SuffixPattern] {
        &self.patterns
    }

    /// Remove the single longest matching suffix.
    pub fn strip_longest<'a>(&self, symbol: &'a str) -> Option<&'a str> {
        // Patterns are sorted longest first, so the first hit is the longest.
        self.patterns.iter().find_map(|p| p.strip(symbol))
    }

    /// Strip repeatedly until no pattern matches.
    ///
    /// A symbol with one marker loses exactly its longest matching suffix;
    /// repeating makes normalization idempotent for stacked markers.
    pub fn strip_all<'a>(&self, symbol: &'a str) -> &'a str {
        let mut current = symbol;
        while let Some(stripped) = self.strip_longest(current) {
            current = stripped;
        }
        current
    }

    /// Every single-suffix-stripped variant of `symbol`, longest suffix first.
    pub fn stripped_variants<'a>(&self, symbol: &'a str) -> Vec<&'a str> {
        self.patterns.iter().filter_map(|p| p.strip(symbol)).collect()
    }
}

impl SymbolRule for SuffixRules {
    fn name(&self) -> &'static str {
        "suffix-strip"
    }

    fn apply(&self, symbol: &str) -> Option<String> {
        let stripped = self.strip_all(symbol);
        (stripped.len() != symbol.len()).then(|| stripped.to_string())
    }
}
