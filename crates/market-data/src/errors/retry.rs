/// Classification for retry policy.
///
/// Providers never retry on their own. The classification tells the caller
/// (the reconciler) what a later attempt can be expected to achieve.
///
/// # Behavior Summary
///
/// | Class | Retried next run? | Worth slowing down? |
/// |-------|-------------------|---------------------|
/// | `Never` | Yes (no memoization) but unlikely to succeed | No |
/// | `NextRun` | Yes | No |
/// | `WithBackoff` | Yes | Yes, provider is pushing back |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// The request is fundamentally invalid (unknown symbol, unusable payload).
    Never,

    /// Transient provider-side failure. A later run may succeed.
    NextRun,

    /// The provider rate limited us or timed out.
    ///
    /// Reported so callers can tune their pacing strategy; there is no
    /// automatic adaptation.
    WithBackoff,
}

impl std::fmt::Display for RetryClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Never => write!(f, "never"),
            Self::NextRun => write!(f, "next-run"),
            Self::WithBackoff => write!(f, "with-backoff"),
        }
    }
}
