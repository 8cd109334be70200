use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Decimal precision for display amounts
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Decimal precision for yields (percent)
pub const YIELD_DECIMAL_PRECISION: u32 = 4;

/// Identities fetched concurrently per batch
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Pause between consecutive batches, in milliseconds
pub const DEFAULT_BATCH_PAUSE_MS: u64 = 1_000;

/// Age after which a fetched profile is reported stale
pub const DEFAULT_STALE_AFTER_DAYS: i64 = 7;

/// Annual dividend growth rate assumed by projections (5%)
pub const DEFAULT_GROWTH_RATE: Decimal = dec!(0.05);

/// Blended yield (percent) up to which income is classed as safe
pub const SAFE_YIELD_CEILING: Decimal = dec!(4);

/// Blended yield (percent) up to which income is classed as moderate
pub const MODERATE_YIELD_CEILING: Decimal = dec!(8);
