//! Dividend reconciliation and enrichment.
//!
//! This module keeps a reference store of dividend profiles in sync with the
//! user's holdings and derives portfolio-level dividend metrics from it.

mod dividend_store;
mod dividends_model;
mod dividends_service;
mod dividends_traits;
mod metrics_deriver;
mod pacing;
mod reconciler;
mod store_snapshot;

pub use dividend_store::*;
pub use dividends_model::*;
pub use dividends_service::*;
pub use dividends_traits::*;
pub use metrics_deriver::*;
pub use pacing::*;
pub use reconciler::*;
pub use store_snapshot::*;

#[cfg(test)]
mod test_support;

#[cfg(test)]
mod reconciler_tests;
