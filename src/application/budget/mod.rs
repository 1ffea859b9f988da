//! Budget enforcement for paid upstream APIs.
//!
//! Two guards protect against cost overruns:
//! - [`BudgetTracker`] - daily request caps and estimated-cost accounting,
//!   persisted to a JSON ledger
//! - [`ProviderThrottle`] - outbound requests/minute smoothing to stay
//!   under provider rate limits

mod throttle;
mod tracker;

pub use throttle::ProviderThrottle;
pub use tracker::{BudgetTracker, UsageSummary};
