//! # lendscore-aggregate — per-wallet behaviour aggregation.
//!
//! Events are folded into one [`WalletAccumulator`] per wallet in arrival
//! order. A single finalization pass then turns every accumulator into
//! read-only [`WalletStats`](lendscore_core::WalletStats):
//! - **Activity window**: first/last activity as UTC calendar time and the
//!   whole-day span between them.
//! - **Borrow-to-repay latency**: sorted borrow and repay timestamps are
//!   paired by rank; pairs where the repay does not follow the borrow are
//!   dropped, and the mean gap is reported in days.

pub mod accumulator;
pub mod aggregator;
pub mod timing;

pub use accumulator::WalletAccumulator;
pub use aggregator::{aggregate, Aggregator, IngestReport};
pub use timing::{activity_window, avg_borrow_to_repay_days, ActivityWindow};
