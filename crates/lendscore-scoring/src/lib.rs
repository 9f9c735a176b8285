//! # lendscore-scoring — deterministic heuristic wallet scoring.
//!
//! Every wallet starts at a base score of 50. Four independent rules are
//! evaluated in a fixed order and all that apply fire; the result is clamped
//! to `0–100`. Ratios with a zero denominator are defined as 0, so a wallet
//! that never deposited always earns the deposit-retention bonus and a
//! wallet that never borrowed never earns the repayment bonus.

pub mod engine;
pub mod rules;

pub use engine::HeuristicScorer;
pub use rules::{ratio, Rule, RULES};
