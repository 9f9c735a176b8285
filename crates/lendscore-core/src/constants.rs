//! Scoring constants and output defaults. All monetary values are in USD.

/// Score every wallet starts from before any rule fires.
pub const BASE_SCORE: f64 = 50.0;

/// Lowest score a wallet can end with after clamping.
pub const MIN_SCORE: f64 = 0.0;

/// Highest score a wallet can end with after clamping.
pub const MAX_SCORE: f64 = 100.0;

/// Repaid ÷ borrowed must be strictly above this to earn [`REPAY_RATIO_BONUS`].
pub const REPAY_RATIO_THRESHOLD: f64 = 0.7;

/// Bonus for repaying most of what was borrowed.
pub const REPAY_RATIO_BONUS: f64 = 20.0;

/// Withdrawn ÷ deposited must be strictly below this to earn [`DEPOSIT_RETENTION_BONUS`].
pub const WITHDRAW_RATIO_THRESHOLD: f64 = 0.5;

/// Bonus for leaving most deposits in the protocol.
pub const DEPOSIT_RETENTION_BONUS: f64 = 15.0;

/// Penalty for having been liquidated at least once.
pub const LIQUIDATION_PENALTY: f64 = -30.0;

/// Penalty for borrowing more than was ever deposited.
pub const BORROW_BALANCE_PENALTY: f64 = -10.0;

/// Decimal places kept on scores and on the average borrow-to-repay latency.
pub const ROUND_DECIMALS: i32 = 2;

/// Seconds in one day, used to express latencies in days.
pub const SECS_PER_DAY: f64 = 86_400.0;

/// Separator between reasons in the flattened `reason_for_score` column.
pub const REASON_SEPARATOR: &str = "; ";

/// Default file name of the wallet behaviour table.
pub const DEFAULT_BEHAVIOR_FILE: &str = "wallet_behavior_details.csv";

/// Default file name of the wallet score table.
pub const DEFAULT_SCORES_FILE: &str = "wallet_scores.csv";

/// Prefix for environment variables read by the configuration layer.
pub const ENV_PREFIX: &str = "LENDSCORE";

/// Round `value` to `decimals` decimal places (half away from zero).
///
/// # Examples
///
/// ```
/// use lendscore_core::constants::round_to;
/// assert_eq!(round_to(2.0 / 3.0, 2), 0.67);
/// assert_eq!(round_to(1.2345, 2), 1.23);
/// ```
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
