//! The fixed scoring rule table.
//!
//! | Rule                         | Delta | Reason                          |
//! |------------------------------|-------|---------------------------------|
//! | repaid ÷ borrowed > 0.7      | +20   | High repay-to-borrow ratio      |
//! | withdrawn ÷ deposited < 0.5  | +15   | Keeps deposits mostly intact    |
//! | liquidated                   | −30   | Got liquidated                  |
//! | borrowed > deposited         | −10   | High borrow balance             |

use lendscore_core::constants::{
    BORROW_BALANCE_PENALTY, DEPOSIT_RETENTION_BONUS, LIQUIDATION_PENALTY, REPAY_RATIO_BONUS,
    REPAY_RATIO_THRESHOLD, WITHDRAW_RATIO_THRESHOLD,
};
use lendscore_core::types::{ScoreReason, WalletStats};

/// `numerator / denominator`, or exactly 0 when the denominator is 0.
///
/// # Examples
///
/// ```
/// use lendscore_scoring::ratio;
/// assert_eq!(ratio(400.0, 500.0), 0.8);
/// assert_eq!(ratio(400.0, 0.0), 0.0);
/// ```
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

pub fn repay_ratio(stats: &WalletStats) -> f64 {
    ratio(stats.total_repay, stats.total_borrow)
}

pub fn withdraw_ratio(stats: &WalletStats) -> f64 {
    ratio(stats.total_withdraw, stats.total_deposit)
}

/// One scoring rule: a predicate over wallet statistics and its effect.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub reason: ScoreReason,
    pub delta: f64,
    applies: fn(&WalletStats) -> bool,
}

impl Rule {
    pub fn applies(&self, stats: &WalletStats) -> bool {
        (self.applies)(stats)
    }
}

fn high_repay_ratio(stats: &WalletStats) -> bool {
    repay_ratio(stats) > REPAY_RATIO_THRESHOLD
}

fn deposits_intact(stats: &WalletStats) -> bool {
    withdraw_ratio(stats) < WITHDRAW_RATIO_THRESHOLD
}

fn liquidated(stats: &WalletStats) -> bool {
    stats.liquidated
}

fn high_borrow_balance(stats: &WalletStats) -> bool {
    stats.total_borrow > stats.total_deposit
}

/// Rules in evaluation order. Reasons are reported in this order too.
pub static RULES: [Rule; 4] = [
    Rule {
        reason: ScoreReason::HighRepayRatio,
        delta: REPAY_RATIO_BONUS,
        applies: high_repay_ratio,
    },
    Rule {
        reason: ScoreReason::DepositsIntact,
        delta: DEPOSIT_RETENTION_BONUS,
        applies: deposits_intact,
    },
    Rule {
        reason: ScoreReason::Liquidated,
        delta: LIQUIDATION_PENALTY,
        applies: liquidated,
    },
    Rule {
        reason: ScoreReason::HighBorrowBalance,
        delta: BORROW_BALANCE_PENALTY,
        applies: high_borrow_balance,
    },
];
