//! Level curve and XP source formulas.
//!
//! The economy is deliberately asymmetric: income is rewarded on a
//! square-root curve with a hard cap, spending earns a token amount, and
//! the savings bonus only pays out on period-over-period improvement.
//! Every source is capped so no single event can runaway-level an account.

use moneta_model::TransactionType;

/// Base XP cost of level 2.
pub const XP_BASE: f64 = 50.0;

/// Per-level growth factor.
pub const XP_GROWTH: f64 = 1.4;

/// Income XP floor and the cap on its amount-scaled bonus.
pub const INCOME_BASE_XP: u64 = 15;
pub const INCOME_BONUS_CAP: u64 = 20;

/// Flat XP for recording an expense.
pub const EXPENSE_XP: u64 = 2;

/// Cap on the period savings bonus.
pub const SAVINGS_BONUS_CAP: u64 = 30;

/// XP required to *be* at `level`: `floor(BASE * GROWTH^(level-1))`.
///
/// Strictly increasing by construction; `required_xp(2) == 70`.
#[must_use]
pub fn required_xp(level: u32) -> u64 {
    (XP_BASE * XP_GROWTH.powi(level as i32 - 1)).floor() as u64
}

/// XP granted for a sanitized transaction.
#[must_use]
pub fn transaction_xp(tx_type: TransactionType, amount: f64) -> u64 {
    match tx_type {
        TransactionType::Income => income_xp(amount),
        TransactionType::Expense => EXPENSE_XP,
    }
}

/// Income grants `15 + min(20, floor(sqrt(amount/1000) * 2))`.
#[must_use]
pub fn income_xp(amount: f64) -> u64 {
    let scaled = (amount.max(0.0) / 1000.0).sqrt() * 2.0;
    INCOME_BASE_XP + (scaled.floor() as u64).min(INCOME_BONUS_CAP)
}

/// Savings bonus: `min(30, floor(sqrt(increase/100) * 1.5))` when the
/// current period's net savings strictly exceed the prior period's and are
/// positive; zero otherwise.
#[must_use]
pub fn savings_bonus_xp(previous: f64, current: f64) -> u64 {
    if current <= 0.0 || current <= previous {
        return 0;
    }
    let increase = current - previous;
    let scaled = (increase / 100.0).sqrt() * 1.5;
    (scaled.floor() as u64).min(SAVINGS_BONUS_CAP)
}
