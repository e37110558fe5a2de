//! Achievement catalog and rule evaluation.
//!
//! The engine is a pure evaluator: given the current activity facts it
//! reports which locked achievements now qualify. Unlocking (state flip +
//! XP credit) is the caller's job, via `Progression::unlock`.

use crate::state::AchievementState;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc};
use moneta_model::Transaction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Savings milestones require this many days since the earliest
/// transaction — a minimum-duration gate, not just a peak-value check.
pub const MIN_SAVINGS_DAYS: i64 = 30;

/// Threshold for the single-large-income achievement.
pub const LARGE_INCOME_THRESHOLD: f64 = 100_000.0;

/// Off-hours window: late night from this hour, early morning below
/// [`OFF_HOURS_END`]. Crosses midnight, so membership is a disjunction.
pub const OFF_HOURS_START: u32 = 22;
pub const OFF_HOURS_END: u32 = 5;

/// The monthly-goal achievement only evaluates in the final N days of the
/// month.
pub const GOAL_WINDOW_DAYS: u32 = 3;

/// Categories that must all be covered for the explorer achievement.
pub const KNOWN_CATEGORIES: &[&str] = &[
    "food",
    "transport",
    "housing",
    "entertainment",
    "health",
    "shopping",
    "salary",
    "other",
];

/// Progress metric family for an achievement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementCategory {
    Transactions,
    Savings,
    Streak,
    Level,
    Special,
    Goal,
}

/// Predicate attached to an achievement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Requirement {
    /// At least this many recorded transactions.
    TransactionCount(usize),
    /// Net savings at or above this amount, gated by [`MIN_SAVINGS_DAYS`].
    SavingsAmount(f64),
    /// Unbroken daily streak of at least this many days.
    StreakDays(u32),
    /// User level at or above this value.
    LevelReached(u32),
    /// First income ever recorded.
    FirstIncome,
    /// First expense ever recorded.
    FirstExpense,
    /// Any single income transaction at or above the threshold.
    SingleIncomeAtLeast(f64),
    /// At least one transaction in every known category.
    AllCategories,
    /// Any transaction created in the off-hours window.
    OffHoursTransaction,
    /// A calendar month where income strictly exceeds nonzero expenses.
    ProfitableMonth,
    /// Period savings meet the configured goal, in the month-end window.
    MonthlyGoalMet,
}

/// Immutable catalog entry.
#[derive(Clone, Debug)]
pub struct AchievementDefinition {
    pub id: &'static str,
    pub title: &'static str,
    pub category: AchievementCategory,
    pub requirement: Requirement,
    pub xp_reward: u64,
}

/// The fixed achievement catalog. Rewards are sized small (10–60 XP) so a
/// single day of activity cannot push a fresh account past level 2.
static CATALOG: &[AchievementDefinition] = &[
    AchievementDefinition {
        id: "first_transaction",
        title: "Getting Started",
        category: AchievementCategory::Transactions,
        requirement: Requirement::TransactionCount(1),
        xp_reward: 10,
    },
    AchievementDefinition {
        id: "ten_transactions",
        title: "Bookkeeper",
        category: AchievementCategory::Transactions,
        requirement: Requirement::TransactionCount(10),
        xp_reward: 25,
    },
    AchievementDefinition {
        id: "fifty_transactions",
        title: "Meticulous",
        category: AchievementCategory::Transactions,
        requirement: Requirement::TransactionCount(50),
        xp_reward: 40,
    },
    AchievementDefinition {
        id: "hundred_transactions",
        title: "Ledger Legend",
        category: AchievementCategory::Transactions,
        requirement: Requirement::TransactionCount(100),
        xp_reward: 60,
    },
    AchievementDefinition {
        id: "first_income",
        title: "Money In",
        category: AchievementCategory::Special,
        requirement: Requirement::FirstIncome,
        xp_reward: 20,
    },
    AchievementDefinition {
        id: "first_expense",
        title: "Money Out",
        category: AchievementCategory::Special,
        requirement: Requirement::FirstExpense,
        xp_reward: 10,
    },
    AchievementDefinition {
        id: "big_earner",
        title: "Windfall",
        category: AchievementCategory::Special,
        requirement: Requirement::SingleIncomeAtLeast(LARGE_INCOME_THRESHOLD),
        xp_reward: 40,
    },
    AchievementDefinition {
        id: "savings_1k",
        title: "Rainy-Day Fund",
        category: AchievementCategory::Savings,
        requirement: Requirement::SavingsAmount(1_000.0),
        xp_reward: 30,
    },
    AchievementDefinition {
        id: "savings_10k",
        title: "Nest Egg",
        category: AchievementCategory::Savings,
        requirement: Requirement::SavingsAmount(10_000.0),
        xp_reward: 60,
    },
    AchievementDefinition {
        id: "streak_7",
        title: "One Week Strong",
        category: AchievementCategory::Streak,
        requirement: Requirement::StreakDays(7),
        xp_reward: 30,
    },
    AchievementDefinition {
        id: "streak_30",
        title: "Habit Formed",
        category: AchievementCategory::Streak,
        requirement: Requirement::StreakDays(30),
        xp_reward: 60,
    },
    AchievementDefinition {
        id: "level_5",
        title: "Climbing",
        category: AchievementCategory::Level,
        requirement: Requirement::LevelReached(5),
        xp_reward: 40,
    },
    AchievementDefinition {
        id: "level_10",
        title: "Seasoned",
        category: AchievementCategory::Level,
        requirement: Requirement::LevelReached(10),
        xp_reward: 60,
    },
    AchievementDefinition {
        id: "category_explorer",
        title: "Full Spectrum",
        category: AchievementCategory::Special,
        requirement: Requirement::AllCategories,
        xp_reward: 40,
    },
    AchievementDefinition {
        id: "night_owl",
        title: "Night Owl",
        category: AchievementCategory::Special,
        requirement: Requirement::OffHoursTransaction,
        xp_reward: 15,
    },
    AchievementDefinition {
        id: "monthly_winner",
        title: "In the Black",
        category: AchievementCategory::Special,
        requirement: Requirement::ProfitableMonth,
        xp_reward: 30,
    },
    AchievementDefinition {
        id: "goal_crusher",
        title: "Goal Crusher",
        category: AchievementCategory::Goal,
        requirement: Requirement::MonthlyGoalMet,
        xp_reward: 50,
    },
];

/// The immutable achievement catalog.
#[must_use]
pub fn catalog() -> &'static [AchievementDefinition] {
    CATALOG
}

/// Looks up a catalog entry by id.
#[must_use]
pub fn definition(id: &str) -> Option<&'static AchievementDefinition> {
    CATALOG.iter().find(|def| def.id == id)
}

/// Activity facts the engine evaluates against. Assembled by the caller
/// from the ledger, settings and progression state.
#[derive(Clone, Debug)]
pub struct AchievementContext<'a> {
    pub transactions: &'a [Transaction],
    /// All-time net savings (income minus expenses).
    pub savings: f64,
    /// Net savings of the current calendar month.
    pub period_savings: f64,
    pub consecutive_days: u32,
    pub level: u32,
    pub monthly_goal: Option<f64>,
    pub now: DateTime<Utc>,
}

/// Evaluates every locked achievement against `context` and returns those
/// that newly qualify. Pure: mutates nothing.
pub fn check_achievements(
    context: &AchievementContext<'_>,
    states: &BTreeMap<String, AchievementState>,
) -> Vec<&'static AchievementDefinition> {
    CATALOG
        .iter()
        .filter(|def| !states.get(def.id).is_some_and(|s| s.unlocked))
        .filter(|def| requirement_met(&def.requirement, context))
        .collect()
}

/// Progress toward an achievement as 0–100, clamped. Unlocked achievements
/// report 100; special one-shot conditions are binary.
#[must_use]
pub fn achievement_progress(
    def: &AchievementDefinition,
    context: &AchievementContext<'_>,
    state: Option<&AchievementState>,
) -> f32 {
    if state.is_some_and(|s| s.unlocked) {
        return 100.0;
    }

    let ratio = |current: f64, required: f64| -> f32 {
        if required <= 0.0 {
            return 100.0;
        }
        ((current / required) * 100.0).clamp(0.0, 100.0) as f32
    };

    match def.requirement {
        Requirement::TransactionCount(n) => ratio(context.transactions.len() as f64, n as f64),
        Requirement::SavingsAmount(target) => ratio(context.savings.max(0.0), target),
        Requirement::StreakDays(n) => ratio(f64::from(context.consecutive_days), f64::from(n)),
        Requirement::LevelReached(n) => ratio(f64::from(context.level), f64::from(n)),
        _ => {
            if requirement_met(&def.requirement, context) {
                100.0
            } else {
                0.0
            }
        }
    }
}

fn requirement_met(requirement: &Requirement, ctx: &AchievementContext<'_>) -> bool {
    match *requirement {
        Requirement::TransactionCount(n) => ctx.transactions.len() >= n,
        Requirement::SavingsAmount(target) => {
            ctx.savings >= target && savings_gate_elapsed(ctx)
        }
        Requirement::StreakDays(n) => ctx.consecutive_days >= n,
        Requirement::LevelReached(n) => ctx.level >= n,
        Requirement::FirstIncome => ctx.transactions.iter().any(Transaction::is_income),
        Requirement::FirstExpense => ctx.transactions.iter().any(Transaction::is_expense),
        Requirement::SingleIncomeAtLeast(threshold) => ctx
            .transactions
            .iter()
            .any(|tx| tx.is_income() && tx.amount >= threshold),
        Requirement::AllCategories => {
            KNOWN_CATEGORIES.iter().all(|category| {
                ctx.transactions.iter().any(|tx| tx.category == *category)
            })
        }
        Requirement::OffHoursTransaction => ctx.transactions.iter().any(|tx| {
            let hour = tx.created_at.hour();
            hour >= OFF_HOURS_START || hour < OFF_HOURS_END
        }),
        Requirement::ProfitableMonth => has_profitable_month(ctx.transactions),
        Requirement::MonthlyGoalMet => {
            let Some(goal) = ctx.monthly_goal.filter(|g| *g > 0.0) else {
                return false;
            };
            in_goal_window(ctx.now.date_naive()) && ctx.period_savings >= goal
        }
    }
}

/// At least [`MIN_SAVINGS_DAYS`] must have elapsed since the earliest
/// transaction. No transactions means the clock has not started.
fn savings_gate_elapsed(ctx: &AchievementContext<'_>) -> bool {
    let Some(earliest) = ctx.transactions.iter().map(|tx| tx.date).min() else {
        return false;
    };
    ctx.now.signed_duration_since(earliest) >= Duration::days(MIN_SAVINGS_DAYS)
}

/// Any calendar month where income strictly exceeds expenses and expenses
/// are nonzero (an expense-free month does not count).
fn has_profitable_month(transactions: &[Transaction]) -> bool {
    let mut months: BTreeMap<(i32, u32), (f64, f64)> = BTreeMap::new();
    for tx in transactions {
        let entry = months.entry((tx.date.year(), tx.date.month())).or_default();
        if tx.is_income() {
            entry.0 += tx.amount;
        } else {
            entry.1 += tx.amount;
        }
    }
    months
        .values()
        .any(|(income, expenses)| *income > *expenses && *expenses > 0.0)
}

/// True within the final [`GOAL_WINDOW_DAYS`] days of `date`'s month.
fn in_goal_window(date: NaiveDate) -> bool {
    date.day() > last_day_of_month(date).saturating_sub(GOAL_WINDOW_DAYS)
}

fn last_day_of_month(date: NaiveDate) -> u32 {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    // First of next month always exists; its predecessor is the last day
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.pred_opt())
        .map_or(28, |d| d.day())
}
