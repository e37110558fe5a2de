//! Progression engine for Moneta.
//!
//! Converts user activity into experience points, levels and achievements
//! with strict anti-inflation guarantees: every XP source is capped, level
//! transitions resolve one at a time, and achievement rewards are one-shot.
//!
//! The achievement engine is a pure rule evaluator; callers apply its
//! results through `Progression::unlock` and persist the record with
//! `ProgressionStore`.

mod achievements;
mod level;
mod state;
mod store;

pub use achievements::{
    AchievementCategory, AchievementContext, AchievementDefinition, GOAL_WINDOW_DAYS,
    KNOWN_CATEGORIES, LARGE_INCOME_THRESHOLD, MIN_SAVINGS_DAYS, OFF_HOURS_END, OFF_HOURS_START,
    Requirement, achievement_progress, catalog, check_achievements, definition,
};
pub use level::{
    EXPENSE_XP, INCOME_BASE_XP, INCOME_BONUS_CAP, SAVINGS_BONUS_CAP, XP_BASE, XP_GROWTH,
    income_xp, required_xp, savings_bonus_xp, transaction_xp,
};
pub use state::{
    AchievementState, LevelUp, Progression, XP_HISTORY_CAP, XpEvent,
};
pub use store::{PROGRESSION_RECORD, ProgressionStore};
