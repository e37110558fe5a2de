//! Progression state machine: level, XP, history, streaks, unlocks.

use crate::achievements::{AchievementDefinition, catalog};
use crate::level::required_xp;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// XP history entries kept (oldest dropped first).
pub const XP_HISTORY_CAP: usize = 50;

/// One XP grant, for the activity feed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct XpEvent {
    pub amount: u64,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

/// Per-user unlock state for one achievement.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AchievementState {
    pub unlocked: bool,
    pub unlocked_at: Option<DateTime<Utc>>,
    /// 0–100; always 100 once unlocked.
    pub progress: f32,
}

/// Outcome of an XP grant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelUp {
    pub leveled_up: bool,
    pub new_level: Option<u32>,
}

impl LevelUp {
    const NONE: Self = Self {
        leveled_up: false,
        new_level: None,
    };
}

/// The persisted progression record.
///
/// Invariant: after any mutation through the methods here, at most one
/// level transition has occurred per grant — a single `add_xp` call never
/// cascades through multiple levels, even when the carried remainder would
/// qualify (capped XP sources keep that theoretical).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Progression {
    pub level: u32,
    pub xp: u64,
    pub total_xp: u64,
    pub xp_history: Vec<XpEvent>,
    pub achievements: BTreeMap<String, AchievementState>,
    pub consecutive_days: u32,
    pub last_activity_date: Option<NaiveDate>,
}

impl Default for Progression {
    fn default() -> Self {
        Self::new()
    }
}

impl Progression {
    /// Fresh state: level 1, no XP, every achievement locked.
    #[must_use]
    pub fn new() -> Self {
        let achievements = catalog()
            .iter()
            .map(|def| (def.id.to_string(), AchievementState::default()))
            .collect();
        Self {
            level: 1,
            xp: 0,
            total_xp: 0,
            xp_history: Vec::new(),
            achievements,
            consecutive_days: 0,
            last_activity_date: None,
        }
    }

    /// Backfills state slots for achievements added to the catalog after
    /// this record was persisted. Called after deserialization.
    pub fn ensure_catalog(&mut self) {
        for def in catalog() {
            self.achievements.entry(def.id.to_string()).or_default();
        }
    }

    /// Grants XP and evaluates a single level transition.
    ///
    /// The remainder above the threshold carries into the new level; it is
    /// *not* re-checked against the next threshold (one transition per
    /// call). `total_xp` accumulates unconditionally.
    pub fn add_xp(&mut self, amount: u64, reason: &str) -> LevelUp {
        self.add_xp_at(amount, reason, Utc::now())
    }

    /// [`add_xp`](Self::add_xp) with an explicit timestamp.
    pub fn add_xp_at(&mut self, amount: u64, reason: &str, now: DateTime<Utc>) -> LevelUp {
        self.xp_history.push(XpEvent {
            amount,
            reason: reason.to_string(),
            timestamp: now,
        });
        if self.xp_history.len() > XP_HISTORY_CAP {
            let overflow = self.xp_history.len() - XP_HISTORY_CAP;
            self.xp_history.drain(..overflow);
        }

        let candidate = self.xp + amount;
        let result = if candidate >= required_xp(self.level + 1) {
            self.level += 1;
            self.xp = candidate - required_xp(self.level);
            debug!("leveled up to {} ({} xp carried)", self.level, self.xp);
            LevelUp {
                leveled_up: true,
                new_level: Some(self.level),
            }
        } else {
            self.xp = candidate;
            LevelUp::NONE
        };

        self.total_xp += amount;
        result
    }

    /// XP still needed to reach the next level.
    #[must_use]
    pub fn required_xp_for_next_level(&self) -> u64 {
        required_xp(self.level + 1)
    }

    #[must_use]
    pub fn user_level(&self) -> u32 {
        self.level
    }

    /// Streak bookkeeping for today's activity.
    pub fn update_activity(&mut self) {
        self.update_activity_on(Utc::now().date_naive());
    }

    /// Streak bookkeeping against an explicit calendar date.
    ///
    /// Same day: no-op. Exactly the next day: streak extends. Anything
    /// else (first call, gap, clock rollback): streak restarts at 1.
    pub fn update_activity_on(&mut self, today: NaiveDate) {
        match self.last_activity_date {
            Some(last) if last == today => return,
            Some(last) if today.signed_duration_since(last) == Duration::days(1) => {
                self.consecutive_days += 1;
            }
            _ => self.consecutive_days = 1,
        }
        self.last_activity_date = Some(today);
    }

    /// Unlocks an achievement and credits its XP reward.
    ///
    /// Idempotent: an already-unlocked achievement returns `None` and
    /// grants nothing. Unlocks never reverse except through
    /// [`reset`](Self::reset).
    pub fn unlock(&mut self, def: &AchievementDefinition) -> Option<LevelUp> {
        self.unlock_at(def, Utc::now())
    }

    /// [`unlock`](Self::unlock) with an explicit timestamp.
    pub fn unlock_at(&mut self, def: &AchievementDefinition, now: DateTime<Utc>) -> Option<LevelUp> {
        {
            let state = self.achievements.entry(def.id.to_string()).or_default();
            if state.unlocked {
                return None;
            }
            state.unlocked = true;
            state.unlocked_at = Some(now);
            state.progress = 100.0;
        }
        debug!("achievement unlocked: {}", def.id);
        Some(self.add_xp_at(def.xp_reward, &format!("achievement:{}", def.id), now))
    }

    /// Reinitializes the whole record: level 1, empty history, all
    /// achievements re-locked, streak cleared.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
