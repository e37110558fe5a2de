//! User settings record.

use serde::{Deserialize, Serialize};

/// Device-local user settings, persisted as one encrypted record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Savings target for the current month; feeds the monthly-goal
    /// achievement. `None` (or zero) disables it.
    #[serde(default)]
    pub monthly_savings_goal: Option<f64>,

    /// Display currency code.
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            monthly_savings_goal: None,
            currency: default_currency(),
        }
    }
}
