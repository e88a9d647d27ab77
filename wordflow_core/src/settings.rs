//! User study preferences

use serde::{Deserialize, Serialize};

use crate::error::{Result, WordflowError};

pub const DEFAULT_DAILY_GOAL: u32 = 20;
pub const MAX_DAILY_GOAL: u32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StudyOrder {
    Alphabet,
    #[default]
    Random,
    ForgettingCurve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Notifications {
    #[default]
    Enabled,
    Disabled,
}

/// Persisted under `wordflow_settings`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub study_order: StudyOrder,
    pub daily_goal: u32,
    pub notifications: Notifications,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            study_order: StudyOrder::default(),
            daily_goal: DEFAULT_DAILY_GOAL,
            notifications: Notifications::default(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.daily_goal == 0 || self.daily_goal > MAX_DAILY_GOAL {
            return Err(WordflowError::InvalidSettings(format!(
                "Daily goal must be between 1 and {}, got {}",
                MAX_DAILY_GOAL, self.daily_goal
            )));
        }
        Ok(())
    }
}
