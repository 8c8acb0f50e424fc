use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::super::domain::ScreeningResult;

/// Re-check intervals for static screenings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreeningCadence {
    pub periodic_days: i64,
    pub contextual_min_days: i64,
    pub contextual_high_intensity_min: u32,
}

impl Default for ScreeningCadence {
    fn default() -> Self {
        Self {
            periodic_days: 14,
            contextual_min_days: 3,
            contextual_high_intensity_min: 3,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScreeningScheduler {
    cadence: ScreeningCadence,
}

impl ScreeningScheduler {
    pub fn new(cadence: ScreeningCadence) -> Self {
        Self { cadence }
    }

    pub fn cadence(&self) -> &ScreeningCadence {
        &self.cadence
    }

    /// First match wins: onboarding, periodic re-check, then a contextual
    /// re-check after a rough patch that is still rate limited by
    /// `contextual_min_days`.
    pub fn should_trigger_screening(
        &self,
        last_screening: Option<&ScreeningResult>,
        days_since_last_screening: i64,
        recent_high_intensity: u32,
    ) -> bool {
        if last_screening.is_none() {
            return true;
        }

        if days_since_last_screening >= self.cadence.periodic_days {
            return true;
        }

        recent_high_intensity >= self.cadence.contextual_high_intensity_min
            && days_since_last_screening >= self.cadence.contextual_min_days
    }
}

/// Whole days elapsed since `last` was recorded, `None` without a prior screening.
pub fn days_since(last: Option<&ScreeningResult>, now: DateTime<Utc>) -> Option<i64> {
    last.map(|result| (now.timestamp_millis() - result.timestamp).div_euclid(MILLIS_PER_DAY))
}

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;
