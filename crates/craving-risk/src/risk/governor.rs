use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{NudgeTier, RiskAssessment, ShownNudge};

const MILLIS_PER_HOUR: i64 = 60 * 60 * 1000;

/// Cooldowns and rolling caps per tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NudgePolicy {
    pub soft_cooldown_hours: i64,
    pub firm_cooldown_hours: i64,
    pub soft_cap: u32,
    pub firm_cap: u32,
}

impl Default for NudgePolicy {
    fn default() -> Self {
        Self {
            soft_cooldown_hours: 24,
            firm_cooldown_hours: 12,
            soft_cap: 2,
            firm_cap: 3,
        }
    }
}

impl NudgePolicy {
    /// Cooldown and same-tier cap for `tier`; `None` never shows.
    pub fn limits(&self, tier: NudgeTier) -> Option<(i64, u32)> {
        match tier {
            NudgeTier::None => None,
            NudgeTier::Soft => Some((self.soft_cooldown_hours, self.soft_cap)),
            NudgeTier::Firm => Some((self.firm_cooldown_hours, self.firm_cap)),
        }
    }

    /// Longest cooldown, i.e. how much nudge history a decision can look at.
    pub fn lookback_hours(&self) -> i64 {
        self.soft_cooldown_hours.max(self.firm_cooldown_hours)
    }
}

/// Outcome of a nudge display check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum NudgeDecision {
    Show { tier: NudgeTier },
    NoTier,
    CoolingDown { remaining_hours: i64 },
    CapReached { shown: u32 },
}

impl NudgeDecision {
    pub const fn is_show(&self) -> bool {
        matches!(self, Self::Show { .. })
    }
}

/// Rate limits escalation messages so Firm signals surface more often than
/// Soft ones without flooding the user.
#[derive(Debug, Clone, Default)]
pub struct NudgeGovernor {
    policy: NudgePolicy,
}

impl NudgeGovernor {
    pub fn new(policy: NudgePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &NudgePolicy {
        &self.policy
    }

    /// `hours_since_last_nudge` covers nudges of any tier; `None` means no
    /// nudge has been shown yet.
    pub fn decide(
        &self,
        latest: Option<&RiskAssessment>,
        recent_nudges: &[ShownNudge],
        hours_since_last_nudge: Option<i64>,
        now: DateTime<Utc>,
    ) -> NudgeDecision {
        let Some(tier) = latest.map(|assessment| assessment.nudge_tier) else {
            return NudgeDecision::NoTier;
        };
        let Some((cooldown_hours, cap)) = self.policy.limits(tier) else {
            return NudgeDecision::NoTier;
        };

        if let Some(elapsed) = hours_since_last_nudge {
            if elapsed < cooldown_hours {
                return NudgeDecision::CoolingDown {
                    remaining_hours: cooldown_hours.saturating_sub(elapsed),
                };
            }
        }

        let now_ms = now.timestamp_millis();
        let window_ms = cooldown_hours.saturating_mul(MILLIS_PER_HOUR);
        let shown = recent_nudges
            .iter()
            .filter(|nudge| {
                nudge.tier == tier && now_ms.saturating_sub(nudge.timestamp) < window_ms
            })
            .count() as u32;

        if shown >= cap {
            return NudgeDecision::CapReached { shown };
        }

        NudgeDecision::Show { tier }
    }

    pub fn should_show_nudge(
        &self,
        latest: Option<&RiskAssessment>,
        recent_nudges: &[ShownNudge],
        hours_since_last_nudge: Option<i64>,
        now: DateTime<Utc>,
    ) -> bool {
        self.decide(latest, recent_nudges, hours_since_last_nudge, now)
            .is_show()
    }
}

/// Whole hours since the newest entry in `history`.
pub fn hours_since_last_nudge(history: &[ShownNudge], now: DateTime<Utc>) -> Option<i64> {
    history
        .iter()
        .map(|nudge| nudge.timestamp)
        .max()
        .map(|latest| {
            now.timestamp_millis()
                .saturating_sub(latest)
                .div_euclid(MILLIS_PER_HOUR)
        })
}
