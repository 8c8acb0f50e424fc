use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use super::domain::{RedFlagCheck, RedFlags, RiskAssessment, RiskBand, UrgeEvent};
use super::escalation::{EscalationRules, EscalationThresholds, RiskInputs};

/// Hours (UTC, inclusive) treated as night episodes.
pub const NIGHT_HOURS: std::ops::RangeInclusive<u32> = 0..=5;

/// Short trailing window for volume, intensity, and night counts.
pub const SHORT_WINDOW_DAYS: i64 = 7;

/// Long trailing window for the acted-vs-alternative ratio.
pub const LONG_WINDOW_DAYS: i64 = 14;

/// Window boundaries in epoch milliseconds. Lower bounds are inclusive and
/// there is no upper bound: an event stamped after `now` still counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskWindows {
    pub now: i64,
    pub short_start: i64,
    pub long_start: i64,
}

impl RiskWindows {
    pub fn ending_at(now: DateTime<Utc>) -> Self {
        Self {
            now: now.timestamp_millis(),
            short_start: (now - Duration::days(SHORT_WINDOW_DAYS)).timestamp_millis(),
            long_start: (now - Duration::days(LONG_WINDOW_DAYS)).timestamp_millis(),
        }
    }

    fn in_short(&self, event: &UrgeEvent) -> bool {
        event.timestamp >= self.short_start
    }

    fn in_long(&self, event: &UrgeEvent) -> bool {
        event.timestamp >= self.long_start
    }
}

/// Turns raw event history into a [`RiskAssessment`]. Pure: the caller
/// supplies `now` and persists the result.
#[derive(Debug, Clone, Default)]
pub struct BehavioralRiskEngine {
    rules: EscalationRules,
}

impl BehavioralRiskEngine {
    pub fn new(thresholds: EscalationThresholds) -> Self {
        Self {
            rules: EscalationRules::new(thresholds),
        }
    }

    pub fn rules(&self) -> &EscalationRules {
        &self.rules
    }

    /// Aggregates `events` over the trailing windows ending at `now`.
    pub fn snapshot(
        &self,
        events: &[UrgeEvent],
        screener_band: RiskBand,
        red_flags: RedFlags,
        now: DateTime<Utc>,
    ) -> RiskInputs {
        let windows = RiskWindows::ending_at(now);

        let mut urges_7d = 0u32;
        let mut high_intensity_7d = 0u32;
        let mut night_episodes_7d = 0u32;
        let mut acted_14d = 0u32;
        let mut alternatives_14d = 0u32;

        for event in events {
            if windows.in_short(event) {
                urges_7d += 1;
                if event.is_high_intensity() {
                    high_intensity_7d += 1;
                }
                if event
                    .utc_hour()
                    .is_some_and(|hour| NIGHT_HOURS.contains(&hour))
                {
                    night_episodes_7d += 1;
                }
            }

            if windows.in_long(event) {
                if event.gave_in() {
                    acted_14d += 1;
                } else {
                    alternatives_14d += 1;
                }
            }
        }

        RiskInputs {
            screener_band,
            urges_7d,
            high_intensity_7d,
            acted_vs_alt_14d: acted_vs_alternative(acted_14d, alternatives_14d),
            night_episodes_7d,
            red_flags,
        }
    }

    pub fn evaluate_current_risk(
        &self,
        events: &[UrgeEvent],
        latest_screening_band: Option<RiskBand>,
        red_flags: RedFlagCheck,
        now: DateTime<Utc>,
    ) -> RiskAssessment {
        let screener_band = latest_screening_band.unwrap_or_default();
        let inputs = self.snapshot(events, screener_band, red_flags.flags(), now);
        let escalation = self.rules.decide(&inputs);

        debug!(
            urges_7d = inputs.urges_7d,
            high_intensity_7d = inputs.high_intensity_7d,
            night_episodes_7d = inputs.night_episodes_7d,
            acted_vs_alt_14d = inputs.acted_vs_alt_14d,
            tier = escalation.tier.label(),
            "behavioral risk evaluated"
        );

        RiskAssessment {
            timestamp: now.timestamp_millis(),
            screener_band,
            urges_7d: inputs.urges_7d,
            high_intensity_7d: inputs.high_intensity_7d,
            acted_vs_alt_14d: inputs.acted_vs_alt_14d,
            night_episodes_7d: inputs.night_episodes_7d,
            red_flags,
            nudge_tier: escalation.tier,
            rule_triggered: escalation.rule,
        }
    }
}

/// No logged alternatives means no signal, not infinite risk.
fn acted_vs_alternative(acted: u32, alternatives: u32) -> f64 {
    if alternatives == 0 {
        0.0
    } else {
        f64::from(acted) / f64::from(alternatives)
    }
}
