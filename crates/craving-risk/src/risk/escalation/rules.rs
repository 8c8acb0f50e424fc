use serde::{Deserialize, Serialize};

use super::super::domain::{NudgeTier, RedFlags, RiskBand};
use super::config::EscalationThresholds;
use super::policy::RuleTriggered;

/// Behavior snapshot the rules decide on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskInputs {
    pub screener_band: RiskBand,
    pub urges_7d: u32,
    pub high_intensity_7d: u32,
    /// Went-with-urge over chose-alternative in the last 14 days, 0.0 when no
    /// alternatives were logged.
    pub acted_vs_alt_14d: f64,
    pub night_episodes_7d: u32,
    pub red_flags: RedFlags,
}

/// Decides the escalation tier. The first matching rule wins.
pub fn evaluate(inputs: &RiskInputs, thresholds: &EscalationThresholds) -> NudgeTier {
    first_match(inputs, thresholds)
        .map(RuleTriggered::tier)
        .unwrap_or(NudgeTier::None)
}

/// Walks the rules in clinical priority order and reports the branch that fired.
pub(crate) fn first_match(
    inputs: &RiskInputs,
    thresholds: &EscalationThresholds,
) -> Option<RuleTriggered> {
    let flags = &inputs.red_flags;
    if flags.withdrawal {
        return Some(RuleTriggered::WithdrawalSymptoms);
    }
    if flags.blackout {
        return Some(RuleTriggered::BlackoutEpisodes);
    }

    if thresholds.high_screener_is_firm && inputs.screener_band == RiskBand::High {
        return Some(RuleTriggered::HighScreenerBand);
    }

    if inputs.acted_vs_alt_14d > thresholds.acted_vs_alt_firm_ratio {
        if inputs.urges_7d >= thresholds.urges_7d_firm_min {
            return Some(RuleTriggered::HighFrequencyPattern);
        }
        if inputs.high_intensity_7d >= thresholds.high_intensity_7d_firm_min {
            return Some(RuleTriggered::HighIntensityPattern);
        }
    }

    if inputs.night_episodes_7d >= thresholds.night_episodes_soft_min {
        return Some(RuleTriggered::NightEpisodes);
    }

    if thresholds.elevated_screener_soft
        && inputs.screener_band == RiskBand::Elevated
        && (inputs.high_intensity_7d >= thresholds.high_intensity_7d_soft_min
            || inputs.urges_7d >= thresholds.urges_7d_soft_min)
    {
        return Some(RuleTriggered::ElevatedScreenerWithBehavior);
    }

    None
}
