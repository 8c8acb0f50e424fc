use serde::{Deserialize, Serialize};

use super::super::domain::NudgeTier;
use super::config::EscalationThresholds;
use super::rules::{first_match, RiskInputs};

/// Diagnostic label naming the rule behind a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleTriggered {
    WithdrawalSymptoms,
    BlackoutEpisodes,
    HighScreenerBand,
    HighFrequencyPattern,
    HighIntensityPattern,
    MultipleRiskFactors,
    NightEpisodes,
    ElevatedScreenerWithBehavior,
    EmergingPattern,
}

impl RuleTriggered {
    pub const fn tier(self) -> NudgeTier {
        match self {
            Self::WithdrawalSymptoms
            | Self::BlackoutEpisodes
            | Self::HighScreenerBand
            | Self::HighFrequencyPattern
            | Self::HighIntensityPattern
            | Self::MultipleRiskFactors => NudgeTier::Firm,
            Self::NightEpisodes | Self::ElevatedScreenerWithBehavior | Self::EmergingPattern => {
                NudgeTier::Soft
            }
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::WithdrawalSymptoms => "withdrawal_symptoms",
            Self::BlackoutEpisodes => "blackout_episodes",
            Self::HighScreenerBand => "high_screener_band",
            Self::HighFrequencyPattern => "high_frequency_pattern",
            Self::HighIntensityPattern => "high_intensity_pattern",
            Self::MultipleRiskFactors => "multiple_risk_factors",
            Self::NightEpisodes => "night_episodes",
            Self::ElevatedScreenerWithBehavior => "elevated_screener_with_behavior",
            Self::EmergingPattern => "emerging_pattern",
        }
    }

    /// Catch-all label used when a tier was supplied that no rule reproduces.
    const fn fallback(tier: NudgeTier) -> Option<Self> {
        match tier {
            NudgeTier::None => None,
            NudgeTier::Soft => Some(Self::EmergingPattern),
            NudgeTier::Firm => Some(Self::MultipleRiskFactors),
        }
    }
}

/// Names the branch that produced `tier`, using the same precedence as
/// [`super::evaluate`]. A `None` tier never carries a label.
pub fn rule_triggered(
    inputs: &RiskInputs,
    tier: NudgeTier,
    thresholds: &EscalationThresholds,
) -> Option<RuleTriggered> {
    if tier.is_none() {
        return None;
    }

    match first_match(inputs, thresholds) {
        Some(rule) if rule.tier() == tier => Some(rule),
        _ => RuleTriggered::fallback(tier),
    }
}
