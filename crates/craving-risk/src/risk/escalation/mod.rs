mod config;
mod content;
mod policy;
mod rules;

pub use config::EscalationThresholds;
pub use content::{nudge_content, nudge_content_with, nudge_templates, NudgeContent};
pub use policy::{rule_triggered, RuleTriggered};
pub use rules::{evaluate, RiskInputs};

use super::domain::NudgeTier;
use serde::{Deserialize, Serialize};

/// Stateless evaluator bound to one threshold configuration.
#[derive(Debug, Clone, Default)]
pub struct EscalationRules {
    thresholds: EscalationThresholds,
}

impl EscalationRules {
    pub fn new(thresholds: EscalationThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &EscalationThresholds {
        &self.thresholds
    }

    pub fn decide(&self, inputs: &RiskInputs) -> Escalation {
        let tier = evaluate(inputs, &self.thresholds);
        let rule = rule_triggered(inputs, tier, &self.thresholds);
        Escalation { tier, rule }
    }
}

/// Tier together with the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Escalation {
    pub tier: NudgeTier,
    pub rule: Option<RuleTriggered>,
}
