//! Behavioral risk evaluation and nudge escalation.
//!
//! Two inputs feed the escalation decision: static screenings scored into a
//! [`RiskBand`], and the recent urge log aggregated by the
//! [`BehavioralRiskEngine`]. The [`NudgeGovernor`] then rate limits what the
//! user actually sees, and the [`ScreeningScheduler`] decides when to ask the
//! questionnaire again. Everything here is pure apart from [`RiskService`],
//! which reads and writes through the store traits in [`repository`].

pub mod domain;
pub mod engine;
pub mod escalation;
pub mod governor;
pub mod import;
pub mod repository;
pub mod router;
pub mod screening;
pub mod service;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};

pub use domain::{
    Category, EventType, InvalidEvent, Mood, NudgeTier, RedFlagCheck, RedFlags, RiskAssessment,
    RiskBand, ScreeningInstrument, ScreeningResult, ShownNudge, TacticType, TriggerType,
    UrgeEvent, BUILTIN_CATEGORIES, HIGH_INTENSITY_MIN, MAX_INTENSITY,
};
pub use engine::{BehavioralRiskEngine, RiskWindows};
pub use escalation::{
    evaluate, nudge_content, nudge_content_with, rule_triggered, Escalation, EscalationRules,
    EscalationThresholds, NudgeContent, RiskInputs, RuleTriggered,
};
pub use governor::{NudgeDecision, NudgeGovernor, NudgePolicy};
pub use import::{parse_events, ImportError};
pub use repository::{AssessmentStore, EventStore, RepositoryError, RiskExport, ScreeningStore};
pub use router::risk_router;
pub use screening::{
    combine_bands, score, screener_band, worst_band, ScreeningCadence, ScreeningError,
    ScreeningScheduler,
};
pub use service::{RiskService, RiskServiceError};

/// Tuning for every rule-based component plus assessment retention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    pub thresholds: EscalationThresholds,
    pub nudges: NudgePolicy,
    pub cadence: ScreeningCadence,
    pub retention_days: i64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            thresholds: EscalationThresholds::default(),
            nudges: NudgePolicy::default(),
            cadence: ScreeningCadence::default(),
            retention_days: 30,
        }
    }
}
