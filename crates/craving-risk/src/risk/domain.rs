use std::fmt;

use chrono::{DateTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use super::escalation::{RiskInputs, RuleTriggered};

/// Intensity at or above which an urge counts as high intensity.
pub const HIGH_INTENSITY_MIN: u8 = 7;

/// Upper bound of the intensity scale.
pub const MAX_INTENSITY: u8 = 10;

/// Three-way classification of a logged urge. This is the source of truth;
/// the legacy "gave in" boolean is derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    BypassedUrge,
    WentWithUrge,
    AvoidedTask,
}

impl EventType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::BypassedUrge => "Bypassed urge",
            Self::WentWithUrge => "Went with urge",
            Self::AvoidedTask => "Avoided task",
        }
    }

    pub const fn gave_in(self) -> bool {
        matches!(self, Self::WentWithUrge)
    }

    /// Maps records that only carry the legacy boolean onto the classification.
    pub const fn from_legacy_gave_in(gave_in: bool) -> Self {
        if gave_in {
            Self::WentWithUrge
        } else {
            Self::BypassedUrge
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TacticType {
    Walk,
    Smoking,
    Call,
    Music,
    Jot,
    Shower,
    Breath,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    VeryBad,
    Bad,
    Ok,
    Good,
    Great,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    Stress,
    Boredom,
    Social,
    Anxiety,
    Fatigue,
    Lonely,
    Habit,
    Money,
    Anger,
    Other,
}

/// One logged behavioral moment. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrgeEvent {
    /// Epoch milliseconds, UTC.
    pub timestamp: i64,
    pub event_type: EventType,
    #[serde(default)]
    pub tactic: Option<TacticType>,
    #[serde(default)]
    pub custom_tactic: Option<String>,
    #[serde(default)]
    pub mood: Option<Mood>,
    #[serde(default)]
    pub used_wave_timer: bool,
    #[serde(default)]
    pub duration_seconds: u32,
    pub intensity: u8,
    #[serde(default)]
    pub trigger: Option<TriggerType>,
    #[serde(default)]
    pub urge_about: Option<String>,
    #[serde(default)]
    pub custom_urge_about: Option<String>,
}

impl UrgeEvent {
    pub fn new(timestamp: i64, event_type: EventType, intensity: u8) -> Self {
        Self {
            timestamp,
            event_type,
            tactic: None,
            custom_tactic: None,
            mood: None,
            used_wave_timer: false,
            duration_seconds: 0,
            intensity,
            trigger: None,
            urge_about: None,
            custom_urge_about: None,
        }
    }

    pub fn at(occurred_at: DateTime<Utc>, event_type: EventType, intensity: u8) -> Self {
        Self::new(occurred_at.timestamp_millis(), event_type, intensity)
    }

    pub fn with_trigger(mut self, trigger: TriggerType) -> Self {
        self.trigger = Some(trigger);
        self
    }

    pub fn with_tactic(mut self, tactic: TacticType) -> Self {
        self.tactic = Some(tactic);
        self
    }

    pub fn with_mood(mut self, mood: Mood) -> Self {
        self.mood = Some(mood);
        self
    }

    /// Checks the fields a caller can get wrong. Intensity is on a 0-10 scale.
    pub fn validate(&self) -> Result<(), InvalidEvent> {
        if self.intensity > MAX_INTENSITY {
            return Err(InvalidEvent::IntensityOutOfRange {
                intensity: self.intensity,
            });
        }
        Ok(())
    }

    pub fn gave_in(&self) -> bool {
        self.event_type.gave_in()
    }

    pub fn is_high_intensity(&self) -> bool {
        self.intensity >= HIGH_INTENSITY_MIN
    }

    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }

    /// Hour of day in UTC, the single time zone convention used for night windows.
    pub fn utc_hour(&self) -> Option<u32> {
        self.occurred_at().map(|moment| moment.hour())
    }
}

/// Urge event rejected before it reaches a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidEvent {
    #[error("intensity {intensity} exceeds {MAX_INTENSITY}")]
    IntensityOutOfRange { intensity: u8 },
}

/// Ordinal band produced by a screening instrument.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    #[default]
    Low,
    Elevated,
    High,
}

impl RiskBand {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Elevated => "Elevated",
            Self::High => "High",
        }
    }

    pub fn description(self) -> String {
        format!("Your current pattern looks {} risk.", self.label())
    }

    pub const fn suggestion(self) -> &'static str {
        match self {
            Self::Low => "Keep doing what works. The wave timer is there if you want it.",
            Self::Elevated => "Take a breath first, then pick an alternative.",
            Self::High => "Consider adding one confidential support. Options live under Support.",
        }
    }
}

/// Escalation tier, ordered `None < Soft < Firm`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum NudgeTier {
    #[default]
    None,
    Soft,
    Firm,
}

impl NudgeTier {
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Soft => "soft",
            Self::Firm => "firm",
        }
    }

    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreeningInstrument {
    /// Consumption-focused, three questions scored 0-4.
    AuditC,
    /// Severity-of-dependence style, five questions scored 0-3.
    Sds,
}

impl ScreeningInstrument {
    pub const fn question_count(self) -> usize {
        match self {
            Self::AuditC => 3,
            Self::Sds => 5,
        }
    }

    pub const fn max_answer(self) -> u8 {
        match self {
            Self::AuditC => 4,
            Self::Sds => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::AuditC => "AUDIT-C",
            Self::Sds => "SDS",
        }
    }
}

impl fmt::Display for ScreeningInstrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Categories shipped with the app. Users may add their own; see [`Category`].
pub const BUILTIN_CATEGORIES: [&str; 6] = [
    "alcohol",
    "cannabis",
    "gambling",
    "gaming",
    "shopping",
    "social_media",
];

/// Free-text screening domain such as `alcohol` or `gambling`.
///
/// The domain is open: any non-empty label is accepted and normalized to a
/// trimmed lowercase key so lookups are stable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Category(String);

impl Category {
    pub fn new(label: impl AsRef<str>) -> Self {
        Self(label.as_ref().trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_builtin(&self) -> bool {
        BUILTIN_CATEGORIES.contains(&self.0.as_str())
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Category {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One completed or skipped questionnaire.
///
/// Completed results come from [`ScreeningResult::scored`], skipped ones from
/// [`ScreeningResult::skipped`], which keeps responses empty and the band at
/// `Low` so a skip never escalates risk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningResult {
    pub timestamp: i64,
    pub instrument: ScreeningInstrument,
    pub category: Category,
    pub responses: Vec<u8>,
    pub band: RiskBand,
    pub skipped: bool,
}

impl ScreeningResult {
    pub fn skipped(timestamp: i64, instrument: ScreeningInstrument, category: Category) -> Self {
        Self {
            timestamp,
            instrument,
            category,
            responses: Vec::new(),
            band: RiskBand::Low,
            skipped: true,
        }
    }

    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}

/// Four independent safety signals from the yes/no mini-checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RedFlags {
    pub morning_use: bool,
    pub withdrawal: bool,
    pub blackout: bool,
    pub failed_cut_down: bool,
}

impl RedFlags {
    /// Answers in mini-check order: morning, withdrawal, blackout, failed cut-down.
    pub const fn from_answers(answers: [bool; 4]) -> Self {
        Self {
            morning_use: answers[0],
            withdrawal: answers[1],
            blackout: answers[2],
            failed_cut_down: answers[3],
        }
    }

    pub const fn is_hard_stop(&self) -> bool {
        self.withdrawal || self.blackout
    }

    pub const fn any(&self) -> bool {
        self.morning_use || self.withdrawal || self.blackout || self.failed_cut_down
    }
}

/// Whether the red-flag mini-check ran. `NotCollected` evaluates like a clean
/// check but stays distinguishable in stored assessments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "flags", rename_all = "snake_case")]
pub enum RedFlagCheck {
    #[default]
    NotCollected,
    Checked(RedFlags),
}

impl RedFlagCheck {
    pub const fn flags(&self) -> RedFlags {
        match self {
            Self::NotCollected => RedFlags {
                morning_use: false,
                withdrawal: false,
                blackout: false,
                failed_cut_down: false,
            },
            Self::Checked(flags) => *flags,
        }
    }

    pub const fn is_collected(&self) -> bool {
        matches!(self, Self::Checked(_))
    }
}

impl From<RedFlags> for RedFlagCheck {
    fn from(value: RedFlags) -> Self {
        Self::Checked(value)
    }
}

/// Snapshot of one behavioral evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub timestamp: i64,
    pub screener_band: RiskBand,
    pub urges_7d: u32,
    pub high_intensity_7d: u32,
    pub acted_vs_alt_14d: f64,
    pub night_episodes_7d: u32,
    pub red_flags: RedFlagCheck,
    pub nudge_tier: NudgeTier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_triggered: Option<RuleTriggered>,
}

impl RiskAssessment {
    pub fn inputs(&self) -> RiskInputs {
        RiskInputs {
            screener_band: self.screener_band,
            urges_7d: self.urges_7d,
            high_intensity_7d: self.high_intensity_7d,
            acted_vs_alt_14d: self.acted_vs_alt_14d,
            night_episodes_7d: self.night_episodes_7d,
            red_flags: self.red_flags.flags(),
        }
    }

    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}

/// Record that a nudge was actually displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShownNudge {
    pub timestamp: i64,
    pub tier: NudgeTier,
}
