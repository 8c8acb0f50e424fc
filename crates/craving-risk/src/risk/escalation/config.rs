use serde::{Deserialize, Serialize};

/// Tunable cut-offs for the escalation rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscalationThresholds {
    /// A `High` screener band alone produces a firm nudge.
    pub high_screener_is_firm: bool,
    /// Acted-vs-alternative ratio that must be exceeded for a firm nudge.
    pub acted_vs_alt_firm_ratio: f64,
    pub urges_7d_firm_min: u32,
    pub high_intensity_7d_firm_min: u32,
    pub night_episodes_soft_min: u32,
    /// An `Elevated` screener band combined with volume produces a soft nudge.
    pub elevated_screener_soft: bool,
    pub urges_7d_soft_min: u32,
    pub high_intensity_7d_soft_min: u32,
}

impl Default for EscalationThresholds {
    fn default() -> Self {
        Self {
            high_screener_is_firm: true,
            acted_vs_alt_firm_ratio: 1.0,
            urges_7d_firm_min: 5,
            high_intensity_7d_firm_min: 3,
            night_episodes_soft_min: 3,
            elevated_screener_soft: true,
            urges_7d_soft_min: 4,
            high_intensity_7d_soft_min: 2,
        }
    }
}
