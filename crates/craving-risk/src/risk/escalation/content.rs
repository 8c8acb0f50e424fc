use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::super::domain::NudgeTier;

/// Message shown alongside an escalation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NudgeContent {
    pub tier: NudgeTier,
    pub title: String,
    pub body: String,
}

static SOFT_TEMPLATES: [(&str, &str); 3] = [
    (
        "You've logged a few heavy urges this week",
        "Fancy a quick check-in? It can help spot what is working best for you.",
    ),
    (
        "Late-night urges seem to be showing up",
        "A few tools suit those moments well: the wave timer, a quick alternative, or simply logging how you feel.",
    ),
    (
        "Your patterns are shifting a little",
        "No pressure. If you like, there are some gentle tools to explore, and everything stays private.",
    ),
];

static FIRM_TEMPLATES: [(&str, &str); 3] = [
    (
        "This pattern looks heavy",
        "Would you like to see private support options? You stay in control and nothing blocks your flow.",
    ),
    (
        "You've been carrying a lot on your own",
        "A confidential option could help. Support lists private resources such as NHS 111, Samaritans, or local services.",
    ),
    (
        "Heavy moments deserve support",
        "Confidential resources are there whenever you want them, with no judgment attached.",
    ),
];

fn templates(tier: NudgeTier) -> &'static [(&'static str, &'static str)] {
    match tier {
        NudgeTier::None => &[],
        NudgeTier::Soft => &SOFT_TEMPLATES,
        NudgeTier::Firm => &FIRM_TEMPLATES,
    }
}

/// Picks one of the fixed templates for `tier`. Returns `None` for
/// [`NudgeTier::None`].
pub fn nudge_content_with<R: Rng + ?Sized>(tier: NudgeTier, rng: &mut R) -> Option<NudgeContent> {
    templates(tier)
        .choose(rng)
        .map(|(title, body)| NudgeContent {
            tier,
            title: (*title).to_string(),
            body: (*body).to_string(),
        })
}

pub fn nudge_content(tier: NudgeTier) -> Option<NudgeContent> {
    nudge_content_with(tier, &mut rand::thread_rng())
}

/// Every template for `tier`, in a fixed order.
pub fn nudge_templates(tier: NudgeTier) -> Vec<NudgeContent> {
    templates(tier)
        .iter()
        .map(|(title, body)| NudgeContent {
            tier,
            title: (*title).to_string(),
            body: (*body).to_string(),
        })
        .collect()
}
