use serde::Serialize;

use super::super::domain::{Category, ScreeningInstrument};

/// One questionnaire item with its answer options and their scores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScreeningQuestion {
    pub id: &'static str,
    pub text: String,
    pub options: Vec<&'static str>,
    pub scores: Vec<u8>,
}

impl ScreeningQuestion {
    fn new(id: &'static str, text: String, options: &[&'static str]) -> Self {
        Self {
            id,
            text,
            options: options.to_vec(),
            scores: (0..options.len() as u8).collect(),
        }
    }
}

const SDS_FREQUENCY: [&str; 4] = ["Never/almost never", "Sometimes", "Often", "Always/nearly always"];
const YES_NO: [&str; 2] = ["No", "Yes"];

/// AUDIT-C is alcohol specific; every other category uses the SDS.
pub fn instrument_for(category: &Category) -> ScreeningInstrument {
    if category.as_str() == "alcohol" {
        ScreeningInstrument::AuditC
    } else {
        ScreeningInstrument::Sds
    }
}

pub fn questions_for(instrument: ScreeningInstrument, category: &Category) -> Vec<ScreeningQuestion> {
    match instrument {
        ScreeningInstrument::AuditC => audit_c_questions(),
        ScreeningInstrument::Sds => sds_questions(category),
    }
}

pub fn audit_c_questions() -> Vec<ScreeningQuestion> {
    vec![
        ScreeningQuestion::new(
            "audit_c_1",
            "How often do you have a drink containing alcohol?".to_string(),
            &[
                "Never",
                "Monthly or less",
                "2-4 times a month",
                "2-3 times a week",
                "4+ times a week",
            ],
        ),
        ScreeningQuestion::new(
            "audit_c_2",
            "How many standard drinks do you have on a typical drinking day?".to_string(),
            &["1-2", "3-4", "5-6", "7-9", "10+"],
        ),
        ScreeningQuestion::new(
            "audit_c_3",
            "How often do you have six or more drinks on one occasion?".to_string(),
            &[
                "Never",
                "Less than monthly",
                "Monthly",
                "Weekly",
                "Daily or almost daily",
            ],
        ),
    ]
}

fn sds_activity(category: &Category) -> &'static str {
    match category.as_str() {
        "cannabis" => "cannabis",
        "gambling" => "gambling",
        "gaming" => "gaming",
        "shopping" => "shopping",
        "social_media" => "social media",
        _ => "this activity",
    }
}

fn red_flag_activity(category: &Category) -> &'static str {
    match category.as_str() {
        "alcohol" => "drinking",
        "cannabis" => "using cannabis",
        "gambling" => "gambling",
        "gaming" => "gaming",
        "shopping" => "shopping",
        "social_media" => "using social media",
        _ => "this activity",
    }
}

pub fn sds_questions(category: &Category) -> Vec<ScreeningQuestion> {
    let activity = sds_activity(category);
    vec![
        ScreeningQuestion::new(
            "sds_1",
            format!("Did you feel your use of {activity} was out of control?"),
            &SDS_FREQUENCY,
        ),
        ScreeningQuestion::new(
            "sds_2",
            format!("Did the thought of missing {activity} make you anxious or worried?"),
            &SDS_FREQUENCY,
        ),
        ScreeningQuestion::new(
            "sds_3",
            format!("Did you worry about your use of {activity}?"),
            &SDS_FREQUENCY,
        ),
        ScreeningQuestion::new(
            "sds_4",
            format!("Did you wish you could stop {activity}?"),
            &SDS_FREQUENCY,
        ),
        ScreeningQuestion::new(
            "sds_5",
            format!("How hard would it be to stop or go without {activity}?"),
            &["Not difficult", "Quite difficult", "Very difficult", "Impossible"],
        ),
    ]
}

/// Yes/no mini-checks, in the order [`crate::risk::RedFlags::from_answers`] expects.
pub fn red_flag_questions(category: &Category) -> Vec<ScreeningQuestion> {
    let activity = red_flag_activity(category);
    vec![
        ScreeningQuestion::new(
            "red_flag_morning",
            format!("Do you usually start {activity} first thing in the morning?"),
            &YES_NO,
        ),
        ScreeningQuestion::new(
            "red_flag_withdrawal",
            format!("Do you get shakes, sweats, anxiety or other uncomfortable feelings when you try to stop {activity}?"),
            &YES_NO,
        ),
        ScreeningQuestion::new(
            "red_flag_blackout",
            format!("Have you had memory gaps or blackouts linked to {activity}?"),
            &YES_NO,
        ),
        ScreeningQuestion::new(
            "red_flag_failed_cutdown",
            format!("Have you tried cutting down on {activity} for 2-4 weeks and found it hard to keep going?"),
            &YES_NO,
        ),
    ]
}
