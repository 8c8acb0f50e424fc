use rand::rngs::StdRng;
use rand::SeedableRng;

use super::common::*;
use crate::risk::domain::{NudgeTier, RedFlags, RiskBand};
use crate::risk::escalation::{
    evaluate, nudge_content, nudge_content_with, nudge_templates, rule_triggered,
    EscalationRules, EscalationThresholds, RuleTriggered,
};

fn defaults() -> EscalationThresholds {
    EscalationThresholds::default()
}

#[test]
fn quiet_week_has_no_tier_or_label() {
    let inputs = quiet_inputs();
    let tier = evaluate(&inputs, &defaults());

    assert_eq!(tier, NudgeTier::None);
    assert_eq!(rule_triggered(&inputs, tier, &defaults()), None);
}

#[test]
fn hard_safety_flags_always_escalate_firmly() {
    let bands = [RiskBand::Low, RiskBand::Elevated, RiskBand::High];
    for band in bands {
        for urges in [0, 3, 12] {
            for ratio in [0.0, 0.5, 4.0] {
                for (withdrawal, blackout) in [(true, false), (false, true), (true, true)] {
                    let mut inputs = quiet_inputs();
                    inputs.screener_band = band;
                    inputs.urges_7d = urges;
                    inputs.acted_vs_alt_14d = ratio;
                    inputs.red_flags = RedFlags {
                        withdrawal,
                        blackout,
                        ..RedFlags::default()
                    };

                    assert_eq!(evaluate(&inputs, &defaults()), NudgeTier::Firm);
                }
            }
        }
    }
}

#[test]
fn withdrawal_label_takes_precedence_over_blackout() {
    let mut inputs = quiet_inputs();
    inputs.red_flags = RedFlags {
        withdrawal: true,
        blackout: true,
        ..RedFlags::default()
    };
    let rule = rule_triggered(&inputs, NudgeTier::Firm, &defaults());
    assert_eq!(rule, Some(RuleTriggered::WithdrawalSymptoms));

    inputs.red_flags.withdrawal = false;
    let rule = rule_triggered(&inputs, NudgeTier::Firm, &defaults());
    assert_eq!(rule, Some(RuleTriggered::BlackoutEpisodes));
}

#[test]
fn soft_flags_alone_do_not_escalate() {
    let mut inputs = quiet_inputs();
    inputs.red_flags = RedFlags {
        morning_use: true,
        failed_cut_down: true,
        ..RedFlags::default()
    };
    assert_eq!(evaluate(&inputs, &defaults()), NudgeTier::None);
}

#[test]
fn high_screener_band_is_firm_unless_disabled() {
    let mut inputs = quiet_inputs();
    inputs.screener_band = RiskBand::High;

    assert_eq!(evaluate(&inputs, &defaults()), NudgeTier::Firm);
    assert_eq!(
        rule_triggered(&inputs, NudgeTier::Firm, &defaults()),
        Some(RuleTriggered::HighScreenerBand)
    );

    let lenient = EscalationThresholds {
        high_screener_is_firm: false,
        ..defaults()
    };
    assert_eq!(evaluate(&inputs, &lenient), NudgeTier::None);
}

#[test]
fn acting_more_than_redirecting_with_volume_is_firm() {
    let mut inputs = quiet_inputs();
    inputs.acted_vs_alt_14d = 1.5;
    inputs.urges_7d = 5;
    assert_eq!(evaluate(&inputs, &defaults()), NudgeTier::Firm);
    assert_eq!(
        rule_triggered(&inputs, NudgeTier::Firm, &defaults()),
        Some(RuleTriggered::HighFrequencyPattern)
    );

    inputs.urges_7d = 3;
    inputs.high_intensity_7d = 3;
    assert_eq!(evaluate(&inputs, &defaults()), NudgeTier::Firm);
    assert_eq!(
        rule_triggered(&inputs, NudgeTier::Firm, &defaults()),
        Some(RuleTriggered::HighIntensityPattern)
    );
}

#[test]
fn ratio_must_strictly_exceed_the_firm_ratio() {
    let mut inputs = quiet_inputs();
    inputs.acted_vs_alt_14d = 1.0;
    inputs.urges_7d = 9;
    inputs.high_intensity_7d = 9;
    assert_eq!(evaluate(&inputs, &defaults()), NudgeTier::None);
}

#[test]
fn frequent_night_episodes_are_soft() {
    let mut inputs = quiet_inputs();
    inputs.night_episodes_7d = 3;
    inputs.urges_7d = 3;

    assert_eq!(evaluate(&inputs, &defaults()), NudgeTier::Soft);
    assert_eq!(
        rule_triggered(&inputs, NudgeTier::Soft, &defaults()),
        Some(RuleTriggered::NightEpisodes)
    );

    inputs.night_episodes_7d = 2;
    assert_eq!(evaluate(&inputs, &defaults()), NudgeTier::None);
}

#[test]
fn elevated_band_needs_behavior_to_go_soft() {
    let mut inputs = quiet_inputs();
    inputs.screener_band = RiskBand::Elevated;
    assert_eq!(evaluate(&inputs, &defaults()), NudgeTier::None);

    inputs.high_intensity_7d = 2;
    assert_eq!(evaluate(&inputs, &defaults()), NudgeTier::Soft);
    assert_eq!(
        rule_triggered(&inputs, NudgeTier::Soft, &defaults()),
        Some(RuleTriggered::ElevatedScreenerWithBehavior)
    );

    inputs.high_intensity_7d = 0;
    inputs.urges_7d = 4;
    assert_eq!(evaluate(&inputs, &defaults()), NudgeTier::Soft);

    let lenient = EscalationThresholds {
        elevated_screener_soft: false,
        ..defaults()
    };
    assert_eq!(evaluate(&inputs, &lenient), NudgeTier::None);
}

#[test]
fn volume_never_lowers_the_tier() {
    let contexts = [
        (RiskBand::Low, 0.0, 0),
        (RiskBand::Low, 2.0, 0),
        (RiskBand::Elevated, 0.0, 0),
        (RiskBand::Elevated, 1.5, 2),
        (RiskBand::Low, 0.5, 4),
    ];

    for (band, ratio, nights) in contexts {
        for high in 0..=10u32 {
            let mut previous = NudgeTier::None;
            for urges in high..=12u32 {
                let mut inputs = quiet_inputs();
                inputs.screener_band = band;
                inputs.acted_vs_alt_14d = ratio;
                inputs.night_episodes_7d = nights;
                inputs.urges_7d = urges;
                inputs.high_intensity_7d = high;

                let tier = evaluate(&inputs, &defaults());
                assert!(tier >= previous, "urges {urges} lowered tier for {band:?}");
                previous = tier;
            }
        }

        for urges in 0..=12u32 {
            let mut previous = NudgeTier::None;
            for high in 0..=urges {
                let mut inputs = quiet_inputs();
                inputs.screener_band = band;
                inputs.acted_vs_alt_14d = ratio;
                inputs.night_episodes_7d = nights;
                inputs.urges_7d = urges;
                inputs.high_intensity_7d = high;

                let tier = evaluate(&inputs, &defaults());
                assert!(tier >= previous, "intensity {high} lowered tier for {band:?}");
                previous = tier;
            }
        }
    }
}

#[test]
fn overridden_thresholds_change_sensitivity() {
    let strict = EscalationThresholds {
        night_episodes_soft_min: 1,
        urges_7d_firm_min: 2,
        ..defaults()
    };

    let mut inputs = quiet_inputs();
    inputs.night_episodes_7d = 1;
    assert_eq!(evaluate(&inputs, &strict), NudgeTier::Soft);

    inputs.acted_vs_alt_14d = 2.0;
    inputs.urges_7d = 2;
    assert_eq!(evaluate(&inputs, &strict), NudgeTier::Firm);
    assert_eq!(evaluate(&inputs, &defaults()), NudgeTier::None);
}

#[test]
fn mismatched_tier_falls_back_to_generic_label() {
    let inputs = quiet_inputs();
    assert_eq!(
        rule_triggered(&inputs, NudgeTier::Firm, &defaults()),
        Some(RuleTriggered::MultipleRiskFactors)
    );
    assert_eq!(
        rule_triggered(&inputs, NudgeTier::Soft, &defaults()),
        Some(RuleTriggered::EmergingPattern)
    );
}

#[test]
fn labels_use_snake_case_identifiers() {
    assert_eq!(RuleTriggered::HighFrequencyPattern.label(), "high_frequency_pattern");
    let json = serde_json::to_value(RuleTriggered::NightEpisodes).expect("serializes");
    assert_eq!(json, serde_json::json!("night_episodes"));
}

#[test]
fn engine_decision_bundles_tier_and_rule() {
    let rules = EscalationRules::default();
    let mut inputs = quiet_inputs();
    inputs.night_episodes_7d = 4;

    let escalation = rules.decide(&inputs);
    assert_eq!(escalation.tier, NudgeTier::Soft);
    assert_eq!(escalation.rule, Some(RuleTriggered::NightEpisodes));
}

#[test]
fn no_content_is_rendered_without_a_tier() {
    assert!(nudge_content(NudgeTier::None).is_none());
    assert!(nudge_templates(NudgeTier::None).is_empty());
}

#[test]
fn content_matches_the_requested_tier() {
    let mut rng = StdRng::seed_from_u64(7);
    for tier in [NudgeTier::Soft, NudgeTier::Firm] {
        let templates = nudge_templates(tier);
        assert_eq!(templates.len(), 3);

        for _ in 0..10 {
            let content = nudge_content_with(tier, &mut rng).expect("content for tier");
            assert_eq!(content.tier, tier);
            assert!(!content.title.is_empty());
            assert!(templates.contains(&content));
        }
    }
}
