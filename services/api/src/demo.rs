use crate::infra::{parse_band, parse_instant, parse_red_flags, InMemoryRiskStore};
use chrono::{DateTime, Duration, Timelike, Utc};
use clap::Args;
use craving_risk::config::AppConfig;
use craving_risk::error::AppError;
use craving_risk::risk::{
    parse_events, BehavioralRiskEngine, Category, EventType, Mood, NudgeDecision, RedFlagCheck,
    RedFlags, RiskAssessment, RiskBand, RiskConfig, RiskService, ScreeningInstrument, TacticType,
    TriggerType, UrgeEvent,
};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// CSV export of urge events (timestamp,event_type,intensity,...)
    #[arg(long)]
    pub(crate) events: PathBuf,
    /// Latest overall screening band (low, elevated, high). Defaults to low.
    #[arg(long, value_parser = parse_band)]
    pub(crate) band: Option<RiskBand>,
    /// Red flags from the mini-check, comma separated. Omit when not collected.
    #[arg(long, value_parser = parse_red_flags)]
    pub(crate) red_flags: Option<RedFlags>,
    /// Evaluation instant (RFC 3339). Defaults to now.
    #[arg(long, value_parser = parse_instant)]
    pub(crate) now: Option<DateTime<Utc>>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation instant (RFC 3339). Defaults to now.
    #[arg(long, value_parser = parse_instant)]
    pub(crate) now: Option<DateTime<Utc>>,
    /// Skip the questionnaire portion of the walkthrough.
    #[arg(long)]
    pub(crate) skip_screening: bool,
}

pub(crate) fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let AssessArgs {
        events,
        band,
        red_flags,
        now,
    } = args;

    let config = AppConfig::load()?;
    let now = now.unwrap_or_else(Utc::now);
    let file = File::open(&events)?;
    let history = parse_events(file)?;

    let engine = BehavioralRiskEngine::new(config.risk.thresholds);
    let check = red_flags.map(RedFlagCheck::from).unwrap_or_default();
    let assessment = engine.evaluate_current_risk(&history, band, check, now);

    println!(
        "Risk assessment for {} ({} events read)",
        events.display(),
        history.len()
    );
    render_assessment(&assessment);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        now,
        skip_screening,
    } = args;
    let now = now.unwrap_or_else(Utc::now);

    let store = Arc::new(InMemoryRiskStore::default());
    let service = RiskService::new(store.clone(), store.clone(), store, RiskConfig::default());

    println!("Craving risk walkthrough");

    let alcohol = Category::new("alcohol");
    if skip_screening {
        service.skip_screening(ScreeningInstrument::AuditC, alcohol.clone(), now)?;
        println!("\nScreening skipped; band stays Low.");
    } else {
        let result = service.record_screening(
            ScreeningInstrument::AuditC,
            alcohol.clone(),
            vec![2, 1, 1],
            now - Duration::days(1),
        )?;
        println!(
            "\n{} for {}: {} band",
            result.instrument,
            result.category,
            result.band.label()
        );
        println!("  {}", result.band.description());
        println!("  {}", result.band.suggestion());
    }

    println!("\nLogging a week of urges");
    let mut latest = None;
    for event in scripted_week(now) {
        let hour = event
            .occurred_at()
            .map(|moment| moment.hour())
            .unwrap_or_default();
        println!(
            "  {:02}:00 UTC  {:<15} intensity {:>2}",
            hour,
            event.event_type.label(),
            event.intensity
        );
        latest = Some(service.log_event(event, RedFlagCheck::NotCollected, now)?);
    }
    if let Some(assessment) = &latest {
        println!();
        render_assessment(assessment);
    }

    println!("\nNudge claims");
    for (label, at) in [
        ("now", now),
        ("in 6 hours", now + Duration::hours(6)),
        ("in 25 hours", now + Duration::hours(25)),
    ] {
        let decision = service.nudge_decision(at)?;
        match service.claim_nudge(at)? {
            Some(content) => println!(
                "  {label:<12} shown [{}] {}: {}",
                content.tier.label(),
                content.title,
                content.body
            ),
            None => println!("  {label:<12} held back ({})", describe_decision(decision)),
        }
    }

    let due = service.screening_due(&alcohol, now)?;
    println!(
        "\nNext {} screening due now: {}",
        alcohol,
        if due { "yes" } else { "no" }
    );

    let flags = RedFlagCheck::Checked(RedFlags {
        withdrawal: true,
        ..RedFlags::default()
    });
    let assessment = service.assess(flags, now)?;
    println!(
        "\nWith withdrawal reported: tier {} ({})",
        assessment.nudge_tier.label(),
        assessment
            .rule_triggered
            .map(|rule| rule.label())
            .unwrap_or("none")
    );

    Ok(())
}

/// Late nights and heavy urges, mostly acted on.
fn scripted_week(now: DateTime<Utc>) -> Vec<UrgeEvent> {
    let day_start = now
        .with_hour(0)
        .and_then(|moment| moment.with_minute(0))
        .and_then(|moment| moment.with_second(0))
        .unwrap_or(now);

    let plan: [(i64, i64, EventType, u8, TriggerType); 6] = [
        (6, 1, EventType::WentWithUrge, 8, TriggerType::Lonely),
        (5, 19, EventType::BypassedUrge, 5, TriggerType::Stress),
        (4, 2, EventType::WentWithUrge, 9, TriggerType::Anxiety),
        (3, 21, EventType::AvoidedTask, 4, TriggerType::Boredom),
        (2, 3, EventType::WentWithUrge, 7, TriggerType::Fatigue),
        (1, 0, EventType::WentWithUrge, 8, TriggerType::Lonely),
    ];

    plan.into_iter()
        .map(|(days, hour, event_type, intensity, trigger)| {
            let at = day_start - Duration::days(days) + Duration::hours(hour);
            let mood = if intensity >= 7 { Mood::Bad } else { Mood::Ok };
            let event = UrgeEvent::at(at, event_type, intensity)
                .with_trigger(trigger)
                .with_mood(mood);
            match event_type {
                EventType::BypassedUrge => event.with_tactic(TacticType::Walk),
                _ => event,
            }
        })
        .collect()
}

fn describe_decision(decision: NudgeDecision) -> String {
    match decision {
        NudgeDecision::Show { tier } => format!("{} allowed", tier.label()),
        NudgeDecision::NoTier => "no escalation".to_string(),
        NudgeDecision::CoolingDown { remaining_hours } => {
            format!("cooling down, {remaining_hours}h left")
        }
        NudgeDecision::CapReached { shown } => format!("{shown} already shown"),
    }
}

fn render_assessment(assessment: &RiskAssessment) {
    println!("  Screener band:        {}", assessment.screener_band.label());
    println!("  Urges (7d):           {}", assessment.urges_7d);
    println!("  High intensity (7d):  {}", assessment.high_intensity_7d);
    println!("  Night episodes (7d):  {}", assessment.night_episodes_7d);
    println!("  Acted vs alt (14d):   {:.2}", assessment.acted_vs_alt_14d);
    println!(
        "  Red flags:            {}",
        if assessment.red_flags.is_collected() {
            if assessment.red_flags.flags().any() {
                "reported"
            } else {
                "clear"
            }
        } else {
            "not collected"
        }
    );
    println!(
        "  Nudge tier:           {}",
        assessment.nudge_tier.label()
    );
    if let Some(rule) = assessment.rule_triggered {
        println!("  Rule:                 {}", rule.label());
    }
}
