use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use super::domain::{
    Category, InvalidEvent, RedFlagCheck, RiskAssessment, RiskBand, ScreeningInstrument, ScreeningResult,
    ShownNudge, UrgeEvent,
};
use super::engine::{BehavioralRiskEngine, LONG_WINDOW_DAYS, SHORT_WINDOW_DAYS};
use super::escalation::{nudge_content, NudgeContent};
use super::governor::{hours_since_last_nudge, NudgeDecision, NudgeGovernor};
use super::repository::{AssessmentStore, EventStore, RepositoryError, RiskExport, ScreeningStore};
use super::screening::{days_since, screener_band, ScreeningError, ScreeningScheduler};
use super::RiskConfig;

/// Orchestrates the pure risk components over injected stores.
pub struct RiskService<E, S, A> {
    events: Arc<E>,
    screenings: Arc<S>,
    assessments: Arc<A>,
    engine: Arc<BehavioralRiskEngine>,
    governor: Arc<NudgeGovernor>,
    scheduler: Arc<ScreeningScheduler>,
    retention: Duration,
    nudge_claim: Mutex<()>,
}

impl<E, S, A> RiskService<E, S, A>
where
    E: EventStore + 'static,
    S: ScreeningStore + 'static,
    A: AssessmentStore + 'static,
{
    pub fn new(events: Arc<E>, screenings: Arc<S>, assessments: Arc<A>, config: RiskConfig) -> Self {
        let RiskConfig {
            thresholds,
            nudges,
            cadence,
            retention_days,
        } = config;

        Self {
            events,
            screenings,
            assessments,
            engine: Arc::new(BehavioralRiskEngine::new(thresholds)),
            governor: Arc::new(NudgeGovernor::new(nudges)),
            scheduler: Arc::new(ScreeningScheduler::new(cadence)),
            retention: Duration::try_days(retention_days.max(0)).unwrap_or(Duration::MAX),
            nudge_claim: Mutex::new(()),
        }
    }

    /// Stores a new urge event and re-evaluates risk with it included.
    pub fn log_event(
        &self,
        event: UrgeEvent,
        red_flags: RedFlagCheck,
        now: DateTime<Utc>,
    ) -> Result<RiskAssessment, RiskServiceError> {
        event.validate()?;
        let stored = self.events.append(event)?;
        debug!(
            event_type = stored.event_type.label(),
            intensity = stored.intensity,
            "urge event logged"
        );
        self.assess(red_flags, now)
    }

    /// Scores and stores a completed questionnaire.
    pub fn record_screening(
        &self,
        instrument: ScreeningInstrument,
        category: Category,
        responses: Vec<u8>,
        now: DateTime<Utc>,
    ) -> Result<ScreeningResult, RiskServiceError> {
        let result =
            ScreeningResult::scored(now.timestamp_millis(), instrument, category, responses)?;
        let stored = self.screenings.insert(result)?;
        info!(
            instrument = %stored.instrument,
            category = %stored.category,
            band = stored.band.label(),
            "screening recorded"
        );
        Ok(stored)
    }

    pub fn skip_screening(
        &self,
        instrument: ScreeningInstrument,
        category: Category,
        now: DateTime<Utc>,
    ) -> Result<ScreeningResult, RiskServiceError> {
        let result = ScreeningResult::skipped(now.timestamp_millis(), instrument, category);
        let stored = self.screenings.insert(result)?;
        info!(category = %stored.category, "screening skipped");
        Ok(stored)
    }

    /// Whether `category` should be screened again, using the high-intensity
    /// volume of the short window as the contextual signal.
    pub fn screening_due(
        &self,
        category: &Category,
        now: DateTime<Utc>,
    ) -> Result<bool, RiskServiceError> {
        let last = self.screenings.latest_for_category(category)?;
        let days = days_since(last.as_ref(), now).unwrap_or(i64::MAX);
        let recent_high_intensity = self
            .events
            .events_between(
                window_start(now, Duration::try_days(SHORT_WINDOW_DAYS)),
                i64::MAX,
            )?
            .iter()
            .filter(|event| event.is_high_intensity())
            .count() as u32;

        let due = self
            .scheduler
            .should_trigger_screening(last.as_ref(), days, recent_high_intensity);
        debug!(%category, due, recent_high_intensity, "screening schedule checked");
        Ok(due)
    }

    /// Worst band across the latest non-skipped screening per category.
    pub fn current_screener_band(&self) -> Result<RiskBand, RiskServiceError> {
        Ok(screener_band(&self.screenings.all()?))
    }

    /// Evaluates the trailing windows ending at `now` and persists the result.
    pub fn assess(
        &self,
        red_flags: RedFlagCheck,
        now: DateTime<Utc>,
    ) -> Result<RiskAssessment, RiskServiceError> {
        let events = self.events.events_between(
            window_start(now, Duration::try_days(LONG_WINDOW_DAYS)),
            i64::MAX,
        )?;
        let band = self.current_screener_band()?;

        let assessment = self
            .engine
            .evaluate_current_risk(&events, Some(band), red_flags, now);
        let stored = self.assessments.insert(assessment)?;

        info!(
            tier = stored.nudge_tier.label(),
            rule = stored.rule_triggered.map(|rule| rule.label()),
            screener_band = stored.screener_band.label(),
            "risk assessment stored"
        );
        Ok(stored)
    }

    pub fn latest_assessment(&self) -> Result<Option<RiskAssessment>, RiskServiceError> {
        Ok(self.assessments.latest()?)
    }

    /// Checks the governor against the latest assessment without recording anything.
    pub fn nudge_decision(&self, now: DateTime<Utc>) -> Result<NudgeDecision, RiskServiceError> {
        let latest = self.assessments.latest()?;
        let lookback = Duration::try_hours(self.governor.policy().lookback_hours().max(0));
        let history = self.assessments.nudges_since(window_start(now, lookback))?;
        let hours_since = match self.assessments.latest_nudge()? {
            Some(last) => hours_since_last_nudge(&[last], now),
            None => None,
        };

        let decision = self
            .governor
            .decide(latest.as_ref(), &history, hours_since, now);
        debug!(?decision, "nudge decision");
        Ok(decision)
    }

    /// Decides and, when allowed, records a shown nudge in one step so two
    /// concurrent callers cannot both display one.
    pub fn claim_nudge(&self, now: DateTime<Utc>) -> Result<Option<NudgeContent>, RiskServiceError> {
        let _claim = self
            .nudge_claim
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let NudgeDecision::Show { tier } = self.nudge_decision(now)? else {
            return Ok(None);
        };
        let Some(content) = nudge_content(tier) else {
            return Ok(None);
        };

        self.assessments.record_nudge(ShownNudge {
            timestamp: now.timestamp_millis(),
            tier,
        })?;
        info!(tier = tier.label(), "nudge shown");
        Ok(Some(content))
    }

    /// Removes assessments older than the retention window.
    pub fn prune(&self, now: DateTime<Utc>) -> Result<usize, RiskServiceError> {
        let cutoff = window_start(now, Some(self.retention));
        let removed = self.assessments.prune_before(cutoff)?;
        if removed > 0 {
            info!(removed, "old risk assessments pruned");
        }
        Ok(removed)
    }

    pub fn export(&self) -> Result<RiskExport, RiskServiceError> {
        Ok(RiskExport {
            screenings: self.screenings.all()?,
            assessments: self.assessments.all()?,
        })
    }

    /// Deletes every event, screening, and assessment.
    pub fn reset(&self) -> Result<(), RiskServiceError> {
        let events = self.events.clear()?;
        let screenings = self.screenings.clear()?;
        let assessments = self.assessments.clear()?;
        warn!(events, screenings, assessments, "risk data reset");
        Ok(())
    }
}

/// Epoch millis `span` before `now`, or the start of time when the span
/// reaches past what chrono can represent.
fn window_start(now: DateTime<Utc>, span: Option<Duration>) -> i64 {
    span.and_then(|span| now.checked_sub_signed(span))
        .map(|start| start.timestamp_millis())
        .unwrap_or(i64::MIN)
}

/// Error raised by the risk service.
#[derive(Debug, thiserror::Error)]
pub enum RiskServiceError {
    #[error(transparent)]
    InvalidEvent(#[from] InvalidEvent),
    #[error(transparent)]
    Screening(#[from] ScreeningError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
