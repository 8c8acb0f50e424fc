use chrono::{DateTime, Utc};
use craving_risk::risk::{
    AssessmentStore, Category, EventStore, RedFlags, RepositoryError, RiskAssessment, RiskBand,
    ScreeningResult, ScreeningStore, ShownNudge, UrgeEvent,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local store backing all three repository traits.
#[derive(Default, Clone)]
pub(crate) struct InMemoryRiskStore {
    events: Arc<Mutex<Vec<UrgeEvent>>>,
    screenings: Arc<Mutex<Vec<ScreeningResult>>>,
    assessments: Arc<Mutex<Vec<RiskAssessment>>>,
    nudges: Arc<Mutex<Vec<ShownNudge>>>,
}

fn poisoned(store: &str) -> RepositoryError {
    RepositoryError::Unavailable(format!("{store} mutex poisoned"))
}

impl EventStore for InMemoryRiskStore {
    fn append(&self, event: UrgeEvent) -> Result<UrgeEvent, RepositoryError> {
        let mut guard = self.events.lock().map_err(|_| poisoned("event"))?;
        guard.push(event.clone());
        Ok(event)
    }

    fn events_between(&self, start: i64, end: i64) -> Result<Vec<UrgeEvent>, RepositoryError> {
        let guard = self.events.lock().map_err(|_| poisoned("event"))?;
        Ok(guard
            .iter()
            .filter(|event| event.timestamp >= start && event.timestamp <= end)
            .cloned()
            .collect())
    }

    fn clear(&self) -> Result<usize, RepositoryError> {
        let mut guard = self.events.lock().map_err(|_| poisoned("event"))?;
        Ok(guard.drain(..).count())
    }
}

impl ScreeningStore for InMemoryRiskStore {
    fn insert(&self, result: ScreeningResult) -> Result<ScreeningResult, RepositoryError> {
        let mut guard = self.screenings.lock().map_err(|_| poisoned("screening"))?;
        guard.push(result.clone());
        Ok(result)
    }

    fn latest_for_category(
        &self,
        category: &Category,
    ) -> Result<Option<ScreeningResult>, RepositoryError> {
        let guard = self.screenings.lock().map_err(|_| poisoned("screening"))?;
        Ok(guard
            .iter()
            .filter(|result| &result.category == category)
            .max_by_key(|result| result.timestamp)
            .cloned())
    }

    fn all(&self) -> Result<Vec<ScreeningResult>, RepositoryError> {
        let guard = self.screenings.lock().map_err(|_| poisoned("screening"))?;
        Ok(guard.clone())
    }

    fn clear(&self) -> Result<usize, RepositoryError> {
        let mut guard = self.screenings.lock().map_err(|_| poisoned("screening"))?;
        Ok(guard.drain(..).count())
    }
}

impl AssessmentStore for InMemoryRiskStore {
    fn insert(&self, assessment: RiskAssessment) -> Result<RiskAssessment, RepositoryError> {
        let mut guard = self.assessments.lock().map_err(|_| poisoned("assessment"))?;
        guard.push(assessment.clone());
        Ok(assessment)
    }

    fn latest(&self) -> Result<Option<RiskAssessment>, RepositoryError> {
        let guard = self.assessments.lock().map_err(|_| poisoned("assessment"))?;
        Ok(guard.iter().max_by_key(|item| item.timestamp).cloned())
    }

    fn all(&self) -> Result<Vec<RiskAssessment>, RepositoryError> {
        let guard = self.assessments.lock().map_err(|_| poisoned("assessment"))?;
        Ok(guard.clone())
    }

    fn prune_before(&self, cutoff: i64) -> Result<usize, RepositoryError> {
        let mut guard = self.assessments.lock().map_err(|_| poisoned("assessment"))?;
        let before = guard.len();
        guard.retain(|item| item.timestamp >= cutoff);
        Ok(before - guard.len())
    }

    fn record_nudge(&self, nudge: ShownNudge) -> Result<(), RepositoryError> {
        let mut guard = self.nudges.lock().map_err(|_| poisoned("nudge"))?;
        guard.push(nudge);
        Ok(())
    }

    fn nudges_since(&self, start: i64) -> Result<Vec<ShownNudge>, RepositoryError> {
        let guard = self.nudges.lock().map_err(|_| poisoned("nudge"))?;
        Ok(guard
            .iter()
            .filter(|nudge| nudge.timestamp >= start)
            .copied()
            .collect())
    }

    fn latest_nudge(&self) -> Result<Option<ShownNudge>, RepositoryError> {
        let guard = self.nudges.lock().map_err(|_| poisoned("nudge"))?;
        Ok(guard.iter().max_by_key(|nudge| nudge.timestamp).copied())
    }

    fn clear(&self) -> Result<usize, RepositoryError> {
        self.nudges.lock().map_err(|_| poisoned("nudge"))?.clear();
        let mut guard = self.assessments.lock().map_err(|_| poisoned("assessment"))?;
        Ok(guard.drain(..).count())
    }
}

pub(crate) fn parse_band(raw: &str) -> Result<RiskBand, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "low" => Ok(RiskBand::Low),
        "elevated" => Ok(RiskBand::Elevated),
        "high" => Ok(RiskBand::High),
        other => Err(format!("'{other}' is not one of low, elevated, high")),
    }
}

/// Comma-separated flag names, e.g. `withdrawal,blackout`. `none` is a clean check.
pub(crate) fn parse_red_flags(raw: &str) -> Result<RedFlags, String> {
    let mut flags = RedFlags::default();
    for name in raw.split(',').map(str::trim).filter(|name| !name.is_empty()) {
        match name.to_ascii_lowercase().as_str() {
            "none" => {}
            "morning" | "morning_use" => flags.morning_use = true,
            "withdrawal" => flags.withdrawal = true,
            "blackout" => flags.blackout = true,
            "failed_cut_down" | "cut_down" => flags.failed_cut_down = true,
            other => return Err(format!("unknown red flag '{other}'")),
        }
    }
    Ok(flags)
}

pub(crate) fn parse_instant(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|moment| moment.with_timezone(&Utc))
        .map_err(|err| format!("failed to parse '{raw}' as RFC 3339 ({err})"))
}
