use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::risk::domain::{
    Category, EventType, RedFlags, RiskAssessment, RiskBand, ScreeningResult, ShownNudge,
    UrgeEvent,
};
use crate::risk::escalation::RiskInputs;
use crate::risk::repository::{AssessmentStore, EventStore, RepositoryError, ScreeningStore};
use crate::risk::{RiskConfig, RiskService};

/// Mid-afternoon UTC so relative offsets in whole days stay out of the night window.
pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 15, 14, 0, 0)
        .single()
        .expect("valid instant")
}

pub(super) fn days_ago(days: i64) -> DateTime<Utc> {
    now() - Duration::days(days)
}

pub(super) fn hours_ago(hours: i64) -> DateTime<Utc> {
    now() - Duration::hours(hours)
}

/// `days` before [`now`] at the given UTC hour.
pub(super) fn days_ago_at_hour(days: i64, hour: u32) -> DateTime<Utc> {
    let day = days_ago(days).date_naive();
    Utc.from_utc_datetime(&day.and_hms_opt(hour, 0, 0).expect("valid hour"))
}

pub(super) fn event(at: DateTime<Utc>, event_type: EventType, intensity: u8) -> UrgeEvent {
    UrgeEvent::at(at, event_type, intensity)
}

pub(super) fn quiet_inputs() -> RiskInputs {
    RiskInputs {
        screener_band: RiskBand::Low,
        urges_7d: 0,
        high_intensity_7d: 0,
        acted_vs_alt_14d: 0.0,
        night_episodes_7d: 0,
        red_flags: RedFlags::default(),
    }
}

pub(super) fn build_service() -> (
    RiskService<MemoryStore, MemoryStore, MemoryStore>,
    Arc<MemoryStore>,
) {
    let store = Arc::new(MemoryStore::default());
    let service = RiskService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        RiskConfig::default(),
    );
    (service, store)
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    pub(super) events: Arc<Mutex<Vec<UrgeEvent>>>,
    pub(super) screenings: Arc<Mutex<Vec<ScreeningResult>>>,
    pub(super) assessments: Arc<Mutex<Vec<RiskAssessment>>>,
    pub(super) nudges: Arc<Mutex<Vec<ShownNudge>>>,
}

impl EventStore for MemoryStore {
    fn append(&self, event: UrgeEvent) -> Result<UrgeEvent, RepositoryError> {
        self.events
            .lock()
            .expect("event mutex poisoned")
            .push(event.clone());
        Ok(event)
    }

    fn events_between(&self, start: i64, end: i64) -> Result<Vec<UrgeEvent>, RepositoryError> {
        let guard = self.events.lock().expect("event mutex poisoned");
        Ok(guard
            .iter()
            .filter(|event| event.timestamp >= start && event.timestamp <= end)
            .cloned()
            .collect())
    }

    fn clear(&self) -> Result<usize, RepositoryError> {
        let mut guard = self.events.lock().expect("event mutex poisoned");
        let removed = guard.len();
        guard.clear();
        Ok(removed)
    }
}

impl ScreeningStore for MemoryStore {
    fn insert(&self, result: ScreeningResult) -> Result<ScreeningResult, RepositoryError> {
        self.screenings
            .lock()
            .expect("screening mutex poisoned")
            .push(result.clone());
        Ok(result)
    }

    fn latest_for_category(
        &self,
        category: &Category,
    ) -> Result<Option<ScreeningResult>, RepositoryError> {
        let guard = self.screenings.lock().expect("screening mutex poisoned");
        Ok(guard
            .iter()
            .filter(|result| &result.category == category)
            .max_by_key(|result| result.timestamp)
            .cloned())
    }

    fn all(&self) -> Result<Vec<ScreeningResult>, RepositoryError> {
        Ok(self
            .screenings
            .lock()
            .expect("screening mutex poisoned")
            .clone())
    }

    fn clear(&self) -> Result<usize, RepositoryError> {
        let mut guard = self.screenings.lock().expect("screening mutex poisoned");
        let removed = guard.len();
        guard.clear();
        Ok(removed)
    }
}

impl AssessmentStore for MemoryStore {
    fn insert(&self, assessment: RiskAssessment) -> Result<RiskAssessment, RepositoryError> {
        self.assessments
            .lock()
            .expect("assessment mutex poisoned")
            .push(assessment.clone());
        Ok(assessment)
    }

    fn latest(&self) -> Result<Option<RiskAssessment>, RepositoryError> {
        let guard = self.assessments.lock().expect("assessment mutex poisoned");
        Ok(guard.iter().max_by_key(|item| item.timestamp).cloned())
    }

    fn all(&self) -> Result<Vec<RiskAssessment>, RepositoryError> {
        Ok(self
            .assessments
            .lock()
            .expect("assessment mutex poisoned")
            .clone())
    }

    fn prune_before(&self, cutoff: i64) -> Result<usize, RepositoryError> {
        let mut guard = self.assessments.lock().expect("assessment mutex poisoned");
        let before = guard.len();
        guard.retain(|item| item.timestamp >= cutoff);
        Ok(before - guard.len())
    }

    fn record_nudge(&self, nudge: ShownNudge) -> Result<(), RepositoryError> {
        self.nudges.lock().expect("nudge mutex poisoned").push(nudge);
        Ok(())
    }

    fn nudges_since(&self, start: i64) -> Result<Vec<ShownNudge>, RepositoryError> {
        let guard = self.nudges.lock().expect("nudge mutex poisoned");
        Ok(guard
            .iter()
            .filter(|nudge| nudge.timestamp >= start)
            .copied()
            .collect())
    }

    fn latest_nudge(&self) -> Result<Option<ShownNudge>, RepositoryError> {
        let guard = self.nudges.lock().expect("nudge mutex poisoned");
        Ok(guard.iter().max_by_key(|nudge| nudge.timestamp).copied())
    }

    fn clear(&self) -> Result<usize, RepositoryError> {
        let mut guard = self.assessments.lock().expect("assessment mutex poisoned");
        let removed = guard.len();
        guard.clear();
        self.nudges.lock().expect("nudge mutex poisoned").clear();
        Ok(removed)
    }
}

/// Store whose every call fails, for error propagation paths.
pub(super) struct UnavailableStore;

fn offline<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("database offline".to_string()))
}

impl EventStore for UnavailableStore {
    fn append(&self, _event: UrgeEvent) -> Result<UrgeEvent, RepositoryError> {
        offline()
    }

    fn events_between(&self, _start: i64, _end: i64) -> Result<Vec<UrgeEvent>, RepositoryError> {
        offline()
    }

    fn clear(&self) -> Result<usize, RepositoryError> {
        offline()
    }
}

impl ScreeningStore for UnavailableStore {
    fn insert(&self, _result: ScreeningResult) -> Result<ScreeningResult, RepositoryError> {
        offline()
    }

    fn latest_for_category(
        &self,
        _category: &Category,
    ) -> Result<Option<ScreeningResult>, RepositoryError> {
        offline()
    }

    fn all(&self) -> Result<Vec<ScreeningResult>, RepositoryError> {
        offline()
    }

    fn clear(&self) -> Result<usize, RepositoryError> {
        offline()
    }
}

impl AssessmentStore for UnavailableStore {
    fn insert(&self, _assessment: RiskAssessment) -> Result<RiskAssessment, RepositoryError> {
        offline()
    }

    fn latest(&self) -> Result<Option<RiskAssessment>, RepositoryError> {
        offline()
    }

    fn all(&self) -> Result<Vec<RiskAssessment>, RepositoryError> {
        offline()
    }

    fn prune_before(&self, _cutoff: i64) -> Result<usize, RepositoryError> {
        offline()
    }

    fn record_nudge(&self, _nudge: ShownNudge) -> Result<(), RepositoryError> {
        offline()
    }

    fn nudges_since(&self, _start: i64) -> Result<Vec<ShownNudge>, RepositoryError> {
        offline()
    }

    fn latest_nudge(&self) -> Result<Option<ShownNudge>, RepositoryError> {
        offline()
    }

    fn clear(&self) -> Result<usize, RepositoryError> {
        offline()
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
