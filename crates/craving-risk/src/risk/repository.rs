use serde::{Deserialize, Serialize};

use super::domain::{Category, RiskAssessment, ScreeningResult, ShownNudge, UrgeEvent};

/// Event log owned by the host application. The risk core only reads ranges.
pub trait EventStore: Send + Sync {
    fn append(&self, event: UrgeEvent) -> Result<UrgeEvent, RepositoryError>;
    /// Events with `start <= timestamp <= end`, epoch milliseconds.
    fn events_between(&self, start: i64, end: i64) -> Result<Vec<UrgeEvent>, RepositoryError>;
    /// User-initiated data reset. Returns the number of removed events.
    fn clear(&self) -> Result<usize, RepositoryError>;
}

pub trait ScreeningStore: Send + Sync {
    fn insert(&self, result: ScreeningResult) -> Result<ScreeningResult, RepositoryError>;
    fn latest_for_category(
        &self,
        category: &Category,
    ) -> Result<Option<ScreeningResult>, RepositoryError>;
    fn all(&self) -> Result<Vec<ScreeningResult>, RepositoryError>;
    fn clear(&self) -> Result<usize, RepositoryError>;
}

/// Assessment history plus the log of nudges that were actually displayed.
pub trait AssessmentStore: Send + Sync {
    fn insert(&self, assessment: RiskAssessment) -> Result<RiskAssessment, RepositoryError>;
    fn latest(&self) -> Result<Option<RiskAssessment>, RepositoryError>;
    fn all(&self) -> Result<Vec<RiskAssessment>, RepositoryError>;
    /// Drops assessments older than `cutoff`. Returns the number removed.
    fn prune_before(&self, cutoff: i64) -> Result<usize, RepositoryError>;
    fn record_nudge(&self, nudge: ShownNudge) -> Result<(), RepositoryError>;
    fn nudges_since(&self, start: i64) -> Result<Vec<ShownNudge>, RepositoryError>;
    fn latest_nudge(&self) -> Result<Option<ShownNudge>, RepositoryError>;
    fn clear(&self) -> Result<usize, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Everything stored about screenings and assessments, for data export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskExport {
    pub screenings: Vec<ScreeningResult>,
    pub assessments: Vec<RiskAssessment>,
}
