use std::io::Read;

use chrono::DateTime;
use serde::{Deserialize, Deserializer};

use super::domain::{EventType, Mood, TacticType, TriggerType, UrgeEvent};

/// Failure while reading an exported event log.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },
}

/// Reads urge events from CSV.
///
/// Expected headers: `timestamp,event_type,intensity` plus the optional
/// `tactic,mood,trigger,urge_about,gave_in` columns. Timestamps are RFC 3339 or
/// epoch milliseconds. Rows from older exports that only carry `gave_in` are
/// mapped onto the three-way classification.
pub fn parse_events<R: Read>(reader: R) -> Result<Vec<UrgeEvent>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut events = Vec::new();

    for (index, record) in csv_reader.deserialize::<EventRow>().enumerate() {
        // header is line 1
        let row = index + 2;
        events.push(record?.into_event(row)?);
    }

    Ok(events)
}

#[derive(Debug, Deserialize)]
struct EventRow {
    timestamp: String,
    #[serde(default)]
    event_type: Option<EventType>,
    #[serde(default)]
    gave_in: Option<bool>,
    intensity: u8,
    #[serde(default)]
    tactic: Option<TacticType>,
    #[serde(default)]
    mood: Option<Mood>,
    #[serde(default)]
    trigger: Option<TriggerType>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    urge_about: Option<String>,
}

impl EventRow {
    fn into_event(self, row: usize) -> Result<UrgeEvent, ImportError> {
        let timestamp = parse_timestamp(&self.timestamp).ok_or_else(|| ImportError::InvalidRow {
            row,
            reason: format!("unrecognized timestamp '{}'", self.timestamp),
        })?;

        let event_type = match (self.event_type, self.gave_in) {
            (Some(event_type), _) => event_type,
            (None, Some(gave_in)) => EventType::from_legacy_gave_in(gave_in),
            (None, None) => {
                return Err(ImportError::InvalidRow {
                    row,
                    reason: "missing event_type".to_string(),
                })
            }
        };

        let mut event = UrgeEvent::new(timestamp, event_type, self.intensity);
        event.tactic = self.tactic;
        event.mood = self.mood;
        event.trigger = self.trigger;
        event.urge_about = self.urge_about;
        event.validate().map_err(|err| ImportError::InvalidRow {
            row,
            reason: err.to_string(),
        })?;
        Ok(event)
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_timestamp(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(millis) = trimmed.parse::<i64>() {
        return Some(millis);
    }

    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|moment| moment.timestamp_millis())
}
