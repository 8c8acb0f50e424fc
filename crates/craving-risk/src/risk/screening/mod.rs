//! Static triage: questionnaire scoring, band aggregation, and re-check scheduling.

mod questions;
mod scheduler;

pub use questions::{
    audit_c_questions, instrument_for, questions_for, red_flag_questions, sds_questions,
    ScreeningQuestion,
};
pub use scheduler::{days_since, ScreeningCadence, ScreeningScheduler};

use std::collections::BTreeMap;

use super::domain::{Category, RiskBand, ScreeningInstrument, ScreeningResult};

/// Rejected questionnaire input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScreeningError {
    #[error("{instrument} expects {expected} responses, got {actual}")]
    WrongLength {
        instrument: ScreeningInstrument,
        expected: usize,
        actual: usize,
    },
    #[error("{instrument} question {question} answered {value}, maximum is {max}")]
    AnswerOutOfRange {
        instrument: ScreeningInstrument,
        question: usize,
        value: u8,
        max: u8,
    },
}

/// Scores a response vector into a band.
///
/// AUDIT-C sums of 0-2 are `Low`, 3-4 `Elevated`, anything above `High`.
/// SDS sums of 0-3 are `Low`, 4-6 `Elevated`, anything above `High`.
pub fn score(instrument: ScreeningInstrument, responses: &[u8]) -> Result<RiskBand, ScreeningError> {
    let expected = instrument.question_count();
    if responses.len() != expected {
        return Err(ScreeningError::WrongLength {
            instrument,
            expected,
            actual: responses.len(),
        });
    }

    let max = instrument.max_answer();
    if let Some((index, value)) = responses
        .iter()
        .enumerate()
        .find(|(_, value)| **value > max)
    {
        return Err(ScreeningError::AnswerOutOfRange {
            instrument,
            question: index + 1,
            value: *value,
            max,
        });
    }

    let total: u32 = responses.iter().map(|value| u32::from(*value)).sum();
    let (low_max, elevated_max) = match instrument {
        ScreeningInstrument::AuditC => (2, 4),
        ScreeningInstrument::Sds => (3, 6),
    };

    Ok(if total <= low_max {
        RiskBand::Low
    } else if total <= elevated_max {
        RiskBand::Elevated
    } else {
        RiskBand::High
    })
}

/// Worst of two bands.
pub fn combine_bands(left: RiskBand, right: RiskBand) -> RiskBand {
    left.max(right)
}

/// Worst band in `bands`, `Low` when empty.
pub fn worst_band<I>(bands: I) -> RiskBand
where
    I: IntoIterator<Item = RiskBand>,
{
    bands.into_iter().fold(RiskBand::Low, combine_bands)
}

/// Screener context for the behavioral engine: the worst band across the
/// most recent non-skipped result of each category.
pub fn screener_band(results: &[ScreeningResult]) -> RiskBand {
    let mut latest: BTreeMap<&Category, &ScreeningResult> = BTreeMap::new();
    for result in results.iter().filter(|result| !result.skipped) {
        latest
            .entry(&result.category)
            .and_modify(|current| {
                if result.timestamp > current.timestamp {
                    *current = result;
                }
            })
            .or_insert(result);
    }

    worst_band(latest.values().map(|result| result.band))
}

impl ScreeningResult {
    /// Scores `responses` and builds a completed result.
    pub fn scored(
        timestamp: i64,
        instrument: ScreeningInstrument,
        category: Category,
        responses: Vec<u8>,
    ) -> Result<Self, ScreeningError> {
        let band = score(instrument, &responses)?;
        Ok(Self {
            timestamp,
            instrument,
            category,
            responses,
            band,
            skipped: false,
        })
    }
}
