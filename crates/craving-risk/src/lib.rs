//! Behavioral risk evaluation for urge tracking.
//!
//! The [`risk`] module holds the screening scorer, escalation rules, behavioral
//! engine, nudge governor, and screening scheduler, plus the orchestration
//! service that wires them to injected stores.

pub mod config;
pub mod error;
pub mod risk;
pub mod telemetry;
