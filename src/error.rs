//! Error types for plan construction and configuration

use chrono::{NaiveDate, Weekday};
use thiserror::Error;

use crate::exercises::MuscleGroup;
use crate::periodization::Phase;

/// Structural violations and caller defects.
///
/// Everything here stops generation. Nothing is repaired silently.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("macrocycle has no mesocycles")]
    EmptyMacrocycle,

    #[error("macrocycle duration {0} weeks is outside 4..=52")]
    InvalidDuration(u32),

    #[error("mesocycle {index} starts {found}, expected {expected} (gap in plan)")]
    DateGap {
        index: usize,
        expected: NaiveDate,
        found: NaiveDate,
    },

    #[error("mesocycle {index} starts {found}, before previous block ends {expected} (overlap)")]
    DateOverlap {
        index: usize,
        expected: NaiveDate,
        found: NaiveDate,
    },

    #[error("mesocycle {index} has {microcycles} microcycles but declares {declared_weeks} weeks")]
    BlockLength {
        index: usize,
        declared_weeks: u32,
        microcycles: usize,
    },

    #[error("mesocycles sum to {actual} weeks, macrocycle declares {declared}")]
    DurationMismatch { declared: u32, actual: u32 },

    #[error("mesocycle {index} has {found} deload microcycles, expected {expected}")]
    DeloadCount {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("microcycle {week} of mesocycle {index} is out of sequence")]
    MicrocycleSequence { index: usize, week: u32 },

    #[error("a plan cannot open with phase {0:?}")]
    OpeningPhase(Phase),

    #[error("phase {to:?} cannot follow {from:?}")]
    PhaseOrder { from: Phase, to: Phase },

    #[error("{field} level {value} is outside 1..=10")]
    LevelOutOfRange { field: &'static str, value: u8 },

    #[error("{group:?} {field} landmark violates minimum <= optimal <= maximum")]
    LandmarkRange {
        group: MuscleGroup,
        field: &'static str,
    },

    #[error("training frequency {0} is not one of 5, 6, 7")]
    InvalidFrequency(u8),

    #[error("recovery capacity {0} is outside 1..=10")]
    InvalidRecoveryCapacity(u8),

    #[error("unknown {kind}: {value}")]
    UnknownValue { kind: &'static str, value: String },

    #[error("microcycle week {0} already has sessions")]
    SessionsAlreadyFilled(u32),

    #[error("session on {0} is not a scheduled training day")]
    UnscheduledDay(Weekday),

    #[error("more than one session on {0}")]
    DuplicateSessionDay(Weekday),
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse {key}: {value}")]
    Parse { key: &'static str, value: String },

    #[error("Value out of range: {0}")]
    ValueOutOfRange(&'static str),
}
