//! Plan hierarchy: Macrocycle -> Mesocycle -> Microcycle -> Session

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::exercises::MuscleGroup;
use crate::profile::Goal;
use crate::templates::DayType;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Accumulation,
    Intensification,
    Realization,
    Deload,
    Transition,
    Maintenance,
}

impl Phase {
    /// Baseline `(volume, intensity)` levels. Volume falls as intensity rises.
    pub fn baseline(&self) -> (u8, u8) {
        match self {
            Phase::Accumulation => (7, 6),
            Phase::Intensification => (6, 8),
            Phase::Realization => (4, 9),
            Phase::Deload => (3, 4),
            Phase::Transition => (3, 3),
            Phase::Maintenance => (5, 6),
        }
    }

    /// Position inside one accumulation -> deload wave; `None` for the
    /// phases that sit between waves
    pub fn wave_rank(&self) -> Option<u8> {
        match self {
            Phase::Accumulation => Some(0),
            Phase::Intensification => Some(1),
            Phase::Realization => Some(2),
            Phase::Deload => Some(3),
            Phase::Transition | Phase::Maintenance => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Phase::Accumulation | Phase::Intensification | Phase::Realization)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Accumulation => "accumulation",
            Phase::Intensification => "intensification",
            Phase::Realization => "realization",
            Phase::Deload => "deload",
            Phase::Transition => "transition",
            Phase::Maintenance => "maintenance",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Phase {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "accumulation" | "volume" => Ok(Phase::Accumulation),
            "intensification" | "strength" => Ok(Phase::Intensification),
            "realization" | "peak" | "peaking" => Ok(Phase::Realization),
            "deload" => Ok(Phase::Deload),
            "transition" => Ok(Phase::Transition),
            "maintenance" => Ok(Phase::Maintenance),
            other => Err(PlanError::UnknownValue {
                kind: "phase",
                value: other.to_string(),
            }),
        }
    }
}

/// Effort target for a set
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Effort {
    Rpe(f32),
    Rir(u8),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SpecialTechnique {
    DropSet,
    RestPause,
    MyoReps,
    LengthenedPartials,
    ClusterSet,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SetTarget {
    pub reps: u32,
    /// kg, present only when the profile has a 1RM for the exercise
    pub weight_kg: Option<f64>,
    pub effort: Effort,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExerciseConfig {
    pub exercise_id: String,
    pub exercise_name: String,
    pub muscle_group: MuscleGroup,
    pub sets: Vec<SetTarget>,
    pub rest_seconds: u32,
    /// eccentric-pause-concentric-pause
    pub tempo: String,
    pub technique: Option<SpecialTechnique>,
}

/// Disclosure that an alternative exercise filled a slot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Substitution {
    pub muscle_group: MuscleGroup,
    pub requested_pattern: crate::exercises::MovementPattern,
    pub exercise_id: String,
    pub note: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub day: Weekday,
    pub day_type: DayType,
    pub name: String,
    pub description: String,
    pub primary_focus: Vec<MuscleGroup>,
    pub secondary_focus: Vec<MuscleGroup>,
    pub estimated_duration_minutes: u32,
    pub exercises: Vec<ExerciseConfig>,
    #[serde(default)]
    pub substitutions: Vec<Substitution>,
}

impl Session {
    pub fn total_sets(&self) -> usize {
        self.exercises.iter().map(|e| e.sets.len()).sum()
    }

    pub fn sets_for(&self, group: MuscleGroup) -> usize {
        self.exercises
            .iter()
            .filter(|e| e.muscle_group == group)
            .map(|e| e.sets.len())
            .sum()
    }
}

/// One calendar week
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Microcycle {
    /// 1-based within the mesocycle
    pub week: u32,
    pub start_date: NaiveDate,
    pub volume_level: u8,
    pub intensity_level: u8,
    pub fatigue_target: u8,
    pub is_deload: bool,
    pub training_days: Vec<Weekday>,
    pub sessions: Vec<Session>,
}

impl Microcycle {
    pub fn end_date(&self) -> NaiveDate {
        self.start_date + Duration::days(7)
    }

    pub fn is_populated(&self) -> bool {
        !self.sessions.is_empty()
    }

    /// Accept generated sessions for this week.
    ///
    /// Only session contents change; levels, dates and deload flag stay
    /// with the planner. A week is populated once.
    pub fn fill_sessions(&mut self, mut sessions: Vec<Session>) -> Result<(), PlanError> {
        if self.is_populated() {
            return Err(PlanError::SessionsAlreadyFilled(self.week));
        }

        let mut seen: Vec<Weekday> = Vec::with_capacity(sessions.len());
        for session in &sessions {
            if !self.training_days.contains(&session.day) {
                return Err(PlanError::UnscheduledDay(session.day));
            }
            if seen.contains(&session.day) {
                return Err(PlanError::DuplicateSessionDay(session.day));
            }
            seen.push(session.day);
        }

        sessions.sort_by_key(|s| s.day.num_days_from_monday());
        self.sessions = sessions;
        Ok(())
    }

    /// Weekly sets per primary muscle group across all sessions
    pub fn weekly_sets(&self, group: MuscleGroup) -> usize {
        self.sessions.iter().map(|s| s.sets_for(group)).sum()
    }
}

/// Phase block
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Mesocycle {
    /// 0-based position in the macrocycle
    pub index: usize,
    pub name: String,
    pub phase: Phase,
    pub start_date: NaiveDate,
    pub duration_weeks: u32,
    pub volume_level: u8,
    pub intensity_level: u8,
    pub includes_deload: bool,
    pub microcycles: Vec<Microcycle>,
}

impl Mesocycle {
    /// Exclusive
    pub fn end_date(&self) -> NaiveDate {
        self.start_date + Duration::weeks(self.duration_weeks as i64)
    }

    pub fn deload_count(&self) -> usize {
        self.microcycles.iter().filter(|m| m.is_deload).count()
    }

    /// Phase that is actually trained in a given week
    pub fn phase_for(&self, microcycle: &Microcycle) -> Phase {
        if microcycle.is_deload { Phase::Deload } else { self.phase }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Macrocycle {
    pub user_id: String,
    pub name: String,
    pub goal: Goal,
    pub start_date: NaiveDate,
    pub duration_weeks: u32,
    pub mesocycles: Vec<Mesocycle>,
}

impl Macrocycle {
    /// Exclusive
    pub fn end_date(&self) -> NaiveDate {
        self.start_date + Duration::weeks(self.duration_weeks as i64)
    }

    pub fn microcycles(&self) -> impl Iterator<Item = &Microcycle> {
        self.mesocycles.iter().flat_map(|m| m.microcycles.iter())
    }

    pub fn microcycles_mut(&mut self) -> impl Iterator<Item = (Phase, &mut Microcycle)> {
        self.mesocycles.iter_mut().flat_map(|meso| {
            let phase = meso.phase;
            meso.microcycles
                .iter_mut()
                .map(move |m| (if m.is_deload { Phase::Deload } else { phase }, m))
        })
    }

    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.microcycles().flat_map(|m| m.sessions.iter())
    }
}
