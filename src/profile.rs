//! Training profile - per-user snapshot consumed by every stage of the engine

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::exercises::Equipment;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Novice,
    Intermediate,
    Advanced,
    Elite,
}

impl ExperienceLevel {
    /// Weeks between deloads. Fatigue accumulates faster at higher loads.
    pub fn deload_cadence_weeks(&self) -> u32 {
        match self {
            ExperienceLevel::Novice => 8,
            ExperienceLevel::Intermediate => 6,
            ExperienceLevel::Advanced | ExperienceLevel::Elite => 4,
        }
    }

    /// Default reps in reserve for working sets
    pub fn reps_in_reserve(&self) -> u8 {
        match self {
            ExperienceLevel::Novice => 3,
            ExperienceLevel::Intermediate => 2,
            ExperienceLevel::Advanced | ExperienceLevel::Elite => 1,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExperienceLevel::Novice => "novice",
            ExperienceLevel::Intermediate => "intermediate",
            ExperienceLevel::Advanced => "advanced",
            ExperienceLevel::Elite => "elite",
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExperienceLevel {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "novice" | "beginner" => Ok(ExperienceLevel::Novice),
            "intermediate" => Ok(ExperienceLevel::Intermediate),
            "advanced" => Ok(ExperienceLevel::Advanced),
            "elite" => Ok(ExperienceLevel::Elite),
            other => Err(PlanError::UnknownValue {
                kind: "experience level",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    Hypertrophy,
    Strength,
    Endurance,
    FatLoss,
    GeneralFitness,
}

impl Goal {
    pub fn name(&self) -> &'static str {
        match self {
            Goal::Hypertrophy => "hypertrophy",
            Goal::Strength => "strength",
            Goal::Endurance => "endurance",
            Goal::FatLoss => "fat_loss",
            Goal::GeneralFitness => "general_fitness",
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Goal {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "hypertrophy" => Ok(Goal::Hypertrophy),
            "strength" => Ok(Goal::Strength),
            "endurance" => Ok(Goal::Endurance),
            "fat_loss" => Ok(Goal::FatLoss),
            "general_fitness" | "general" => Ok(Goal::GeneralFitness),
            other => Err(PlanError::UnknownValue { kind: "goal", value: other.to_string() }),
        }
    }
}

/// Self-reported recovery inputs, each 1-10
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecoveryProfile {
    pub sleep_quality: u8,
    /// Higher = more stressed
    pub stress_level: u8,
    pub nutrition_quality: u8,
}

impl Default for RecoveryProfile {
    fn default() -> Self {
        Self {
            sleep_quality: 6,
            stress_level: 5,
            nutrition_quality: 6,
        }
    }
}

impl RecoveryProfile {
    pub fn validate(&self) -> Result<(), PlanError> {
        for (field, value) in [
            ("sleep quality", self.sleep_quality),
            ("stress", self.stress_level),
            ("nutrition quality", self.nutrition_quality),
        ] {
            if !(1..=10).contains(&value) {
                return Err(PlanError::LevelOutOfRange { field, value });
            }
        }
        Ok(())
    }

    /// Combine into a single capacity. Stress counts inverted.
    pub fn capacity(&self) -> RecoveryCapacity {
        let sum = self.sleep_quality.clamp(1, 10) as f64
            + (11 - self.stress_level.clamp(1, 10)) as f64
            + self.nutrition_quality.clamp(1, 10) as f64;
        RecoveryCapacity((sum / 3.0).round().clamp(1.0, 10.0) as u8)
    }
}

/// Recovery capacity on a 1-10 scale. Zero is unrepresentable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "u8", into = "u8")]
pub struct RecoveryCapacity(u8);

impl RecoveryCapacity {
    pub fn new(value: u8) -> Result<Self, PlanError> {
        if (1..=10).contains(&value) {
            Ok(Self(value))
        } else {
            Err(PlanError::InvalidRecoveryCapacity(value))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64
    }
}

impl Default for RecoveryCapacity {
    fn default() -> Self {
        Self(5)
    }
}

impl TryFrom<u8> for RecoveryCapacity {
    type Error = PlanError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RecoveryCapacity> for u8 {
    fn from(value: RecoveryCapacity) -> Self {
        value.0
    }
}

/// Per-user training snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingProfile {
    pub user_id: String,
    pub experience: ExperienceLevel,
    pub training_age_years: f64,
    pub primary_goal: Goal,
    #[serde(default)]
    pub secondary_goals: Vec<Goal>,
    pub weekly_hours: f64,
    #[serde(default)]
    pub equipment: Vec<Equipment>,
    #[serde(default)]
    pub recovery: RecoveryProfile,
    /// Exercise id -> estimated 1RM (kg)
    #[serde(default)]
    pub strength: BTreeMap<String, f64>,
    /// Last fatigue level reported by performance analysis
    #[serde(default)]
    pub fatigue_estimate: Option<f64>,
}

impl TrainingProfile {
    pub fn new(user_id: impl Into<String>, experience: ExperienceLevel, training_age_years: f64) -> Self {
        Self {
            user_id: user_id.into(),
            experience,
            training_age_years,
            primary_goal: Goal::Hypertrophy,
            secondary_goals: Vec::new(),
            weekly_hours: 6.0,
            equipment: crate::exercises::FULL_GYM.to_vec(),
            recovery: RecoveryProfile::default(),
            strength: BTreeMap::new(),
            fatigue_estimate: None,
        }
    }

    pub fn recovery_capacity(&self) -> RecoveryCapacity {
        self.recovery.capacity()
    }

    pub fn estimated_one_rm(&self, exercise_id: &str) -> Option<f64> {
        self.strength.get(exercise_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovery_capacity_inverts_stress() {
        let calm = RecoveryProfile { sleep_quality: 8, stress_level: 2, nutrition_quality: 8 };
        let stressed = RecoveryProfile { sleep_quality: 8, stress_level: 9, nutrition_quality: 8 };
        assert_eq!(calm.capacity().value(), 8);
        assert_eq!(stressed.capacity().value(), 6);
    }

    #[test]
    fn test_recovery_capacity_bounds() {
        let worst = RecoveryProfile { sleep_quality: 1, stress_level: 10, nutrition_quality: 1 };
        let best = RecoveryProfile { sleep_quality: 10, stress_level: 1, nutrition_quality: 10 };
        assert_eq!(worst.capacity().value(), 1);
        assert_eq!(best.capacity().value(), 10);
    }

    #[test]
    fn test_recovery_capacity_rejects_zero() {
        assert_eq!(RecoveryCapacity::new(0), Err(PlanError::InvalidRecoveryCapacity(0)));
        assert!(RecoveryCapacity::new(11).is_err());
        assert_eq!(RecoveryCapacity::new(7).unwrap().value(), 7);
        assert!(serde_json::from_str::<RecoveryCapacity>("0").is_err());
    }

    #[test]
    fn test_recovery_profile_validate() {
        let bad = RecoveryProfile { sleep_quality: 0, stress_level: 5, nutrition_quality: 5 };
        assert!(bad.validate().is_err());
        assert!(RecoveryProfile::default().validate().is_ok());
    }

    #[test]
    fn test_deload_cadence() {
        assert_eq!(ExperienceLevel::Novice.deload_cadence_weeks(), 8);
        assert_eq!(ExperienceLevel::Intermediate.deload_cadence_weeks(), 6);
        assert_eq!(ExperienceLevel::Advanced.deload_cadence_weeks(), 4);
    }

    #[test]
    fn test_profile_json_defaults() {
        let json = r#"{"user_id":"u1","experience":"advanced","training_age_years":4.0,
            "primary_goal":"strength","weekly_hours":8.0}"#;
        let profile: TrainingProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.experience, ExperienceLevel::Advanced);
        assert!(profile.strength.is_empty());
        assert_eq!(profile.recovery, RecoveryProfile::default());
    }
}
