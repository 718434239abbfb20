//! Policy selectors for session templates
//!
//! Split, variant and phase are closed enumerations. They change how a
//! landmark budget is spent, never the landmark itself.

use std::fmt;
use std::str::FromStr;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::exercises::{Equipment, Exercise, MuscleGroup};
use crate::landmarks::VolumeLandmark;
use crate::periodization::{Effort, Phase, SpecialTechnique};
use crate::profile::ExperienceLevel;

/// Training days per week: 5, 6 or 7
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub struct TrainingFrequency(u8);

impl TrainingFrequency {
    pub fn new(days: u8) -> Result<Self, PlanError> {
        match days {
            5..=7 => Ok(Self(days)),
            other => Err(PlanError::InvalidFrequency(other)),
        }
    }

    pub fn days(&self) -> u8 {
        self.0
    }

    pub fn training_days(&self) -> Vec<Weekday> {
        use Weekday::*;
        match self.0 {
            5 => vec![Mon, Tue, Wed, Fri, Sat],
            6 => vec![Mon, Tue, Wed, Thu, Fri, Sat],
            _ => vec![Mon, Tue, Wed, Thu, Fri, Sat, Sun],
        }
    }
}

impl TryFrom<u8> for TrainingFrequency {
    type Error = PlanError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TrainingFrequency> for u8 {
    fn from(value: TrainingFrequency) -> Self {
        value.0
    }
}

impl FromStr for TrainingFrequency {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let days: u8 = s.trim().parse().map_err(|_| PlanError::UnknownValue {
            kind: "frequency",
            value: s.to_string(),
        })?;
        Self::new(days)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Split {
    #[default]
    PushPullLegs,
    /// Chest+back / shoulders+arms / legs
    Arnold,
}

impl Split {
    pub fn name(&self) -> &'static str {
        match self {
            Split::PushPullLegs => "push_pull_legs",
            Split::Arnold => "arnold",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Split::PushPullLegs => "Push/Pull/Legs",
            Split::Arnold => "Arnold split",
        }
    }

    /// Day types in weekly order
    pub fn day_types(&self, frequency: TrainingFrequency) -> Vec<DayType> {
        use DayType::*;
        let cycle: [DayType; 3] = match self {
            Split::PushPullLegs => [Push, Pull, Legs],
            Split::Arnold => [ChestBack, ShouldersArms, Legs],
        };
        match frequency.days() {
            5 => vec![cycle[0], cycle[1], cycle[2], Upper, Lower],
            6 => cycle.iter().chain(cycle.iter()).copied().collect(),
            _ => cycle.iter().chain(cycle.iter()).copied().chain([WeakPoint]).collect(),
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Split {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "push_pull_legs" | "ppl" => Ok(Split::PushPullLegs),
            "arnold" => Ok(Split::Arnold),
            other => Err(PlanError::UnknownValue {
                kind: "split",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DayType {
    Push,
    Pull,
    Legs,
    Upper,
    Lower,
    ChestBack,
    ShouldersArms,
    WeakPoint,
}

impl DayType {
    pub fn label(&self) -> &'static str {
        match self {
            DayType::Push => "Push",
            DayType::Pull => "Pull",
            DayType::Legs => "Legs",
            DayType::Upper => "Upper",
            DayType::Lower => "Lower",
            DayType::ChestBack => "Chest & Back",
            DayType::ShouldersArms => "Shoulders & Arms",
            DayType::WeakPoint => "Weak Point",
        }
    }

    /// `(primary, secondary)` muscle groups. Weak point days train the
    /// priority groups when there are any.
    pub fn focus(&self, priorities: &[MuscleGroup]) -> (Vec<MuscleGroup>, Vec<MuscleGroup>) {
        use MuscleGroup::*;
        let (primary, secondary): (&[MuscleGroup], &[MuscleGroup]) = match self {
            DayType::Push => (&[Chest, Shoulders], &[Triceps]),
            DayType::Pull => (&[Back], &[Biceps, Shoulders]),
            DayType::Legs => (&[Quads, Hamstrings, Glutes], &[Calves, Abs]),
            DayType::Upper => (&[Chest, Back], &[Shoulders, Biceps, Triceps]),
            DayType::Lower => (&[Quads, Hamstrings], &[Glutes, Calves, Abs]),
            DayType::ChestBack => (&[Chest, Back], &[Abs]),
            DayType::ShouldersArms => (&[Shoulders], &[Biceps, Triceps]),
            DayType::WeakPoint if !priorities.is_empty() => {
                return (priorities.to_vec(), Vec::new());
            }
            DayType::WeakPoint => (&[Shoulders, Biceps, Triceps], &[Calves, Abs]),
        };
        (primary.to_vec(), secondary.to_vec())
    }
}

/// Named programming style
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    #[default]
    Standard,
    /// More total volume, fewer reps per set
    Nippard,
    /// More sets per exercise
    Cbum,
    /// Lower reps, higher intensity
    StrengthFocus,
}

impl Variant {
    pub fn name(&self) -> &'static str {
        match self {
            Variant::Standard => "standard",
            Variant::Nippard => "nippard",
            Variant::Cbum => "cbum",
            Variant::StrengthFocus => "strength_focus",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Variant::Standard => "Standard",
            Variant::Nippard => "Nippard",
            Variant::Cbum => "CBum",
            Variant::StrengthFocus => "Strength",
        }
    }

    pub fn sets_per_exercise(&self) -> u32 {
        match self {
            Variant::Standard => 4,
            Variant::Nippard => 3,
            Variant::Cbum | Variant::StrengthFocus => 5,
        }
    }

    pub fn rep_offset(&self) -> i32 {
        match self {
            Variant::Standard => 0,
            Variant::Nippard => -1,
            Variant::Cbum => 2,
            Variant::StrengthFocus => -2,
        }
    }

    /// Selection bias; higher is picked first, ties keep catalog order
    pub fn preference(&self, exercise: &Exercise) -> u8 {
        let compound = u8::from(exercise.is_compound);
        let free_weight = u8::from(exercise.uses(Equipment::Barbell) || exercise.uses(Equipment::Dumbbell));
        let barbell = u8::from(exercise.uses(Equipment::Barbell));
        let stable = u8::from(exercise.uses(Equipment::Cable) || exercise.uses(Equipment::Machine));
        let machine = u8::from(exercise.uses(Equipment::Machine));
        let dumbbell = u8::from(exercise.uses(Equipment::Dumbbell));
        match self {
            Variant::Standard => compound * 2 + free_weight,
            Variant::Nippard => stable * 2 + compound,
            Variant::Cbum => machine * 2 + dumbbell,
            Variant::StrengthFocus => compound * 3 + barbell * 2,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "standard" => Ok(Variant::Standard),
            "nippard" => Ok(Variant::Nippard),
            "cbum" => Ok(Variant::Cbum),
            "strength_focus" | "strength" => Ok(Variant::StrengthFocus),
            other => Err(PlanError::UnknownValue {
                kind: "variant",
                value: other.to_string(),
            }),
        }
    }
}

/// Weekly set target for a group under a phase, variant and week level.
///
/// Always within `1..=maximum`.
pub fn weekly_set_target(
    landmark: &VolumeLandmark,
    phase: Phase,
    variant: Variant,
    volume_level: Option<u8>,
    prioritized: bool,
) -> u32 {
    let sets = landmark.weekly_sets;
    let maximum = sets.maximum.max(1);

    let base = match phase {
        Phase::Accumulation => sets.optimal,
        Phase::Intensification => (sets.minimum + sets.optimal).div_ceil(2),
        Phase::Realization | Phase::Maintenance => sets.minimum,
        Phase::Deload | Phase::Transition => sets.minimum.div_ceil(2),
    } as i64;

    let ramp = volume_level.map_or(0, |level| level as i64 - phase.baseline().0 as i64);
    let mut target = (base + ramp).clamp(1, maximum as i64) as u32;

    if variant == Variant::Nippard && phase.is_loading() {
        target += (maximum - target) / 4;
    }
    if prioritized && phase.is_loading() {
        target += (maximum - target).div_ceil(2);
    }
    target.min(maximum)
}

/// Target reps per set
pub fn target_reps(phase: Phase, variant: Variant) -> u32 {
    let base: i32 = match phase {
        Phase::Accumulation => 10,
        Phase::Intensification => 6,
        Phase::Realization => 3,
        Phase::Deload => 8,
        Phase::Transition => 12,
        Phase::Maintenance => 8,
    };
    (base + variant.rep_offset()).max(1) as u32
}

pub fn reps_in_reserve(level: ExperienceLevel, phase: Phase) -> u8 {
    match phase {
        Phase::Deload | Phase::Transition => 4,
        Phase::Realization => level.reps_in_reserve().saturating_sub(1),
        _ => level.reps_in_reserve(),
    }
}

pub fn effort(variant: Variant, rir: u8) -> Effort {
    match variant {
        Variant::StrengthFocus => Effort::Rpe(10.0 - rir.min(10) as f32),
        _ => Effort::Rir(rir),
    }
}

pub fn rest_seconds(reps: u32, variant: Variant) -> u32 {
    let base = match reps {
        0..=5 => 180,
        6..=8 => 120,
        _ => 90,
    };
    if variant == Variant::StrengthFocus { base + 60 } else { base }
}

pub fn tempo(phase: Phase) -> &'static str {
    match phase {
        Phase::Accumulation => "3-0-1-0",
        Phase::Intensification => "2-0-1-0",
        Phase::Realization => "2-1-X-0",
        Phase::Deload | Phase::Transition | Phase::Maintenance => "2-0-2-0",
    }
}

/// Intensity technique for the last exercise of a muscle group, if any
pub fn finisher(variant: Variant, phase: Phase, exercise: &Exercise) -> Option<SpecialTechnique> {
    match (variant, phase) {
        (Variant::Cbum, Phase::Accumulation) => Some(SpecialTechnique::DropSet),
        (Variant::Nippard, Phase::Accumulation) if !exercise.is_compound => Some(SpecialTechnique::LengthenedPartials),
        (Variant::Nippard, Phase::Intensification) if !exercise.is_compound => Some(SpecialTechnique::MyoReps),
        (Variant::StrengthFocus, Phase::Realization) if exercise.is_compound => Some(SpecialTechnique::ClusterSet),
        (Variant::Standard, Phase::Intensification) if !exercise.is_compound => Some(SpecialTechnique::RestPause),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{Range, DEFAULT_PRIORITY};

    fn landmark(minimum: u32, optimal: u32, maximum: u32) -> VolumeLandmark {
        VolumeLandmark {
            muscle_group: MuscleGroup::Chest,
            weekly_sets: Range { minimum, optimal, maximum },
            weekly_frequency: Range { minimum: 1, optimal: 2, maximum: 2 },
            recovery_hours: 48.0,
            priority: DEFAULT_PRIORITY,
        }
    }

    #[test]
    fn test_frequency_bounds() {
        assert!(TrainingFrequency::new(4).is_err());
        assert!(TrainingFrequency::new(8).is_err());
        assert_eq!(TrainingFrequency::new(5).unwrap().training_days().len(), 5);
        assert_eq!(TrainingFrequency::new(7).unwrap().training_days().len(), 7);
        assert_eq!("6".parse::<TrainingFrequency>().unwrap().days(), 6);
        assert!(serde_json::from_str::<TrainingFrequency>("3").is_err());
    }

    #[test]
    fn test_day_types() {
        let six = Split::PushPullLegs.day_types(TrainingFrequency::new(6).unwrap());
        assert_eq!(six, vec![DayType::Push, DayType::Pull, DayType::Legs, DayType::Push, DayType::Pull, DayType::Legs]);
        let seven = Split::Arnold.day_types(TrainingFrequency::new(7).unwrap());
        assert_eq!(seven.last(), Some(&DayType::WeakPoint));
        assert_eq!(seven[0], DayType::ChestBack);
    }

    #[test]
    fn test_weak_point_uses_priorities() {
        let (primary, secondary) = DayType::WeakPoint.focus(&[MuscleGroup::Calves]);
        assert_eq!(primary, vec![MuscleGroup::Calves]);
        assert!(secondary.is_empty());
    }

    #[test]
    fn test_weekly_target_by_phase() {
        let lm = landmark(9, 13, 22);
        assert_eq!(weekly_set_target(&lm, Phase::Accumulation, Variant::Standard, None, false), 13);
        assert_eq!(weekly_set_target(&lm, Phase::Intensification, Variant::Standard, None, false), 11);
        assert_eq!(weekly_set_target(&lm, Phase::Realization, Variant::Standard, None, false), 9);
        assert_eq!(weekly_set_target(&lm, Phase::Deload, Variant::Standard, None, false), 5);
    }

    #[test]
    fn test_weekly_target_bonuses_capped() {
        let lm = landmark(9, 13, 22);
        assert_eq!(weekly_set_target(&lm, Phase::Accumulation, Variant::Nippard, None, false), 15);
        assert_eq!(weekly_set_target(&lm, Phase::Accumulation, Variant::Standard, None, true), 18);
        assert_eq!(weekly_set_target(&lm, Phase::Accumulation, Variant::Standard, Some(30), true), 22);
    }

    #[test]
    fn test_weekly_target_ramp() {
        let lm = landmark(9, 13, 22);
        // accumulation baseline volume is 7
        assert_eq!(weekly_set_target(&lm, Phase::Accumulation, Variant::Standard, Some(9), false), 15);
        assert_eq!(weekly_set_target(&lm, Phase::Realization, Variant::Standard, Some(1), false), 6);
    }

    #[test]
    fn test_reps_and_effort() {
        assert_eq!(target_reps(Phase::Accumulation, Variant::Cbum), 12);
        assert_eq!(target_reps(Phase::Realization, Variant::StrengthFocus), 1);
        assert_eq!(reps_in_reserve(ExperienceLevel::Advanced, Phase::Realization), 0);
        assert_eq!(effort(Variant::StrengthFocus, 2), Effort::Rpe(8.0));
        assert_eq!(effort(Variant::Standard, 2), Effort::Rir(2));
    }

    #[test]
    fn test_variant_parse() {
        assert_eq!("strength-focus".parse::<Variant>().unwrap(), Variant::StrengthFocus);
        assert!("bro_split".parse::<Variant>().is_err());
        assert_eq!("ppl".parse::<Split>().unwrap(), Split::PushPullLegs);
    }
}
