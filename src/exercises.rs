//! Exercise definitions - the candidate pool for session templates

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PlanError;

/// Muscle groups for volume budgeting
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MuscleGroup {
    Chest,
    Back,
    Shoulders,
    Quads,
    Hamstrings,
    Glutes,
    Biceps,
    Triceps,
    Calves,
    Abs,
    // No base landmark row of their own, they use the default
    Traps,
    Forearms,
}

impl MuscleGroup {
    pub fn name(&self) -> &'static str {
        match self {
            MuscleGroup::Chest => "chest",
            MuscleGroup::Back => "back",
            MuscleGroup::Shoulders => "shoulders",
            MuscleGroup::Quads => "quads",
            MuscleGroup::Hamstrings => "hamstrings",
            MuscleGroup::Glutes => "glutes",
            MuscleGroup::Biceps => "biceps",
            MuscleGroup::Triceps => "triceps",
            MuscleGroup::Calves => "calves",
            MuscleGroup::Abs => "abs",
            MuscleGroup::Traps => "traps",
            MuscleGroup::Forearms => "forearms",
        }
    }

    /// The ten groups with an explicit landmark row
    pub fn all() -> &'static [MuscleGroup] {
        &[
            MuscleGroup::Chest,
            MuscleGroup::Back,
            MuscleGroup::Shoulders,
            MuscleGroup::Quads,
            MuscleGroup::Hamstrings,
            MuscleGroup::Glutes,
            MuscleGroup::Biceps,
            MuscleGroup::Triceps,
            MuscleGroup::Calves,
            MuscleGroup::Abs,
        ]
    }

    /// Movement patterns a session should cover for this group, in slot order
    pub fn patterns(&self) -> &'static [MovementPattern] {
        use MovementPattern::*;
        match self {
            MuscleGroup::Chest => &[HorizontalPress, InclinePress, ChestFly],
            MuscleGroup::Back => &[VerticalPull, HorizontalRow, Pullover],
            MuscleGroup::Shoulders => &[VerticalPress, LateralRaise, RearDeltFly],
            MuscleGroup::Quads => &[Squat, KneeExtension, Lunge],
            MuscleGroup::Hamstrings => &[HipHinge, KneeFlexion],
            MuscleGroup::Glutes => &[HipThrust, Lunge],
            MuscleGroup::Biceps => &[ElbowFlexion],
            MuscleGroup::Triceps => &[ElbowExtension],
            MuscleGroup::Calves => &[CalfRaise],
            MuscleGroup::Abs => &[TrunkFlexion, AntiExtension],
            MuscleGroup::Traps => &[Shrug],
            MuscleGroup::Forearms => &[WristFlexion, Grip],
        }
    }
}

impl fmt::Display for MuscleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for MuscleGroup {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        [
            MuscleGroup::Traps,
            MuscleGroup::Forearms,
        ]
        .iter()
        .chain(MuscleGroup::all())
        .find(|g| g.name() == normalized)
        .copied()
        .ok_or_else(|| PlanError::UnknownValue {
            kind: "muscle group",
            value: s.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Equipment {
    Barbell,
    Dumbbell,
    Cable,
    Machine,
    Bench,
    PullUpBar,
}

impl FromStr for Equipment {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "barbell" => Ok(Equipment::Barbell),
            "dumbbell" | "dumbbells" => Ok(Equipment::Dumbbell),
            "cable" | "cables" => Ok(Equipment::Cable),
            "machine" | "machines" => Ok(Equipment::Machine),
            "bench" => Ok(Equipment::Bench),
            "pull_up_bar" | "pullup_bar" => Ok(Equipment::PullUpBar),
            other => Err(PlanError::UnknownValue {
                kind: "equipment",
                value: other.to_string(),
            }),
        }
    }
}

/// Full gym: every piece of equipment
pub const FULL_GYM: &[Equipment] = &[
    Equipment::Barbell,
    Equipment::Dumbbell,
    Equipment::Cable,
    Equipment::Machine,
    Equipment::Bench,
    Equipment::PullUpBar,
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MovementPattern {
    HorizontalPress,
    InclinePress,
    ChestFly,
    VerticalPull,
    HorizontalRow,
    Pullover,
    VerticalPress,
    LateralRaise,
    RearDeltFly,
    Squat,
    KneeExtension,
    Lunge,
    HipHinge,
    KneeFlexion,
    HipThrust,
    ElbowFlexion,
    ElbowExtension,
    CalfRaise,
    TrunkFlexion,
    AntiExtension,
    Shrug,
    WristFlexion,
    Grip,
}

impl MovementPattern {
    /// Closest substitute patterns, best first
    pub fn nearest(&self) -> &'static [MovementPattern] {
        use MovementPattern::*;
        match self {
            HorizontalPress => &[InclinePress, ChestFly],
            InclinePress => &[HorizontalPress, ChestFly],
            ChestFly => &[HorizontalPress, InclinePress],
            VerticalPull => &[HorizontalRow, Pullover],
            HorizontalRow => &[VerticalPull, Pullover],
            Pullover => &[VerticalPull, HorizontalRow],
            VerticalPress => &[LateralRaise],
            LateralRaise => &[VerticalPress],
            RearDeltFly => &[LateralRaise, VerticalPress],
            Squat => &[Lunge, KneeExtension],
            KneeExtension => &[Squat, Lunge],
            Lunge => &[Squat, HipThrust],
            HipHinge => &[KneeFlexion, HipThrust],
            KneeFlexion => &[HipHinge],
            HipThrust => &[HipHinge, Lunge],
            ElbowFlexion => &[],
            ElbowExtension => &[],
            CalfRaise => &[],
            TrunkFlexion => &[AntiExtension],
            AntiExtension => &[TrunkFlexion],
            Shrug => &[],
            WristFlexion => &[Grip],
            Grip => &[WristFlexion],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Exercise {
    pub id: &'static str,
    pub name: &'static str,
    pub muscle_group: MuscleGroup,
    pub pattern: MovementPattern,
    /// Everything listed must be available; empty = bodyweight
    pub equipment: &'static [Equipment],
    pub is_compound: bool,
}

impl Exercise {
    pub fn is_bodyweight(&self) -> bool {
        self.equipment.is_empty()
    }

    pub fn is_available(&self, available: &[Equipment]) -> bool {
        self.equipment.iter().all(|e| available.contains(e))
    }

    pub fn uses(&self, equipment: Equipment) -> bool {
        self.equipment.contains(&equipment)
    }
}

macro_rules! exercise {
    ($id:literal, $name:literal, $group:ident, $pattern:ident, [$($eq:ident),*], $compound:literal) => {
        Exercise {
            id: $id,
            name: $name,
            muscle_group: MuscleGroup::$group,
            pattern: MovementPattern::$pattern,
            equipment: &[$(Equipment::$eq),*],
            is_compound: $compound,
        }
    };
}

/// Candidate pool. Order matters: it is the final tie-break for selection.
pub const EXERCISES: &[Exercise] = &[
    // Chest
    exercise!("barbell_bench_press", "Barbell Bench Press", Chest, HorizontalPress, [Barbell, Bench], true),
    exercise!("dumbbell_bench_press", "Dumbbell Bench Press", Chest, HorizontalPress, [Dumbbell, Bench], true),
    exercise!("machine_chest_press", "Machine Chest Press", Chest, HorizontalPress, [Machine], true),
    exercise!("push_up", "Push-Up", Chest, HorizontalPress, [], true),
    exercise!("incline_dumbbell_press", "Incline Dumbbell Press", Chest, InclinePress, [Dumbbell, Bench], true),
    exercise!("incline_barbell_press", "Incline Barbell Press", Chest, InclinePress, [Barbell, Bench], true),
    exercise!("feet_elevated_push_up", "Feet-Elevated Push-Up", Chest, InclinePress, [], true),
    exercise!("cable_fly", "Cable Fly", Chest, ChestFly, [Cable], false),
    exercise!("pec_deck", "Pec Deck", Chest, ChestFly, [Machine], false),
    exercise!("dumbbell_fly", "Dumbbell Fly", Chest, ChestFly, [Dumbbell, Bench], false),
    // Back
    exercise!("pull_up", "Pull-Up", Back, VerticalPull, [PullUpBar], true),
    exercise!("lat_pulldown", "Lat Pulldown", Back, VerticalPull, [Cable], true),
    exercise!("barbell_row", "Barbell Row", Back, HorizontalRow, [Barbell], true),
    exercise!("chest_supported_row", "Chest-Supported Dumbbell Row", Back, HorizontalRow, [Dumbbell, Bench], true),
    exercise!("seated_cable_row", "Seated Cable Row", Back, HorizontalRow, [Cable], true),
    exercise!("inverted_row", "Inverted Row", Back, HorizontalRow, [], true),
    exercise!("cable_pullover", "Cable Pullover", Back, Pullover, [Cable], false),
    exercise!("dumbbell_pullover", "Dumbbell Pullover", Back, Pullover, [Dumbbell, Bench], false),
    // Shoulders
    exercise!("overhead_press", "Overhead Press", Shoulders, VerticalPress, [Barbell], true),
    exercise!("seated_dumbbell_press", "Seated Dumbbell Press", Shoulders, VerticalPress, [Dumbbell, Bench], true),
    exercise!("machine_shoulder_press", "Machine Shoulder Press", Shoulders, VerticalPress, [Machine], true),
    exercise!("pike_push_up", "Pike Push-Up", Shoulders, VerticalPress, [], true),
    exercise!("dumbbell_lateral_raise", "Dumbbell Lateral Raise", Shoulders, LateralRaise, [Dumbbell], false),
    exercise!("cable_lateral_raise", "Cable Lateral Raise", Shoulders, LateralRaise, [Cable], false),
    exercise!("reverse_pec_deck", "Reverse Pec Deck", Shoulders, RearDeltFly, [Machine], false),
    exercise!("face_pull", "Face Pull", Shoulders, RearDeltFly, [Cable], false),
    exercise!("prone_rear_delt_raise", "Prone Rear Delt Raise", Shoulders, RearDeltFly, [], false),
    // Quads
    exercise!("back_squat", "Back Squat", Quads, Squat, [Barbell], true),
    exercise!("hack_squat", "Hack Squat", Quads, Squat, [Machine], true),
    exercise!("leg_press", "Leg Press", Quads, Squat, [Machine], true),
    exercise!("goblet_squat", "Goblet Squat", Quads, Squat, [Dumbbell], true),
    exercise!("bodyweight_squat", "Bodyweight Squat", Quads, Squat, [], true),
    exercise!("leg_extension", "Leg Extension", Quads, KneeExtension, [Machine], false),
    exercise!("sissy_squat", "Sissy Squat", Quads, KneeExtension, [], false),
    exercise!("bulgarian_split_squat", "Bulgarian Split Squat", Quads, Lunge, [Dumbbell, Bench], true),
    exercise!("walking_lunge", "Walking Lunge", Quads, Lunge, [Dumbbell], true),
    // Hamstrings
    exercise!("romanian_deadlift", "Romanian Deadlift", Hamstrings, HipHinge, [Barbell], true),
    exercise!("dumbbell_romanian_deadlift", "Dumbbell Romanian Deadlift", Hamstrings, HipHinge, [Dumbbell], true),
    exercise!("single_leg_hinge", "Single-Leg Hip Hinge", Hamstrings, HipHinge, [], true),
    exercise!("seated_leg_curl", "Seated Leg Curl", Hamstrings, KneeFlexion, [Machine], false),
    exercise!("lying_leg_curl", "Lying Leg Curl", Hamstrings, KneeFlexion, [Machine], false),
    exercise!("nordic_curl", "Nordic Curl", Hamstrings, KneeFlexion, [], false),
    // Glutes
    exercise!("barbell_hip_thrust", "Barbell Hip Thrust", Glutes, HipThrust, [Barbell, Bench], true),
    exercise!("cable_pull_through", "Cable Pull-Through", Glutes, HipThrust, [Cable], true),
    exercise!("glute_bridge", "Glute Bridge", Glutes, HipThrust, [], false),
    exercise!("dumbbell_reverse_lunge", "Dumbbell Reverse Lunge", Glutes, Lunge, [Dumbbell], true),
    exercise!("reverse_lunge", "Reverse Lunge", Glutes, Lunge, [], true),
    // Biceps
    exercise!("barbell_curl", "Barbell Curl", Biceps, ElbowFlexion, [Barbell], false),
    exercise!("incline_dumbbell_curl", "Incline Dumbbell Curl", Biceps, ElbowFlexion, [Dumbbell, Bench], false),
    exercise!("cable_curl", "Cable Curl", Biceps, ElbowFlexion, [Cable], false),
    exercise!("chin_up", "Chin-Up", Biceps, ElbowFlexion, [PullUpBar], true),
    exercise!("table_curl", "Bodyweight Table Curl", Biceps, ElbowFlexion, [], false),
    // Triceps
    exercise!("overhead_cable_extension", "Overhead Cable Extension", Triceps, ElbowExtension, [Cable], false),
    exercise!("cable_pushdown", "Cable Pushdown", Triceps, ElbowExtension, [Cable], false),
    exercise!("skull_crusher", "Skull Crusher", Triceps, ElbowExtension, [Barbell, Bench], false),
    exercise!("dumbbell_overhead_extension", "Dumbbell Overhead Extension", Triceps, ElbowExtension, [Dumbbell], false),
    exercise!("bench_dip", "Bench Dip", Triceps, ElbowExtension, [], true),
    // Calves
    exercise!("standing_calf_raise", "Standing Calf Raise", Calves, CalfRaise, [Machine], false),
    exercise!("seated_calf_raise", "Seated Calf Raise", Calves, CalfRaise, [Machine], false),
    exercise!("single_leg_calf_raise", "Single-Leg Calf Raise", Calves, CalfRaise, [], false),
    // Abs
    exercise!("cable_crunch", "Cable Crunch", Abs, TrunkFlexion, [Cable], false),
    exercise!("hanging_leg_raise", "Hanging Leg Raise", Abs, TrunkFlexion, [PullUpBar], false),
    exercise!("crunch", "Crunch", Abs, TrunkFlexion, [], false),
    exercise!("plank", "Plank", Abs, AntiExtension, [], false),
    // Traps
    exercise!("barbell_shrug", "Barbell Shrug", Traps, Shrug, [Barbell], false),
    exercise!("dumbbell_shrug", "Dumbbell Shrug", Traps, Shrug, [Dumbbell], false),
    exercise!("prone_y_raise", "Prone Y Raise", Traps, Shrug, [], false),
    // Forearms
    exercise!("wrist_curl", "Dumbbell Wrist Curl", Forearms, WristFlexion, [Dumbbell], false),
    exercise!("dead_hang", "Dead Hang", Forearms, Grip, [PullUpBar], false),
    exercise!("fingertip_plank", "Fingertip Plank", Forearms, Grip, [], false),
];

pub fn get_all_exercises() -> &'static [Exercise] {
    EXERCISES
}

pub fn find_exercise(id: &str) -> Option<&'static Exercise> {
    EXERCISES.iter().find(|e| e.id == id)
}

/// Exercises for a group and pattern that the given equipment allows, catalog order
pub fn candidates(
    group: MuscleGroup,
    pattern: MovementPattern,
    available: &[Equipment],
) -> Vec<&'static Exercise> {
    EXERCISES
        .iter()
        .filter(|e| e.muscle_group == group && e.pattern == pattern && e.is_available(available))
        .collect()
}
