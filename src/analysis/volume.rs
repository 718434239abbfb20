//! Muscle group set tally over a training window

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::db::Training;
use crate::exercises::{MuscleGroup, find_exercise};
use crate::landmarks::LandmarkTable;

/// Load statistics for a single muscle group
#[derive(Debug, Clone, PartialEq)]
pub struct MuscleVolume {
    pub group: MuscleGroup,
    pub total_sets: u32,
    pub weekly_sets: f64,
    pub last_trained: Option<DateTime<Utc>>,
}

/// Tracks working sets per muscle group from logged trainings
pub struct VolumeTracker {
    volumes: BTreeMap<MuscleGroup, MuscleVolume>,
}

impl VolumeTracker {
    /// `weeks` is the length of the window the trainings were taken from
    pub fn from_trainings(trainings: &[Training], weeks: f64) -> Self {
        let mut volumes: BTreeMap<MuscleGroup, MuscleVolume> = MuscleGroup::all()
            .iter()
            .map(|group| {
                (*group, MuscleVolume { group: *group, total_sets: 0, weekly_sets: 0.0, last_trained: None })
            })
            .collect();

        for training in trainings {
            let Some(exercise) = find_exercise(&training.exercise) else {
                debug!("Skipping unknown exercise {:?}", training.exercise);
                continue;
            };

            let volume = volumes.entry(exercise.muscle_group).or_insert(MuscleVolume {
                group: exercise.muscle_group,
                total_sets: 0,
                weekly_sets: 0.0,
                last_trained: None,
            });
            volume.total_sets += training.sets;
            if volume.last_trained.is_none_or(|last| last < training.date) {
                volume.last_trained = Some(training.date);
            }
        }

        let weeks = weeks.max(1.0 / 7.0);
        for volume in volumes.values_mut() {
            volume.weekly_sets = volume.total_sets as f64 / weeks;
        }

        Self { volumes }
    }

    pub fn get(&self, group: MuscleGroup) -> Option<&MuscleVolume> {
        self.volumes.get(&group)
    }

    pub fn total_weekly_sets(&self) -> f64 {
        self.volumes.values().map(|v| v.weekly_sets).sum()
    }

    /// Groups above their maximum landmark, worst overshoot first
    pub fn over_maximum(&self, table: &LandmarkTable) -> Vec<(MuscleGroup, f64, u32)> {
        let mut over: Vec<_> = self
            .volumes
            .values()
            .filter_map(|v| {
                let max = table.get(v.group)?.weekly_sets.maximum;
                (v.weekly_sets > max as f64).then_some((v.group, v.weekly_sets, max))
            })
            .collect();
        over.sort_by(|a, b| (b.1 - b.2 as f64).total_cmp(&(a.1 - a.2 as f64)));
        over
    }

    /// Groups below their minimum landmark, in table order
    pub fn under_minimum(&self, table: &LandmarkTable) -> Vec<(MuscleGroup, f64, u32)> {
        self.volumes
            .values()
            .filter_map(|v| {
                let min = table.get(v.group)?.weekly_sets.minimum;
                (v.weekly_sets < min as f64).then_some((v.group, v.weekly_sets, min))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::profile::{ExperienceLevel, TrainingProfile};

    fn create_training(day: u32, exercise: &str, sets: u32) -> Training {
        Training {
            id: None,
            user_id: "u1".to_string(),
            date: Utc.with_ymd_and_hms(2026, 3, day, 18, 0, 0).unwrap(),
            exercise: exercise.to_string(),
            sets,
            reps: 10,
            weight_kg: 60.0,
            rpe: None,
            notes: None,
        }
    }

    #[test]
    fn test_sets_tallied_per_group() {
        let trainings = vec![
            create_training(2, "barbell_bench_press", 4),
            create_training(5, "cable_fly", 3),
            create_training(6, "back_squat", 5),
            create_training(6, "not_in_catalog", 9),
        ];
        let tracker = VolumeTracker::from_trainings(&trainings, 1.0);

        let chest = tracker.get(MuscleGroup::Chest).unwrap();
        assert_eq!(chest.total_sets, 7);
        assert_eq!(chest.last_trained, Some(Utc.with_ymd_and_hms(2026, 3, 5, 18, 0, 0).unwrap()));
        assert_eq!(tracker.get(MuscleGroup::Quads).unwrap().total_sets, 5);
        assert_eq!(tracker.get(MuscleGroup::Back).unwrap().total_sets, 0);
        assert_eq!(tracker.total_weekly_sets(), 12.0);
    }

    #[test]
    fn test_weekly_rate_over_window() {
        let trainings = vec![create_training(2, "back_squat", 10), create_training(9, "back_squat", 10)];
        let tracker = VolumeTracker::from_trainings(&trainings, 4.0);
        assert_eq!(tracker.get(MuscleGroup::Quads).unwrap().weekly_sets, 5.0);
    }

    #[test]
    fn test_landmark_comparisons() {
        let profile = TrainingProfile::new("u1", ExperienceLevel::Intermediate, 2.0);
        let table = LandmarkTable::for_profile(&profile, &[]);
        let trainings = vec![create_training(2, "back_squat", 40)];
        let tracker = VolumeTracker::from_trainings(&trainings, 1.0);

        let over = tracker.over_maximum(&table);
        assert_eq!(over.len(), 1);
        assert_eq!(over[0].0, MuscleGroup::Quads);
        assert!(tracker.under_minimum(&table).iter().any(|(g, _, _)| *g == MuscleGroup::Chest));
        assert!(!tracker.under_minimum(&table).iter().any(|(g, _, _)| *g == MuscleGroup::Quads));
    }
}
