//! Volume landmarks - weekly set and frequency budgets per muscle group
//!
//! Base values (MEV / MAV / MRV, frequency, recovery hours) come from a
//! fixed table. Training age widens all set counts; recovery capacity
//! scales MAV and MRV only, since minimum effective volume is
//! physiological rather than recovery dependent.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::exercises::MuscleGroup;
use crate::profile::{RecoveryCapacity, TrainingProfile};

/// Priority assigned when a group is not explicitly prioritised
pub const DEFAULT_PRIORITY: u8 = 5;

const MAX_TRAINING_AGE_MULTIPLIER: f64 = 1.5;

/// Seed values for one muscle group
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseVolume {
    pub mev: f64,
    pub mav: f64,
    pub mrv: f64,
    pub frequency: u32,
    pub recovery_hours: f64,
}

const DEFAULT_BASE: BaseVolume = BaseVolume { mev: 6.0, mav: 10.0, mrv: 16.0, frequency: 2, recovery_hours: 48.0 };

pub fn base_volume(group: MuscleGroup) -> BaseVolume {
    match group {
        MuscleGroup::Chest => BaseVolume { mev: 8.0, mav: 12.0, mrv: 20.0, frequency: 2, recovery_hours: 48.0 },
        MuscleGroup::Back => BaseVolume { mev: 10.0, mav: 14.0, mrv: 22.0, frequency: 2, recovery_hours: 48.0 },
        MuscleGroup::Shoulders => BaseVolume { mev: 8.0, mav: 16.0, mrv: 26.0, frequency: 3, recovery_hours: 36.0 },
        MuscleGroup::Quads => BaseVolume { mev: 8.0, mav: 12.0, mrv: 18.0, frequency: 2, recovery_hours: 72.0 },
        MuscleGroup::Hamstrings => BaseVolume { mev: 6.0, mav: 10.0, mrv: 16.0, frequency: 2, recovery_hours: 72.0 },
        MuscleGroup::Glutes => BaseVolume { mev: 4.0, mav: 8.0, mrv: 16.0, frequency: 2, recovery_hours: 48.0 },
        MuscleGroup::Biceps => BaseVolume { mev: 8.0, mav: 14.0, mrv: 20.0, frequency: 3, recovery_hours: 36.0 },
        MuscleGroup::Triceps => BaseVolume { mev: 6.0, mav: 10.0, mrv: 18.0, frequency: 3, recovery_hours: 36.0 },
        MuscleGroup::Calves => BaseVolume { mev: 8.0, mav: 12.0, mrv: 16.0, frequency: 3, recovery_hours: 24.0 },
        MuscleGroup::Abs => BaseVolume { mev: 6.0, mav: 16.0, mrv: 25.0, frequency: 3, recovery_hours: 24.0 },
        _ => DEFAULT_BASE,
    }
}

/// `{minimum, optimal, maximum}` triple
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Range {
    pub minimum: u32,
    pub optimal: u32,
    pub maximum: u32,
}

impl Range {
    pub fn is_ordered(&self) -> bool {
        self.minimum <= self.optimal && self.optimal <= self.maximum
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct VolumeLandmark {
    pub muscle_group: MuscleGroup,
    pub weekly_sets: Range,
    pub weekly_frequency: Range,
    pub recovery_hours: f64,
    /// 1 = highest
    pub priority: u8,
}

impl VolumeLandmark {
    pub fn validate(&self) -> Result<(), PlanError> {
        if !self.weekly_sets.is_ordered() {
            return Err(PlanError::LandmarkRange { group: self.muscle_group, field: "weekly sets" });
        }
        if !self.weekly_frequency.is_ordered() {
            return Err(PlanError::LandmarkRange { group: self.muscle_group, field: "weekly frequency" });
        }
        Ok(())
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }
}

pub fn training_age_multiplier(training_age_years: f64) -> f64 {
    (1.0 + training_age_years.max(0.0) * 0.05).min(MAX_TRAINING_AGE_MULTIPLIER)
}

pub fn recovery_multiplier(recovery: RecoveryCapacity) -> f64 {
    0.7 + recovery.as_f64() * 0.06
}

/// Compute the landmark for one muscle group
pub fn compute_volume_landmark(
    group: MuscleGroup,
    training_age_years: f64,
    recovery: RecoveryCapacity,
) -> VolumeLandmark {
    let base = base_volume(group);
    let age = training_age_multiplier(training_age_years);
    let rec = recovery_multiplier(recovery);

    let weekly_sets = Range {
        minimum: (base.mev * age).round() as u32,
        optimal: (base.mav * age * rec).round() as u32,
        maximum: (base.mrv * age * rec).round() as u32,
    };

    let weekly_frequency = Range {
        minimum: ((base.frequency as f64 * 0.8).floor() as u32).max(1),
        optimal: base.frequency,
        maximum: (base.frequency as f64 * rec).ceil() as u32,
    };

    let landmark = VolumeLandmark {
        muscle_group: group,
        weekly_sets,
        weekly_frequency,
        recovery_hours: (base.recovery_hours / rec).round(),
        priority: DEFAULT_PRIORITY,
    };
    debug_assert!(landmark.validate().is_ok(), "{:?}", landmark);
    landmark
}

/// Landmarks for every tabled muscle group, with priorities applied
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LandmarkTable {
    pub landmarks: BTreeMap<MuscleGroup, VolumeLandmark>,
}

impl LandmarkTable {
    /// Priority groups are ranked 1..=k in the given order, everyone else k+1
    pub fn new(training_age_years: f64, recovery: RecoveryCapacity, priorities: &[MuscleGroup]) -> Self {
        Self::build(priorities, |group| compute_volume_landmark(group, training_age_years, recovery))
    }

    pub fn for_profile(profile: &TrainingProfile, priorities: &[MuscleGroup]) -> Self {
        Self::new(profile.training_age_years, profile.recovery_capacity(), priorities)
    }

    /// Same as `for_profile`, served through a cache
    pub fn from_cache(cache: &LandmarkCache, profile: &TrainingProfile, priorities: &[MuscleGroup]) -> Self {
        let recovery = profile.recovery_capacity();
        Self::build(priorities, |group| cache.get(group, profile.training_age_years, recovery))
    }

    fn build(priorities: &[MuscleGroup], compute: impl Fn(MuscleGroup) -> VolumeLandmark) -> Self {
        let mut groups: Vec<MuscleGroup> = MuscleGroup::all().to_vec();
        for group in priorities {
            if !groups.contains(group) {
                groups.push(*group);
            }
        }

        let unranked = (priorities.len() as u8).saturating_add(1);
        let landmarks = groups
            .into_iter()
            .map(|group| {
                let rank = priorities
                    .iter()
                    .position(|p| *p == group)
                    .map(|i| i as u8 + 1)
                    .unwrap_or(unranked);
                (group, compute(group).with_priority(rank))
            })
            .collect();

        Self { landmarks }
    }

    pub fn get(&self, group: MuscleGroup) -> Option<&VolumeLandmark> {
        self.landmarks.get(&group)
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        self.landmarks.values().try_for_each(VolumeLandmark::validate)
    }
}

type CacheKey = (MuscleGroup, u32, u8);

/// Read-through landmark memo.
///
/// Entries are pure functions of their key, so concurrent writers may
/// recompute and overwrite freely.
#[derive(Debug, Default)]
pub struct LandmarkCache {
    entries: RwLock<HashMap<CacheKey, VolumeLandmark>>,
}

impl LandmarkCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, group: MuscleGroup, training_age_years: f64, recovery: RecoveryCapacity) -> VolumeLandmark {
        // Tenths of a year is finer than any meaningful change in the multiplier
        let tenths = (training_age_years.max(0.0) * 10.0).round() as u32;
        let key = (group, tenths, recovery.value());

        if let Ok(entries) = self.entries.read() {
            if let Some(hit) = entries.get(&key) {
                return *hit;
            }
        }

        let landmark = compute_volume_landmark(group, tenths as f64 / 10.0, recovery);
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key, landmark);
        }
        landmark
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ExperienceLevel;

    fn capacity(value: u8) -> RecoveryCapacity {
        RecoveryCapacity::new(value).unwrap()
    }

    #[test]
    fn test_chest_scenario() {
        let landmark = compute_volume_landmark(MuscleGroup::Chest, 2.0, capacity(5));
        assert_eq!(landmark.weekly_sets, Range { minimum: 9, optimal: 13, maximum: 22 });
        assert_eq!(landmark.weekly_frequency, Range { minimum: 1, optimal: 2, maximum: 2 });
        assert_eq!(landmark.recovery_hours, 48.0);
    }

    #[test]
    fn test_ranges_ordered_everywhere() {
        let groups = MuscleGroup::all().iter().chain(&[MuscleGroup::Traps, MuscleGroup::Forearms]);
        for group in groups {
            for age_tenths in (0..=500).step_by(5) {
                for cap in 1..=10 {
                    let landmark = compute_volume_landmark(*group, age_tenths as f64 / 10.0, capacity(cap));
                    assert!(landmark.validate().is_ok(), "{:?}", landmark);
                }
            }
        }
    }

    #[test]
    fn test_training_age_multiplier_caps() {
        assert_eq!(training_age_multiplier(0.0), 1.0);
        assert_eq!(training_age_multiplier(10.0), 1.5);
        assert_eq!(training_age_multiplier(40.0), 1.5);
    }

    #[test]
    fn test_mev_ignores_recovery() {
        let poor = compute_volume_landmark(MuscleGroup::Back, 3.0, capacity(1));
        let great = compute_volume_landmark(MuscleGroup::Back, 3.0, capacity(10));
        assert_eq!(poor.weekly_sets.minimum, great.weekly_sets.minimum);
        assert!(great.weekly_sets.maximum > poor.weekly_sets.maximum);
        assert!(great.recovery_hours < poor.recovery_hours);
    }

    #[test]
    fn test_unknown_group_uses_default_row() {
        let traps = compute_volume_landmark(MuscleGroup::Traps, 0.0, capacity(5));
        assert_eq!(traps.weekly_sets, Range { minimum: 6, optimal: 10, maximum: 16 });
    }

    #[test]
    fn test_table_priorities() {
        let profile = TrainingProfile::new("u1", ExperienceLevel::Intermediate, 3.0);
        let table = LandmarkTable::for_profile(&profile, &[MuscleGroup::Shoulders, MuscleGroup::Calves]);
        assert_eq!(table.get(MuscleGroup::Shoulders).unwrap().priority, 1);
        assert_eq!(table.get(MuscleGroup::Calves).unwrap().priority, 2);
        assert_eq!(table.get(MuscleGroup::Chest).unwrap().priority, 3);
        assert_eq!(table.landmarks.len(), 10);
        assert!(table.validate().is_ok());
    }

    #[test]
    fn test_table_from_raw_inputs() {
        let table = LandmarkTable::new(2.0, capacity(5), &[MuscleGroup::Calves]);
        assert_eq!(table.landmarks.len(), 10);
        assert_eq!(table.get(MuscleGroup::Chest), Some(&compute_volume_landmark(MuscleGroup::Chest, 2.0, capacity(5)).with_priority(2)));
        assert_eq!(table.get(MuscleGroup::Calves).unwrap().priority, 1);

        let poor = LandmarkTable::new(2.0, capacity(1), &[]);
        assert!(poor.get(MuscleGroup::Chest).unwrap().weekly_sets.maximum < 22);
        assert!(poor.landmarks.values().all(|l| l.priority == 1));
    }

    #[test]
    fn test_table_includes_untabled_priority() {
        let profile = TrainingProfile::new("u1", ExperienceLevel::Intermediate, 3.0);
        let table = LandmarkTable::for_profile(&profile, &[MuscleGroup::Forearms]);
        assert_eq!(table.landmarks.len(), 11);
        assert_eq!(table.get(MuscleGroup::Forearms).unwrap().priority, 1);
    }

    #[test]
    fn test_cache_read_through() {
        let cache = LandmarkCache::new();
        let first = cache.get(MuscleGroup::Quads, 4.0, capacity(6));
        let second = cache.get(MuscleGroup::Quads, 4.0, capacity(6));
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
        assert_eq!(first, compute_volume_landmark(MuscleGroup::Quads, 4.0, capacity(6)));
    }

    #[test]
    fn test_cache_shared_between_threads() {
        let cache = std::sync::Arc::new(LandmarkCache::new());
        let handles: Vec<_> = (1..=4u8)
            .map(|cap| {
                let cache = cache.clone();
                std::thread::spawn(move || cache.get(MuscleGroup::Chest, 2.0, RecoveryCapacity::new(cap).unwrap()))
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap().validate().is_ok());
        }
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn test_table_from_cache_matches_direct() {
        let cache = LandmarkCache::new();
        let profile = TrainingProfile::new("u1", ExperienceLevel::Advanced, 5.0);
        let direct = LandmarkTable::for_profile(&profile, &[MuscleGroup::Back]);
        let cached = LandmarkTable::from_cache(&cache, &profile, &[MuscleGroup::Back]);
        assert_eq!(direct, cached);
    }
}
