//! Session templates - fills a week's training days with exercises
//!
//! Weekly set budgets come from the volume landmarks and are divided
//! across the sessions that train each group. Equipment gaps are filled
//! with the nearest movement pattern and disclosed on the session.

pub mod policy;

pub use policy::{DayType, Split, TrainingFrequency, Variant};

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::PlanError;
use crate::exercises::{self, Equipment, Exercise, MovementPattern, MuscleGroup};
use crate::landmarks::{LandmarkTable, compute_volume_landmark};
use crate::metrics::percent_of_one_rm;
use crate::periodization::{ExerciseConfig, Macrocycle, Microcycle, Phase, Session, SetTarget, Substitution};
use crate::profile::{ExperienceLevel, RecoveryCapacity, TrainingProfile};

const WARMUP_MINUTES: u32 = 10;
const SECONDS_PER_WORK_SET: u32 = 45;
const PLATE_INCREMENT_KG: f64 = 2.5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemplateRequest {
    pub split: Split,
    pub frequency: TrainingFrequency,
    pub variant: Variant,
    pub level: ExperienceLevel,
    pub phase: Phase,
    /// Trained first in each session and given extra volume
    pub priority_groups: Vec<MuscleGroup>,
    pub equipment: Vec<Equipment>,
}

impl TemplateRequest {
    pub fn new(frequency: TrainingFrequency) -> Self {
        Self {
            split: Split::PushPullLegs,
            frequency,
            variant: Variant::Standard,
            level: ExperienceLevel::Intermediate,
            phase: Phase::Accumulation,
            priority_groups: Vec::new(),
            equipment: exercises::FULL_GYM.to_vec(),
        }
    }

    pub fn for_profile(profile: &TrainingProfile, frequency: TrainingFrequency) -> Self {
        Self {
            level: profile.experience,
            equipment: profile.equipment.clone(),
            ..Self::new(frequency)
        }
    }

    fn priority_rank(&self, group: MuscleGroup) -> Option<usize> {
        self.priority_groups.iter().position(|g| *g == group)
    }
}

/// Build the session skeletons for one week without weight targets
pub fn create_day_split(request: &TemplateRequest, landmarks: &LandmarkTable) -> Vec<Session> {
    TemplateGenerator::new(landmarks).generate(request, None)
}

/// Session generator bound to a landmark table and optional strength map
pub struct TemplateGenerator<'a> {
    landmarks: &'a LandmarkTable,
    strength: Option<&'a BTreeMap<String, f64>>,
}

/// One muscle group's share of a session
struct Allocation {
    group: MuscleGroup,
    /// Landmark priority rank, 1 first
    rank: u8,
    sets: u32,
    /// How many earlier sessions this week trained the group
    occurrence: usize,
}

impl<'a> TemplateGenerator<'a> {
    pub fn new(landmarks: &'a LandmarkTable) -> Self {
        Self { landmarks, strength: None }
    }

    /// Use 1RM estimates (exercise id -> kg) for weight targets
    pub fn with_strength(mut self, strength: &'a BTreeMap<String, f64>) -> Self {
        self.strength = Some(strength);
        self
    }

    /// Generate one week. `volume_level` is the microcycle's level, if any.
    pub fn generate(&self, request: &TemplateRequest, volume_level: Option<u8>) -> Vec<Session> {
        let days = request.frequency.training_days();
        let day_types = request.split.day_types(request.frequency);

        let focus: Vec<(Vec<MuscleGroup>, Vec<MuscleGroup>)> = day_types
            .iter()
            .map(|d| d.focus(&request.priority_groups))
            .collect();

        let allocations = self.allocate(request, &focus, volume_level);

        let mut type_counts: HashMap<DayType, usize> = HashMap::new();
        days.iter()
            .zip(day_types)
            .zip(focus)
            .zip(allocations)
            .map(|(((day, day_type), (primary, secondary)), allocation)| {
                let seen = type_counts.entry(day_type).or_insert(0);
                let letter = (b'A' + (*seen as u8).min(25)) as char;
                *seen += 1;

                let mut session = Session {
                    day: *day,
                    day_type,
                    name: format!("{} {}", day_type.label(), letter),
                    description: format!(
                        "{} {}-day {}, {} phase",
                        request.variant.label(),
                        request.frequency.days(),
                        request.split.label(),
                        request.phase
                    ),
                    primary_focus: primary,
                    secondary_focus: secondary,
                    estimated_duration_minutes: 0,
                    exercises: Vec::new(),
                    substitutions: Vec::new(),
                };
                self.fill_session(&mut session, request, allocation);
                session.estimated_duration_minutes = estimate_duration(&session);
                session
            })
            .collect()
    }

    /// Generate sessions for a planner-owned week and hand them over
    pub fn populate_microcycle(
        &self,
        request: &TemplateRequest,
        phase: Phase,
        microcycle: &mut Microcycle,
    ) -> Result<(), PlanError> {
        let request = TemplateRequest { phase, ..request.clone() };
        let sessions = self.generate(&request, Some(microcycle.volume_level));
        microcycle.fill_sessions(sessions)
    }

    /// Populate every week of a plan, returning the number of sessions
    pub fn populate_macrocycle(&self, request: &TemplateRequest, plan: &mut Macrocycle) -> Result<usize, PlanError> {
        let mut total = 0;
        for (phase, microcycle) in plan.microcycles_mut() {
            self.populate_microcycle(request, phase, microcycle)?;
            total += microcycle.sessions.len();
        }
        info!("Populated {} sessions for plan {:?}", total, plan.name);
        Ok(total)
    }

    /// Split each group's weekly target across the days that train it
    fn allocate(
        &self,
        request: &TemplateRequest,
        focus: &[(Vec<MuscleGroup>, Vec<MuscleGroup>)],
        volume_level: Option<u8>,
    ) -> Vec<Vec<Allocation>> {
        let mut occurrences: BTreeMap<MuscleGroup, Vec<usize>> = BTreeMap::new();
        for (day, (primary, secondary)) in focus.iter().enumerate() {
            for group in primary.iter().chain(secondary) {
                let days = occurrences.entry(*group).or_default();
                if !days.contains(&day) {
                    days.push(day);
                }
            }
        }

        let mut per_day: Vec<Vec<Allocation>> = focus.iter().map(|_| Vec::new()).collect();
        for (group, days) in occurrences {
            // Untabled groups get the untrained default row
            let landmark = match self.landmarks.get(group) {
                Some(landmark) => *landmark,
                None => {
                    debug!("No landmark for {}, using default volume", group);
                    compute_volume_landmark(group, 0.0, RecoveryCapacity::default())
                }
            };
            let prioritized = request.priority_rank(group).is_some();
            let weekly = policy::weekly_set_target(&landmark, request.phase, request.variant, volume_level, prioritized);

            let n = days.len() as u32;
            let (share, extra) = (weekly / n, weekly % n);
            for (k, day) in days.into_iter().enumerate() {
                let sets = share + u32::from((k as u32) < extra);
                if sets > 0 {
                    per_day[day].push(Allocation { group, rank: landmark.priority, sets, occurrence: k });
                }
            }
        }

        // Requested priorities first, then landmark rank, then primary focus, then secondary
        for (allocations, (primary, secondary)) in per_day.iter_mut().zip(focus) {
            allocations.sort_by_key(|a| {
                let priority = request.priority_rank(a.group).unwrap_or(usize::MAX);
                let position = primary
                    .iter()
                    .chain(secondary)
                    .position(|g| *g == a.group)
                    .unwrap_or(usize::MAX);
                (priority, a.rank, position)
            });
        }
        per_day
    }

    fn fill_session(&self, session: &mut Session, request: &TemplateRequest, allocations: Vec<Allocation>) {
        let reps = policy::target_reps(request.phase, request.variant);
        let rir = policy::reps_in_reserve(request.level, request.phase);
        let mut used: Vec<&'static str> = Vec::new();

        for allocation in allocations {
            let picks = self.pick_exercises(&allocation, request, &mut used, &mut session.substitutions);
            let last = picks.len().saturating_sub(1);

            for (i, (exercise, sets)) in picks.into_iter().enumerate() {
                let weight_kg = self.weight_target(exercise.id, reps, rir);
                let set = SetTarget {
                    reps,
                    weight_kg,
                    effort: policy::effort(request.variant, rir),
                };
                session.exercises.push(ExerciseConfig {
                    exercise_id: exercise.id.to_string(),
                    exercise_name: exercise.name.to_string(),
                    muscle_group: allocation.group,
                    sets: vec![set; sets as usize],
                    rest_seconds: policy::rest_seconds(reps, request.variant),
                    tempo: policy::tempo(request.phase).to_string(),
                    technique: if i == last { policy::finisher(request.variant, request.phase, exercise) } else { None },
                });
            }
        }
    }

    /// Choose exercises for a group's sets, at most `sets_per_exercise` each
    fn pick_exercises(
        &self,
        allocation: &Allocation,
        request: &TemplateRequest,
        used: &mut Vec<&'static str>,
        substitutions: &mut Vec<Substitution>,
    ) -> Vec<(&'static Exercise, u32)> {
        let group = allocation.group;
        let slots = allocation.sets.div_ceil(request.variant.sets_per_exercise()).max(1) as usize;
        let patterns = group.patterns();

        let mut picked: Vec<&'static Exercise> = Vec::new();
        let mut merged_slots = 0usize;
        for slot in 0..slots {
            let pattern = patterns[(slot + allocation.occurrence) % patterns.len()];
            match self.select(group, pattern, allocation.occurrence, request, used, substitutions) {
                Some(exercise) => {
                    used.push(exercise.id);
                    picked.push(exercise);
                }
                None => merged_slots += 1,
            }
        }

        if picked.is_empty() {
            warn!("No exercise available for {} in any pattern, {} sets dropped", group, allocation.sets);
            return Vec::new();
        }
        if merged_slots > 0 {
            debug!("{}: {} slots merged into earlier exercises", group, merged_slots);
        }

        let count = picked.len() as u32;
        let (share, extra) = (allocation.sets / count, allocation.sets % count);
        picked
            .into_iter()
            .enumerate()
            .map(|(i, exercise)| (exercise, share + u32::from((i as u32) < extra)))
            .filter(|(_, sets)| *sets > 0)
            .collect()
    }

    /// Candidate for a pattern, falling back to the nearest pattern and
    /// finally any unused exercise for the group
    fn select(
        &self,
        group: MuscleGroup,
        pattern: MovementPattern,
        occurrence: usize,
        request: &TemplateRequest,
        used: &[&'static str],
        substitutions: &mut Vec<Substitution>,
    ) -> Option<&'static Exercise> {
        let pool = |p: MovementPattern| -> Vec<&'static Exercise> {
            let mut pool: Vec<_> = exercises::candidates(group, p, &request.equipment)
                .into_iter()
                .filter(|e| !used.contains(&e.id))
                .collect();
            pool.sort_by_key(|e| Reverse(request.variant.preference(e)));
            pool
        };

        let direct = pool(pattern);
        if !direct.is_empty() {
            return Some(direct[occurrence % direct.len()]);
        }

        // Only disclose when equipment, not repetition, emptied the pool
        let equipment_gap = exercises::candidates(group, pattern, &request.equipment).is_empty();

        let fallback = pattern
            .nearest()
            .iter()
            .map(|p| pool(*p))
            .find(|candidates| !candidates.is_empty())
            .map(|candidates| candidates[0])
            .or_else(|| {
                group
                    .patterns()
                    .iter()
                    .chain(&[pattern])
                    .flat_map(|p| pool(*p))
                    .next()
            })
            .or_else(|| {
                exercises::get_all_exercises()
                    .iter()
                    .find(|e| e.muscle_group == group && e.is_available(&request.equipment) && !used.contains(&e.id))
            })?;

        if equipment_gap {
            info!("Substituting {} for {:?} ({}): equipment unavailable", fallback.id, pattern, group);
            substitutions.push(Substitution {
                muscle_group: group,
                requested_pattern: pattern,
                exercise_id: fallback.id.to_string(),
                note: format!("Alternative exercise used for {} ({:?}): {}", group, pattern, fallback.name),
            });
        }
        Some(fallback)
    }

    fn weight_target(&self, exercise_id: &str, reps: u32, rir: u8) -> Option<f64> {
        let one_rm = *self.strength?.get(exercise_id)?;
        let raw = one_rm * percent_of_one_rm(reps + rir as u32);
        let rounded = (raw / PLATE_INCREMENT_KG).floor() * PLATE_INCREMENT_KG;
        (rounded > 0.0).then_some(rounded)
    }
}

fn estimate_duration(session: &Session) -> u32 {
    let seconds: u32 = session
        .exercises
        .iter()
        .map(|e| e.sets.len() as u32 * (SECONDS_PER_WORK_SET + e.rest_seconds))
        .sum();
    WARMUP_MINUTES + seconds.div_ceil(60)
}
