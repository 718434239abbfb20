//! Macrocycle planner - lays phase blocks over calendar weeks
//!
//! A wave is accumulation -> intensification -> realization -> deload,
//! repeated every `cadence` weeks. A trailing partial wave winds down
//! with a one-week transition block.

use chrono::{Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::model::{Macrocycle, Mesocycle, Microcycle, Phase};
use super::validate::{PlanWarning, validate_macrocycle};
use crate::error::PlanError;
use crate::profile::{Goal, TrainingProfile};
use crate::templates::TrainingFrequency;

pub const MIN_DURATION_WEEKS: u32 = 4;
pub const MAX_DURATION_WEEKS: u32 = 52;

/// Fatigue target for deload weeks
const DELOAD_FATIGUE_TARGET: u8 = 2;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanRequest {
    pub user_id: String,
    pub name: String,
    pub goal: Goal,
    pub start_date: NaiveDate,
    pub duration_weeks: u32,
    /// Weeks between deloads
    pub deload_cadence_weeks: u32,
    /// Put the deload week inside the last loading block instead of its own block
    pub embed_deload: bool,
    pub frequency: TrainingFrequency,
}

impl PlanRequest {
    /// Cadence follows the profile's experience level
    pub fn for_profile(
        profile: &TrainingProfile,
        start_date: NaiveDate,
        duration_weeks: u32,
        frequency: TrainingFrequency,
    ) -> Self {
        Self {
            user_id: profile.user_id.clone(),
            name: format!("{} {}-week plan", profile.experience, duration_weeks),
            goal: profile.primary_goal,
            start_date,
            duration_weeks,
            deload_cadence_weeks: profile.experience.deload_cadence_weeks(),
            embed_deload: false,
            frequency,
        }
    }
}

/// Block layout before dates are assigned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Block {
    phase: Phase,
    /// Loading weeks, excluding an embedded deload week
    weeks: u32,
    deload_week: bool,
    wave: u32,
}

impl Block {
    fn total_weeks(&self) -> u32 {
        // A deload block's only week is its deload week
        self.weeks + u32::from(self.deload_week && self.phase != Phase::Deload)
    }
}

/// Split loading weeks into accumulation / intensification / realization
fn split_loading(weeks: u32) -> [(Phase, u32); 3] {
    let accumulation = weeks.div_ceil(2);
    let rest = weeks - accumulation;
    let intensification = rest.div_ceil(2);
    [
        (Phase::Accumulation, accumulation),
        (Phase::Intensification, intensification),
        (Phase::Realization, rest - intensification),
    ]
}

fn layout(total_weeks: u32, cadence: u32, embed_deload: bool) -> Vec<Block> {
    let cadence = cadence.max(2);
    let mut blocks = Vec::new();
    let mut remaining = total_weeks;
    let mut wave = 0;

    while remaining > 0 {
        let full = remaining >= cadence;
        let wave_weeks = if full { cadence } else { remaining };

        for (phase, weeks) in split_loading(wave_weeks - 1) {
            if weeks > 0 {
                blocks.push(Block { phase, weeks, deload_week: false, wave });
            }
        }

        let closing = if full { Phase::Deload } else { Phase::Transition };
        let embed = closing == Phase::Deload && embed_deload;
        match blocks.last_mut().filter(|last| embed && last.wave == wave) {
            Some(last) => last.deload_week = true,
            None => blocks.push(Block { phase: closing, weeks: 1, deload_week: closing == Phase::Deload, wave }),
        }

        remaining -= wave_weeks;
        wave += 1;
    }
    blocks
}

fn clamp_level(value: i32) -> u8 {
    value.clamp(1, 10) as u8
}

/// Week-by-week levels inside a block; `week` is 0-based
fn week_levels(phase: Phase, week: u32) -> (u8, u8) {
    let (volume, intensity) = phase.baseline();
    let (volume, intensity, w) = (volume as i32, intensity as i32, week as i32);
    match phase {
        Phase::Accumulation => (clamp_level(volume + w), clamp_level(intensity)),
        Phase::Intensification => (clamp_level(volume), clamp_level(intensity + w)),
        Phase::Realization => (clamp_level(volume - w), clamp_level(intensity + w)),
        _ => (clamp_level(volume), clamp_level(intensity)),
    }
}

fn microcycle(week: u32, start_date: NaiveDate, levels: (u8, u8), is_deload: bool, days: &[Weekday]) -> Microcycle {
    let (volume_level, intensity_level) = levels;
    let fatigue_target = if is_deload {
        DELOAD_FATIGUE_TARGET
    } else {
        clamp_level(((volume_level as f32 + intensity_level as f32) / 2.0).round() as i32)
    };
    Microcycle {
        week,
        start_date,
        volume_level,
        intensity_level,
        fatigue_target,
        is_deload,
        training_days: days.to_vec(),
        sessions: Vec::new(),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Build and validate a macrocycle. Sessions are left empty for the
/// template generator.
pub fn build_macrocycle(request: &PlanRequest) -> Result<(Macrocycle, Vec<PlanWarning>), PlanError> {
    if !(MIN_DURATION_WEEKS..=MAX_DURATION_WEEKS).contains(&request.duration_weeks) {
        return Err(PlanError::InvalidDuration(request.duration_weeks));
    }

    let days = request.frequency.training_days();
    let blocks = layout(request.duration_weeks, request.deload_cadence_weeks, request.embed_deload);
    debug!("Plan layout for {}: {:?}", request.user_id, blocks);

    let mut start = request.start_date;
    let mut mesocycles = Vec::with_capacity(blocks.len());
    for (index, block) in blocks.iter().enumerate() {
        let duration_weeks = block.total_weeks();
        let mut microcycles: Vec<Microcycle> = (0..block.weeks)
            .map(|w| {
                let week_start = start + Duration::weeks(w as i64);
                microcycle(w + 1, week_start, week_levels(block.phase, w), block.phase == Phase::Deload, &days)
            })
            .collect();
        if block.deload_week && block.phase != Phase::Deload {
            let week_start = start + Duration::weeks(block.weeks as i64);
            microcycles.push(microcycle(block.weeks + 1, week_start, Phase::Deload.baseline(), true, &days));
        }

        let (volume_level, intensity_level) = block.phase.baseline();
        mesocycles.push(Mesocycle {
            index,
            name: format!("Wave {} {}", block.wave + 1, capitalize(block.phase.name())),
            phase: block.phase,
            start_date: start,
            duration_weeks,
            volume_level,
            intensity_level,
            includes_deload: block.deload_week,
            microcycles,
        });
        start += Duration::weeks(duration_weeks as i64);
    }

    let plan = Macrocycle {
        user_id: request.user_id.clone(),
        name: request.name.clone(),
        goal: request.goal,
        start_date: request.start_date,
        duration_weeks: request.duration_weeks,
        mesocycles,
    };

    let warnings = validate_macrocycle(&plan)?;
    info!(
        "Built plan {:?} for {}: {} weeks, {} mesocycles, {} warnings",
        plan.name,
        plan.user_id,
        plan.duration_weeks,
        plan.mesocycles.len(),
        warnings.len()
    );
    Ok((plan, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::LandmarkTable;
    use crate::profile::ExperienceLevel;
    use crate::templates::{TemplateGenerator, TemplateRequest};

    fn request(weeks: u32, cadence: u32) -> PlanRequest {
        PlanRequest {
            user_id: "u1".to_string(),
            name: "test plan".to_string(),
            goal: Goal::Hypertrophy,
            start_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            duration_weeks: weeks,
            deload_cadence_weeks: cadence,
            embed_deload: false,
            frequency: TrainingFrequency::new(6).unwrap(),
        }
    }

    fn phases(plan: &Macrocycle) -> Vec<(Phase, u32)> {
        plan.mesocycles.iter().map(|m| (m.phase, m.duration_weeks)).collect()
    }

    #[test]
    fn test_split_loading() {
        assert_eq!(split_loading(3), [(Phase::Accumulation, 2), (Phase::Intensification, 1), (Phase::Realization, 0)]);
        assert_eq!(split_loading(5), [(Phase::Accumulation, 3), (Phase::Intensification, 1), (Phase::Realization, 1)]);
        assert_eq!(split_loading(7), [(Phase::Accumulation, 4), (Phase::Intensification, 2), (Phase::Realization, 1)]);
    }

    #[test]
    fn test_intermediate_twelve_weeks() {
        let (plan, warnings) = build_macrocycle(&request(12, 6)).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(
            phases(&plan),
            vec![
                (Phase::Accumulation, 3),
                (Phase::Intensification, 1),
                (Phase::Realization, 1),
                (Phase::Deload, 1),
                (Phase::Accumulation, 3),
                (Phase::Intensification, 1),
                (Phase::Realization, 1),
                (Phase::Deload, 1),
            ]
        );
    }

    #[test]
    fn test_partial_wave_ends_in_transition() {
        let (plan, _) = build_macrocycle(&request(10, 4)).unwrap();
        assert_eq!(
            phases(&plan),
            vec![
                (Phase::Accumulation, 2),
                (Phase::Intensification, 1),
                (Phase::Deload, 1),
                (Phase::Accumulation, 2),
                (Phase::Intensification, 1),
                (Phase::Deload, 1),
                (Phase::Accumulation, 1),
                (Phase::Transition, 1),
            ]
        );
    }

    #[test]
    fn test_durations_sum_without_gaps() {
        for weeks in MIN_DURATION_WEEKS..=MAX_DURATION_WEEKS {
            for cadence in [4, 6, 8] {
                for embed_deload in [false, true] {
                    let mut req = request(weeks, cadence);
                    req.embed_deload = embed_deload;
                    let (plan, _) = build_macrocycle(&req).unwrap();
                    let total: u32 = plan.mesocycles.iter().map(|m| m.duration_weeks).sum();
                    assert_eq!(total, weeks);
                    assert_eq!(plan.mesocycles.last().unwrap().end_date(), plan.end_date());
                    for pair in plan.mesocycles.windows(2) {
                        assert_eq!(pair[0].end_date(), pair[1].start_date);
                    }
                    for meso in &plan.mesocycles {
                        assert_eq!(meso.deload_count(), usize::from(meso.includes_deload));
                    }
                }
            }
        }
    }

    #[test]
    fn test_embedded_deload() {
        let mut req = request(12, 6);
        req.embed_deload = true;
        let (plan, _) = build_macrocycle(&req).unwrap();
        assert!(plan.mesocycles.iter().all(|m| m.phase != Phase::Deload));
        let realization = &plan.mesocycles[2];
        assert_eq!(realization.phase, Phase::Realization);
        assert_eq!(realization.duration_weeks, 2);
        assert!(realization.includes_deload);
        assert!(realization.microcycles[1].is_deload);
        assert_eq!(realization.phase_for(&realization.microcycles[1]), Phase::Deload);
        assert_eq!(plan.mesocycles[3].phase, Phase::Accumulation);
    }

    #[test]
    fn test_standalone_deload_is_one_week() {
        let (plan, _) = build_macrocycle(&request(12, 6)).unwrap();
        let deload = &plan.mesocycles[3];
        assert_eq!(deload.phase, Phase::Deload);
        assert_eq!(deload.duration_weeks, 1);
        assert_eq!(deload.microcycles.len(), 1);
        assert!(deload.includes_deload);
        assert!(deload.microcycles[0].is_deload);
        assert_eq!(plan.mesocycles[4].start_date, deload.start_date + Duration::weeks(1));

        let profile = TrainingProfile::new("u2", ExperienceLevel::Intermediate, 2.0);
        let req = PlanRequest::for_profile(&profile, request(12, 6).start_date, 12, TrainingFrequency::new(6).unwrap());
        assert!(!req.embed_deload);
        assert!(build_macrocycle(&req).is_ok());
    }

    #[test]
    fn test_rejects_bad_duration() {
        assert_eq!(build_macrocycle(&request(2, 4)).unwrap_err(), PlanError::InvalidDuration(2));
        assert_eq!(build_macrocycle(&request(60, 4)).unwrap_err(), PlanError::InvalidDuration(60));
    }

    #[test]
    fn test_microcycle_levels_ramp() {
        let (plan, _) = build_macrocycle(&request(8, 8)).unwrap();
        let accumulation = &plan.mesocycles[0];
        let volumes: Vec<_> = accumulation.microcycles.iter().map(|m| m.volume_level).collect();
        assert_eq!(volumes, vec![7, 8, 9, 10]);
        let deload = plan.mesocycles.last().unwrap();
        assert_eq!(deload.microcycles[0].fatigue_target, DELOAD_FATIGUE_TARGET);
    }

    #[test]
    fn test_for_profile_uses_cadence() {
        let profile = TrainingProfile::new("u9", ExperienceLevel::Novice, 0.5);
        let req = PlanRequest::for_profile(&profile, request(16, 4).start_date, 16, TrainingFrequency::new(5).unwrap());
        assert_eq!(req.deload_cadence_weeks, 8);
        let (plan, _) = build_macrocycle(&req).unwrap();
        let deloads = plan.mesocycles.iter().filter(|m| m.phase == Phase::Deload).count();
        assert_eq!(deloads, 2);
        assert!(plan.microcycles().all(|m| m.training_days.len() == 5));
    }

    #[test]
    fn test_populated_plan_round_trips_through_json() {
        let profile = TrainingProfile::new("u1", ExperienceLevel::Advanced, 4.0);
        let frequency = TrainingFrequency::new(6).unwrap();
        let (mut plan, _) = build_macrocycle(&PlanRequest::for_profile(&profile, request(8, 4).start_date, 8, frequency)).unwrap();

        let mut strength = profile.strength.clone();
        strength.insert("back_squat".to_string(), 160.0);
        let table = LandmarkTable::for_profile(&profile, &[]);
        let generator = TemplateGenerator::new(&table).with_strength(&strength);
        let sessions = generator.populate_macrocycle(&TemplateRequest::for_profile(&profile, frequency), &mut plan).unwrap();
        assert_eq!(sessions, 8 * 6);
        assert!(validate_macrocycle(&plan).is_ok());

        let json = serde_json::to_string(&plan).unwrap();
        let restored: Macrocycle = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, plan);
    }
}
