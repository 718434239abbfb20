//! Structural validation of plan hierarchies
//!
//! Structural problems are errors. Volume/intensity drift is only a
//! warning: it is policy, not structure.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::model::{Macrocycle, Mesocycle, Microcycle, Phase};
use crate::error::PlanError;

/// Non-blocking policy finding
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanWarning {
    pub mesocycle: usize,
    pub message: String,
}

fn check_level(field: &'static str, value: u8) -> Result<(), PlanError> {
    if (1..=10).contains(&value) {
        Ok(())
    } else {
        Err(PlanError::LevelOutOfRange { field, value })
    }
}

fn validate_microcycle(index: usize, micro: &Microcycle) -> Result<(), PlanError> {
    check_level("volume", micro.volume_level)?;
    check_level("intensity", micro.intensity_level)?;
    check_level("fatigue target", micro.fatigue_target)?;

    let mut seen = Vec::with_capacity(micro.sessions.len());
    let mut last_day = None;
    for session in &micro.sessions {
        if !micro.training_days.contains(&session.day) {
            return Err(PlanError::UnscheduledDay(session.day));
        }
        if seen.contains(&session.day) {
            return Err(PlanError::DuplicateSessionDay(session.day));
        }
        let day = session.day.num_days_from_monday();
        if last_day.is_some_and(|last| day < last) {
            return Err(PlanError::MicrocycleSequence { index, week: micro.week });
        }
        last_day = Some(day);
        seen.push(session.day);
    }
    Ok(())
}

/// Validate one mesocycle on its own, including hand-built ones
pub fn validate_mesocycle(meso: &Mesocycle) -> Result<(), PlanError> {
    let index = meso.index;
    check_level("volume", meso.volume_level)?;
    check_level("intensity", meso.intensity_level)?;

    let expected_deloads = usize::from(meso.includes_deload);
    let found = meso.deload_count();
    if found != expected_deloads {
        return Err(PlanError::DeloadCount { index, expected: expected_deloads, found });
    }

    if meso.microcycles.len() != meso.duration_weeks as usize {
        return Err(PlanError::BlockLength {
            index,
            declared_weeks: meso.duration_weeks,
            microcycles: meso.microcycles.len(),
        });
    }

    for (i, micro) in meso.microcycles.iter().enumerate() {
        let expected_start = meso.start_date + Duration::weeks(i as i64);
        if micro.week != i as u32 + 1 || micro.start_date != expected_start {
            return Err(PlanError::MicrocycleSequence { index, week: micro.week });
        }
        validate_microcycle(index, micro)?;
    }

    Ok(())
}

/// Whether `next` may directly follow `prev`
pub fn can_follow(prev: &Mesocycle, next: Phase) -> bool {
    let wave_closed = prev.phase == Phase::Deload || prev.includes_deload || prev.phase.wave_rank().is_none();
    match next {
        Phase::Transition | Phase::Maintenance => true,
        Phase::Accumulation => wave_closed,
        _ => match (prev.phase.wave_rank(), next.wave_rank()) {
            (Some(a), Some(b)) => !wave_closed && b > a,
            _ => false,
        },
    }
}

/// Validate a whole macrocycle, returning policy warnings on success
pub fn validate_macrocycle(plan: &Macrocycle) -> Result<Vec<PlanWarning>, PlanError> {
    let first = plan.mesocycles.first().ok_or(PlanError::EmptyMacrocycle)?;
    if !matches!(first.phase, Phase::Accumulation | Phase::Transition | Phase::Maintenance) {
        return Err(PlanError::OpeningPhase(first.phase));
    }

    let mut expected_start = plan.start_date;
    let mut total_weeks = 0u32;
    let mut warnings = Vec::new();

    for (i, meso) in plan.mesocycles.iter().enumerate() {
        if meso.start_date > expected_start {
            return Err(PlanError::DateGap { index: i, expected: expected_start, found: meso.start_date });
        }
        if meso.start_date < expected_start {
            return Err(PlanError::DateOverlap { index: i, expected: expected_start, found: meso.start_date });
        }
        if meso.duration_weeks == 0 {
            return Err(PlanError::BlockLength { index: i, declared_weeks: 0, microcycles: meso.microcycles.len() });
        }

        validate_mesocycle(meso)?;

        if i > 0 {
            let prev = &plan.mesocycles[i - 1];
            if !can_follow(prev, meso.phase) {
                return Err(PlanError::PhaseOrder { from: prev.phase, to: meso.phase });
            }
            if let Some(warning) = check_inverse_progression(prev, meso) {
                warn!("Plan {:?}: {}", plan.name, warning.message);
                warnings.push(warning);
            }
        }

        expected_start = meso.end_date();
        total_weeks += meso.duration_weeks;
    }

    if total_weeks != plan.duration_weeks {
        return Err(PlanError::DurationMismatch { declared: plan.duration_weeks, actual: total_weeks });
    }

    Ok(warnings)
}

/// Within a wave, volume and intensity should move in opposite directions
fn check_inverse_progression(prev: &Mesocycle, next: &Mesocycle) -> Option<PlanWarning> {
    if !prev.phase.is_loading() || !next.phase.is_loading() || next.phase == Phase::Accumulation {
        return None;
    }

    let dv = next.volume_level as i16 - prev.volume_level as i16;
    let di = next.intensity_level as i16 - prev.intensity_level as i16;
    if dv.signum() != di.signum() {
        return None;
    }

    Some(PlanWarning {
        mesocycle: next.index,
        message: format!(
            "{} -> {}: volume {} -> {}, intensity {} -> {} (expected opposite movement)",
            prev.phase, next.phase, prev.volume_level, next.volume_level, prev.intensity_level, next.intensity_level
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Weekday};
    use crate::profile::Goal;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
    }

    fn micro(week: u32, start: NaiveDate, is_deload: bool) -> Microcycle {
        Microcycle {
            week,
            start_date: start,
            volume_level: 5,
            intensity_level: 5,
            fatigue_target: 5,
            is_deload,
            training_days: vec![Weekday::Mon, Weekday::Wed, Weekday::Fri],
            sessions: vec![],
        }
    }

    fn meso(index: usize, phase: Phase, start: NaiveDate, weeks: u32, deload_weeks: &[u32]) -> Mesocycle {
        let (volume_level, intensity_level) = phase.baseline();
        Mesocycle {
            index,
            name: format!("{} block", phase),
            phase,
            start_date: start,
            duration_weeks: weeks,
            volume_level,
            intensity_level,
            includes_deload: !deload_weeks.is_empty(),
            microcycles: (0..weeks)
                .map(|w| micro(w + 1, start + Duration::weeks(w as i64), deload_weeks.contains(&(w + 1))))
                .collect(),
        }
    }

    fn plan(mesocycles: Vec<Mesocycle>, weeks: u32) -> Macrocycle {
        Macrocycle {
            user_id: "u1".to_string(),
            name: "test".to_string(),
            goal: Goal::Hypertrophy,
            start_date: start(),
            duration_weeks: weeks,
            mesocycles,
        }
    }

    fn wave() -> Vec<Mesocycle> {
        let s = start();
        vec![
            meso(0, Phase::Accumulation, s, 3, &[]),
            meso(1, Phase::Intensification, s + Duration::weeks(3), 2, &[]),
            meso(2, Phase::Realization, s + Duration::weeks(5), 1, &[]),
            meso(3, Phase::Deload, s + Duration::weeks(6), 1, &[1]),
        ]
    }

    #[test]
    fn test_valid_wave() {
        let warnings = validate_macrocycle(&plan(wave(), 7)).unwrap();
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_empty_macrocycle() {
        assert_eq!(validate_macrocycle(&plan(vec![], 4)), Err(PlanError::EmptyMacrocycle));
    }

    #[test]
    fn test_gap_detected() {
        let mut mesos = wave();
        mesos[2] = meso(2, Phase::Realization, start() + Duration::weeks(6), 1, &[]);
        let err = validate_macrocycle(&plan(mesos, 7)).unwrap_err();
        assert!(matches!(err, PlanError::DateGap { index: 2, .. }), "{:?}", err);
    }

    #[test]
    fn test_overlap_detected() {
        let mut mesos = wave();
        mesos[1] = meso(1, Phase::Intensification, start() + Duration::weeks(2), 2, &[]);
        let err = validate_macrocycle(&plan(mesos, 7)).unwrap_err();
        assert!(matches!(err, PlanError::DateOverlap { index: 1, .. }), "{:?}", err);
    }

    #[test]
    fn test_duration_mismatch() {
        let err = validate_macrocycle(&plan(wave(), 8)).unwrap_err();
        assert_eq!(err, PlanError::DurationMismatch { declared: 8, actual: 7 });
    }

    #[test]
    fn test_block_length_reports_microcycles() {
        let mut mesos = wave();
        mesos[3].duration_weeks = 2;
        mesos.push(meso(4, Phase::Accumulation, start() + Duration::weeks(8), 1, &[]));
        let err = validate_macrocycle(&plan(mesos, 9)).unwrap_err();
        assert_eq!(err, PlanError::BlockLength { index: 3, declared_weeks: 2, microcycles: 1 });
        assert_eq!(err.to_string(), "mesocycle 3 has 1 microcycles but declares 2 weeks");
    }

    #[test]
    fn test_missing_deload_microcycle() {
        let mut block = meso(0, Phase::Realization, start(), 2, &[]);
        block.includes_deload = true;
        assert_eq!(
            validate_mesocycle(&block),
            Err(PlanError::DeloadCount { index: 0, expected: 1, found: 0 })
        );
    }

    #[test]
    fn test_two_deload_microcycles() {
        let block = meso(0, Phase::Realization, start(), 3, &[2, 3]);
        assert_eq!(
            validate_mesocycle(&block),
            Err(PlanError::DeloadCount { index: 0, expected: 1, found: 2 })
        );
    }

    #[test]
    fn test_undeclared_deload_microcycle() {
        let mut block = meso(0, Phase::Accumulation, start(), 3, &[3]);
        block.includes_deload = false;
        assert!(matches!(validate_mesocycle(&block), Err(PlanError::DeloadCount { expected: 0, found: 1, .. })));
    }

    #[test]
    fn test_embedded_deload_is_valid() {
        let block = meso(0, Phase::Realization, start(), 3, &[3]);
        assert!(validate_mesocycle(&block).is_ok());
    }

    #[test]
    fn test_phase_order_rejected() {
        let s = start();
        let mesos = vec![
            meso(0, Phase::Accumulation, s, 2, &[]),
            meso(1, Phase::Realization, s + Duration::weeks(2), 2, &[]),
            meso(2, Phase::Intensification, s + Duration::weeks(4), 2, &[]),
        ];
        assert_eq!(
            validate_macrocycle(&plan(mesos, 6)),
            Err(PlanError::PhaseOrder { from: Phase::Realization, to: Phase::Intensification })
        );
    }

    #[test]
    fn test_new_wave_requires_deload_or_transition() {
        let s = start();
        let mesos = vec![
            meso(0, Phase::Accumulation, s, 2, &[]),
            meso(1, Phase::Intensification, s + Duration::weeks(2), 2, &[]),
            meso(2, Phase::Accumulation, s + Duration::weeks(4), 2, &[]),
        ];
        assert!(matches!(validate_macrocycle(&plan(mesos, 6)), Err(PlanError::PhaseOrder { .. })));
    }

    #[test]
    fn test_same_direction_levels_warn_only() {
        let mut mesos = wave();
        mesos[1].volume_level = 8;
        let warnings = validate_macrocycle(&plan(mesos, 7)).unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].mesocycle, 1);
    }

    #[test]
    fn test_level_out_of_range() {
        let mut block = meso(0, Phase::Accumulation, start(), 1, &[]);
        block.microcycles[0].fatigue_target = 0;
        assert_eq!(
            validate_mesocycle(&block),
            Err(PlanError::LevelOutOfRange { field: "fatigue target", value: 0 })
        );
    }

    #[test]
    fn test_microcycle_out_of_sequence() {
        let mut block = meso(0, Phase::Accumulation, start(), 2, &[]);
        block.microcycles[1].start_date = start() + Duration::weeks(3);
        assert!(matches!(validate_mesocycle(&block), Err(PlanError::MicrocycleSequence { week: 2, .. })));
    }
}
