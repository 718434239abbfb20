//! Performance analysis - windowed metrics, trends and fatigue feedback
//!
//! A report compares the current window of logged sets with the window of
//! equal length before it. Reports are history: created once, never edited.

pub mod trend;
pub mod volume;

pub use trend::{ProgressionFit, fit_all, fit_progression};
pub use volume::{MuscleVolume, VolumeTracker};

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::db::Training;
use crate::landmarks::LandmarkTable;
use crate::metrics::{OneRmFormula, estimate_one_rm, fatigue, volume_load};
use crate::periodization::Microcycle;
use crate::profile::{RecoveryCapacity, TrainingProfile};

/// Assumed effort when sets were logged without RPE
pub const DEFAULT_RPE: f64 = 7.0;

pub const E1RM_PREFIX: &str = "e1rm.";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    /// Classify by relative change against `threshold`
    pub fn classify(value: f64, prior: f64, threshold: f64) -> Self {
        let change = value - prior;
        if prior == 0.0 {
            return match change.partial_cmp(&0.0) {
                Some(Ordering::Greater) => Trend::Increasing,
                Some(Ordering::Less) => Trend::Decreasing,
                _ => Trend::Stable,
            };
        }

        let relative = change / prior.abs();
        if relative > threshold {
            Trend::Increasing
        } else if relative < -threshold {
            Trend::Decreasing
        } else {
            Trend::Stable
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MetricValue {
    pub value: f64,
    /// Delta against the prior window
    pub change: f64,
    pub trend: Trend,
}

impl MetricValue {
    pub fn new(value: f64, prior: f64, threshold: f64) -> Self {
        Self { value, change: value - prior, trend: Trend::classify(value, prior, threshold) }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryStatus {
    Fresh,
    Adequate,
    Strained,
    Overreached,
}

impl RecoveryStatus {
    /// Fatigue band, one band worse for poor recoverers
    pub fn from_level(level: f64, capacity: RecoveryCapacity) -> Self {
        let band = if level < 4.0 {
            0
        } else if level < 6.5 {
            1
        } else if level < 8.5 {
            2
        } else {
            3
        };
        let band = if capacity.value() <= 3 { band + 1 } else { band };

        match band {
            0 => RecoveryStatus::Fresh,
            1 => RecoveryStatus::Adequate,
            2 => RecoveryStatus::Strained,
            _ => RecoveryStatus::Overreached,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RecoveryStatus::Fresh => "fresh",
            RecoveryStatus::Adequate => "adequate",
            RecoveryStatus::Strained => "strained",
            RecoveryStatus::Overreached => "overreached",
        }
    }

    fn advice(&self) -> &'static [&'static str] {
        match self {
            RecoveryStatus::Fresh => &["Recovery is good: progress load or add sets toward optimal volume"],
            RecoveryStatus::Adequate => &["Maintain current volume and intensity"],
            RecoveryStatus::Strained => &[
                "Hold volume steady and keep effort at or below RPE 8",
                "Deload next week if fatigue keeps rising",
            ],
            RecoveryStatus::Overreached => &[
                "Insert a deload week: halve working sets and cap effort at RPE 6",
                "Prioritise sleep and nutrition before the next block",
            ],
        }
    }
}

impl fmt::Display for RecoveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FatigueAnalysis {
    pub current_level: f64,
    pub recovery_status: RecoveryStatus,
    /// One to three entries
    pub recommendations: Vec<String>,
    pub deload_recommended: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceAnalysis {
    pub user_id: String,
    pub date: DateTime<Utc>,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub metrics: BTreeMap<String, MetricValue>,
    pub landmarks: Option<LandmarkTable>,
    pub fatigue: FatigueAnalysis,
    #[serde(default)]
    pub progressions: BTreeMap<String, ProgressionFit>,
}

impl PerformanceAnalysis {
    pub fn metric(&self, name: &str) -> Option<&MetricValue> {
        self.metrics.get(name)
    }
}

/// Aggregates of one window
#[derive(Debug, Default)]
struct WindowStats {
    weekly_volume_load: f64,
    weekly_sets: f64,
    sessions_per_week: f64,
    average_rpe: Option<f64>,
    best_one_rm: BTreeMap<String, f64>,
    logged_sets: u32,
}

impl WindowStats {
    fn intensity(&self) -> f64 {
        if self.logged_sets == 0 {
            0.0
        } else {
            self.average_rpe.unwrap_or(DEFAULT_RPE)
        }
    }
}

pub struct PerformanceReporter {
    window_days: u32,
    trend_threshold: f64,
    formula: OneRmFormula,
    include_landmarks: bool,
}

impl PerformanceReporter {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            window_days: config.analysis_window_days.max(1),
            trend_threshold: config.trend_threshold,
            formula: config.one_rm_formula,
            include_landmarks: true,
        }
    }

    /// Leave the landmark snapshot out of reports
    pub fn without_landmarks(mut self) -> Self {
        self.include_landmarks = false;
        self
    }

    fn weeks(&self) -> f64 {
        self.window_days as f64 / 7.0
    }

    /// Analyse the window ending on `end` (inclusive). `plan` is the week
    /// that was prescribed for this window, if any.
    pub fn analyze(
        &self,
        profile: &TrainingProfile,
        trainings: &[Training],
        end: NaiveDate,
        plan: Option<&Microcycle>,
    ) -> PerformanceAnalysis {
        let span = Duration::days(self.window_days as i64 - 1);
        let period_start = end - span;
        let prior_end = period_start - Duration::days(1);
        let prior_start = prior_end - span;

        let current: Vec<Training> = in_window(trainings, profile, period_start, end);
        let prior: Vec<Training> = in_window(trainings, profile, prior_start, prior_end);
        let now_stats = self.window_stats(&current);
        let prior_stats = self.window_stats(&prior);

        let capacity = profile.recovery_capacity();
        let level = window_fatigue(&now_stats, capacity);
        let prior_level = window_fatigue(&prior_stats, capacity);

        let threshold = self.trend_threshold;
        let mut metrics = BTreeMap::new();
        metrics.insert(
            "volume_load".to_string(),
            MetricValue::new(now_stats.weekly_volume_load, prior_stats.weekly_volume_load, threshold),
        );
        metrics.insert(
            "weekly_sets".to_string(),
            MetricValue::new(now_stats.weekly_sets, prior_stats.weekly_sets, threshold),
        );
        metrics.insert(
            "sessions_per_week".to_string(),
            MetricValue::new(now_stats.sessions_per_week, prior_stats.sessions_per_week, threshold),
        );
        if let Some(rpe) = now_stats.average_rpe {
            metrics.insert(
                "average_rpe".to_string(),
                MetricValue::new(rpe, prior_stats.intensity(), threshold),
            );
        }
        metrics.insert("fatigue".to_string(), MetricValue::new(level, prior_level, threshold));
        for (exercise, best) in &now_stats.best_one_rm {
            let prior_best = prior_stats.best_one_rm.get(exercise).copied().unwrap_or(0.0);
            metrics.insert(format!("{E1RM_PREFIX}{exercise}"), MetricValue::new(*best, prior_best, threshold));
        }
        if let Some(planned) = plan.map(planned_weekly_sets).filter(|sets| *sets > 0.0) {
            metrics.insert(
                "plan_adherence".to_string(),
                MetricValue::new(now_stats.weekly_sets / planned, prior_stats.weekly_sets / planned, threshold),
            );
        }

        let table = LandmarkTable::for_profile(profile, &[]);
        let tracker = VolumeTracker::from_trainings(&current, self.weeks());
        let fatigue = fatigue_analysis(level, capacity, &tracker, &table);
        if fatigue.deload_recommended {
            warn!(
                "Deload recommended for {}: fatigue {:.1}, status {}",
                profile.user_id, fatigue.current_level, fatigue.recovery_status
            );
        }

        let progressions = fit_all(&current, self.formula);

        info!(
            "Performance analysis for {} ({} - {}): {} metrics, fatigue {:.1} ({})",
            profile.user_id,
            period_start,
            end,
            metrics.len(),
            fatigue.current_level,
            fatigue.recovery_status
        );

        PerformanceAnalysis {
            user_id: profile.user_id.clone(),
            date: Utc::now(),
            period_start,
            period_end: end,
            metrics,
            landmarks: self.include_landmarks.then_some(table),
            fatigue,
            progressions,
        }
    }

    fn window_stats(&self, trainings: &[Training]) -> WindowStats {
        let weeks = self.weeks();
        let mut stats = WindowStats::default();
        let mut days = BTreeSet::new();
        let mut total_load = 0.0;
        let (mut rpe_sum, mut rpe_sets) = (0.0, 0u32);

        for training in trainings {
            days.insert(training.date.date_naive());
            total_load += volume_load(training.sets, training.reps, training.weight_kg.max(0.0));
            stats.logged_sets += training.sets;
            if let Some(rpe) = training.rpe {
                rpe_sum += rpe as f64 * training.sets as f64;
                rpe_sets += training.sets;
            }

            let e1rm = estimate_one_rm(training.weight_kg, training.reps, self.formula);
            if e1rm > 0.0 {
                let best = stats.best_one_rm.entry(training.exercise.clone()).or_insert(0.0);
                *best = best.max(e1rm);
            }
        }

        stats.weekly_volume_load = total_load / weeks;
        stats.weekly_sets = stats.logged_sets as f64 / weeks;
        stats.sessions_per_week = days.len() as f64 / weeks;
        stats.average_rpe = (rpe_sets > 0).then(|| rpe_sum / rpe_sets as f64);
        stats
    }
}

fn in_window(trainings: &[Training], profile: &TrainingProfile, start: NaiveDate, end: NaiveDate) -> Vec<Training> {
    trainings
        .iter()
        .filter(|t| t.user_id == profile.user_id)
        .filter(|t| (start..=end).contains(&t.date.date_naive()))
        .cloned()
        .collect()
}

fn window_fatigue(stats: &WindowStats, capacity: RecoveryCapacity) -> f64 {
    fatigue(stats.weekly_volume_load, stats.intensity(), stats.sessions_per_week, capacity)
}

fn planned_weekly_sets(plan: &Microcycle) -> f64 {
    plan.sessions.iter().map(|s| s.total_sets()).sum::<usize>() as f64
}

/// Rule table: status advice first, then one muscle group note
fn fatigue_analysis(
    level: f64,
    capacity: RecoveryCapacity,
    tracker: &VolumeTracker,
    table: &LandmarkTable,
) -> FatigueAnalysis {
    let status = RecoveryStatus::from_level(level, capacity);
    let mut recommendations: Vec<String> = status.advice().iter().map(|s| s.to_string()).collect();

    let group_note = match status {
        RecoveryStatus::Strained | RecoveryStatus::Overreached => {
            tracker.over_maximum(table).first().map(|(group, sets, max)| {
                format!("Reduce frequency for {}: {:.1} weekly sets exceeds maximum {}", group, sets, max)
            })
        }
        RecoveryStatus::Fresh | RecoveryStatus::Adequate => {
            tracker.under_minimum(table).first().map(|(group, sets, min)| {
                format!("Add sets for {}: {:.1} weekly sets is below minimum {}", group, sets, min)
            })
        }
    };
    recommendations.extend(group_note);
    recommendations.truncate(3);

    FatigueAnalysis {
        current_level: level,
        recovery_status: status,
        recommendations,
        deload_recommended: status == RecoveryStatus::Overreached,
    }
}

/// Feed a report back into the profile: fresh 1RM estimates and fatigue
pub fn apply_analysis(profile: &TrainingProfile, analysis: &PerformanceAnalysis) -> TrainingProfile {
    let mut updated = profile.clone();
    for (name, metric) in &analysis.metrics {
        if let Some(exercise) = name.strip_prefix(E1RM_PREFIX) {
            if metric.value > 0.0 {
                updated.strength.insert(exercise.to_string(), metric.value);
            }
        }
    }
    updated.fatigue_estimate = Some(analysis.fatigue.current_level);
    updated
}
