//! Strength progression fits using linear regression (linfa)

use std::collections::BTreeMap;

use linfa::prelude::*;
use linfa_linear::LinearRegression;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::db::Training;
use crate::metrics::{OneRmFormula, estimate_one_rm};

/// Minimum data points required for a fit
pub const MIN_DATA_POINTS: usize = 3;

/// Estimated 1RM trend for one exercise
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressionFit {
    /// kg of estimated 1RM gained per week
    pub slope_per_week: f64,
    /// Fitted 1RM at the first data point
    pub intercept: f64,
    /// Fit quality, 0-1
    pub r2: f64,
    pub data_points: usize,
}

impl ProgressionFit {
    /// Projected 1RM `weeks` after the first data point
    pub fn project(&self, weeks: f64) -> f64 {
        self.intercept + self.slope_per_week * weeks
    }
}

/// Fit estimated 1RM against days since the first logged set
pub fn fit_progression(trainings: &[Training], exercise: &str, formula: OneRmFormula) -> Option<ProgressionFit> {
    let points: Vec<_> = trainings
        .iter()
        .filter(|t| t.exercise == exercise)
        .map(|t| (t.date, estimate_one_rm(t.weight_kg, t.reps, formula)))
        .filter(|(_, e1rm)| *e1rm > 0.0)
        .collect();

    if points.len() < MIN_DATA_POINTS {
        return None;
    }

    let first_date = points.iter().map(|(date, _)| *date).min()?;

    // X = days since first training, Y = estimated 1RM
    let x_data: Vec<f64> = points
        .iter()
        .map(|(date, _)| (*date - first_date).num_seconds() as f64 / 86_400.0)
        .collect();
    let y_data: Vec<f64> = points.iter().map(|(_, e1rm)| *e1rm).collect();

    // All points on one day leave the slope undetermined
    let spread = x_data.iter().cloned().fold(0.0, f64::max);
    if spread < 1.0 {
        return None;
    }

    let n_samples = x_data.len();
    let records = Array2::from_shape_vec((n_samples, 1), x_data).ok()?;
    let targets = Array1::from_vec(y_data);
    let dataset = Dataset::new(records, targets);

    let model = LinearRegression::default().fit(&dataset).ok()?;
    let slope = model.params()[0];
    let intercept = model.intercept();
    if !slope.is_finite() || !intercept.is_finite() {
        return None;
    }

    let predictions = model.predict(&dataset);
    let r2 = predictions.r2(&dataset).unwrap_or(0.0).clamp(0.0, 1.0);

    Some(ProgressionFit {
        slope_per_week: slope * 7.0,
        intercept,
        r2,
        data_points: n_samples,
    })
}

/// Fits for every exercise with enough data
pub fn fit_all(trainings: &[Training], formula: OneRmFormula) -> BTreeMap<String, ProgressionFit> {
    let mut exercises: Vec<&str> = trainings.iter().map(|t| t.exercise.as_str()).collect();
    exercises.sort_unstable();
    exercises.dedup();

    exercises
        .into_iter()
        .filter_map(|exercise| Some((exercise.to_string(), fit_progression(trainings, exercise, formula)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn create_training(days: i64, exercise: &str, weight: f64, reps: u32) -> Training {
        Training {
            id: None,
            user_id: "u1".to_string(),
            date: Utc.with_ymd_and_hms(2026, 2, 2, 18, 0, 0).unwrap() + Duration::days(days),
            exercise: exercise.to_string(),
            sets: 3,
            reps,
            weight_kg: weight,
            rpe: None,
            notes: None,
        }
    }

    #[test]
    fn test_linear_gain_per_week() {
        // Single reps: the estimate is the weight itself
        let trainings: Vec<_> = (0..6).map(|w| create_training(w * 7, "back_squat", 100.0 + 2.5 * w as f64, 1)).collect();
        let fit = fit_progression(&trainings, "back_squat", OneRmFormula::Brzycki).unwrap();
        assert!((fit.slope_per_week - 2.5).abs() < 1e-6);
        assert!((fit.intercept - 100.0).abs() < 1e-6);
        assert!(fit.r2 > 0.99);
        assert_eq!(fit.data_points, 6);
        assert!((fit.project(4.0) - 110.0).abs() < 1e-6);
    }

    #[test]
    fn test_not_enough_data() {
        let trainings = vec![create_training(0, "back_squat", 100.0, 5), create_training(7, "back_squat", 102.5, 5)];
        assert!(fit_progression(&trainings, "back_squat", OneRmFormula::Brzycki).is_none());
    }

    #[test]
    fn test_same_day_points_skipped() {
        let trainings: Vec<_> = (0..4).map(|_| create_training(0, "back_squat", 100.0, 5)).collect();
        assert!(fit_progression(&trainings, "back_squat", OneRmFormula::Brzycki).is_none());
    }

    #[test]
    fn test_fit_all_per_exercise() {
        let mut trainings: Vec<_> = (0..4).map(|w| create_training(w * 7, "back_squat", 100.0 + w as f64, 5)).collect();
        trainings.push(create_training(1, "barbell_bench_press", 80.0, 5));
        let fits = fit_all(&trainings, OneRmFormula::Epley);
        assert_eq!(fits.len(), 1);
        assert!(fits["back_squat"].slope_per_week > 0.0);
    }
}
