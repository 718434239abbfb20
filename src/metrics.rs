//! Performance metrics - strength, volume and fatigue estimates
//!
//! Pure functions. Bad inputs degrade to a neutral `0.0` instead of
//! failing, so one malformed set never halts a larger computation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::profile::RecoveryCapacity;

/// Closed-form one-rep-max estimators
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OneRmFormula {
    #[default]
    Brzycki,
    Epley,
    Lander,
    Lombardi,
    Mayhew,
    OConner,
    Wathan,
}

impl OneRmFormula {
    pub fn all() -> &'static [OneRmFormula] {
        &[
            OneRmFormula::Brzycki,
            OneRmFormula::Epley,
            OneRmFormula::Lander,
            OneRmFormula::Lombardi,
            OneRmFormula::Mayhew,
            OneRmFormula::OConner,
            OneRmFormula::Wathan,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            OneRmFormula::Brzycki => "brzycki",
            OneRmFormula::Epley => "epley",
            OneRmFormula::Lander => "lander",
            OneRmFormula::Lombardi => "lombardi",
            OneRmFormula::Mayhew => "mayhew",
            OneRmFormula::OConner => "oconner",
            OneRmFormula::Wathan => "wathan",
        }
    }

    /// Lenient lookup: unknown names fall back to Brzycki
    pub fn from_name(name: &str) -> Self {
        let normalized = name.trim().to_lowercase().replace(['\'', '_', '-', ' '], "");
        match Self::all().iter().find(|f| f.name() == normalized) {
            Some(formula) => *formula,
            None => {
                tracing::debug!("Unknown 1RM formula {:?}, using brzycki", name);
                OneRmFormula::Brzycki
            }
        }
    }
}

impl fmt::Display for OneRmFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OneRmFormula {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

/// Highest rep count where Brzycki's denominator stays positive
const BRZYCKI_MAX_REPS: u32 = 36;

/// Highest rep count where Lander's denominator stays positive
const LANDER_MAX_REPS: u32 = 37;

/// Estimate one-rep max from a set.
///
/// A single rep is returned unchanged: the lifted weight already is the 1RM.
/// Returns `0.0` for non-positive weight or zero reps.
pub fn estimate_one_rm(weight: f64, reps: u32, formula: OneRmFormula) -> f64 {
    if !(weight > 0.0) || reps == 0 {
        return 0.0;
    }
    if reps == 1 {
        return weight;
    }

    let r = reps as f64;
    match formula {
        OneRmFormula::Brzycki => {
            let r = reps.min(BRZYCKI_MAX_REPS) as f64;
            weight * 36.0 / (37.0 - r)
        }
        OneRmFormula::Epley => weight * (1.0 + 0.0333 * r),
        OneRmFormula::Lander => {
            let r = reps.min(LANDER_MAX_REPS) as f64;
            100.0 * weight / (101.3 - 2.67123 * r)
        }
        OneRmFormula::Lombardi => weight * r.powf(0.10),
        OneRmFormula::Mayhew => 100.0 * weight / (52.2 + 41.9 * (-0.055 * r).exp()),
        OneRmFormula::OConner => weight * (1.0 + 0.025 * r),
        OneRmFormula::Wathan => 100.0 * weight / (48.8 + 53.8 * (-0.075 * r).exp()),
    }
}

/// Fraction of 1RM liftable for `reps` total reps to failure (inverse Brzycki)
pub fn percent_of_one_rm(reps_to_failure: u32) -> f64 {
    let r = reps_to_failure.clamp(1, BRZYCKI_MAX_REPS) as f64;
    (37.0 - r) / 36.0
}

/// Training load: sets x reps x weight
pub fn volume_load(sets: u32, reps: u32, weight: f64) -> f64 {
    sets as f64 * reps as f64 * weight
}

/// Composite fatigue score in `[1, 10]`, one decimal.
///
/// Volume load is scaled per 1000 kg and intensity/frequency onto 0-10
/// before weighting 0.4 / 0.4 / 0.2. Higher recovery capacity suppresses
/// the result.
pub fn fatigue(volume_load: f64, intensity: f64, frequency: f64, recovery: RecoveryCapacity) -> f64 {
    let volume = (volume_load.max(0.0) / 1000.0).min(10.0);
    let intensity = intensity.clamp(0.0, 10.0);
    let frequency = (frequency.max(0.0) / 7.0 * 10.0).min(10.0);

    let raw = 0.4 * volume + 0.4 * intensity + 0.2 * frequency;
    let adjusted = raw * (10.0 / recovery.as_f64());

    let clamped = if adjusted.is_nan() { 1.0 } else { adjusted.clamp(1.0, 10.0) };
    (clamped * 10.0).round() / 10.0
}
