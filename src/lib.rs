//! peakform - Adaptive training periodization engine
//!
//! Strength and fatigue metrics, per-muscle volume landmarks, phased
//! macrocycle plans, push/pull/legs session templates and windowed
//! performance analysis. The engine itself does no I/O; `db` is the
//! storage adapter used by the command-line front end.

pub mod analysis;
pub mod config;
pub mod db;
pub mod error;
pub mod exercises;
pub mod landmarks;
pub mod metrics;
pub mod periodization;
pub mod profile;
pub mod templates;

pub use analysis::{PerformanceAnalysis, PerformanceReporter, apply_analysis};
pub use config::EngineConfig;
pub use db::Database;
pub use error::{ConfigError, PlanError};
pub use landmarks::{LandmarkTable, VolumeLandmark, compute_volume_landmark};
pub use metrics::{OneRmFormula, estimate_one_rm, fatigue, volume_load};
pub use periodization::{Macrocycle, PlanRequest, build_macrocycle};
pub use profile::TrainingProfile;
pub use templates::{TemplateGenerator, TemplateRequest, create_day_split};
