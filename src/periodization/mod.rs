//! Periodization hierarchy: macrocycle -> mesocycle -> microcycle -> session

pub mod model;
pub mod planner;
pub mod validate;

pub use model::{
    Effort, ExerciseConfig, Macrocycle, Mesocycle, Microcycle, Phase, Session, SetTarget, SpecialTechnique,
    Substitution,
};
pub use planner::{MAX_DURATION_WEEKS, MIN_DURATION_WEEKS, PlanRequest, build_macrocycle};
pub use validate::{PlanWarning, can_follow, validate_macrocycle, validate_mesocycle};
