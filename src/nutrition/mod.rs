pub mod fallback;
pub mod model;
pub mod validator;

pub use fallback::{FallbackPolicy, Resolution, UNKNOWN_FOOD};
pub use model::{Candidate, NutritionRecord, Provenance, REQUIRED_FIELDS};
pub use validator::NutritionValidator;
