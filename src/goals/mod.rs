pub mod repo;
pub mod repo_types;

pub use repo::{GoalStore, PgGoalStore};
pub use repo_types::{Goal, GoalType};
