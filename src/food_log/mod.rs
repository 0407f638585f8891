pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use dto::{ManualFields, StoredEntry};
pub use repo::{FoodLogStore, PgFoodLogStore};
pub use repo_types::{DaySums, FoodLogEntry};
pub use services::{EntryInput, EntryPipeline, ImageUpload};

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::read_routes())
        .merge(handlers::write_routes())
}
