pub mod dto;
pub mod handlers;
pub mod services;

pub use dto::{DailyAggregate, TrendPoint};
pub use services::{Aggregator, DEFAULT_TREND_DAYS};

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
