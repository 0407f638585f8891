//! Photo-to-nutrition food logging.
//!
//! Entries arrive as a meal photo or as typed numbers, are turned into a
//! validated [`nutrition::NutritionRecord`] and appended to the food log.
//! The log feeds daily totals and a short calorie/protein trend.

pub mod aggregate;
pub mod app;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod food_log;
pub mod goals;
pub mod images;
pub mod nutrition;
pub mod state;
pub mod storage;
pub mod vision;

#[cfg(test)]
pub(crate) mod testing;
