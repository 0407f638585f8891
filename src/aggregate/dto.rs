use serde::{Deserialize, Serialize};
use time::Date;

use crate::context::iso_date;
use crate::food_log::FoodLogEntry;

/// Sums over every record of one user-day. Recomputed on each request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyAggregate {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub calories: u64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub entries: usize,
}

impl DailyAggregate {
    pub fn empty(date: Date) -> Self {
        Self {
            date,
            calories: 0,
            protein: 0.0,
            carbs: 0.0,
            fats: 0.0,
            entries: 0,
        }
    }

    /// Exact sums over entries already read from the log.
    pub fn from_entries(date: Date, entries: &[FoodLogEntry]) -> Self {
        entries.iter().fold(Self::empty(date), |mut acc, e| {
            acc.calories += u64::from(e.record.calories);
            acc.protein += e.record.protein;
            acc.carbs += e.record.carbs;
            acc.fats += e.record.fats;
            acc.entries += 1;
            acc
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub calories: u64,
    pub protein: f64,
}

#[derive(Debug, Deserialize)]
pub struct TrendQuery {
    #[serde(default, with = "iso_date::option")]
    pub end: Option<Date>,
    pub days: Option<u32>,
}
