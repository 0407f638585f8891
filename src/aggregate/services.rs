use std::sync::Arc;

use anyhow::Context;
use time::{Date, Duration};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::dto::{DailyAggregate, TrendPoint};
use crate::food_log::FoodLogStore;

pub const DEFAULT_TREND_DAYS: u32 = 7;
pub const MAX_TREND_DAYS: u32 = 366;

/// Read-only views over the food log.
#[derive(Clone)]
pub struct Aggregator {
    store: Arc<dyn FoodLogStore>,
}

impl Aggregator {
    pub fn new(store: Arc<dyn FoodLogStore>) -> Self {
        Self { store }
    }

    /// Totals for one day; all zeros when nothing was logged.
    #[instrument(skip(self))]
    pub async fn daily_totals(&self, user_id: Uuid, date: Date) -> anyhow::Result<DailyAggregate> {
        let entries = self.store.list(user_id, date).await?;
        let totals = DailyAggregate::from_entries(date, &entries);
        debug!(calories = totals.calories, entries = totals.entries, "daily totals");
        Ok(totals)
    }

    /// `window_days` points ending at `end_date`, oldest first, zero-filled.
    #[instrument(skip(self))]
    pub async fn trend(
        &self,
        user_id: Uuid,
        end_date: Date,
        window_days: u32,
    ) -> anyhow::Result<Vec<TrendPoint>> {
        anyhow::ensure!(
            window_days <= MAX_TREND_DAYS,
            "trend window of {window_days} days exceeds {MAX_TREND_DAYS}"
        );
        let mut points = Vec::with_capacity(window_days as usize);
        for back in (0..window_days).rev() {
            let date = end_date
                .checked_sub(Duration::days(i64::from(back)))
                .with_context(|| format!("{back} days before {end_date} is out of range"))?;
            let sums = self.store.sum_for_day(user_id, date).await?;
            points.push(TrendPoint {
                date,
                calories: u64::try_from(sums.calories).unwrap_or(0),
                protein: sums.protein,
            });
        }
        Ok(points)
    }
}
