use anyhow::Context;
use serde::Serialize;
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::context::iso_date;
use crate::nutrition::{NutritionRecord, Provenance};

/// Row in `food_logs`.
#[derive(Debug, Clone, FromRow)]
pub struct FoodLogRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub log_date: Date,
    pub food_name: String,
    pub calories: i64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub vitamins: String,
    pub minerals: String,
    pub image_key: Option<String>,
    pub provenance: String,
    pub created_at: OffsetDateTime,
}

/// A stored record together with its bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodLogEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(with = "iso_date")]
    pub date: Date,
    #[serde(flatten)]
    pub record: NutritionRecord,
    pub provenance: Provenance,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Calorie and protein sums for one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, FromRow)]
pub struct DaySums {
    pub calories: i64,
    pub protein: f64,
}

impl TryFrom<FoodLogRow> for FoodLogEntry {
    type Error = anyhow::Error;

    fn try_from(r: FoodLogRow) -> anyhow::Result<Self> {
        let calories = u32::try_from(r.calories)
            .with_context(|| format!("food_logs {} has invalid calories {}", r.id, r.calories))?;
        let provenance = Provenance::parse(&r.provenance)
            .with_context(|| format!("food_logs {} has unknown provenance {}", r.id, r.provenance))?;
        Ok(Self {
            id: r.id,
            user_id: r.user_id,
            date: r.log_date,
            record: NutritionRecord {
                food_name: r.food_name,
                calories,
                protein: r.protein,
                carbs: r.carbs,
                fats: r.fats,
                vitamins: r.vitamins,
                minerals: r.minerals,
                image_reference: r.image_key,
            },
            provenance,
            created_at: r.created_at,
        })
    }
}
