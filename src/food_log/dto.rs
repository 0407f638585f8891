use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::Date;
use uuid::Uuid;

use crate::aggregate::DailyAggregate;
use crate::context::iso_date;
use crate::food_log::repo_types::FoodLogEntry;
use crate::goals::Goal;
use crate::nutrition::{NutritionRecord, Provenance};

/// Manually typed nutrients. Numbers may arrive as JSON numbers or strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManualFields {
    #[serde(default)]
    pub food_name: String,
    pub calories: Option<Value>,
    pub protein: Option<Value>,
    pub carbs: Option<Value>,
    pub fats: Option<Value>,
    #[serde(default)]
    pub vitamins: String,
    #[serde(default)]
    pub minerals: String,
}

/// Outcome of one submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredEntry {
    pub id: Uuid,
    #[serde(with = "iso_date")]
    pub date: Date,
    pub record: NutritionRecord,
    pub provenance: Provenance,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    #[serde(default, with = "iso_date::option")]
    pub date: Option<Date>,
}

/// Everything logged on one day, with totals and the user's target.
#[derive(Debug, Serialize)]
pub struct DayView {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub entries: Vec<FoodLogEntry>,
    pub totals: DailyAggregate,
    pub goal: Option<Goal>,
}
