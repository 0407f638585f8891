use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The seven keys the vision model must return.
pub const REQUIRED_FIELDS: [&str; 7] = [
    "food_name",
    "calories",
    "protein",
    "carbs",
    "fats",
    "vitamins",
    "minerals",
];

/// One logged food entry. Never stored partially.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionRecord {
    pub food_name: String,
    pub calories: u32,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub vitamins: String,
    pub minerals: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_reference: Option<String>,
}

/// Where a stored record's numbers came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Extracted,
    Fallback,
    Manual,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Extracted => "extracted",
            Provenance::Fallback => "fallback",
            Provenance::Manual => "manual",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "extracted" => Some(Provenance::Extracted),
            "fallback" => Some(Provenance::Fallback),
            "manual" => Some(Provenance::Manual),
            _ => None,
        }
    }
}

/// Decoded but not yet validated model output.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate(pub Value);

impl Candidate {
    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        self.0.as_object()
    }
}
