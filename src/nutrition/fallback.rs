use tracing::warn;

use super::model::{NutritionRecord, Provenance};
use crate::error::ExtractionError;

pub const UNKNOWN_FOOD: &str = "Unknown Food";

/// A record that is always safe to store, with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub record: NutritionRecord,
    pub provenance: Provenance,
    pub warning: Option<String>,
}

/// Turns any extraction outcome into something storable.
pub struct FallbackPolicy;

impl FallbackPolicy {
    pub fn resolve(attempt: Result<NutritionRecord, ExtractionError>) -> Resolution {
        match attempt {
            Ok(record) => Resolution {
                record,
                provenance: Provenance::Extracted,
                warning: None,
            },
            Err(e) => {
                if let ExtractionError::Decode { raw, .. } = &e {
                    warn!(error = %e, raw = %raw, "vision response not decodable, using placeholder");
                } else {
                    warn!(error = %e, "image analysis failed, using placeholder");
                }
                Resolution {
                    record: Self::placeholder(),
                    provenance: Provenance::Fallback,
                    warning: Some(format!("Error analyzing image: {e}. Using default values.")),
                }
            }
        }
    }

    pub fn placeholder() -> NutritionRecord {
        NutritionRecord {
            food_name: UNKNOWN_FOOD.to_string(),
            calories: 0,
            protein: 0.0,
            carbs: 0.0,
            fats: 0.0,
            vitamins: String::new(),
            minerals: String::new(),
            image_reference: None,
        }
    }
}
