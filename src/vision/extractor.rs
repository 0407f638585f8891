use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, instrument};

use super::client::{VisionClient, VisionRequest};
use super::fences::strip_code_fences;
use crate::error::ExtractionError;
use crate::nutrition::Candidate;

pub const SUPPORTED_MIME_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

pub const NUTRITION_PROMPT: &str = r#"Analyze this food image and return a JSON object with the nutritional breakdown of the meal:
- food_name: string (name of the food)
- calories: integer (estimated total calories)
- protein: float (grams of protein)
- carbs: float (grams of carbohydrates)
- fats: float (grams of fats)
- vitamins: string (list of vitamins, e.g. 'Vitamin C, Vitamin A')
- minerals: string (list of minerals, e.g. 'Iron, Potassium')
Example: {"food_name": "Healthy Lunch Bowl", "calories": 450, "protein": 20.0, "carbs": 25.0, "fats": 30.0, "vitamins": "Vitamin C, Vitamin A", "minerals": "Iron, Potassium"}
Respond with the JSON object only. Do not wrap it in markdown code fences and do not add any other text."#;

/// Canonical allow-listed mime type, or `None`.
pub fn normalize_mime(mime_type: &str) -> Option<&'static str> {
    let lowered = mime_type.trim().to_ascii_lowercase();
    let canonical = match lowered.as_str() {
        "image/jpg" => "image/jpeg",
        other => other,
    };
    SUPPORTED_MIME_TYPES
        .iter()
        .copied()
        .find(|supported| *supported == canonical)
}

/// Image bytes in, candidate record out.
#[derive(Clone)]
pub struct VisionExtractor {
    client: Arc<dyn VisionClient>,
    timeout: Duration,
}

impl VisionExtractor {
    pub fn new(client: Arc<dyn VisionClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Rejects formats outside the allow-list without touching the network.
    pub fn check_format(&self, mime_type: &str) -> Result<&'static str, ExtractionError> {
        normalize_mime(mime_type)
            .ok_or_else(|| ExtractionError::UnsupportedFormat(mime_type.to_string()))
    }

    #[instrument(skip(self, image), fields(bytes = image.len()))]
    pub async fn extract(
        &self,
        image: &[u8],
        mime_type: &str,
    ) -> Result<Candidate, ExtractionError> {
        let mime_type = self.check_format(mime_type)?;
        let request = VisionRequest {
            prompt: NUTRITION_PROMPT,
            image,
            mime_type,
        };

        let raw = tokio::time::timeout(self.timeout, self.client.generate(request))
            .await
            .map_err(|_| ExtractionError::Timeout(self.timeout))?
            .map_err(ExtractionError::Remote)?;
        debug!(raw = %raw, "vision response");

        decode(&raw)
    }
}

/// Strict JSON decoding of a (possibly fenced) model response.
pub fn decode(raw: &str) -> Result<Candidate, ExtractionError> {
    let cleaned = strip_code_fences(raw);
    if cleaned.is_empty() {
        return Err(ExtractionError::Decode {
            raw: raw.to_string(),
            reason: "empty response".into(),
        });
    }
    serde_json::from_str::<Value>(cleaned)
        .map(Candidate)
        .map_err(|e| ExtractionError::Decode {
            raw: raw.to_string(),
            reason: e.to_string(),
        })
}
