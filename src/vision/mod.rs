pub mod client;
pub mod extractor;
pub mod fences;

pub use client::{GeminiClient, VisionClient, VisionRequest};
pub use extractor::{normalize_mime, VisionExtractor, NUTRITION_PROMPT, SUPPORTED_MIME_TYPES};
pub use fences::strip_code_fences;
