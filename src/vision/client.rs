use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::VisionConfig;

/// One prompt plus one image, sent to a vision-capable model.
#[derive(Debug, Clone, Copy)]
pub struct VisionRequest<'a> {
    pub prompt: &'a str,
    pub image: &'a [u8],
    pub mime_type: &'a str,
}

/// Remote model returning free-form text.
#[async_trait]
pub trait VisionClient: Send + Sync {
    async fn generate(&self, request: VisionRequest<'_>) -> anyhow::Result<String>;
}

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Gemini `generateContent` over REST.
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(cfg: &VisionConfig) -> anyhow::Result<Self> {
        // The overall wait is bounded by the extractor, not here.
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .context("build vision http client")?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
        })
    }
}

#[async_trait]
impl VisionClient for GeminiClient {
    async fn generate(&self, request: VisionRequest<'_>) -> anyhow::Result<String> {
        let url = format!("{}/{}:generateContent", self.base_url, self.model);
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    Part::Text {
                        text: request.prompt.to_string(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: request.mime_type.to_string(),
                            data: BASE64_STANDARD.encode(request.image),
                        },
                    },
                ],
            }],
        };

        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", self.api_key.as_str())
            .json(&body)
            .send()
            .await
            .context("gemini generateContent")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("gemini returned {status}: {text}");
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .context("parse gemini response envelope")?;
        let text = parsed.first_text().unwrap_or_default();
        debug!(model = %self.model, len = text.len(), "gemini response received");
        Ok(text)
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

impl GenerateContentResponse {
    // Concatenates the text parts of the first candidate.
    fn first_text(self) -> Option<String> {
        let content = self.candidates?.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        Some(text)
    }
}
