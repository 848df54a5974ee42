use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{info, error};

use crate::config::GeminiConfig;

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("GEMINI_API_KEY is not configured")] MissingCredential,
    #[error("HTTP error: {0}")] Http(String),
    #[error("malformed response: {0}")] Malformed(String),
    #[error("no image data in response")] EmptyImage,
}

/// Inline image payload as returned by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String, // base64
}

impl InlineImage {
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    pub fn from_data_uri(uri: &str) -> Option<Self> {
        let rest = uri.strip_prefix("data:")?;
        let (mime_type, data) = rest.split_once(";base64,")?;
        Some(Self { mime_type: mime_type.to_string(), data: data.to_string() })
    }

    pub fn bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        base64::engine::general_purpose::STANDARD.decode(&self.data)
    }
}

/// A service that turns one text prompt into one image.
///
/// The concept generator only talks to this seam, so a retrying or caching
/// wrapper can be slotted in without touching it.
#[async_trait]
pub trait ImageBackend: Send + Sync {
    /// Precondition checked once per batch, before any request goes out.
    fn ensure_ready(&self) -> Result<(), GeminiError> { Ok(()) }

    async fn generate_image(&self, prompt: &str) -> Result<InlineImage, GeminiError>;
}

// Helper function to truncate base64 data in JSON for cleaner logging
fn truncate_base64_in_json(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                if key == "data" {
                    if let serde_json::Value::String(s) = val {
                        if s.len() > 100 && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '=') {
                            *val = serde_json::Value::String(format!("{}...[truncated {} chars]", &s[..50], s.len() - 50));
                        }
                    }
                } else {
                    truncate_base64_in_json(val);
                }
            }
        }
        serde_json::Value::Array(arr) => arr.iter_mut().for_each(truncate_base64_in_json),
        _ => {}
    }
}

/// First `max_chars` characters of `text`, cut on a char boundary.
pub(crate) fn head(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

fn preview(data: &str) -> String {
    let shown = head(data, 50);
    if shown.len() < data.len() { format!("{}...[{} chars total]", shown, data.len()) } else { data.to_string() }
}

pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.api_base.trim_end_matches('/').to_string(),
            model: config.image_model.clone(),
        }
    }

    async fn perform_api_call(&self, api_key: &str, prompt: &str) -> Result<InlineImage, GeminiError> {
        let url = format!("{}/models/{}:generateContent?key={}", self.base_url, self.model, api_key);
        info!("🔗 Making request to: {}", url.replace(api_key, "***"));

        let request_body = json!({
            "contents": [{
                "parts": [{"text": prompt}]
            }],
            "generationConfig": {
                "responseModalities": ["TEXT", "IMAGE"],
                "candidateCount": 1
            }
        });

        let response = self.client
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| GeminiError::Http(e.to_string()))?;

        let status = response.status();
        info!("📥 Response status: {}", status);

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!("❌ API Error response: {}", error_body);
            return Err(GeminiError::Http(format!("status={} body={}", status, error_body)));
        }

        let response_text = response.text().await
            .map_err(|e| GeminiError::Http(e.to_string()))?;

        if let Ok(mut json_value) = serde_json::from_str::<serde_json::Value>(&response_text) {
            truncate_base64_in_json(&mut json_value);
            tracing::debug!("📥 Raw Gemini API response: {}", json_value);
        }

        image_from_response(&response_text)
    }
}

#[async_trait]
impl ImageBackend for GeminiClient {
    fn ensure_ready(&self) -> Result<(), GeminiError> {
        self.api_key.as_ref().map(|_| ()).ok_or(GeminiError::MissingCredential)
    }

    async fn generate_image(&self, prompt: &str) -> Result<InlineImage, GeminiError> {
        let api_key = self.api_key.as_deref().ok_or(GeminiError::MissingCredential)?;
        info!("Generating image with Gemini API...");
        match self.perform_api_call(api_key, prompt).await {
            Ok(image) => {
                info!("✅ Successfully generated {} image: {}", image.mime_type, preview(&image.data));
                Ok(image)
            }
            Err(e) => {
                error!("❌ Failed to generate image: {}", e);
                Err(e)
            }
        }
    }
}

// --- Response Parsing Helpers ---

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate { #[serde(default)] content: Content }

#[derive(Debug, Deserialize, Default)]
struct Content { #[serde(default)] parts: Vec<Part> }

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Part {
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData
    },
    #[allow(dead_code)]
    Text { text: String },
    #[allow(dead_code)]
    Other(serde_json::Value)
}

#[derive(Debug, Deserialize)]
struct InlineData {
    data: String,
    #[serde(rename = "mimeType")]
    mime_type: String,
}

/// First inline image of the first candidate.
pub(crate) fn image_from_response(body: &str) -> Result<InlineImage, GeminiError> {
    let parsed: GeminiResponse = serde_json::from_str(body)
        .map_err(|e| GeminiError::Malformed(e.to_string()))?;

    let parts = parsed.candidates.into_iter().next().map(|c| c.content.parts).unwrap_or_default();
    for part in parts {
        if let Part::Inline { inline_data } = part {
            info!("🎯 Found image data with mime type: {}", inline_data.mime_type);
            return Ok(InlineImage { mime_type: inline_data.mime_type, data: inline_data.data });
        }
    }
    info!("⚠️ No inline image data found in response structure");
    Err(GeminiError::EmptyImage)
}
