// Model Gateway
// Single choke point between the detectors and the hosted Gemini API. Sends a
// built ModelRequest (attaching the structured-output schema or the web-search
// tool) and returns the raw text payload, or a typed failure. No retries, no
// caching; one in-flight call per invocation.

use crate::models::MediaPayload;
use crate::services::credentials::Credential;
use crate::services::request_builder::{ContentPart, ModelRequest};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info};

const GEMINI_DEFAULT_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const REQUEST_TIMEOUT_SECS: u64 = 120;
/// Smaller model used only for the connectivity probe; the detectors run on
/// `request_builder::GEMINI_MODEL`.
pub const PROBE_MODEL: &str = "gemini-2.5-flash";

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("API key not configured")]
    MissingCredential,
    #[error("model call failed: {0}")]
    ModelCallFailed(String),
    #[error("model returned malformed JSON: {0}")]
    MalformedResponse(String),
    #[error("video generation finished, but no download link was provided")]
    IncompleteGeneration,
    #[error("failed to fetch the generated video (status {0})")]
    DownloadFailed(u16),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("video generation did not complete after {0} status checks")]
    Timeout(u32),
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GatewayError::ModelCallFailed("request timeout".to_string())
        } else if e.is_connect() {
            GatewayError::ModelCallFailed(format!("network error: {}", e))
        } else {
            GatewayError::ModelCallFailed(e.to_string())
        }
    }
}

/// Transport seam. The HTTP gateway implements it; tests substitute stubs.
#[async_trait::async_trait]
pub trait ModelTransport: Send + Sync {
    /// Send one request and return the model's raw text payload.
    async fn generate(
        &self,
        credential: &Credential,
        request: &ModelRequest,
    ) -> Result<String, GatewayError>;
}

// ============ Wire Format ============

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest {
    contents: Vec<WireContent>,
    system_instruction: WireContent,
    generation_config: WireGenerationConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireTool>>,
}

#[derive(Debug, Serialize)]
struct WireContent {
    parts: Vec<WirePart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum WirePart {
    Text { text: String },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: WireInlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig {
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireTool {
    google_search: serde_json::Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    candidates: Option<Vec<WireCandidate>>,
    error: Option<WireError>,
}

#[derive(Debug, Deserialize)]
struct WireCandidate {
    content: WireResponseContent,
}

#[derive(Debug, Deserialize)]
struct WireResponseContent {
    #[serde(default)]
    parts: Vec<WireResponsePart>,
}

#[derive(Debug, Deserialize)]
struct WireResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireError {
    message: String,
    status: Option<String>,
}

fn wire_request(request: &ModelRequest) -> WireRequest {
    let parts = request
        .parts
        .iter()
        .map(|p| match p {
            ContentPart::Text(text) => WirePart::Text { text: text.clone() },
            ContentPart::Inline(MediaPayload { mime_type, data }) => WirePart::InlineData {
                inline_data: WireInlineData {
                    mime_type: mime_type.clone(),
                    data: data.clone(),
                },
            },
        })
        .collect();

    WireRequest {
        contents: vec![WireContent { parts }],
        system_instruction: WireContent {
            parts: vec![WirePart::Text {
                text: request.system_instruction.clone(),
            }],
        },
        generation_config: WireGenerationConfig {
            temperature: request.temperature,
            response_mime_type: request
                .response_schema
                .as_ref()
                .map(|_| "application/json".to_string()),
            response_schema: request.response_schema.clone(),
        },
        tools: if request.web_search {
            Some(vec![WireTool {
                google_search: serde_json::Map::new(),
            }])
        } else {
            None
        },
    }
}

// ============ HTTP Gateway ============

pub struct GeminiGateway {
    client: reqwest::Client,
    base_url: String,
}

impl Default for GeminiGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl GeminiGateway {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        let base_url =
            env::var("GEMINI_API_URL").unwrap_or_else(|_| GEMINI_DEFAULT_URL.to_string());

        Self { client, base_url }
    }

    pub fn with_base_url(base_url: &str) -> Self {
        let mut gateway = Self::new();
        gateway.base_url = base_url.trim_end_matches('/').to_string();
        gateway
    }

    fn probe_request() -> ModelRequest {
        ModelRequest {
            model: PROBE_MODEL.to_string(),
            system_instruction: String::new(),
            parts: vec![ContentPart::Text("Say 'ok'".to_string())],
            response_schema: None,
            web_search: false,
            temperature: 0.0,
        }
    }

    /// Cheap connectivity/credential probe, used by the credential prompt flow
    /// before kicking off an expensive generation.
    pub async fn test_connection(&self, credential: &Credential) -> Result<(), GatewayError> {
        self.generate(credential, &Self::probe_request()).await.map(|_| ())
    }
}

#[async_trait::async_trait]
impl ModelTransport for GeminiGateway {
    async fn generate(
        &self,
        credential: &Credential,
        request: &ModelRequest,
    ) -> Result<String, GatewayError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url,
            request.model,
            credential.as_str()
        );
        let body = wire_request(request);

        let start = Instant::now();
        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;
        debug!(
            model = %request.model,
            status = status.as_u16(),
            latency_ms = start.elapsed().as_millis() as i64,
            "gateway.response"
        );

        if !status.is_success() {
            error!(
                model = %request.model,
                status = status.as_u16(),
                body = %response_text,
                "gateway.error"
            );
            // Prefer the structured API error message when the body carries one.
            if let Ok(parsed) = serde_json::from_str::<WireResponse>(&response_text) {
                if let Some(api_error) = parsed.error {
                    let message = match api_error.status.as_deref() {
                        Some("PERMISSION_DENIED") => "invalid API key".to_string(),
                        Some("RESOURCE_EXHAUSTED") => "API quota exceeded".to_string(),
                        _ => api_error.message,
                    };
                    return Err(GatewayError::ModelCallFailed(message));
                }
            }
            return Err(GatewayError::ModelCallFailed(format!(
                "HTTP {}: {}",
                status, response_text
            )));
        }

        let parsed: WireResponse = serde_json::from_str(&response_text)
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        if let Some(api_error) = parsed.error {
            return Err(GatewayError::ModelCallFailed(api_error.message));
        }

        let text = parsed
            .candidates
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.content.parts.into_iter().find_map(|p| p.text))
            .ok_or_else(|| {
                GatewayError::MalformedResponse("no text part in model response".to_string())
            })?;

        info!(model = %request.model, chars = text.len(), "gateway.ok");
        Ok(text)
    }
}

// ============ Response Parsing ============

/// Strip Markdown code fences the model sometimes wraps un-schema'd JSON in.
/// Schema-constrained responses never need this; the plagiarism path does.
pub fn strip_code_fences(payload: &str) -> String {
    let fence = Regex::new(r"(?s)^\s*```(?:json)?\s*(.*?)\s*```\s*$").unwrap();
    match fence.captures(payload) {
        Some(caps) => caps[1].to_string(),
        None => payload.trim().to_string(),
    }
}

/// Parse an ostensibly successful raw payload into JSON. For unconstrained
/// responses, fences are stripped and the outermost object is extracted first.
pub fn parse_payload(raw: &str, schema_constrained: bool) -> Result<Value, GatewayError> {
    let candidate = if schema_constrained {
        raw.trim().to_string()
    } else {
        let stripped = strip_code_fences(raw);
        // Some replies still carry prose around the object.
        match (stripped.find('{'), stripped.rfind('}')) {
            (Some(start), Some(end)) if end > start => stripped[start..=end].to_string(),
            _ => stripped,
        }
    };

    serde_json::from_str(&candidate).map_err(|e| GatewayError::MalformedResponse(e.to_string()))
}
