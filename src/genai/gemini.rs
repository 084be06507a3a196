//! Gemini API client — concrete provider behind the generation contract.
//!
//! Thin HTTP wrapper over `models/{model}:generateContent` (text, structured
//! JSON, inline images) and `models/{model}:predictLongRunning` plus the
//! operations endpoint (video). Pure parsing in the `parse_*` functions for
//! testability.

use std::time::Duration;

use super::config::GenTimeouts;
use super::types::{GenError, GenPayload, GenRequest, MediaRef, OperationHandle, PollStatus};
use crate::record::Fields;

// =============================================================================
// CLIENT
// =============================================================================

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// Build the HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::HttpClientBuild`] if the client cannot be
    /// constructed.
    pub fn new(api_key: String, base_url: String, timeouts: GenTimeouts) -> Result<Self, GenError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| GenError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, api_key, base_url })
    }

    /// Synchronous generation: text, structured JSON, or an inline image.
    ///
    /// # Errors
    ///
    /// Returns a [`GenError`] on transport failure, non-success status, or a
    /// malformed response body.
    pub async fn generate_content(&self, model: &str, request: &GenRequest) -> Result<GenPayload, GenError> {
        let structured = request.constraints.response_schema.is_some();
        let body = GenerateBody {
            contents: vec![ContentEntry { parts: vec![Part::text(&request.prompt)] }],
            system_instruction: request
                .constraints
                .system_instruction
                .as_deref()
                .map(|text| ContentEntry { parts: vec![Part::text(text)] }),
            generation_config: GenerationConfig::from_request(request),
        };

        let url = format!("{}/models/{model}:generateContent", self.base_url);
        let text = self.post_json(&url, &body).await?;
        parse_generate_response(&text, structured)
    }

    /// Start a long-running video job.
    ///
    /// # Errors
    ///
    /// Returns a [`GenError`] on transport failure, non-success status, or a
    /// malformed response body.
    pub async fn start_video(&self, model: &str, request: &GenRequest) -> Result<OperationHandle, GenError> {
        let body = PredictBody {
            instances: vec![PredictInstance { prompt: &request.prompt }],
            parameters: PredictParameters {
                aspect_ratio: request.constraints.aspect_ratio.as_deref(),
                duration_seconds: request.constraints.duration_secs,
            },
        };

        let url = format!("{}/models/{model}:predictLongRunning", self.base_url);
        let text = self.post_json(&url, &body).await?;
        parse_operation_start(&text)
    }

    /// Observe a long-running job once.
    ///
    /// # Errors
    ///
    /// Returns a [`GenError`] on transport failure, non-success status, or a
    /// malformed response body.
    pub async fn poll_operation(&self, handle: &OperationHandle) -> Result<PollStatus, GenError> {
        let url = format!("{}/{}", self.base_url, handle.name);
        let response = self
            .http
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| GenError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| GenError::ApiRequest(e.to_string()))?;

        if status != 200 {
            return Err(GenError::ApiResponse { status, body: text });
        }
        parse_operation_poll(&text)
    }

    async fn post_json<B: serde::Serialize>(&self, url: &str, body: &B) -> Result<String, GenError> {
        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| GenError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| GenError::ApiRequest(e.to_string()))?;

        if status != 200 {
            return Err(GenError::ApiResponse { status, body: text });
        }
        Ok(text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateBody<'a> {
    contents: Vec<ContentEntry<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<ContentEntry<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
}

#[derive(serde::Serialize)]
struct ContentEntry<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(serde::Serialize)]
struct Part<'a> {
    text: &'a str,
}

impl<'a> Part<'a> {
    fn text(text: &'a str) -> Self {
        Self { text }
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<&'a serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<ImageConfig<'a>>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig<'a> {
    aspect_ratio: &'a str,
}

impl<'a> GenerationConfig<'a> {
    fn from_request(request: &'a GenRequest) -> Option<Self> {
        let schema = request.constraints.response_schema.as_ref();
        let aspect = request.constraints.aspect_ratio.as_deref();
        if schema.is_none() && aspect.is_none() {
            return None;
        }
        Some(Self {
            response_mime_type: schema.map(|_| "application/json"),
            response_schema: schema,
            image_config: aspect.map(|aspect_ratio| ImageConfig { aspect_ratio }),
        })
    }
}

#[derive(serde::Serialize)]
struct PredictBody<'a> {
    instances: Vec<PredictInstance<'a>>,
    parameters: PredictParameters<'a>,
}

#[derive(serde::Serialize)]
struct PredictInstance<'a> {
    prompt: &'a str,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    aspect_ratio: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_seconds: Option<u32>,
}

#[derive(serde::Deserialize)]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(serde::Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(serde::Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(serde::Deserialize)]
struct OperationStart {
    name: String,
}

#[derive(serde::Deserialize)]
struct Operation {
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<OperationError>,
    #[serde(default)]
    response: Option<OperationResponse>,
}

#[derive(serde::Deserialize)]
struct OperationError {
    #[serde(default)]
    message: String,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResponse {
    generate_video_response: Option<VideoResponse>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoResponse {
    #[serde(default)]
    generated_samples: Vec<VideoSample>,
}

#[derive(serde::Deserialize)]
struct VideoSample {
    video: VideoRef,
}

#[derive(serde::Deserialize)]
struct VideoRef {
    uri: String,
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_generate_response(json: &str, structured: bool) -> Result<GenPayload, GenError> {
    let api: ApiResponse = serde_json::from_str(json).map_err(|e| GenError::ApiParse(e.to_string()))?;
    let candidate = api
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| GenError::ApiParse("no candidates in response".into()))?;

    // Image models answer with an inline-data part; prefer it when present.
    let mut text_parts: Vec<String> = Vec::new();
    for part in candidate.content.parts {
        if let Some(inline) = part.inline_data {
            return Ok(GenPayload::Media {
                mime_type: inline.mime_type,
                reference: MediaRef::Inline { base64: inline.data },
            });
        }
        if let Some(text) = part.text {
            text_parts.push(text);
        }
    }

    if text_parts.is_empty() {
        return Err(GenError::ApiParse("candidate has no usable parts".into()));
    }
    let text = text_parts.join("\n");

    if structured {
        let fields: Fields = serde_json::from_str(&text)
            .map_err(|e| GenError::ApiParse(format!("structured response is not a JSON object: {e}")))?;
        return Ok(GenPayload::Fields { fields });
    }
    Ok(GenPayload::Text { text })
}

fn parse_operation_start(json: &str) -> Result<OperationHandle, GenError> {
    let start: OperationStart = serde_json::from_str(json).map_err(|e| GenError::ApiParse(e.to_string()))?;
    Ok(OperationHandle { name: start.name })
}

fn parse_operation_poll(json: &str) -> Result<PollStatus, GenError> {
    let op: Operation = serde_json::from_str(json).map_err(|e| GenError::ApiParse(e.to_string()))?;

    if !op.done {
        return Ok(PollStatus::Pending);
    }
    if let Some(error) = op.error {
        return Ok(PollStatus::Failed(error.message));
    }

    let uri = op
        .response
        .and_then(|r| r.generate_video_response)
        .and_then(|v| v.generated_samples.into_iter().next())
        .map(|s| s.video.uri)
        .ok_or_else(|| GenError::ApiParse("operation done without video sample".into()))?;

    Ok(PollStatus::Done(GenPayload::Media {
        mime_type: "video/mp4".into(),
        reference: MediaRef::Url { url: uri },
    }))
}

#[cfg(test)]
#[path = "gemini_test.rs"]
mod tests;
