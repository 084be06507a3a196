//! Generation types — provider-neutral contract for AI content generation.
//!
//! DESIGN
//! ======
//! Panels never talk to a concrete API. They hold a `dyn GenerateContent`:
//! submit a prompt with constraints, get back either an immediate payload
//! (text, structured fields, images) or an operation handle for a
//! long-running job (video) that a poll driver resolves. The adapter keeps
//! no state between calls; merging payloads into records and surfacing
//! errors are the caller's side effects.

use serde::{Deserialize, Serialize};

use crate::notify::ErrorCode;
use crate::record::Fields;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by the generation boundary.
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The required API key environment variable is not set.
    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },

    /// The HTTP request to the provider failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The provider returned a non-success HTTP status.
    #[error("API response error: status {status}")]
    ApiResponse { status: u16, body: String },

    /// The provider response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// A long-running job completed with a provider-side error.
    #[error("generation job failed: {0}")]
    JobFailed(String),

    /// The owning panel cancelled the poll loop (e.g. on unmount).
    #[error("generation cancelled")]
    Cancelled,

    /// The job was still pending after the configured attempt budget.
    #[error("generation still pending after {attempts} poll attempts")]
    PollTimeout { attempts: u32 },
}

impl ErrorCode for GenError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigParse(_) => "E_CONFIG_PARSE",
            Self::MissingApiKey { .. } => "E_MISSING_API_KEY",
            Self::ApiRequest(_) => "E_API_REQUEST",
            Self::ApiResponse { .. } => "E_API_RESPONSE",
            Self::ApiParse(_) => "E_API_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
            Self::JobFailed(_) => "E_JOB_FAILED",
            Self::Cancelled => "E_CANCELLED",
            Self::PollTimeout { .. } => "E_POLL_TIMEOUT",
        }
    }

    fn retryable(&self) -> bool {
        matches!(
            self,
            Self::ApiRequest(_) | Self::ApiResponse { status: 429 | 500..=599, .. } | Self::PollTimeout { .. }
        )
    }
}

// =============================================================================
// REQUEST
// =============================================================================

/// What kind of content the panel wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenKind {
    Text,
    Image,
    Video,
}

/// Optional constraints attached to a request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenConstraints {
    /// JSON schema for structured text output. The payload comes back as a
    /// field map instead of prose.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,

    /// Steering instruction prepended by the provider (tone, persona).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<String>,

    /// Aspect ratio for image and video output, e.g. `"16:9"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,

    /// Clip length for video output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u32>,
}

/// One generation request: prompt plus constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenRequest {
    pub kind: GenKind,
    pub prompt: String,
    #[serde(default)]
    pub constraints: GenConstraints,
}

impl GenRequest {
    #[must_use]
    pub fn text(prompt: impl Into<String>) -> Self {
        Self { kind: GenKind::Text, prompt: prompt.into(), constraints: GenConstraints::default() }
    }

    #[must_use]
    pub fn image(prompt: impl Into<String>) -> Self {
        Self { kind: GenKind::Image, prompt: prompt.into(), constraints: GenConstraints::default() }
    }

    #[must_use]
    pub fn video(prompt: impl Into<String>) -> Self {
        Self { kind: GenKind::Video, prompt: prompt.into(), constraints: GenConstraints::default() }
    }

    /// Request structured output conforming to a JSON schema.
    #[must_use]
    pub fn with_schema(mut self, schema: serde_json::Value) -> Self {
        self.constraints.response_schema = Some(schema);
        self
    }

    #[must_use]
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.constraints.system_instruction = Some(instruction.into());
        self
    }

    #[must_use]
    pub fn with_aspect_ratio(mut self, ratio: impl Into<String>) -> Self {
        self.constraints.aspect_ratio = Some(ratio.into());
        self
    }

    #[must_use]
    pub fn with_duration_secs(mut self, secs: u32) -> Self {
        self.constraints.duration_secs = Some(secs);
        self
    }
}

// =============================================================================
// PAYLOAD
// =============================================================================

/// Reference to generated binary media.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MediaRef {
    /// Hosted media the UI fetches on demand.
    Url { url: String },
    /// Base64 bytes returned inline by the provider.
    Inline { base64: String },
}

/// Generated content ready to merge into a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GenPayload {
    /// Plain prose for a single target field.
    Text { text: String },
    /// Structured fields from a JSON-schema response, merged key-by-key.
    Fields { fields: Fields },
    /// Binary media reference for a single target field.
    Media { mime_type: String, reference: MediaRef },
}

// =============================================================================
// OUTCOME & POLLING
// =============================================================================

/// Token for one in-flight long-running job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationHandle {
    /// Provider-assigned operation name, used verbatim when polling.
    pub name: String,
}

/// Result of submitting a request.
#[derive(Debug)]
pub enum GenOutcome {
    /// Text/image case: the payload is already here.
    Immediate(GenPayload),
    /// Video case: the caller must drive the poll loop to completion.
    Deferred(OperationHandle),
}

/// One poll observation of a long-running job.
#[derive(Debug, Clone, PartialEq)]
pub enum PollStatus {
    Pending,
    Done(GenPayload),
    Failed(String),
}

// =============================================================================
// CAPABILITY TRAIT
// =============================================================================

/// Provider-neutral async capability for content generation. Enables mocking
/// in tests.
#[async_trait::async_trait]
pub trait GenerateContent: Send + Sync {
    /// Submit a request.
    ///
    /// # Errors
    ///
    /// Returns a [`GenError`] if the request fails or the response is
    /// malformed.
    async fn generate(&self, request: &GenRequest) -> Result<GenOutcome, GenError>;

    /// Observe a long-running job once.
    ///
    /// # Errors
    ///
    /// Returns a [`GenError`] if the poll request itself fails; a job that
    /// completed with an error is reported as [`PollStatus::Failed`].
    async fn poll(&self, handle: &OperationHandle) -> Result<PollStatus, GenError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
