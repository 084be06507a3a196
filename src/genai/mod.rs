//! Genai — the async content-generation boundary.
//!
//! DESIGN
//! ======
//! Panels hold a `dyn GenerateContent` capability; [`GenClient`] is the
//! concrete implementation, configured from environment variables and
//! dispatching each request kind to its configured model. Text and image
//! requests resolve immediately; video returns an operation handle the
//! [`poll`] driver resolves under an explicit, cancellable policy.

pub mod config;
pub mod gemini;
pub mod poll;
pub mod types;

use config::{GenConfig, PollPolicy};
pub use types::GenerateContent;
use types::{GenError, GenKind, GenOutcome, GenRequest, OperationHandle, PollStatus};

// =============================================================================
// CLIENT
// =============================================================================

/// Concrete generation client over the Gemini API.
pub struct GenClient {
    inner: gemini::GeminiClient,
    config: GenConfig,
}

impl GenClient {
    /// Build a client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing, a config value fails to
    /// parse, or the HTTP client cannot be built.
    pub fn from_env() -> Result<Self, GenError> {
        Self::from_config(GenConfig::from_env()?)
    }

    /// Build a client from a parsed typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: GenConfig) -> Result<Self, GenError> {
        let inner = gemini::GeminiClient::new(config.api_key.clone(), config.base_url.clone(), config.timeouts)?;
        Ok(Self { inner, config })
    }

    /// The poll policy callers hand to [`poll::poll_until_done`].
    #[must_use]
    pub fn poll_policy(&self) -> PollPolicy {
        self.config.poll
    }

    fn model_for(&self, kind: GenKind) -> &str {
        match kind {
            GenKind::Text => &self.config.text_model,
            GenKind::Image => &self.config.image_model,
            GenKind::Video => &self.config.video_model,
        }
    }
}

#[async_trait::async_trait]
impl GenerateContent for GenClient {
    async fn generate(&self, request: &GenRequest) -> Result<GenOutcome, GenError> {
        let model = self.model_for(request.kind);
        match request.kind {
            GenKind::Text | GenKind::Image => {
                let payload = self.inner.generate_content(model, request).await?;
                Ok(GenOutcome::Immediate(payload))
            }
            GenKind::Video => {
                let handle = self.inner.start_video(model, request).await?;
                Ok(GenOutcome::Deferred(handle))
            }
        }
    }

    async fn poll(&self, handle: &OperationHandle) -> Result<PollStatus, GenError> {
        self.inner.poll_operation(handle).await
    }
}
