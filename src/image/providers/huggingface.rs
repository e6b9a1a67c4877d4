//! Hugging Face hosted inference provider.

use crate::error::{GenerationError, Result};
use crate::image::provider::ImageProvider;
use crate::image::types::{
    GeneratedImage, GenerationMetadata, GenerationRequest, ImageFormat, ImageProviderKind,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";
const DEFAULT_TOKEN_ENV: &str = "HUGGING_FACE_TOKEN";

/// Text-to-image models served by the inference API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HuggingFaceModel {
    /// Stable Diffusion XL base 1.0.
    #[default]
    StableDiffusionXlBase,
    /// Any other repository id, e.g. `"runwayml/stable-diffusion-v1-5"`.
    Custom(String),
}

impl HuggingFaceModel {
    /// Returns the repository id used in the endpoint path.
    pub fn as_str(&self) -> &str {
        match self {
            Self::StableDiffusionXlBase => "stabilityai/stable-diffusion-xl-base-1.0",
            Self::Custom(id) => id,
        }
    }
}

impl From<&str> for HuggingFaceModel {
    fn from(id: &str) -> Self {
        if id == Self::StableDiffusionXlBase.as_str() {
            Self::StableDiffusionXlBase
        } else {
            Self::Custom(id.to_string())
        }
    }
}

/// Builder for HuggingFaceProvider.
#[derive(Debug, Clone)]
pub struct HuggingFaceProviderBuilder {
    api_key: Option<String>,
    token_env: String,
    model: HuggingFaceModel,
    base_url: String,
}

impl Default for HuggingFaceProviderBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            token_env: DEFAULT_TOKEN_ENV.to_string(),
            model: HuggingFaceModel::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl HuggingFaceProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API token. Without one, the token is read from the environment on every call.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the environment variable consulted for the token (default `HUGGING_FACE_TOKEN`).
    pub fn token_env(mut self, name: impl Into<String>) -> Self {
        self.token_env = name.into();
        self
    }

    /// Sets the model.
    pub fn model(mut self, model: impl Into<HuggingFaceModel>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the API root, e.g. for a dedicated endpoint or a test server.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builds the provider.
    pub fn build(self) -> Result<HuggingFaceProvider> {
        let client = reqwest::Client::builder().build()?;

        Ok(HuggingFaceProvider {
            client,
            api_key: self.api_key,
            token_env: self.token_env,
            model: self.model,
            base_url: self.base_url,
        })
    }
}

/// Hugging Face text-to-image provider.
pub struct HuggingFaceProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    token_env: String,
    model: HuggingFaceModel,
    base_url: String,
}

impl HuggingFaceProvider {
    /// Creates a new `HuggingFaceProviderBuilder`.
    pub fn builder() -> HuggingFaceProviderBuilder {
        HuggingFaceProviderBuilder::new()
    }

    /// Returns the configured model.
    pub fn model(&self) -> &HuggingFaceModel {
        &self.model
    }

    /// Returns the full inference URL for the configured model.
    pub fn endpoint(&self) -> String {
        format!("{}/models/{}", self.base_url, self.model.as_str())
    }

    /// Resolves the bearer token for one call.
    ///
    /// With no token the request is not sent at all, so the caller sees an
    /// `Auth` error (and the generic fallback message) instead of a service 401.
    fn resolve_token(&self) -> Result<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.token_env).ok())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                GenerationError::Auth(format!(
                    "{} not set and no API key provided",
                    self.token_env
                ))
            })
    }

    fn parse_error(status: u16, body: &[u8]) -> GenerationError {
        GenerationError::Api {
            status,
            message: extract_error_message(body),
        }
    }
}

#[async_trait]
impl ImageProvider for HuggingFaceProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImage> {
        let token = self.resolve_token()?;
        let url = self.endpoint();
        let body = InferenceRequest::from_generation_request(request);
        let start = Instant::now();

        tracing::debug!(url = %url, model = self.model.as_str(), "submitting inference request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .header("Content-Type", "application/json")
            .header("Accept", ImageFormat::Png.mime_type())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(Self::parse_error(status.as_u16(), &bytes));
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        let metadata = GenerationMetadata {
            model: Some(self.model.as_str().to_string()),
            duration_ms: Some(duration_ms),
        };

        // A success status can still carry a JSON error envelope instead of image bytes.
        let image =
            GeneratedImage::from_bytes(bytes.to_vec(), ImageProviderKind::HuggingFace, metadata)
                .map_err(|err| match extract_error_message(&bytes) {
                    Some(message) => GenerationError::Service(message),
                    None => err,
                })?;

        tracing::debug!(size = image.size(), duration_ms, "inference complete");
        Ok(image)
    }

    fn kind(&self) -> ImageProviderKind {
        ImageProviderKind::HuggingFace
    }
}

/// Pulls the `error` field out of a JSON error body.
///
/// The inference API sends either a string or a list of strings.
fn extract_error_message(body: &[u8]) -> Option<String> {
    let envelope: ErrorEnvelope = serde_json::from_slice(body).ok()?;
    let message = match envelope.error {
        ErrorField::Message(message) => message,
        ErrorField::Messages(messages) => messages.into_iter().next()?,
    };
    (!message.trim().is_empty()).then_some(message)
}

#[derive(Debug, Serialize)]
struct InferenceRequest {
    inputs: String,
    parameters: InferenceParameters,
}

#[derive(Debug, Serialize)]
struct InferenceParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    negative_prompt: Option<String>,
    num_inference_steps: u32,
    guidance_scale: f32,
    height: u32,
    width: u32,
}

impl InferenceRequest {
    fn from_generation_request(req: &GenerationRequest) -> Self {
        Self {
            inputs: req.prompt.clone(),
            parameters: InferenceParameters {
                negative_prompt: req.negative_prompt.clone(),
                num_inference_steps: req.num_inference_steps,
                guidance_scale: req.guidance_scale,
                height: req.height,
                width: req.width,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorField,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorField {
    Message(String),
    Messages(Vec<String>),
}
