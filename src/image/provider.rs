//! Image provider trait.

use crate::error::Result;
use crate::image::types::{GeneratedImage, GenerationRequest, ImageProviderKind};
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for image generation providers.
///
/// A provider makes exactly one attempt per call; retrying is left to the caller.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Generates an image from the given request.
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImage>;

    /// Returns the kind of this provider.
    fn kind(&self) -> ImageProviderKind;

    /// Returns the name of this provider for display.
    fn name(&self) -> &str {
        match self.kind() {
            ImageProviderKind::HuggingFace => "Hugging Face Inference",
        }
    }
}

#[async_trait]
impl<P: ImageProvider + ?Sized> ImageProvider for Arc<P> {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImage> {
        (**self).generate(request).await
    }

    fn kind(&self) -> ImageProviderKind {
        (**self).kind()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
