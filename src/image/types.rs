//! Core types for image generation.

use crate::error::{GenerationError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format.
    WebP,
}

impl ImageFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }
}

/// Image provider kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageProviderKind {
    /// Hugging Face hosted inference.
    HuggingFace,
}

impl std::fmt::Display for ImageProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HuggingFace => write!(f, "huggingface"),
        }
    }
}

/// Metadata about the generation process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationMetadata {
    /// Model used for generation.
    pub model: Option<String>,
    /// Round-trip duration in milliseconds.
    pub duration_ms: Option<u64>,
}

/// A fully resolved text-to-image request.
///
/// Built from a user prompt by [`StylePreset::request_for`](crate::image::StylePreset::request_for);
/// providers send it as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The enhanced prompt (user text plus style suffix).
    pub prompt: String,
    /// Concepts the model should steer away from.
    pub negative_prompt: Option<String>,
    /// Number of denoising steps.
    pub num_inference_steps: u32,
    /// Classifier-free guidance scale.
    pub guidance_scale: f32,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
}

impl GenerationRequest {
    /// Creates a request with the given prompt and default inference parameters.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            negative_prompt: None,
            num_inference_steps: 30,
            guidance_scale: 7.5,
            width: 512,
            height: 512,
        }
    }

    /// Sets the negative prompt.
    pub fn with_negative_prompt(mut self, negative: impl Into<String>) -> Self {
        self.negative_prompt = Some(negative.into());
        self
    }

    /// Sets the number of inference steps.
    pub fn with_steps(mut self, steps: u32) -> Self {
        self.num_inference_steps = steps;
        self
    }

    /// Sets the guidance scale.
    pub fn with_guidance_scale(mut self, scale: f32) -> Self {
        self.guidance_scale = scale;
        self
    }

    /// Sets the output dimensions.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

/// A generated image with its data and metadata.
#[derive(Debug, Clone)]
#[must_use = "generated image should be stored or displayed"]
pub struct GeneratedImage {
    data: Vec<u8>,
    format: ImageFormat,
    provider: ImageProviderKind,
    metadata: GenerationMetadata,
}

impl GeneratedImage {
    /// Creates a new generated image.
    pub fn new(
        data: Vec<u8>,
        format: ImageFormat,
        provider: ImageProviderKind,
        metadata: GenerationMetadata,
    ) -> Self {
        Self {
            data,
            format,
            provider,
            metadata,
        }
    }

    /// Creates a new generated image, detecting format from magic bytes.
    pub fn from_bytes(
        data: Vec<u8>,
        provider: ImageProviderKind,
        metadata: GenerationMetadata,
    ) -> Result<Self> {
        let format = ImageFormat::from_magic_bytes(&data)
            .ok_or_else(|| GenerationError::UnexpectedResponse("unknown image format".into()))?;
        Ok(Self::new(data, format, provider, metadata))
    }

    /// Raw image bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Image format.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Provider that generated this image.
    pub fn provider(&self) -> ImageProviderKind {
        self.provider
    }

    /// Generation metadata.
    pub fn metadata(&self) -> &GenerationMetadata {
        &self.metadata
    }

    /// Returns the size of the image data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Saves the image to the specified path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.data)?;
        Ok(())
    }

    /// Encodes the image data as base64.
    pub fn to_base64(&self) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }

    /// Returns the image as a data URL, ready to hand to anything that renders `src` attributes.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime_type(),
            self.to_base64()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{png_image, PNG_BYTES as PNG_MAGIC};

    const JPEG_MAGIC: [u8; 12] = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0, 0, 0, 0, 0];
    const WEBP_MAGIC: [u8; 12] = *b"RIFF\x00\x00\x00\x00WEBP";

    #[test]
    fn test_format_from_magic_bytes() {
        assert_eq!(
            ImageFormat::from_magic_bytes(&PNG_MAGIC),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(&JPEG_MAGIC),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(&WEBP_MAGIC),
            Some(ImageFormat::WebP)
        );
        assert_eq!(ImageFormat::from_magic_bytes(b"{\"error\":\"x\"}"), None);
        assert_eq!(ImageFormat::from_magic_bytes(&PNG_MAGIC[..4]), None);
    }

    #[test]
    fn test_from_bytes_rejects_unknown_format() {
        let result = GeneratedImage::from_bytes(
            b"not an image at all".to_vec(),
            ImageProviderKind::HuggingFace,
            GenerationMetadata::default(),
        );
        assert!(matches!(
            result,
            Err(GenerationError::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn test_data_url() {
        let image = png_image();
        assert!(image.to_data_url().starts_with("data:image/png;base64,iVBORw0KGgo"));
    }

    #[test]
    fn test_request_defaults() {
        let req = GenerationRequest::new("a cat");
        assert_eq!(req.num_inference_steps, 30);
        assert_eq!(req.guidance_scale, 7.5);
        assert_eq!((req.width, req.height), (512, 512));
        assert!(req.negative_prompt.is_none());
    }

    #[test]
    fn test_provider_kind_display() {
        assert_eq!(ImageProviderKind::HuggingFace.to_string(), "huggingface");
    }
}
