//! Shared test fixtures.

use crate::image::{GeneratedImage, GenerationMetadata, ImageFormat, ImageProviderKind};

/// Smallest byte string recognised as a PNG.
pub(crate) const PNG_BYTES: [u8; 12] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

pub(crate) fn png_image() -> GeneratedImage {
    GeneratedImage::new(
        PNG_BYTES.to_vec(),
        ImageFormat::Png,
        ImageProviderKind::HuggingFace,
        GenerationMetadata::default(),
    )
}
