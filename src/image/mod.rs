//! Image generation module.

mod provider;
pub mod providers;
mod style;
mod types;

pub use provider::ImageProvider;
pub use style::{StylePreset, COLORING_BOOK_NEGATIVE, COLORING_BOOK_SUFFIX};
pub use types::{
    GeneratedImage, GenerationMetadata, GenerationRequest, ImageFormat, ImageProviderKind,
};
