#![warn(missing_docs)]
//! Colorbook - coloring-book page generation from text prompts.
//!
//! A session turns prompts into black-and-white line drawings through a hosted
//! text-to-image API, keeps up to three of them, and then offers review and
//! purchase actions.
//!
//! # Quick Start
//!
//! ```no_run
//! use colorbook::{GenerationWorkflow, HuggingFaceProvider, Submission};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = HuggingFaceProvider::builder().build()?;
//!     let mut session = GenerationWorkflow::new(provider);
//!
//!     session.set_prompt("a cat sleeping on a windowsill");
//!     match session.submit_prompt().await? {
//!         Submission::Generated { index } => {
//!             let page = session.gallery().get(index).unwrap();
//!             page.save("cat.png")?;
//!         }
//!         Submission::Failed { message } => eprintln!("Error: {message}"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `huggingface` (default): Hugging Face hosted inference provider
//! - `cli`: the `colorbook` command-line front-end

mod error;
pub mod image;
pub mod workflow;

#[cfg(test)]
mod fixtures;

// Re-export error types at crate root
pub use error::{GenerationError, Rejection, Result, FALLBACK_ERROR_MESSAGE};

pub use image::{
    GeneratedImage, GenerationMetadata, GenerationRequest, ImageFormat, ImageProvider,
    ImageProviderKind, StylePreset,
};

#[cfg(feature = "huggingface")]
pub use image::providers::{HuggingFaceModel, HuggingFaceProvider, HuggingFaceProviderBuilder};

pub use workflow::{
    Gallery, GenerationWorkflow, NoopHooks, ReviewHooks, Submission, WorkflowState,
    GALLERY_CAPACITY,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{GenerationError, Rejection, Result};
    pub use crate::image::{GeneratedImage, GenerationRequest, ImageProvider, StylePreset};
    pub use crate::workflow::{GenerationWorkflow, ReviewHooks, Submission};

    #[cfg(feature = "huggingface")]
    pub use crate::image::providers::HuggingFaceProvider;
}
