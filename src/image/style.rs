//! Style presets applied to every user prompt.

use crate::image::types::GenerationRequest;

/// Suffix that turns any prompt into a coloring-book page.
pub const COLORING_BOOK_SUFFIX: &str =
    "simple line drawing, black and white, coloring book style, clean lines, minimalistic design";

/// Negative prompt paired with [`COLORING_BOOK_SUFFIX`].
pub const COLORING_BOOK_NEGATIVE: &str =
    "color, shading, realistic, detailed, complexity, texture, gradients";

/// Fixed text and inference parameters combined with the user's prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct StylePreset {
    /// Appended to the prompt after a comma.
    pub suffix: String,
    /// Sent as the negative prompt.
    pub negative_prompt: String,
    /// Number of denoising steps.
    pub num_inference_steps: u32,
    /// Classifier-free guidance scale.
    pub guidance_scale: f32,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
}

impl StylePreset {
    /// Black-and-white line art at 512x512.
    pub fn coloring_book() -> Self {
        Self {
            suffix: COLORING_BOOK_SUFFIX.to_string(),
            negative_prompt: COLORING_BOOK_NEGATIVE.to_string(),
            num_inference_steps: 30,
            guidance_scale: 7.5,
            width: 512,
            height: 512,
        }
    }

    /// Returns the prompt with the style suffix appended.
    pub fn enhance(&self, prompt: &str) -> String {
        if self.suffix.is_empty() {
            return prompt.to_string();
        }
        format!("{}, {}", prompt, self.suffix)
    }

    /// Builds the request sent to the provider for `prompt`.
    pub fn request_for(&self, prompt: &str) -> GenerationRequest {
        GenerationRequest::new(self.enhance(prompt))
            .with_negative_prompt(self.negative_prompt.clone())
            .with_steps(self.num_inference_steps)
            .with_guidance_scale(self.guidance_scale)
            .with_size(self.width, self.height)
    }
}

impl Default for StylePreset {
    fn default() -> Self {
        Self::coloring_book()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enhance_appends_suffix() {
        let preset = StylePreset::coloring_book();
        assert_eq!(
            preset.enhance("a cat"),
            "a cat, simple line drawing, black and white, coloring book style, clean lines, minimalistic design"
        );
    }

    #[test]
    fn test_request_carries_fixed_parameters() {
        let req = StylePreset::default().request_for("a dog");

        assert!(req.prompt.starts_with("a dog, simple line drawing"));
        assert_eq!(req.negative_prompt.as_deref(), Some(COLORING_BOOK_NEGATIVE));
        assert_eq!(req.num_inference_steps, 30);
        assert_eq!(req.guidance_scale, 7.5);
        assert_eq!(req.width, 512);
        assert_eq!(req.height, 512);
    }

    #[test]
    fn test_empty_suffix_leaves_prompt_alone() {
        let preset = StylePreset {
            suffix: String::new(),
            ..StylePreset::coloring_book()
        };
        assert_eq!(preset.enhance("a tree"), "a tree");
    }
}
