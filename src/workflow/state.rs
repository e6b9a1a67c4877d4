//! Session state and its pure transition function.

use crate::error::Rejection;
use crate::image::GeneratedImage;

/// Maximum number of images a session may hold.
pub const GALLERY_CAPACITY: usize = 3;

/// Ordered, capacity-bounded collection of generated images.
#[derive(Debug, Clone, Default)]
pub struct Gallery {
    images: Vec<GeneratedImage>,
}

impl Gallery {
    /// Creates an empty gallery.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an image, handing it back if the gallery is already full.
    pub fn push(&mut self, image: GeneratedImage) -> Result<usize, GeneratedImage> {
        if self.is_full() {
            return Err(image);
        }
        self.images.push(image);
        Ok(self.images.len() - 1)
    }

    /// Number of images held.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Returns true if no images have been generated yet.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Returns true once [`GALLERY_CAPACITY`] images are held.
    pub fn is_full(&self) -> bool {
        self.images.len() >= GALLERY_CAPACITY
    }

    /// Returns the image at `index`.
    pub fn get(&self, index: usize) -> Option<&GeneratedImage> {
        self.images.get(index)
    }

    /// Iterates images in generation order.
    pub fn iter(&self) -> std::slice::Iter<'_, GeneratedImage> {
        self.images.iter()
    }

    /// Alt text for the image at `index`.
    pub fn alt_text(index: usize) -> String {
        format!("Coloring Book Page {}", index + 1)
    }
}

impl<'a> IntoIterator for &'a Gallery {
    type Item = &'a GeneratedImage;
    type IntoIter = std::slice::Iter<'a, GeneratedImage>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Everything a session knows.
#[derive(Debug, Clone, Default)]
pub struct WorkflowState {
    /// Current prompt text.
    pub prompt: String,
    /// Images generated so far.
    pub gallery: Gallery,
    /// True while a generation request is in flight.
    pub busy: bool,
    /// Message from the most recent failed generation.
    pub last_error: Option<String>,
}

/// Inputs that drive the session.
#[derive(Debug, Clone)]
pub enum WorkflowEvent {
    /// The user edited the prompt.
    PromptChanged(String),
    /// The user pressed generate.
    GenerateRequested,
    /// The in-flight request returned an image.
    GenerationSucceeded(GeneratedImage),
    /// The in-flight request failed with a displayable message.
    GenerationFailed(String),
}

/// What the caller must do after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Nothing.
    None,
    /// Show a notice. Guard rejections leave the state untouched.
    Alert(Rejection),
    /// Issue one generation call for this prompt.
    Generate(String),
    /// An image was appended at this gallery index.
    Stored(usize),
}

impl WorkflowState {
    /// Checks the submission guards in order: empty prompt, full gallery, busy.
    pub fn check_submit(&self) -> Result<(), Rejection> {
        if self.prompt.is_empty() {
            return Err(Rejection::EmptyPrompt);
        }
        if self.gallery.is_full() {
            return Err(Rejection::GalleryFull);
        }
        if self.busy {
            return Err(Rejection::Busy);
        }
        Ok(())
    }

    /// Input is disabled while generating or once the gallery is full.
    pub fn is_input_disabled(&self) -> bool {
        self.busy || self.gallery.is_full()
    }

    /// Label for the generate button.
    pub fn button_label(&self) -> &'static str {
        if self.busy {
            "Generating…"
        } else if self.gallery.is_full() {
            "Max Images Reached"
        } else {
            "Generate"
        }
    }

    /// Whether the review/purchase prompt should be shown.
    pub fn show_review_prompt(&self) -> bool {
        self.gallery.is_full()
    }

    /// Banner text for the last error, if any.
    pub fn error_banner(&self) -> Option<String> {
        self.last_error.as_ref().map(|e| format!("Error: {}", e))
    }
}

/// Applies `event` to `state`, returning the next state and the effect to carry out.
pub fn reduce(mut state: WorkflowState, event: WorkflowEvent) -> (WorkflowState, Effect) {
    match event {
        WorkflowEvent::PromptChanged(prompt) => {
            state.prompt = prompt;
            (state, Effect::None)
        }
        WorkflowEvent::GenerateRequested => {
            if let Err(rejection) = state.check_submit() {
                return (state, Effect::Alert(rejection));
            }
            state.busy = true;
            state.last_error = None;
            let prompt = state.prompt.clone();
            (state, Effect::Generate(prompt))
        }
        WorkflowEvent::GenerationSucceeded(image) => {
            state.busy = false;
            match state.gallery.push(image) {
                Ok(index) => (state, Effect::Stored(index)),
                Err(_) => {
                    state.last_error = Some(Rejection::GalleryFull.to_string());
                    (state, Effect::Alert(Rejection::GalleryFull))
                }
            }
        }
        WorkflowEvent::GenerationFailed(message) => {
            state.busy = false;
            state.last_error = Some(message);
            (state, Effect::None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::png_image as image;
    use proptest::prelude::*;

    fn full_state() -> WorkflowState {
        let mut state = WorkflowState {
            prompt: "a cat".into(),
            ..Default::default()
        };
        for _ in 0..GALLERY_CAPACITY {
            state.gallery.push(image()).unwrap();
        }
        state
    }

    #[test]
    fn test_empty_prompt_rejected_without_change() {
        let state = WorkflowState {
            last_error: Some("old".into()),
            ..Default::default()
        };
        let (next, effect) = reduce(state, WorkflowEvent::GenerateRequested);

        assert_eq!(effect, Effect::Alert(Rejection::EmptyPrompt));
        assert!(!next.busy);
        assert_eq!(next.last_error.as_deref(), Some("old"));
        assert!(next.gallery.is_empty());
    }

    #[test]
    fn test_full_gallery_rejected() {
        let (next, effect) = reduce(full_state(), WorkflowEvent::GenerateRequested);

        assert_eq!(effect, Effect::Alert(Rejection::GalleryFull));
        assert_eq!(next.gallery.len(), GALLERY_CAPACITY);
        assert!(!next.busy);
    }

    #[test]
    fn test_empty_prompt_checked_before_capacity() {
        let mut state = full_state();
        state.prompt.clear();
        let (_, effect) = reduce(state, WorkflowEvent::GenerateRequested);
        assert_eq!(effect, Effect::Alert(Rejection::EmptyPrompt));
    }

    #[test]
    fn test_generate_sets_busy_and_clears_error() {
        let state = WorkflowState {
            prompt: "a cat".into(),
            last_error: Some("rate limited".into()),
            ..Default::default()
        };
        let (next, effect) = reduce(state, WorkflowEvent::GenerateRequested);

        assert_eq!(effect, Effect::Generate("a cat".into()));
        assert!(next.busy);
        assert!(next.last_error.is_none());
    }

    #[test]
    fn test_second_request_while_busy_rejected() {
        let state = WorkflowState {
            prompt: "a cat".into(),
            ..Default::default()
        };
        let (state, _) = reduce(state, WorkflowEvent::GenerateRequested);
        let (state, effect) = reduce(state, WorkflowEvent::GenerateRequested);

        assert_eq!(effect, Effect::Alert(Rejection::Busy));
        assert!(state.busy);
    }

    #[test]
    fn test_success_appends_in_order() {
        let mut state = WorkflowState {
            prompt: "a cat".into(),
            ..Default::default()
        };
        for expected in 0..GALLERY_CAPACITY {
            let (s, _) = reduce(state, WorkflowEvent::GenerateRequested);
            let (s, effect) = reduce(s, WorkflowEvent::GenerationSucceeded(image()));
            assert_eq!(effect, Effect::Stored(expected));
            assert!(!s.busy);
            state = s;
        }
        assert!(state.gallery.is_full());
    }

    #[test]
    fn test_failure_records_error() {
        let state = WorkflowState {
            prompt: "a dog".into(),
            ..Default::default()
        };
        let (state, _) = reduce(state, WorkflowEvent::GenerateRequested);
        let (state, effect) = reduce(state, WorkflowEvent::GenerationFailed("rate limited".into()));

        assert_eq!(effect, Effect::None);
        assert!(!state.busy);
        assert!(state.gallery.is_empty());
        assert_eq!(state.error_banner().as_deref(), Some("Error: rate limited"));
    }

    #[test]
    fn test_stray_success_on_full_gallery_is_dropped() {
        let (state, effect) = reduce(full_state(), WorkflowEvent::GenerationSucceeded(image()));
        assert_eq!(effect, Effect::Alert(Rejection::GalleryFull));
        assert_eq!(state.gallery.len(), GALLERY_CAPACITY);
        assert_eq!(
            state.last_error.as_deref(),
            Some("Maximum number of images reached.")
        );
    }

    #[test]
    fn test_derived_views() {
        let mut state = WorkflowState::default();
        assert!(!state.is_input_disabled());
        assert_eq!(state.button_label(), "Generate");
        assert!(!state.show_review_prompt());

        state.busy = true;
        assert!(state.is_input_disabled());
        assert_eq!(state.button_label(), "Generating…");

        let state = full_state();
        assert!(state.is_input_disabled());
        assert_eq!(state.button_label(), "Max Images Reached");
        assert!(state.show_review_prompt());
    }

    #[test]
    fn test_alt_text() {
        assert_eq!(Gallery::alt_text(0), "Coloring Book Page 1");
        assert_eq!(Gallery::alt_text(2), "Coloring Book Page 3");
    }

    fn event_strategy() -> impl Strategy<Value = WorkflowEvent> {
        prop_oneof![
            prop_oneof![Just(""), Just("a cat"), Just("a dog")]
                .prop_map(|p| WorkflowEvent::PromptChanged(p.to_string())),
            Just(WorkflowEvent::GenerateRequested),
            Just(()).prop_map(|_| WorkflowEvent::GenerationSucceeded(image())),
            Just(WorkflowEvent::GenerationFailed("boom".into())),
        ]
    }

    proptest! {
        #[test]
        fn gallery_never_exceeds_capacity(events in prop::collection::vec(event_strategy(), 0..40)) {
            let mut state = WorkflowState::default();
            for event in events {
                let before = state.gallery.len();
                let (next, effect) = reduce(state, event);

                prop_assert!(next.gallery.len() <= GALLERY_CAPACITY);
                prop_assert!(next.gallery.len() - before <= 1);
                if let Effect::Alert(_) = effect {
                    prop_assert_eq!(next.gallery.len(), before);
                }
                prop_assert_eq!(
                    next.is_input_disabled(),
                    next.busy || next.gallery.len() == GALLERY_CAPACITY
                );
                prop_assert_eq!(next.show_review_prompt(), next.gallery.len() == GALLERY_CAPACITY);
                state = next;
            }
        }
    }
}
