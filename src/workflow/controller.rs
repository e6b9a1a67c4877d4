//! The generation workflow controller.

use crate::error::{GenerationError, Rejection};
use crate::image::{GeneratedImage, GenerationRequest, ImageProvider, StylePreset};
use crate::workflow::state::{reduce, Effect, Gallery, WorkflowEvent, WorkflowState};

/// Acknowledgement returned by [`GenerationWorkflow::review`].
pub const REVIEW_NOTICE: &str = "Reviewing coloring book!";
/// Acknowledgement returned by [`GenerationWorkflow::purchase`].
pub const PURCHASE_NOTICE: &str = "Proceeding to purchase!";

/// Extension points fired by the review and purchase actions.
pub trait ReviewHooks: Send + Sync {
    /// Called when the user chooses to review the finished gallery.
    fn on_review(&self, _gallery: &Gallery) {}

    /// Called when the user chooses to purchase the finished gallery.
    fn on_purchase(&self, _gallery: &Gallery) {}
}

/// Hooks that do nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl ReviewHooks for NoopHooks {}

/// How a submission that passed the guards ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// An image was stored at this gallery index.
    Generated {
        /// Position in the gallery.
        index: usize,
    },
    /// The request failed; this message is now the session's last error.
    Failed {
        /// Displayable error text.
        message: String,
    },
}

/// One user session: prompt, gallery, busy flag and last error, plus the provider that fills the gallery.
///
/// Commands take `&mut self`, so a single owner drives all transitions. Front-ends that
/// need to keep reading input while a request is in flight can split a submission into
/// [`begin`](Self::begin) and [`complete`](Self::complete); a second `begin` in between
/// is refused with [`Rejection::Busy`].
pub struct GenerationWorkflow<P> {
    provider: P,
    style: StylePreset,
    hooks: Box<dyn ReviewHooks>,
    state: WorkflowState,
}

impl<P: ImageProvider> GenerationWorkflow<P> {
    /// Creates an empty session backed by `provider`, using the coloring-book style.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            style: StylePreset::default(),
            hooks: Box::new(NoopHooks),
            state: WorkflowState::default(),
        }
    }

    /// Replaces the style preset.
    pub fn with_style(mut self, style: StylePreset) -> Self {
        self.style = style;
        self
    }

    /// Installs review/purchase hooks.
    pub fn with_hooks(mut self, hooks: impl ReviewHooks + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    /// The provider this session generates with.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Read-only view of the session state.
    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// Current prompt text.
    pub fn prompt(&self) -> &str {
        &self.state.prompt
    }

    /// Images generated so far.
    pub fn gallery(&self) -> &Gallery {
        &self.state.gallery
    }

    /// True while a request is in flight.
    pub fn is_busy(&self) -> bool {
        self.state.busy
    }

    /// Message from the most recent failure, if the last submission failed.
    pub fn last_error(&self) -> Option<&str> {
        self.state.last_error.as_deref()
    }

    /// See [`WorkflowState::is_input_disabled`].
    pub fn is_input_disabled(&self) -> bool {
        self.state.is_input_disabled()
    }

    /// See [`WorkflowState::button_label`].
    pub fn button_label(&self) -> &'static str {
        self.state.button_label()
    }

    /// See [`WorkflowState::show_review_prompt`].
    pub fn show_review_prompt(&self) -> bool {
        self.state.show_review_prompt()
    }

    /// See [`WorkflowState::error_banner`].
    pub fn error_banner(&self) -> Option<String> {
        self.state.error_banner()
    }

    /// Replaces the prompt text.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.dispatch(WorkflowEvent::PromptChanged(prompt.into()));
    }

    /// Runs the guards and, if they pass, marks the session busy and returns the request to send.
    pub fn begin(&mut self) -> Result<GenerationRequest, Rejection> {
        match self.dispatch(WorkflowEvent::GenerateRequested) {
            Effect::Generate(prompt) => Ok(self.style.request_for(&prompt)),
            Effect::Alert(rejection) => {
                tracing::debug!(%rejection, "submission refused");
                Err(rejection)
            }
            other => unreachable!("generate request produced {other:?}"),
        }
    }

    /// Applies the outcome of the request started by [`begin`](Self::begin).
    pub fn complete(
        &mut self,
        result: std::result::Result<GeneratedImage, GenerationError>,
    ) -> Submission {
        match result {
            Ok(image) => {
                let size = image.size();
                match self.dispatch(WorkflowEvent::GenerationSucceeded(image)) {
                    Effect::Stored(index) => {
                        tracing::info!(index, size, "image added to gallery");
                        Submission::Generated { index }
                    }
                    _ => {
                        // Only reachable when `complete` is called without a matching `begin`.
                        let message = self
                            .state
                            .last_error
                            .clone()
                            .unwrap_or_else(|| Rejection::GalleryFull.to_string());
                        tracing::warn!("discarding image: {message}");
                        Submission::Failed { message }
                    }
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "image generation failed");
                let message = err.user_message();
                self.dispatch(WorkflowEvent::GenerationFailed(message.clone()));
                Submission::Failed { message }
            }
        }
    }

    /// Submits the current prompt: guards, one provider call, then the state update.
    pub async fn submit_prompt(&mut self) -> Result<Submission, Rejection> {
        let request = self.begin()?;
        let result = self.provider.generate(&request).await;
        Ok(self.complete(result))
    }

    /// Fires the review hook. Only available once the gallery is full.
    pub fn review(&self) -> Result<&'static str, Rejection> {
        self.ensure_review_available()?;
        self.hooks.on_review(&self.state.gallery);
        Ok(REVIEW_NOTICE)
    }

    /// Fires the purchase hook. Only available once the gallery is full.
    pub fn purchase(&self) -> Result<&'static str, Rejection> {
        self.ensure_review_available()?;
        self.hooks.on_purchase(&self.state.gallery);
        Ok(PURCHASE_NOTICE)
    }

    fn ensure_review_available(&self) -> Result<(), Rejection> {
        if self.state.show_review_prompt() {
            Ok(())
        } else {
            Err(Rejection::ReviewUnavailable)
        }
    }

    fn dispatch(&mut self, event: WorkflowEvent) -> Effect {
        let (next, effect) = reduce(std::mem::take(&mut self.state), event);
        self.state = next;
        effect
    }
}
