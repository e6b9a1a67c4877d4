//! Prompt-to-gallery session workflow.

mod controller;
mod state;

pub use controller::{
    GenerationWorkflow, NoopHooks, ReviewHooks, Submission, PURCHASE_NOTICE, REVIEW_NOTICE,
};
pub use state::{reduce, Effect, Gallery, WorkflowEvent, WorkflowState, GALLERY_CAPACITY};
