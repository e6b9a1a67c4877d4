//! Error types for image generation and the session workflow.

/// Message shown when a failed generation carries no service-provided text.
pub const FALLBACK_ERROR_MESSAGE: &str = "Failed to generate image";

/// Errors that can occur while talking to an image generation service.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// API token missing or rejected before the request was sent.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned a non-success status.
    #[error("API error: {status} - {}", .message.as_deref().unwrap_or("no details"))]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error text extracted from the response body, if any.
        message: Option<String>,
    },

    /// API answered with a success status but the body was an error envelope.
    #[error("service error: {0}")]
    Service(String),

    /// Response body was neither an image nor an error envelope.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error (e.g., saving file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GenerationError {
    /// Returns the error text supplied by the remote service, if there was one.
    pub fn service_message(&self) -> Option<&str> {
        let message = match self {
            Self::Api {
                message: Some(message),
                ..
            } => message.as_str(),
            Self::Service(message) => message.as_str(),
            _ => return None,
        };
        (!message.trim().is_empty()).then_some(message)
    }

    /// Returns the text to show the user: the service message, or a generic fallback.
    pub fn user_message(&self) -> String {
        self.service_message()
            .unwrap_or(FALLBACK_ERROR_MESSAGE)
            .to_string()
    }
}

/// Reasons a workflow command was refused without touching the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// The prompt is empty.
    #[error("Please enter a prompt.")]
    EmptyPrompt,

    /// The gallery already holds the maximum number of images.
    #[error("Maximum number of images reached.")]
    GalleryFull,

    /// Another generation is still in flight.
    #[error("A generation is already in progress.")]
    Busy,

    /// Review and purchase are only offered once the gallery is full.
    #[error("Review is available once the gallery is full.")]
    ReviewUnavailable,
}

/// Result type alias for generation operations.
pub type Result<T> = std::result::Result<T, GenerationError>;
