use thiserror::Error;

/// Failure reported by the generation transport, before classification.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("authentication rejected: {message}")]
    Unauthenticated { message: String },
    #[error("Gemini API error {status}: {message}")]
    Status { status: u16, message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("could not decode response: {0}")]
    Decode(String),
}

/// User-facing failure of an enhancement. `Display` is the message shown in the output panel.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnhancementError {
    #[error("API key is invalid or missing. Please ensure it is configured correctly.")]
    Auth,
    #[error("The AI returned an empty response. Please try refining your prompt.")]
    EmptyResponse,
    #[error("Failed to generate enhanced prompt. The AI service may be temporarily unavailable.")]
    Service,
}

impl From<&ProviderError> for EnhancementError {
    fn from(err: &ProviderError) -> Self {
        match err {
            ProviderError::Unauthenticated { .. } => EnhancementError::Auth,
            // Untyped upstream failures only carry free text
            other if other.to_string().contains("API key") => EnhancementError::Auth,
            _ => EnhancementError::Service,
        }
    }
}
