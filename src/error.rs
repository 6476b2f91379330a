//! Error types for the memoflow agent workflow.

use thiserror::Error;

/// Provider and configuration errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    #[error("Provider request failed: {0}")]
    ProviderRequestFailed(String),

    #[error("Provider unreachable: {0}")]
    ProviderUnreachable(String),

    #[error("Provider authentication failed: {0}")]
    ProviderAuthFailed(String),

    #[error("Provider rate limit exceeded: {0}")]
    ProviderRateLimit(String),

    #[error("Provider model not found: {0}")]
    ProviderModelNotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

/// Failure of a single model call.
///
/// Every generation, evaluation, and planning call reports its failures through
/// this type. The workflow absorbs it at the refinement-loop and planning
/// boundaries; it never reaches the caller directly.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Provider(#[from] ApiError),

    #[error("Response does not match schema '{schema}': {message}")]
    Schema {
        schema: &'static str,
        message: String,
    },

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("Generation cancelled")]
    Cancelled,
}

impl GenerationError {
    pub fn schema(schema: &'static str, message: impl Into<String>) -> Self {
        GenerationError::Schema {
            schema,
            message: message.into(),
        }
    }

    /// True when the model endpoint could not be used at all, as opposed to
    /// a call that reached the model and came back unusable.
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            GenerationError::Provider(
                ApiError::ProviderUnreachable(_)
                    | ApiError::ProviderAuthFailed(_)
                    | ApiError::ProviderNotConfigured(_)
            )
        )
    }
}

/// Errors surfaced to the caller of the workflow.
///
/// Distinct from an empty result: an empty `files` list means "no changes
/// required", while this type means the run could not happen.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Model provider unreachable after {attempts} planning attempt(s): {source}")]
    ProviderUnreachable {
        attempts: usize,
        #[source]
        source: GenerationError,
    },

    /// Workflow could not be assembled from configuration
    #[error(transparent)]
    Config(#[from] ApiError),
}
