//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::config::ValidationError;
use crate::error::{ApiError, WorkflowError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error("Configuration is invalid ({} error(s))", .0.len())]
    InvalidConfig(Vec<ValidationError>),

    /// Run interrupted or timed out; `output` holds the files that did finish.
    #[error("Run stopped before completion")]
    Stopped { output: String },
}

impl CliError {
    /// 2 for bad input, 3 for an unreachable provider, 4 for a stopped run, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Api(ApiError::InvalidInput(_) | ApiError::Io(_)) => 2,
            CliError::Workflow(WorkflowError::ProviderUnreachable { .. }) => 3,
            CliError::Stopped { .. } => 4,
            _ => 1,
        }
    }

    /// Output still worth printing to stdout alongside the error.
    pub fn partial_output(&self) -> Option<&str> {
        match self {
            CliError::Stopped { output } => Some(output),
            _ => None,
        }
    }
}

/// Map errors to a string for CLI output.
pub fn map_error(e: &CliError) -> String {
    match e {
        CliError::InvalidConfig(errors) => {
            let mut out = e.to_string();
            for error in errors {
                out.push_str(&format!("\n  - {}", error));
            }
            out
        }
        _ => format!("Error: {}", e),
    }
}
