//! Core error types

use thiserror::Error;

use crate::output::OutputId;
use crate::policy::WindowId;

/// Errors raised by the view core
///
/// Only registry-integrity failures are reported. Transient backend states
/// (no surface yet, unmapped views) and stale interaction requests are not
/// errors and never show up here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Unknown view: {0}")]
    UnknownView(WindowId),

    #[error("View {0} is already registered")]
    DuplicateView(WindowId),

    #[error("Unknown output: {0}")]
    UnknownOutput(OutputId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CoreError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
