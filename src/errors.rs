// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for value-change subscriptions

use thiserror::Error;

/// Errors that can occur while batching and delivering value changes
#[derive(Debug, Error)]
pub enum ValueChangeError {
    /// The in-flight invocation was superseded by newer changes
    #[error("Invocation aborted by newer changes")]
    Aborted,

    /// The change handler reported a failure
    #[error("Change handler failed: {0}")]
    Callback(#[from] anyhow::Error),

    /// The change handler panicked while running a batch
    #[error("Change handler panicked: {0}")]
    HandlerPanicked(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No async runtime available to drive the scheduler
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl ValueChangeError {
    /// Whether this error is the expected outcome of a cancelled invocation
    pub fn is_abort(&self) -> bool {
        matches!(self, ValueChangeError::Aborted)
    }

    /// Wrap an arbitrary handler failure message
    pub fn callback(message: impl std::fmt::Display) -> Self {
        ValueChangeError::Callback(anyhow::anyhow!("{message}"))
    }
}

/// Result type for value-change operations
pub type ValueChangeResult<T> = Result<T, ValueChangeError>;

impl From<tokio::runtime::TryCurrentError> for ValueChangeError {
    fn from(err: tokio::runtime::TryCurrentError) -> Self {
        ValueChangeError::Runtime(err.to_string())
    }
}
