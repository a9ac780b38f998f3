// Copyright (c) 2025 - Cowboy AI, Inc.
//! Cooperative Abort Signals
//!
//! The scheduler owns an [`AbortController`] per in-flight batch and hands
//! each handler invocation an [`AbortSignal`]. Aborting never preempts the
//! handler: long-running work checks the signal (or races against
//! [`AbortSignal::aborted`]) and stops its own side effects.
//!
//! # Examples
//!
//! ```rust,ignore
//! async fn fetch(value: String, signal: Option<AbortSignal>) -> ValueChangeResult<()> {
//!     let work = slow_lookup(value);
//!     match signal {
//!         Some(signal) => signal.guard(work).await?,
//!         None => work.await,
//!     };
//!     Ok(())
//! }
//! ```

use crate::errors::{ValueChangeError, ValueChangeResult};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Raises the abort for one in-flight batch
#[derive(Debug, Clone, Default)]
pub struct AbortController {
    token: CancellationToken,
}

impl AbortController {
    /// Create a controller that has not been aborted
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Signal to be handed to handler invocations
    pub fn signal(&self) -> AbortSignal {
        AbortSignal {
            token: self.token.clone(),
        }
    }

    /// Fire the abort; idempotent
    pub fn abort(&self) {
        self.token.cancel();
    }

    /// Whether [`AbortController::abort`] has been called
    pub fn is_aborted(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Read side of an [`AbortController`], observed by handlers
#[derive(Debug, Clone)]
pub struct AbortSignal {
    token: CancellationToken,
}

impl AbortSignal {
    /// Whether the owning batch has been superseded
    pub fn is_aborted(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolve once the abort fires
    pub async fn aborted(&self) {
        self.token.cancelled().await
    }

    /// `Err(Aborted)` if the abort already fired
    pub fn check(&self) -> ValueChangeResult<()> {
        if self.is_aborted() {
            Err(ValueChangeError::Aborted)
        } else {
            Ok(())
        }
    }

    /// Run `work` unless the abort fires first, in which case `work` is
    /// dropped and `Err(Aborted)` is returned.
    pub async fn guard<F>(&self, work: F) -> ValueChangeResult<F::Output>
    where
        F: Future,
    {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(ValueChangeError::Aborted),
            output = work => Ok(output),
        }
    }
}
