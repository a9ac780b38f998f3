// Copyright (c) 2025 - Cowboy AI, Inc.
//! Change handlers - the user callback invoked for delivered transitions

use crate::abort::AbortSignal;
use crate::errors::ValueChangeResult;
use async_trait::async_trait;
use std::future::Future;

/// Trait for reacting to value changes
///
/// Invocations for one subscription never overlap: the next one starts only
/// after the previous one resolved. When abort is enabled, `signal` is
/// `Some` and fires once newer changes supersede the running batch; the
/// handler should then stop its work and may return
/// [`ValueChangeError::Aborted`](crate::errors::ValueChangeError::Aborted).
#[async_trait]
pub trait ChangeHandler<T>: Send + Sync {
    /// Handle one change from `previous` to `current`
    async fn on_change(
        &self,
        current: T,
        previous: T,
        signal: Option<AbortSignal>,
    ) -> ValueChangeResult<()>;
}

#[async_trait]
impl<T, F, Fut> ChangeHandler<T> for F
where
    T: Send + 'static,
    F: Fn(T, T, Option<AbortSignal>) -> Fut + Send + Sync,
    Fut: Future<Output = ValueChangeResult<()>> + Send + 'static,
{
    async fn on_change(
        &self,
        current: T,
        previous: T,
        signal: Option<AbortSignal>,
    ) -> ValueChangeResult<()> {
        (self)(current, previous, signal).await
    }
}
