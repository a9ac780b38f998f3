// Copyright (c) 2025 - Cowboy AI, Inc.
//! Subscription - the handle callers use to feed values in
//!
//! A subscription binds one observed value, one handler and one
//! configuration. Creating it spawns the poll scheduler on the current tokio
//! runtime; stopping or dropping it ends the timer.
//!
//! # Example
//!
//! ```rust,ignore
//! use cim_value_change::*;
//!
//! let subscription = Subscription::spawn(
//!     String::new(),
//!     |current: String, previous: String, _signal: Option<AbortSignal>| async move {
//!         println!("{previous:?} -> {current:?}");
//!         Ok::<(), ValueChangeError>(())
//!     },
//!     ValueChangeConfig::default(),
//! )?;
//!
//! subscription.report("a".to_string());
//! subscription.report("ab".to_string());
//! // ~100ms later the handler runs once with ("ab", "")
//! ```

use crate::change::ChangeLog;
use crate::config::ValueChangeConfig;
use crate::errors::ValueChangeResult;
use crate::handler::ChangeHandler;
use crate::scheduler::PollScheduler;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Identifier of one subscription, used to correlate its log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Generate a new time-ordered identifier
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// The underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to a running value-change subscription
pub struct Subscription<T> {
    id: SubscriptionId,
    config: ValueChangeConfig,
    log: Arc<Mutex<ChangeLog<T>>>,
    shutdown: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl<T> Subscription<T>
where
    T: Clone + PartialEq + Send + 'static,
{
    /// Start watching a value that currently equals `initial`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<H>(initial: T, handler: H, config: ValueChangeConfig) -> ValueChangeResult<Self>
    where
        H: ChangeHandler<T> + 'static,
    {
        Self::spawn_shared(initial, Arc::new(handler), config)
    }

    /// Start watching with the default configuration
    pub fn with_defaults<H>(initial: T, handler: H) -> ValueChangeResult<Self>
    where
        H: ChangeHandler<T> + 'static,
    {
        Self::spawn(initial, handler, ValueChangeConfig::default())
    }

    /// Start watching with a handler that is shared elsewhere
    pub fn spawn_shared(
        initial: T,
        handler: Arc<dyn ChangeHandler<T>>,
        config: ValueChangeConfig,
    ) -> ValueChangeResult<Self> {
        config.validate()?;
        let runtime = tokio::runtime::Handle::try_current()?;

        let id = SubscriptionId::new();
        let log = Arc::new(Mutex::new(ChangeLog::new(initial)));
        let shutdown = CancellationToken::new();

        let scheduler = PollScheduler::new(config.clone(), log.clone(), handler);
        let span = info_span!("value_change", subscription = %id);
        let task = runtime.spawn(scheduler.run(shutdown.clone()).instrument(span));

        info!(
            subscription = %id,
            reducer = %config.reducer,
            frequency_ms = config.frequency_millis(),
            abort_in_flight = config.abort_in_flight,
            "Value-change subscription started"
        );

        Ok(Self {
            id,
            config,
            log,
            shutdown,
            task: Some(task),
        })
    }

    /// Report the latest value.
    ///
    /// Returns `true` when it differs from the previous report and was queued
    /// for delivery; `false` when unchanged or the subscription is stopped.
    pub fn report(&self, value: T) -> bool {
        if self.shutdown.is_cancelled() {
            return false;
        }
        self.log.lock().report(value)
    }

    /// The most recently reported value
    pub fn last_value(&self) -> T {
        self.log.lock().last().clone()
    }
}

impl<T> Subscription<T> {
    /// Identifier used in this subscription's log lines
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Configuration the subscription was created with
    pub fn config(&self) -> &ValueChangeConfig {
        &self.config
    }

    /// Number of transitions waiting for the next batch
    pub fn pending(&self) -> usize {
        self.log.lock().queue().len()
    }

    /// Whether the timer has been stopped
    pub fn is_stopped(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Stop the timer. Idempotent.
    ///
    /// No new handler invocation starts afterwards; an invocation already in
    /// progress is abandoned.
    pub fn stop(&self) {
        if !self.shutdown.is_cancelled() {
            self.shutdown.cancel();
            info!(subscription = %self.id, "Value-change subscription stopped");
        }
    }

    /// Stop the timer and wait for the scheduler task to exit
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(subscription = %self.id, error = %e, "Scheduler task ended abnormally");
            }
        }
        debug!(subscription = %self.id, "Scheduler task joined");
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.shutdown.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
