// Copyright (c) 2025 - Cowboy AI, Inc.
//! Poll Scheduler
//!
//! Drives one subscription: every `frequency` it looks at the change queue
//! and either starts a batch, leaves a running batch alone, or aborts the
//! running batch in favour of newer changes.
//!
//! # State Machine
//!
//! ```text
//!            tick, queue empty
//!          ┌────────────────┐
//!          ▼                │
//!       ┌──────┐  tick, queue non-empty   ┌─────────┐
//!       │ Idle │ ───────────────────────> │ Running │ ──┐ tick: skip, or
//!       └──────┘  drain + start reducer   └─────────┘ <─┘ abort + requeue batch
//!          ▲                                   │
//!          └───────── batch resolved ──────────┘
//!                (ok / aborted / failed)
//! ```
//!
//! The running batch is polled inside the scheduler task itself, next to
//! the timer, so ticks keep arriving while a handler is suspended and no two
//! batches of the same subscription can ever overlap.
//!
//! # Error Policy
//!
//! Nothing a handler does can stop the loop. Cancellation errors are
//! expected and only traced at debug level; handler failures are logged as
//! warnings and handler panics as errors. Either way the scheduler goes back
//! to idle and keeps ticking.

use crate::abort::AbortController;
use crate::change::{ChangeLog, Transition};
use crate::config::ValueChangeConfig;
use crate::errors::{ValueChangeError, ValueChangeResult};
use crate::handler::ChangeHandler;
use futures::future::{BoxFuture, FutureExt};
use parking_lot::Mutex;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn};

type BatchFuture = BoxFuture<'static, ValueChangeResult<()>>;

/// What a single timer tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TickOutcome {
    /// Nothing queued and nothing running
    Idle,
    /// A new batch was drained and handed to the reducer
    Started {
        /// Number of transitions in the batch
        transitions: usize,
    },
    /// A batch is running and was left alone
    Skipped,
    /// The running batch was aborted and put back at the front of the queue
    Aborted {
        /// Number of transitions requeued
        requeued: usize,
    },
}

/// The batch currently being delivered
struct InFlight<T> {
    /// Transitions of the batch, kept only while they may need requeueing
    batch: Vec<Transition<T>>,
    controller: Option<AbortController>,
    requeued: bool,
}

/// Timer-driven batch scheduler owned by one subscription
pub struct PollScheduler<T> {
    config: ValueChangeConfig,
    log: Arc<Mutex<ChangeLog<T>>>,
    handler: Arc<dyn ChangeHandler<T>>,
    in_flight: Option<InFlight<T>>,
}

impl<T> PollScheduler<T>
where
    T: Clone + PartialEq + Send + 'static,
{
    /// Create a scheduler consuming `log` and delivering to `handler`
    pub fn new(
        config: ValueChangeConfig,
        log: Arc<Mutex<ChangeLog<T>>>,
        handler: Arc<dyn ChangeHandler<T>>,
    ) -> Self {
        Self {
            config,
            log,
            handler,
            in_flight: None,
        }
    }

    /// Whether a batch is currently in flight
    pub fn is_running(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Run the timer loop until `shutdown` fires.
    ///
    /// The first tick happens one `frequency` after the call. On shutdown any
    /// in-flight batch is dropped without further handler calls.
    pub async fn run(mut self, shutdown: CancellationToken) {
        let frequency = self.config.frequency;
        let mut ticker = tokio::time::interval_at(Instant::now() + frequency, frequency);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut batch: Option<BatchFuture> = None;

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    if batch.is_some() {
                        debug!("Abandoning in-flight batch on shutdown");
                    }
                    break;
                }

                result = async {
                    match batch.as_mut() {
                        Some(running) => running.await,
                        None => std::future::pending().await,
                    }
                }, if batch.is_some() => {
                    batch = None;
                    self.finish(result);
                }

                _ = ticker.tick() => {
                    let (outcome, started) = self.tick();
                    trace!(?outcome, "Tick");
                    if let Some(started) = started {
                        batch = Some(started);
                    }
                }
            }
        }
    }

    /// Apply one timer tick, returning the batch future to drive when a new
    /// batch was started.
    fn tick(&mut self) -> (TickOutcome, Option<BatchFuture>) {
        if self.in_flight.is_none() {
            return self.start_batch();
        }
        let Some(in_flight) = self.in_flight.as_mut() else {
            return (TickOutcome::Idle, None);
        };

        if !self.config.abort_in_flight || in_flight.requeued {
            return (TickOutcome::Skipped, None);
        }
        let Some(controller) = in_flight.controller.as_ref() else {
            return (TickOutcome::Skipped, None);
        };

        let mut log = self.log.lock();
        if log.queue().is_empty() {
            return (TickOutcome::Skipped, None);
        }

        let batch = std::mem::take(&mut in_flight.batch);
        let requeued = batch.len();
        log.queue_mut().requeue_front(batch);
        controller.abort();
        in_flight.requeued = true;

        debug!(
            requeued,
            pending = log.queue().len(),
            "Aborting superseded batch"
        );
        (TickOutcome::Aborted { requeued }, None)
    }

    /// Drain the queue and hand the batch to the reducer
    fn start_batch(&mut self) -> (TickOutcome, Option<BatchFuture>) {
        let batch = self.log.lock().queue_mut().drain();
        if batch.is_empty() {
            return (TickOutcome::Idle, None);
        }

        let transitions = batch.len();
        let controller = self.config.abort_in_flight.then(AbortController::new);
        let signal = controller.as_ref().map(AbortController::signal);
        let retained = if controller.is_some() {
            batch.clone()
        } else {
            Vec::new()
        };

        debug!(
            transitions,
            reducer = %self.config.reducer,
            "Starting batch"
        );

        let run = self.config.reducer.run(batch, self.handler.clone(), signal);
        self.in_flight = Some(InFlight {
            batch: retained,
            controller,
            requeued: false,
        });

        (
            TickOutcome::Started { transitions },
            Some(catch_handler_panics(run)),
        )
    }

    /// Record the end of the in-flight batch and return to idle
    fn finish(&mut self, result: ValueChangeResult<()>) {
        let requeued = self
            .in_flight
            .take()
            .map(|in_flight| in_flight.requeued)
            .unwrap_or(false);

        match result {
            Ok(()) => debug!(requeued, "Batch delivered"),
            Err(e) if e.is_abort() => debug!(requeued, "Batch aborted"),
            Err(ValueChangeError::HandlerPanicked(message)) => {
                error!(panic = %message, "Value-change handler panicked")
            }
            Err(e) => warn!(error = %e, "Value-change handler failed"),
        }
    }
}

fn catch_handler_panics<F>(run: F) -> BatchFuture
where
    F: std::future::Future<Output = ValueChangeResult<()>> + Send + 'static,
{
    AssertUnwindSafe(run)
        .catch_unwind()
        .map(|outcome| match outcome {
            Ok(result) => result,
            Err(panic) => Err(ValueChangeError::HandlerPanicked(panic_message(panic))),
        })
        .boxed()
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
