// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-value-change
//!
//! Provides a recording change handler whose behaviour (latency, failures,
//! panics) is configured per test, plus helpers for driving subscriptions
//! under paused tokio time.

#![allow(dead_code)]

use async_trait::async_trait;
use cim_value_change::{AbortSignal, ChangeHandler, ValueChangeError, ValueChangeResult};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// One handler invocation as `(current, previous)`
pub type Call = (String, String);

/// Shorthand for building an expected call
pub fn call(current: &str, previous: &str) -> Call {
    (current.to_string(), previous.to_string())
}

/// Advance paused time by `millis`
pub async fn advance(millis: u64) {
    tokio::time::sleep(Duration::from_millis(millis)).await;
}

#[derive(Debug, Default)]
struct Journal {
    started: Mutex<Vec<Call>>,
    completed: Mutex<Vec<Call>>,
    aborted: Mutex<Vec<Call>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

/// Change handler that records every invocation
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    journal: Arc<Journal>,
    latency: Duration,
    ignore_abort: bool,
    fail_on: Option<String>,
    panic_on: Option<String>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Each invocation takes `millis` of (abortable) work
    pub fn with_latency(mut self, millis: u64) -> Self {
        self.latency = Duration::from_millis(millis);
        self
    }

    /// Sleep through the latency without looking at the abort signal
    pub fn ignoring_abort(mut self) -> Self {
        self.ignore_abort = true;
        self
    }

    /// Fail invocations whose current value equals `value`
    pub fn failing_on(mut self, value: &str) -> Self {
        self.fail_on = Some(value.to_string());
        self
    }

    /// Panic in invocations whose current value equals `value`
    pub fn panicking_on(mut self, value: &str) -> Self {
        self.panic_on = Some(value.to_string());
        self
    }

    pub fn started(&self) -> Vec<Call> {
        self.journal.started.lock().clone()
    }

    pub fn completed(&self) -> Vec<Call> {
        self.journal.completed.lock().clone()
    }

    pub fn aborted(&self) -> Vec<Call> {
        self.journal.aborted.lock().clone()
    }

    /// Highest number of invocations observed running at once
    pub fn max_concurrency(&self) -> usize {
        self.journal.max_active.load(Ordering::SeqCst)
    }
}

struct ActiveGuard<'a>(&'a Journal);

impl<'a> ActiveGuard<'a> {
    fn enter(journal: &'a Journal) -> Self {
        let now = journal.active.fetch_add(1, Ordering::SeqCst) + 1;
        journal.max_active.fetch_max(now, Ordering::SeqCst);
        Self(journal)
    }
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.active.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ChangeHandler<String> for Recorder {
    async fn on_change(
        &self,
        current: String,
        previous: String,
        signal: Option<AbortSignal>,
    ) -> ValueChangeResult<()> {
        let entry = (current.clone(), previous);
        self.journal.started.lock().push(entry.clone());
        let _active = ActiveGuard::enter(&self.journal);

        if self.panic_on.as_deref() == Some(current.as_str()) {
            panic!("recorder asked to panic on {current}");
        }

        if !self.latency.is_zero() {
            let work = tokio::time::sleep(self.latency);
            match signal {
                Some(signal) if !self.ignore_abort => {
                    if let Err(e) = signal.guard(work).await {
                        self.journal.aborted.lock().push(entry);
                        return Err(e);
                    }
                }
                _ => work.await,
            }
        }

        if self.fail_on.as_deref() == Some(current.as_str()) {
            return Err(ValueChangeError::callback(format!("rejected {current}")));
        }

        self.journal.completed.lock().push(entry);
        Ok(())
    }
}
