// Copyright (c) 2025 - Cowboy AI, Inc.
//! Reducer Strategies
//!
//! A reducer decides how a drained batch of transitions becomes handler
//! invocations. Planning is a pure function over the batch; running the plan
//! is the only part that touches the handler.
//!
//! ```text
//! batch ──> plan() ──> [Transition, ...] ──> run() ──> handler.on_change(...) x N
//!           (pure)                           (async, sequential)
//! ```
//!
//! # Strategies
//!
//! - [`Reducer::Reduce`]: one invocation from the first `previous` to the
//!   last `current`, skipped entirely when the value came back to where it
//!   started (`A → B → A` fires nothing).
//! - [`Reducer::CallAll`]: one invocation per transition, in order, each
//!   awaited before the next begins.

use crate::abort::AbortSignal;
use crate::change::Transition;
use crate::errors::{ValueChangeError, ValueChangeResult};
use crate::handler::ChangeHandler;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// How to act when several changes accumulated within one polling interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reducer {
    /// Reduce all changes to one, then call the handler if the value
    /// actually changed
    #[default]
    #[serde(alias = "REDUCE")]
    Reduce,

    /// Call the handler for every change, one after the other
    #[serde(alias = "CALL_ALL")]
    CallAll,
}

impl Reducer {
    /// Turn a batch into the ordered list of transitions to deliver
    pub fn plan<T>(self, batch: Vec<Transition<T>>) -> Vec<Transition<T>>
    where
        T: Clone + PartialEq,
    {
        match self {
            Reducer::Reduce => Transition::span(&batch)
                .filter(|reduced| !reduced.is_noop())
                .into_iter()
                .collect(),
            Reducer::CallAll => batch,
        }
    }

    /// Deliver a batch to `handler` according to this strategy.
    ///
    /// Invocations run strictly one after another. When `signal` fires,
    /// transitions not yet started are skipped and the batch ends with
    /// [`ValueChangeError::Aborted`]. The first handler error ends the batch.
    pub async fn run<T>(
        self,
        batch: Vec<Transition<T>>,
        handler: Arc<dyn ChangeHandler<T>>,
        signal: Option<AbortSignal>,
    ) -> ValueChangeResult<()>
    where
        T: Clone + PartialEq + Send + 'static,
    {
        for transition in self.plan(batch) {
            if let Some(signal) = &signal {
                signal.check()?;
            }

            let (current, previous) = transition.into_handler_args();
            handler.on_change(current, previous, signal.clone()).await?;
        }

        Ok(())
    }

    /// Stable name used in configuration and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Reducer::Reduce => "reduce",
            Reducer::CallAll => "call_all",
        }
    }
}

impl fmt::Display for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Reducer {
    type Err = ValueChangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "reduce" => Ok(Reducer::Reduce),
            "call_all" | "callall" => Ok(Reducer::CallAll),
            other => Err(ValueChangeError::Configuration(format!(
                "unknown reducer '{other}', expected 'reduce' or 'call_all'"
            ))),
        }
    }
}
