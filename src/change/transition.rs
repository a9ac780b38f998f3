// Copyright (c) 2025 - Cowboy AI, Inc.
//! Transition - one observed change of a value

use serde::{Deserialize, Serialize};

/// An immutable `(previous, current)` pair recorded when a value changes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transition<T> {
    /// Value before the change
    pub previous: T,
    /// Value after the change
    pub current: T,
}

impl<T> Transition<T> {
    /// Create a transition from `previous` to `current`
    pub fn new(previous: T, current: T) -> Self {
        Self { previous, current }
    }

    /// Split into `(current, previous)`, the order handlers receive them in
    pub fn into_handler_args(self) -> (T, T) {
        (self.current, self.previous)
    }
}

impl<T: PartialEq> Transition<T> {
    /// Whether the transition ends where it started
    pub fn is_noop(&self) -> bool {
        self.previous == self.current
    }
}

impl<T: Clone> Transition<T> {
    /// Collapse a contiguous run of transitions into the single transition
    /// from the first `previous` to the last `current`.
    ///
    /// Returns `None` for an empty slice.
    pub fn span(batch: &[Transition<T>]) -> Option<Self> {
        let first = batch.first()?;
        let last = batch.last()?;
        Some(Self::new(first.previous.clone(), last.current.clone()))
    }
}
