// Copyright (c) 2025 - Cowboy AI, Inc.
//! ChangeQueue - ordered log of pending transitions
//!
//! The queue is append-only from the producer side. The consumer takes
//! everything at once with [`ChangeQueue::drain`], and may hand an aborted
//! batch back with [`ChangeQueue::requeue_front`].
//!
//! # Examples
//!
//! ```rust,ignore
//! let mut queue = ChangeQueue::new();
//! queue.push(Transition::new(0, 1));
//! queue.push(Transition::new(1, 2));
//!
//! let batch = queue.drain();
//! assert_eq!(batch.len(), 2);
//! assert!(queue.is_empty());
//! ```

use super::transition::Transition;
use std::collections::VecDeque;

/// Insertion-ordered queue of transitions owned by one subscription
#[derive(Debug, Clone)]
pub struct ChangeQueue<T> {
    entries: VecDeque<Transition<T>>,
}

impl<T> ChangeQueue<T> {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    /// Append a transition at the back
    pub fn push(&mut self, transition: Transition<T>) {
        self.entries.push_back(transition);
    }

    /// Remove and return every queued transition, oldest first
    pub fn drain(&mut self) -> Vec<Transition<T>> {
        self.entries.drain(..).collect()
    }

    /// Put a previously drained batch back ahead of everything queued since.
    ///
    /// The batch keeps its internal order.
    pub fn requeue_front(&mut self, batch: Vec<Transition<T>>) {
        for transition in batch.into_iter().rev() {
            self.entries.push_front(transition);
        }
    }

    /// Number of pending transitions
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no transitions are pending
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate pending transitions without removing them
    pub fn iter(&self) -> impl Iterator<Item = &Transition<T>> {
        self.entries.iter()
    }
}

impl<T> Default for ChangeQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
