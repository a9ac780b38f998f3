// Copyright (c) 2025 - Cowboy AI, Inc.
//! ChangeDetector - records a transition whenever a reported value differs
//! from the last one seen.

use super::queue::ChangeQueue;
use super::transition::Transition;

/// Holds the last observed value of a subscription
#[derive(Debug, Clone)]
pub struct ChangeDetector<T> {
    last: T,
}

impl<T: Clone + PartialEq> ChangeDetector<T> {
    /// Start tracking from `initial`
    pub fn new(initial: T) -> Self {
        Self { last: initial }
    }

    /// Compare `value` against the last observed value.
    ///
    /// On inequality, appends `{previous: last, current: value}` to `queue`,
    /// remembers `value` and returns `true`. Equal values are ignored.
    pub fn observe(&mut self, value: T, queue: &mut ChangeQueue<T>) -> bool {
        if self.last == value {
            return false;
        }

        let previous = std::mem::replace(&mut self.last, value.clone());
        queue.push(Transition::new(previous, value));
        true
    }

    /// The most recently observed value
    pub fn last(&self) -> &T {
        &self.last
    }
}

/// Detector and queue of one subscription, kept together so a report and a
/// drain never interleave.
#[derive(Debug, Clone)]
pub struct ChangeLog<T> {
    detector: ChangeDetector<T>,
    queue: ChangeQueue<T>,
}

impl<T: Clone + PartialEq> ChangeLog<T> {
    /// Create a log whose last observed value is `initial`
    pub fn new(initial: T) -> Self {
        Self {
            detector: ChangeDetector::new(initial),
            queue: ChangeQueue::new(),
        }
    }

    /// Report a new value; returns whether a transition was recorded
    pub fn report(&mut self, value: T) -> bool {
        self.detector.observe(value, &mut self.queue)
    }

    /// The most recently observed value
    pub fn last(&self) -> &T {
        self.detector.last()
    }

}

impl<T> ChangeLog<T> {
    /// Pending transitions
    pub fn queue(&self) -> &ChangeQueue<T> {
        &self.queue
    }

    /// Pending transitions, mutably
    pub fn queue_mut(&mut self) -> &mut ChangeQueue<T> {
        &mut self.queue
    }
}
