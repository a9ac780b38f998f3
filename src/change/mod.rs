// Copyright (c) 2025 - Cowboy AI, Inc.
//! Change Tracking
//!
//! This module turns a stream of reported values into an ordered log of
//! transitions that the poll scheduler consumes.
//!
//! ```text
//! report(v) ──> ChangeDetector ──(v != last)──> ChangeQueue ──drain──> batch
//!                    │                               ▲
//!                    └── last = v                    └── requeue_front(aborted batch)
//! ```
//!
//! # Ordering
//!
//! Transitions are appended in detection order and drained as one unit.
//! A batch that was aborted goes back to the *front* of the queue, so it is
//! always delivered ahead of anything reported after it.

pub mod detector;
pub mod queue;
pub mod transition;

pub use detector::{ChangeDetector, ChangeLog};
pub use queue::ChangeQueue;
pub use transition::Transition;
