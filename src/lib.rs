// Copyright (c) 2025 - Cowboy AI, Inc.
//! Value-change batching for the Composable Information Machine
//!
//! Watches a rapidly changing value, coalesces bursts of updates on a fixed
//! polling interval and calls a handler either once per burst (reduced) or
//! once per intermediate change (replayed in order), optionally aborting a
//! stale in-flight handler when newer changes arrive.
//!
//! ```text
//! report(v) ─> ChangeDetector ─> ChangeQueue ─(tick)─> PollScheduler ─> Reducer ─> handler
//! ```

pub mod abort;
pub mod change;
pub mod config;
pub mod errors;
pub mod handler;
pub mod reducer;
pub mod scheduler;
pub mod subscription;

// Re-export commonly used types
pub use abort::{AbortController, AbortSignal};
pub use change::{ChangeDetector, ChangeLog, ChangeQueue, Transition};
pub use config::ValueChangeConfig;
pub use errors::{ValueChangeError, ValueChangeResult};
pub use handler::ChangeHandler;
pub use reducer::Reducer;
pub use scheduler::PollScheduler;
pub use subscription::{Subscription, SubscriptionId};
