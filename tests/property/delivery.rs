// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for End-to-End Delivery
//!
//! Each case drives a real subscription on a paused single-threaded runtime
//! with random report timing and handler latency, then checks what the
//! handler saw once everything settled.

use crate::fixtures::{advance, call, Call, Recorder};
use cim_value_change::{Reducer, Subscription, ValueChangeConfig};
use proptest::prelude::*;

/// A value report followed by a pause
type Step = (u8, u64);

struct Outcome {
    completed: Vec<Call>,
    expected: Vec<Call>,
    final_value: String,
    max_concurrency: usize,
}

fn steps() -> impl Strategy<Value = Vec<Step>> {
    prop::collection::vec((0u8..4, 0u64..120), 1..30)
}

fn drive(steps: Vec<Step>, latency: u64, config: ValueChangeConfig) -> Outcome {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .expect("Failed to build test runtime");

    runtime.block_on(async move {
        let recorder = Recorder::new().with_latency(latency);
        let subscription = Subscription::spawn(String::new(), recorder.clone(), config)
            .expect("Failed to create subscription");

        let mut expected = Vec::new();
        let mut last = String::new();
        for (value, pause) in steps {
            let value = value.to_string();
            if value != last {
                expected.push(call(&value, &last));
                last = value.clone();
            }
            subscription.report(value);
            advance(pause).await;
        }

        advance(10_000).await;
        subscription.shutdown().await;

        Outcome {
            completed: recorder.completed(),
            expected,
            final_value: last,
            max_concurrency: recorder.max_concurrency(),
        }
    })
}

/// Whether `needle` appears in `haystack` in order, gaps allowed
fn is_subsequence(needle: &[Call], haystack: &[Call]) -> bool {
    let mut remaining = haystack.iter();
    needle.iter().all(|wanted| remaining.any(|seen| seen == wanted))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Property: without abort, CALL_ALL delivers exactly the real
    /// transitions, in order, one invocation at a time.
    #[test]
    fn prop_call_all_delivers_every_transition(steps in steps(), latency in 0u64..60) {
        let config = ValueChangeConfig::default().with_reducer(Reducer::CallAll);
        let outcome = drive(steps, latency, config);

        prop_assert_eq!(outcome.completed, outcome.expected);
        prop_assert!(outcome.max_concurrency <= 1);
    }

    /// Property: with abort, CALL_ALL may re-deliver superseded transitions
    /// but never drops or reorders one.
    #[test]
    fn prop_call_all_with_abort_never_drops(steps in steps(), latency in 0u64..250) {
        let config = ValueChangeConfig::default()
            .with_reducer(Reducer::CallAll)
            .with_abort_in_flight(true);
        let outcome = drive(steps, latency, config);

        prop_assert!(
            is_subsequence(&outcome.expected, &outcome.completed),
            "expected {:?} within {:?}",
            outcome.expected,
            outcome.completed
        );
        prop_assert_eq!(outcome.completed.last(), outcome.expected.last());
        prop_assert!(outcome.max_concurrency <= 1);
    }

    /// Property: REDUCE always converges on the final value, each delivered
    /// change picks up where the previous delivered one ended.
    #[test]
    fn prop_reduce_converges_on_final_value(
        steps in steps(),
        latency in 0u64..250,
        abort in any::<bool>(),
    ) {
        let config = ValueChangeConfig::default().with_abort_in_flight(abort);
        let outcome = drive(steps, latency, config);

        let mut delivered = String::new();
        for (current, previous) in &outcome.completed {
            prop_assert_ne!(current, previous);
            if !abort {
                prop_assert_eq!(previous, &delivered);
            }
            delivered = current.clone();
        }
        prop_assert_eq!(delivered, outcome.final_value);
        prop_assert!(outcome.max_concurrency <= 1);
    }
}
