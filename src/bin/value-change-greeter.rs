// Copyright (c) 2025 - Cowboy AI, Inc.
//! Value-Change Greeter
//!
//! Reads lines from stdin and treats each one as the new value of a text
//! field. A slow greeting (500ms, standing in for a remote lookup) is
//! produced for the value once typing settles.
//!
//! Run with: cargo run --bin value-change-greeter
//!
//! Environment:
//! - `VALUE_CHANGE_FREQUENCY_MS` polling interval (default 100)
//! - `VALUE_CHANGE_REDUCER` `reduce` or `call_all` (default reduce)
//! - `VALUE_CHANGE_ABORT` drop greetings superseded by newer input (default false)
//! - `RUST_LOG` log filter

use anyhow::{Context, Result};
use async_trait::async_trait;
use cim_value_change::{
    AbortSignal, ChangeHandler, Subscription, ValueChangeConfig, ValueChangeResult,
};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

const GREETING_DELAY: Duration = Duration::from_millis(500);

struct Greeter;

#[async_trait]
impl ChangeHandler<String> for Greeter {
    async fn on_change(
        &self,
        current: String,
        previous: String,
        signal: Option<AbortSignal>,
    ) -> ValueChangeResult<()> {
        info!(%current, %previous, "Value changed");

        let lookup = tokio::time::sleep(GREETING_DELAY);
        match signal {
            Some(signal) => signal.guard(lookup).await?,
            None => lookup.await,
        }

        println!("Hello {current}");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = ValueChangeConfig::from_env().context("Invalid value-change configuration")?;
    info!(
        frequency_ms = config.frequency_millis(),
        reducer = %config.reducer,
        abort_in_flight = config.abort_in_flight,
        "Configuration loaded"
    );

    let subscription = Subscription::spawn(String::new(), Greeter, config)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        subscription.report(line);
    }

    // Let the last batch go out before exiting
    let settle = subscription.config().frequency * 2 + GREETING_DELAY;
    tokio::time::sleep(settle).await;
    subscription.shutdown().await;

    Ok(())
}
