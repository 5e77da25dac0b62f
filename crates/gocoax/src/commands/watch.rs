//! `gocoax watch`: repeated polls, one compact JSON line each.

use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use gocoax_core::AdapterClient;

use crate::cli::{GlobalOpts, WatchArgs};
use crate::error::CliError;
use crate::output;

/// Hard failures in a row before watching stops.
pub const MAX_CONSECUTIVE_FAILURES: u32 = 5;

const INTERVAL_RANGE: std::ops::RangeInclusive<u64> = 10..=300;

pub async fn handle(
    client: &AdapterClient,
    args: &WatchArgs,
    global: &GlobalOpts,
    default_interval: u64,
) -> Result<(), CliError> {
    let secs = args.interval.unwrap_or(default_interval);
    if !INTERVAL_RANGE.contains(&secs) {
        return Err(CliError::Validation {
            field: "interval".into(),
            reason: format!("must be between 10 and 300 seconds, got {secs}"),
        });
    }

    let mut ticker = tokio::time::interval(Duration::from_secs(secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(host = client.host(), interval_secs = secs, "watching adapter");

    let mut failures = 0u32;
    let mut polls = 0u64;
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!(polls, "interrupted");
                return Ok(());
            }
        }

        let line = match client.poll().await {
            Ok(report) => {
                failures = 0;
                output::render_json(&output::report_value(&report, args.redact)?, true)?
            }
            Err(err) if !err.is_transient() => return Err(err.into()),
            Err(err) => {
                failures += 1;
                warn!(failures, error = %err, "poll failed");
                if failures >= MAX_CONSECUTIVE_FAILURES {
                    return Err(CliError::WatchAborted {
                        failures,
                        last: err.to_string(),
                    });
                }
                let record = json!({
                    "captured_at": Utc::now(),
                    "error": err.to_string(),
                    "consecutive_failures": failures,
                });
                output::render_json(&record, true)?
            }
        };
        output::print_output(&line, global.quiet);

        polls += 1;
        if args.count.is_some_and(|limit| polls >= limit) {
            return Ok(());
        }
    }
}
