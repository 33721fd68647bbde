// Daemon loop: run a fetch cycle now, then once per interval.
//
// Shutdown is checked only between cycles. A cycle that has started always
// finishes, so the store never sees half a cycle. Cycle errors are logged
// and the loop keeps going.

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use super::fetch::FetchSummary;

/// Interval length for a schedule given in minutes.
pub fn interval_from_minutes(minutes: u64) -> Result<Duration> {
    minutes
        .checked_mul(60)
        .map(Duration::from_secs)
        .ok_or_else(|| anyhow::anyhow!("--interval {} minutes is too large", minutes))
}

/// Run `cycle` immediately and then every `interval` until `shutdown`
/// resolves. Returns the number of cycles run.
pub async fn run<F, Fut, S>(interval: Duration, mut cycle: F, shutdown: S) -> usize
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<FetchSummary>>,
    S: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    info!(interval_secs = interval.as_secs(), "Daemon started");

    let mut cycles = 0;
    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!(cycles = cycles, "Shutdown requested, stopping daemon");
                break;
            }
            _ = ticker.tick() => {}
        }

        cycles += 1;
        match cycle().await {
            Ok(summary) => info!(
                cycle = cycles,
                new = summary.new_posts,
                failed = summary.failed.len(),
                "Daemon cycle finished"
            ),
            Err(e) => warn!(cycle = cycles, error = %e, "Daemon cycle failed"),
        }
    }

    cycles
}
