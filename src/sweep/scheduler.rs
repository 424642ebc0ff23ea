use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

use super::coordinator::SweepCoordinator;

/// Runs one sweep per tick until `cancel` turns `true`.
///
/// Ticks never overlap a running sweep; a slow sweep delays the next tick.
pub async fn run_periodic_sweeps(
    coordinator: Arc<SweepCoordinator>,
    period: Duration,
    mut cancel: watch::Receiver<bool>,
) {
    info!(interval_seconds = period.as_secs(), "Periodic sweep task started.");
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            changed = cancel.changed() => {
                if changed.is_err() || *cancel.borrow() {
                    break;
                }
                continue;
            }
        }

        match coordinator.run_sweep_with_cancel(cancel.clone()).await {
            Ok(report) if report.cancelled => {
                warn!(checked = report.monitors_checked, "Sweep interrupted by shutdown.");
                break;
            }
            Ok(report) => {
                if !report.errors.is_empty() {
                    warn!(errors = report.errors.len(), "Sweep finished with errors.");
                }
            }
            Err(e) => {
                error!(error = %e, "Sweep could not start.");
            }
        }
    }
    info!("Periodic sweep task stopped.");
}
