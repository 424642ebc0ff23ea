//! Runs one pass over every monitor of every owner.
//!
//! Each monitor goes through `probe -> evaluate -> [notify] -> persist` as an
//! independent unit. Units run concurrently up to a fixed cap and a failure in
//! one unit is recorded in the report without touching the others.
//!
//! The previous status is always the one read from the store at the start of
//! the unit, and the new status is written back before the unit finishes. As
//! long as sweeps for the same monitor do not overlap, a down-streak produces
//! exactly one alert. Preventing overlapping sweeps is left to whoever
//! triggers them (a single timer or cron job).

use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::report::{MonitorFailure, SweepReport};
use crate::alerting::{evaluate, Transition, TransitionKind};
use crate::db::models::{CheckUpdate, Monitor, Owner};
use crate::db::{MonitorStore, StoreError};
use crate::monitoring::{parse_target, LivenessProbe, ProbeResult, DEFAULT_PROBE_TIMEOUT};
use crate::notifications::NotificationService;

pub const DEFAULT_SWEEP_CONCURRENCY: usize = 10;
pub const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy)]
pub struct SweepOptions {
    pub probe_timeout: Duration,
    /// Upper bound on monitors being processed at the same time.
    pub concurrency: usize,
    /// Upper bound on delivering one alert.
    pub notify_timeout: Duration,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            concurrency: DEFAULT_SWEEP_CONCURRENCY,
            notify_timeout: DEFAULT_NOTIFY_TIMEOUT,
        }
    }
}

#[derive(Error, Debug)]
pub enum SweepError {
    #[error("Store unavailable: {0}")]
    Store(#[from] StoreError),
    #[error("Owner not found: {0}")]
    OwnerNotFound(String),
    #[error("Monitor not found: {owner_id}/{monitor_id}")]
    MonitorNotFound {
        owner_id: String,
        monitor_id: String,
    },
}

/// What happened to one monitor during a sweep or a single check.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorCheck {
    /// The record as persisted at the end of the unit.
    pub monitor: Option<Monitor>,
    pub probe: Option<ProbeResult>,
    pub transition: Option<Transition>,
    pub notified: bool,
    pub errors: Vec<MonitorFailure>,
    #[serde(skip)]
    pub cancelled: bool,
}

pub struct SweepCoordinator {
    store: Arc<dyn MonitorStore>,
    prober: Arc<dyn LivenessProbe>,
    notifier: Arc<NotificationService>,
    options: SweepOptions,
}

impl SweepCoordinator {
    pub fn new(
        store: Arc<dyn MonitorStore>,
        prober: Arc<dyn LivenessProbe>,
        notifier: Arc<NotificationService>,
        options: SweepOptions,
    ) -> Self {
        Self {
            store,
            prober,
            notifier,
            options,
        }
    }

    pub fn options(&self) -> SweepOptions {
        self.options
    }

    pub async fn run_sweep(&self) -> Result<SweepReport, SweepError> {
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        self.run_sweep_with_cancel(cancel_rx).await
    }

    /// Runs a sweep that stops early once `cancel` turns `true`.
    ///
    /// Units still waiting on a probe are abandoned and their requests dropped.
    /// Units that already got a probe answer finish notifying and persisting on
    /// their own task, which also survives the sweep future itself being dropped.
    pub async fn run_sweep_with_cancel(
        &self,
        cancel: watch::Receiver<bool>,
    ) -> Result<SweepReport, SweepError> {
        let mut report = SweepReport::start();

        let owners = self.store.list_owners().await?;
        let mut targets: Vec<(Arc<Owner>, String)> = Vec::new();
        for owner in owners {
            match self.store.list_monitors(&owner.id).await {
                Ok(monitors) => {
                    let owner = Arc::new(owner);
                    targets.extend(monitors.into_iter().map(|m| (owner.clone(), m.id)));
                }
                Err(e) => {
                    error!(owner_id = %owner.id, error = %e, "Failed to list monitors for owner.");
                    report.errors.push(MonitorFailure::new(
                        &owner.id,
                        None,
                        format!("failed to list monitors: {e}"),
                    ));
                }
            }
        }

        let concurrency = self.options.concurrency.max(1);
        info!(
            monitors = targets.len(),
            concurrency = concurrency,
            "Sweep started."
        );

        let mut units = stream::iter(targets)
            .map(|(owner, monitor_id)| {
                let cancel = cancel.clone();
                async move { self.process_monitor(&owner, &monitor_id, cancel).await }
            })
            .buffer_unordered(concurrency);

        while let Some(check) = units.next().await {
            if check.cancelled {
                report.cancelled = true;
                continue;
            }
            report.monitors_checked += 1;
            if check.notified {
                report.notifications_sent += 1;
            }
            report.errors.extend(check.errors);
        }

        let was_cancelled = *cancel.borrow();
        report.cancelled |= was_cancelled;
        report.finished_at = Utc::now();

        info!(
            checked = report.monitors_checked,
            notifications = report.notifications_sent,
            errors = report.errors.len(),
            cancelled = report.cancelled,
            "Sweep finished."
        );
        Ok(report)
    }

    /// Checks a single monitor through the same pipeline a sweep uses.
    pub async fn check_monitor(
        &self,
        owner_id: &str,
        monitor_id: &str,
    ) -> Result<MonitorCheck, SweepError> {
        let owner = self
            .store
            .get_owner(owner_id)
            .await?
            .ok_or_else(|| SweepError::OwnerNotFound(owner_id.to_string()))?;
        if self.store.get_monitor(owner_id, monitor_id).await?.is_none() {
            return Err(SweepError::MonitorNotFound {
                owner_id: owner_id.to_string(),
                monitor_id: monitor_id.to_string(),
            });
        }

        let (_cancel_tx, cancel_rx) = watch::channel(false);
        Ok(self.process_monitor(&owner, monitor_id, cancel_rx).await)
    }

    async fn process_monitor(
        &self,
        owner: &Owner,
        monitor_id: &str,
        mut cancel: watch::Receiver<bool>,
    ) -> MonitorCheck {
        let mut check = MonitorCheck::default();
        let failure = |reason: String| MonitorFailure::new(&owner.id, Some(monitor_id), reason);

        let already_cancelled = *cancel.borrow();
        if already_cancelled {
            check.cancelled = true;
            return check;
        }

        let monitor = match self.store.get_monitor(&owner.id, monitor_id).await {
            Ok(Some(monitor)) => monitor,
            Ok(None) => {
                warn!(owner_id = %owner.id, monitor_id = %monitor_id, "Monitor disappeared before it was checked.");
                check.errors.push(failure("monitor no longer exists".to_string()));
                return check;
            }
            Err(e) => {
                error!(owner_id = %owner.id, monitor_id = %monitor_id, error = %e, "Failed to read monitor.");
                check.errors.push(failure(format!("failed to read monitor: {e}")));
                return check;
            }
        };
        let previous_status = monitor.status;

        let result = match parse_target(&monitor.url) {
            Ok(_) => {
                tokio::select! {
                    result = self.prober.probe(&monitor.url, self.options.probe_timeout) => result,
                    _ = wait_cancelled(&mut cancel) => {
                        debug!(monitor_id = %monitor_id, "Probe abandoned, sweep cancelled.");
                        check.cancelled = true;
                        return check;
                    }
                }
            }
            Err(e) => {
                warn!(monitor_id = %monitor_id, url = %monitor.url, error = %e, "Stored URL is not probeable.");
                check
                    .errors
                    .push(failure(format!("invalid stored url {:?}: {e}", monitor.url)));
                ProbeResult::unreachable(e.to_string())
            }
        };

        let transition = evaluate(previous_status, &result);
        match transition.kind {
            TransitionKind::NewlyDown => warn!(
                monitor_id = %monitor_id,
                name = %monitor.name,
                url = %monitor.url,
                reason = ?result.error_reason,
                http_status = ?result.http_status,
                "Monitor went down."
            ),
            TransitionKind::Recovered => info!(
                monitor_id = %monitor_id,
                name = %monitor.name,
                latency_ms = result.latency_ms,
                "Monitor recovered."
            ),
            TransitionKind::NoChange => debug!(
                monitor_id = %monitor_id,
                status = %transition.new_status,
                latency_ms = result.latency_ms,
                "Monitor status unchanged."
            ),
        }

        // Detached so that dropping the sweep cannot separate an alert from its write-back.
        let tail = UnitTail {
            store: self.store.clone(),
            notifier: self.notifier.clone(),
            notify_timeout: self.options.notify_timeout,
            owner: owner.clone(),
            monitor,
            result,
            transition,
            check,
        };
        match tokio::spawn(tail.finish()).await {
            Ok(check) => check,
            Err(e) => {
                error!(monitor_id = %monitor_id, error = %e, "Notify and persist task failed.");
                let mut check = MonitorCheck::default();
                check
                    .errors
                    .push(failure(format!("notify and persist task failed: {e}")));
                check
            }
        }
    }
}

/// The notify-then-persist half of a unit. Owns its inputs so it can run on its own task.
struct UnitTail {
    store: Arc<dyn MonitorStore>,
    notifier: Arc<NotificationService>,
    notify_timeout: Duration,
    owner: Owner,
    monitor: Monitor,
    result: ProbeResult,
    transition: Transition,
    check: MonitorCheck,
}

impl UnitTail {
    async fn finish(self) -> MonitorCheck {
        let UnitTail {
            store,
            notifier,
            notify_timeout,
            owner,
            monitor,
            result,
            transition,
            mut check,
        } = self;
        let failure = |reason: String| MonitorFailure::new(&owner.id, Some(&monitor.id), reason);
        let detected_at = Utc::now();

        if transition.should_notify() {
            match owner.contact() {
                Some(contact) => {
                    let sent = tokio::time::timeout(
                        notify_timeout,
                        notifier.notify_down(contact, &monitor.name, &monitor.url, detected_at),
                    )
                    .await;
                    match sent {
                        Ok(Ok(())) => check.notified = true,
                        Ok(Err(e)) => {
                            error!(monitor_id = %monitor.id, error = %e, "Failed to send down alert.");
                            check.errors.push(failure(format!("notification failed: {e}")));
                        }
                        Err(_) => {
                            error!(
                                monitor_id = %monitor.id,
                                timeout_ms = notify_timeout.as_millis() as u64,
                                "Down alert timed out."
                            );
                            check.errors.push(failure(format!(
                                "notification failed: timed out after {}ms",
                                notify_timeout.as_millis()
                            )));
                        }
                    }
                }
                None => {
                    debug!(owner_id = %owner.id, monitor_id = %monitor.id, "Owner has no contact address, alert skipped.");
                }
            }
        }

        let update = CheckUpdate {
            status: transition.new_status,
            last_checked: detected_at,
            response_time_ms: result.latency_ms,
        };
        match store.update_check(&owner.id, &monitor.id, update).await {
            Ok(updated) => check.monitor = Some(updated),
            Err(e) => {
                error!(monitor_id = %monitor.id, error = %e, "Failed to persist check result.");
                check.errors.push(failure(format!("failed to persist check: {e}")));
            }
        }

        check.probe = Some(result);
        check.transition = Some(transition);
        check
    }
}

async fn wait_cancelled(cancel: &mut watch::Receiver<bool>) {
    let sender_gone = cancel.wait_for(|cancelled| *cancelled).await.is_err();
    if sender_gone {
        // Nobody can cancel anymore.
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{MonitorStatus, NewMonitor};
    use crate::db::InMemoryStore;
    use crate::notifications::senders::NotificationSender;
    use crate::notifications::service::{parse_timezone, DEFAULT_DISPLAY_TIMEZONE};
    use crate::testing::{
        FailingSender, FlakyStore, HangingSender, RecordingSender, ScriptedProbe, SlowSender,
    };

    fn coordinator(
        store: Arc<dyn MonitorStore>,
        probe: Arc<dyn LivenessProbe>,
        sender: Arc<dyn NotificationSender>,
        concurrency: usize,
    ) -> SweepCoordinator {
        let notifier = Arc::new(NotificationService::new(
            sender,
            parse_timezone(DEFAULT_DISPLAY_TIMEZONE).unwrap(),
        ));
        SweepCoordinator::new(
            store,
            probe,
            notifier,
            SweepOptions {
                probe_timeout: Duration::from_millis(500),
                concurrency,
                notify_timeout: Duration::from_millis(300),
            },
        )
    }

    async fn seed(store: &dyn MonitorStore, owner: &str, email: Option<&str>, name: &str) -> Monitor {
        store
            .upsert_owner(Owner::new(owner, email.map(str::to_string)))
            .await
            .unwrap();
        store
            .create_monitor(
                owner,
                NewMonitor {
                    name: name.to_string(),
                    url: format!("https://{name}.example.com"),
                },
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_down_streak_alerts_exactly_once() {
        let store = Arc::new(InMemoryStore::new());
        let monitor = seed(&*store, "alice", Some("alice@example.com"), "shop").await;
        let probe = Arc::new(ScriptedProbe::new());
        probe.script(&monitor.url, &[false]);
        let sender = Arc::new(RecordingSender::default());
        let sweeper = coordinator(store.clone(), probe, sender.clone(), 4);

        let mut total = 0;
        for _ in 0..4 {
            let report = sweeper.run_sweep().await.unwrap();
            assert_eq!(report.monitors_checked, 1);
            assert!(report.errors.is_empty());
            total += report.notifications_sent;
        }

        assert_eq!(total, 1);
        assert_eq!(sender.messages().len(), 1);
        let stored = store.get_monitor("alice", &monitor.id).await.unwrap().unwrap();
        assert_eq!(stored.status, MonitorStatus::Down);
        assert!(stored.last_checked.is_some());
    }

    #[tokio::test]
    async fn test_recovery_is_silent_and_next_outage_alerts_again() {
        let store = Arc::new(InMemoryStore::new());
        let monitor = seed(&*store, "alice", Some("alice@example.com"), "api").await;
        let probe = Arc::new(ScriptedProbe::new());
        probe.script(&monitor.url, &[false, true, false]);
        let sender = Arc::new(RecordingSender::default());
        let sweeper = coordinator(store.clone(), probe, sender.clone(), 4);

        let first = sweeper.run_sweep().await.unwrap();
        assert_eq!(first.notifications_sent, 1);

        let second = sweeper.run_sweep().await.unwrap();
        assert_eq!(second.notifications_sent, 0);
        let stored = store.get_monitor("alice", &monitor.id).await.unwrap().unwrap();
        assert_eq!(stored.status, MonitorStatus::Up);

        let third = sweeper.run_sweep().await.unwrap();
        assert_eq!(third.notifications_sent, 1);
        assert_eq!(sender.messages().len(), 2);
    }

    #[tokio::test]
    async fn test_transport_failure_still_persists_down() {
        let store = Arc::new(InMemoryStore::new());
        let monitor = seed(&*store, "alice", Some("alice@example.com"), "blog").await;
        let probe = Arc::new(ScriptedProbe::new());
        probe.script(&monitor.url, &[false]);
        let sweeper = coordinator(store.clone(), probe, Arc::new(FailingSender), 4);

        let report = sweeper.run_sweep().await.unwrap();
        assert_eq!(report.monitors_checked, 1);
        assert_eq!(report.notifications_sent, 0);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].reason.starts_with("notification failed"));

        let stored = store.get_monitor("alice", &monitor.id).await.unwrap().unwrap();
        assert_eq!(stored.status, MonitorStatus::Down);
        assert!(stored.last_checked.is_some());

        // Still down: no retry, no new error.
        let again = sweeper.run_sweep().await.unwrap();
        assert!(again.errors.is_empty());
    }

    #[tokio::test]
    async fn test_missing_contact_skips_alert_but_updates_status() {
        let store = Arc::new(InMemoryStore::new());
        let monitor = seed(&*store, "bob", None, "wiki").await;
        let probe = Arc::new(ScriptedProbe::new());
        probe.script(&monitor.url, &[false]);
        let sender = Arc::new(RecordingSender::default());
        let sweeper = coordinator(store.clone(), probe, sender.clone(), 4);

        let report = sweeper.run_sweep().await.unwrap();
        assert_eq!(report.notifications_sent, 0);
        assert!(report.errors.is_empty());
        assert!(sender.messages().is_empty());
        let stored = store.get_monitor("bob", &monitor.id).await.unwrap().unwrap();
        assert_eq!(stored.status, MonitorStatus::Down);
    }

    #[tokio::test]
    async fn test_store_write_failure_is_isolated() {
        let store = Arc::new(FlakyStore::default());
        let a = seed(&*store, "alice", Some("alice@example.com"), "a").await;
        let b = seed(&*store, "alice", Some("alice@example.com"), "b").await;
        let c = seed(&*store, "carol", None, "c").await;
        store.fail_writes_for(&b.id);
        let sweeper = coordinator(
            store.clone(),
            Arc::new(ScriptedProbe::new()),
            Arc::new(RecordingSender::default()),
            4,
        );

        let report = sweeper.run_sweep().await.unwrap();

        assert_eq!(report.monitors_checked, 3);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors_for(&b.id), 1);
        for (owner, id) in [("alice", &a.id), ("carol", &c.id)] {
            let stored = store.get_monitor(owner, id).await.unwrap().unwrap();
            assert_eq!(stored.status, MonitorStatus::Up);
            assert!(stored.last_checked.is_some());
        }
        let stored_b = store.get_monitor("alice", &b.id).await.unwrap().unwrap();
        assert_eq!(stored_b.status, MonitorStatus::Pending);
    }

    #[tokio::test]
    async fn test_no_monitor_stays_pending_after_sweep() {
        let store = Arc::new(InMemoryStore::new());
        let probe = Arc::new(ScriptedProbe::new());
        for (i, up) in [true, false, true, false].into_iter().enumerate() {
            let monitor = seed(&*store, "alice", None, &format!("site{i}")).await;
            probe.script(&monitor.url, &[up]);
        }
        let sweeper = coordinator(store.clone(), probe, Arc::new(RecordingSender::default()), 2);

        sweeper.run_sweep().await.unwrap();

        for monitor in store.list_monitors("alice").await.unwrap() {
            assert_ne!(monitor.status, MonitorStatus::Pending);
        }
    }

    #[tokio::test]
    async fn test_concurrency_is_capped() {
        let store = Arc::new(InMemoryStore::new());
        for i in 0..12 {
            seed(&*store, "alice", None, &format!("m{i}")).await;
        }
        let probe = Arc::new(ScriptedProbe::with_delay(Duration::from_millis(30)));
        let sweeper = coordinator(store.clone(), probe.clone(), Arc::new(RecordingSender::default()), 3);

        let report = sweeper.run_sweep().await.unwrap();

        assert_eq!(report.monitors_checked, 12);
        assert_eq!(probe.calls(), 12);
        assert!(probe.max_in_flight() <= 3);
        assert!(probe.max_in_flight() >= 1);
    }

    #[tokio::test]
    async fn test_cancelled_sweep_abandons_in_flight_probes() {
        let store = Arc::new(InMemoryStore::new());
        for i in 0..3 {
            seed(&*store, "alice", Some("alice@example.com"), &format!("h{i}")).await;
        }
        let sender = Arc::new(RecordingSender::default());
        let sweeper = coordinator(store.clone(), Arc::new(ScriptedProbe::hanging()), sender.clone(), 2);
        let (cancel_tx, cancel_rx) = watch::channel(false);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            let _ = cancel_tx.send(true);
            // Keep the sender alive until the sweep has observed it.
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let report = tokio::time::timeout(
            Duration::from_secs(3),
            sweeper.run_sweep_with_cancel(cancel_rx),
        )
        .await
        .expect("cancelled sweep should return promptly")
        .unwrap();

        assert!(report.cancelled);
        assert_eq!(report.monitors_checked, 0);
        assert!(sender.messages().is_empty());
        for monitor in store.list_monitors("alice").await.unwrap() {
            assert_eq!(monitor.status, MonitorStatus::Pending);
        }
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_the_sweep() {
        let sweeper = coordinator(
            Arc::new(FlakyStore::unavailable()),
            Arc::new(ScriptedProbe::new()),
            Arc::new(RecordingSender::default()),
            2,
        );
        let result = sweeper.run_sweep().await;
        assert!(matches!(result, Err(SweepError::Store(_))));
    }

    #[tokio::test]
    async fn test_invalid_stored_url_is_reported_and_marked_down() {
        let store = Arc::new(InMemoryStore::new());
        store
            .upsert_owner(Owner::new("alice", Some("alice@example.com".to_string())))
            .await
            .unwrap();
        let monitor = store
            .create_monitor(
                "alice",
                NewMonitor {
                    name: "Broken".to_string(),
                    url: "not a url".to_string(),
                },
            )
            .await
            .unwrap();
        let probe = Arc::new(ScriptedProbe::new());
        let sender = Arc::new(RecordingSender::default());
        let sweeper = coordinator(store.clone(), probe.clone(), sender.clone(), 2);

        let report = sweeper.run_sweep().await.unwrap();

        assert_eq!(probe.calls(), 0);
        assert_eq!(report.monitors_checked, 1);
        assert_eq!(report.errors_for(&monitor.id), 1);
        assert!(report.errors[0].reason.starts_with("invalid stored url"));
        assert_eq!(report.notifications_sent, 1);
        let stored = store.get_monitor("alice", &monitor.id).await.unwrap().unwrap();
        assert_eq!(stored.status, MonitorStatus::Down);
    }

    #[tokio::test]
    async fn test_single_check_shares_the_anti_flood_rule() {
        let store = Arc::new(InMemoryStore::new());
        let monitor = seed(&*store, "alice", Some("alice@example.com"), "cdn").await;
        let probe = Arc::new(ScriptedProbe::new());
        probe.script(&monitor.url, &[false]);
        let sender = Arc::new(RecordingSender::default());
        let sweeper = coordinator(store.clone(), probe, sender.clone(), 2);

        let check = sweeper.check_monitor("alice", &monitor.id).await.unwrap();
        assert!(check.notified);
        assert_eq!(
            check.transition.map(|t| t.kind),
            Some(TransitionKind::NewlyDown)
        );
        assert_eq!(check.monitor.map(|m| m.status), Some(MonitorStatus::Down));

        let report = sweeper.run_sweep().await.unwrap();
        assert_eq!(report.notifications_sent, 0);
        assert_eq!(sender.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_single_check_unknown_monitor() {
        let store = Arc::new(InMemoryStore::new());
        seed(&*store, "alice", None, "x").await;
        let sweeper = coordinator(
            store,
            Arc::new(ScriptedProbe::new()),
            Arc::new(RecordingSender::default()),
            2,
        );

        assert!(matches!(
            sweeper.check_monitor("alice", "missing").await,
            Err(SweepError::MonitorNotFound { .. })
        ));
        assert!(matches!(
            sweeper.check_monitor("nobody", "missing").await,
            Err(SweepError::OwnerNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_dropped_sweep_still_writes_back_the_sent_alert() {
        let store = Arc::new(InMemoryStore::new());
        let monitor = seed(&*store, "alice", Some("alice@example.com"), "slow").await;
        let probe = Arc::new(ScriptedProbe::new());
        probe.script(&monitor.url, &[false]);
        let sender = Arc::new(SlowSender::new(Duration::from_millis(300)));
        let sweeper = coordinator(store.clone(), probe, sender.clone(), 2);

        // The caller gives up while the alert is being delivered.
        let abandoned = tokio::time::timeout(Duration::from_millis(100), sweeper.run_sweep()).await;
        assert!(abandoned.is_err());
        assert_eq!(sender.messages().len(), 1);

        tokio::time::sleep(Duration::from_millis(500)).await;
        let stored = store.get_monitor("alice", &monitor.id).await.unwrap().unwrap();
        assert_eq!(stored.status, MonitorStatus::Down);

        let report = sweeper.run_sweep().await.unwrap();
        assert_eq!(report.notifications_sent, 0);
        assert_eq!(sender.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_hung_transport_is_bounded_and_status_still_persisted() {
        let store = Arc::new(InMemoryStore::new());
        let monitor = seed(&*store, "alice", Some("alice@example.com"), "hung").await;
        let probe = Arc::new(ScriptedProbe::new());
        probe.script(&monitor.url, &[false]);
        let sweeper = coordinator(store.clone(), probe, Arc::new(HangingSender), 2);
        let (cancel_tx, cancel_rx) = watch::channel(false);

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let _ = cancel_tx.send(true);
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let report = tokio::time::timeout(
            Duration::from_secs(3),
            sweeper.run_sweep_with_cancel(cancel_rx),
        )
        .await
        .expect("sweep with a hung transport should still finish")
        .unwrap();
        canceller.abort();

        assert_eq!(report.notifications_sent, 0);
        assert_eq!(report.errors_for(&monitor.id), 1);
        assert!(report.errors[0].reason.contains("timed out"));
        let stored = store.get_monitor("alice", &monitor.id).await.unwrap().unwrap();
        assert_eq!(stored.status, MonitorStatus::Down);
        assert!(stored.last_checked.is_some());
    }
}
