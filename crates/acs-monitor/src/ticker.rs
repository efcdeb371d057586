//! Background tick loops: storage cleanup, health probe, and metrics
//! emission, started and stopped with the process.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use acs_config::MonitorConfig;
use acs_types::ids::TenantId;
use acs_types::ports::health::HealthCheck;
use acs_types::ports::metrics::BusinessMetrics;
use acs_types::ports::rate_limit::RateLimitStore;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const SHUTDOWN_GRACE: std::time::Duration = std::time::Duration::from_secs(1);

/// Drives the three background ticks against a `RateLimitStore`, an
/// optional health check, and an optional metrics sink. Each tick has its
/// own single-permit semaphore: if a tick is still running when its
/// interval next fires, the new run is skipped rather than queued, so
/// slow stores never cause tick overlap.
pub struct Monitor {
    config: MonitorConfig,
    store: Arc<dyn RateLimitStore>,
    health_check: Option<Arc<dyn HealthCheck>>,
    metrics: Option<Arc<dyn BusinessMetrics>>,
    known_tenants: Vec<TenantId>,
    running: Arc<AtomicBool>,
    shutdown_tx: Option<watch::Sender<bool>>,
    handles: Vec<JoinHandle<()>>,
}

impl Monitor {
    pub fn new(config: MonitorConfig, store: Arc<dyn RateLimitStore>) -> Self {
        Self {
            config,
            store,
            health_check: None,
            metrics: None,
            known_tenants: Vec::new(),
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx: None,
            handles: Vec::new(),
        }
    }

    pub fn with_health_check(mut self, check: Arc<dyn HealthCheck>) -> Self {
        self.health_check = Some(check);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn BusinessMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Tenants the metrics tick reports `active_limits` for. The monitor
    /// has no independent way to discover tenants; the embedding
    /// application supplies the set it cares about.
    pub fn with_known_tenants(mut self, tenants: Vec<TenantId>) -> Self {
        self.known_tenants = tenants;
        self
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Starts all three background loops. Idempotent: calling `start`
    /// while already running is a no-op.
    pub fn start(&mut self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        self.shutdown_tx = Some(shutdown_tx);

        self.handles.push(spawn_cleanup_tick(
            self.config.cleanup_interval(),
            self.store.clone(),
            shutdown_rx.clone(),
        ));

        if let Some(check) = self.health_check.clone() {
            self.handles.push(spawn_health_tick(
                self.config.health_interval(),
                check,
                shutdown_rx.clone(),
            ));
        }

        if let Some(metrics) = self.metrics.clone() {
            self.handles.push(spawn_metrics_tick(
                self.config.health_interval(),
                self.store.clone(),
                metrics,
                self.known_tenants.clone(),
                shutdown_rx,
            ));
        }

        info!(target: "acs::monitor", "monitor ticks started");
    }

    /// Signals every tick to stop and waits up to one second for them to
    /// finish their current iteration.
    pub async fn stop(&mut self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }

        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(true);
        }

        let handles = std::mem::take(&mut self.handles);
        let join_all = futures_join_all(handles);
        if tokio::time::timeout(SHUTDOWN_GRACE, join_all).await.is_err() {
            warn!(target: "acs::monitor", "monitor ticks did not stop within grace period");
        } else {
            debug!(target: "acs::monitor", "monitor ticks stopped cleanly");
        }
    }
}

async fn futures_join_all(handles: Vec<JoinHandle<()>>) {
    for handle in handles {
        let _ = handle.await;
    }
}

fn spawn_cleanup_tick(
    interval: std::time::Duration,
    store: Arc<dyn RateLimitStore>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    let permit = Arc::new(Semaphore::new(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let Ok(_guard) = permit.clone().try_acquire_owned() else {
                        debug!(target: "acs::monitor", "cleanup tick skipped, previous run still in flight");
                        continue;
                    };
                    match store.cleanup_expired().await {
                        Ok(removed) => debug!(target: "acs::monitor", removed, "cleanup tick completed"),
                        Err(err) => warn!(target: "acs::monitor", %err, "cleanup tick failed"),
                    }
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }
    })
}

fn spawn_health_tick(
    interval: std::time::Duration,
    check: Arc<dyn HealthCheck>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    let permit = Arc::new(Semaphore::new(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let Ok(_guard) = permit.clone().try_acquire_owned() else {
                        debug!(target: "acs::monitor", "health tick skipped, previous run still in flight");
                        continue;
                    };
                    match check.check().await {
                        Ok(status) if status.is_healthy() => debug!(target: "acs::monitor", "health tick: healthy"),
                        Ok(status) => warn!(target: "acs::monitor", status = %status.description(), "health tick: degraded or unhealthy"),
                        Err(err) => warn!(target: "acs::monitor", %err, "health tick failed to run"),
                    }
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }
    })
}

fn spawn_metrics_tick(
    interval: std::time::Duration,
    store: Arc<dyn RateLimitStore>,
    metrics: Arc<dyn BusinessMetrics>,
    tenants: Vec<TenantId>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    let permit = Arc::new(Semaphore::new(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let Ok(_guard) = permit.clone().try_acquire_owned() else {
                        debug!(target: "acs::monitor", "metrics tick skipped, previous run still in flight");
                        continue;
                    };
                    for tenant in &tenants {
                        let prefix = format!("{}:", tenant.as_str());
                        match store.get_by_prefix(&prefix).await {
                            Ok(entries) => metrics.record_active_limits(tenant.as_str(), entries.len() as u64),
                            Err(err) => warn!(target: "acs::monitor", %err, tenant = %tenant.as_str(), "metrics tick failed to list entries"),
                        }
                    }
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }
    })
}
