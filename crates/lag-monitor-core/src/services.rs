// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;
use std::time::SystemTime;

use tokio::sync::{broadcast, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use lag_monitor_agent::activity::ActivityTracker;
use lag_monitor_agent::host::{PerformanceProbe, RecordStore, RegionHost, SessionGateway};
use lag_monitor_agent::monitor::{PerformanceCheck, PerformanceMonitor};
use lag_monitor_agent::reclamation::ReclamationReport;

use crate::config::ServicesConfig;
use crate::error::ServicesError;

/// The capabilities the embedding host process injects into the monitor.
#[derive(Clone)]
pub struct HostCollaborators {
    pub probe: Arc<dyn PerformanceProbe>,
    pub gateway: Arc<dyn SessionGateway>,
    pub regions: Arc<dyn RegionHost>,
    pub records: Arc<dyn RecordStore>,
}

/// Status of the monitor services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    /// Services are starting up.
    Starting,
    /// Services are running normally.
    Running,
    /// Services are shutting down.
    Stopping,
    /// Services have stopped.
    Stopped,
}

/// Handle to the running monitor services.
///
/// The host keeps this for the process lifetime: operator commands, session
/// activity events, and shutdown all go through it.
#[derive(Clone)]
pub struct ServicesHandle {
    status: Arc<RwLock<ServiceStatus>>,
    status_tx: broadcast::Sender<ServiceStatus>,
    shutdown: CancellationToken,
    monitor: Arc<PerformanceMonitor>,
    activity: Arc<ActivityTracker>,
}

impl ServicesHandle {
    /// Check if the services are currently running.
    pub async fn is_running(&self) -> bool {
        matches!(*self.status.read().await, ServiceStatus::Running)
    }

    /// Get a receiver for status updates.
    pub fn status_receiver(&self) -> broadcast::Receiver<ServiceStatus> {
        self.status_tx.subscribe()
    }

    /// Stop the services. Safe to call more than once.
    pub async fn stop(&self) -> Result<(), ServicesError> {
        let mut status = self.status.write().await;
        if matches!(*status, ServiceStatus::Stopping | ServiceStatus::Stopped) {
            return Ok(());
        }

        *status = ServiceStatus::Stopping;
        drop(status);

        let _ = self.status_tx.send(ServiceStatus::Stopping);
        self.shutdown.cancel();

        Ok(())
    }

    /// The `checkperformance` operator command: sample now, broadcast any
    /// alerts, and return the sample plus the alert list.
    pub async fn check_performance(&self) -> Result<PerformanceCheck, ServicesError> {
        if !self.is_running().await {
            return Err(ServicesError::NotRunning);
        }
        Ok(self.monitor.check_performance())
    }

    /// The `optimize` operator command: run the reclamation pipeline and
    /// return its report. The summary line is logged for the operator.
    pub async fn optimize(&self) -> Result<ReclamationReport, ServicesError> {
        if !self.is_running().await {
            return Err(ServicesError::NotRunning);
        }
        let report = self.monitor.run_reclamation_now();
        info!("{}", report.summary());
        Ok(report)
    }

    /// Feed a session activity event (movement, interaction) into the idle
    /// tracker.
    pub fn record_session_activity(&self, session_id: &str) {
        self.activity.touch(session_id, SystemTime::now());
    }

    /// Drop a session from the idle tracker. Hosts call this from their
    /// disconnect event so the tracker does not retain every identifier ever
    /// seen.
    pub fn forget_session(&self, session_id: &str) {
        self.activity.forget(session_id);
    }
}

/// Main monitor services coordinator.
///
/// Wires the host collaborators into the agent, starts the recurring
/// performance check, and hands back a [`ServicesHandle`].
#[derive(Debug)]
pub struct MonitorServices {
    config: ServicesConfig,
}

impl MonitorServices {
    /// Create a new MonitorServices instance.
    pub fn new(config: ServicesConfig) -> Self {
        Self { config }
    }

    /// Start the monitor services.
    ///
    /// Validates the configuration, spawns the recurring performance check,
    /// and returns a handle that can be used to monitor and control the
    /// services.
    pub async fn start(
        self,
        collaborators: HostCollaborators,
    ) -> Result<ServicesHandle, ServicesError> {
        let monitor_config = Arc::new(self.config.monitor_config()?);

        let status = Arc::new(RwLock::new(ServiceStatus::Starting));
        let (status_tx, _status_rx) = broadcast::channel(16);
        let shutdown = CancellationToken::new();
        let activity = Arc::new(ActivityTracker::new());

        let monitor = Arc::new(PerformanceMonitor::new(
            Arc::clone(&monitor_config),
            collaborators.probe,
            collaborators.gateway,
            collaborators.regions,
            collaborators.records,
            Arc::clone(&activity),
        ));

        // The recurring trigger lives for the whole process; it only ends
        // when the shutdown token fires, and it marks the services stopped
        // on its way out.
        let loop_monitor = Arc::clone(&monitor);
        let loop_token = shutdown.clone();
        let loop_status = Arc::clone(&status);
        let loop_status_tx = status_tx.clone();
        tokio::spawn(async move {
            loop_monitor.run(loop_token).await;
            let mut s = loop_status.write().await;
            *s = ServiceStatus::Stopped;
            let _ = loop_status_tx.send(ServiceStatus::Stopped);
        });

        *status.write().await = ServiceStatus::Running;
        let _ = status_tx.send(ServiceStatus::Running);
        info!(
            "Performance monitor started (check interval: {}s)",
            monitor_config.check_interval_secs
        );
        debug!(
            "Cleanup entities: {:?}",
            monitor_config.cleanup_entities
        );

        Ok(ServicesHandle {
            status,
            status_tx,
            shutdown,
            monitor,
            activity,
        })
    }
}
