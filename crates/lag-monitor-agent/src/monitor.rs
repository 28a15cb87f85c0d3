// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use serde::Serialize;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::activity::ActivityTracker;
use crate::config::MonitorConfig;
use crate::evaluator::{evaluate, Alert};
use crate::host::{PerformanceProbe, RecordStore, RegionHost, SessionGateway};
use crate::reclamation::{ReclamationPipeline, ReclamationReport};
use crate::sampler::{MetricSampler, Sample};

/// Result of one performance check: the fresh sample plus whatever alerts it
/// raised.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceCheck {
    pub sample: Sample,
    pub alerts: Vec<Alert>,
}

/// Periodic health monitoring plus the on-demand reclamation entry point.
///
/// The sampler and evaluator are stateless per call, so an on-demand check or
/// reclamation overlapping the periodic trigger cannot corrupt anything; the
/// activity tracker is the only shared mutable state and guards itself.
pub struct PerformanceMonitor {
    config: Arc<MonitorConfig>,
    sampler: MetricSampler,
    gateway: Arc<dyn SessionGateway>,
    pipeline: ReclamationPipeline,
}

impl PerformanceMonitor {
    pub fn new(
        config: Arc<MonitorConfig>,
        probe: Arc<dyn PerformanceProbe>,
        gateway: Arc<dyn SessionGateway>,
        regions: Arc<dyn RegionHost>,
        records: Arc<dyn RecordStore>,
        activity: Arc<ActivityTracker>,
    ) -> Self {
        let sampler = MetricSampler::new(probe);
        let pipeline = ReclamationPipeline::new(
            regions,
            Arc::clone(&gateway),
            records,
            activity,
            config.cleanup_entities.clone(),
        );

        Self {
            config,
            sampler,
            gateway,
            pipeline,
        }
    }

    /// Sample the host, evaluate thresholds, and broadcast any alerts to
    /// connected sessions. Also returns the alerts so callers can inspect
    /// them without a live broadcast channel. Infallible: a degraded sample
    /// surfaces as alerts, never as an error.
    pub fn check_performance(&self) -> PerformanceCheck {
        let sample = self.sampler.sample();
        let alerts = evaluate(&sample, &self.config.thresholds);

        for alert in &alerts {
            warn!("{alert}");
            self.gateway.broadcast(&alert.to_string());
        }

        PerformanceCheck { sample, alerts }
    }

    /// Direct on-demand reclamation. No concurrency guard: repeating a run is
    /// idempotent against unchanged host state.
    pub fn run_reclamation_now(&self) -> ReclamationReport {
        info!("Running on-demand reclamation");
        self.pipeline.run_all()
    }

    /// The recurring trigger: one global repeating timer at the configured
    /// period, for the lifetime of the process. Ticks stay on the original
    /// cadence even when a check overruns the period. Nothing this loop does
    /// can unregister it; it ends only through `shutdown`.
    pub async fn run(&self, shutdown: CancellationToken) {
        let mut check_interval = interval(self.config.check_interval());
        check_interval.tick().await; // discard first tick, which is instantaneous

        loop {
            tokio::select! {
                _ = check_interval.tick() => {
                    debug!("Running periodic performance check");
                    let check = self.check_performance();
                    if !check.alerts.is_empty() {
                        debug!("Periodic check raised {} alert(s)", check.alerts.len());
                    }
                }
                _ = shutdown.cancelled() => {
                    info!("Performance monitor shutting down");
                    break;
                }
            }
        }
    }
}
