// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The on-demand reclamation pipeline.
//!
//! Four steps run in a fixed order, each isolated from the others: a
//! collaborator failure is recorded on that step's report and the remaining
//! steps still run. Repeating a run against unchanged host state is safe and
//! reports zero newly-affected items for already-cleared categories.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::activity::ActivityTracker;
use crate::config::EntityKind;
use crate::error::HostError;
use crate::host::{RecordStore, RegionHost, SessionGateway};

/// Sessions idle longer than this get the regions around them unloaded.
const IDLE_SESSION_THRESHOLD: Duration = Duration::from_secs(300);
/// Disconnected-session records older than this are purged.
const STALE_RECORD_THRESHOLD: Duration = Duration::from_secs(604_800);

const ENTITIES_CLEARED_NOTICE: &str = "Cleared unused entities based on config.";
const REGIONS_UNLOADED_NOTICE: &str = "Unloaded unused regions.";
const IDLE_UNLOAD_NOTICE: &str = "Regions around you have been unloaded due to inactivity.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StepKind {
    EntityCleanup,
    RegionUnload,
    IdleSessionUnload,
    StaleRecordPurge,
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StepKind::EntityCleanup => "entity cleanup",
            StepKind::RegionUnload => "region unload",
            StepKind::IdleSessionUnload => "idle session unload",
            StepKind::StaleRecordPurge => "stale record purge",
        };
        write!(f, "{name}")
    }
}

/// Outcome of one pipeline step.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: StepKind,
    /// Items newly affected by this run (entities flagged, regions unloaded,
    /// sessions handled, records purged). Zero when the step failed.
    pub affected: usize,
    pub error: Option<String>,
}

impl StepReport {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Result of one reclamation run. Transient: returned to the caller, never
/// persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ReclamationReport {
    pub steps: Vec<StepReport>,
}

impl ReclamationReport {
    pub fn succeeded(&self) -> bool {
        self.steps.iter().all(StepReport::is_ok)
    }

    pub fn total_affected(&self) -> usize {
        self.steps.iter().map(|s| s.affected).sum()
    }

    /// One human-readable line for the operator who requested the run.
    pub fn summary(&self) -> String {
        let details = self
            .steps
            .iter()
            .map(|step| match &step.error {
                None => format!("{}: {} affected", step.step, step.affected),
                Some(err) => format!("{} failed ({err})", step.step),
            })
            .collect::<Vec<_>>()
            .join(", ");

        if self.succeeded() {
            format!("Server optimized: {details}")
        } else {
            format!("Server optimization finished with errors: {details}")
        }
    }
}

/// Ordered sequence of reclamation steps over the injected host
/// collaborators.
#[derive(Clone)]
pub struct ReclamationPipeline {
    regions: Arc<dyn RegionHost>,
    gateway: Arc<dyn SessionGateway>,
    records: Arc<dyn RecordStore>,
    activity: Arc<ActivityTracker>,
    cleanup_kinds: Vec<EntityKind>,
}

impl ReclamationPipeline {
    pub fn new(
        regions: Arc<dyn RegionHost>,
        gateway: Arc<dyn SessionGateway>,
        records: Arc<dyn RecordStore>,
        activity: Arc<ActivityTracker>,
        cleanup_kinds: Vec<EntityKind>,
    ) -> Self {
        Self {
            regions,
            gateway,
            records,
            activity,
            cleanup_kinds,
        }
    }

    /// Run every step against the current wall clock.
    pub fn run_all(&self) -> ReclamationReport {
        self.run_all_at(SystemTime::now())
    }

    /// Run every step, evaluating idle and staleness cutoffs against `now`.
    pub fn run_all_at(&self, now: SystemTime) -> ReclamationReport {
        let steps = vec![
            self.run_step(StepKind::EntityCleanup, || self.cleanup_entities()),
            self.run_step(StepKind::RegionUnload, || self.unload_unused_regions()),
            self.run_step(StepKind::IdleSessionUnload, || {
                self.unload_idle_session_regions(now)
            }),
            self.run_step(StepKind::StaleRecordPurge, || self.purge_stale_records(now)),
        ];

        ReclamationReport { steps }
    }

    fn run_step(
        &self,
        kind: StepKind,
        step: impl FnOnce() -> Result<usize, HostError>,
    ) -> StepReport {
        match step() {
            Ok(affected) => {
                debug!("Reclamation step '{kind}' affected {affected} items");
                StepReport {
                    step: kind,
                    affected,
                    error: None,
                }
            }
            Err(err) => {
                warn!("Reclamation step '{kind}' failed: {err}");
                StepReport {
                    step: kind,
                    affected: 0,
                    error: Some(err.to_string()),
                }
            }
        }
    }

    /// Flag configured transient-object kinds for removal in every loaded
    /// region.
    fn cleanup_entities(&self) -> Result<usize, HostError> {
        let mut flagged = 0;
        for region in self.regions.loaded_regions()? {
            for object in self.regions.objects_in(&region)? {
                if self.cleanup_kinds.contains(&object.kind) {
                    self.regions.flag_for_removal(&object)?;
                    flagged += 1;
                }
            }
        }

        self.gateway.broadcast(ENTITIES_CLEARED_NOTICE);
        Ok(flagged)
    }

    /// Force-unload whatever the host's own bookkeeping deems inactive, in
    /// every loaded region.
    fn unload_unused_regions(&self) -> Result<usize, HostError> {
        let mut unloaded = 0;
        for region in self.regions.loaded_regions()? {
            unloaded += self.regions.unload_regions(&region, true)?;
        }

        self.gateway.broadcast(REGIONS_UNLOADED_NOTICE);
        Ok(unloaded)
    }

    /// Unload regions around sessions idle longer than
    /// [`IDLE_SESSION_THRESHOLD`] and tell them why.
    fn unload_idle_session_regions(&self, now: SystemTime) -> Result<usize, HostError> {
        let mut handled = 0;
        for session in self.gateway.connected_sessions()? {
            if self.activity.idle_for(&session.id, now) > IDLE_SESSION_THRESHOLD {
                let region = self.gateway.region_of(&session)?;
                self.regions.unload_regions(&region, true)?;
                self.gateway.notify(&session, IDLE_UNLOAD_NOTICE)?;
                handled += 1;
            }
        }
        Ok(handled)
    }

    /// Delete persisted records for sessions last seen more than
    /// [`STALE_RECORD_THRESHOLD`] ago.
    fn purge_stale_records(&self, now: SystemTime) -> Result<usize, HostError> {
        let mut purged = 0;
        for record in self.records.disconnected_session_records()? {
            let age = now.duration_since(record.last_seen).unwrap_or_default();
            if age > STALE_RECORD_THRESHOLD {
                self.records.delete_record(&record.id)?;
                info!("Purged stale record for disconnected session: {}", record.id);
                purged += 1;
            }
        }
        Ok(purged)
    }
}
