// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Capability traits the host process injects into the agent.
//!
//! The agent never talks to the world, the session layer, or persisted
//! storage directly; it only sees these traits. All of them are synchronous:
//! the host schedules the agent cooperatively, and a hang in a collaborator
//! blocks the calling pipeline rather than being masked by a timeout.

use std::time::SystemTime;

use crate::config::EntityKind;
use crate::error::HostError;

/// Opaque identifier for a loadable spatial partition of the host world.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegionHandle {
    pub id: String,
}

impl RegionHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// A transient object living in a region, tagged with its kind so the
/// cleanup step can match it against the configured list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectHandle {
    pub id: u64,
    pub kind: EntityKind,
}

/// A connected client session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionHandle {
    pub id: String,
}

impl SessionHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// A persisted record for a session that is no longer connected.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub id: String,
    pub last_seen: SystemTime,
}

/// Instantaneous runtime figures read from the host environment.
///
/// Reads are plain and must not block; the sampler calls them on every
/// evaluation and never caches the results.
pub trait PerformanceProbe: Send + Sync {
    /// Ticks (processing cycles) completed per second by the host process.
    fn throughput_rate(&self) -> f64;

    /// Current memory usage of the host process, in megabytes.
    fn memory_usage_mb(&self) -> f64;

    /// The configured memory ceiling as a raw size string, e.g. `"512M"`,
    /// `"1G"`, or a plain byte count. Parsing rules live in the sampler.
    fn memory_ceiling(&self) -> String;
}

/// Fan-out and lookup over connected sessions.
pub trait SessionGateway: Send + Sync {
    /// Broadcast a message to every connected session.
    fn broadcast(&self, message: &str);

    fn connected_sessions(&self) -> Result<Vec<SessionHandle>, HostError>;

    /// The region a session currently occupies.
    fn region_of(&self, session: &SessionHandle) -> Result<RegionHandle, HostError>;

    /// Deliver a message to one session.
    fn notify(&self, session: &SessionHandle, message: &str) -> Result<(), HostError>;
}

/// Enumeration and mutation of loaded regions and their objects.
pub trait RegionHost: Send + Sync {
    fn loaded_regions(&self) -> Result<Vec<RegionHandle>, HostError>;

    fn objects_in(&self, region: &RegionHandle) -> Result<Vec<ObjectHandle>, HostError>;

    /// Flag a transient object for removal on the host's next cycle.
    fn flag_for_removal(&self, object: &ObjectHandle) -> Result<(), HostError>;

    /// Ask the host to unload inactive parts of a region. Which parts count
    /// as inactive is the host's own bookkeeping; the return value is the
    /// number it actually unloaded.
    fn unload_regions(&self, region: &RegionHandle, force: bool) -> Result<usize, HostError>;
}

/// Persisted per-session records for sessions that have disconnected.
pub trait RecordStore: Send + Sync {
    fn disconnected_session_records(&self) -> Result<Vec<SessionRecord>, HostError>;

    /// Delete a persisted record. Unconditional and irreversible.
    fn delete_record(&self, id: &str) -> Result<(), HostError>;
}
