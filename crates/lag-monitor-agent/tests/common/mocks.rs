// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Mock implementations of the host capability traits for testing

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::SystemTime;

use lag_monitor_agent::config::EntityKind;
use lag_monitor_agent::error::HostError;
use lag_monitor_agent::host::{
    ObjectHandle, PerformanceProbe, RecordStore, RegionHandle, RegionHost, SessionGateway,
    SessionHandle, SessionRecord,
};

/// Probe returning fixed figures.
pub struct MockProbe {
    pub tps: f64,
    pub used_mb: f64,
    pub ceiling: String,
}

impl PerformanceProbe for MockProbe {
    fn throughput_rate(&self) -> f64 {
        self.tps
    }

    fn memory_usage_mb(&self) -> f64 {
        self.used_mb
    }

    fn memory_ceiling(&self) -> String {
        self.ceiling.clone()
    }
}

#[derive(Default)]
pub struct HostState {
    pub regions: Vec<RegionHandle>,
    /// Objects currently present per region id. Flagging an object despawns
    /// it from this map, the way the host would on its next cycle.
    pub objects: HashMap<String, Vec<ObjectHandle>>,
    pub flagged: Vec<u64>,
    /// Parts of each region the host's own bookkeeping considers inactive
    /// and would unload on request.
    pub unloadable: HashMap<String, usize>,
    pub sessions: Vec<SessionHandle>,
    pub session_regions: HashMap<String, RegionHandle>,
    pub records: Vec<SessionRecord>,
    pub deleted_records: Vec<String>,
    pub broadcasts: Vec<String>,
    pub notifications: Vec<(String, String)>,
    pub fail_region_listing: bool,
    pub fail_record_listing: bool,
}

/// One mock standing in for the session, region, and record capabilities,
/// with switchable failures and full call recording.
#[derive(Default)]
pub struct MockHost {
    pub state: Mutex<HostState>,
}

impl MockHost {
    pub fn add_region(&self, id: &str, objects: Vec<(u64, EntityKind)>, unloadable: usize) {
        let mut state = self.state.lock().unwrap();
        state.regions.push(RegionHandle::new(id));
        state.objects.insert(
            id.to_string(),
            objects
                .into_iter()
                .map(|(id, kind)| ObjectHandle { id, kind })
                .collect(),
        );
        state.unloadable.insert(id.to_string(), unloadable);
    }

    pub fn add_session(&self, id: &str, region: &str) {
        let mut state = self.state.lock().unwrap();
        state.sessions.push(SessionHandle::new(id));
        state
            .session_regions
            .insert(id.to_string(), RegionHandle::new(region));
    }

    pub fn add_record(&self, id: &str, last_seen: SystemTime) {
        let mut state = self.state.lock().unwrap();
        state.records.push(SessionRecord {
            id: id.to_string(),
            last_seen,
        });
    }

    pub fn broadcasts(&self) -> Vec<String> {
        self.state.lock().unwrap().broadcasts.clone()
    }

    pub fn notifications(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().notifications.clone()
    }

    pub fn flagged(&self) -> Vec<u64> {
        self.state.lock().unwrap().flagged.clone()
    }

    pub fn deleted_records(&self) -> Vec<String> {
        self.state.lock().unwrap().deleted_records.clone()
    }
}

impl SessionGateway for MockHost {
    fn broadcast(&self, message: &str) {
        self.state.lock().unwrap().broadcasts.push(message.to_string());
    }

    fn connected_sessions(&self) -> Result<Vec<SessionHandle>, HostError> {
        Ok(self.state.lock().unwrap().sessions.clone())
    }

    fn region_of(&self, session: &SessionHandle) -> Result<RegionHandle, HostError> {
        self.state
            .lock()
            .unwrap()
            .session_regions
            .get(&session.id)
            .cloned()
            .ok_or_else(|| HostError::Session(format!("unknown session {}", session.id)))
    }

    fn notify(&self, session: &SessionHandle, message: &str) -> Result<(), HostError> {
        self.state
            .lock()
            .unwrap()
            .notifications
            .push((session.id.clone(), message.to_string()));
        Ok(())
    }
}

impl RegionHost for MockHost {
    fn loaded_regions(&self) -> Result<Vec<RegionHandle>, HostError> {
        let state = self.state.lock().unwrap();
        if state.fail_region_listing {
            return Err(HostError::Region("world manager unavailable".to_string()));
        }
        Ok(state.regions.clone())
    }

    fn objects_in(&self, region: &RegionHandle) -> Result<Vec<ObjectHandle>, HostError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .objects
            .get(&region.id)
            .cloned()
            .unwrap_or_default())
    }

    fn flag_for_removal(&self, object: &ObjectHandle) -> Result<(), HostError> {
        let mut state = self.state.lock().unwrap();
        state.flagged.push(object.id);
        for objects in state.objects.values_mut() {
            objects.retain(|o| o.id != object.id);
        }
        Ok(())
    }

    fn unload_regions(&self, region: &RegionHandle, _force: bool) -> Result<usize, HostError> {
        let mut state = self.state.lock().unwrap();
        Ok(state
            .unloadable
            .insert(region.id.clone(), 0)
            .unwrap_or_default())
    }
}

impl RecordStore for MockHost {
    fn disconnected_session_records(&self) -> Result<Vec<SessionRecord>, HostError> {
        let state = self.state.lock().unwrap();
        if state.fail_record_listing {
            return Err(HostError::Records("data manager unavailable".to_string()));
        }
        Ok(state.records.clone())
    }

    fn delete_record(&self, id: &str) -> Result<(), HostError> {
        let mut state = self.state.lock().unwrap();
        state.records.retain(|r| r.id != id);
        state.deleted_records.push(id.to_string());
        Ok(())
    }
}
