// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

const DEFAULT_LOW_TPS_THRESHOLD: f64 = 18.0;
const DEFAULT_HIGH_MEMORY_PERCENT: f64 = 80.0;
const DEFAULT_CHECK_INTERVAL_SECS: u64 = 60;

/// Transient-object categories eligible for cleanup.
///
/// Configured as strings (`cleanup-entities`) and resolved to tags at
/// config-load time. An unrecognized name is a [`ConfigError`], not a silent
/// no-match at scan time, so typos surface at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    ItemEntity,
    Arrow,
    ExperienceOrb,
    FallingBlock,
    PrimedTnt,
    Snowball,
}

impl FromStr for EntityKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ItemEntity" => Ok(EntityKind::ItemEntity),
            "Arrow" => Ok(EntityKind::Arrow),
            "ExperienceOrb" => Ok(EntityKind::ExperienceOrb),
            "FallingBlock" => Ok(EntityKind::FallingBlock),
            "PrimedTNT" => Ok(EntityKind::PrimedTnt),
            "Snowball" => Ok(EntityKind::Snowball),
            other => Err(ConfigError::UnknownEntityKind(other.to_string())),
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::ItemEntity => "ItemEntity",
            EntityKind::Arrow => "Arrow",
            EntityKind::ExperienceOrb => "ExperienceOrb",
            EntityKind::FallingBlock => "FallingBlock",
            EntityKind::PrimedTnt => "PrimedTNT",
            EntityKind::Snowball => "Snowball",
        };
        write!(f, "{name}")
    }
}

/// Alerting limits, set once at startup and immutable afterwards.
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    /// Throughput below this many ticks per second is considered laggy.
    pub low_tps: f64,
    /// Memory utilization above this percentage is considered high.
    pub high_memory_percent: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low_tps: DEFAULT_LOW_TPS_THRESHOLD,
            high_memory_percent: DEFAULT_HIGH_MEMORY_PERCENT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub thresholds: Thresholds,
    /// How often the periodic performance check fires, in seconds.
    pub check_interval_secs: u64,
    /// Object categories the entity-cleanup step despawns.
    pub cleanup_entities: Vec<EntityKind>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            check_interval_secs: DEFAULT_CHECK_INTERVAL_SECS,
            cleanup_entities: vec![EntityKind::ItemEntity],
        }
    }
}

impl MonitorConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_threshold("low_tps", self.thresholds.low_tps)?;
        validate_threshold("high_memory_percent", self.thresholds.high_memory_percent)?;

        if self.check_interval_secs == 0 {
            return Err(ConfigError::ZeroInterval);
        }

        Ok(())
    }
}

fn validate_threshold(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::InvalidThreshold { name, value });
    }
    Ok(())
}
