// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::env;

use lag_monitor_agent::config::{EntityKind, MonitorConfig, Thresholds};

use crate::error::ServicesError;

const DEFAULT_LOW_TPS_THRESHOLD: f64 = 18.0;
const DEFAULT_HIGH_MEMORY_PERCENT: f64 = 80.0;
const DEFAULT_CHECK_INTERVAL_SECS: u64 = 60;
const DEFAULT_CLEANUP_ENTITY: &str = "ItemEntity";

/// Configuration for the monitor services, as the embedding host supplies it
#[derive(Debug, Clone)]
pub struct ServicesConfig {
    /// Throughput below this many ticks per second raises a low-TPS alert
    pub low_tps_threshold: f64,
    /// Memory utilization above this percentage raises a high-memory alert
    pub high_memory_percent: f64,
    /// Period of the recurring performance check, in seconds
    pub check_interval_secs: u64,
    /// Entity type names the cleanup step despawns (`cleanup-entities`)
    pub cleanup_entities: Vec<String>,
    /// Log level (e.g. trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            low_tps_threshold: DEFAULT_LOW_TPS_THRESHOLD,
            high_memory_percent: DEFAULT_HIGH_MEMORY_PERCENT,
            check_interval_secs: DEFAULT_CHECK_INTERVAL_SECS,
            cleanup_entities: vec![DEFAULT_CLEANUP_ENTITY.to_string()],
            log_level: "info".to_string(),
        }
    }
}

impl ServicesConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, ServicesError> {
        let low_tps_threshold = env::var("LAGMON_LOW_TPS_THRESHOLD")
            .ok()
            .and_then(|val| val.parse::<f64>().ok())
            .unwrap_or(DEFAULT_LOW_TPS_THRESHOLD);
        let high_memory_percent = env::var("LAGMON_HIGH_MEMORY_PERCENT")
            .ok()
            .and_then(|val| val.parse::<f64>().ok())
            .unwrap_or(DEFAULT_HIGH_MEMORY_PERCENT);
        let check_interval_secs = env::var("LAGMON_CHECK_INTERVAL_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEFAULT_CHECK_INTERVAL_SECS);
        let cleanup_entities = env::var("LAGMON_CLEANUP_ENTITIES")
            .map(|val| {
                val.split(',')
                    .map(|name| name.trim().to_string())
                    .filter(|name| !name.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| vec![DEFAULT_CLEANUP_ENTITY.to_string()]);
        let log_level = env::var("LAGMON_LOG_LEVEL")
            .map(|val| val.to_lowercase())
            .unwrap_or_else(|_| "info".to_string());

        let config = Self {
            low_tps_threshold,
            high_memory_percent,
            check_interval_secs,
            cleanup_entities,
            log_level,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ServicesError> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            return Err(ServicesError::InvalidConfig(format!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.log_level
            )));
        }

        // Thresholds, interval, and entity names all validate through the
        // agent config conversion.
        self.monitor_config().map(|_| ())
    }

    /// Resolve into the agent's validated [`MonitorConfig`]. Unknown entity
    /// names are a configuration error here, at load time, instead of a
    /// silent no-match during cleanup.
    pub fn monitor_config(&self) -> Result<MonitorConfig, ServicesError> {
        let cleanup_entities = self
            .cleanup_entities
            .iter()
            .map(|name| name.parse::<EntityKind>())
            .collect::<Result<Vec<_>, _>>()?;

        let config = MonitorConfig {
            thresholds: Thresholds {
                low_tps: self.low_tps_threshold,
                high_memory_percent: self.high_memory_percent,
            },
            check_interval_secs: self.check_interval_secs,
            cleanup_entities,
        };
        config.validate()?;
        Ok(config)
    }
}
