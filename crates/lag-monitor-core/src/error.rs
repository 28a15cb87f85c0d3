// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use lag_monitor_agent::error::ConfigError;

/// Errors that can occur when working with the monitor services
#[derive(Debug, thiserror::Error)]
pub enum ServicesError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Monitor services are not running")]
    NotRunning,
}

impl From<ConfigError> for ServicesError {
    fn from(err: ConfigError) -> Self {
        ServicesError::InvalidConfig(err.to_string())
    }
}
