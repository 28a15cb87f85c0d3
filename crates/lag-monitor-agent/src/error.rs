// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Errors raised while building or validating the monitor configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown cleanup entity kind: '{0}'")]
    UnknownEntityKind(String),

    #[error("Invalid threshold for {name}: {value} (must be positive and finite)")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("Check interval must be greater than 0 seconds")]
    ZeroInterval,
}

/// Errors surfaced by host capability calls.
///
/// These are caught at reclamation step boundaries: a failing collaborator
/// marks its step as failed in the report and the remaining steps still run.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("Region operation failed: {0}")]
    Region(String),

    #[error("Session operation failed: {0}")]
    Session(String),

    #[error("Record store operation failed: {0}")]
    Records(String),
}
