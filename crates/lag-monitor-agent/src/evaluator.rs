// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use serde::Serialize;

use crate::config::Thresholds;
use crate::sampler::Sample;

/// A threshold crossing detected during one evaluation.
///
/// Carried values are rounded to two decimals at construction; `Display`
/// renders the warning text broadcast to connected sessions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Alert {
    LowThroughput { tps: f64 },
    HighMemory { used_percent: f64 },
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Alert::LowThroughput { tps } => {
                write!(f, "Warning: Low TPS detected! Current TPS: {tps}")
            }
            Alert::HighMemory { used_percent } => {
                write!(f, "Warning: High memory usage! Current usage: {used_percent}%")
            }
        }
    }
}

/// Compares one sample against the configured limits.
///
/// The two checks are independent and may both fire in the same call.
/// Comparisons are strict: a sample sitting exactly on a threshold raises
/// nothing.
pub fn evaluate(sample: &Sample, thresholds: &Thresholds) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if sample.tps < thresholds.low_tps {
        alerts.push(Alert::LowThroughput {
            tps: round2(sample.tps),
        });
    }

    if sample.used_percent > thresholds.high_memory_percent {
        alerts.push(Alert::HighMemory {
            used_percent: round2(sample.used_percent),
        });
    }

    alerts
}

fn round2(value: f64) -> f64 {
    if value.is_finite() {
        (value * 100.0).round() / 100.0
    } else {
        value
    }
}
