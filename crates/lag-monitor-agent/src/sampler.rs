// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Reads instantaneous throughput and memory figures from the host.
//!
//! Sampling is a pure read: every call produces a fresh [`Sample`] and
//! nothing is retained between calls.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::host::PerformanceProbe;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// One instantaneous health reading. Never stored beyond the call that
/// produced it.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Sample {
    /// Ticks per second the host is currently completing.
    pub tps: f64,
    pub memory_used_mb: f64,
    pub memory_limit_mb: f64,
    /// `memory_used_mb / memory_limit_mb * 100`; infinite when the limit
    /// resolves to zero, so a broken ceiling reads as over any threshold
    /// instead of dividing by zero.
    pub used_percent: f64,
}

#[derive(Clone)]
pub struct MetricSampler {
    probe: Arc<dyn PerformanceProbe>,
}

impl MetricSampler {
    pub fn new(probe: Arc<dyn PerformanceProbe>) -> Self {
        Self { probe }
    }

    pub fn sample(&self) -> Sample {
        let tps = self.probe.throughput_rate();
        let memory_used_mb = self.probe.memory_usage_mb();
        let memory_limit_mb = parse_memory_ceiling_mb(&self.probe.memory_ceiling());

        let used_percent = if memory_limit_mb == 0.0 {
            f64::INFINITY
        } else {
            (memory_used_mb / memory_limit_mb) * 100.0
        };

        Sample {
            tps,
            memory_used_mb,
            memory_limit_mb,
            used_percent,
        }
    }
}

/// Parses a memory ceiling string into megabytes.
///
/// A trailing `M` is megabytes as given, a trailing `G` is gigabytes
/// (x1024), anything else is treated as a raw byte count. Suffix matching is
/// case-sensitive. Garbage input falls through the byte-count branch and
/// parses to 0.0 MB; the evaluator then reports an infinite utilization
/// rather than the sampler failing, so a misconfigured ceiling shows up as a
/// high-memory alert storm instead of a crash.
pub fn parse_memory_ceiling_mb(ceiling: &str) -> f64 {
    let ceiling = ceiling.trim();

    if let Some(mb) = ceiling.strip_suffix('M') {
        return parse_or_zero(mb);
    }
    if let Some(gb) = ceiling.strip_suffix('G') {
        return parse_or_zero(gb) * 1024.0;
    }

    parse_or_zero(ceiling) / BYTES_PER_MB
}

fn parse_or_zero(value: &str) -> f64 {
    match value.parse::<f64>() {
        Ok(parsed) => parsed,
        Err(_) => {
            debug!("Could not parse memory ceiling component '{value}', treating as 0");
            0.0
        }
    }
}
