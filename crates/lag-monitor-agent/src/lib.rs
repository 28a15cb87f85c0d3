// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Performance-monitoring and resource-reclamation engine for a live server
//! process.
//!
//! The agent samples throughput and memory on a fixed cadence, broadcasts
//! alerts when configured thresholds are crossed, and exposes an on-demand
//! reclamation pipeline (entity cleanup, region unload, idle-session region
//! unload, stale-record purge). Everything it needs from the host process is
//! injected through the capability traits in [`host`].

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod activity;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod host;
pub mod monitor;
pub mod reclamation;
pub mod sampler;
