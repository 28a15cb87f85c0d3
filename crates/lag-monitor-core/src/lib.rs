// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Embedding surface for the performance monitor.
//!
//! A host server process builds a [`config::ServicesConfig`] (directly or via
//! `from_env`), injects its capabilities as [`services::HostCollaborators`],
//! and calls [`services::MonitorServices::start`]. The returned handle drives
//! the operator commands (`checkperformance`, `optimize`), receives session
//! activity events, and stops the recurring check at process shutdown.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod config;
pub mod error;
pub mod services;
