// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Log-level control for the configuration generator.
//!
//! Crates declare their tracing target once with [`trace_target!`]; declarations are
//! collected at link time and the levels can then be changed at runtime, per target or
//! per tag, through the process-wide [`TracingControl`].

#![deny(unsafe_code, clippy::all, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub mod control;
pub mod display;
pub mod targets;

// re-exports
pub use control::{TraceCtlError, TracingControl, get_trace_ctl};
pub use tracing_subscriber::filter::LevelFilter;

/// Level used for the default target unless configured otherwise
pub const DEFAULT_LOGLEVEL: LevelFilter = LevelFilter::INFO;
