// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Node configuration generator.
//!
//! [`startup::catalog`] builds the process catalog: the node configuration items, the
//! OpenWrt platform with its modules and packages, and the built-in routers. A
//! [`Pipeline`] then generates the configuration of nodes: it evaluates the rules of the
//! configured profile on a staged view of a node's configuration and runs the platform's
//! modules on the adjusted view.

#![deny(
    unsafe_code,
    clippy::all,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod defaults;
pub mod devices;
pub mod errors;
pub mod items;
pub mod nodefile;
pub mod openwrt;
pub mod pipeline;
pub mod startup;

pub use config::{DEFAULT_PROFILE, GeneratorConfig, GeneratorConfigBuilder}; // re-export
pub use errors::{PipelineError, PipelineResult}; // re-export
pub use nodefile::NodeFile; // re-export
pub use pipeline::{Generated, Pipeline}; // re-export

use tracectl::trace_target;
trace_target!("generator", LevelFilter::INFO, &[]);
