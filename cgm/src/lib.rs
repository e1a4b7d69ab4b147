// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Configuration generating modules.
//!
//! A [`Catalog`] holds the platforms, router descriptors and configuration generating
//! modules known to the process, plus the registration points they declare items on. It is
//! populated once at startup and read-only afterwards. The [`Dispatcher`] runs the modules
//! of a node's platform against a staged view of its configuration, building an
//! [`OutputConfigTree`].

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

pub mod catalog;
pub mod devices;
pub mod dispatch;
pub mod errors;
pub mod protocols;
pub mod tree;

pub use catalog::{Catalog, ModuleFn, PackageFn, Platform, PlatformModule, PlatformPackage}; // re-export
pub use devices::{RouterDescriptor, RouterDescriptorBuilder}; // re-export
pub use dispatch::{DispatchState, Dispatcher, NodeView}; // re-export
pub use errors::{CgmError, CgmResult, ValidationErrors}; // re-export
pub use tree::{OutputConfigTree, UciFormat}; // re-export

use tracectl::trace_target;
trace_target!("cgm", LevelFilter::INFO, &["generator"]);
