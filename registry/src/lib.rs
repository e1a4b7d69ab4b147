// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Node configuration registry model.
//!
//! A node's configuration is stored per registration point (e.g. `node.config`) as a
//! [`Snapshot`]: an ordered map from registry paths (e.g. `core.vpn.server`) to the
//! [`RegistryItem`]s attached there. Item shapes are declared by [`ItemSchema`]s registered
//! on a [`RegistrationPoint`]. Rule evaluation and configuration generation never touch the
//! stored snapshot directly: they work on a [`StagedView`] whose [`Mutation`] log is only
//! handed to the [`RegistryStore`] once a run has fully succeeded.

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

pub mod errors;
pub mod item;
pub mod location;
pub mod point;
pub mod schema;
pub mod snapshot;
pub mod staged;
pub mod store;
pub mod value;

pub use errors::{RegistryError, RegistryResult}; // re-export
pub use item::{Fields, Node, NodeId, RegistryItem}; // re-export
pub use location::Location; // re-export
pub use point::{Choice, RegistrationPoint}; // re-export
pub use schema::{ItemSchema, RegistryMeta}; // re-export
pub use snapshot::{Mutation, Snapshot}; // re-export
pub use staged::StagedView; // re-export
pub use store::{MemoryStore, RegistryStore}; // re-export
pub use value::{Value, ValueKind}; // re-export

use tracectl::trace_target;
trace_target!("registry", LevelFilter::INFO, &["generator"]);
