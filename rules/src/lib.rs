// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Declarative rules adjusting a node's configuration before it is generated.
//!
//! Rules are built with a [`Scope`], which binds short names (`project`, `router`,
//! `vpn`, ...) to registry locations, and are grouped in rule sets registered per
//! profile in a [`RuleBook`]. The [`Engine`] evaluates a rule set against a staged
//! view of a node's configuration: conditions are checked in order and the actions of
//! the rules that hold mutate the staged view.

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

pub mod action;
pub mod book;
pub mod engine;
pub mod errors;
pub mod expr;
pub mod rule;
pub mod scope;

pub use action::Action; // re-export
pub use book::{RuleBook, RuleSetFn}; // re-export
pub use engine::{Engine, ResultSet}; // re-export
pub use errors::{RuleError, RuleResult}; // re-export
pub use expr::{CmpOp, Expr, literal}; // re-export
pub use rule::{Rule, Step, rule}; // re-export
pub use scope::{Scope, Target}; // re-export

use tracectl::trace_target;
trace_target!("rules", LevelFilter::INFO, &["generator"]);
