// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Rule evaluation errors

use cgm::CgmError;
use registry::RegistryError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RuleError {
    #[error("Invalid predicate: {0}")]
    InvalidPredicate(String),
    #[error("Index {index} is out of range for '{path}' ({len} entries)")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },
    #[error("No rules are registered for profile '{0}'")]
    UnknownProfile(String),
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("Catalog error: {0}")]
    Cgm(#[from] CgmError),
}

pub type RuleResult<T> = Result<T, RuleError>;
