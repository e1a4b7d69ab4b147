// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Registry access failures

use crate::value::{Value, ValueKind};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("Unknown registration point '{0}'")]
    UnknownPoint(String),
    #[error("Registry location '{0}' is not registered")]
    UnknownLocation(String),
    #[error("Variant '{variant}' is not registered for '{path}'")]
    UnknownVariant { path: String, variant: String },
    #[error("Field '{field}' is not declared for '{path}'")]
    UnknownField { path: String, field: String },
    #[error("Field '{location}' holds {expected} values, got '{found}'")]
    FieldType {
        location: String,
        expected: ValueKind,
        found: Value,
    },
    #[error("Registry item '{0}' is singular")]
    NotMultiple(String),
    #[error("Path '{0}' holds several entries but an attribute was requested")]
    ListAttribute(String),
    #[error("No entry {index} at '{path}' (it has {len})")]
    NoSuchEntry {
        path: String,
        index: usize,
        len: usize,
    },
    #[error("Field '{field}' of '{path}' is declared both as {first} and {second}")]
    ConflictingSchema {
        path: String,
        field: String,
        first: ValueKind,
        second: ValueKind,
    },
    #[error("'{value}' is not a registered choice for '{location}'")]
    UnknownChoice { location: String, value: String },
}

/// Result-like type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;
