// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The errors of catalog registration and configuration generation

use registry::RegistryError;
use std::fmt::Display;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CgmError {
    #[error("Identifier '{0}' is already registered")]
    DuplicateIdentifier(String),
    #[error("Unknown device '{router}' for platform '{platform}'")]
    UnknownDevice { platform: String, router: String },
    #[error("Unsupported platform '{0}'")]
    UnsupportedPlatform(String),
    #[error("Invalid router descriptor: {0}")]
    InvalidDescriptor(String),
    #[error("Invalid UCI identifier '{0}'")]
    InvalidIdentifier(String),

    // raised by modules when a configuration can't be realized on the device
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    ValidationErrors(ValidationErrors),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}

impl CgmError {
    /// Build a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
    /// Tell if this error is a validation error. Those are collected when only
    /// validating instead of aborting the run.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::ValidationErrors(_))
    }
}

/// All the validation failures of one validation pass, in the order they occurred
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidationErrors {
    messages: Vec<String>,
}
impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    /// Add a validation error. Nested aggregates are flattened.
    pub fn push(&mut self, error: CgmError) {
        match error {
            CgmError::ValidationErrors(inner) => self.messages.extend(inner.messages),
            other => self.messages.push(other.to_string()),
        }
    }
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }
}
impl Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Validation failed: {}", self.messages.join("; "))
    }
}

/// Result-like type for catalog and generation operations
pub type CgmResult<T> = Result<T, CgmError>;
