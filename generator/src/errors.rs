// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Errors of a pipeline run

use cgm::CgmError;
use registry::RegistryError;
use rules::RuleError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PipelineError {
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Cgm(#[from] CgmError),
    #[error("Rule evaluation failed: {0}")]
    Rule(#[from] RuleError),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    /// The validation messages, if the run failed validation
    #[must_use]
    pub fn validation_messages(&self) -> Option<Vec<String>> {
        match self {
            PipelineError::Cgm(CgmError::ValidationErrors(errors)) => {
                Some(errors.messages().to_vec())
            }
            PipelineError::Cgm(CgmError::Validation(msg)) => Some(vec![msg.clone()]),
            _ => None,
        }
    }
    /// Whether the run failed validation, as opposed to a fatal error
    #[must_use]
    pub fn is_validation(&self) -> bool {
        self.validation_messages().is_some()
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::PipelineError;
    use cgm::{CgmError, ValidationErrors};
    use rules::RuleError;

    #[test]
    fn validation_messages() {
        let mut errors = ValidationErrors::new();
        errors.push(CgmError::validation("a"));
        errors.push(CgmError::validation("b"));
        let e = PipelineError::from(CgmError::ValidationErrors(errors));
        assert_eq!(
            e.validation_messages(),
            Some(vec!["a".to_owned(), "b".to_owned()])
        );
        assert_eq!(e.to_string(), "Validation failed: a; b");

        let e = PipelineError::from(RuleError::UnknownProfile("lab".to_owned()));
        assert_eq!(e.validation_messages(), None);
        assert!(!e.is_validation());
    }
}
