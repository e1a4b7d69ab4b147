// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Generator configuration

use cgm::UciFormat;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracectl::{TracingControl, get_trace_ctl};
use tracing::debug;

use crate::errors::{PipelineError, PipelineResult};

/// Name of the rule profile used unless configured otherwise
pub const DEFAULT_PROFILE: &str = "default";

fn default_profile() -> String {
    DEFAULT_PROFILE.to_owned()
}
fn default_commit() -> bool {
    true
}

/// Settings of the configuration generator
#[derive(Builder, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[builder(setter(into))]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// rule profile evaluated before generation
    #[builder(default = "default_profile()")]
    #[serde(default = "default_profile")]
    pub profile: String,

    /// commit the rule mutations once a build succeeded
    #[builder(default = "default_commit()")]
    #[serde(default = "default_commit")]
    pub commit: bool,

    #[builder(default)]
    #[serde(default)]
    pub format: UciFormat,

    /// tracing configuration, as `tag=level,...`
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub tracing: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            commit: default_commit(),
            format: UciFormat::default(),
            tracing: None,
        }
    }
}

impl From<GeneratorConfigBuilderError> for PipelineError {
    fn from(value: GeneratorConfigBuilderError) -> Self {
        PipelineError::Config(value.to_string())
    }
}

impl GeneratorConfig {
    /// Parse a YAML configuration document
    pub fn from_yaml(input: &str) -> PipelineResult<Self> {
        let config: Self = serde_yaml_ng::from_str(input)
            .map_err(|e| PipelineError::Config(format!("Invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML configuration file
    pub fn load(path: &Path) -> PipelineResult<Self> {
        debug!("Loading configuration from {}", path.display());
        let input = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::Config(format!("{}: {e}", path.display())))?;
        Self::from_yaml(&input)
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if self.profile.trim().is_empty() {
            return Err(PipelineError::Config("Empty rule profile name".to_owned()));
        }
        if let Some(tracing) = &self.tracing {
            let levels = TracingControl::parse_tracing_config(tracing)
                .map_err(|e| PipelineError::Config(e.to_string()))?;
            let tags: Vec<&str> = levels.keys().map(String::as_str).collect();
            get_trace_ctl()
                .check_tags(&tags)
                .map_err(|e| PipelineError::Config(e.to_string()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::{GeneratorConfig, GeneratorConfigBuilder};
    use crate::errors::PipelineError;
    use cgm::UciFormat;
    use pretty_assertions::assert_eq;

    #[test]
    fn builder_defaults() {
        let config = GeneratorConfigBuilder::default()
            .format(UciFormat::Files)
            .build()
            .unwrap();
        assert_eq!(config.profile, "default");
        assert!(config.commit);
        assert_eq!(config.format, UciFormat::Files);
        assert_eq!(config.tracing, None);
        assert_eq!(GeneratorConfig::default().format, UciFormat::Dump);
    }

    #[test]
    fn from_yaml() {
        let config = GeneratorConfig::from_yaml(
            "profile: lab\ncommit: false\nformat: files\ntracing: \"default=warn,rules=debug\"\n",
        )
        .unwrap();
        assert_eq!(
            config,
            GeneratorConfigBuilder::default()
                .profile("lab")
                .commit(false)
                .format(UciFormat::Files)
                .tracing("default=warn,rules=debug")
                .build()
                .unwrap()
        );
        assert_eq!(GeneratorConfig::from_yaml("{}").unwrap(), GeneratorConfig::default());
    }

    #[test]
    fn invalid() {
        assert!(matches!(
            GeneratorConfig::from_yaml("profile: \"\"\n"),
            Err(PipelineError::Config(_))
        ));
        assert!(matches!(
            GeneratorConfig::from_yaml("tracing: \"no-such-tag=debug\"\n"),
            Err(PipelineError::Config(_))
        ));
        assert!(matches!(
            GeneratorConfig::from_yaml("format: xml\n"),
            Err(PipelineError::Config(_))
        ));
        assert!(matches!(
            GeneratorConfig::from_yaml("commits: true\n"),
            Err(PipelineError::Config(_))
        ));
    }
}
