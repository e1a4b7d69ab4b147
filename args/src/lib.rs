// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

pub use clap::Parser;
use cgm::UciFormat;
use registry::{Fields, Location, Mutation, Value};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// A pending edit given on the command line: `path[#index]#field=value`, the index
/// defaulting to the first entry. The value is kept as text: it is read with the
/// declared kind of the field when the edit is staged.
#[derive(Debug, Clone, PartialEq)]
pub struct EditArg {
    location: Location,
    index: usize,
    value: String,
}

impl FromStr for EditArg {
    type Err = String;
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (target, value) = input
            .split_once('=')
            .ok_or_else(|| format!("Missing value in '{input}'"))?;
        let (path, field) = target
            .rsplit_once('#')
            .ok_or_else(|| format!("Missing field in '{target}'"))?;
        let (path, index) = match path.split_once('#') {
            Some((path, index)) => {
                let index = index
                    .parse::<usize>()
                    .map_err(|e| format!("Bad entry index '{index}': {e}"))?;
                (path, index)
            }
            None => (path, 0),
        };
        if path.is_empty() || field.is_empty() {
            return Err(format!("Bad location '{target}'"));
        }
        Ok(EditArg {
            location: Location::field(path, field),
            index,
            value: value.to_owned(),
        })
    }
}

impl EditArg {
    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }
    /// The edit as a staged assignment
    #[must_use]
    pub fn mutation(&self) -> Mutation {
        let mut fields = Fields::new();
        if let Some(field) = self.location.field_name() {
            fields.insert(field.to_owned(), Value::from(self.value.as_str()));
        }
        Mutation::Assign {
            path: self.location.path().to_owned(),
            index: self.index,
            fields,
        }
    }
}

#[derive(Parser)]
#[command(name = "nodewatcher-gen")]
#[command(version)]
#[command(about = "Generates the firmware configuration of a mesh node", long_about = None)]
#[allow(clippy::struct_excessive_bools)]
pub struct CmdArgs {
    #[arg(long, value_name = "generator configuration (YAML)")]
    config: Option<PathBuf>,

    #[arg(
        long,
        value_name = "node file (YAML)",
        required_unless_present_any = ["show_tracing_tags", "show_tracing_targets", "tracing_config_generate", "list_devices"]
    )]
    node: Option<PathBuf>,

    #[arg(
        long = "set",
        value_name = "path[#index]#field=value",
        help = "Stage an edit of the node configuration before generating it. May be repeated."
    )]
    edits: Vec<EditArg>,

    #[arg(long, help = "Only validate the configuration: report every problem and commit nothing")]
    validate_only: bool,

    #[arg(long, value_name = "dump|files", help = "Output format, overriding the configuration")]
    format: Option<UciFormat>,

    #[arg(long, value_name = "rule profile", help = "Rule profile, overriding the configuration")]
    profile: Option<String>,

    #[arg(long, help = "List the supported routers and exit")]
    list_devices: bool,

    #[arg(long, help = "Show the available tracing tags and exit")]
    show_tracing_tags: bool,

    #[arg(long, help = "Show the configurable tracing targets and exit")]
    show_tracing_targets: bool,

    #[arg(long, help = "generate tracing configuration as a string and exit")]
    tracing_config_generate: bool,

    #[arg(
        long,
        value_name = "tracing configuration",
        help = "Tracing config string as comma-separated sequence of tag=level, with level one in [off,error,warn,info,debug,trace].
Passing default=level sets the default log-level.
Passing all=level allows setting the log-level of all targets to level.
E.g. default=error,all=info,rules=debug will set the default target to error, and all the registered targets to info, but enable debug for the rules"
    )]
    tracing: Option<String>,
}

impl CmdArgs {
    pub fn config(&self) -> Option<&Path> {
        self.config.as_deref()
    }
    pub fn node(&self) -> Option<&Path> {
        self.node.as_deref()
    }
    /// The pending edits, in the order given
    pub fn edits(&self) -> Vec<Mutation> {
        let edits: Vec<Mutation> = self.edits.iter().map(EditArg::mutation).collect();
        debug!("{} edit(s) given on the command line", edits.len());
        edits
    }
    pub fn validate_only(&self) -> bool {
        self.validate_only
    }
    pub fn format(&self) -> Option<UciFormat> {
        self.format
    }
    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }
    pub fn list_devices(&self) -> bool {
        self.list_devices
    }
    pub fn show_tracing_tags(&self) -> bool {
        self.show_tracing_tags
    }
    pub fn show_tracing_targets(&self) -> bool {
        self.show_tracing_targets
    }
    pub fn tracing_config_generate(&self) -> bool {
        self.tracing_config_generate
    }
    pub fn tracing(&self) -> Option<&String> {
        self.tracing.as_ref()
    }
}
