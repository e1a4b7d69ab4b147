// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

#![deny(clippy::all, clippy::pedantic)]

use args::{CmdArgs, Parser};
use cgm::Catalog;
use generator::{GeneratorConfig, NodeFile, Pipeline, PipelineError, PipelineResult};
use registry::MemoryStore;
use std::process::exit;
use std::sync::Arc;
use tracectl::{get_trace_ctl, trace_target};
use tracing::{error, info, level_filters::LevelFilter};

trace_target!("nodewatcher", LevelFilter::INFO, &[]);
fn init_logging() {
    let tctl = get_trace_ctl();
    tctl.set_default_level(LevelFilter::WARN);
}

fn setup_tracing(config: &str) {
    if let Err(e) = get_trace_ctl().setup_from_string(config) {
        eprintln!("Invalid tracing configuration: {e}");
        exit(2);
    }
}

/// The configuration file, if any, with the command line overrides
fn load_config(args: &CmdArgs) -> PipelineResult<GeneratorConfig> {
    let mut config = match args.config() {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };
    if let Some(profile) = args.profile() {
        config.profile = profile.to_owned();
    }
    if let Some(format) = args.format() {
        config.format = format;
    }
    config.validate()?;
    Ok(config)
}

fn list_devices(catalog: &Catalog) {
    for (platform, router) in catalog.iter_routers() {
        println!("[{platform}] {router}");
    }
}

fn run(args: &CmdArgs, config: GeneratorConfig, catalog: Catalog) -> PipelineResult<String> {
    let Some(path) = args.node() else {
        return Err(PipelineError::Config("No node file given".to_owned()));
    };
    let store = Arc::new(MemoryStore::new());
    let (node, mut edits) = NodeFile::load(path)?.install(&store);
    edits.extend(args.edits());

    let format = config.format;
    let pipeline = Pipeline::new(
        Arc::new(catalog),
        Arc::new(generator::defaults::rule_book()),
        store,
        config,
    );
    if args.validate_only() {
        pipeline.validate(&node, edits)?;
        Ok(format!("Configuration of node {node} is valid\n"))
    } else {
        Ok(pipeline.build(&node, edits)?.tree.render(format))
    }
}

fn main() {
    /* parse cmd line args */
    let args = CmdArgs::parse();
    init_logging();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            exit(2);
        }
    };
    // the command line wins over the configuration file
    if let Some(tracing) = &config.tracing {
        setup_tracing(tracing);
    }
    if let Some(tracing) = args.tracing() {
        setup_tracing(tracing);
    }
    if args.show_tracing_tags() {
        get_trace_ctl().dump_targets_by_tag();
        exit(0);
    }
    if args.show_tracing_targets() {
        get_trace_ctl().dump();
        exit(0);
    }
    if args.tracing_config_generate() {
        println!("{}", get_trace_ctl().as_config_string());
        exit(0);
    }

    let catalog = match generator::startup::catalog() {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("Could not register the built-in platforms: {e}");
            exit(1);
        }
    };
    if args.list_devices() {
        list_devices(&catalog);
        exit(0);
    }

    info!("Using rule profile '{}'", config.profile);
    match run(&args, config, catalog) {
        Ok(output) => print!("{output}"),
        Err(e) => {
            if let Some(messages) = e.validation_messages() {
                eprintln!("Validation failed:");
                for message in messages {
                    eprintln!("  - {message}");
                }
                exit(1);
            }
            eprintln!("Error: {e}");
            exit(2);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::load_config;
    use args::{CmdArgs, Parser};
    use cgm::UciFormat;
    use pretty_assertions::assert_eq;

    #[test]
    fn command_line_overrides() {
        let args = CmdArgs::try_parse_from([
            "nodewatcher-gen",
            "--node",
            "kamra.yaml",
            "--profile",
            "lab",
            "--format",
            "files",
        ])
        .unwrap();
        let config = load_config(&args).unwrap();
        assert_eq!(config.profile, "lab");
        assert_eq!(config.format, UciFormat::Files);
        assert!(config.commit);

        let args =
            CmdArgs::try_parse_from(["nodewatcher-gen", "--node", "kamra.yaml", "--profile", ""])
                .unwrap();
        assert!(load_config(&args).is_err());
    }
}
