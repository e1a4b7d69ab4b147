// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Dispatch of a node's configuration to the modules of its platform

use registry::{Location, Node, RegistryItem, StagedView, Value};
use std::fmt::Display;
use tracing::{debug, error, info, warn};

use crate::catalog::{Catalog, GENERAL, PACKAGES, Platform};
use crate::devices::RouterDescriptor;
use crate::errors::{CgmError, CgmResult, ValidationErrors};
use crate::tree::OutputConfigTree;

/// What a module sees of the node it configures
pub struct NodeView<'a> {
    pub node: &'a Node,
    pub config: &'a StagedView<'a>,
    pub catalog: &'a Catalog,
    pub platform: &'a Platform,
    router: Option<&'a RouterDescriptor>,
}

impl<'a> NodeView<'a> {
    /// A field of the general configuration
    pub fn general(&self, field: &str) -> CgmResult<Value> {
        Ok(self.config.value(&Location::field(GENERAL, field))?)
    }
    /// The items under a registry path
    pub fn items(&self, path: &str) -> CgmResult<&'a [RegistryItem]> {
        Ok(self.config.items(path)?)
    }
    /// The descriptor of the node's router, if the node has a known router
    #[must_use]
    pub fn router(&self) -> Option<&'a RouterDescriptor> {
        self.router
    }
    /// The descriptor of the node's router. A node without a known router fails validation.
    pub fn require_router(&self) -> CgmResult<&'a RouterDescriptor> {
        self.router.ok_or_else(|| {
            let router = self
                .general("router")
                .ok()
                .and_then(|v| v.as_str().map(str::to_owned))
                .unwrap_or_default();
            if router.is_empty() {
                CgmError::validation("No router has been selected")
            } else {
                CgmError::validation(format!(
                    "Router '{router}' is not supported by platform '{}'",
                    self.platform.name()
                ))
            }
        })
    }
}

/// Progress of one dispatch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DispatchState {
    #[default]
    NotStarted,
    /// running the n-th callable (modules first, then packages)
    Running(usize),
    Completed,
    Failed,
}

impl Display for DispatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchState::NotStarted => write!(f, "not started"),
            DispatchState::Running(n) => write!(f, "running #{n}"),
            DispatchState::Completed => write!(f, "completed"),
            DispatchState::Failed => write!(f, "failed"),
        }
    }
}

/// Runs the modules of a platform for one node. Every call of [`Dispatcher::generate`]
/// is one pass, without retries.
#[derive(Debug)]
pub struct Dispatcher<'c> {
    catalog: &'c Catalog,
    state: DispatchState,
    validation: ValidationErrors,
    only_validate: bool,
}

impl<'c> Dispatcher<'c> {
    #[must_use]
    pub fn new(catalog: &'c Catalog, only_validate: bool) -> Self {
        Self {
            catalog,
            state: DispatchState::NotStarted,
            validation: ValidationErrors::new(),
            only_validate,
        }
    }
    #[must_use]
    pub fn state(&self) -> DispatchState {
        self.state
    }

    fn fail(&mut self, e: CgmError) -> CgmError {
        self.state = DispatchState::Failed;
        error!("Configuration generation failed: {e}");
        e
    }

    // collect validation errors if validating, fail otherwise
    fn check(&mut self, what: &str, result: CgmResult<()>) -> CgmResult<()> {
        match result {
            Ok(()) => Ok(()),
            Err(e) if self.only_validate && e.is_validation() => {
                warn!("{what}: {e}");
                self.validation.push(e);
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn resolve_platform(&self, config: &StagedView<'_>) -> CgmResult<&'c Platform> {
        let platform = config.value(&Location::field(GENERAL, "platform"))?;
        let Some(name) = platform.as_str() else {
            return Err(CgmError::UnsupportedPlatform(platform.to_string()));
        };
        let platform = self.catalog.platform(name)?;
        if platform.modules().is_empty() {
            return Err(CgmError::UnsupportedPlatform(name.to_owned()));
        }
        Ok(platform)
    }

    /// Generate the configuration of a node from a staged view of its configuration.
    ///
    /// When only validating, validation failures of modules and packages are collected and
    /// returned as one aggregated error once every module has run. Otherwise, and for any
    /// other error, the first failure aborts the run.
    pub fn generate(&mut self, node: &Node, config: &StagedView<'_>) -> CgmResult<OutputConfigTree> {
        self.state = DispatchState::NotStarted;
        self.validation = ValidationErrors::new();
        let platform = match self.resolve_platform(config) {
            Ok(platform) => platform,
            Err(e) => return Err(self.fail(e)),
        };
        let router = config
            .value(&Location::field(GENERAL, "router"))
            .map_err(CgmError::from)
            .map_err(|e| self.fail(e))?;
        let router = router.as_str().and_then(|id| platform.router(id));
        info!(
            "Generating configuration of node {node} (platform {}, router {})",
            platform.name(),
            router.map_or("none", |r| r.identifier.as_str())
        );

        let view = NodeView {
            node,
            config,
            catalog: self.catalog,
            platform,
            router,
        };
        let mut tree = OutputConfigTree::new();
        let mut step = 0;

        for module in platform.modules() {
            if let Some(device) = &module.device
                && router.is_none_or(|r| &r.identifier != device)
            {
                continue;
            }
            self.state = DispatchState::Running(step);
            step += 1;
            debug!("Running module '{}' (priority {})", module.name, module.priority);
            let result = (module.run)(&view, &mut tree);
            self.check(&module.name, result)?;
        }

        let packages = config.current().get(PACKAGES);
        for package in platform.packages() {
            let enabled: Vec<&RegistryItem> = packages
                .iter()
                .filter(|i| {
                    i.variant == package.config_variant && i.get("enabled") == &Value::Bool(true)
                })
                .collect();
            if enabled.is_empty() {
                continue;
            }
            self.state = DispatchState::Running(step);
            step += 1;
            debug!("Configuring package '{}'", package.name);
            let result = (package.run)(&view, &enabled, &mut tree);
            if result.is_ok() {
                tree.add_package(&package.name);
            }
            self.check(&package.name, result)?;
        }

        if !self.validation.is_empty() {
            let errors = std::mem::take(&mut self.validation);
            return Err(self.fail(CgmError::ValidationErrors(errors)));
        }
        self.state = DispatchState::Completed;
        info!("Generated configuration of node {node} in {step} step(s)");
        Ok(tree)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::{DispatchState, Dispatcher};
    use crate::catalog::{CONFIG_POINT, Catalog, GENERAL, PACKAGES};
    use crate::devices::{Port, RouterDescriptorBuilder};
    use crate::errors::CgmError;
    use pretty_assertions::assert_eq;
    use registry::{
        ItemSchema, Node, NodeId, RegistryItem, RegistryMeta, Snapshot, StagedView, ValueKind,
    };
    use std::sync::{Arc, Mutex};
    use tracing_test::traced_test;

    type Trace = Arc<Mutex<Vec<String>>>;

    fn catalog(trace: &Trace) -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .register_item(
                CONFIG_POINT,
                ItemSchema::new(GENERAL, RegistryMeta::new("General", 0)).variant(
                    "GeneralConfig",
                    &[("platform", ValueKind::Str), ("router", ValueKind::Str)],
                ),
            )
            .unwrap();
        catalog
            .register_item(
                CONFIG_POINT,
                ItemSchema::new(PACKAGES, RegistryMeta::new("Packages", 20).multiple())
                    .variant("OlsrdPackageConfig", &[("enabled", ValueKind::Bool)])
                    .variant("DiggerPackageConfig", &[("enabled", ValueKind::Bool)]),
            )
            .unwrap();
        catalog.register_platform("openwrt", "OpenWrt").unwrap();
        catalog
            .register_router(
                "openwrt",
                RouterDescriptorBuilder::default()
                    .identifier("r1")
                    .name("R1")
                    .manufacturer("Acme")
                    .architecture("ar71xx")
                    .port(Port::ethernet("lan0", "Lan0"))
                    .build()
                    .unwrap(),
            )
            .unwrap();

        for (priority, name) in [(50, "network"), (1, "general"), (50, "wireless")] {
            let trace = trace.clone();
            catalog
                .register_platform_module("openwrt", priority, name, move |_, tree| {
                    trace.lock().unwrap().push(name.to_owned());
                    tree.section("system")?;
                    Ok(())
                })
                .unwrap();
        }
        let t = trace.clone();
        catalog
            .register_device_module("openwrt", 10, "r2-switch", "r2", move |_, _| {
                t.lock().unwrap().push("r2-switch".to_owned());
                Ok(())
            })
            .unwrap();
        catalog
    }

    fn snapshot(packages: &[(&str, bool)]) -> Snapshot {
        let mut snapshot = Snapshot::new().with(
            GENERAL,
            RegistryItem::new("GeneralConfig")
                .with("platform", "openwrt")
                .with("router", "r1"),
        );
        for (variant, enabled) in packages {
            snapshot.push(PACKAGES, RegistryItem::new(variant).with("enabled", *enabled));
        }
        snapshot
    }

    fn node() -> Node {
        Node::new(NodeId::from_u128(1), "node-1")
    }

    #[traced_test]
    #[test]
    fn priority_order() {
        let trace = Trace::default();
        let catalog = catalog(&trace);
        let point = catalog.point(CONFIG_POINT).unwrap();
        let view = StagedView::new(point, snapshot(&[]));
        let mut dispatcher = Dispatcher::new(&catalog, false);
        assert_eq!(dispatcher.state(), DispatchState::NotStarted);
        dispatcher.generate(&node(), &view).unwrap();
        assert_eq!(dispatcher.state(), DispatchState::Completed);
        assert_eq!(
            *trace.lock().unwrap(),
            vec!["general".to_owned(), "network".to_owned(), "wireless".to_owned()]
        );
        assert!(logs_contain("Generated configuration of node node-1"));
    }

    #[test]
    fn enabled_packages_only() {
        let trace = Trace::default();
        let mut catalog = catalog(&trace);
        for (name, variant) in [("olsrd", "OlsrdPackageConfig"), ("digger", "DiggerPackageConfig")] {
            let trace = trace.clone();
            catalog
                .register_platform_package("openwrt", name, variant, move |_, items, _| {
                    trace.lock().unwrap().push(format!("{name}:{}", items.len()));
                    Ok(())
                })
                .unwrap();
        }
        let point = catalog.point(CONFIG_POINT).unwrap();
        let view = StagedView::new(
            point,
            snapshot(&[
                ("DiggerPackageConfig", false),
                ("OlsrdPackageConfig", true),
                ("OlsrdPackageConfig", true),
            ]),
        );
        let tree = Dispatcher::new(&catalog, false).generate(&node(), &view).unwrap();
        assert_eq!(tree.packages(), &["olsrd".to_owned()]);
        assert_eq!(trace.lock().unwrap().last().unwrap(), "olsrd:2");
    }

    #[test]
    fn validation_modes() {
        let trace = Trace::default();
        let mut catalog = catalog(&trace);
        catalog
            .register_platform_module("openwrt", 5, "radios", |_, _| {
                Err(CgmError::validation("Too many radios"))
            })
            .unwrap();
        catalog
            .register_platform_package("openwrt", "olsrd", "OlsrdPackageConfig", |_, _, _| {
                Err(CgmError::validation("No routing interface"))
            })
            .unwrap();
        let point = catalog.point(CONFIG_POINT).unwrap();
        let view = StagedView::new(point, snapshot(&[("OlsrdPackageConfig", true)]));

        let mut dispatcher = Dispatcher::new(&catalog, true);
        let Err(CgmError::ValidationErrors(errors)) = dispatcher.generate(&node(), &view) else {
            unreachable!()
        };
        assert_eq!(errors.messages(), &["Too many radios", "No routing interface"]);
        assert_eq!(dispatcher.state(), DispatchState::Failed);
        // every module ran
        assert_eq!(trace.lock().unwrap().len(), 3);

        trace.lock().unwrap().clear();
        let mut dispatcher = Dispatcher::new(&catalog, false);
        assert_eq!(
            dispatcher.generate(&node(), &view).unwrap_err(),
            CgmError::validation("Too many radios")
        );
        // stopped after 'general'
        assert_eq!(*trace.lock().unwrap(), vec!["general".to_owned()]);
    }

    #[test]
    fn fatal_errors_abort_validation() {
        let trace = Trace::default();
        let mut catalog = catalog(&trace);
        catalog
            .register_platform_module("openwrt", 5, "broken", |_, tree| {
                tree.section("not valid")?;
                Ok(())
            })
            .unwrap();
        let point = catalog.point(CONFIG_POINT).unwrap();
        let view = StagedView::new(point, snapshot(&[]));
        assert_eq!(
            Dispatcher::new(&catalog, true).generate(&node(), &view).unwrap_err(),
            CgmError::InvalidIdentifier("not valid".to_owned())
        );
    }

    #[test]
    fn unsupported_platform() {
        let trace = Trace::default();
        let mut catalog = catalog(&trace);
        catalog.register_platform("lede", "LEDE").unwrap();
        let point = catalog.point(CONFIG_POINT).unwrap();
        let snapshot = Snapshot::new().with(
            GENERAL,
            RegistryItem::new("GeneralConfig").with("platform", "lede"),
        );
        let view = StagedView::new(point, snapshot);
        let mut dispatcher = Dispatcher::new(&catalog, false);
        assert_eq!(
            dispatcher.generate(&node(), &view).unwrap_err(),
            CgmError::UnsupportedPlatform("lede".to_owned())
        );
        assert_eq!(dispatcher.state(), DispatchState::Failed);

        let view = StagedView::new(point, Snapshot::new());
        assert!(matches!(
            Dispatcher::new(&catalog, false).generate(&node(), &view),
            Err(CgmError::UnsupportedPlatform(_))
        ));
    }
}
