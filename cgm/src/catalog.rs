// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The process-wide catalog of registration points, platforms, devices and modules.
//! It is populated by one registration pass at startup and only read afterwards.

use ordermap::OrderMap;
use registry::{Choice, ItemSchema, Location, RegistrationPoint, RegistryError, RegistryItem};
use std::fmt::Display;
use tracing::{debug, info};

use crate::devices::RouterDescriptor;
use crate::dispatch::NodeView;
use crate::errors::{CgmError, CgmResult};
use crate::tree::OutputConfigTree;

/// Registration point of the node configuration
pub const CONFIG_POINT: &str = "node.config";
/// Registry path of the general node configuration (name, platform, router)
pub const GENERAL: &str = "core.general";
/// Registry path of the package configurations
pub const PACKAGES: &str = "core.packages";

/// A platform module: configures a part of the output tree for every node of a platform
pub type ModuleFn = Box<dyn Fn(&NodeView<'_>, &mut OutputConfigTree) -> CgmResult<()> + Send + Sync>;

/// A package configurator: configures a software package, given the enabled package items
pub type PackageFn = Box<
    dyn Fn(&NodeView<'_>, &[&RegistryItem], &mut OutputConfigTree) -> CgmResult<()> + Send + Sync,
>;

pub struct PlatformModule {
    pub name: String,
    pub priority: i32,            /* lower runs first */
    pub device: Option<String>,   /* only run for nodes with this router */
    pub(crate) run: ModuleFn,
}

pub struct PlatformPackage {
    pub name: String,
    pub config_variant: String, /* variant tag of the package items under `core.packages` */
    pub(crate) run: PackageFn,
}

/// A firmware platform with its devices, modules and package configurators
pub struct Platform {
    name: String,
    label: String,
    modules: Vec<PlatformModule>,
    packages: OrderMap<String, PlatformPackage>,
    routers: OrderMap<String, RouterDescriptor>,
}

impl Platform {
    fn new(name: &str, label: &str) -> Self {
        Self {
            name: name.to_owned(),
            label: label.to_owned(),
            modules: vec![],
            packages: OrderMap::new(),
            routers: OrderMap::new(),
        }
    }
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
    /// The modules, sorted by priority. Modules of equal priority keep their registration order.
    #[must_use]
    pub fn modules(&self) -> Vec<&PlatformModule> {
        let mut modules: Vec<_> = self.modules.iter().collect();
        modules.sort_by_key(|m| m.priority);
        modules
    }
    /// The package configurators, in registration order
    pub fn packages(&self) -> impl Iterator<Item = &PlatformPackage> {
        self.packages.values()
    }
    #[must_use]
    pub fn router(&self, identifier: &str) -> Option<&RouterDescriptor> {
        self.routers.get(identifier)
    }
    pub fn routers(&self) -> impl Iterator<Item = &RouterDescriptor> {
        self.routers.values()
    }
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform")
            .field("name", &self.name)
            .field("modules", &self.modules.len())
            .field("packages", &self.packages.len())
            .field("routers", &self.routers.len())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct Catalog {
    points: OrderMap<String, RegistrationPoint>,
    platforms: OrderMap<String, Platform>,
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a registration point
    pub fn point(&self, name: &str) -> CgmResult<&RegistrationPoint> {
        self.points
            .get(name)
            .ok_or_else(|| RegistryError::UnknownPoint(name.to_owned()).into())
    }
    fn point_mut(&mut self, name: &str) -> &mut RegistrationPoint {
        self.points
            .entry(name.to_owned())
            .or_insert_with(|| RegistrationPoint::new(name))
    }
    pub fn points(&self) -> impl Iterator<Item = &RegistrationPoint> {
        self.points.values()
    }

    /// Register an item schema on a registration point, creating the point if needed
    pub fn register_item(&mut self, point: &str, schema: ItemSchema) -> CgmResult<()> {
        Ok(self.point_mut(point).register_item(schema)?)
    }

    /// Register a choice for a field. Registering a choice twice is a no-op.
    pub fn register_choice(&mut self, point: &str, location: &str, value: &str, label: &str) {
        self.point_mut(point)
            .register_choice(&Location::from(location), Choice::new(value, label));
    }

    /// Register a platform. This makes it a choice for the node platform.
    pub fn register_platform(&mut self, name: &str, label: &str) -> CgmResult<()> {
        if self.platforms.contains_key(name) {
            return Err(CgmError::DuplicateIdentifier(name.to_owned()));
        }
        self.platforms
            .insert(name.to_owned(), Platform::new(name, label));
        self.register_choice(CONFIG_POINT, &format!("{GENERAL}#platform"), name, label);
        info!("Registered platform '{name}'");
        Ok(())
    }

    /// Get a platform
    pub fn platform(&self, name: &str) -> CgmResult<&Platform> {
        self.platforms
            .get(name)
            .ok_or_else(|| CgmError::UnsupportedPlatform(name.to_owned()))
    }
    fn platform_mut(&mut self, name: &str) -> CgmResult<&mut Platform> {
        self.platforms
            .get_mut(name)
            .ok_or_else(|| CgmError::UnsupportedPlatform(name.to_owned()))
    }
    pub fn platforms(&self) -> impl Iterator<Item = &Platform> {
        self.platforms.values()
    }

    /// Register a router descriptor on a platform. A descriptor may only be registered
    /// once per platform.
    pub fn register_router(&mut self, platform: &str, router: RouterDescriptor) -> CgmResult<()> {
        router.validate()?;
        let target = self.platform_mut(platform)?;
        if target.routers.contains_key(&router.identifier) {
            return Err(CgmError::DuplicateIdentifier(format!(
                "{platform}/{}",
                router.identifier
            )));
        }
        let label = format!("{} {}", router.manufacturer, router.name);
        let identifier = router.identifier.clone();
        target.routers.insert(identifier.clone(), router);
        self.register_choice(CONFIG_POINT, &format!("{GENERAL}#router"), &identifier, &label);
        debug!("Registered router '{identifier}' on platform '{platform}'");
        Ok(())
    }

    /// Get a router descriptor
    pub fn lookup_router(&self, platform: &str, identifier: &str) -> CgmResult<&RouterDescriptor> {
        self.platform(platform)?
            .router(identifier)
            .ok_or_else(|| CgmError::UnknownDevice {
                platform: platform.to_owned(),
                router: identifier.to_owned(),
            })
    }

    /// All the registered routers, with their platform
    pub fn iter_routers(&self) -> impl Iterator<Item = (&str, &RouterDescriptor)> {
        self.platforms
            .values()
            .flat_map(|p| p.routers.values().map(move |r| (p.name.as_str(), r)))
    }

    fn add_module(&mut self, platform: &str, module: PlatformModule) -> CgmResult<()> {
        let target = self.platform_mut(platform)?;
        if target.modules.iter().any(|m| m.name == module.name) {
            debug!("Module '{}' already registered on '{platform}'", module.name);
            return Ok(());
        }
        debug!(
            "Registered module '{}' on '{platform}' with priority {}",
            module.name, module.priority
        );
        target.modules.push(module);
        Ok(())
    }

    /// Register a platform module. Registering a module name again is a no-op.
    pub fn register_platform_module<F>(
        &mut self,
        platform: &str,
        priority: i32,
        name: &str,
        module: F,
    ) -> CgmResult<()>
    where
        F: Fn(&NodeView<'_>, &mut OutputConfigTree) -> CgmResult<()> + Send + Sync + 'static,
    {
        self.add_module(
            platform,
            PlatformModule {
                name: name.to_owned(),
                priority,
                device: None,
                run: Box::new(module),
            },
        )
    }

    /// Register a platform module that only runs for nodes with the given router
    pub fn register_device_module<F>(
        &mut self,
        platform: &str,
        priority: i32,
        name: &str,
        device: &str,
        module: F,
    ) -> CgmResult<()>
    where
        F: Fn(&NodeView<'_>, &mut OutputConfigTree) -> CgmResult<()> + Send + Sync + 'static,
    {
        self.add_module(
            platform,
            PlatformModule {
                name: name.to_owned(),
                priority,
                device: Some(device.to_owned()),
                run: Box::new(module),
            },
        )
    }

    /// Register the configurator of a package. There may only be one per platform and package.
    pub fn register_platform_package<F>(
        &mut self,
        platform: &str,
        name: &str,
        config_variant: &str,
        package: F,
    ) -> CgmResult<()>
    where
        F: Fn(&NodeView<'_>, &[&RegistryItem], &mut OutputConfigTree) -> CgmResult<()>
            + Send
            + Sync
            + 'static,
    {
        let target = self.platform_mut(platform)?;
        if target.packages.contains_key(name) {
            return Err(CgmError::DuplicateIdentifier(format!("{platform}/{name}")));
        }
        target.packages.insert(
            name.to_owned(),
            PlatformPackage {
                name: name.to_owned(),
                config_variant: config_variant.to_owned(),
                run: Box::new(package),
            },
        );
        debug!("Registered package '{name}' on '{platform}'");
        Ok(())
    }
}

impl Display for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for platform in self.platforms.values() {
            writeln!(f, "{} ({}):", platform.name, platform.label)?;
            for router in platform.routers.values() {
                writeln!(
                    f,
                    "  {:<20} {} {}",
                    router.identifier, router.manufacturer, router.name
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::{CONFIG_POINT, Catalog};
    use crate::devices::{Port, RouterDescriptor, RouterDescriptorBuilder};
    use crate::errors::CgmError;
    use pretty_assertions::assert_eq;
    use registry::{Location, RegistryError, Value};

    fn router(identifier: &str) -> RouterDescriptor {
        RouterDescriptorBuilder::default()
            .identifier(identifier)
            .name("Test router")
            .manufacturer("Acme")
            .architecture("ar71xx")
            .port(Port::ethernet("lan0", "Lan0"))
            .build()
            .unwrap()
    }

    #[test]
    fn routers() {
        let mut catalog = Catalog::new();
        catalog.register_platform("openwrt", "OpenWrt").unwrap();
        catalog.register_router("openwrt", router("r1")).unwrap();
        assert_eq!(
            catalog.register_router("openwrt", router("r1")),
            Err(CgmError::DuplicateIdentifier("openwrt/r1".to_owned()))
        );
        assert_eq!(
            catalog.register_router("lede", router("r2")),
            Err(CgmError::UnsupportedPlatform("lede".to_owned()))
        );
        assert_eq!(catalog.lookup_router("openwrt", "r1").unwrap().identifier, "r1");
        assert_eq!(
            catalog.lookup_router("openwrt", "r9").unwrap_err(),
            CgmError::UnknownDevice {
                platform: "openwrt".to_owned(),
                router: "r9".to_owned()
            }
        );
        assert_eq!(catalog.iter_routers().count(), 1);
    }

    #[test]
    fn platform_choices() {
        let mut catalog = Catalog::new();
        catalog.register_platform("openwrt", "OpenWrt").unwrap();
        assert_eq!(
            catalog.register_platform("openwrt", "OpenWrt"),
            Err(CgmError::DuplicateIdentifier("openwrt".to_owned()))
        );
        catalog.register_router("openwrt", router("r1")).unwrap();

        let point = catalog.point(CONFIG_POINT).unwrap();
        let platform = Location::from("core.general#platform");
        assert!(point.check_choice(&platform, &Value::from("openwrt")).is_ok());
        assert!(point.check_choice(&platform, &Value::from("lede")).is_err());
        let routers: Vec<_> = point
            .choices(&Location::from("core.general#router"))
            .map(|c| c.label.clone())
            .collect();
        assert_eq!(routers, vec!["Acme Test router".to_owned()]);
        assert_eq!(
            catalog.point("node.monitoring").unwrap_err(),
            CgmError::Registry(RegistryError::UnknownPoint("node.monitoring".to_owned()))
        );
    }

    #[test]
    fn modules() {
        let mut catalog = Catalog::new();
        catalog.register_platform("openwrt", "OpenWrt").unwrap();
        catalog
            .register_platform_module("openwrt", 50, "network", |_, _| Ok(()))
            .unwrap();
        catalog
            .register_platform_module("openwrt", 1, "general", |_, _| Ok(()))
            .unwrap();
        catalog
            .register_platform_module("openwrt", 1, "general", |_, _| Ok(()))
            .unwrap();
        catalog
            .register_device_module("openwrt", 1, "switch", "r1", |_, _| Ok(()))
            .unwrap();
        let order: Vec<_> = catalog
            .platform("openwrt")
            .unwrap()
            .modules()
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(order, vec!["general", "switch", "network"]);

        catalog
            .register_platform_package("openwrt", "olsrd", "OlsrdPackageConfig", |_, _, _| Ok(()))
            .unwrap();
        assert_eq!(
            catalog.register_platform_package("openwrt", "olsrd", "OlsrdPackageConfig", |_, _, _| {
                Ok(())
            }),
            Err(CgmError::DuplicateIdentifier("openwrt/olsrd".to_owned()))
        );
        assert!(matches!(
            catalog.register_platform_module("lede", 1, "general", |_, _| Ok(())),
            Err(CgmError::UnsupportedPlatform(_))
        ));
    }
}
