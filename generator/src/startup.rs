// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Startup registration pass

use cgm::{Catalog, CgmResult};
use tracing::info;

use crate::{devices, items, openwrt};

/// Build the process catalog. Registration happens here, once, in a fixed order:
/// item schemas, platforms, router descriptors, then the modules of each platform.
/// The catalog is read-only afterwards.
pub fn catalog() -> CgmResult<Catalog> {
    let mut catalog = Catalog::new();
    items::register(&mut catalog)?;
    openwrt::register_platform(&mut catalog)?;
    devices::register(&mut catalog)?;
    openwrt::register_modules(&mut catalog)?;
    info!(
        "Catalog ready: {} platform(s), {} router(s)",
        catalog.platforms().count(),
        catalog.iter_routers().count()
    );
    Ok(catalog)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::catalog;
    use crate::openwrt::OPENWRT;
    use cgm::CgmError;
    use cgm::catalog::CONFIG_POINT;
    use pretty_assertions::assert_eq;
    use registry::{Location, Value};

    #[test]
    fn startup_catalog() {
        let catalog = catalog().unwrap();
        let platform = catalog.platform(OPENWRT).unwrap();
        let modules: Vec<(&str, i32)> = platform
            .modules()
            .iter()
            .map(|m| (m.name.as_str(), m.priority))
            .collect();
        assert_eq!(
            modules,
            vec![("general", 0), ("wr741nd-leds", 20), ("network", 50)]
        );
        let packages: Vec<&str> = platform.packages().map(|p| p.name.as_str()).collect();
        assert_eq!(packages, vec!["tunneldigger", "olsrd"]);
        assert!(catalog.lookup_router(OPENWRT, "tp-wdr4300v1").is_ok());
        assert!(matches!(
            catalog.lookup_router(OPENWRT, "tp-wr1043ndv1"),
            Err(CgmError::UnknownDevice { .. })
        ));

        // platforms and routers are offered as choices of the general configuration
        let point = catalog.point(CONFIG_POINT).unwrap();
        assert!(
            point
                .check_choice(&Location::from("core.general#router"), &Value::from("ub-nano-m5"))
                .is_ok()
        );
        assert!(
            point
                .check_choice(&Location::from("core.general#platform"), &Value::from("lede"))
                .is_err()
        );
    }
}
