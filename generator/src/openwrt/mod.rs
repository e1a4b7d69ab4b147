// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The OpenWrt platform: its configuration generating modules and package configurators

mod general;
mod network;
mod packages;

use cgm::{Catalog, CgmResult};

use crate::items::{OLSRD_PACKAGE, TUNNELDIGGER_PACKAGE};

pub const OPENWRT: &str = "openwrt";

pub(crate) fn register_platform(catalog: &mut Catalog) -> CgmResult<()> {
    catalog.register_platform(OPENWRT, "OpenWrt")
}

pub(crate) fn register_modules(catalog: &mut Catalog) -> CgmResult<()> {
    catalog.register_platform_module(OPENWRT, 0, "general", general::general)?;
    catalog.register_platform_module(OPENWRT, 50, "network", network::network)?;
    // tunneldigger first: olsrd routes on the tunnel interface
    catalog.register_platform_package(
        OPENWRT,
        "tunneldigger",
        TUNNELDIGGER_PACKAGE,
        packages::tunneldigger,
    )?;
    catalog.register_platform_package(OPENWRT, "olsrd", OLSRD_PACKAGE, packages::olsrd)
}
