// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use cgm::devices::{Port, PortMapping, Profile};
use cgm::{CgmResult, RouterDescriptor, RouterDescriptorBuilder};

use crate::openwrt::OPENWRT;

// no radios: wireless interfaces are rejected by validation
fn rb2011uias_in() -> CgmResult<RouterDescriptor> {
    Ok(RouterDescriptorBuilder::default()
        .identifier("mt-rb2011uias-in")
        .name("RB2011UiAS-IN")
        .manufacturer("MikroTik")
        .url("http://routerboard.com/RB2011UiAS-IN")
        .architecture("ar71xx_mikrotik")
        .port(Port::ethernet("wan0", "Wan0"))
        .port(Port::ethernet("lan0", "Lan0"))
        .port(Port::ethernet("lan1", "Lan1"))
        .port(Port::ethernet("sfp0", "SFP"))
        .port_map(PortMapping::new(OPENWRT, "wan0", &["eth0.1"]))
        .port_map(PortMapping::new(OPENWRT, "lan0", &["eth0.2"]))
        .port_map(PortMapping::new(OPENWRT, "lan1", &["eth1.1"]))
        .port_map(PortMapping::new(OPENWRT, "sfp0", &["eth0.3"]))
        .profile(Profile::new(
            OPENWRT,
            "DefaultNoWifi",
            &[
                "openwrt-ar71xx-mikrotik-DefaultNoWifi-rootfs.tar.gz",
                "openwrt-ar71xx-mikrotik-vmlinux-lzma.elf",
                "openwrt-ar71xx-mikrotik-vmlinux-initramfs-lzma.elf",
            ],
        ))
        .build()?)
}

pub(super) fn routers() -> CgmResult<Vec<RouterDescriptor>> {
    Ok(vec![rb2011uias_in()?])
}
