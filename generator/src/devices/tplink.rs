// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use cgm::devices::{
    DriverMapping, InternalAntenna, Polarization, Port, PortMapping, Profile, Radio, RadioFeature,
};
use cgm::protocols::{Capability, Protocol};
use cgm::{Catalog, CgmResult, RouterDescriptor, RouterDescriptorBuilder};

use crate::openwrt::OPENWRT;

const URL: &str = "http://www.tp-link.com/";

fn omni(identifier: &str) -> InternalAntenna {
    InternalAntenna {
        identifier: identifier.to_owned(),
        polarization: Polarization::Horizontal,
        angle_horizontal: 360,
        angle_vertical: 75,
        gain: 2,
    }
}

fn wr741nd_v4() -> CgmResult<RouterDescriptor> {
    Ok(RouterDescriptorBuilder::default()
        .identifier("tp-wr741ndv4")
        .name("WR741ND (v4)")
        .manufacturer("TP-Link")
        .url(URL)
        .architecture("ar71xx")
        .radio(
            Radio::integrated("wifi0", "Integrated wireless radio")
                .protocol(Protocol::bgn(&[
                    Capability::ShortGi20,
                    Capability::ShortGi40,
                    Capability::RxStbc1,
                    Capability::DsssCck40,
                ]))
                .connector("a1", "Antenna0")
                .feature(RadioFeature::MultipleSsid),
        )
        .port(Port::ethernet("wan0", "Wan0"))
        .port(Port::ethernet("lan0", "Lan0"))
        .antenna(omni("a1"))
        .port_map(PortMapping::new(OPENWRT, "wifi0", &["radio0"]))
        .port_map(PortMapping::new(OPENWRT, "wan0", &["eth1"]))
        .port_map(PortMapping::new(OPENWRT, "lan0", &["eth0"]))
        .driver(DriverMapping::new(OPENWRT, "wifi0", "mac80211"))
        .profile(Profile::new(
            OPENWRT,
            "TLWR741",
            &[
                "openwrt-ar71xx-generic-tl-wr741nd-v4-squashfs-factory.bin",
                "openwrt-ar71xx-generic-tl-wr741nd-v4-squashfs-sysupgrade.bin",
            ],
        ))
        .build()?)
}

fn wdr4300_v1() -> CgmResult<RouterDescriptor> {
    Ok(RouterDescriptorBuilder::default()
        .identifier("tp-wdr4300v1")
        .name("WDR4300 (v1)")
        .manufacturer("TP-Link")
        .url(URL)
        .architecture("ar71xx")
        .radio(
            Radio::integrated("wifi0", "Integrated wireless radio (2.4 GHz)")
                .protocol(Protocol::bgn(&[
                    Capability::ShortGi20,
                    Capability::ShortGi40,
                    Capability::RxStbc1,
                    Capability::DsssCck40,
                ]))
                .connector("a1", "Antenna0")
                .feature(RadioFeature::MultipleSsid),
        )
        .radio(
            Radio::integrated("wifi1", "Integrated wireless radio (5 GHz)")
                .protocol(Protocol::an(&[
                    Capability::ShortGi20,
                    Capability::ShortGi40,
                    Capability::RxStbc1,
                    Capability::DsssCck40,
                ]))
                .connector("a2", "Antenna1")
                .feature(RadioFeature::MultipleSsid),
        )
        .port(Port::ethernet("wan0", "Wan0"))
        .port(Port::ethernet("lan0", "Lan0"))
        .antenna(omni("a1"))
        .antenna(omni("a2"))
        .port_map(PortMapping::new(OPENWRT, "wifi0", &["radio0"]))
        .port_map(PortMapping::new(OPENWRT, "wifi1", &["radio1"]))
        .port_map(PortMapping::new(OPENWRT, "wan0", &["eth0.2"]))
        .port_map(PortMapping::new(OPENWRT, "lan0", &["eth0.1"]))
        .driver(DriverMapping::new(OPENWRT, "wifi0", "mac80211"))
        .driver(DriverMapping::new(OPENWRT, "wifi1", "mac80211"))
        .profile(Profile::new(
            OPENWRT,
            "TLWDR4300",
            &[
                "*-ar71xx-generic-tl-wdr4300-v1-squashfs-factory.bin",
                "*-ar71xx-generic-tl-wdr4300-v1-squashfs-sysupgrade.bin",
            ],
        ))
        .build()?)
}

fn mr3020_v1() -> CgmResult<RouterDescriptor> {
    Ok(RouterDescriptorBuilder::default()
        .identifier("tp-mr3020v1")
        .name("MR3020 (v1)")
        .manufacturer("TP-Link")
        .url(URL)
        .architecture("ar71xx")
        .radio(
            Radio::integrated("wifi0", "Integrated wireless radio")
                .protocol(Protocol::bgn(&[
                    Capability::ShortGi20,
                    Capability::ShortGi40,
                    Capability::RxStbc1,
                ]))
                .connector("a1", "Antenna0"),
        )
        .port(Port::ethernet("wan0", "Wan0"))
        .antenna(omni("a1"))
        .port_map(PortMapping::new(OPENWRT, "wifi0", &["radio0"]))
        .port_map(PortMapping::new(OPENWRT, "wan0", &["eth0"]))
        .driver(DriverMapping::new(OPENWRT, "wifi0", "mac80211"))
        .profile(Profile::new(
            OPENWRT,
            "TLMR3020",
            &["openwrt-ar71xx-generic-tl-mr3020-v1-squashfs-factory.bin"],
        ))
        .build()?)
}

pub(super) fn routers() -> CgmResult<Vec<RouterDescriptor>> {
    Ok(vec![wr741nd_v4()?, wdr4300_v1()?, mr3020_v1()?])
}

/// The WR741ND v4 has its WLAN LED on a GPIO that the firmware does not bind
pub(super) fn register_modules(catalog: &mut Catalog) -> CgmResult<()> {
    catalog.register_device_module(OPENWRT, 20, "wr741nd-leds", "tp-wr741ndv4", |_, cfg| {
        cfg.section("system")?
            .add_named("led", "led_wlan")?
            .set("name", "WLAN")?
            .set("sysfs", "tp-link:green:wlan")?
            .set("trigger", "phy0tpt")?;
        Ok(())
    })
}
