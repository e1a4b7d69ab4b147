// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use cgm::devices::{
    DriverMapping, InternalAntenna, Polarization, Port, PortMapping, Profile, Radio, RadioFeature,
};
use cgm::protocols::{Capability, Protocol};
use cgm::{CgmResult, RouterDescriptor, RouterDescriptorBuilder};

use crate::openwrt::OPENWRT;

// Nanostations differ only by their radio
fn nano(identifier: &str, name: &str, protocol: Protocol, gain: u8) -> CgmResult<RouterDescriptor> {
    Ok(RouterDescriptorBuilder::default()
        .identifier(identifier)
        .name(name)
        .manufacturer("Ubiquiti")
        .url("http://www.ubnt.com/")
        .architecture("ar71xx")
        .radio(
            Radio::integrated("wifi0", "Integrated wireless radio")
                .protocol(protocol)
                .connector("a1", "Antenna0")
                .feature(RadioFeature::MultipleSsid),
        )
        .port(Port::ethernet("wan0", "Secondary"))
        .port(Port::ethernet("lan0", "Primary"))
        .antenna(InternalAntenna {
            identifier: "a1".to_owned(),
            polarization: Polarization::Dual,
            angle_horizontal: 60,
            angle_vertical: 30,
            gain,
        })
        .port_map(PortMapping::new(OPENWRT, "wifi0", &["radio0"]))
        .port_map(PortMapping::new(OPENWRT, "wan0", &["eth0"]))
        .port_map(PortMapping::new(OPENWRT, "lan0", &["eth1"]))
        .driver(DriverMapping::new(OPENWRT, "wifi0", "mac80211"))
        .profile(Profile::new(
            OPENWRT,
            "UBNT",
            &[
                "openwrt-ar71xx-generic-ubnt-nano-m-squashfs-factory.bin",
                "openwrt-ar71xx-generic-ubnt-nano-m-squashfs-sysupgrade.bin",
            ],
        ))
        .build()?)
}

pub(super) fn routers() -> CgmResult<Vec<RouterDescriptor>> {
    let caps = [
        Capability::ShortGi40,
        Capability::TxStbc,
        Capability::RxStbc1,
        Capability::DsssCck40,
    ];
    Ok(vec![
        nano("ub-nano-m2", "Nanostation M2", Protocol::bgn(&caps), 11)?,
        nano("ub-nano-m5", "Nanostation M5", Protocol::an(&caps), 16)?,
    ])
}
