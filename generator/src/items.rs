// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Registry items of the node configuration and monitoring data

use cgm::catalog::{CONFIG_POINT, GENERAL, PACKAGES};
use cgm::{Catalog, CgmResult};
use registry::{ItemSchema, RegistryMeta, ValueKind};

/// Registration point of monitoring data
pub const MONITORING_POINT: &str = "node.monitoring";

pub const PROJECT: &str = "core.project";
pub const INTERFACES: &str = "core.interfaces";
pub const VPN_SERVERS: &str = "core.vpn.server";

pub const GENERAL_CONFIG: &str = "GeneralConfig";
pub const ETHERNET_INTERFACE: &str = "EthernetInterfaceConfig";
pub const WIFI_RADIO: &str = "WifiRadioDeviceConfig";
pub const OLSRD_PACKAGE: &str = "OlsrdPackageConfig";
pub const TUNNELDIGGER_PACKAGE: &str = "TunneldiggerPackageConfig";
pub const VPN_SERVER: &str = "VpnServerConfig";

pub(crate) fn register(catalog: &mut Catalog) -> CgmResult<()> {
    use ValueKind::{Bool, Int, Str};

    let config = [
        ItemSchema::new(GENERAL, RegistryMeta::new("General configuration", 0)).variant(
            GENERAL_CONFIG,
            &[("name", Str), ("platform", Str), ("router", Str)],
        ),
        ItemSchema::new(PROJECT, RegistryMeta::new("Project", 1))
            .variant("ProjectConfig", &[("project", Str)]),
        ItemSchema::new(INTERFACES, RegistryMeta::new("Interfaces", 10).multiple())
            .variant(ETHERNET_INTERFACE, &[("eth_port", Str), ("enabled", Bool)])
            .variant(
                WIFI_RADIO,
                &[
                    ("wifi_radio", Str),
                    ("protocol", Str),
                    ("channel", Int),
                    ("enabled", Bool),
                ],
            ),
        ItemSchema::new(PACKAGES, RegistryMeta::new("Packages", 20).multiple())
            .variant(OLSRD_PACKAGE, &[("enabled", Bool)])
            .variant(TUNNELDIGGER_PACKAGE, &[("enabled", Bool)]),
        ItemSchema::new(VPN_SERVERS, RegistryMeta::new("VPN servers", 30).multiple()).variant(
            VPN_SERVER,
            &[("protocol", Str), ("hostname", Str), ("port", Int)],
        ),
    ];
    for schema in config {
        catalog.register_item(CONFIG_POINT, schema)?;
    }

    let monitoring = [
        ItemSchema::new("core.general", RegistryMeta::new("General monitoring", 0)).variant(
            "GeneralMonitor",
            &[("firmware", Str), ("uptime", Int)],
        ),
        ItemSchema::new("core.status", RegistryMeta::new("Status", 1))
            .variant("StatusMonitor", &[("network", Str), ("monitored", Bool)]),
    ];
    for schema in monitoring {
        catalog.register_item(MONITORING_POINT, schema)?;
    }

    for (value, label) in [("openvpn", "OpenVPN"), ("tunneldigger", "Tunneldigger")] {
        catalog.register_choice(CONFIG_POINT, "core.vpn.server#protocol", value, label);
    }
    for protocol in cgm::protocols::ProtocolId::identifiers() {
        catalog.register_choice(
            CONFIG_POINT,
            "core.interfaces#protocol",
            protocol,
            protocol,
        );
    }
    Ok(())
}
