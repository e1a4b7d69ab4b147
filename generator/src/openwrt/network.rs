// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use cgm::devices::RouterDescriptor;
use cgm::protocols::{Band, Protocol};
use cgm::{CgmError, CgmResult, NodeView, OutputConfigTree, ValidationErrors};
use registry::{RegistryItem, Value};
use std::collections::HashSet;
use tracing::debug;

use crate::items::{ETHERNET_INTERFACE, INTERFACES, WIFI_RADIO};

// items are enabled unless told otherwise
fn enabled(item: &RegistryItem) -> bool {
    item.get("enabled") != &Value::Bool(false)
}

/// Name of a port or radio on the platform
fn platform_name(router: &RouterDescriptor, platform: &str, identifier: &str) -> String {
    router
        .remap(platform, identifier)
        .map_or_else(|| identifier.to_owned(), |names| names.join(" "))
}

fn loopback(cfg: &mut OutputConfigTree) -> CgmResult<()> {
    cfg.section("network")?
        .add_named("interface", "loopback")?
        .set("ifname", "lo")?
        .set("proto", "static")?
        .set("ipaddr", "127.0.0.1")?
        .set("netmask", "255.0.0.0")?;
    Ok(())
}

fn ethernet(
    node: &NodeView<'_>,
    router: &RouterDescriptor,
    cfg: &mut OutputConfigTree,
    errors: &mut ValidationErrors,
) -> CgmResult<()> {
    let mut configured = HashSet::new();
    for item in node
        .items(INTERFACES)?
        .iter()
        .filter(|i| i.variant == ETHERNET_INTERFACE)
    {
        let Some(port) = item.get("eth_port").as_str() else {
            errors.push(CgmError::validation("Ethernet interface without a port"));
            continue;
        };
        if router.port(port).is_none() {
            errors.push(CgmError::validation(format!(
                "Ethernet port '{port}' does not exist on router '{}'",
                router.identifier
            )));
            continue;
        }
        if !configured.insert(port) {
            errors.push(CgmError::validation(format!(
                "Ethernet port '{port}' is configured more than once"
            )));
            continue;
        }
        if !enabled(item) {
            debug!("Skipping disabled port '{port}'");
            continue;
        }
        cfg.section("network")?
            .add_named("interface", port)?
            .set("ifname", platform_name(router, node.platform.name(), port))?
            .set("proto", "none")?;
    }
    Ok(())
}

fn hwmode(protocol: &Protocol) -> &'static str {
    match protocol.band() {
        Band::Ghz2_4 => "11g",
        Band::Ghz5 => "11a",
    }
}

fn wireless(
    node: &NodeView<'_>,
    router: &RouterDescriptor,
    cfg: &mut OutputConfigTree,
    errors: &mut ValidationErrors,
) -> CgmResult<()> {
    let radios: Vec<&RegistryItem> = node
        .items(INTERFACES)?
        .iter()
        .filter(|i| i.variant == WIFI_RADIO)
        .collect();
    if radios.len() > router.radios.len() {
        errors.push(CgmError::validation(format!(
            "Router '{}' has {} radio(s), but {} are configured",
            router.identifier,
            router.radios.len(),
            radios.len()
        )));
        return Ok(());
    }
    let platform = node.platform.name();
    for item in radios {
        let Some(radio_id) = item.get("wifi_radio").as_str() else {
            errors.push(CgmError::validation("Wireless interface without a radio"));
            continue;
        };
        let Some(radio) = router.radio(radio_id) else {
            errors.push(CgmError::validation(format!(
                "Radio '{radio_id}' does not exist on router '{}'",
                router.identifier
            )));
            continue;
        };
        let requested = item.get("protocol").as_str().unwrap_or_default();
        let Some(protocol) = radio.get_protocol(requested) else {
            errors.push(CgmError::validation(format!(
                "Protocol '{requested}' is not supported by radio '{radio_id}'"
            )));
            continue;
        };
        let channel = match item.get("channel") {
            Value::Int(number) => {
                match u16::try_from(*number).ok().and_then(|n| protocol.channel(n)) {
                    Some(channel) => Some(channel),
                    None => {
                        errors.push(CgmError::validation(format!(
                            "Channel {number} is not valid for protocol '{}'",
                            protocol.identifier()
                        )));
                        continue;
                    }
                }
            }
            _ => None,
        };

        let name = platform_name(router, platform, radio_id);
        let device = cfg.section("wireless")?.add_named("wifi-device", &name)?;
        device
            .set("type", router.driver(platform, radio_id).unwrap_or("mac80211"))?
            .set("hwmode", hwmode(protocol))?
            .set("htmode", "HT20")?
            .set("disabled", !enabled(item))?;
        match channel {
            Some(channel) => device.set("channel", channel.number)?,
            None => device.set("channel", "auto")?,
        };
    }
    Ok(())
}

/// Network interfaces, checked against the router's ports and radios
pub(super) fn network(node: &NodeView<'_>, cfg: &mut OutputConfigTree) -> CgmResult<()> {
    let router = node.require_router()?;
    let mut errors = ValidationErrors::new();
    loopback(cfg)?;
    ethernet(node, router, cfg, &mut errors)?;
    wireless(node, router, cfg, &mut errors)?;
    if errors.is_empty() {
        Ok(())
    } else {
        Err(CgmError::ValidationErrors(errors))
    }
}
