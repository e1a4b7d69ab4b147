// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use cgm::tree::UciValue;
use cgm::{CgmError, CgmResult, NodeView, OutputConfigTree};
use registry::RegistryItem;

use crate::items::VPN_SERVERS;

const OLSR_TABLE: i64 = 20;
const OLSR_TABLE_PRIORITY: i64 = 1000;
const DIGGER_INTERFACE: &str = "digger0";

/// OLSR routing on every configured interface but the loopback
pub(super) fn olsrd(
    _node: &NodeView<'_>,
    _packages: &[&RegistryItem],
    cfg: &mut OutputConfigTree,
) -> CgmResult<()> {
    let interfaces: Vec<String> = cfg
        .get("network")
        .map(|network| {
            network
                .named_sections()
                .filter(|(name, section)| section.kind() == "interface" && *name != "loopback")
                .map(|(name, _)| name.to_owned())
                .collect()
        })
        .unwrap_or_default();
    if interfaces.is_empty() {
        return Err(CgmError::validation(
            "OLSR is enabled, but there are no interfaces to route on",
        ));
    }

    let olsrd = cfg.section("olsrd")?;
    olsrd
        .add_ordered("olsrd")?
        .set("SrcIpRoutes", "yes")?
        .set("RtTable", OLSR_TABLE)?;
    olsrd
        .add_ordered("Interface")?
        .set("interface", interfaces)?
        .set("IPv4Multicast", "255.255.255.255")?;

    // route everything through the olsrd table
    cfg.section("network")?
        .add_ordered("rule")?
        .set("lookup", OLSR_TABLE)?
        .set("priority", OLSR_TABLE_PRIORITY)?;
    Ok(())
}

/// Tunneldigger brokers, from the configured tunneldigger VPN servers
pub(super) fn tunneldigger(
    node: &NodeView<'_>,
    _packages: &[&RegistryItem],
    cfg: &mut OutputConfigTree,
) -> CgmResult<()> {
    let brokers: Vec<String> = node
        .items(VPN_SERVERS)?
        .iter()
        .filter(|server| server.get("protocol").as_str() == Some("tunneldigger"))
        .filter_map(|server| {
            let host = server.get("hostname").as_str()?;
            let port = server.get("port").as_int()?;
            Some(format!("{host}:{port}"))
        })
        .collect();
    if brokers.is_empty() {
        return Err(CgmError::validation(
            "Tunneldigger is enabled, but no tunneldigger server is configured",
        ));
    }

    cfg.section("network")?
        .add_named("interface", DIGGER_INTERFACE)?
        .set("ifname", DIGGER_INTERFACE)?
        .set("proto", "none")?;
    cfg.section("tunneldigger")?
        .add_ordered("broker")?
        .set("address", UciValue::List(brokers))?
        .set("uuid", node.node.id.to_string())?
        .set("interface", DIGGER_INTERFACE)?;
    cfg.section("firewall")?
        .add_ordered("zone")?
        .set("name", "tunneldigger")?
        .set("network", vec![DIGGER_INTERFACE.to_owned()])?
        .set("input", "ACCEPT")?;
    Ok(())
}
