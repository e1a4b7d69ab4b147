// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use cgm::{CgmError, CgmResult, NodeView, OutputConfigTree};

fn is_hostname(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 63
        && !name.starts_with('-')
        && !name.ends_with('-')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// System configuration: hostname, node identity and logging
pub(super) fn general(node: &NodeView<'_>, cfg: &mut OutputConfigTree) -> CgmResult<()> {
    let router = node.require_router()?;
    let name = node.general("name")?;
    let hostname = name.as_str().unwrap_or(&node.node.name);
    if !is_hostname(hostname) {
        return Err(CgmError::validation(format!(
            "Node name '{hostname}' is not a valid hostname"
        )));
    }
    cfg.section("system")?
        .add_ordered("system")?
        .set("hostname", hostname)?
        .set("uuid", node.node.id.to_string())?
        .set("log_size", 256_i64)?
        .set("timezone", "UTC")?;

    // the firmware image this configuration is meant for
    if let Some(profile) = router.profile(node.platform.name()) {
        cfg.section("nodewatcher")?
            .add_named("firmware", "image")?
            .set("router", router.identifier.as_str())?
            .set("profile", profile.name.as_str())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::is_hostname;

    #[test]
    fn hostnames() {
        assert!(is_hostname("kamra"));
        assert!(is_hostname("node-1"));
        assert!(!is_hostname(""));
        assert!(!is_hostname("-node"));
        assert!(!is_hostname("node_1"));
        assert!(!is_hostname(&"a".repeat(64)));
    }
}
