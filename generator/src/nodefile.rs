// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Node data files: a node and its stored configuration, in YAML
//!
//! ```yaml
//! id: 6f1c3c35-0a4f-4cd0-9a43-1bb0a7c6c1a2
//! name: kamra
//! config:
//!   core.general:
//!     - variant: GeneralConfig
//!       fields: { name: kamra, platform: openwrt, router: tp-wr741ndv4 }
//! edits:
//!   - op: assign
//!     path: core.general
//!     index: 0
//!     fields: { router: tp-wdr4300v1 }
//! ```
//!
//! The `edits` are pending changes made by an operator: they are staged on top of
//! the stored configuration before the rules are evaluated.

use cgm::catalog::CONFIG_POINT;
use registry::{MemoryStore, Mutation, Node, NodeId, Snapshot};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::errors::{PipelineError, PipelineResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeFile {
    pub id: NodeId,
    pub name: String,
    /// the stored items under the `node.config` registration point
    #[serde(default)]
    pub config: Snapshot,
    /// pending edits, not yet committed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edits: Vec<Mutation>,
}

impl NodeFile {
    pub fn from_yaml(input: &str) -> PipelineResult<Self> {
        serde_yaml_ng::from_str(input)
            .map_err(|e| PipelineError::Config(format!("Invalid node file: {e}")))
    }
    pub fn load(path: &Path) -> PipelineResult<Self> {
        debug!("Loading node from {}", path.display());
        let input = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::Config(format!("{}: {e}", path.display())))?;
        Self::from_yaml(&input)
    }
    #[must_use]
    pub fn node(&self) -> Node {
        Node::new(self.id, &self.name)
    }
    /// Put the node's configuration in a store, replacing what the store had for it.
    /// Returns the node and its pending edits.
    #[must_use]
    pub fn install(self, store: &MemoryStore) -> (Node, Vec<Mutation>) {
        let node = self.node();
        store.store(node.id, CONFIG_POINT, self.config);
        (node, self.edits)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::NodeFile;
    use cgm::catalog::CONFIG_POINT;
    use pretty_assertions::assert_eq;
    use registry::{MemoryStore, Mutation, NodeId, RegistryItem, RegistryStore, Value};

    const NODE: &str = r"
id: 00000000-0000-0000-0000-00000000002a
name: kamra
config:
  core.general:
    - variant: GeneralConfig
      fields: { name: kamra, platform: openwrt, router: tp-wr741ndv4 }
  core.packages:
    - variant: OlsrdPackageConfig
      fields: { enabled: true }
  core.vpn.server:
    - variant: VpnServerConfig
      fields: { protocol: tunneldigger, hostname: broker.example.net, port: 8942 }
edits:
  - op: clear
    path: core.packages
";

    #[test]
    fn load_node() {
        let file = NodeFile::from_yaml(NODE).unwrap();
        assert_eq!(file.id, NodeId::from_u128(42));
        assert_eq!(file.node().to_string(), format!("kamra ({})", NodeId::from_u128(42)));
        assert_eq!(
            file.config.get("core.vpn.server"),
            &[RegistryItem::new("VpnServerConfig")
                .with("protocol", "tunneldigger")
                .with("hostname", "broker.example.net")
                .with("port", 8942)]
        );
        assert_eq!(
            file.config.get("core.packages")[0].get("enabled"),
            &Value::Bool(true)
        );

        assert_eq!(
            file.edits,
            vec![Mutation::Clear {
                path: "core.packages".to_owned()
            }]
        );

        let store = MemoryStore::new();
        let (node, edits) = file.clone().install(&store);
        assert_eq!(store.load(node.id, CONFIG_POINT).unwrap(), file.config);
        assert_eq!(edits.len(), 1);
    }

    #[test]
    fn bad_node() {
        assert!(NodeFile::from_yaml("name: x\n").is_err());
        assert!(NodeFile::from_yaml("id: 42\nname: x\n").is_err());
        assert!(
            NodeFile::from_yaml(
                "id: 00000000-0000-0000-0000-00000000002a\nname: x\nedits: [{ op: rename }]\n"
            )
            .is_err()
        );
    }
}
