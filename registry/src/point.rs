// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Registration points: named roots under which item schemas and field choices are registered

use ordermap::OrderMap;
use tracing::debug;

use crate::errors::{RegistryError, RegistryResult};
use crate::location::Location;
use crate::schema::ItemSchema;
use crate::snapshot::Snapshot;
use crate::value::Value;

/// An enumerated value a field may take (e.g. a platform or VPN protocol name)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub label: String,
}
impl Choice {
    #[must_use]
    pub fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_owned(),
            label: label.to_owned(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RegistrationPoint {
    name: String,
    schemas: OrderMap<String, ItemSchema>,
    choices: OrderMap<Location, OrderMap<String, Choice>>,
}

impl RegistrationPoint {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            schemas: OrderMap::new(),
            choices: OrderMap::new(),
        }
    }
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register an item schema. Registering a path again merges the variants, so
    /// registering the same schema twice leaves the point unchanged.
    pub fn register_item(&mut self, schema: ItemSchema) -> RegistryResult<()> {
        if let Some(existing) = self.schemas.get_mut(&schema.path) {
            debug!("Merging schema of '{}' in point '{}'", schema.path, self.name);
            return existing.merge(&schema);
        }
        debug!("Registering '{}' in point '{}'", schema.path, self.name);
        self.schemas.insert(schema.path.clone(), schema);
        Ok(())
    }

    /// Get the schema registered at `path`
    pub fn schema(&self, path: &str) -> RegistryResult<&ItemSchema> {
        self.schemas
            .get(path)
            .ok_or_else(|| RegistryError::UnknownLocation(path.to_owned()))
    }

    /// Item schemas sorted by their ordering key, then by registration order
    #[must_use]
    pub fn schemas(&self) -> Vec<&ItemSchema> {
        let mut schemas: Vec<_> = self.schemas.values().collect();
        schemas.sort_by_key(|s| s.meta.order);
        schemas
    }

    /// Register a choice for a field. Registering an existing value again is a no-op.
    pub fn register_choice(&mut self, location: &Location, choice: Choice) {
        let choices = self.choices.entry(location.clone()).or_default();
        if choices.contains_key(&choice.value) {
            debug!("Choice '{}' for '{location}' already registered", choice.value);
            return;
        }
        choices.insert(choice.value.clone(), choice);
    }

    /// The choices registered for a field, in registration order
    pub fn choices(&self, location: &Location) -> impl Iterator<Item = &Choice> {
        self.choices.get(location).into_iter().flat_map(|c| c.values())
    }

    /// Check a value against the choices of a field. Fields without choices accept any value.
    pub fn check_choice(&self, location: &Location, value: &Value) -> RegistryResult<()> {
        let (Some(choices), Value::Str(s)) = (self.choices.get(location), value) else {
            return Ok(());
        };
        if choices.contains_key(s) {
            Ok(())
        } else {
            Err(RegistryError::UnknownChoice {
                location: location.to_string(),
                value: s.clone(),
            })
        }
    }

    /// Convert the fields of every item of a stored snapshot to their declared kinds.
    /// Items at unregistered paths, or of unregistered variants, are rejected.
    pub fn conform(&self, snapshot: &mut Snapshot) -> RegistryResult<()> {
        for (path, items) in snapshot.items_mut() {
            let schema = self.schema(path)?;
            for item in items {
                schema.conform_fields(&item.variant, &mut item.fields)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::{Choice, RegistrationPoint};
    use crate::{
        ItemSchema, Location, RegistryError, RegistryItem, RegistryMeta, Snapshot, Value,
        ValueKind,
    };

    fn vpn_schema() -> ItemSchema {
        ItemSchema::new("core.vpn.server", RegistryMeta::new("VPN servers", 30).multiple())
            .variant(
                "VpnServerConfig",
                &[("protocol", ValueKind::Str), ("port", ValueKind::Int)],
            )
    }

    #[test]
    fn idempotent_items() {
        let mut point = RegistrationPoint::new("node.config");
        point.register_item(vpn_schema()).unwrap();
        point.register_item(vpn_schema()).unwrap();
        assert_eq!(point.schemas().len(), 1);
        assert_eq!(point.schema("core.vpn.server").unwrap(), &vpn_schema());
        assert_eq!(
            point.schema("core.nope").unwrap_err(),
            RegistryError::UnknownLocation("core.nope".to_owned())
        );
    }

    #[test]
    fn schemas_are_ordered() {
        let mut point = RegistrationPoint::new("node.config");
        point.register_item(vpn_schema()).unwrap();
        point
            .register_item(ItemSchema::new("core.general", RegistryMeta::new("General", 0)))
            .unwrap();
        let paths: Vec<_> = point.schemas().iter().map(|s| s.path.as_str()).collect();
        assert_eq!(paths, vec!["core.general", "core.vpn.server"]);
    }

    #[test]
    fn idempotent_choices() {
        let mut point = RegistrationPoint::new("node.config");
        let loc = Location::from("core.vpn.server#protocol");
        point.register_choice(&loc, Choice::new("openvpn", "OpenVPN"));
        point.register_choice(&loc, Choice::new("openvpn", "Something else"));
        point.register_choice(&loc, Choice::new("tunneldigger", "Tunneldigger"));

        let choices: Vec<_> = point.choices(&loc).map(|c| c.label.as_str()).collect();
        assert_eq!(choices, vec!["OpenVPN", "Tunneldigger"]);
        assert!(point.check_choice(&loc, &Value::from("openvpn")).is_ok());
        assert!(point.check_choice(&loc, &Value::from("pptp")).is_err());
        // fields without choices accept anything
        let port = Location::from("core.vpn.server#port");
        assert!(point.check_choice(&port, &Value::Int(1)).is_ok());
    }

    #[test]
    fn conform_stored_values() {
        let mut point = RegistrationPoint::new("node.config");
        point.register_item(vpn_schema()).unwrap();
        let mut snapshot = Snapshot::new().with(
            "core.vpn.server",
            RegistryItem::new("VpnServerConfig")
                .with("protocol", 1194)
                .with("port", "1194"),
        );
        point.conform(&mut snapshot).unwrap();
        let server = &snapshot.get("core.vpn.server")[0];
        assert_eq!(server.get("protocol"), &Value::from("1194"));
        assert_eq!(server.get("port"), &Value::Int(1194));

        let mut snapshot = Snapshot::new().with(
            "core.vpn.server",
            RegistryItem::new("VpnServerConfig").with("port", true),
        );
        assert!(matches!(
            point.conform(&mut snapshot),
            Err(RegistryError::FieldType { .. })
        ));
        let mut snapshot = Snapshot::new().with("core.nope", RegistryItem::new("Nope"));
        assert_eq!(
            point.conform(&mut snapshot),
            Err(RegistryError::UnknownLocation("core.nope".to_owned()))
        );
    }
}
