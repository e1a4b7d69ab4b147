// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Nodes and the registry items attached to them

use ordermap::OrderMap;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

use crate::value::Value;

/// Field values of a registry item, in declaration order
pub type Fields = OrderMap<String, Value>;

/// Unique node identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);
impl NodeId {
    #[allow(clippy::new_without_default)]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
    #[must_use]
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }
}
impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node of the network. Its configuration lives in the registry store, keyed by id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
}
impl Node {
    #[must_use]
    pub fn new(id: NodeId, name: &str) -> Self {
        Self {
            id,
            name: name.to_owned(),
        }
    }
}
impl Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// A configuration record. Items registered under the same path may come in several
/// variants (e.g. ethernet or wireless interfaces): the variant tag tells them apart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegistryItem {
    pub variant: String,
    #[serde(default)]
    pub fields: Fields,
}

static NULL: Value = Value::Null;

impl RegistryItem {
    #[must_use]
    pub fn new(variant: &str) -> Self {
        Self {
            variant: variant.to_owned(),
            fields: Fields::new(),
        }
    }
    /// Set a field, builder-style
    #[must_use]
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(field.to_owned(), value.into());
        self
    }
    /// Get a field, [`Value::Null`] if unset
    #[must_use]
    pub fn get(&self, field: &str) -> &Value {
        self.fields.get(field).unwrap_or(&NULL)
    }
    pub fn set(&mut self, field: &str, value: Value) {
        self.fields.insert(field.to_owned(), value);
    }
    /// Tell if every field of `filter` has the same value in this item
    #[must_use]
    pub fn matches(&self, filter: &Fields) -> bool {
        filter.iter().all(|(k, v)| self.get(k) == v)
    }
}

impl Display for RegistryItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {{", self.variant)?;
        for (n, (k, v)) in self.fields.iter().enumerate() {
            let sep = if n == 0 { " " } else { ", " };
            write!(f, "{sep}{k}: {v}")?;
        }
        write!(f, " }}")
    }
}
