// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Registry snapshots and the mutations applied to them

use ordermap::OrderMap;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::errors::{RegistryError, RegistryResult};
use crate::item::{Fields, RegistryItem};

/// The items of one node under one registration point, by registry path
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    items: OrderMap<String, Vec<RegistryItem>>,
}

impl Snapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    /// Add an item at `path`, builder-style
    #[must_use]
    pub fn with(mut self, path: &str, item: RegistryItem) -> Self {
        self.push(path, item);
        self
    }
    pub fn push(&mut self, path: &str, item: RegistryItem) {
        self.items.entry(path.to_owned()).or_default().push(item);
    }
    /// The items at `path`, empty if there are none
    #[must_use]
    pub fn get(&self, path: &str) -> &[RegistryItem] {
        self.items.get(path).map(Vec::as_slice).unwrap_or_default()
    }
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }
    pub(crate) fn items_mut(&mut self) -> impl Iterator<Item = (&str, &mut [RegistryItem])> {
        self.items
            .iter_mut()
            .map(|(path, items)| (path.as_str(), items.as_mut_slice()))
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.values().all(Vec::is_empty)
    }

    /// Apply a mutation
    pub fn apply(&mut self, mutation: &Mutation) -> RegistryResult<()> {
        match mutation {
            Mutation::Append { path, item } => self.push(path, item.clone()),
            Mutation::Clear { path } => {
                if let Some(items) = self.items.get_mut(path) {
                    items.clear();
                }
            }
            Mutation::Assign {
                path,
                index,
                fields,
            } => {
                let items = self.items.entry(path.clone()).or_default();
                let len = items.len();
                let item = items.get_mut(*index).ok_or_else(|| RegistryError::NoSuchEntry {
                    path: path.clone(),
                    index: *index,
                    len,
                })?;
                for (field, value) in fields {
                    item.set(field, value.clone());
                }
            }
            Mutation::Remove { path, indices } => {
                if let Some(items) = self.items.get_mut(path) {
                    let mut index = 0;
                    items.retain(|_| {
                        let keep = !indices.contains(&index);
                        index += 1;
                        keep
                    });
                }
            }
        }
        Ok(())
    }
}

/// A change to a snapshot, as recorded by a staged view
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Mutation {
    /// Add an item at the end of a path
    Append { path: String, item: RegistryItem },
    /// Remove every item of a path
    Clear { path: String },
    /// Update some fields of the item at a position
    Assign {
        path: String,
        index: usize,
        fields: Fields,
    },
    /// Remove the items at the given positions
    Remove { path: String, indices: Vec<usize> },
}

impl Mutation {
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Mutation::Append { path, .. }
            | Mutation::Clear { path }
            | Mutation::Assign { path, .. }
            | Mutation::Remove { path, .. } => path,
        }
    }
}

impl Display for Mutation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mutation::Append { path, item } => write!(f, "append {path} {item}"),
            Mutation::Clear { path } => write!(f, "clear {path}"),
            Mutation::Assign {
                path,
                index,
                fields,
            } => {
                write!(f, "assign {path}[{index}]")?;
                for (k, v) in fields {
                    write!(f, " {k}={v}")?;
                }
                Ok(())
            }
            Mutation::Remove { path, indices } => write!(f, "remove {path} {indices:?}"),
        }
    }
}
