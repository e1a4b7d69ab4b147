// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Staged, not yet committed, working copy of a node's registry

use tracing::debug;

use crate::errors::{RegistryError, RegistryResult};
use crate::item::{Fields, RegistryItem};
use crate::location::Location;
use crate::point::RegistrationPoint;
use crate::schema::ItemSchema;
use crate::snapshot::{Mutation, Snapshot};
use crate::value::{Value, ValueKind};

/// A working copy of a snapshot. Every write is checked against the schemas of the
/// registration point and recorded, so that the changes can be committed as a whole
/// or dropped with the view.
#[derive(Debug)]
pub struct StagedView<'p> {
    point: &'p RegistrationPoint,
    original: Snapshot,
    current: Snapshot,
    log: Vec<Mutation>,
}

impl<'p> StagedView<'p> {
    #[must_use]
    pub fn new(point: &'p RegistrationPoint, snapshot: Snapshot) -> Self {
        Self {
            point,
            current: snapshot.clone(),
            original: snapshot,
            log: vec![],
        }
    }
    /// A view of a stored snapshot, its values converted to the kinds declared by the
    /// point's schemas
    pub fn load(point: &'p RegistrationPoint, mut snapshot: Snapshot) -> RegistryResult<Self> {
        point.conform(&mut snapshot)?;
        Ok(Self::new(point, snapshot))
    }
    #[must_use]
    pub fn point(&self) -> &'p RegistrationPoint {
        self.point
    }
    /// The snapshot as it was loaded
    #[must_use]
    pub fn original(&self) -> &Snapshot {
        &self.original
    }
    /// The snapshot with all staged mutations applied
    #[must_use]
    pub fn current(&self) -> &Snapshot {
        &self.current
    }
    /// The staged mutations, in the order they were made
    #[must_use]
    pub fn mutations(&self) -> &[Mutation] {
        &self.log
    }
    #[must_use]
    pub fn into_mutations(self) -> Vec<Mutation> {
        self.log
    }

    fn schema(&self, path: &str) -> RegistryResult<&'p ItemSchema> {
        self.point.schema(path)
    }

    /// The items at `path`
    pub fn items(&self, path: &str) -> RegistryResult<&[RegistryItem]> {
        self.schema(path)?;
        Ok(self.current.get(path))
    }
    /// The items at `path` having the given variant tag
    pub fn items_of(&self, path: &str, variant: &str) -> RegistryResult<Vec<&RegistryItem>> {
        Ok(self
            .items(path)?
            .iter()
            .filter(|i| i.variant == variant)
            .collect())
    }
    /// The number of items at `path`
    pub fn count(&self, path: &str) -> RegistryResult<usize> {
        Ok(self.items(path)?.len())
    }

    /// The declared kind of the field addressed by `location`
    pub fn field_kind(&self, location: &Location) -> RegistryResult<ValueKind> {
        let schema = self.schema(location.path())?;
        let field = location.field_name().unwrap_or_default();
        schema
            .field_kind(None, field)
            .ok_or_else(|| RegistryError::UnknownField {
                path: location.path().to_owned(),
                field: field.to_owned(),
            })
    }

    fn lookup(&self, snapshot: &Snapshot, location: &Location) -> RegistryResult<Value> {
        self.field_kind(location)?;
        let field = location.field_name().unwrap_or_default();
        match snapshot.get(location.path()) {
            [] => Ok(Value::Null),
            [item] => Ok(item.get(field).clone()),
            _ => Err(RegistryError::ListAttribute(location.path().to_owned())),
        }
    }
    /// The value of a field of the single item at a path; [`Value::Null`] if there is no item
    pub fn value(&self, location: &Location) -> RegistryResult<Value> {
        self.lookup(&self.current, location)
    }
    /// Same as [`StagedView::value`], on the snapshot as loaded
    pub fn original_value(&self, location: &Location) -> RegistryResult<Value> {
        self.lookup(&self.original, location)
    }
    /// The values of a field across all the items at a path
    pub fn values(&self, location: &Location) -> RegistryResult<Vec<Value>> {
        self.field_kind(location)?;
        let field = location.field_name().unwrap_or_default();
        Ok(self
            .current
            .get(location.path())
            .iter()
            .map(|item| item.get(field).clone())
            .collect())
    }
    /// Tell if the staged content of a location differs from the loaded one
    pub fn changed(&self, location: &Location) -> RegistryResult<bool> {
        if location.field_name().is_some() {
            Ok(self.value(location)? != self.original_value(location)?)
        } else {
            self.schema(location.path())?;
            Ok(self.current.get(location.path()) != self.original.get(location.path()))
        }
    }

    fn check(&self, schema: &ItemSchema, variant: &str, fields: &Fields) -> RegistryResult<()> {
        schema.check_fields(variant, fields)?;
        for (field, value) in fields {
            self.point
                .check_choice(&Location::field(&schema.path, field), value)?;
        }
        Ok(())
    }
    fn record(&mut self, mutation: Mutation) -> RegistryResult<()> {
        self.current.apply(&mutation)?;
        debug!("Staged: {mutation}");
        self.log.push(mutation);
        Ok(())
    }

    /// Append an item at the end of `path`. Without a variant, the default variant is used.
    /// Singular paths accept an append only while they are empty.
    pub fn append(&mut self, path: &str, variant: Option<&str>, fields: Fields) -> RegistryResult<()> {
        let schema = self.schema(path)?;
        if !schema.meta.multiple && !self.current.get(path).is_empty() {
            return Err(RegistryError::NotMultiple(path.to_owned()));
        }
        let variant = match variant.or_else(|| schema.default_variant()) {
            Some(v) => v.to_owned(),
            None => {
                return Err(RegistryError::UnknownVariant {
                    path: path.to_owned(),
                    variant: String::new(),
                });
            }
        };
        self.check(schema, &variant, &fields)?;
        let item = RegistryItem { variant, fields };
        self.record(Mutation::Append {
            path: path.to_owned(),
            item,
        })
    }

    /// Remove every item at `path`. Returns how many were removed.
    pub fn clear(&mut self, path: &str) -> RegistryResult<usize> {
        let schema = self.schema(path)?;
        if !schema.meta.multiple {
            return Err(RegistryError::NotMultiple(path.to_owned()));
        }
        let removed = self.current.get(path).len();
        self.record(Mutation::Clear {
            path: path.to_owned(),
        })?;
        Ok(removed)
    }

    /// Update fields of the item at position `index` of `path`
    pub fn assign(&mut self, path: &str, index: usize, fields: Fields) -> RegistryResult<()> {
        let schema = self.schema(path)?;
        let items = self.current.get(path);
        let Some(item) = items.get(index) else {
            return Err(RegistryError::NoSuchEntry {
                path: path.to_owned(),
                index,
                len: items.len(),
            });
        };
        self.check(schema, &item.variant, &fields)?;
        self.record(Mutation::Assign {
            path: path.to_owned(),
            index,
            fields,
        })
    }

    /// Remove the items of `path` (optionally of one variant) whose fields match `filter`.
    /// Returns the positions of the removed items.
    pub fn remove(
        &mut self,
        path: &str,
        variant: Option<&str>,
        filter: &Fields,
    ) -> RegistryResult<Vec<usize>> {
        let schema = self.schema(path)?;
        if !schema.meta.multiple {
            return Err(RegistryError::NotMultiple(path.to_owned()));
        }
        let indices: Vec<usize> = self
            .current
            .get(path)
            .iter()
            .enumerate()
            .filter(|(_, item)| variant.is_none_or(|v| item.variant == v) && item.matches(filter))
            .map(|(n, _)| n)
            .collect();
        if !indices.is_empty() {
            self.record(Mutation::Remove {
                path: path.to_owned(),
                indices: indices.clone(),
            })?;
        }
        Ok(indices)
    }

    /// Stage a mutation made elsewhere (e.g. an operator's edit), with the same checks
    /// as the other writes. Field values are first converted to their declared kinds, so
    /// that an edit given as text (`"1194"`) sets an integer field.
    pub fn stage(&mut self, mutation: Mutation) -> RegistryResult<()> {
        match mutation {
            Mutation::Append { path, mut item } => {
                self.schema(&path)?
                    .conform_fields(&item.variant, &mut item.fields)?;
                self.append(&path, Some(&item.variant), item.fields)
            }
            Mutation::Clear { path } => self.clear(&path).map(|_| ()),
            Mutation::Assign {
                path,
                index,
                mut fields,
            } => {
                if let Some(item) = self.current.get(&path).get(index) {
                    self.schema(&path)?
                        .conform_fields(&item.variant, &mut fields)?;
                }
                self.assign(&path, index, fields)
            }
            Mutation::Remove { path, indices } => {
                let schema = self.schema(&path)?;
                if !schema.meta.multiple {
                    return Err(RegistryError::NotMultiple(path));
                }
                let len = self.current.get(&path).len();
                if let Some(index) = indices.iter().find(|i| **i >= len) {
                    return Err(RegistryError::NoSuchEntry {
                        path,
                        index: *index,
                        len,
                    });
                }
                self.record(Mutation::Remove { path, indices })
            }
        }
    }
}
