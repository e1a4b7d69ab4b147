// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Declarations of the items that may be registered under a registry path

use ordermap::OrderMap;

use crate::errors::{RegistryError, RegistryResult};
use crate::item::Fields;
use crate::value::ValueKind;

/// Descriptive metadata of a registry item
#[derive(Clone, Debug, PartialEq)]
pub struct RegistryMeta {
    pub name: String, /* human-readable name */
    pub order: i32,   /* ordering key among the items of a registration point */
    pub multiple: bool,
}
impl RegistryMeta {
    #[must_use]
    pub fn new(name: &str, order: i32) -> Self {
        Self {
            name: name.to_owned(),
            order,
            multiple: false,
        }
    }
    #[must_use]
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }
}

/// Schema of the items at a registry path. Variants are tagged field sets; the
/// first registered variant is the default one.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemSchema {
    pub path: String,
    pub meta: RegistryMeta,
    variants: OrderMap<String, OrderMap<String, ValueKind>>,
}

impl ItemSchema {
    #[must_use]
    pub fn new(path: &str, meta: RegistryMeta) -> Self {
        Self {
            path: path.to_owned(),
            meta,
            variants: OrderMap::new(),
        }
    }
    /// Declare a variant and its fields
    #[must_use]
    pub fn variant(mut self, tag: &str, fields: &[(&str, ValueKind)]) -> Self {
        let decl = self.variants.entry(tag.to_owned()).or_default();
        for (name, kind) in fields {
            decl.insert((*name).to_owned(), *kind);
        }
        self
    }
    #[must_use]
    pub fn default_variant(&self) -> Option<&str> {
        self.variants.keys().next().map(String::as_str)
    }
    #[must_use]
    pub fn has_variant(&self, tag: &str) -> bool {
        self.variants.contains_key(tag)
    }
    pub fn variants(&self) -> impl Iterator<Item = &str> {
        self.variants.keys().map(String::as_str)
    }
    /// The kind of a field, as declared by the given variant, or by any variant if none is given
    #[must_use]
    pub fn field_kind(&self, variant: Option<&str>, field: &str) -> Option<ValueKind> {
        match variant {
            Some(tag) => self.variants.get(tag)?.get(field).copied(),
            None => self
                .variants
                .values()
                .find_map(|decl| decl.get(field).copied()),
        }
    }
    fn declared(&self, variant: &str) -> RegistryResult<&OrderMap<String, ValueKind>> {
        self.variants
            .get(variant)
            .ok_or_else(|| RegistryError::UnknownVariant {
                path: self.path.clone(),
                variant: variant.to_owned(),
            })
    }
    fn unknown_field(&self, field: &str) -> RegistryError {
        RegistryError::UnknownField {
            path: self.path.clone(),
            field: field.to_owned(),
        }
    }
    /// Check that `fields` are declared by `variant` with matching kinds. Unset values are accepted.
    pub fn check_fields(&self, variant: &str, fields: &Fields) -> RegistryResult<()> {
        let decl = self.declared(variant)?;
        for (name, value) in fields {
            let expected = decl.get(name).ok_or_else(|| self.unknown_field(name))?;
            if let Some(found) = value.kind()
                && found != *expected
            {
                return Err(RegistryError::FieldType {
                    location: format!("{}#{name}", self.path),
                    expected: *expected,
                    found: value.clone(),
                });
            }
        }
        Ok(())
    }
    /// Convert `fields` to the kinds declared by `variant` (see [`Value::conform`]).
    /// Fails like [`ItemSchema::check_fields`] on values that cannot be converted.
    ///
    /// [`Value::conform`]: crate::Value::conform
    pub fn conform_fields(&self, variant: &str, fields: &mut Fields) -> RegistryResult<()> {
        let decl = self.declared(variant)?;
        for (name, value) in fields.iter_mut() {
            let expected = *decl.get(name).ok_or_else(|| self.unknown_field(name))?;
            let Some(conformed) = value.conform(expected) else {
                return Err(RegistryError::FieldType {
                    location: format!("{}#{name}", self.path),
                    expected,
                    found: value.clone(),
                });
            };
            *value = conformed;
        }
        Ok(())
    }
    /// Merge the variants of `other` into this schema. A field declared with two kinds is an error.
    pub(crate) fn merge(&mut self, other: &ItemSchema) -> RegistryResult<()> {
        for (tag, decl) in &other.variants {
            for (field, kind) in decl {
                if let Some(first) = self.field_kind(Some(tag), field)
                    && first != *kind
                {
                    return Err(RegistryError::ConflictingSchema {
                        path: self.path.clone(),
                        field: field.clone(),
                        first,
                        second: *kind,
                    });
                }
            }
        }
        for (tag, decl) in &other.variants {
            let mine = self.variants.entry(tag.clone()).or_default();
            for (field, kind) in decl {
                mine.insert(field.clone(), *kind);
            }
        }
        Ok(())
    }
}
