// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Rule-building scope: short names for registry locations and the predicate
//! and action constructors that use them

use ordermap::OrderMap;
use registry::{
    Fields, Location, RegistrationPoint, RegistryError, RegistryItem, Snapshot, StagedView,
    Value, ValueKind,
};
use std::fmt::Display;

use crate::action::Action;
use crate::errors::{RuleError, RuleResult};
use crate::expr::Expr;
use crate::rule::Step;

/// A registry location, optionally restricted to the items of one variant
/// (e.g. the wireless radios among the interfaces)
#[derive(Clone, Debug, PartialEq)]
pub struct Target {
    pub location: Location,
    pub variant: Option<String>,
}

impl Target {
    #[must_use]
    pub fn new(location: &str) -> Self {
        Self {
            location: Location::from(location),
            variant: None,
        }
    }
    #[must_use]
    pub fn of_variant(mut self, variant: &str) -> Self {
        self.variant = Some(variant.to_owned());
        self
    }
    #[must_use]
    pub fn path(&self) -> &str {
        self.location.path()
    }

    /// Fail if the target is not registered
    pub(crate) fn check(&self, point: &RegistrationPoint) -> RuleResult<()> {
        let schema = point.schema(self.path())?;
        if let Some(variant) = &self.variant
            && !schema.has_variant(variant)
        {
            return Err(RegistryError::UnknownVariant {
                path: self.path().to_owned(),
                variant: variant.clone(),
            }
            .into());
        }
        Ok(())
    }

    /// The declared kind of the addressed field
    pub(crate) fn field_kind(&self, point: &RegistrationPoint) -> RuleResult<ValueKind> {
        self.check(point)?;
        let Some(field) = self.location.field_name() else {
            return Err(RuleError::InvalidPredicate(format!(
                "'{self}' does not address a field"
            )));
        };
        point
            .schema(self.path())?
            .field_kind(self.variant.as_deref(), field)
            .ok_or_else(|| {
                RegistryError::UnknownField {
                    path: self.path().to_owned(),
                    field: field.to_owned(),
                }
                .into()
            })
    }

    pub(crate) fn entries<'s>(&self, snapshot: &'s Snapshot) -> Vec<&'s RegistryItem> {
        snapshot
            .get(self.path())
            .iter()
            .filter(|item| self.variant.as_ref().is_none_or(|v| &item.variant == v))
            .collect()
    }

    // value of the addressed field in the single entry of the target
    fn value_in(&self, view: &StagedView<'_>, snapshot: &Snapshot) -> RuleResult<Value> {
        self.field_kind(view.point())?;
        let field = self.location.field_name().unwrap_or_default();
        match self.entries(snapshot).as_slice() {
            [] => Ok(Value::Null),
            [item] => Ok(item.get(field).clone()),
            _ => Err(RegistryError::ListAttribute(self.path().to_owned()).into()),
        }
    }
    pub(crate) fn value(&self, view: &StagedView<'_>) -> RuleResult<Value> {
        self.value_in(view, view.current())
    }
    /// The addressed field of every entry
    pub(crate) fn values(&self, view: &StagedView<'_>) -> RuleResult<Vec<Value>> {
        self.field_kind(view.point())?;
        let field = self.location.field_name().unwrap_or_default();
        Ok(self
            .entries(view.current())
            .iter()
            .map(|item| item.get(field).clone())
            .collect())
    }
    pub(crate) fn count(&self, view: &StagedView<'_>) -> RuleResult<usize> {
        self.check(view.point())?;
        Ok(self.entries(view.current()).len())
    }
    pub(crate) fn changed(&self, view: &StagedView<'_>) -> RuleResult<bool> {
        if self.location.field_name().is_some() {
            Ok(self.value_in(view, view.current())? != self.value_in(view, view.original())?)
        } else {
            self.check(view.point())?;
            Ok(self.entries(view.current()) != self.entries(view.original()))
        }
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.location)?;
        if let Some(variant) = &self.variant {
            write!(f, "[{variant}]")?;
        }
        Ok(())
    }
}

/// Binds names to registry targets. Rule set functions receive a scope and build their
/// rules with it. Names that are not bound are read as registry locations.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    aliases: OrderMap<String, Target>,
}

impl Scope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A scope with the names of the node configuration
    #[must_use]
    pub fn standard() -> Self {
        Self::new()
            .alias("name", Target::new("core.general#name"))
            .alias("platform", Target::new("core.general#platform"))
            .alias("router", Target::new("core.general#router"))
            .alias("project", Target::new("core.project#project"))
            .alias(
                "radios",
                Target::new("core.interfaces").of_variant("WifiRadioDeviceConfig"),
            )
            .alias("vpn", Target::new("core.vpn.server"))
            .alias("packages", Target::new("core.packages"))
    }

    /// Bind a name, builder-style
    #[must_use]
    pub fn alias(mut self, name: &str, target: Target) -> Self {
        self.aliases.insert(name.to_owned(), target);
        self
    }

    /// The target bound to a name, or the registry location it spells
    #[must_use]
    pub fn resolve(&self, name: &str) -> Target {
        self.aliases
            .get(name)
            .cloned()
            .unwrap_or_else(|| Target::new(name))
    }

    /// The value of a field
    #[must_use]
    pub fn value(&self, name: &str) -> Expr {
        Expr::Field(self.resolve(name))
    }
    /// The number of entries
    #[must_use]
    pub fn count(&self, name: &str) -> Expr {
        Expr::Count(self.resolve(name))
    }
    /// Whether the staged content differs from the stored one
    #[must_use]
    pub fn changed(&self, name: &str) -> Expr {
        Expr::Changed(self.resolve(name))
    }
    /// Whether any entry has a field with the given value
    #[must_use]
    pub fn contains(&self, name: &str, value: impl Into<Value>) -> Expr {
        Expr::Contains(self.resolve(name), value.into())
    }
    /// An attribute of the node's router descriptor
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn router(&self, attribute: &str) -> Expr {
        Expr::Router(attribute.to_owned())
    }

    fn fields<'f>(fields: impl IntoIterator<Item = (&'f str, Expr)>) -> Vec<(String, Expr)> {
        fields
            .into_iter()
            .map(|(name, expr)| (name.to_owned(), expr))
            .collect()
    }

    /// Append an entry. Field values are evaluated when the action runs.
    pub fn append<'f>(&self, name: &str, fields: impl IntoIterator<Item = (&'f str, Expr)>) -> Step {
        Step::Action(Action::Append {
            target: self.resolve(name),
            fields: Self::fields(fields),
        })
    }
    /// Remove every entry
    #[must_use]
    pub fn clear_config(&self, name: &str) -> Step {
        Step::Action(Action::Clear {
            target: self.resolve(name),
        })
    }
    /// Update fields of the entry at a position
    pub fn assign<'f>(
        &self,
        name: &str,
        index: usize,
        fields: impl IntoIterator<Item = (&'f str, Expr)>,
    ) -> Step {
        Step::Action(Action::Assign {
            target: self.resolve(name),
            index,
            fields: Self::fields(fields),
        })
    }
    /// Remove the entries whose fields match `filter`
    pub fn remove<'f>(&self, name: &str, filter: impl IntoIterator<Item = (&'f str, Value)>) -> Step {
        let filter: Fields = filter
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v))
            .collect();
        Step::Action(Action::Remove {
            target: self.resolve(name),
            filter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Scope, Target};
    use crate::expr::Expr;
    use pretty_assertions::assert_eq;

    #[test]
    fn resolve() {
        let scope = Scope::standard().alias("servers", Target::new("core.vpn.server"));
        assert_eq!(scope.resolve("vpn"), Target::new("core.vpn.server"));
        assert_eq!(scope.resolve("servers"), Target::new("core.vpn.server"));
        assert_eq!(
            scope.resolve("radios").to_string(),
            "core.interfaces[WifiRadioDeviceConfig]"
        );
        // unbound names are locations
        assert_eq!(
            scope.value("core.general#name"),
            Expr::Field(Target::new("core.general#name"))
        );
    }
}
