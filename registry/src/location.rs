// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Registry locations: `path` or `path#field`

use std::fmt::Display;

/// A registry location. The path addresses the items registered under it
/// (e.g. `core.vpn.server`); the optional field addresses one attribute of those
/// items (e.g. `core.general#platform`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    path: String,
    field: Option<String>,
}

impl Location {
    #[must_use]
    pub fn new(path: &str, field: Option<&str>) -> Self {
        Self {
            path: path.to_owned(),
            field: field.map(str::to_owned),
        }
    }
    /// Location of a field of the items under `path`
    #[must_use]
    pub fn field(path: &str, field: &str) -> Self {
        Self::new(path, Some(field))
    }
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
    #[must_use]
    pub fn field_name(&self) -> Option<&str> {
        self.field.as_deref()
    }
    /// The same location without its field part
    #[must_use]
    pub fn item(&self) -> Location {
        Self::new(&self.path, None)
    }
}

impl From<&str> for Location {
    fn from(value: &str) -> Self {
        match value.split_once('#') {
            Some((path, field)) => Self::new(path, Some(field)),
            None => Self::new(value, None),
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{}#{field}", self.path),
            None => write!(f, "{}", self.path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Location;

    #[test]
    fn parse() {
        let loc = Location::from("core.general#platform");
        assert_eq!(loc.path(), "core.general");
        assert_eq!(loc.field_name(), Some("platform"));
        assert_eq!(loc.to_string(), "core.general#platform");
        assert_eq!(loc.item(), Location::from("core.general"));
        assert_eq!(Location::from("core.vpn.server").field_name(), None);
    }
}
