// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Registry field values

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The native type of a registry field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
pub enum ValueKind {
    #[strum(serialize = "bool")]
    Bool,
    #[strum(serialize = "int")]
    Int,
    #[strum(serialize = "string")]
    Str,
}

/// A registry field value. `Null` stands for a field that is not set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
}

impl Value {
    /// The kind of this value, or `None` if it is not set
    #[must_use]
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(ValueKind::Bool),
            Value::Int(_) => Some(ValueKind::Int),
            Value::Str(_) => Some(ValueKind::Str),
        }
    }
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Read a value of the given kind from its text
    #[must_use]
    pub fn parse_as(kind: ValueKind, input: &str) -> Option<Value> {
        match kind {
            ValueKind::Str => Some(Value::from(input)),
            ValueKind::Int => input.trim().parse().ok().map(Value::Int),
            ValueKind::Bool => input.trim().parse().ok().map(Value::Bool),
        }
    }

    /// This value as a value of the given kind. Text is read as with [`Value::parse_as`],
    /// and any scalar converts to a string. `None` if the value has no such reading.
    #[must_use]
    pub fn conform(&self, kind: ValueKind) -> Option<Value> {
        match (self, kind) {
            (Value::Null, _) => Some(Value::Null),
            (value, kind) if value.kind() == Some(kind) => Some(value.clone()),
            (Value::Str(s), kind) => Value::parse_as(kind, s),
            (value, ValueKind::Str) => Some(Value::Str(value.to_string())),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_owned())
    }
}
impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}
impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}
impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}
impl From<u16> for Value {
    fn from(value: u16) -> Self {
        Value::Int(i64::from(value))
    }
}
impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}
