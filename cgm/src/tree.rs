// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The output configuration tree, built by the modules of one generation run.
//!
//! The tree is organized like UCI: one configuration package per file (`system`,
//! `network`, `wireless`, ...), each holding named sections (`config interface 'lan'`)
//! and anonymous ordered sections (`config system`), whose options are ordered.

use ordermap::OrderMap;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use strum::EnumString;

use crate::errors::{CgmError, CgmResult};

/// Rendering formats of an output tree
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, EnumString, strum::Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UciFormat {
    /// `network.lan.proto=static`, one line per option
    #[default]
    Dump,
    /// one UCI file per package
    Files,
}

/// Value of a section option
#[derive(Clone, Debug, PartialEq)]
pub enum UciValue {
    Str(String),
    Int(i64),
    Bool(bool),
    List(Vec<String>),
}
impl From<&str> for UciValue {
    fn from(value: &str) -> Self {
        UciValue::Str(value.to_owned())
    }
}
impl From<String> for UciValue {
    fn from(value: String) -> Self {
        UciValue::Str(value)
    }
}
impl From<i64> for UciValue {
    fn from(value: i64) -> Self {
        UciValue::Int(value)
    }
}
impl From<u16> for UciValue {
    fn from(value: u16) -> Self {
        UciValue::Int(i64::from(value))
    }
}
impl From<bool> for UciValue {
    fn from(value: bool) -> Self {
        UciValue::Bool(value)
    }
}
impl From<Vec<String>> for UciValue {
    fn from(value: Vec<String>) -> Self {
        UciValue::List(value)
    }
}
impl Display for UciValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UciValue::Str(s) => write!(f, "{}", s.trim().replace('\n', " ")),
            UciValue::Int(n) => write!(f, "{n}"),
            UciValue::Bool(b) => write!(f, "{}", u8::from(*b)),
            UciValue::List(items) => write!(f, "{}", items.join(" ")),
        }
    }
}

fn is_identifier(s: &str, extra: &[char]) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || extra.contains(&c))
}
fn check_identifier(s: &str) -> CgmResult<()> {
    check_with(s, &[])
}
// section types may have dashes (`wifi-device`)
fn check_kind(s: &str) -> CgmResult<()> {
    check_with(s, &['-'])
}
fn check_with(s: &str, extra: &[char]) -> CgmResult<()> {
    if is_identifier(s, extra) {
        Ok(())
    } else {
        Err(CgmError::InvalidIdentifier(s.to_owned()))
    }
}

/// A section of a UCI package
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UciSection {
    kind: String,
    options: OrderMap<String, UciValue>,
}

impl UciSection {
    fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_owned(),
            options: OrderMap::new(),
        }
    }
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }
    /// Set an option, replacing any previous value
    pub fn set(&mut self, option: &str, value: impl Into<UciValue>) -> CgmResult<&mut Self> {
        check_identifier(option)?;
        self.options.insert(option.to_owned(), value.into());
        Ok(self)
    }
    #[must_use]
    pub fn get(&self, option: &str) -> Option<&UciValue> {
        self.options.get(option)
    }
    pub fn remove(&mut self, option: &str) -> Option<UciValue> {
        self.options.remove(option)
    }
    #[must_use]
    pub fn matches(&self, option: &str, value: &UciValue) -> bool {
        self.options.get(option) == Some(value)
    }
    pub fn options(&self) -> impl Iterator<Item = (&str, &UciValue)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// A UCI configuration package (one file under `/etc/config`)
#[derive(Clone, Debug, PartialEq)]
pub struct UciPackage {
    name: String,
    named: OrderMap<String, UciSection>,
    ordered: OrderMap<String, Vec<UciSection>>,
}

impl UciPackage {
    fn new(name: &str) -> CgmResult<Self> {
        if !is_identifier(name, &['-']) {
            return Err(CgmError::InvalidIdentifier(name.to_owned()));
        }
        Ok(Self {
            name: name.to_owned(),
            named: OrderMap::new(),
            ordered: OrderMap::new(),
        })
    }
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Add a named section of the given type. Names are unique within a package.
    pub fn add_named(&mut self, kind: &str, name: &str) -> CgmResult<&mut UciSection> {
        check_kind(kind)?;
        check_identifier(name)?;
        if self.named.contains_key(name) {
            return Err(CgmError::DuplicateIdentifier(format!("{}.{name}", self.name)));
        }
        Ok(self
            .named
            .entry(name.to_owned())
            .or_insert_with(|| UciSection::new(kind)))
    }
    /// Add an anonymous section of the given type, after the others of that type
    pub fn add_ordered(&mut self, kind: &str) -> CgmResult<&mut UciSection> {
        check_kind(kind)?;
        let sections = self.ordered.entry(kind.to_owned()).or_default();
        sections.push(UciSection::new(kind));
        let last = sections.len() - 1;
        Ok(&mut sections[last])
    }
    #[must_use]
    pub fn named(&self, name: &str) -> Option<&UciSection> {
        self.named.get(name)
    }
    pub fn named_mut(&mut self, name: &str) -> Option<&mut UciSection> {
        self.named.get_mut(name)
    }
    pub fn named_sections(&self) -> impl Iterator<Item = (&str, &UciSection)> {
        self.named.iter().map(|(k, v)| (k.as_str(), v))
    }
    #[must_use]
    pub fn ordered(&self, kind: &str) -> &[UciSection] {
        self.ordered.get(kind).map(Vec::as_slice).unwrap_or_default()
    }
    /// The first named section of a type having an option set to a value
    #[must_use]
    pub fn find_named(&self, kind: &str, option: &str, value: &UciValue) -> Option<(&str, &UciSection)> {
        self.named_sections()
            .find(|(_, s)| s.kind == kind && s.matches(option, value))
    }

    fn render_dump(&self, out: &mut Vec<String>) {
        let pkg = &self.name;
        for (name, section) in &self.named {
            out.push(format!("{pkg}.{name}={}", section.kind));
            for (option, value) in &section.options {
                out.push(format!("{pkg}.{name}.{option}={value}"));
            }
        }
        for (kind, sections) in &self.ordered {
            for (index, section) in sections.iter().enumerate() {
                out.push(format!("{pkg}.@{kind}[{index}]={kind}"));
                for (option, value) in &section.options {
                    out.push(format!("{pkg}.@{kind}[{index}].{option}={value}"));
                }
            }
        }
    }

    fn render_options(section: &UciSection, out: &mut String) {
        for (option, value) in &section.options {
            match value {
                UciValue::List(items) => {
                    for item in items {
                        out.push_str(&format!("\tlist {option} '{item}'\n"));
                    }
                }
                other => out.push_str(&format!("\toption {option} '{other}'\n")),
            }
        }
        out.push('\n');
    }

    /// Render the package in UCI file syntax
    #[must_use]
    pub fn render_file(&self) -> String {
        let mut out = String::new();
        for (name, section) in &self.named {
            out.push_str(&format!("config {} '{name}'\n", section.kind));
            Self::render_options(section, &mut out);
        }
        for (kind, sections) in &self.ordered {
            for section in sections {
                out.push_str(&format!("config {kind}\n"));
                Self::render_options(section, &mut out);
            }
        }
        out
    }
}

/// The configuration produced for one node
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OutputConfigTree {
    sections: OrderMap<String, UciPackage>,
    packages: Vec<String>,
}

impl OutputConfigTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    /// Get a configuration section (UCI package) by name, creating it if needed
    pub fn section(&mut self, name: &str) -> CgmResult<&mut UciPackage> {
        if !self.sections.contains_key(name) {
            self.sections.insert(name.to_owned(), UciPackage::new(name)?);
        }
        self.sections
            .get_mut(name)
            .ok_or_else(|| CgmError::InvalidIdentifier(name.to_owned()))
    }
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&UciPackage> {
        self.sections.get(name)
    }
    pub fn sections(&self) -> impl Iterator<Item = &UciPackage> {
        self.sections.values()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.packages.is_empty()
    }
    /// Record that a software package is part of the configuration
    pub fn add_package(&mut self, name: &str) {
        if !self.packages.iter().any(|p| p == name) {
            self.packages.push(name.to_owned());
        }
    }
    #[must_use]
    pub fn packages(&self) -> &[String] {
        &self.packages
    }

    /// Render the tree in `uci show` syntax
    #[must_use]
    pub fn render_dump(&self) -> String {
        let mut lines = vec![];
        for package in self.sections.values() {
            package.render_dump(&mut lines);
        }
        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
    /// Render the tree as UCI files, by file name
    #[must_use]
    pub fn render_files(&self) -> OrderMap<String, String> {
        self.sections
            .values()
            .map(|p| (p.name.clone(), p.render_file()))
            .collect()
    }
    /// Render the tree in the given format, files being concatenated
    #[must_use]
    pub fn render(&self, format: UciFormat) -> String {
        match format {
            UciFormat::Dump => self.render_dump(),
            UciFormat::Files => self
                .render_files()
                .iter()
                .map(|(name, content)| format!("==> /etc/config/{name} <==\n{content}"))
                .collect(),
        }
    }
}
