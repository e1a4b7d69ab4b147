// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Router hardware descriptors

use derive_builder::Builder;
use registry::Value;
use std::collections::HashSet;
use std::fmt::Display;
use strum::{AsRefStr, EnumString};

use crate::errors::{CgmError, CgmResult};
use crate::protocols::Protocol;

/// An ethernet port of a router
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Port {
    pub identifier: String,
    pub description: String,
}
impl Port {
    #[must_use]
    pub fn ethernet(identifier: &str, description: &str) -> Self {
        Self {
            identifier: identifier.to_owned(),
            description: description.to_owned(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AntennaConnector {
    pub identifier: String,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, AsRefStr, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum RadioFeature {
    MultipleSsid,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RadioKind {
    Integrated,
    Usb,
    MiniPci,
}

/// A wireless radio of a router
#[derive(Clone, Debug, PartialEq)]
pub struct Radio {
    pub identifier: String,
    pub description: String,
    pub kind: RadioKind,
    pub protocols: Vec<Protocol>,
    pub connectors: Vec<AntennaConnector>,
    pub features: Vec<RadioFeature>,
}

impl Radio {
    fn new(kind: RadioKind, identifier: &str, description: &str) -> Self {
        Self {
            identifier: identifier.to_owned(),
            description: description.to_owned(),
            kind,
            protocols: vec![],
            connectors: vec![],
            features: vec![],
        }
    }
    #[must_use]
    pub fn integrated(identifier: &str, description: &str) -> Self {
        Self::new(RadioKind::Integrated, identifier, description)
    }
    #[must_use]
    pub fn usb(identifier: &str, description: &str) -> Self {
        Self::new(RadioKind::Usb, identifier, description)
    }
    #[must_use]
    pub fn minipci(identifier: &str, description: &str) -> Self {
        Self::new(RadioKind::MiniPci, identifier, description)
    }
    #[must_use]
    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.protocols.push(protocol);
        self
    }
    #[must_use]
    pub fn connector(mut self, identifier: &str, description: &str) -> Self {
        self.connectors.push(AntennaConnector {
            identifier: identifier.to_owned(),
            description: description.to_owned(),
        });
        self
    }
    #[must_use]
    pub fn feature(mut self, feature: RadioFeature) -> Self {
        self.features.push(feature);
        self
    }
    /// Get the protocol with the given identifier, if the radio supports it
    #[must_use]
    pub fn get_protocol(&self, identifier: &str) -> Option<&Protocol> {
        self.protocols.iter().find(|p| p.identifier() == identifier)
    }
    #[must_use]
    pub fn has_feature(&self, feature: RadioFeature) -> bool {
        self.features.contains(&feature)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, AsRefStr, EnumString, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Polarization {
    Horizontal,
    Vertical,
    Dual,
}

/// An antenna built into the router
#[derive(Clone, Debug, PartialEq)]
pub struct InternalAntenna {
    pub identifier: String,
    pub polarization: Polarization,
    pub angle_horizontal: u16, /* degrees */
    pub angle_vertical: u16,   /* degrees */
    pub gain: u8,              /* dBi */
}

/// Names of a port or radio on a platform (e.g. `lan0` is `lan1 lan2` on openwrt)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortMapping {
    pub platform: String,
    pub port: String,
    pub targets: Vec<String>,
}
impl PortMapping {
    #[must_use]
    pub fn new(platform: &str, port: &str, targets: &[&str]) -> Self {
        Self {
            platform: platform.to_owned(),
            port: port.to_owned(),
            targets: targets.iter().map(|t| (*t).to_owned()).collect(),
        }
    }
}

/// The driver of a radio on a platform
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DriverMapping {
    pub platform: String,
    pub radio: String,
    pub driver: String,
}
impl DriverMapping {
    #[must_use]
    pub fn new(platform: &str, radio: &str, driver: &str) -> Self {
        Self {
            platform: platform.to_owned(),
            radio: radio.to_owned(),
            driver: driver.to_owned(),
        }
    }
}

/// Firmware profile of a router on a platform
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Profile {
    pub platform: String,
    pub name: String,
    pub files: Vec<String>,
}
impl Profile {
    #[must_use]
    pub fn new(platform: &str, name: &str, files: &[&str]) -> Self {
        Self {
            platform: platform.to_owned(),
            name: name.to_owned(),
            files: files.iter().map(|f| (*f).to_owned()).collect(),
        }
    }
}

/// Immutable description of a router model. Identifiers are unique per platform.
#[derive(Builder, Clone, Debug, PartialEq)]
#[builder(setter(into))]
pub struct RouterDescriptor {
    pub identifier: String,
    pub name: String,
    pub manufacturer: String,
    #[builder(default)]
    pub url: String,
    pub architecture: String,
    #[builder(default, setter(each(name = "radio")))]
    pub radios: Vec<Radio>,
    #[builder(default, setter(each(name = "port")))]
    pub ports: Vec<Port>,
    #[builder(default, setter(each(name = "antenna")))]
    pub antennas: Vec<InternalAntenna>,
    #[builder(default, setter(each(name = "port_map")))]
    pub port_maps: Vec<PortMapping>,
    #[builder(default, setter(each(name = "driver")))]
    pub drivers: Vec<DriverMapping>,
    #[builder(default, setter(each(name = "profile")))]
    pub profiles: Vec<Profile>,
}

impl From<RouterDescriptorBuilderError> for CgmError {
    fn from(value: RouterDescriptorBuilderError) -> Self {
        CgmError::InvalidDescriptor(value.to_string())
    }
}

impl RouterDescriptor {
    #[must_use]
    pub fn radio(&self, identifier: &str) -> Option<&Radio> {
        self.radios.iter().find(|r| r.identifier == identifier)
    }
    #[must_use]
    pub fn port(&self, identifier: &str) -> Option<&Port> {
        self.ports.iter().find(|p| p.identifier == identifier)
    }
    /// The platform names of a port or radio, if it is remapped on that platform
    #[must_use]
    pub fn remap(&self, platform: &str, port: &str) -> Option<&[String]> {
        self.port_maps
            .iter()
            .find(|m| m.platform == platform && m.port == port)
            .map(|m| m.targets.as_slice())
    }
    #[must_use]
    pub fn driver(&self, platform: &str, radio: &str) -> Option<&str> {
        self.drivers
            .iter()
            .find(|d| d.platform == platform && d.radio == radio)
            .map(|d| d.driver.as_str())
    }
    #[must_use]
    pub fn profile(&self, platform: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.platform == platform)
    }

    /// Check the internal consistency of the descriptor
    pub fn validate(&self) -> CgmResult<()> {
        if self.identifier.is_empty() {
            return Err(CgmError::InvalidDescriptor("empty identifier".to_owned()));
        }
        let mut seen = HashSet::new();
        for id in self
            .radios
            .iter()
            .map(|r| &r.identifier)
            .chain(self.ports.iter().map(|p| &p.identifier))
        {
            if !seen.insert(id.as_str()) {
                return Err(CgmError::InvalidDescriptor(format!(
                    "{}: identifier '{id}' is used more than once",
                    self.identifier
                )));
            }
        }
        if let Some(m) = self.port_maps.iter().find(|m| !seen.contains(m.port.as_str())) {
            return Err(CgmError::InvalidDescriptor(format!(
                "{}: port map refers to unknown port '{}'",
                self.identifier, m.port
            )));
        }
        if let Some(d) = self.drivers.iter().find(|d| self.radio(&d.radio).is_none()) {
            return Err(CgmError::InvalidDescriptor(format!(
                "{}: driver set for unknown radio '{}'",
                self.identifier, d.radio
            )));
        }
        Ok(())
    }

    /// Descriptor attributes, as addressed by rule predicates. Supported are
    /// `identifier`, `name`, `manufacturer`, `url`, `architecture`, the counts
    /// `radios`, `ports` and `antennas`, `radio.<n>` for the identifier of
    /// the n-th radio and `radio.<n>.protocol` for its first protocol.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<Value> {
        let count = |n: usize| Value::Int(i64::try_from(n).unwrap_or(i64::MAX));
        match name {
            "identifier" => Some(Value::from(self.identifier.as_str())),
            "name" => Some(Value::from(self.name.as_str())),
            "manufacturer" => Some(Value::from(self.manufacturer.as_str())),
            "url" => Some(Value::from(self.url.as_str())),
            "architecture" => Some(Value::from(self.architecture.as_str())),
            "radios" => Some(count(self.radios.len())),
            "ports" => Some(count(self.ports.len())),
            "antennas" => Some(count(self.antennas.len())),
            other => {
                let (index, protocol) = match other.strip_prefix("radio.")?.split_once('.') {
                    Some((index, "protocol")) => (index, true),
                    Some(_) => return None,
                    None => (other.strip_prefix("radio.")?, false),
                };
                let radio = self.radios.get(index.parse::<usize>().ok()?);
                let value = match (radio, protocol) {
                    (None, _) => Value::Null,
                    (Some(radio), false) => Value::from(radio.identifier.as_str()),
                    (Some(radio), true) => radio
                        .protocols
                        .first()
                        .map_or(Value::Null, |p| Value::from(p.identifier())),
                };
                Some(value)
            }
        }
    }
}

impl Display for RouterDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{} {} ({}, {})",
            self.manufacturer, self.name, self.identifier, self.architecture
        )?;
        for radio in &self.radios {
            let protocols: Vec<String> = radio.protocols.iter().map(ToString::to_string).collect();
            writeln!(f, "  radio {}: {}", radio.identifier, protocols.join(", "))?;
        }
        for port in &self.ports {
            writeln!(f, "  port {}: {}", port.identifier, port.description)?;
        }
        Ok(())
    }
}
