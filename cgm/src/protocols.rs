// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Wireless protocols supported by device radios

use std::fmt::Display;
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, EnumString, IntoStaticStr, strum::Display,
)]
pub enum ProtocolId {
    #[strum(serialize = "ieee-80211bgn")]
    Ieee80211Bgn,
    #[strum(serialize = "ieee-80211an")]
    Ieee80211An,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, AsRefStr, EnumIter, EnumString)]
pub enum Capability {
    #[strum(serialize = "SHORT-GI-20")]
    ShortGi20,
    #[strum(serialize = "SHORT-GI-40")]
    ShortGi40,
    #[strum(serialize = "RX-STBC1")]
    RxStbc1,
    #[strum(serialize = "TX-STBC")]
    TxStbc,
    #[strum(serialize = "DSSS_CCK-40")]
    DsssCck40,
    #[strum(serialize = "LDPC")]
    Ldpc,
    #[strum(serialize = "GF")]
    GreenField,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Band {
    Ghz2_4,
    Ghz5,
}

/// A wireless channel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Channel {
    pub number: u16,
    pub frequency: u16, /* MHz */
}

/// A protocol supported by a radio, with the optional capabilities the radio has
#[derive(Clone, Debug, PartialEq)]
pub struct Protocol {
    pub id: ProtocolId,
    pub capabilities: Vec<Capability>,
}

impl Protocol {
    #[must_use]
    pub fn bgn(capabilities: &[Capability]) -> Self {
        Self {
            id: ProtocolId::Ieee80211Bgn,
            capabilities: capabilities.to_vec(),
        }
    }
    #[must_use]
    pub fn an(capabilities: &[Capability]) -> Self {
        Self {
            id: ProtocolId::Ieee80211An,
            capabilities: capabilities.to_vec(),
        }
    }
    #[must_use]
    pub fn identifier(&self) -> &'static str {
        self.id.into()
    }
    #[must_use]
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
    #[must_use]
    pub fn band(&self) -> Band {
        match self.id {
            ProtocolId::Ieee80211Bgn => Band::Ghz2_4,
            ProtocolId::Ieee80211An => Band::Ghz5,
        }
    }
    /// The channels of the protocol's band
    pub fn channels(&self) -> impl Iterator<Item = Channel> {
        let numbers: Vec<u16> = match self.band() {
            Band::Ghz2_4 => (1..=14).collect(),
            Band::Ghz5 => (36..=64)
                .step_by(4)
                .chain((100..=140).step_by(4))
                .chain((149..=165).step_by(4))
                .collect(),
        };
        numbers.into_iter().filter_map(|n| self.channel(n))
    }
    /// Look up a channel by number
    #[must_use]
    pub fn channel(&self, number: u16) -> Option<Channel> {
        let frequency = match (self.band(), number) {
            (Band::Ghz2_4, 1..=13) => 2407 + 5 * number,
            (Band::Ghz2_4, 14) => 2484,
            (Band::Ghz5, 36..=64 | 100..=140) if number % 4 == 0 => 5000 + 5 * number,
            (Band::Ghz5, 149..=165) if (number - 149) % 4 == 0 => 5000 + 5 * number,
            _ => return None,
        };
        Some(Channel { number, frequency })
    }
}

impl ProtocolId {
    /// All the known protocol identifiers
    pub fn identifiers() -> impl Iterator<Item = &'static str> {
        Self::iter().map(<&'static str>::from)
    }
}

impl Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)?;
        if !self.capabilities.is_empty() {
            let caps: Vec<&str> = self.capabilities.iter().map(AsRef::<str>::as_ref).collect();
            write!(f, " [{}]", caps.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::{Capability, Protocol, ProtocolId};
    use std::str::FromStr;

    #[test]
    fn identifiers() {
        assert_eq!(
            ProtocolId::from_str("ieee-80211an").unwrap(),
            ProtocolId::Ieee80211An
        );
        assert!(ProtocolId::from_str("ieee-80211ac").is_err());
        assert_eq!(
            ProtocolId::identifiers().collect::<Vec<_>>(),
            vec!["ieee-80211bgn", "ieee-80211an"]
        );
        assert_eq!(Capability::from_str("RX-STBC1").unwrap(), Capability::RxStbc1);
    }

    #[test]
    fn channels() {
        let bgn = Protocol::bgn(&[Capability::ShortGi20]);
        assert_eq!(bgn.channel(1).unwrap().frequency, 2412);
        assert_eq!(bgn.channel(13).unwrap().frequency, 2472);
        assert_eq!(bgn.channel(14).unwrap().frequency, 2484);
        assert!(bgn.channel(36).is_none());
        assert_eq!(bgn.channels().count(), 14);

        let an = Protocol::an(&[]);
        assert_eq!(an.channel(36).unwrap().frequency, 5180);
        assert_eq!(an.channel(165).unwrap().frequency, 5825);
        assert!(an.channel(38).is_none());
        assert!(an.channel(150).is_none());
        assert!(an.channel(6).is_none());
        assert_eq!(an.channels().count(), 8 + 11 + 5);
    }

    #[test]
    fn display() {
        let bgn = Protocol::bgn(&[Capability::ShortGi20, Capability::DsssCck40]);
        assert_eq!(bgn.to_string(), "ieee-80211bgn [SHORT-GI-20 DSSS_CCK-40]");
        assert!(bgn.has_capability(Capability::DsssCck40));
        assert!(!bgn.has_capability(Capability::Ldpc));
    }
}
