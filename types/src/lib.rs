// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Oxide Computer Company

//! Data model describing how a switch's logical ports are wired to PHY and
//! transceiver lanes.
//!
//! The types in this crate mirror the JSON platform-mapping payloads shipped
//! with each chassis. Enumerations are carried as integers on the wire, and
//! every enumeration keeps a catch-all variant so that payloads written for
//! newer hardware still deserialize.

pub mod config;
pub mod factor;
pub mod mgmt;
pub mod phy;
pub mod profile;

pub use profile::ProfileId;

use serde::Deserialize;
use serde::Serialize;
use std::fmt;

/// An error parsing a textual identifier.
#[derive(Clone, Debug, thiserror::Error, PartialEq)]
pub enum ParseError {
    #[error("Invalid profile ID: '{0}'")]
    InvalidProfileId(String),

    #[error("Invalid PHY side: '{0}', expected 'system' or 'line'")]
    InvalidSide(String),

    #[error("Invalid chassis kind: '{0}'")]
    InvalidChassisKind(String),

    #[error("Invalid integer value: '{0}'")]
    InvalidInteger(String),
}

/// The logical ID of a switch port.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[cfg_attr(any(feature = "api-traits", test), derive(schemars::JsonSchema))]
#[serde(transparent)]
pub struct PortId(pub i32);

impl From<i32> for PortId {
    fn from(x: i32) -> Self {
        Self(x)
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PortId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse()
            .map(PortId)
            .map_err(|_| ParseError::InvalidInteger(s.to_string()))
    }
}

/// The ID of a pluggable interface module (a line card slot).
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[cfg_attr(any(feature = "api-traits", test), derive(schemars::JsonSchema))]
#[serde(transparent)]
pub struct PimId(pub i32);

impl From<i32> for PimId {
    fn from(x: i32) -> Self {
        Self(x)
    }
}

impl fmt::Display for PimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A port speed, in megabits per second.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(any(feature = "api-traits", test), derive(schemars::JsonSchema))]
#[serde(transparent)]
pub struct PortSpeed(pub u32);

impl PortSpeed {
    /// Return the speed in whole gigabits per second, if it is one.
    pub const fn gbps(&self) -> Option<u32> {
        if self.0 % 1000 == 0 {
            Some(self.0 / 1000)
        } else {
            None
        }
    }
}

impl fmt::Display for PortSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.gbps() {
            Some(g) => write!(f, "{g}G"),
            None => write!(f, "{}M", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PortId;
    use super::PortSpeed;

    #[test]
    fn test_port_speed_display() {
        assert_eq!(PortSpeed(100_000).to_string(), "100G");
        assert_eq!(PortSpeed(2_500).to_string(), "2500M");
        assert_eq!(PortSpeed(0).to_string(), "0G");
    }

    #[test]
    fn test_port_id_transparent() {
        let id: PortId = serde_json::from_str("17").unwrap();
        assert_eq!(id, PortId(17));
        assert_eq!(serde_json::to_string(&id).unwrap(), "17");
        assert_eq!(" 5 ".parse::<PortId>().unwrap(), PortId(5));
        assert!("eth1/1/1".parse::<PortId>().is_err());
    }
}
