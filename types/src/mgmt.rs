// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Oxide Computer Company

//! Properties of an installed transceiver that can select an override.

use serde::Deserialize;
use serde::Serialize;
use std::fmt;

/// The specification to which a transceiver's management interface conforms.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[cfg_attr(any(feature = "api-traits", test), derive(schemars::JsonSchema))]
#[serde(from = "i32", into = "i32")]
pub enum ManagementInterface {
    /// SFF-8636, which covers QSFP+ and QSFP28.
    Sff,
    /// Common Management Interface Specification, which covers QSFP-DD and
    /// OSFP.
    Cmis,
    /// The module has no management interface, e.g., a passive copper cable.
    None,
    /// SFF-8472, which covers SFP+.
    Sff8472,
    /// Any other interface specification.
    Unknown(i32),
}

impl From<i32> for ManagementInterface {
    fn from(x: i32) -> Self {
        match x {
            1 => ManagementInterface::Sff,
            2 => ManagementInterface::Cmis,
            3 => ManagementInterface::None,
            4 => ManagementInterface::Sff8472,
            other => ManagementInterface::Unknown(other),
        }
    }
}

impl From<ManagementInterface> for i32 {
    fn from(m: ManagementInterface) -> Self {
        match m {
            ManagementInterface::Sff => 1,
            ManagementInterface::Cmis => 2,
            ManagementInterface::None => 3,
            ManagementInterface::Sff8472 => 4,
            ManagementInterface::Unknown(x) => x,
        }
    }
}

impl fmt::Display for ManagementInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManagementInterface::Sff => write!(f, "SFF"),
            ManagementInterface::Cmis => write!(f, "CMIS"),
            ManagementInterface::None => write!(f, "NONE"),
            ManagementInterface::Sff8472 => write!(f, "SFF8472"),
            ManagementInterface::Unknown(x) => write!(f, "Unknown ({x})"),
        }
    }
}

impl std::str::FromStr for ManagementInterface {
    type Err = crate::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SFF" | "SFF8636" => Ok(ManagementInterface::Sff),
            "CMIS" => Ok(ManagementInterface::Cmis),
            "NONE" => Ok(ManagementInterface::None),
            "SFF8472" => Ok(ManagementInterface::Sff8472),
            other => other
                .parse::<i32>()
                .map(ManagementInterface::from)
                .map_err(|_| crate::ParseError::InvalidInteger(s.to_string())),
        }
    }
}

/// The media interface code advertised by a transceiver for a host lane.
///
/// Codes are assigned by the transceiver management specifications and are
/// carried here as raw integers.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[cfg_attr(any(feature = "api-traits", test), derive(schemars::JsonSchema))]
#[serde(transparent)]
pub struct MediaInterfaceCode(pub i32);

impl From<i32> for MediaInterfaceCode {
    fn from(x: i32) -> Self {
        Self(x)
    }
}

impl fmt::Display for MediaInterfaceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
