// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Oxide Computer Company

//! Port speed profiles and their electrical characteristics.

use crate::ParseError;
use crate::PortSpeed;
use serde::Deserialize;
use serde::Serialize;
use std::fmt;

// Names of the well-known profile IDs, indexed by value.
const PROFILE_NAMES: [&str; 33] = [
    "DEFAULT",
    "PROFILE_10G_1_NRZ_NOFEC",
    "PROFILE_20G_2_NRZ_NOFEC",
    "PROFILE_25G_1_NRZ_NOFEC",
    "PROFILE_40G_4_NRZ_NOFEC",
    "PROFILE_50G_2_NRZ_NOFEC",
    "PROFILE_100G_4_NRZ_NOFEC",
    "PROFILE_100G_4_NRZ_CL91",
    "PROFILE_100G_4_NRZ_RS528",
    "PROFILE_200G_4_PAM4_RS544X2N",
    "PROFILE_400G_8_PAM4_RS544X2N",
    "PROFILE_10G_1_NRZ_NOFEC_COPPER",
    "PROFILE_10G_1_NRZ_NOFEC_OPTICAL",
    "PROFILE_20G_2_NRZ_NOFEC_COPPER",
    "PROFILE_25G_1_NRZ_NOFEC_COPPER",
    "PROFILE_25G_1_NRZ_CL74_COPPER",
    "PROFILE_25G_1_NRZ_RS528_COPPER",
    "PROFILE_40G_4_NRZ_NOFEC_COPPER",
    "PROFILE_40G_4_NRZ_NOFEC_OPTICAL",
    "PROFILE_50G_2_NRZ_NOFEC_COPPER",
    "PROFILE_50G_2_NRZ_CL74_COPPER",
    "PROFILE_50G_2_NRZ_RS528_COPPER",
    "PROFILE_100G_4_NRZ_RS528_COPPER",
    "PROFILE_100G_4_NRZ_RS528_OPTICAL",
    "PROFILE_200G_4_PAM4_RS544X2N_COPPER",
    "PROFILE_200G_4_PAM4_RS544X2N_OPTICAL",
    "PROFILE_400G_8_PAM4_RS544X2N_OPTICAL",
    "PROFILE_100G_4_NRZ_CL91_COPPER",
    "PROFILE_100G_4_NRZ_CL91_OPTICAL",
    "PROFILE_20G_2_NRZ_NOFEC_OPTICAL",
    "PROFILE_25G_1_NRZ_NOFEC_OPTICAL",
    "PROFILE_50G_2_NRZ_NOFEC_OPTICAL",
    "PROFILE_100G_4_NRZ_NOFEC_COPPER",
];

/// The ID of a port speed profile.
///
/// Profile IDs are integers on the wire. The well-known IDs have names such
/// as `PROFILE_40G_4_NRZ_NOFEC_COPPER`, and either form may be parsed.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[cfg_attr(any(feature = "api-traits", test), derive(schemars::JsonSchema))]
#[serde(transparent)]
pub struct ProfileId(pub i32);

impl ProfileId {
    pub const DEFAULT: Self = Self(0);

    /// Return the well-known name of this profile, if it has one.
    pub fn name(&self) -> Option<&'static str> {
        usize::try_from(self.0)
            .ok()
            .and_then(|i| PROFILE_NAMES.get(i))
            .copied()
    }
}

impl From<i32> for ProfileId {
    fn from(x: i32) -> Self {
        Self(x)
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "PROFILE_{}", self.0),
        }
    }
}

impl std::str::FromStr for ProfileId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(x) = s.parse::<i32>() {
            return Ok(ProfileId(x));
        }
        let upper = s.to_uppercase();
        let candidates = [upper.clone(), format!("PROFILE_{upper}")];
        PROFILE_NAMES
            .iter()
            .position(|name| candidates.iter().any(|c| c == name))
            .and_then(|i| i32::try_from(i).ok())
            .map(ProfileId)
            .ok_or_else(|| ParseError::InvalidProfileId(s.to_string()))
    }
}

/// Lane signal modulation.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[cfg_attr(any(feature = "api-traits", test), derive(schemars::JsonSchema))]
#[serde(from = "i32", into = "i32")]
pub enum Modulation {
    Nrz,
    Pam4,
    Unknown(i32),
}

impl From<i32> for Modulation {
    fn from(x: i32) -> Self {
        match x {
            1 => Modulation::Nrz,
            2 => Modulation::Pam4,
            other => Modulation::Unknown(other),
        }
    }
}

impl From<Modulation> for i32 {
    fn from(m: Modulation) -> Self {
        match m {
            Modulation::Nrz => 1,
            Modulation::Pam4 => 2,
            Modulation::Unknown(x) => x,
        }
    }
}

impl fmt::Display for Modulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modulation::Nrz => write!(f, "NRZ"),
            Modulation::Pam4 => write!(f, "PAM4"),
            Modulation::Unknown(x) => write!(f, "Unknown ({x})"),
        }
    }
}

/// Forward error correction mode.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[cfg_attr(any(feature = "api-traits", test), derive(schemars::JsonSchema))]
#[serde(from = "i32", into = "i32")]
pub enum FecMode {
    None,
    Cl74,
    Cl91,
    Rs528,
    Rs544,
    Rs544x2n,
    Other(i32),
}

impl From<i32> for FecMode {
    fn from(x: i32) -> Self {
        use FecMode::*;
        match x {
            1 => None,
            11 => Rs544x2n,
            74 => Cl74,
            91 => Cl91,
            528 => Rs528,
            544 => Rs544,
            other => Other(other),
        }
    }
}

impl From<FecMode> for i32 {
    fn from(m: FecMode) -> Self {
        use FecMode::*;
        match m {
            None => 1,
            Rs544x2n => 11,
            Cl74 => 74,
            Cl91 => 91,
            Rs528 => 528,
            Rs544 => 544,
            Other(x) => x,
        }
    }
}

impl fmt::Display for FecMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use FecMode::*;
        match self {
            None => write!(f, "NONE"),
            Cl74 => write!(f, "CL74"),
            Cl91 => write!(f, "CL91"),
            Rs528 => write!(f, "RS528"),
            Rs544 => write!(f, "RS544"),
            Rs544x2n => write!(f, "RS544_2N"),
            Other(x) => write!(f, "FEC ({x})"),
        }
    }
}

/// The transmission medium a profile is tuned for.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[cfg_attr(any(feature = "api-traits", test), derive(schemars::JsonSchema))]
#[serde(from = "i32", into = "i32")]
pub enum Medium {
    Copper,
    Optical,
    Backplane,
    Unknown(i32),
}

impl From<i32> for Medium {
    fn from(x: i32) -> Self {
        match x {
            1 => Medium::Copper,
            2 => Medium::Optical,
            3 => Medium::Backplane,
            other => Medium::Unknown(other),
        }
    }
}

impl From<Medium> for i32 {
    fn from(m: Medium) -> Self {
        match m {
            Medium::Copper => 1,
            Medium::Optical => 2,
            Medium::Backplane => 3,
            Medium::Unknown(x) => x,
        }
    }
}

impl fmt::Display for Medium {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Medium::Copper => write!(f, "COPPER"),
            Medium::Optical => write!(f, "OPTICAL"),
            Medium::Backplane => write!(f, "BACKPLANE"),
            Medium::Unknown(x) => write!(f, "Unknown ({x})"),
        }
    }
}

/// Characteristics of one chip layer for a profile.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[cfg_attr(any(feature = "api-traits", test), derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct ProfileSideConfig {
    pub num_lanes: u8,
    pub modulation: Modulation,
    pub fec: FecMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<Medium>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface_mode: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface_type: Option<i32>,
}

/// The characteristics of a speed profile.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[cfg_attr(any(feature = "api-traits", test), derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct PortProfileConfig {
    pub speed: PortSpeed,
    pub iphy: ProfileSideConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xphy_system: Option<ProfileSideConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xphy_line: Option<ProfileSideConfig>,
}

impl PortProfileConfig {
    pub fn num_lanes(&self) -> u8 {
        self.iphy.num_lanes
    }

    pub fn modulation(&self) -> Modulation {
        self.iphy.modulation
    }

    pub fn fec(&self) -> FecMode {
        self.iphy.fec
    }

    pub fn medium(&self) -> Option<Medium> {
        self.iphy.medium
    }
}

#[cfg(test)]
mod tests {
    use super::FecMode;
    use super::Medium;
    use super::Modulation;
    use super::PortProfileConfig;
    use super::ProfileId;
    use crate::PortSpeed;

    #[test]
    fn test_profile_id_names() {
        assert_eq!(
            ProfileId(17).to_string(),
            "PROFILE_40G_4_NRZ_NOFEC_COPPER"
        );
        assert_eq!(
            ProfileId(23).to_string(),
            "PROFILE_100G_4_NRZ_RS528_OPTICAL"
        );
        assert_eq!(ProfileId(999).to_string(), "PROFILE_999");
        assert_eq!(ProfileId(-1).name(), None);
    }

    #[test]
    fn test_profile_id_parse() {
        assert_eq!("19".parse::<ProfileId>().unwrap(), ProfileId(19));
        assert_eq!(
            "PROFILE_50G_2_NRZ_NOFEC_COPPER".parse::<ProfileId>().unwrap(),
            ProfileId(19)
        );
        assert_eq!(
            "50g_2_nrz_nofec_copper".parse::<ProfileId>().unwrap(),
            ProfileId(19)
        );
        assert!("PROFILE_1T".parse::<ProfileId>().is_err());
    }

    #[test]
    fn test_parse_profile_config() {
        let s = r#"{
            "speed": 50000,
            "iphy": {"numLanes": 2, "modulation": 1, "fec": 1, "medium": 1},
            "xphyLine": {"numLanes": 1, "modulation": 2, "fec": 11}
        }"#;
        let cfg: PortProfileConfig = serde_json::from_str(s).unwrap();
        assert_eq!(cfg.speed, PortSpeed(50_000));
        assert_eq!(cfg.num_lanes(), 2);
        assert_eq!(cfg.modulation(), Modulation::Nrz);
        assert_eq!(cfg.fec(), FecMode::None);
        assert_eq!(cfg.medium(), Some(Medium::Copper));
        let line = cfg.xphy_line.unwrap();
        assert_eq!(line.fec, FecMode::Rs544x2n);
        assert_eq!(line.modulation, Modulation::Pam4);
        assert!(cfg.xphy_system.is_none());
    }

    #[test]
    fn test_fec_unknown_preserved() {
        let fec: FecMode = serde_json::from_str("545").unwrap();
        assert_eq!(fec, FecMode::Other(545));
        assert_eq!(serde_json::to_string(&fec).unwrap(), "545");
    }
}
