// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Oxide Computer Company

//! The table of known chassis and how their mappings are laid out.

use platform_mapping_types::ParseError;
use platform_mapping_types::PimId;
use std::fmt;
use std::ops::RangeInclusive;

/// The name of the payload file for a chassis with a single mapping.
pub const SINGLE_PAYLOAD_FILE: &str = "platform_mapping.json";

/// A kind of switch chassis.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, clap::ValueEnum)]
#[cfg_attr(test, derive(strum::EnumIter))]
pub enum ChassisKind {
    Wedge40,
    Wedge400,
    Sandia,
    Morgan800cc,
    Meru800bia,
    Minipack,
    Yamp,
    Elbert,
    Fuji,
}

/// How the mapping of one kind of chassis is assembled.
#[derive(Clone, Debug, PartialEq)]
pub struct ChassisProfile {
    /// The name of the chassis.
    pub name: &'static str,
    /// The PIM slots, each described by its own payload.
    ///
    /// `None` if the chassis is described by a single payload.
    pub pims: Option<RangeInclusive<i32>>,
    /// Set if the slot payloads reuse chip names, which must be qualified by
    /// slot before merging.
    pub namespace_chips: bool,
}

impl ChassisProfile {
    /// Return the PIMs of the chassis, in slot order.
    pub fn pim_ids(&self) -> Vec<PimId> {
        self.pims
            .clone()
            .map(|range| range.map(PimId).collect())
            .unwrap_or_default()
    }

    /// Return the payload file name for one slot, or for the whole chassis.
    pub fn payload_file(pim: Option<PimId>) -> String {
        match pim {
            Some(pim) => format!("pim{pim}.json"),
            None => String::from(SINGLE_PAYLOAD_FILE),
        }
    }
}

impl ChassisKind {
    /// Return the layout of this chassis.
    pub fn profile(self) -> ChassisProfile {
        let single = |name| ChassisProfile {
            name,
            pims: None,
            namespace_chips: false,
        };
        match self {
            ChassisKind::Wedge40 => single("wedge40"),
            ChassisKind::Wedge400 => single("wedge400"),
            ChassisKind::Sandia => single("sandia"),
            ChassisKind::Morgan800cc => single("morgan800cc"),
            ChassisKind::Meru800bia => single("meru800bia"),
            ChassisKind::Minipack => ChassisProfile {
                name: "minipack",
                pims: Some(1..=8),
                namespace_chips: true,
            },
            ChassisKind::Yamp => ChassisProfile {
                name: "yamp",
                pims: Some(1..=8),
                namespace_chips: true,
            },
            ChassisKind::Elbert => ChassisProfile {
                name: "elbert",
                pims: Some(2..=9),
                namespace_chips: false,
            },
            ChassisKind::Fuji => ChassisProfile {
                name: "fuji",
                pims: Some(2..=9),
                namespace_chips: false,
            },
        }
    }
}

impl fmt::Display for ChassisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.profile().name)
    }
}

impl std::str::FromStr for ChassisKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        match name.as_str() {
            "wedge40" => Ok(ChassisKind::Wedge40),
            "wedge400" => Ok(ChassisKind::Wedge400),
            "sandia" => Ok(ChassisKind::Sandia),
            "morgan800cc" => Ok(ChassisKind::Morgan800cc),
            "meru800bia" => Ok(ChassisKind::Meru800bia),
            "minipack" => Ok(ChassisKind::Minipack),
            "yamp" => Ok(ChassisKind::Yamp),
            "elbert" => Ok(ChassisKind::Elbert),
            "fuji" => Ok(ChassisKind::Fuji),
            _ => Err(ParseError::InvalidChassisKind(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ChassisKind;
    use super::ChassisProfile;
    use platform_mapping_types::ParseError;
    use platform_mapping_types::PimId;
    use strum::IntoEnumIterator;

    #[test]
    fn test_chassis_kind_round_trip() {
        for kind in ChassisKind::iter() {
            assert_eq!(kind.to_string().parse::<ChassisKind>().unwrap(), kind);
        }
        assert_eq!("  Minipack".parse::<ChassisKind>().unwrap(), ChassisKind::Minipack);
        assert_eq!(
            "darwin".parse::<ChassisKind>().unwrap_err(),
            ParseError::InvalidChassisKind("darwin".to_string())
        );
    }

    #[test]
    fn test_chassis_pims() {
        assert!(ChassisKind::Wedge400.profile().pim_ids().is_empty());
        assert_eq!(
            ChassisKind::Elbert.profile().pim_ids(),
            (2..=9).map(PimId).collect::<Vec<_>>()
        );
        for kind in ChassisKind::iter() {
            let profile = kind.profile();
            // Only multi-slot chassis ever need slot-qualified chips.
            assert!(!profile.namespace_chips || profile.pims.is_some());
        }
    }

    #[test]
    fn test_payload_file() {
        assert_eq!(ChassisProfile::payload_file(None), "platform_mapping.json");
        assert_eq!(ChassisProfile::payload_file(Some(PimId(3))), "pim3.json");
    }
}
