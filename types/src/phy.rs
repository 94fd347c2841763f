// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Oxide Computer Company

//! PHY chips, lanes, and the settings applied to them.

use crate::ParseError;
use serde::Deserialize;
use serde::Serialize;
use std::fmt;

/// The kind of data-plane chip a lane belongs to.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[cfg_attr(any(feature = "api-traits", test), derive(schemars::JsonSchema))]
#[serde(from = "i32", into = "i32")]
pub enum ChipType {
    /// SerDes internal to the switch ASIC.
    Iphy,
    /// An external PHY sitting between the ASIC and the front panel.
    Xphy,
    /// A transceiver cage.
    Transceiver,
    /// A backplane connector.
    Backplane,
    /// Any other chip type.
    Unknown(i32),
}

impl From<i32> for ChipType {
    fn from(x: i32) -> Self {
        use ChipType::*;
        match x {
            1 => Iphy,
            2 => Xphy,
            3 => Transceiver,
            4 => Backplane,
            other => Unknown(other),
        }
    }
}

impl From<ChipType> for i32 {
    fn from(t: ChipType) -> Self {
        use ChipType::*;
        match t {
            Iphy => 1,
            Xphy => 2,
            Transceiver => 3,
            Backplane => 4,
            Unknown(x) => x,
        }
    }
}

impl fmt::Display for ChipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChipType::Iphy => write!(f, "IPHY"),
            ChipType::Xphy => write!(f, "XPHY"),
            ChipType::Transceiver => write!(f, "TRANSCEIVER"),
            ChipType::Backplane => write!(f, "BACKPLANE"),
            ChipType::Unknown(x) => write!(f, "Unknown ({x})"),
        }
    }
}

/// A named chip on the data plane.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[cfg_attr(any(feature = "api-traits", test), derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct DataPlanePhyChip {
    pub name: String,
    #[serde(rename = "type")]
    pub chip_type: ChipType,
    #[serde(rename = "physicalID")]
    pub physical_id: i32,
}

/// A single lane on a named chip.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[cfg_attr(any(feature = "api-traits", test), derive(schemars::JsonSchema))]
pub struct PinId {
    pub chip: String,
    pub lane: i32,
}

impl PinId {
    pub fn new(chip: impl Into<String>, lane: i32) -> Self {
        Self {
            chip: chip.into(),
            lane,
        }
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chip, self.lane)
    }
}

/// Transmit equalization for a lane.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[cfg_attr(any(feature = "api-traits", test), derive(schemars::JsonSchema))]
#[serde(default, rename_all = "camelCase")]
pub struct TxSettings {
    pub pre: i16,
    pub pre2: i16,
    pub main: i16,
    pub post: i16,
    pub post2: i16,
    pub post3: i16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drive_current: Option<i32>,
}

/// Receive tuning for a lane. Every field is optional.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[cfg_attr(any(feature = "api-traits", test), derive(schemars::JsonSchema))]
#[serde(default, rename_all = "camelCase")]
pub struct RxSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctl_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dsp_mode: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub afe_trim: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ac_coupling_bypass: Option<i32>,
}

/// The configuration of one lane: its identity plus optional tuning.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[cfg_attr(any(feature = "api-traits", test), derive(schemars::JsonSchema))]
pub struct PinConfig {
    pub id: PinId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx: Option<TxSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rx: Option<RxSettings>,
}

impl PinConfig {
    /// Construct an untuned lane configuration.
    pub fn new(id: PinId) -> Self {
        Self {
            id,
            tx: None,
            rx: None,
        }
    }

    /// Return a copy of `self` whose transmit settings are taken from `other`.
    ///
    /// The lane identity and receive settings of `self` are kept.
    pub fn retuned(&self, other: &PinConfig) -> Self {
        Self {
            id: self.id.clone(),
            tx: other.tx,
            rx: self.rx,
        }
    }
}

/// The side of an external PHY.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[cfg_attr(any(feature = "api-traits", test), derive(schemars::JsonSchema))]
#[cfg_attr(test, derive(strum::EnumIter))]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Facing the switch ASIC.
    System,
    /// Facing the front panel.
    Line,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::System => write!(f, "system"),
            Side::Line => write!(f, "line"),
        }
    }
}

impl std::str::FromStr for Side {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" | "sys" => Ok(Side::System),
            "line" => Ok(Side::Line),
            _ => Err(ParseError::InvalidSide(s.to_string())),
        }
    }
}

/// A group of lanes within a port's per-profile pin configuration.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PinGroup {
    Iphy,
    Xphy(Side),
    Transceiver,
}

impl fmt::Display for PinGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinGroup::Iphy => write!(f, "iphy"),
            PinGroup::Xphy(side) => write!(f, "xphy {side}"),
            PinGroup::Transceiver => write!(f, "transceiver"),
        }
    }
}

/// The lanes used by a port for one profile, grouped by chip layer.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[cfg_attr(any(feature = "api-traits", test), derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct PortPinConfig {
    #[serde(default)]
    pub iphy: Vec<PinConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transceiver: Option<Vec<PinConfig>>,
    #[serde(
        default,
        rename = "xphySys",
        alias = "xphySystem",
        skip_serializing_if = "Option::is_none"
    )]
    pub xphy_sys: Option<Vec<PinConfig>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xphy_line: Option<Vec<PinConfig>>,
}

impl PortPinConfig {
    /// Return the external PHY lanes on one side, if any are configured.
    pub fn xphy(&self, side: Side) -> Option<&[PinConfig]> {
        match side {
            Side::System => self.xphy_sys.as_deref(),
            Side::Line => self.xphy_line.as_deref(),
        }
    }

    /// Return the lanes in one group, if any are configured.
    pub fn group(&self, group: PinGroup) -> Option<&[PinConfig]> {
        match group {
            PinGroup::Iphy => Some(self.iphy.as_slice()),
            PinGroup::Xphy(side) => self.xphy(side),
            PinGroup::Transceiver => self.transceiver.as_deref(),
        }
    }

    /// Iterate over every lane in every group.
    pub fn all_pins(&self) -> impl Iterator<Item = &PinConfig> {
        self.iphy
            .iter()
            .chain(self.xphy_sys.iter().flatten())
            .chain(self.xphy_line.iter().flatten())
            .chain(self.transceiver.iter().flatten())
    }

    /// Iterate mutably over every lane in every group.
    pub fn all_pins_mut(&mut self) -> impl Iterator<Item = &mut PinConfig> {
        self.iphy
            .iter_mut()
            .chain(self.xphy_sys.iter_mut().flatten())
            .chain(self.xphy_line.iter_mut().flatten())
            .chain(self.transceiver.iter_mut().flatten())
    }
}

/// A junction in the physical wiring, such as an external PHY.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[cfg_attr(any(feature = "api-traits", test), derive(schemars::JsonSchema))]
pub struct PinJunction {
    pub system: PinId,
    #[serde(default)]
    pub line: Vec<PinConnection>,
}

/// The far end of a physical connection.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[cfg_attr(any(feature = "api-traits", test), derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum Pin {
    End(PinId),
    Junction(PinJunction),
}

/// One physical connection, starting at an ASIC lane.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[cfg_attr(any(feature = "api-traits", test), derive(schemars::JsonSchema))]
pub struct PinConnection {
    pub a: PinId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<Pin>,
}

impl PinConnection {
    /// Visit every lane named by this connection, depth first.
    pub fn for_each_pin<'a>(&'a self, f: &mut impl FnMut(&'a PinId)) {
        f(&self.a);
        match &self.z {
            None => {}
            Some(Pin::End(id)) => f(id),
            Some(Pin::Junction(j)) => {
                f(&j.system);
                for conn in j.line.iter() {
                    conn.for_each_pin(f);
                }
            }
        }
    }

    /// Visit every lane named by this connection mutably, depth first.
    pub fn for_each_pin_mut(&mut self, f: &mut impl FnMut(&mut PinId)) {
        f(&mut self.a);
        match &mut self.z {
            None => {}
            Some(Pin::End(id)) => f(id),
            Some(Pin::Junction(j)) => {
                f(&mut j.system);
                for conn in j.line.iter_mut() {
                    conn.for_each_pin_mut(f);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ChipType;
    use super::Pin;
    use super::PinConfig;
    use super::PinConnection;
    use super::PinGroup;
    use super::PinId;
    use super::PortPinConfig;
    use super::RxSettings;
    use super::Side;
    use super::TxSettings;
    use strum::IntoEnumIterator;

    #[test]
    fn test_chip_type_integers() {
        for (x, t) in [
            (1, ChipType::Iphy),
            (2, ChipType::Xphy),
            (3, ChipType::Transceiver),
            (4, ChipType::Backplane),
            (9, ChipType::Unknown(9)),
        ] {
            assert_eq!(ChipType::from(x), t);
            assert_eq!(i32::from(t), x);
        }
        let t: ChipType = serde_json::from_str("3").unwrap();
        assert_eq!(t, ChipType::Transceiver);
    }

    #[test]
    fn test_side_parse() {
        for side in Side::iter() {
            assert_eq!(side.to_string().parse::<Side>().unwrap(), side);
        }
        assert_eq!("SYS".parse::<Side>().unwrap(), Side::System);
        assert!("both".parse::<Side>().is_err());
    }

    #[test]
    fn test_retuned_keeps_lane_identity() {
        let base = PinConfig {
            id: PinId::new("WC9", 2),
            tx: Some(TxSettings {
                main: 60,
                ..Default::default()
            }),
            rx: Some(RxSettings {
                ctl_code: Some(3),
                ..Default::default()
            }),
        };
        let tune = PinConfig {
            id: PinId::new("WC9", 0),
            tx: Some(TxSettings {
                main: 10,
                ..Default::default()
            }),
            rx: None,
        };
        let out = base.retuned(&tune);
        assert_eq!(out.id, base.id);
        assert_eq!(out.rx, base.rx);
        assert_eq!(out.tx.unwrap().main, 10);
    }

    #[test]
    fn test_parse_junction_connection() {
        let s = r#"{
            "a": {"chip": "BC0", "lane": 0},
            "z": {"junction": {
                "system": {"chip": "XPHY1", "lane": 0},
                "line": [
                    {"a": {"chip": "XPHY1", "lane": 4},
                     "z": {"end": {"chip": "eth1/1", "lane": 0}}}
                ]
            }}
        }"#;
        let conn: PinConnection = serde_json::from_str(s).unwrap();
        let Some(Pin::Junction(j)) = &conn.z else {
            panic!("expected a junction");
        };
        assert_eq!(j.system, PinId::new("XPHY1", 0));
        let mut chips = Vec::new();
        conn.for_each_pin(&mut |id| chips.push(id.chip.clone()));
        assert_eq!(chips, ["BC0", "XPHY1", "XPHY1", "eth1/1"]);
    }

    #[test]
    fn test_port_pin_config_aliases() {
        let s = r#"{
            "iphy": [{"id": {"chip": "BC0", "lane": 0}}],
            "xphySystem": [{"id": {"chip": "XPHY1", "lane": 0}}]
        }"#;
        let pins: PortPinConfig = serde_json::from_str(s).unwrap();
        assert_eq!(pins.xphy(Side::System).unwrap().len(), 1);
        assert!(pins.xphy(Side::Line).is_none());
        assert_eq!(pins.all_pins().count(), 2);
        assert_eq!(pins.group(PinGroup::Iphy).unwrap()[0].id.chip, "BC0");
        assert_eq!(
            pins.group(PinGroup::Xphy(Side::System)).unwrap()[0].id.chip,
            "XPHY1"
        );
        assert!(pins.group(PinGroup::Xphy(Side::Line)).is_none());
        assert!(pins.group(PinGroup::Transceiver).is_none());

        let out = serde_json::to_value(&pins).unwrap();
        assert!(out.get("xphySys").is_some());
        assert!(out.get("transceiver").is_none());
    }
}
