// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Oxide Computer Company

//! The platform-mapping payload, as shipped for a chassis or a single slot.

use crate::factor::PlatformPortConfigFactor;
use crate::factor::PortConfigOverrideFactor;
use crate::phy::DataPlanePhyChip;
use crate::phy::PinConnection;
use crate::phy::PortPinConfig;
use crate::profile::PortProfileConfig;
use crate::PortId;
use crate::ProfileId;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

/// The base wiring of a port.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[cfg_attr(any(feature = "api-traits", test), derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct PlatformPortMapping {
    pub id: PortId,
    pub name: String,
    pub controlling_port: PortId,
    #[serde(default)]
    pub pins: Vec<PinConnection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_type: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attached_core_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attached_core_port_index: Option<i32>,
}

/// The configuration of a port for one supported profile.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[cfg_attr(any(feature = "api-traits", test), derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct PlatformPortConfig {
    /// Ports which cannot be used while this port runs this profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subsumed_ports: Option<Vec<PortId>>,
    pub pins: PortPinConfig,
}

/// A port: its base wiring, and the profiles it supports.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[cfg_attr(any(feature = "api-traits", test), derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct PlatformPortEntry {
    pub mapping: PlatformPortMapping,
    #[serde(default)]
    pub supported_profiles: BTreeMap<ProfileId, PlatformPortConfig>,
}

impl PlatformPortEntry {
    pub fn id(&self) -> PortId {
        self.mapping.id
    }

    pub fn name(&self) -> &str {
        &self.mapping.name
    }

    /// Return true if this port controls itself.
    pub fn is_controlling_port(&self) -> bool {
        self.mapping.controlling_port == self.mapping.id
    }

    /// Return the ASIC chip this port's first lane is wired to.
    pub fn iphy_chip(&self) -> Option<&str> {
        self.mapping.pins.first().map(|conn| conn.a.chip.as_str())
    }
}

/// An entry in the profile catalog.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[cfg_attr(any(feature = "api-traits", test), derive(schemars::JsonSchema))]
pub struct ProfileEntry {
    pub factor: PlatformPortConfigFactor,
    pub profile: PortProfileConfig,
}

/// A rule modifying the base configuration of matching ports.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[cfg_attr(any(feature = "api-traits", test), derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct PortConfigOverride {
    #[serde(default)]
    pub factor: PortConfigOverrideFactor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pins: Option<PortPinConfig>,
    #[serde(
        default,
        alias = "profileConfig",
        skip_serializing_if = "Option::is_none"
    )]
    pub port_profile_config: Option<PortProfileConfig>,
}

impl PortConfigOverride {
    /// Return true if `other` carries the same configuration and the same
    /// factor, ignoring which ports the factor names.
    pub fn same_rule_as(&self, other: &Self) -> bool {
        self.pins == other.pins
            && self.port_profile_config == other.port_profile_config
            && self.factor.eq_ignoring_ports(&other.factor)
    }
}

/// A complete platform-mapping payload.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[cfg_attr(any(feature = "api-traits", test), derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct PlatformMappingConfig {
    #[serde(default)]
    pub ports: BTreeMap<PortId, PlatformPortEntry>,
    #[serde(default)]
    pub chips: Vec<DataPlanePhyChip>,
    #[serde(default, alias = "supportedProfiles")]
    pub platform_supported_profiles: Vec<ProfileEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub port_config_overrides: Vec<PortConfigOverride>,
}
