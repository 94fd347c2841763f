// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Oxide Computer Company

//! Factors guarding profile catalog entries and override rules.
//!
//! A factor is a sparse predicate. Every field left as `None` is a wildcard,
//! and populated fields are combined by conjunction. The same
//! [`PortConfigOverrideFactor`] type also describes what is known about a
//! port's surroundings at resolution time, such as its cable length or the
//! installed transceiver's management interface.

use crate::mgmt::ManagementInterface;
use crate::mgmt::MediaInterfaceCode;
use crate::phy::DataPlanePhyChip;
use crate::PimId;
use crate::PortId;
use crate::ProfileId;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeSet;

/// The guard on a profile catalog entry.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[cfg_attr(any(feature = "api-traits", test), derive(schemars::JsonSchema))]
pub struct PlatformPortConfigFactor {
    #[serde(rename = "profileID")]
    pub profile_id: ProfileId,
    #[serde(
        default,
        rename = "pimIDs",
        skip_serializing_if = "Option::is_none"
    )]
    pub pim_ids: Option<BTreeSet<PimId>>,
}

impl PlatformPortConfigFactor {
    /// A factor matching `profile_id` on every PIM.
    pub fn new(profile_id: ProfileId) -> Self {
        Self {
            profile_id,
            pim_ids: None,
        }
    }

    /// A factor matching `profile_id` only on the given PIMs.
    pub fn with_pims(
        profile_id: ProfileId,
        pims: impl IntoIterator<Item = PimId>,
    ) -> Self {
        Self {
            profile_id,
            pim_ids: Some(pims.into_iter().collect()),
        }
    }
}

/// The vendor of an installed transceiver.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[cfg_attr(any(feature = "api-traits", test), derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct VendorFactor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,
}

/// The guard on an override rule, or the context a port is resolved in.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[cfg_attr(any(feature = "api-traits", test), derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct PortConfigOverrideFactor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<Vec<PortId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profiles: Option<Vec<ProfileId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cable_lengths: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_interface_code: Option<MediaInterfaceCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transceiver_management_interface: Option<ManagementInterface>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chips: Option<Vec<DataPlanePhyChip>>,
    #[serde(
        default,
        rename = "pimIDs",
        skip_serializing_if = "Option::is_none"
    )]
    pub pim_ids: Option<BTreeSet<PimId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<VendorFactor>,
}

impl PortConfigOverrideFactor {
    /// Return true if no field is populated, i.e., the factor matches
    /// everything.
    pub fn is_wildcard(&self) -> bool {
        *self == Self::default()
    }

    /// Return true if `other` is equal to `self` ignoring the port list.
    pub fn eq_ignoring_ports(&self, other: &Self) -> bool {
        self.profiles == other.profiles
            && self.cable_lengths == other.cable_lengths
            && self.media_interface_code == other.media_interface_code
            && self.transceiver_management_interface
                == other.transceiver_management_interface
            && self.chips == other.chips
            && self.pim_ids == other.pim_ids
            && self.vendor == other.vendor
    }

    /// Return true if the factor's port list names `port`.
    pub fn names_port(&self, port: PortId) -> bool {
        self.ports
            .as_ref()
            .map(|ports| ports.contains(&port))
            .unwrap_or(false)
    }

    /// Return true if the factor's chip list names a chip called `name`.
    pub fn names_chip(&self, name: &str) -> bool {
        self.chips
            .as_ref()
            .map(|chips| chips.iter().any(|c| c.name == name))
            .unwrap_or(false)
    }
}
