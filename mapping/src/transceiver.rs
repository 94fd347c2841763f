// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Oxide Computer Company

//! Describing an installed transceiver as a resolution context.

use platform_mapping_types::factor::PortConfigOverrideFactor;
use platform_mapping_types::factor::VendorFactor;
use platform_mapping_types::mgmt::ManagementInterface;
use platform_mapping_types::mgmt::MediaInterfaceCode;
use serde::Deserialize;
use serde::Serialize;
use std::fmt;

/// Vendor-specific information about a transceiver module.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[cfg_attr(feature = "api-traits", derive(schemars::JsonSchema))]
pub struct Vendor {
    pub name: String,
    pub part: String,
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", &self.name, &self.part)
    }
}

/// What is known about the transceiver installed in a port.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[cfg_attr(feature = "api-traits", derive(schemars::JsonSchema))]
pub struct TransceiverInfo {
    /// The length of an attached cable, in meters.
    pub cable_length: Option<f64>,
    /// The media interface advertised for each host lane.
    pub media_interfaces: Vec<MediaInterfaceCode>,
    pub management_interface: Option<ManagementInterface>,
    pub vendor: Option<Vendor>,
}

impl TransceiverInfo {
    /// Build the context used to match override rules for this transceiver.
    ///
    /// Only the first lane's media interface is used.
    pub fn override_factor(&self) -> PortConfigOverrideFactor {
        PortConfigOverrideFactor {
            cable_lengths: self.cable_length.map(|len| vec![len]),
            media_interface_code: self.media_interfaces.first().copied(),
            transceiver_management_interface: self.management_interface,
            vendor: self.vendor.as_ref().map(|v| VendorFactor {
                name: v.name.trim().to_string(),
                part_number: Some(v.part.trim().to_string()),
            }),
            ..Default::default()
        }
    }
}
