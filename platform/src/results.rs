// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Oxide Computer Company

//! Results of resolving the same query for a set of ports.
//!
//! Resolving a profile for many ports may succeed for some and fail for
//! others, and we'd like to report both. Like the per-module results of a
//! transceiver controller, [`PortResult`] carries the data for every port that
//! succeeded, and the errors for every port that failed.

use platform_mapping::Error;
use platform_mapping::PlatformMapping;
use platform_mapping::ProfileMatcher;
use platform_mapping_types::phy::PinConfig;
use platform_mapping_types::phy::PortPinConfig;
use platform_mapping_types::profile::PortProfileConfig;
use platform_mapping_types::PortId;

/// The ports for which a query failed.
#[derive(Debug, Default)]
pub struct FailedPorts {
    pub ports: Vec<PortId>,
    /// One error for each port above.
    pub errors: Vec<Error>,
}

impl FailedPorts {
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    /// Return an iterator over the failed ports and their errors.
    pub fn iter(&self) -> impl Iterator<Item = (PortId, &Error)> + '_ {
        self.ports.iter().copied().zip(self.errors.iter())
    }
}

/// Data resolved for a set of ports, and the ports that failed.
#[derive(Debug)]
pub struct PortResult<P> {
    pub ports: Vec<PortId>,
    pub data: Vec<P>,
    pub failures: FailedPorts,
}

impl<P> Default for PortResult<P> {
    fn default() -> Self {
        Self {
            ports: Vec::new(),
            data: Vec::new(),
            failures: FailedPorts::default(),
        }
    }
}

impl<P> PortResult<P> {
    /// Run `f` for every port, collecting its data or its error.
    pub fn collect<F>(ports: impl IntoIterator<Item = PortId>, mut f: F) -> Self
    where
        F: FnMut(PortId) -> Result<P, Error>,
    {
        let mut out = Self::default();
        for port in ports {
            match f(port) {
                Ok(data) => {
                    out.ports.push(port);
                    out.data.push(data);
                }
                Err(err) => {
                    out.failures.ports.push(port);
                    out.failures.errors.push(err);
                }
            }
        }
        out
    }

    /// Return an iterator over the successful ports and their data.
    pub fn iter(&self) -> impl Iterator<Item = (PortId, &P)> + '_ {
        self.ports.iter().copied().zip(self.data.iter())
    }

    pub fn error_iter(&self) -> impl Iterator<Item = (PortId, &Error)> + '_ {
        self.failures.iter()
    }

    /// Return the data for a port, if the query succeeded for it.
    pub fn nth(&self, port: PortId) -> Option<&P> {
        self.iter().find(|(p, _)| *p == port).map(|(_, data)| data)
    }

    /// Return the error for a port, if the query failed for it.
    pub fn nth_err(&self, port: PortId) -> Option<&Error> {
        self.error_iter()
            .find(|(p, _)| *p == port)
            .map(|(_, err)| err)
    }
}

/// The profile characteristics resolved for a set of ports.
pub type ProfileConfigResult = PortResult<Option<PortProfileConfig>>;

/// The lanes resolved for a set of ports.
pub type PinResult = PortResult<Vec<PinConfig>>;

/// The external PHY lanes, on both sides, resolved for a set of ports.
pub type XphyResult = PortResult<PortPinConfig>;

/// The transceiver lanes listed for a set of ports.
pub type TransceiverPinResult = PortResult<Option<Vec<PinConfig>>>;

/// Resolve the profile characteristics of each port.
///
/// `matcher` supplies the profile and context; its port is replaced by each
/// port in turn.
pub fn resolve_profile_configs(
    mapping: &PlatformMapping,
    matcher: &ProfileMatcher,
    ports: &[PortId],
) -> ProfileConfigResult {
    PortResult::collect(ports.iter().copied(), |port| {
        mapping.resolve_profile_config(&matcher.clone().with_port(port))
    })
}

/// Resolve the ASIC lanes of each port.
pub fn resolve_iphy_pins(
    mapping: &PlatformMapping,
    matcher: &ProfileMatcher,
    ports: &[PortId],
) -> PinResult {
    PortResult::collect(ports.iter().copied(), |port| {
        mapping.resolve_iphy_pins(&matcher.clone().with_port(port))
    })
}

/// Resolve the external PHY lanes of each port, on both sides.
pub fn resolve_xphy_pins(
    mapping: &PlatformMapping,
    matcher: &ProfileMatcher,
    ports: &[PortId],
) -> XphyResult {
    PortResult::collect(ports.iter().copied(), |port| {
        mapping.resolve_xphy_pin_config(&matcher.clone().with_port(port))
    })
}

/// Return the transceiver lanes of each port.
pub fn resolve_transceiver_pins(
    mapping: &PlatformMapping,
    matcher: &ProfileMatcher,
    ports: &[PortId],
) -> TransceiverPinResult {
    PortResult::collect(ports.iter().copied(), |port| {
        mapping.resolve_transceiver_pins(&matcher.clone().with_port(port))
    })
}
