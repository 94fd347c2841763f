// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Oxide Computer Company

//! Matching factors against the port and context being resolved.

use crate::pim_id_of;
use crate::Error;
use crate::PlatformMapping;
use platform_mapping_types::factor::PlatformPortConfigFactor;
use platform_mapping_types::factor::PortConfigOverrideFactor;
use platform_mapping_types::factor::VendorFactor;
use platform_mapping_types::PimId;
use platform_mapping_types::PortId;
use platform_mapping_types::ProfileId;
use std::fmt;

/// What is being resolved: a profile, and optionally the port, PIM, and
/// surroundings it is being resolved for.
///
/// The surroundings are described with the same type used to guard override
/// rules. Only the fields describing a port's environment are consulted:
/// cable lengths, media interface code, management interface, chips, and
/// vendor.
#[derive(Clone, Debug, PartialEq)]
pub struct ProfileMatcher {
    profile: ProfileId,
    port: Option<PortId>,
    pim: Option<PimId>,
    context: Option<PortConfigOverrideFactor>,
}

impl ProfileMatcher {
    pub fn new(profile: ProfileId) -> Self {
        Self {
            profile,
            port: None,
            pim: None,
            context: None,
        }
    }

    pub fn with_port(mut self, port: PortId) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the PIM explicitly, rather than deriving it from the port's name.
    pub fn with_pim(mut self, pim: PimId) -> Self {
        self.pim = Some(pim);
        self
    }

    pub fn with_context(mut self, context: PortConfigOverrideFactor) -> Self {
        self.context = Some(context);
        self
    }

    pub fn profile(&self) -> ProfileId {
        self.profile
    }

    pub fn port(&self) -> Option<PortId> {
        self.port
    }

    pub fn pim(&self) -> Option<PimId> {
        self.pim
    }

    pub fn context(&self) -> Option<&PortConfigOverrideFactor> {
        self.context.as_ref()
    }

    /// Return the name of the first chip named by the context, if any.
    pub fn context_chip(&self) -> Option<&str> {
        self.context
            .as_ref()
            .and_then(|ctx| ctx.chips.as_ref())
            .and_then(|chips| chips.first())
            .map(|chip| chip.name.as_str())
    }

    // The explicit PIM, or the one encoded in the port's name.
    fn effective_pim(&self, mapping: &PlatformMapping) -> Result<Option<PimId>, Error> {
        match (self.pim, self.port) {
            (Some(pim), _) => Ok(Some(pim)),
            (None, Some(port)) => pim_id_of(mapping.port(port)?).map(Some),
            (None, None) => Ok(None),
        }
    }

    /// Return true if an override rule's factor matches.
    ///
    /// Every populated field of the factor must be satisfied. A field
    /// describing the port's surroundings is satisfied only if the context
    /// populates it too, and every context value is among the factor's.
    ///
    /// A factor restricting PIMs does not match a port whose name encodes no
    /// PIM. An error is returned only if the factor restricts PIMs and the
    /// PIM must be derived from a port which is missing.
    pub fn matches_override(
        &self,
        mapping: &PlatformMapping,
        factor: &PortConfigOverrideFactor,
    ) -> Result<bool, Error> {
        if let Some(ports) = &factor.ports {
            match self.port {
                Some(port) if ports.contains(&port) => {}
                _ => return Ok(false),
            }
        }
        if let Some(profiles) = &factor.profiles {
            if !profiles.contains(&self.profile) {
                return Ok(false);
            }
        }
        if let Some(pims) = &factor.pim_ids {
            let pim = match self.effective_pim(mapping) {
                Ok(pim) => pim,
                Err(Error::InvalidPortName { .. }) => None,
                Err(err) => return Err(err),
            };
            match pim {
                Some(pim) if pims.contains(&pim) => {}
                _ => return Ok(false),
            }
        }
        Ok(self.context_matches(factor))
    }

    fn context_matches(&self, factor: &PortConfigOverrideFactor) -> bool {
        let ctx = self.context.as_ref();
        if let Some(lengths) = &factor.cable_lengths {
            let Some(have) = ctx.and_then(|c| c.cable_lengths.as_ref()) else {
                return false;
            };
            if !have.iter().all(|len| lengths.contains(len)) {
                return false;
            }
        }
        if let Some(code) = &factor.media_interface_code {
            if ctx.and_then(|c| c.media_interface_code.as_ref()) != Some(code) {
                return false;
            }
        }
        if let Some(mgmt) = &factor.transceiver_management_interface {
            if ctx.and_then(|c| c.transceiver_management_interface.as_ref()) != Some(mgmt) {
                return false;
            }
        }
        if let Some(chips) = &factor.chips {
            let Some(have) = ctx.and_then(|c| c.chips.as_ref()) else {
                return false;
            };
            if !have
                .iter()
                .all(|chip| chips.iter().any(|c| c.name == chip.name))
            {
                return false;
            }
        }
        if let Some(vendor) = &factor.vendor {
            match ctx.and_then(|c| c.vendor.as_ref()) {
                Some(have) if vendor_matches(vendor, have) => {}
                _ => return false,
            }
        }
        true
    }

    /// Return true if a profile catalog entry's factor matches.
    ///
    /// An entry restricted to a set of PIMs matches only if the PIM is known,
    /// either set explicitly or derived from the port's name.
    pub fn matches_profile(
        &self,
        mapping: &PlatformMapping,
        factor: &PlatformPortConfigFactor,
    ) -> Result<bool, Error> {
        if factor.profile_id != self.profile {
            return Ok(false);
        }
        match &factor.pim_ids {
            None => Ok(true),
            Some(pims) => Ok(self
                .effective_pim(mapping)?
                .map(|pim| pims.contains(&pim))
                .unwrap_or(false)),
        }
    }
}

// Transceivers pad their vendor strings, so compare them trimmed.
fn vendor_matches(factor: &VendorFactor, have: &VendorFactor) -> bool {
    if factor.name.trim() != have.name.trim() {
        return false;
    }
    match (&factor.part_number, &have.part_number) {
        (None, _) => true,
        (Some(want), Some(have)) => want.trim() == have.trim(),
        (Some(_), None) => false,
    }
}

impl fmt::Display for ProfileMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "profile={}", self.profile)?;
        if let Some(port) = self.port {
            write!(f, ", port={port}")?;
        }
        if let Some(pim) = self.pim {
            write!(f, ", pim={pim}")?;
        }
        if let Some(ctx) = &self.context {
            match serde_json::to_string(ctx) {
                Ok(s) => write!(f, ", context={s}")?,
                Err(_) => write!(f, ", context={ctx:?}")?,
            }
        }
        Ok(())
    }
}
