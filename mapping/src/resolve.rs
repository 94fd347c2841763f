// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Oxide Computer Company

//! Resolving the pins and profile a port uses.
//!
//! Override rules only ever re-tune a port. The lanes a port uses always come
//! from its base configuration, and an override contributes transmit settings
//! for those lanes, either one entry per lane or a single entry applied to
//! every lane.

use crate::Error;
use crate::PlatformMapping;
use crate::ProfileMatcher;
use platform_mapping_types::factor::PortConfigOverrideFactor;
use platform_mapping_types::phy::DataPlanePhyChip;
use platform_mapping_types::phy::PinConfig;
use platform_mapping_types::phy::PinGroup;
use platform_mapping_types::phy::PortPinConfig;
use platform_mapping_types::phy::Side;
use platform_mapping_types::profile::PortProfileConfig;
use platform_mapping_types::PortId;
use platform_mapping_types::ProfileId;
use slog::debug;
use slog::info;
use std::collections::BTreeMap;

impl PlatformMapping {
    /// Resolve the characteristics of a profile.
    ///
    /// Override rules carrying a profile configuration are consulted first,
    /// in order, and the first match wins. Otherwise the first matching
    /// catalog entry is returned. `None` is returned if nothing matches.
    pub fn resolve_profile_config(
        &self,
        matcher: &ProfileMatcher,
    ) -> Result<Option<PortProfileConfig>, Error> {
        for rule in self.overrides.iter() {
            let Some(config) = &rule.port_profile_config else {
                continue;
            };
            if matcher.matches_override(self, &rule.factor)? {
                debug!(
                    self.log,
                    "profile config from override";
                    "matcher" => %matcher,
                );
                return Ok(Some(*config));
            }
        }
        for entry in self.profiles.iter() {
            if matcher.matches_profile(self, &entry.factor)? {
                return Ok(Some(entry.profile));
            }
        }
        info!(
            self.log,
            "could not find profile config";
            "matcher" => %matcher,
        );
        Ok(None)
    }

    /// Resolve the ASIC lanes used by a port, with any matching override
    /// applied.
    ///
    /// Without a port, the matcher's context must name a chip. In that case
    /// the first matching override's lanes are returned as they are.
    pub fn resolve_iphy_pins(&self, matcher: &ProfileMatcher) -> Result<Vec<PinConfig>, Error> {
        let Some(port) = matcher.port() else {
            return self.resolve_chip_iphy_pins(matcher);
        };
        let profile = matcher.profile();
        let base = &self.platform_port_config(port, profile)?.pins.iphy;
        for rule in self.overrides.iter() {
            let Some(pins) = &rule.pins else {
                continue;
            };
            if pins.iphy.is_empty() {
                continue;
            }
            if matcher.matches_override(self, &rule.factor)? {
                debug!(
                    self.log,
                    "applying iphy override";
                    "port" => %port,
                    "profile" => %profile,
                    "n_override_lanes" => pins.iphy.len(),
                );
                return retune(base, &pins.iphy, port, profile, PinGroup::Iphy);
            }
        }
        Ok(base.clone())
    }

    fn resolve_chip_iphy_pins(&self, matcher: &ProfileMatcher) -> Result<Vec<PinConfig>, Error> {
        if matcher.context_chip().is_none() {
            return Err(Error::InvalidFactor(String::from(
                "resolving iphy pins requires a port or a chip",
            )));
        }
        for rule in self.overrides.iter() {
            let Some(pins) = &rule.pins else {
                continue;
            };
            if pins.iphy.is_empty() {
                continue;
            }
            if matcher.matches_override(self, &rule.factor)? {
                return Ok(pins.iphy.clone());
            }
        }
        Err(Error::PinsNotFound {
            group: PinGroup::Iphy,
            context: matcher.to_string(),
        })
    }

    /// Resolve the external PHY lanes used by a port on one side, with any
    /// matching override applied.
    ///
    /// A port with no external PHY lanes on that side resolves to an empty
    /// list.
    pub fn resolve_xphy_pins(
        &self,
        matcher: &ProfileMatcher,
        side: Side,
    ) -> Result<Vec<PinConfig>, Error> {
        let port = require_port(matcher, "xphy")?;
        let profile = matcher.profile();
        let Some(base) = self.platform_port_config(port, profile)?.pins.xphy(side) else {
            return Ok(Vec::new());
        };
        for rule in self.overrides.iter() {
            let Some(tune) = rule.pins.as_ref().and_then(|pins| pins.xphy(side)) else {
                continue;
            };
            if tune.is_empty() {
                continue;
            }
            if matcher.matches_override(self, &rule.factor)? {
                debug!(
                    self.log,
                    "applying xphy override";
                    "port" => %port,
                    "profile" => %profile,
                    "side" => %side,
                    "n_override_lanes" => tune.len(),
                );
                return retune(base, tune, port, profile, PinGroup::Xphy(side));
            }
        }
        Ok(base.to_vec())
    }

    /// Resolve the external PHY lanes on both sides of a port.
    pub fn resolve_xphy_pin_config(
        &self,
        matcher: &ProfileMatcher,
    ) -> Result<PortPinConfig, Error> {
        Ok(PortPinConfig {
            iphy: Vec::new(),
            transceiver: None,
            xphy_sys: Some(self.resolve_xphy_pins(matcher, Side::System)?),
            xphy_line: Some(self.resolve_xphy_pins(matcher, Side::Line)?),
        })
    }

    /// Return the transceiver lanes used by a port, if it lists any.
    ///
    /// There are no overrides of transceiver lanes.
    pub fn resolve_transceiver_pins(
        &self,
        matcher: &ProfileMatcher,
    ) -> Result<Option<Vec<PinConfig>>, Error> {
        let port = require_port(matcher, "transceiver")?;
        Ok(self
            .platform_port_config(port, matcher.profile())?
            .pins
            .transceiver
            .clone())
    }

    /// Return the ASIC lanes of the core behind each controlling port, for
    /// the profile it is configured with.
    ///
    /// Ports which are controlled by another port are skipped. Each core's
    /// lanes are resolved through a context naming only its chip.
    pub fn core_pin_mapping(
        &self,
        ports: &[(PortId, ProfileId)],
    ) -> Result<BTreeMap<String, (DataPlanePhyChip, Vec<PinConfig>)>, Error> {
        let mut out = BTreeMap::new();
        for (port, profile) in ports.iter().copied() {
            let entry = self.port(port)?;
            if !entry.is_controlling_port() {
                continue;
            }
            let chip = self.port_iphy_chip(port)?;
            let matcher = ProfileMatcher::new(profile).with_context(PortConfigOverrideFactor {
                chips: Some(vec![chip.clone()]),
                ..Default::default()
            });
            let pins = self.resolve_iphy_pins(&matcher)?;
            out.insert(chip.name.clone(), (chip.clone(), pins));
        }
        Ok(out)
    }
}

fn require_port(matcher: &ProfileMatcher, what: &str) -> Result<PortId, Error> {
    matcher
        .port()
        .ok_or_else(|| Error::InvalidFactor(format!("resolving {what} pins requires a port")))
}

// Apply an override's transmit settings to the base lanes.
fn retune(
    base: &[PinConfig],
    tune: &[PinConfig],
    port: PortId,
    profile: ProfileId,
    side: PinGroup,
) -> Result<Vec<PinConfig>, Error> {
    if tune.len() != base.len() && tune.len() != 1 {
        return Err(Error::ConfigMismatch {
            port,
            profile,
            side,
            expected: base.len(),
            actual: tune.len(),
        });
    }
    let broadcast = tune.len() == 1;
    Ok(base
        .iter()
        .enumerate()
        .map(|(i, pin)| pin.retuned(&tune[if broadcast { 0 } else { i }]))
        .collect())
}
