// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Oxide Computer Company

//! Referential checks on a constructed mapping.

use crate::Error;
use crate::PlatformMapping;
use itertools::Itertools;
use platform_mapping_types::PortId;
use platform_mapping_types::ProfileId;
use std::collections::BTreeSet;

/// A problem found in a mapping.
#[derive(Clone, Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    #[error("Port {port} references unknown chip '{chip}'")]
    UnknownChip { port: PortId, chip: String },

    #[error("Port {port} is controlled by unknown port {controller}")]
    UnknownControllingPort { port: PortId, controller: PortId },

    #[error(
        "Port {port} is controlled by port {controller}, which is not a \
        controlling port"
    )]
    ChainedControllingPort { port: PortId, controller: PortId },

    #[error("Port {port}, profile '{profile}' subsumes unknown port {subsumed}")]
    UnknownSubsumedPort {
        port: PortId,
        profile: ProfileId,
        subsumed: PortId,
    },

    #[error(
        "Port {port}, profile '{profile}' subsumes port {subsumed}, which \
        has a different controlling port"
    )]
    ForeignSubsumedPort {
        port: PortId,
        profile: ProfileId,
        subsumed: PortId,
    },

    #[error("Port {port} supports profile '{profile}', which is not in the catalog")]
    UncataloguedProfile { port: PortId, profile: ProfileId },

    #[error("Override {index} references unknown port {port}")]
    OverrideUnknownPort { index: usize, port: PortId },

    #[error("Override {index} references profile '{profile}', which no port supports")]
    OverrideUnknownProfile { index: usize, profile: ProfileId },

    #[error("Override {index} references unknown chip '{chip}'")]
    OverrideUnknownChip { index: usize, chip: String },
}

impl PlatformMapping {
    /// Check the mapping for dangling references, returning every problem
    /// found.
    pub fn problems(&self) -> Vec<ValidationError> {
        let mut out = Vec::new();
        let catalogued = self
            .profiles
            .iter()
            .map(|entry| entry.factor.profile_id)
            .chain(
                self.overrides
                    .iter()
                    .filter(|rule| rule.port_profile_config.is_some())
                    .filter_map(|rule| rule.factor.profiles.as_ref())
                    .flatten()
                    .copied(),
            )
            .collect::<BTreeSet<_>>();
        let supported = self
            .ports
            .values()
            .flat_map(|entry| entry.supported_profiles.keys().copied())
            .collect::<BTreeSet<_>>();

        for (id, entry) in self.ports.iter() {
            let port = *id;
            let mut chips = BTreeSet::new();
            for conn in entry.mapping.pins.iter() {
                conn.for_each_pin(&mut |pin| {
                    chips.insert(pin.chip.as_str());
                });
            }
            for config in entry.supported_profiles.values() {
                chips.extend(config.pins.all_pins().map(|pin| pin.id.chip.as_str()));
            }
            out.extend(
                chips
                    .into_iter()
                    .filter(|chip| !self.chips.contains_key(*chip))
                    .map(|chip| ValidationError::UnknownChip {
                        port,
                        chip: chip.to_string(),
                    }),
            );

            let controller = entry.mapping.controlling_port;
            match self.ports.get(&controller) {
                None => out.push(ValidationError::UnknownControllingPort { port, controller }),
                Some(c) if !c.is_controlling_port() => {
                    out.push(ValidationError::ChainedControllingPort { port, controller })
                }
                Some(_) => {}
            }

            for (profile, config) in entry.supported_profiles.iter() {
                let profile = *profile;
                if !catalogued.contains(&profile) {
                    out.push(ValidationError::UncataloguedProfile { port, profile });
                }
                for subsumed in config.subsumed_ports.iter().flatten().copied() {
                    match self.ports.get(&subsumed) {
                        None => out.push(ValidationError::UnknownSubsumedPort {
                            port,
                            profile,
                            subsumed,
                        }),
                        Some(other) if other.mapping.controlling_port != controller => {
                            out.push(ValidationError::ForeignSubsumedPort {
                                port,
                                profile,
                                subsumed,
                            })
                        }
                        Some(_) => {}
                    }
                }
            }
        }

        for (index, rule) in self.overrides.iter().enumerate() {
            let factor = &rule.factor;
            for port in factor.ports.iter().flatten().copied() {
                if !self.ports.contains_key(&port) {
                    out.push(ValidationError::OverrideUnknownPort { index, port });
                }
            }
            for profile in factor.profiles.iter().flatten().copied() {
                if !supported.contains(&profile) {
                    out.push(ValidationError::OverrideUnknownProfile { index, profile });
                }
            }
            let factor_chips = factor.chips.iter().flatten().map(|chip| chip.name.as_str());
            let pin_chips = rule
                .pins
                .iter()
                .flat_map(|pins| pins.all_pins())
                .map(|pin| pin.id.chip.as_str());
            out.extend(
                factor_chips
                    .chain(pin_chips)
                    .unique()
                    .filter(|chip| !self.chips.contains_key(*chip))
                    .map(|chip| ValidationError::OverrideUnknownChip {
                        index,
                        chip: chip.to_string(),
                    }),
            );
        }
        out
    }

    /// Check the mapping for dangling references.
    ///
    /// All problems found are reported in one [`Error::InvalidFactor`].
    pub fn validate(&self) -> Result<(), Error> {
        let problems = self.problems();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidFactor(problems.iter().join("; ")))
        }
    }
}
