// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Oxide Computer Company

//! Resolve how a switch's logical ports map onto PHY and transceiver lanes.
//!
//! A [`PlatformMapping`] holds four tables loaded from a platform-mapping
//! payload:
//!
//! - The ports, each with its base wiring and the pin configuration it uses
//!   for every profile it supports.
//! - The profile catalog, describing the electrical characteristics of each
//!   profile, possibly restricted to a set of PIMs.
//! - The chips referenced by the wiring.
//! - An ordered list of override rules, each guarded by a factor, which
//!   re-tune lanes or replace the profile for matching ports.
//!
//! Mappings are built once, either from a single payload or by merging the
//! per-slot mappings of a chassis with [`PlatformMapping::merge`]. After that
//! they are read-only, and every resolver operation takes `&self`.

use once_cell::sync::Lazy;
use platform_mapping_types::config::PlatformMappingConfig;
use platform_mapping_types::config::PlatformPortConfig;
use platform_mapping_types::config::PlatformPortEntry;
use platform_mapping_types::config::PortConfigOverride;
use platform_mapping_types::config::ProfileEntry;
use platform_mapping_types::phy::DataPlanePhyChip;
use platform_mapping_types::phy::PinGroup;
use platform_mapping_types::PimId;
use platform_mapping_types::PortId;
use platform_mapping_types::PortSpeed;
use platform_mapping_types::ProfileId;
use regex::Regex;
use slog::warn;
use slog::Logger;
use std::collections::BTreeMap;

mod matcher;
mod merge;
mod resolve;
pub mod transceiver;
mod validate;

#[cfg(test)]
pub(crate) mod test_utils;

pub use matcher::ProfileMatcher;
pub use platform_mapping_types as types;
pub use validate::ValidationError;

// Front-panel port names encode the PIM, e.g., `eth3/1/1` is on PIM 3.
static PORT_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^eth(\d+)/(\d+)/(\d+)$").expect("Invalid port name regex")
});

/// An error resolving or constructing a platform mapping.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Port {0} not found")]
    PortNotFound(PortId),

    #[error("Port {port} has no profile '{profile}'")]
    ProfileNotFound { port: PortId, profile: ProfileId },

    #[error("Chip '{0}' not found")]
    ChipNotFound(String),

    #[error("No port named '{0}'")]
    PortNameNotFound(String),

    #[error("No {group} pins found for {context}")]
    PinsNotFound { group: PinGroup, context: String },

    #[error(
        "Port {port}, profile '{profile}' has mismatched override {side} \
        lane size: {actual}, expected size: {expected}"
    )]
    ConfigMismatch {
        port: PortId,
        profile: ProfileId,
        side: PinGroup,
        expected: usize,
        actual: usize,
    },

    #[error(
        "Supported profiles '{profile}' with different configs overlap on \
        PIMs {}",
        fmt_pims(.pims)
    )]
    ConflictingProfileConfig {
        profile: ProfileId,
        /// The overlapping PIMs, or `None` if either entry applies to all
        /// PIMs.
        pims: Option<Vec<PimId>>,
    },

    #[error("Invalid port name '{name}' for port {port}")]
    InvalidPortName { port: PortId, name: String },

    #[error("Invalid factor: {0}")]
    InvalidFactor(String),

    #[error("Malformed platform mapping payload")]
    MalformedPayload(#[from] serde_json::Error),
}

fn fmt_pims(pims: &Option<Vec<PimId>>) -> String {
    match pims {
        None => String::from("(all)"),
        Some(pims) => itertools::join(pims, ","),
    }
}

/// A coarse classification of [`Error`]s, for callers deciding whether a
/// failure is recoverable.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// A port, profile, chip, or pin set is absent.
    NotFound,
    /// An override's lane count cannot be applied to a port.
    ConfigMismatch,
    /// Two slot mappings disagree about a profile.
    Conflict,
    /// A port name or factor is malformed.
    Invalid,
    /// A payload could not be deserialized.
    Malformed,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::PortNotFound(_)
            | Error::ProfileNotFound { .. }
            | Error::ChipNotFound(_)
            | Error::PortNameNotFound(_)
            | Error::PinsNotFound { .. } => ErrorKind::NotFound,
            Error::ConfigMismatch { .. } => ErrorKind::ConfigMismatch,
            Error::ConflictingProfileConfig { .. } => ErrorKind::Conflict,
            Error::InvalidPortName { .. } | Error::InvalidFactor(_) => ErrorKind::Invalid,
            Error::MalformedPayload(_) => ErrorKind::Malformed,
        }
    }
}

/// The wiring of a switch platform, and the rules for tuning it.
#[derive(Clone, Debug)]
pub struct PlatformMapping {
    ports: BTreeMap<PortId, PlatformPortEntry>,
    profiles: Vec<ProfileEntry>,
    chips: BTreeMap<String, DataPlanePhyChip>,
    overrides: Vec<PortConfigOverride>,
    log: Logger,
}

impl PlatformMapping {
    /// Create an empty mapping, usually the target of a chassis merge.
    pub fn empty(log: Logger) -> Self {
        Self {
            ports: BTreeMap::new(),
            profiles: Vec::new(),
            chips: BTreeMap::new(),
            overrides: Vec::new(),
            log,
        }
    }

    /// Create a mapping from a deserialized payload.
    ///
    /// If the payload lists a chip name more than once, the first descriptor
    /// is kept.
    pub fn new(config: PlatformMappingConfig, log: Logger) -> Self {
        let mut chips = BTreeMap::new();
        for chip in config.chips.into_iter() {
            if let Some(existing) = chips.get(&chip.name) {
                if existing != &chip {
                    warn!(
                        log,
                        "duplicate chip in payload, keeping the first";
                        "chip" => &chip.name,
                    );
                }
                continue;
            }
            chips.insert(chip.name.clone(), chip);
        }
        Self {
            ports: config.ports,
            profiles: config.platform_supported_profiles,
            chips,
            overrides: config.port_config_overrides,
            log,
        }
    }

    /// Parse a mapping from a JSON payload.
    pub fn from_json(s: &str, log: Logger) -> Result<Self, Error> {
        let config = serde_json::from_str(s)?;
        Ok(Self::new(config, log))
    }

    /// Return the mapping in its payload form.
    ///
    /// Chips are listed in name order.
    pub fn to_config(&self) -> PlatformMappingConfig {
        PlatformMappingConfig {
            ports: self.ports.clone(),
            chips: self.chips.values().cloned().collect(),
            platform_supported_profiles: self.profiles.clone(),
            port_config_overrides: self.overrides.clone(),
        }
    }

    /// Serialize the mapping to a pretty-printed JSON payload.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(&self.to_config()).map_err(Error::from)
    }

    pub fn log(&self) -> &Logger {
        &self.log
    }

    pub fn ports(&self) -> &BTreeMap<PortId, PlatformPortEntry> {
        &self.ports
    }

    pub fn chips(&self) -> &BTreeMap<String, DataPlanePhyChip> {
        &self.chips
    }

    /// Return the profile catalog, in the order entries are consulted.
    pub fn supported_profiles(&self) -> &[ProfileEntry] {
        &self.profiles
    }

    /// Return the override rules, in the order they are consulted.
    pub fn overrides(&self) -> &[PortConfigOverride] {
        &self.overrides
    }

    /// Look up a port by ID.
    pub fn port(&self, port: PortId) -> Result<&PlatformPortEntry, Error> {
        self.ports.get(&port).ok_or(Error::PortNotFound(port))
    }

    /// Look up a chip by name.
    pub fn chip(&self, name: &str) -> Result<&DataPlanePhyChip, Error> {
        self.chips
            .get(name)
            .ok_or_else(|| Error::ChipNotFound(name.to_string()))
    }

    /// Find the ID of the port with the given name.
    pub fn port_id(&self, name: &str) -> Result<PortId, Error> {
        self.ports
            .values()
            .find(|entry| entry.name() == name)
            .map(|entry| entry.id())
            .ok_or_else(|| Error::PortNameNotFound(name.to_string()))
    }

    /// Return the PIM a port is on, parsed from its name.
    pub fn pim_id(&self, port: PortId) -> Result<PimId, Error> {
        pim_id_of(self.port(port)?)
    }

    /// Return the ASIC chip a port's first lane is wired to.
    pub fn port_iphy_chip(&self, port: PortId) -> Result<&DataPlanePhyChip, Error> {
        let name = self.port(port)?.iphy_chip().ok_or_else(|| Error::PinsNotFound {
            group: PinGroup::Iphy,
            context: format!("port {port}"),
        })?;
        self.chip(name)
    }

    /// Return a port's configuration for one of its supported profiles.
    pub fn platform_port_config(
        &self,
        port: PortId,
        profile: ProfileId,
    ) -> Result<&PlatformPortConfig, Error> {
        self.port(port)?
            .supported_profiles
            .get(&profile)
            .ok_or(Error::ProfileNotFound { port, profile })
    }

    /// Return the fastest speed among a port's supported profiles which are
    /// found in the catalog or an override.
    ///
    /// A port none of whose profiles resolve has speed zero.
    pub fn port_max_speed(&self, port: PortId) -> Result<PortSpeed, Error> {
        let entry = self.port(port)?;
        let mut max = PortSpeed::default();
        for profile in entry.supported_profiles.keys() {
            let matcher = ProfileMatcher::new(*profile).with_port(port);
            if let Some(cfg) = self.resolve_profile_config(&matcher)? {
                max = max.max(cfg.speed);
            }
        }
        Ok(max)
    }

    /// Return the override rules which may apply to a port.
    ///
    /// A rule applies if its port list names the port; or, lacking a port
    /// list, its chip list names the port's ASIC chip; or it restricts
    /// neither.
    pub fn port_config_overrides(
        &self,
        port: PortId,
    ) -> Result<Vec<&PortConfigOverride>, Error> {
        let entry = self.port(port)?;
        Ok(self
            .overrides
            .iter()
            .filter(|o| override_applies_to(o, port, entry))
            .collect())
    }
}

// Parse the PIM out of a port's name.
pub(crate) fn pim_id_of(entry: &PlatformPortEntry) -> Result<PimId, Error> {
    PORT_NAME_RE
        .captures(entry.name())
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .map(PimId)
        .ok_or_else(|| Error::InvalidPortName {
            port: entry.id(),
            name: entry.name().to_string(),
        })
}

pub(crate) fn override_applies_to(
    rule: &PortConfigOverride,
    port: PortId,
    entry: &PlatformPortEntry,
) -> bool {
    if rule.factor.ports.is_some() {
        rule.factor.names_port(port)
    } else if rule.factor.chips.is_some() {
        entry
            .iphy_chip()
            .map(|chip| rule.factor.names_chip(chip))
            .unwrap_or(false)
    } else {
        true
    }
}
