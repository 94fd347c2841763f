// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Oxide Computer Company

//! Configuration of the platform builder.

use crate::chassis::ChassisProfile;
use crate::ChassisKind;
use crate::Error;
use platform_mapping_types::PimId;
use std::path::Path;
use std::path::PathBuf;

/// Return the default directory under which per-chassis payloads are found.
pub fn default_mapping_dir() -> PathBuf {
    PathBuf::from("/etc/platform-mapping")
}

/// Return whether the assembled mapping is validated by default.
pub const fn default_validate() -> bool {
    true
}

/// The payload describing one slot of a chassis.
#[derive(Clone, Debug, PartialEq)]
pub struct SlotPayload {
    /// The PIM in this slot, if the chassis has PIMs.
    pub pim: Option<PimId>,
    pub path: PathBuf,
}

impl SlotPayload {
    /// Return the prefix used to qualify this slot's chip names.
    ///
    /// `index` is the position of the slot in the configuration, used when
    /// the slot has no PIM.
    pub fn chip_prefix(&self, index: usize) -> String {
        match self.pim {
            Some(pim) => format!("pim{pim}_"),
            None => format!("slot{index}_"),
        }
    }
}

/// Configuration for building a platform mapping.
#[derive(Clone, Debug, PartialEq)]
pub struct PlatformConfig {
    /// A name for the platform, used in log messages.
    pub name: String,
    /// The slot payloads, merged in order.
    pub slots: Vec<SlotPayload>,
    /// If true, chip names in each slot are qualified before merging.
    pub namespace_chips: bool,
    /// If true, the assembled mapping must pass validation to be published.
    pub validate: bool,
}

/// A type for building a [`PlatformConfig`].
///
/// A configuration names either a chassis, whose payloads are found in a
/// directory, or an explicit list of payload files. Not both.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    chassis: Option<ChassisKind>,
    mapping_dir: Option<PathBuf>,
    payloads: Vec<PathBuf>,
    namespace_chips: Option<bool>,
    validate: Option<bool>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the kind of chassis to assemble.
    pub fn chassis(mut self, kind: ChassisKind) -> Self {
        self.chassis = Some(kind);
        self
    }

    /// Set the directory containing the chassis payloads.
    pub fn mapping_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.mapping_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Add an explicit payload file, as the next slot.
    pub fn payload(mut self, path: impl AsRef<Path>) -> Self {
        self.payloads.push(path.as_ref().to_path_buf());
        self
    }

    /// Override whether chip names are qualified by slot.
    pub fn namespace_chips(mut self, namespace: bool) -> Self {
        self.namespace_chips = Some(namespace);
        self
    }

    /// Set whether the assembled mapping is validated.
    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = Some(validate);
        self
    }

    /// Build a `PlatformConfig` from `self`.
    pub fn build(self) -> Result<PlatformConfig, Error> {
        let validate = self.validate.unwrap_or_else(default_validate);
        match (self.chassis, self.payloads.is_empty()) {
            (Some(_), false) => Err(Error::Config(String::from(
                "a chassis and explicit payloads are mutually exclusive",
            ))),
            (None, true) => Err(Error::Config(String::from(
                "either a chassis or at least one payload is required",
            ))),
            (None, false) => {
                if self.mapping_dir.is_some() {
                    return Err(Error::Config(String::from(
                        "a mapping directory requires a chassis",
                    )));
                }
                let slots = self
                    .payloads
                    .into_iter()
                    .map(|path| SlotPayload { pim: None, path })
                    .collect();
                Ok(PlatformConfig {
                    name: String::from("custom"),
                    slots,
                    namespace_chips: self.namespace_chips.unwrap_or(false),
                    validate,
                })
            }
            (Some(kind), true) => {
                let profile = kind.profile();
                let dir = self
                    .mapping_dir
                    .unwrap_or_else(|| default_mapping_dir().join(profile.name));
                let slots = if profile.pims.is_some() {
                    profile
                        .pim_ids()
                        .into_iter()
                        .map(|pim| SlotPayload {
                            pim: Some(pim),
                            path: dir.join(ChassisProfile::payload_file(Some(pim))),
                        })
                        .collect()
                } else {
                    vec![SlotPayload {
                        pim: None,
                        path: dir.join(ChassisProfile::payload_file(None)),
                    }]
                };
                Ok(PlatformConfig {
                    name: profile.name.to_string(),
                    slots,
                    namespace_chips: self.namespace_chips.unwrap_or(profile.namespace_chips),
                    validate,
                })
            }
        }
    }
}
