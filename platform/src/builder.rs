// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Oxide Computer Company

//! Loading slot payloads and publishing the merged mapping.

use crate::config::PlatformConfig;
use crate::config::SlotPayload;
use crate::Error;
use platform_mapping::PlatformMapping;
use slog::debug;
use slog::info;
use slog::o;
use slog::Logger;
use std::sync::Arc;

/// A type for assembling the mapping of a platform from its slot payloads.
#[derive(Debug)]
pub struct PlatformBuilder {
    config: PlatformConfig,
    log: Logger,
}

impl PlatformBuilder {
    pub fn new(config: PlatformConfig, log: Logger) -> Self {
        let log = log.new(o!("platform" => config.name.clone()));
        Self { config, log }
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    /// Load the mapping of one slot, without qualifying its chips.
    pub fn load_slot(&self, slot: &SlotPayload) -> Result<PlatformMapping, Error> {
        let contents = std::fs::read_to_string(&slot.path).map_err(|err| Error::Io {
            path: slot.path.clone(),
            err,
        })?;
        let log = match slot.pim {
            Some(pim) => self.log.new(o!("pim" => pim.0)),
            None => self.log.new(o!("payload" => slot.path.display().to_string())),
        };
        PlatformMapping::from_json(&contents, log).map_err(|err| Error::Payload {
            path: slot.path.clone(),
            err,
        })
    }

    /// Load and merge every slot, returning the finished mapping.
    ///
    /// The first slot is the base into which the others are merged. Nothing
    /// is returned unless every slot merges, and the result validates when
    /// validation is enabled.
    pub fn build(self) -> Result<Arc<PlatformMapping>, Error> {
        let mut merged: Option<PlatformMapping> = None;
        for (index, slot) in self.config.slots.iter().enumerate() {
            let mut mapping = self.load_slot(slot)?;
            if self.config.namespace_chips {
                mapping.namespace_chips(&slot.chip_prefix(index));
            }
            debug!(
                self.log,
                "loaded slot payload";
                "path" => %slot.path.display(),
                "n_ports" => mapping.ports().len(),
                "n_overrides" => mapping.overrides().len(),
            );
            match merged.as_mut() {
                None => merged = Some(mapping),
                Some(base) => base.merge(mapping)?,
            }
        }
        let Some(mapping) = merged else {
            return Err(Error::Config(String::from("no slot payloads configured")));
        };
        if self.config.validate {
            mapping.validate()?;
        }
        info!(
            self.log,
            "built platform mapping";
            "n_slots" => self.config.slots.len(),
            "n_ports" => mapping.ports().len(),
            "n_chips" => mapping.chips().len(),
        );
        Ok(Arc::new(mapping))
    }
}
