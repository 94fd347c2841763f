// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Oxide Computer Company

//! Assembling the platform mapping of a whole chassis.
//!
//! A chassis is described by one or more slot payloads, one for each
//! pluggable interface module (PIM). The [`PlatformBuilder`] loads each
//! payload, merges them into a single [`PlatformMapping`], checks the result,
//! and publishes it as an immutable, shareable value.

pub mod builder;
pub mod chassis;
pub mod config;
pub mod results;

pub use builder::PlatformBuilder;
pub use chassis::ChassisKind;
pub use chassis::ChassisProfile;
pub use config::ConfigBuilder;
pub use config::PlatformConfig;
pub use config::SlotPayload;
pub use platform_mapping::PlatformMapping;
pub use results::PortResult;

use std::path::PathBuf;

/// An error assembling a platform mapping.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Mapping(#[from] platform_mapping::Error),

    #[error("Failed to read payload '{}'", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    #[error("Payload '{}' could not be loaded", .path.display())]
    Payload {
        path: PathBuf,
        #[source]
        err: platform_mapping::Error,
    },

    #[error("Invalid platform configuration: {0}")]
    Config(String),
}
