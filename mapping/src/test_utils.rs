// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Oxide Computer Company

//! Fixtures shared by the unit tests.

use platform_mapping_types::config::PlatformMappingConfig;
use platform_mapping_types::config::PlatformPortConfig;
use platform_mapping_types::config::PlatformPortEntry;
use platform_mapping_types::config::PlatformPortMapping;
use platform_mapping_types::config::ProfileEntry;
use platform_mapping_types::factor::PlatformPortConfigFactor;
use platform_mapping_types::phy::ChipType;
use platform_mapping_types::phy::DataPlanePhyChip;
use platform_mapping_types::phy::Pin;
use platform_mapping_types::phy::PinConfig;
use platform_mapping_types::phy::PinConnection;
use platform_mapping_types::phy::PinId;
use platform_mapping_types::phy::PortPinConfig;
use platform_mapping_types::phy::TxSettings;
use platform_mapping_types::profile::FecMode;
use platform_mapping_types::profile::Medium;
use platform_mapping_types::profile::Modulation;
use platform_mapping_types::profile::PortProfileConfig;
use platform_mapping_types::profile::ProfileSideConfig;
use platform_mapping_types::PimId;
use platform_mapping_types::PortId;
use platform_mapping_types::PortSpeed;
use platform_mapping_types::ProfileId;
use slog::Logger;

pub fn test_logger() -> Logger {
    Logger::root(slog::Discard, slog::o!())
}

/// A single slot, PIM 2, with three ports:
///
/// - Port 1, `eth2/1/1`, on ASIC chip `WC9`, supporting profiles 17 (40G) and
///   19 (50G).
/// - Port 2, `eth2/2/1`, on ASIC chip `WC10` behind the external PHY `XPHY1`,
///   supporting profile 17.
/// - Port 3, `fab3`, a fabric port whose name encodes no PIM.
///
/// There are two override rules. The first re-tunes every lane of port 1 at
/// profile 17. The second applies to chip `WC9` regardless of port.
pub const SLOT_PAYLOAD: &str = r#"{
    "ports": {
        "1": {
            "mapping": {
                "id": 1,
                "name": "eth2/1/1",
                "controllingPort": 1,
                "pins": [
                    {"a": {"chip": "WC9", "lane": 0}, "z": {"end": {"chip": "eth2/1", "lane": 0}}},
                    {"a": {"chip": "WC9", "lane": 1}, "z": {"end": {"chip": "eth2/1", "lane": 1}}},
                    {"a": {"chip": "WC9", "lane": 2}, "z": {"end": {"chip": "eth2/1", "lane": 2}}},
                    {"a": {"chip": "WC9", "lane": 3}, "z": {"end": {"chip": "eth2/1", "lane": 3}}}
                ]
            },
            "supportedProfiles": {
                "17": {
                    "pins": {
                        "iphy": [
                            {"id": {"chip": "WC9", "lane": 0}, "tx": {"main": 60}, "rx": {"ctlCode": 3}},
                            {"id": {"chip": "WC9", "lane": 1}, "tx": {"main": 60}, "rx": {"ctlCode": 3}},
                            {"id": {"chip": "WC9", "lane": 2}, "tx": {"main": 60}, "rx": {"ctlCode": 3}},
                            {"id": {"chip": "WC9", "lane": 3}, "tx": {"main": 60}, "rx": {"ctlCode": 3}}
                        ],
                        "transceiver": [
                            {"id": {"chip": "eth2/1", "lane": 0}},
                            {"id": {"chip": "eth2/1", "lane": 1}},
                            {"id": {"chip": "eth2/1", "lane": 2}},
                            {"id": {"chip": "eth2/1", "lane": 3}}
                        ]
                    }
                },
                "19": {
                    "pins": {
                        "iphy": [
                            {"id": {"chip": "WC9", "lane": 0}},
                            {"id": {"chip": "WC9", "lane": 1}}
                        ]
                    }
                }
            }
        },
        "2": {
            "mapping": {
                "id": 2,
                "name": "eth2/2/1",
                "controllingPort": 2,
                "pins": [
                    {
                        "a": {"chip": "WC10", "lane": 0},
                        "z": {"junction": {
                            "system": {"chip": "XPHY1", "lane": 0},
                            "line": [
                                {"a": {"chip": "XPHY1", "lane": 4}, "z": {"end": {"chip": "eth2/2", "lane": 0}}},
                                {"a": {"chip": "XPHY1", "lane": 5}, "z": {"end": {"chip": "eth2/2", "lane": 1}}}
                            ]
                        }}
                    },
                    {
                        "a": {"chip": "WC10", "lane": 1},
                        "z": {"junction": {
                            "system": {"chip": "XPHY1", "lane": 1},
                            "line": [
                                {"a": {"chip": "XPHY1", "lane": 6}, "z": {"end": {"chip": "eth2/2", "lane": 2}}},
                                {"a": {"chip": "XPHY1", "lane": 7}, "z": {"end": {"chip": "eth2/2", "lane": 3}}}
                            ]
                        }}
                    }
                ]
            },
            "supportedProfiles": {
                "17": {
                    "pins": {
                        "iphy": [
                            {"id": {"chip": "WC10", "lane": 0}},
                            {"id": {"chip": "WC10", "lane": 1}}
                        ],
                        "xphySys": [
                            {"id": {"chip": "XPHY1", "lane": 0}},
                            {"id": {"chip": "XPHY1", "lane": 1}}
                        ],
                        "xphyLine": [
                            {"id": {"chip": "XPHY1", "lane": 4}},
                            {"id": {"chip": "XPHY1", "lane": 5}},
                            {"id": {"chip": "XPHY1", "lane": 6}},
                            {"id": {"chip": "XPHY1", "lane": 7}}
                        ]
                    }
                }
            }
        },
        "3": {
            "mapping": {
                "id": 3,
                "name": "fab3",
                "controllingPort": 3,
                "pins": [
                    {"a": {"chip": "WC11", "lane": 0}}
                ],
                "portType": 1
            },
            "supportedProfiles": {
                "11": {
                    "pins": {
                        "iphy": [{"id": {"chip": "WC11", "lane": 0}}]
                    }
                }
            }
        }
    },
    "chips": [
        {"name": "WC9", "type": 1, "physicalID": 9},
        {"name": "WC10", "type": 1, "physicalID": 10},
        {"name": "WC11", "type": 1, "physicalID": 11},
        {"name": "XPHY1", "type": 2, "physicalID": 1},
        {"name": "eth2/1", "type": 3, "physicalID": 0},
        {"name": "eth2/2", "type": 3, "physicalID": 1}
    ],
    "platformSupportedProfiles": [
        {
            "factor": {"profileID": 11},
            "profile": {"speed": 10000, "iphy": {"numLanes": 1, "modulation": 1, "fec": 1, "medium": 1}}
        },
        {
            "factor": {"profileID": 17},
            "profile": {"speed": 40000, "iphy": {"numLanes": 4, "modulation": 1, "fec": 1, "medium": 1}}
        },
        {
            "factor": {"profileID": 19},
            "profile": {"speed": 50000, "iphy": {"numLanes": 2, "modulation": 1, "fec": 1, "medium": 1}}
        }
    ],
    "portConfigOverrides": [
        {
            "factor": {"ports": [1], "profiles": [17]},
            "pins": {"iphy": [{"id": {"chip": "WC9", "lane": 0}, "tx": {"main": 10}}]}
        },
        {
            "factor": {"chips": [{"name": "WC9", "type": 1, "physicalID": 9}]},
            "pins": {"iphy": [
                {"id": {"chip": "WC9", "lane": 0}, "tx": {"main": 30}},
                {"id": {"chip": "WC9", "lane": 1}, "tx": {"main": 30}},
                {"id": {"chip": "WC9", "lane": 2}, "tx": {"main": 30}},
                {"id": {"chip": "WC9", "lane": 3}, "tx": {"main": 30}}
            ]}
        }
    ]
}"#;

pub fn iphy_chip(name: &str, physical_id: i32) -> DataPlanePhyChip {
    DataPlanePhyChip {
        name: name.to_string(),
        chip_type: ChipType::Iphy,
        physical_id,
    }
}

/// Untuned lanes `0..n` on `chip`.
pub fn lanes(chip: &str, n: i32) -> Vec<PinConfig> {
    (0..n).map(|lane| PinConfig::new(PinId::new(chip, lane))).collect()
}

/// Lanes `0..n` on `chip`, each with the given main tap.
pub fn tuned_lanes(chip: &str, n: i32, main: i16) -> Vec<PinConfig> {
    lanes(chip, n)
        .into_iter()
        .map(|mut pin| {
            pin.tx = Some(TxSettings {
                main,
                ..Default::default()
            });
            pin
        })
        .collect()
}

pub fn profile_config(speed: u32, num_lanes: u8, medium: Medium) -> PortProfileConfig {
    PortProfileConfig {
        speed: PortSpeed(speed),
        iphy: ProfileSideConfig {
            num_lanes,
            modulation: Modulation::Nrz,
            fec: FecMode::None,
            medium: Some(medium),
            interface_mode: None,
            interface_type: None,
        },
        xphy_system: None,
        xphy_line: None,
    }
}

/// A port named `eth<pim>/<id>/1`, on `n_lanes` lanes of `chip`, supporting
/// each of `profiles` on all of its lanes.
pub fn port_entry(
    id: i32,
    pim: i32,
    chip: &str,
    n_lanes: i32,
    profiles: &[ProfileId],
) -> PlatformPortEntry {
    let pins = lanes(chip, n_lanes)
        .into_iter()
        .map(|pin| PinConnection {
            a: pin.id.clone(),
            z: Some(Pin::End(PinId::new(format!("eth{pim}/{id}"), pin.id.lane))),
        })
        .collect();
    let supported_profiles = profiles
        .iter()
        .map(|profile| {
            let config = PlatformPortConfig {
                subsumed_ports: None,
                pins: PortPinConfig {
                    iphy: lanes(chip, n_lanes),
                    ..Default::default()
                },
            };
            (*profile, config)
        })
        .collect();
    PlatformPortEntry {
        mapping: PlatformPortMapping {
            id: PortId(id),
            name: format!("eth{pim}/{id}/1"),
            controlling_port: PortId(id),
            pins,
            port_type: None,
            scope: None,
            attached_core_id: None,
            attached_core_port_index: None,
        },
        supported_profiles,
    }
}

/// The payload of one slot of a chassis: a single 4-lane port with ID
/// `10 * pim`, on the chip `WC<pim>`, supporting profile 17.
///
/// The catalog entry for profile 17 is restricted to `pim`.
pub fn slot_config(pim: i32) -> PlatformMappingConfig {
    let chip = format!("WC{pim}");
    let port = port_entry(10 * pim, pim, &chip, 4, &[ProfileId(17)]);
    PlatformMappingConfig {
        ports: [(port.id(), port)].into_iter().collect(),
        chips: vec![iphy_chip(&chip, pim)],
        platform_supported_profiles: vec![ProfileEntry {
            factor: PlatformPortConfigFactor::with_pims(ProfileId(17), [PimId(pim)]),
            profile: profile_config(40_000, 4, Medium::Copper),
        }],
        port_config_overrides: vec![],
    }
}
