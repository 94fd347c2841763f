// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Oxide Computer Company

//! Combining the mappings of a chassis' slots into one.

use crate::override_applies_to;
use crate::Error;
use crate::PlatformMapping;
use platform_mapping_types::config::PortConfigOverride;
use platform_mapping_types::config::ProfileEntry;
use platform_mapping_types::PimId;
use platform_mapping_types::PortId;
use slog::debug;
use slog::warn;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

impl PlatformMapping {
    /// Merge the mapping of another slot into this one.
    ///
    /// Ports and chips are moved over. A port ID or chip name already present
    /// is kept as it is, and the incoming one is dropped with a warning. Slot
    /// mappings are expected to use distinct port IDs, and to qualify their
    /// chip names with [`PlatformMapping::namespace_chips`] if they would
    /// otherwise collide.
    ///
    /// Profile catalog entries are combined with
    /// [`PlatformMapping::merge_supported_profile`], and the override rules
    /// applying to each incoming port with
    /// [`PlatformMapping::merge_port_config_overrides`].
    ///
    /// If two catalog entries conflict, an error is returned and `self` is
    /// left unchanged.
    pub fn merge(&mut self, incoming: PlatformMapping) -> Result<(), Error> {
        let mut profiles = self.profiles.clone();
        for entry in incoming.profiles.iter() {
            merge_profile_into(&mut profiles, entry.clone())?;
        }
        self.profiles = profiles;

        let mut accepted = Vec::new();
        for (id, entry) in incoming.ports.into_iter() {
            match self.ports.entry(id) {
                Entry::Occupied(_) => {
                    warn!(
                        self.log,
                        "duplicate port in merged mapping, keeping the existing entry";
                        "port" => %id,
                        "name" => entry.name(),
                    );
                }
                Entry::Vacant(slot) => {
                    slot.insert(entry);
                    accepted.push(id);
                }
            }
        }

        // Rules are re-homed in their incoming order, so each port keeps the
        // order in which its rules are tried.
        let mut cursors = BTreeMap::new();
        for rule in incoming.overrides.iter() {
            for port in accepted.iter().copied() {
                let applies = self
                    .ports
                    .get(&port)
                    .map(|entry| override_applies_to(rule, port, entry))
                    .unwrap_or(false);
                if applies {
                    self.rehome_override(port, rule.clone(), &mut cursors);
                }
            }
        }

        for (name, chip) in incoming.chips.into_iter() {
            match self.chips.entry(name) {
                Entry::Occupied(existing) => {
                    if existing.get() != &chip {
                        warn!(
                            self.log,
                            "conflicting chip in merged mapping, keeping the existing entry";
                            "chip" => existing.key(),
                        );
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(chip);
                }
            }
        }
        debug!(
            self.log,
            "merged platform mapping";
            "n_ports" => self.ports.len(),
            "n_chips" => self.chips.len(),
            "n_profiles" => self.profiles.len(),
            "n_overrides" => self.overrides.len(),
        );
        Ok(())
    }

    /// Add a profile catalog entry, combining it with an equal one if
    /// possible.
    ///
    /// An entry with the same profile ID but a different configuration must
    /// apply to PIMs disjoint from the incoming entry's, otherwise
    /// [`Error::ConflictingProfileConfig`] is returned. An entry with the same
    /// configuration absorbs the incoming one's PIMs.
    pub fn merge_supported_profile(&mut self, incoming: ProfileEntry) -> Result<(), Error> {
        merge_profile_into(&mut self.profiles, incoming)
    }

    /// Re-home override rules onto one port.
    ///
    /// A rule which differs from an existing one only in the ports it names
    /// is folded into it, by adding `port` to the existing rule's port list.
    /// Other rules are added restricted to `port` if they named ports, or
    /// appended as they are if not. Either way, `rules` are tried for `port`
    /// in the order given.
    pub fn merge_port_config_overrides(
        &mut self,
        port: PortId,
        rules: impl IntoIterator<Item = PortConfigOverride>,
    ) {
        let mut cursors = BTreeMap::new();
        for rule in rules.into_iter() {
            self.rehome_override(port, rule, &mut cursors);
        }
    }

    // Place one rule for `port`, after the rules already placed for it.
    //
    // `cursors` holds, for each port, the index just past the last rule
    // placed for it.
    fn rehome_override(
        &mut self,
        port: PortId,
        rule: PortConfigOverride,
        cursors: &mut BTreeMap<PortId, usize>,
    ) {
        let cursor = cursors.get(&port).copied().unwrap_or(0);
        let entry = self.ports.get(&port);
        let applies = |current: &PortConfigOverride| match entry {
            Some(entry) => override_applies_to(current, port, entry),
            None => current.factor.ports.is_none() || current.factor.names_port(port),
        };
        let first_applying = (cursor..self.overrides.len()).find(|i| applies(&self.overrides[*i]));
        let equal = (cursor..self.overrides.len()).find(|i| {
            let current = &self.overrides[*i];
            current.same_rule_as(&rule)
                && (rule.factor.ports.is_some() || current.factor.ports.is_none())
        });

        // Folding is only possible if no other rule for this port would be
        // tried first.
        if let Some(index) = equal.filter(|i| first_applying.map_or(true, |f| *i <= f)) {
            if let Some(ports) = self.overrides[index].factor.ports.as_mut() {
                if !ports.contains(&port) {
                    ports.push(port);
                }
            }
            cursors.insert(port, index + 1);
            return;
        }

        let mut rule = rule;
        let index = if rule.factor.ports.is_some() {
            // A narrowed rule affects no other port.
            rule.factor.ports = Some(vec![port]);
            first_applying.unwrap_or(self.overrides.len())
        } else {
            self.overrides.len()
        };
        self.overrides.insert(index, rule);
        for other in cursors.values_mut() {
            if *other > index {
                *other += 1;
            }
        }
        cursors.insert(port, index + 1);
    }

    /// Prefix the name of every chip with `prefix`.
    ///
    /// This renames chips in the registry, the base wiring of every port, the
    /// pins of every supported profile, and the pins and factors of every
    /// override rule.
    pub fn namespace_chips(&mut self, prefix: &str) {
        let rename = |name: &mut String| name.insert_str(0, prefix);
        self.chips = std::mem::take(&mut self.chips)
            .into_iter()
            .map(|(mut name, mut chip)| {
                rename(&mut name);
                rename(&mut chip.name);
                (name, chip)
            })
            .collect();
        for entry in self.ports.values_mut() {
            for conn in entry.mapping.pins.iter_mut() {
                conn.for_each_pin_mut(&mut |id| rename(&mut id.chip));
            }
            for config in entry.supported_profiles.values_mut() {
                for pin in config.pins.all_pins_mut() {
                    rename(&mut pin.id.chip);
                }
            }
        }
        for rule in self.overrides.iter_mut() {
            if let Some(pins) = rule.pins.as_mut() {
                for pin in pins.all_pins_mut() {
                    rename(&mut pin.id.chip);
                }
            }
            if let Some(chips) = rule.factor.chips.as_mut() {
                for chip in chips.iter_mut() {
                    rename(&mut chip.name);
                }
            }
        }
    }
}

fn merge_profile_into(
    profiles: &mut Vec<ProfileEntry>,
    incoming: ProfileEntry,
) -> Result<(), Error> {
    let id = incoming.factor.profile_id;
    for current in profiles.iter() {
        if current.factor.profile_id != id || current.profile == incoming.profile {
            continue;
        }
        match (&current.factor.pim_ids, &incoming.factor.pim_ids) {
            (Some(ours), Some(theirs)) => {
                let overlap = ours.intersection(theirs).copied().collect::<Vec<PimId>>();
                if !overlap.is_empty() {
                    return Err(Error::ConflictingProfileConfig {
                        profile: id,
                        pims: Some(overlap),
                    });
                }
            }
            _ => {
                return Err(Error::ConflictingProfileConfig {
                    profile: id,
                    pims: None,
                })
            }
        }
    }

    let equal = profiles
        .iter_mut()
        .find(|current| current.factor.profile_id == id && current.profile == incoming.profile);
    match equal {
        Some(current) => {
            if incoming.factor.pim_ids.is_none() {
                current.factor.pim_ids = None;
            } else if let (Some(ours), Some(theirs)) =
                (current.factor.pim_ids.as_mut(), incoming.factor.pim_ids)
            {
                ours.extend(theirs);
            }
        }
        None => profiles.push(incoming),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::test_utils;
    use crate::Error;
    use crate::ErrorKind;
    use crate::PlatformMapping;
    use crate::ProfileMatcher;
    use platform_mapping_types::config::PlatformMappingConfig;
    use platform_mapping_types::config::PortConfigOverride;
    use platform_mapping_types::config::ProfileEntry;
    use platform_mapping_types::factor::PlatformPortConfigFactor;
    use platform_mapping_types::factor::PortConfigOverrideFactor;
    use platform_mapping_types::phy::PortPinConfig;
    use platform_mapping_types::profile::Medium;
    use platform_mapping_types::PimId;
    use platform_mapping_types::PortId;
    use platform_mapping_types::ProfileId;
    use std::collections::BTreeSet;

    fn slot(pim: i32) -> PlatformMapping {
        PlatformMapping::new(test_utils::slot_config(pim), test_utils::test_logger())
    }

    fn chassis(order: &[i32]) -> PlatformMapping {
        let mut out = PlatformMapping::empty(test_utils::test_logger());
        for pim in order.iter() {
            out.merge(slot(*pim)).unwrap();
        }
        out
    }

    fn catalog_pims(m: &PlatformMapping) -> Vec<(ProfileId, Option<BTreeSet<PimId>>)> {
        let mut out = m
            .supported_profiles()
            .iter()
            .map(|e| (e.factor.profile_id, e.factor.pim_ids.clone()))
            .collect::<Vec<_>>();
        out.sort();
        out
    }

    #[test]
    fn test_merge_disjoint_slots_any_order() {
        let forward = chassis(&[2, 3, 4, 5, 6, 7, 8, 9]);
        let backward = chassis(&[9, 8, 7, 6, 5, 4, 3, 2]);
        let shuffled = chassis(&[5, 2, 9, 3, 8, 4, 7, 6]);
        for other in [&backward, &shuffled] {
            assert_eq!(forward.ports(), other.ports());
            assert_eq!(forward.chips(), other.chips());
            assert_eq!(catalog_pims(&forward), catalog_pims(other));
        }
        assert_eq!(forward.ports().len(), 8);
        assert_eq!(forward.chips().len(), 8);

        // Equal configs collapse into one entry covering every PIM.
        assert_eq!(forward.supported_profiles().len(), 1);
        let pims = forward.supported_profiles()[0].factor.pim_ids.clone().unwrap();
        assert_eq!(pims, (2..=9).map(PimId).collect());
    }

    #[test]
    fn test_merged_catalog_resolves_for_every_slot() {
        let m = chassis(&[2, 3]);
        for port in [PortId(20), PortId(30)] {
            let cfg = m
                .resolve_profile_config(&ProfileMatcher::new(ProfileId(17)).with_port(port))
                .unwrap();
            assert!(cfg.is_some());
        }
    }

    #[test]
    fn test_conflicting_profiles_overlapping_pims() {
        let mut a = test_utils::slot_config(2);
        a.platform_supported_profiles[0].factor.pim_ids =
            Some([PimId(2), PimId(3)].into_iter().collect());
        let mut b = test_utils::slot_config(3);
        b.platform_supported_profiles[0].profile =
            test_utils::profile_config(40_000, 4, Medium::Optical);

        let mut m = PlatformMapping::new(a, test_utils::test_logger());
        let before = m.to_config();
        let err = m
            .merge(PlatformMapping::new(b, test_utils::test_logger()))
            .unwrap_err();
        assert!(matches!(
            &err,
            Error::ConflictingProfileConfig {
                profile: ProfileId(17),
                pims: Some(pims),
            } if pims == &[PimId(3)]
        ));
        assert_eq!(err.kind(), ErrorKind::Conflict);
        // Nothing was merged.
        assert_eq!(m.to_config(), before);
    }

    #[test]
    fn test_conflicting_profiles_unrestricted() {
        let mut a = test_utils::slot_config(2);
        a.platform_supported_profiles[0].factor.pim_ids = None;
        let mut b = test_utils::slot_config(3);
        b.platform_supported_profiles[0].profile =
            test_utils::profile_config(40_000, 4, Medium::Optical);

        let mut m = PlatformMapping::new(a, test_utils::test_logger());
        let err = m
            .merge(PlatformMapping::new(b, test_utils::test_logger()))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ConflictingProfileConfig { pims: None, .. }
        ));
    }

    #[test]
    fn test_differing_profiles_disjoint_pims() {
        let a = test_utils::slot_config(2);
        let mut b = test_utils::slot_config(3);
        b.platform_supported_profiles[0].profile =
            test_utils::profile_config(40_000, 4, Medium::Optical);

        let mut m = PlatformMapping::new(a, test_utils::test_logger());
        m.merge(PlatformMapping::new(b, test_utils::test_logger())).unwrap();
        assert_eq!(m.supported_profiles().len(), 2);

        let medium = |pim: i32| {
            m.resolve_profile_config(&ProfileMatcher::new(ProfileId(17)).with_pim(PimId(pim)))
                .unwrap()
                .unwrap()
                .medium()
        };
        assert_eq!(medium(2), Some(Medium::Copper));
        assert_eq!(medium(3), Some(Medium::Optical));
    }

    #[test]
    fn test_wildcard_absorbs_and_widens() {
        let restricted = ProfileEntry {
            factor: PlatformPortConfigFactor::with_pims(ProfileId(19), [PimId(2)]),
            profile: test_utils::profile_config(50_000, 2, Medium::Copper),
        };
        let unrestricted = ProfileEntry {
            factor: PlatformPortConfigFactor::new(ProfileId(19)),
            profile: restricted.profile,
        };

        // An existing wildcard absorbs a narrower entry.
        let mut m = PlatformMapping::empty(test_utils::test_logger());
        m.merge_supported_profile(unrestricted.clone()).unwrap();
        m.merge_supported_profile(restricted.clone()).unwrap();
        assert_eq!(m.supported_profiles(), &[unrestricted.clone()]);

        // An incoming wildcard widens a narrower entry.
        let mut m = PlatformMapping::empty(test_utils::test_logger());
        m.merge_supported_profile(restricted).unwrap();
        m.merge_supported_profile(unrestricted.clone()).unwrap();
        assert_eq!(m.supported_profiles(), &[unrestricted]);
    }

    #[test]
    fn test_duplicate_port_keeps_existing() {
        let mut m = slot(2);
        let mut other = test_utils::slot_config(3);
        let mut port = other.ports.remove(&PortId(30)).unwrap();
        port.mapping.id = PortId(20);
        other.ports.insert(PortId(20), port);
        m.merge(PlatformMapping::new(other, test_utils::test_logger())).unwrap();
        assert_eq!(m.ports().len(), 1);
        assert_eq!(m.port(PortId(20)).unwrap().name(), "eth2/20/1");
    }

    fn tx_override(ports: Option<Vec<PortId>>, main: i16) -> PortConfigOverride {
        PortConfigOverride {
            factor: PortConfigOverrideFactor {
                ports,
                profiles: Some(vec![ProfileId(17)]),
                ..Default::default()
            },
            pins: Some(PortPinConfig {
                iphy: test_utils::tuned_lanes("WC0", 1, main),
                ..Default::default()
            }),
            port_profile_config: None,
        }
    }

    fn slot_with_override(pim: i32, main: i16) -> PlatformMapping {
        let mut config = test_utils::slot_config(pim);
        config.port_config_overrides = vec![
            tx_override(Some(vec![PortId(10 * pim)]), main),
            // Names no port in this slot, so it is dropped by the merge.
            tx_override(Some(vec![PortId(1)]), 99),
        ];
        PlatformMapping::new(config, test_utils::test_logger())
    }

    #[test]
    fn test_single_port_overrides_collapse() {
        let mut m = PlatformMapping::empty(test_utils::test_logger());
        for pim in 2..=5 {
            m.merge(slot_with_override(pim, 10)).unwrap();
        }
        assert_eq!(m.overrides().len(), 1);
        assert_eq!(
            m.overrides()[0].factor.ports.as_deref(),
            Some(&[PortId(20), PortId(30), PortId(40), PortId(50)][..])
        );
        for port in [20, 30, 40, 50] {
            let pins = m
                .resolve_iphy_pins(&ProfileMatcher::new(ProfileId(17)).with_port(PortId(port)))
                .unwrap();
            assert!(pins.iter().all(|p| p.tx.unwrap().main == 10));
        }
    }

    #[test]
    fn test_differing_overrides_stay_apart() {
        let mut m = PlatformMapping::empty(test_utils::test_logger());
        m.merge(slot_with_override(2, 10)).unwrap();
        m.merge(slot_with_override(3, 11)).unwrap();
        assert_eq!(m.overrides().len(), 2);
        assert_eq!(m.overrides()[1].factor.ports.as_deref(), Some(&[PortId(30)][..]));
    }

    #[test]
    fn test_port_agnostic_override_merged_once() {
        let mut m = PlatformMapping::empty(test_utils::test_logger());
        for pim in [2, 3] {
            let mut config = test_utils::slot_config(pim);
            config.port_config_overrides = vec![tx_override(None, 12)];
            m.merge(PlatformMapping::new(config, test_utils::test_logger()))
                .unwrap();
        }
        assert_eq!(m.overrides().len(), 1);
        assert!(m.overrides()[0].factor.ports.is_none());
    }

    #[test]
    fn test_merge_keeps_override_order_per_port() {
        let main = |m: &PlatformMapping, port: i32| {
            let matcher = ProfileMatcher::new(ProfileId(17)).with_port(PortId(port));
            m.resolve_iphy_pins(&matcher).unwrap()[0].tx.unwrap().main
        };
        let slot3 = || {
            let mut config = test_utils::slot_config(3);
            let port = test_utils::port_entry(31, 3, "WC3", 4, &[ProfileId(17)]);
            config.ports.insert(port.id(), port);
            config.port_config_overrides = vec![
                tx_override(Some(vec![PortId(31)]), 77),
                tx_override(None, 5),
            ];
            PlatformMapping::new(config, test_utils::test_logger())
        };
        assert_eq!(main(&slot3(), 31), 77);
        assert_eq!(main(&slot3(), 30), 5);

        let mut m = slot(2);
        m.merge(slot3()).unwrap();
        assert_eq!(main(&m, 31), 77);
        assert_eq!(main(&m, 30), 5);
        assert_eq!(main(&m, 20), 5);
        assert_eq!(m.overrides().len(), 2);

        // The fallback is already present from an earlier slot.
        let mut config = test_utils::slot_config(2);
        config.port_config_overrides = vec![tx_override(None, 5)];
        let mut m = PlatformMapping::new(config, test_utils::test_logger());
        m.merge(slot3()).unwrap();
        assert_eq!(main(&m, 31), 77);
        assert_eq!(main(&m, 30), 5);
        assert_eq!(main(&m, 20), 5);
        assert_eq!(m.overrides().len(), 2);
    }

    #[test]
    fn test_rehomed_rules_keep_their_order() {
        let mut m = slot(2);
        m.merge_port_config_overrides(PortId(20), [tx_override(None, 5)]);
        m.merge_port_config_overrides(
            PortId(20),
            [tx_override(Some(vec![PortId(20)]), 8), tx_override(None, 5)],
        );
        let matcher = ProfileMatcher::new(ProfileId(17)).with_port(PortId(20));
        assert_eq!(m.resolve_iphy_pins(&matcher).unwrap()[0].tx.unwrap().main, 8);
        assert_eq!(m.overrides().len(), 2);
    }

    #[test]
    fn test_namespace_chips() {
        let mut config: PlatformMappingConfig =
            serde_json::from_str(test_utils::SLOT_PAYLOAD).unwrap();
        config.ports.remove(&PortId(3));
        let mut m = PlatformMapping::new(config, test_utils::test_logger());
        m.namespace_chips("pim2_");

        assert!(m.chip("pim2_WC9").is_ok());
        assert!(m.chip("WC9").is_err());
        assert!(m.chips().values().all(|c| c.name.starts_with("pim2_")));
        assert_eq!(m.port_iphy_chip(PortId(1)).unwrap().name, "pim2_WC9");

        let mut chips = Vec::new();
        for entry in m.ports().values() {
            for conn in entry.mapping.pins.iter() {
                conn.for_each_pin(&mut |id| chips.push(id.chip.clone()));
            }
            for cfg in entry.supported_profiles.values() {
                chips.extend(cfg.pins.all_pins().map(|p| p.id.chip.clone()));
            }
        }
        assert!(chips.iter().all(|c| c.starts_with("pim2_")));

        // The chip-only override follows its chip.
        assert!(m.overrides()[1].factor.names_chip("pim2_WC9"));
        assert_eq!(m.port_config_overrides(PortId(1)).unwrap().len(), 2);
    }
}
