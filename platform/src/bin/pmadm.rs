// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Oxide Computer Company

use anyhow::Context;
use clap::Parser;
use clap::Subcommand;
use itertools::Itertools;
use platform_mapping::transceiver::TransceiverInfo;
use platform_mapping::PlatformMapping;
use platform_mapping::ProfileMatcher;
use platform_mapping_platform::results;
use platform_mapping_platform::results::FailedPorts;
use platform_mapping_platform::ChassisKind;
use platform_mapping_platform::ConfigBuilder;
use platform_mapping_platform::PlatformBuilder;
use platform_mapping_types::factor::VendorFactor;
use platform_mapping_types::mgmt::ManagementInterface;
use platform_mapping_types::mgmt::MediaInterfaceCode;
use platform_mapping_types::phy::PinConfig;
use platform_mapping_types::phy::PinGroup;
use platform_mapping_types::phy::RxSettings;
use platform_mapping_types::phy::Side;
use platform_mapping_types::phy::TxSettings;
use platform_mapping_types::profile::PortProfileConfig;
use platform_mapping_types::PimId;
use platform_mapping_types::PortId;
use platform_mapping_types::ProfileId;
use slog::Drain;
use slog::Level;
use std::path::PathBuf;
use tabled::settings::Style;
use tabled::Table;
use tabled::Tabled;

fn parse_log_level(s: &str) -> Result<Level, String> {
    s.parse().map_err(|_| String::from("invalid log level"))
}

#[derive(Clone, Debug)]
struct PortList(Vec<PortId>);

fn parse_port_list(s: &str) -> Result<PortList, String> {
    s.split(',')
        .map(|p| p.parse::<PortId>().map_err(|e| e.to_string()))
        .collect::<Result<Vec<_>, _>>()
        .map(PortList)
}

/// Inspect the platform mapping of a switch.
///
/// The mapping describes how each logical port is wired to the switch ASIC,
/// external PHYs, and transceiver cages, for every speed profile it supports.
/// It is loaded either from explicit payload files, one per slot, or from the
/// payload directory of a known chassis.
#[derive(Parser)]
#[command(version, about, long_about)]
struct Args {
    #[command(subcommand)]
    cmd: Cmd,

    /// A platform-mapping payload file.
    ///
    /// May be repeated, once for each slot. Slots are merged in the order
    /// given.
    #[arg(short, long, conflicts_with = "chassis")]
    mapping: Vec<PathBuf>,

    /// The kind of chassis whose payloads to load.
    #[arg(short, long, value_enum)]
    chassis: Option<ChassisKind>,

    /// The directory containing the chassis payloads.
    #[arg(short, long, requires = "chassis")]
    dir: Option<PathBuf>,

    /// Qualify chip names by slot before merging.
    ///
    /// The default depends on the chassis.
    #[arg(long)]
    namespace_chips: Option<bool>,

    /// Do not validate the mapping after loading it.
    #[arg(long)]
    no_validate: bool,

    /// The log-level.
    #[arg(
        short,
        long,
        default_value_t = Level::Info,
        value_parser = parse_log_level
    )]
    log_level: Level,
}

/// The profile and surroundings to resolve for a set of ports.
#[derive(clap::Args)]
struct Query {
    /// The comma-separated list of ports to resolve.
    #[arg(value_parser = parse_port_list)]
    ports: PortList,

    /// The profile, by number or name.
    profile: ProfileId,

    /// Resolve as if the ports were on this PIM.
    #[arg(long)]
    pim: Option<i32>,

    /// The length of the attached cable, in meters.
    #[arg(long)]
    cable_length: Option<f64>,

    /// The media interface code of the transceiver's host lanes.
    #[arg(long)]
    media_interface: Option<i32>,

    /// The management interface of the transceiver.
    #[arg(long)]
    management_interface: Option<ManagementInterface>,

    /// The transceiver vendor name.
    #[arg(long)]
    vendor: Option<String>,

    /// The transceiver vendor part number.
    #[arg(long, requires = "vendor")]
    part_number: Option<String>,
}

impl Query {
    fn matcher(&self) -> ProfileMatcher {
        let mut matcher = ProfileMatcher::new(self.profile);
        if let Some(pim) = self.pim {
            matcher = matcher.with_pim(PimId(pim));
        }
        let info = TransceiverInfo {
            cable_length: self.cable_length,
            media_interfaces: self.media_interface.map(MediaInterfaceCode).into_iter().collect(),
            management_interface: self.management_interface,
            vendor: None,
        };
        let mut context = info.override_factor();
        context.vendor = self.vendor.as_ref().map(|name| VendorFactor {
            name: name.trim().to_string(),
            part_number: self.part_number.as_ref().map(|p| p.trim().to_string()),
        });
        if context.is_wildcard() {
            matcher
        } else {
            matcher.with_context(context)
        }
    }
}

#[derive(Subcommand)]
enum Cmd {
    /// List the ports of the platform.
    Ports,

    /// List the data plane chips of the platform.
    Chips,

    /// List the profile catalog.
    Profiles,

    /// Resolve the characteristics of a profile for a set of ports.
    Profile(Query),

    /// Resolve the ASIC lanes of a set of ports.
    Iphy(Query),

    /// Resolve the external PHY lanes of a set of ports.
    Xphy {
        #[command(flatten)]
        query: Query,

        /// Only show one side of the PHY.
        #[arg(long, value_enum)]
        side: Option<Side>,
    },

    /// List the transceiver lanes of a set of ports.
    Transceiver(Query),

    /// Resolve the ASIC lanes of the core behind each controlling port.
    CorePins {
        /// The profile, by number or name.
        profile: ProfileId,

        /// The comma-separated list of ports. The default is all ports.
        #[arg(value_parser = parse_port_list)]
        ports: Option<PortList>,
    },

    /// Check the mapping for dangling references.
    Validate,

    /// Print the mapping as JSON.
    Dump,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let drain = slog::LevelFilter::new(drain, args.log_level).fuse();
    let log = slog::Logger::root(drain, slog::o!());

    let mut config = ConfigBuilder::new();
    if let Some(kind) = args.chassis {
        config = config.chassis(kind);
    }
    if let Some(dir) = &args.dir {
        config = config.mapping_dir(dir);
    }
    for path in args.mapping.iter() {
        config = config.payload(path);
    }
    if let Some(namespace) = args.namespace_chips {
        config = config.namespace_chips(namespace);
    }
    // Validation problems are reported in full by the `validate` command.
    let validate = !args.no_validate && !matches!(args.cmd, Cmd::Validate);
    let config = config.validate(validate).build()?;
    let mapping = PlatformBuilder::new(config, log.clone())
        .build()
        .context("failed to build platform mapping")?;

    match args.cmd {
        Cmd::Ports => print_ports(&mapping),
        Cmd::Chips => print_chips(&mapping),
        Cmd::Profiles => print_profiles(&mapping),
        Cmd::Profile(query) => {
            let result =
                results::resolve_profile_configs(&mapping, &query.matcher(), &query.ports.0);
            print_profile_configs(result.iter());
            check_failures(&result.failures)?;
        }
        Cmd::Iphy(query) => {
            let result = results::resolve_iphy_pins(&mapping, &query.matcher(), &query.ports.0);
            print_pins(result.iter().flat_map(|(port, pins)| {
                pins.iter().map(move |pin| (port, PinGroup::Iphy, pin))
            }));
            check_failures(&result.failures)?;
        }
        Cmd::Xphy { query, side } => {
            let result = results::resolve_xphy_pins(&mapping, &query.matcher(), &query.ports.0);
            let groups = match side {
                Some(side) => vec![PinGroup::Xphy(side)],
                None => vec![PinGroup::Xphy(Side::System), PinGroup::Xphy(Side::Line)],
            };
            let groups = &groups;
            print_pins(result.iter().flat_map(move |(port, pins)| {
                groups.iter().flat_map(move |group| {
                    pins.group(*group)
                        .unwrap_or_default()
                        .iter()
                        .map(move |pin| (port, *group, pin))
                })
            }));
            check_failures(&result.failures)?;
        }
        Cmd::Transceiver(query) => {
            let result =
                results::resolve_transceiver_pins(&mapping, &query.matcher(), &query.ports.0);
            print_pins(result.iter().flat_map(|(port, pins)| {
                pins.iter()
                    .flatten()
                    .map(move |pin| (port, PinGroup::Transceiver, pin))
            }));
            check_failures(&result.failures)?;
        }
        Cmd::CorePins { profile, ports } => {
            let ports = match ports {
                Some(list) => list.0,
                None => mapping.ports().keys().copied().collect(),
            };
            let requests = ports.into_iter().map(|port| (port, profile)).collect::<Vec<_>>();
            let cores = mapping.core_pin_mapping(&requests)?;
            let rows = cores
                .values()
                .flat_map(|(chip, pins)| pins.iter().map(move |pin| (chip, pin)))
                .map(|(chip, pin)| CorePinRow {
                    core: chip.name.clone(),
                    physical_id: chip.physical_id,
                    lane: pin.id.lane,
                    tx: fmt_tx(pin.tx.as_ref()),
                    rx: fmt_rx(pin.rx.as_ref()),
                });
            println!("{}", Table::new(rows).with(Style::sharp()));
        }
        Cmd::Validate => {
            let problems = mapping.problems();
            for problem in problems.iter() {
                println!("{problem}");
            }
            if !problems.is_empty() {
                anyhow::bail!("found {} problem(s)", problems.len());
            }
            println!("OK");
        }
        Cmd::Dump => println!("{}", mapping.to_json()?),
    }
    Ok(())
}

fn check_failures(failures: &FailedPorts) -> anyhow::Result<()> {
    for (port, err) in failures.iter() {
        eprintln!("port {port}: {err}");
    }
    if !failures.is_empty() {
        anyhow::bail!("failed to resolve {} port(s)", failures.ports.len());
    }
    Ok(())
}

fn or_dash<T: ToString>(x: Option<T>) -> String {
    x.map(|x| x.to_string())
        .unwrap_or_else(|| String::from("-"))
}

fn fmt_tx(tx: Option<&TxSettings>) -> String {
    let Some(tx) = tx else {
        return String::from("-");
    };
    let mut out = format!(
        "pre2={} pre={} main={} post={} post2={} post3={}",
        tx.pre2, tx.pre, tx.main, tx.post, tx.post2, tx.post3
    );
    if let Some(current) = tx.drive_current {
        out.push_str(&format!(" drive={current}"));
    }
    out
}

fn fmt_rx(rx: Option<&RxSettings>) -> String {
    let Some(rx) = rx else {
        return String::from("-");
    };
    [
        ("ctl", rx.ctl_code),
        ("dsp", rx.dsp_mode),
        ("afe", rx.afe_trim),
        ("acb", rx.ac_coupling_bypass),
    ]
    .into_iter()
    .filter_map(|(name, value)| value.map(|v| format!("{name}={v}")))
    .join(" ")
}

#[derive(Tabled)]
struct PortRow {
    #[tabled(rename = "ID")]
    id: PortId,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "CONTROLLER")]
    controller: PortId,
    #[tabled(rename = "PIM")]
    pim: String,
    #[tabled(rename = "CORE")]
    core: String,
    #[tabled(rename = "MAX SPEED")]
    max_speed: String,
    #[tabled(rename = "PROFILES")]
    profiles: String,
}

fn print_ports(mapping: &PlatformMapping) {
    let rows = mapping.ports().values().map(|entry| PortRow {
        id: entry.id(),
        name: entry.name().to_string(),
        controller: entry.mapping.controlling_port,
        pim: or_dash(mapping.pim_id(entry.id()).ok()),
        core: or_dash(entry.iphy_chip()),
        max_speed: or_dash(mapping.port_max_speed(entry.id()).ok()),
        profiles: entry.supported_profiles.keys().map(|p| p.0).join(","),
    });
    println!("{}", Table::new(rows).with(Style::sharp()));
}

#[derive(Tabled)]
struct ChipRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "TYPE")]
    chip_type: String,
    #[tabled(rename = "PHYSICAL ID")]
    physical_id: i32,
}

fn print_chips(mapping: &PlatformMapping) {
    let rows = mapping.chips().values().map(|chip| ChipRow {
        name: chip.name.clone(),
        chip_type: chip.chip_type.to_string(),
        physical_id: chip.physical_id,
    });
    println!("{}", Table::new(rows).with(Style::sharp()));
}

#[derive(Tabled)]
struct ProfileSummary {
    #[tabled(rename = "SPEED")]
    speed: String,
    #[tabled(rename = "LANES")]
    lanes: u8,
    #[tabled(rename = "MODULATION")]
    modulation: String,
    #[tabled(rename = "FEC")]
    fec: String,
    #[tabled(rename = "MEDIUM")]
    medium: String,
}

impl From<&PortProfileConfig> for ProfileSummary {
    fn from(config: &PortProfileConfig) -> Self {
        Self {
            speed: config.speed.to_string(),
            lanes: config.num_lanes(),
            modulation: config.modulation().to_string(),
            fec: config.fec().to_string(),
            medium: or_dash(config.medium()),
        }
    }
}

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "PROFILE")]
    profile: ProfileId,
    #[tabled(rename = "PIMS")]
    pims: String,
    #[tabled(inline)]
    summary: ProfileSummary,
}

fn print_profiles(mapping: &PlatformMapping) {
    let rows = mapping.supported_profiles().iter().map(|entry| ProfileRow {
        profile: entry.factor.profile_id,
        pims: match &entry.factor.pim_ids {
            None => String::from("all"),
            Some(pims) => pims.iter().join(","),
        },
        summary: ProfileSummary::from(&entry.profile),
    });
    println!("{}", Table::new(rows).with(Style::sharp()));
}

#[derive(Tabled)]
struct ResolvedProfileRow {
    #[tabled(rename = "PORT")]
    port: PortId,
    #[tabled(inline)]
    summary: ProfileSummary,
}

fn print_profile_configs<'a>(
    configs: impl Iterator<Item = (PortId, &'a Option<PortProfileConfig>)>,
) {
    let mut rows = Vec::new();
    for (port, config) in configs {
        match config {
            Some(config) => rows.push(ResolvedProfileRow {
                port,
                summary: ProfileSummary::from(config),
            }),
            None => eprintln!("port {port}: no matching profile configuration"),
        }
    }
    println!("{}", Table::new(rows).with(Style::sharp()));
}

#[derive(Tabled)]
struct PinRow {
    #[tabled(rename = "PORT")]
    port: PortId,
    #[tabled(rename = "GROUP")]
    group: PinGroup,
    #[tabled(rename = "CHIP")]
    chip: String,
    #[tabled(rename = "LANE")]
    lane: i32,
    #[tabled(rename = "TX")]
    tx: String,
    #[tabled(rename = "RX")]
    rx: String,
}

fn print_pins<'a>(pins: impl Iterator<Item = (PortId, PinGroup, &'a PinConfig)>) {
    let rows = pins.map(|(port, group, pin)| PinRow {
        port,
        group,
        chip: pin.id.chip.clone(),
        lane: pin.id.lane,
        tx: fmt_tx(pin.tx.as_ref()),
        rx: fmt_rx(pin.rx.as_ref()),
    });
    println!("{}", Table::new(rows).with(Style::sharp()));
}

#[derive(Tabled)]
struct CorePinRow {
    #[tabled(rename = "CORE")]
    core: String,
    #[tabled(rename = "PHYSICAL ID")]
    physical_id: i32,
    #[tabled(rename = "LANE")]
    lane: i32,
    #[tabled(rename = "TX")]
    tx: String,
    #[tabled(rename = "RX")]
    rx: String,
}
