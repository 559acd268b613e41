//! wedo CLI: list LEGO WeDo hubs, poll their sensors, drive their outputs.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::time::Duration;
use wedo_core::discovery::{find_hubs_matching, HidApiBackend};
use wedo_core::{Hub, HubIdentity, Slot};

#[derive(Parser)]
#[command(name = "wedo", version, about = "LEGO WeDo hub control")]
struct Cli {
    /// USB vendor ID to match (hex).
    #[arg(long, global = true, value_parser = parse_hex_u16, default_value = "0694")]
    vid: u16,

    /// USB product ID to match (hex).
    #[arg(long, global = true, value_parser = parse_hex_u16, default_value = "0003")]
    pid: u16,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List connected hubs and what is plugged into each slot.
    List {
        /// Print a JSON snapshot including current slot values.
        #[arg(long)]
        json: bool,
    },
    /// Poll sensor slots and print their values.
    Watch {
        /// Delay between polling passes in milliseconds.
        #[arg(long, default_value_t = 100)]
        interval_ms: u64,
        /// Stop after this many passes (default: run forever).
        #[arg(long)]
        count: Option<u64>,
    },
    /// Drive a slot's output.
    Set {
        /// Hub index as printed by `list`.
        hub: usize,
        /// Slot (0 or 1).
        slot: u8,
        /// Output value (0-255).
        value: u8,
    },
    /// Zero both outputs on every hub.
    Stop,
}

fn parse_hex_u16(s: &str) -> std::result::Result<u16, String> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X");
    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid hex id '{s}': {e}"))
}

fn discover(identity: HubIdentity) -> Result<Vec<Hub>> {
    let backend = HidApiBackend::new()?;
    Ok(find_hubs_matching(&backend, identity)?)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let identity = HubIdentity {
        vendor_id: cli.vid,
        product_id: cli.pid,
    };

    match cli.command {
        Commands::List { json } => {
            let hubs = discover(identity)?;
            if json {
                let snapshots = hubs
                    .iter()
                    .map(Hub::snapshot)
                    .collect::<wedo_core::Result<Vec<_>>>()?;
                println!("{}", serde_json::to_string_pretty(&snapshots)?);
            } else if hubs.is_empty() {
                println!("No WeDo hubs found.");
                println!("Ensure the hub is connected and you can access its HID device.");
            } else {
                println!("LEGO WeDo hubs:");
                for (i, hub) in hubs.iter().enumerate() {
                    println!("[{i}] Hub at {}", hub.path());
                    for device in hub.devices() {
                        println!("    Slot {}: {}", device.slot(), device.device_type());
                    }
                }
            }
        }
        Commands::Watch { interval_ms, count } => {
            let hubs = discover(identity)?;
            if hubs.is_empty() {
                anyhow::bail!("No WeDo hubs found");
            }

            let interval = Duration::from_millis(interval_ms);
            let mut pass = 0u64;
            while count.map_or(true, |n| pass < n) {
                for (i, hub) in hubs.iter().enumerate() {
                    for device in hub.devices() {
                        if device.device_type().is_sensor() {
                            let value = device
                                .value()
                                .with_context(|| format!("reading hub {i} slot {}", device.slot()))?;
                            println!("[{i}] {} {}: {value}", device.slot(), device.device_type());
                        }
                    }
                }
                pass += 1;
                if count.map_or(true, |n| pass < n) {
                    std::thread::sleep(interval);
                }
            }
        }
        Commands::Set { hub, slot, value } => {
            let slot = Slot::try_from(slot)?;
            let hubs = discover(identity)?;
            let target = hubs
                .get(hub)
                .ok_or_else(|| anyhow::anyhow!("No hub at index {hub} ({} found)", hubs.len()))?;
            let device = target.device(slot);
            if !device.device_type().is_actuator() {
                tracing::warn!(
                    path = target.path(),
                    %slot,
                    device_type = %device.device_type(),
                    "Slot has no output device attached"
                );
            }
            device.set_value(value)?;
            println!(
                "Set {} slot {} ({}) to {value}",
                target.path(),
                slot,
                device.device_type()
            );
        }
        Commands::Stop => {
            let hubs = discover(identity)?;
            for hub in &hubs {
                hub.stop()
                    .with_context(|| format!("stopping hub at {}", hub.path()))?;
                println!("Stopped {}", hub.path());
            }
        }
    }

    Ok(())
}
