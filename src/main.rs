// ANYTONE-RS CLI entry point
// Thin shell: parse arguments, open the codeplug, print results

use std::path::PathBuf;

use anytone_rs::{Channel, Codeplug, RadioIdEntry};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt::format::FmtSpan, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(
    name = "anytone-rs",
    version,
    about = "View and modify Anytone codeplug (.rdt) files without the official CPS software"
)]
struct Cli {
    /// Path to the codeplug (.rdt) file
    file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Display general information about the codeplug
    Info {
        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },
    /// Read codeplug parameters
    Get {
        #[command(subcommand)]
        target: GetTarget,
    },
    /// Modify codeplug parameters
    Set {
        #[command(subcommand)]
        target: SetTarget,
    },
}

#[derive(Subcommand)]
enum GetTarget {
    /// Get channel(s). Without an index, lists all channels
    Channel {
        index: Option<usize>,

        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },
    /// Get radio ID(s). Without an index, lists all radio IDs
    RadioId {
        index: Option<u8>,

        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum SetTarget {
    /// Update the radio ID in a slot, inserting a new entry if the slot is empty
    RadioId { index: u8, new_id: u32 },
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .unwrap();

    let format_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(format_layer)
        .init();

    let cli = Cli::parse();
    let mut plug = Codeplug::open(&cli.file)?;

    match cli.command {
        Command::Info { json } => {
            let info = plug.info()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Model: {}", info.model);
                println!("Radio IDs:");
                for entry in &info.radio_ids {
                    print_radio_id(entry);
                }
            }
        }
        Command::Get { target } => match target {
            GetTarget::Channel { index: None, json } => {
                let channels = plug.get_channels()?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&channels)?);
                } else {
                    for (i, channel) in channels.iter().enumerate() {
                        println!(
                            "{}: {} (Rx: {:.4} MHz, Tx: {:.4} MHz)",
                            i,
                            channel.name,
                            mhz(channel.rx_freq as f64),
                            mhz(channel.tx_freq as f64)
                        );
                    }
                }
            }
            GetTarget::Channel {
                index: Some(index),
                json,
            } => {
                let channel = plug.get_channel(index)?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&channel)?);
                } else {
                    print_channel(index, &channel);
                }
            }
            GetTarget::RadioId { index: None, json } => {
                let entries = plug.get_radio_ids()?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&entries)?);
                } else {
                    for entry in &entries {
                        print_radio_id(entry);
                    }
                }
            }
            GetTarget::RadioId {
                index: Some(index),
                json,
            } => {
                let entry = plug.get_radio_id(index)?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&entry)?);
                } else {
                    print_radio_id(&entry);
                }
            }
        },
        Command::Set {
            target: SetTarget::RadioId { index, new_id },
        } => {
            plug.update_radio_id(index, new_id)?;
            println!("Successfully updated radio ID at index {index} to {new_id}");
        }
    }

    Ok(())
}

/// Frequencies are stored in 10 Hz units
fn mhz(raw: f64) -> f64 {
    raw / 100_000.0
}

fn print_radio_id(entry: &RadioIdEntry) {
    println!("  {}: {} ({})", entry.index, entry.id, entry.name);
}

fn print_channel(index: usize, channel: &Channel) {
    println!("Channel {index}:");
    println!("  Name: {}", channel.name);
    println!("  Rx Frequency: {:.4} MHz", mhz(channel.rx_freq as f64));
    println!("  Tx Frequency: {:.4} MHz", mhz(channel.tx_freq as f64));
    println!("  Channel Type: {}", channel.channel_type);
    println!("  Tx Power: {}", channel.tx_power);
    println!("  Bandwidth: {}", channel.bandwidth);
    println!("  CTCSS/DCS Decode: {}", channel.ctcss_dcs_decode);
    println!("  CTCSS/DCS Encode: {}", channel.ctcss_dcs_encode);
    println!("  Radio ID: {}", channel.radio_id);
    println!("  Scan List: {}", channel.scan_list);
    println!("  Color Code: {}", channel.rx_color_code);
    println!("  Slot: {}", channel.slot);
}
