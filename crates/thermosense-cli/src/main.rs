//! CLI for thermosense — probe device thermals and get safety advice.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "thermosense")]
#[command(about = "thermosense — probe device thermals and get safety advice")]
#[command(version = thermosense_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read live host telemetry (battery, thermal pressure, CPU, memory)
    Probe {
        /// Emit the reading as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Run the advisory pipeline for one reading
    Advise {
        /// Battery temperature in °C
        #[arg(long)]
        battery_temp: f64,

        /// Ambient temperature in °C
        #[arg(long)]
        ambient_temp: f64,

        /// Device power state: charging, discharging or idle
        #[arg(long, default_value = "idle")]
        device_state: String,

        /// Training dataset CSV (header: battery_temp,ambient_temp,
        /// device_state,measured_health_impact). Defaults to a built-in
        /// synthetic dataset.
        #[arg(long)]
        data: Option<PathBuf>,
    },

    /// Serve the HTTP API (GET /system_stats, POST /advisory)
    Serve {
        /// Bind host
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Bind port
        #[arg(long, default_value = "8000")]
        port: u16,

        /// Training dataset CSV. Defaults to a built-in synthetic dataset.
        #[arg(long)]
        data: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Probe { json } => commands::probe(json),
        Commands::Advise {
            battery_temp,
            ambient_temp,
            device_state,
            data,
        } => commands::advise(battery_temp, ambient_temp, &device_state, data.as_deref()),
        Commands::Serve { host, port, data } => commands::serve(&host, port, data.as_deref()),
    }
}
