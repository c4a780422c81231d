//! Subcommand implementations.

use std::path::Path;

use anyhow::Context;

use thermosense_core::{
    AdvisoryEngine, AdvisoryInput, Dataset, ForestConfig, HeuristicCompletion, probe_system,
};

/// Rows in the built-in synthetic dataset used when no CSV is given.
const SYNTHETIC_ROWS: usize = 300;
/// Seed for the built-in synthetic dataset.
const SYNTHETIC_SEED: u64 = 42;

fn load_dataset(data: Option<&Path>) -> anyhow::Result<Dataset> {
    match data {
        Some(path) => Dataset::from_csv_path(path)
            .with_context(|| format!("loading training data from {}", path.display())),
        None => {
            log::info!("no --data given, training on a built-in synthetic dataset");
            Ok(Dataset::synthetic(SYNTHETIC_ROWS, SYNTHETIC_SEED))
        }
    }
}

fn train_engine(data: Option<&Path>) -> anyhow::Result<AdvisoryEngine> {
    let dataset = load_dataset(data)?;
    AdvisoryEngine::train(
        &dataset,
        ForestConfig::default(),
        Box::new(HeuristicCompletion),
    )
    .context("fitting the advisory model")
}

pub fn probe(json: bool) -> anyhow::Result<()> {
    let reading = probe_system();

    if json {
        println!("{}", serde_json::to_string_pretty(&reading)?);
        return Ok(());
    }

    let fmt_f64 = |v: Option<f64>, unit: &str| match v {
        Some(v) => format!("{v:.1}{unit}"),
        None => "n/a".to_string(),
    };
    println!("battery           {}", fmt_f64(reading.battery_percent, "%"));
    println!(
        "charging          {}",
        match reading.charging {
            Some(true) => "yes",
            Some(false) => "no",
            None => "n/a",
        }
    );
    println!(
        "battery temp      {}",
        fmt_f64(reading.battery_temp_celsius, "°C")
    );
    println!(
        "cpu temp          {}",
        fmt_f64(reading.cpu_temp_celsius, "°C")
    );
    println!(
        "thermal pressure  {}",
        reading
            .thermal_pressure
            .map_or_else(|| "n/a".to_string(), |p| p.to_string())
    );
    println!("cpu load          {:.1}%", reading.cpu_load_percent);
    println!("memory used       {:.1}%", reading.mem_used_percent);
    Ok(())
}

pub fn advise(
    battery_temp: f64,
    ambient_temp: f64,
    device_state: &str,
    data: Option<&Path>,
) -> anyhow::Result<()> {
    let engine = train_engine(data)?;
    let result = engine
        .advise(&AdvisoryInput {
            battery_temp,
            ambient_temp,
            device_state: device_state.to_string(),
        })
        .context("running the advisory pipeline")?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

pub fn serve(host: &str, port: u16, data: Option<&Path>) -> anyhow::Result<()> {
    // Warm up before binding: the server must never accept advisory
    // requests with an unfitted model.
    let engine = train_engine(data)?;

    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    runtime
        .block_on(thermosense_server::run_server(engine, host, port))
        .context("running the HTTP server")?;
    Ok(())
}
