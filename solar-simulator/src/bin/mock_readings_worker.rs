use anyhow::{anyhow, bail, Result};
use chrono::Utc;
use solar_simulator::{
    config::AppConfig,
    observability,
    runner,
    store::ConfiguredStore,
    validation::validate_dataset,
    SeasonalDataset,
};
use std::env;

/// Run a single worker for one configured device and print its status line.
///
/// Usage:
///   mock_readings_worker <device_id>
#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        bail!("usage: mock_readings_worker <device_id>");
    }
    let device_id: u64 = args[1]
        .parse()
        .map_err(|e| anyhow!("invalid device id '{}': {e}", args[1]))?;

    // Configuration (SOLAR_SIMULATOR_CONFIG can point to a per-device file).
    let cfg = AppConfig::load()?;
    let device = cfg
        .device(device_id)
        .ok_or_else(|| anyhow!("device {device_id} is not configured"))?
        .clone();

    let dataset = SeasonalDataset::load(&cfg.simulator.dataset_path, cfg.simulator.dataset_has_headers)?;
    validate_dataset(&dataset)?;

    let runs = runner::run_devices(
        std::slice::from_ref(&device),
        &dataset,
        cfg.simulator.worker_settings(),
        Utc::now(),
        |device| ConfiguredStore::connect(&cfg.store, device.id),
    )
    .await;

    for run in runs {
        let report = run.result?;
        // The status line is this process's result for whoever spawned it.
        println!("{}", report.status_message());
    }

    Ok(())
}
