use anyhow::{bail, Result};
use chrono::Utc;
use solar_simulator::{
    config::AppConfig,
    metrics_textfile,
    observability,
    runner,
    store::ConfiguredStore,
    validation::validate_dataset,
    SeasonalDataset,
};

/// Generate and persist mock readings for every configured device.
#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let cfg = AppConfig::load()?;

    if cfg.metrics.is_some() {
        metrics_textfile::init()?;
    }

    let dataset = SeasonalDataset::load(&cfg.simulator.dataset_path, cfg.simulator.dataset_has_headers)?;
    validate_dataset(&dataset)?;

    let settings = cfg.simulator.worker_settings();
    let now = Utc::now();
    tracing::info!(
        devices = cfg.devices.len(),
        interval_minutes = settings.interval_minutes,
        %now,
        "starting mock readings run"
    );

    let runs = runner::run_devices(&cfg.devices, &dataset, settings, now, |device| {
        ConfiguredStore::connect(&cfg.store, device.id)
    })
    .await;
    let aborted = runner::log_runs(&runs);

    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_textfile::write_textfile(&metrics_cfg.textfile_path)?;
    }

    if aborted > 0 {
        bail!("{aborted} of {} device workers aborted", runs.len());
    }

    Ok(())
}
