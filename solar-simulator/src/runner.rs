//! Independent workers for several devices.

use std::future::Future;

use chrono::{DateTime, Utc};
use meter_client::{ClientError, Device};

use crate::dataset::SeasonalDataset;
use crate::store::ReadingStore;
use crate::validation::{validate_device, ValidationError};
use crate::worker::{run_worker, WorkerError, WorkerReport, WorkerSettings};

#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("device {device_id}: failed to open reading store: {source}")]
    Connect {
        device_id: u64,
        #[source]
        source: ClientError,
    },
    #[error(transparent)]
    Worker(#[from] WorkerError),
}

#[derive(Debug)]
pub struct DeviceRun {
    pub device_id: u64,
    pub result: Result<WorkerReport, RunError>,
}

impl DeviceRun {
    pub fn is_aborted(&self) -> bool {
        self.result.is_err()
    }
}

/// Run one worker per device. Each worker opens its own store through
/// `connect` and owns its accumulator; a failure only affects its device.
pub async fn run_devices<F, Fut, S>(
    devices: &[Device],
    dataset: &SeasonalDataset,
    settings: WorkerSettings,
    now: DateTime<Utc>,
    connect: F,
) -> Vec<DeviceRun>
where
    F: Fn(&Device) -> Fut,
    Fut: Future<Output = Result<S, ClientError>>,
    S: ReadingStore,
{
    let connect = &connect;
    let runs = devices.iter().map(|device| async move {
        let result = run_device(device, dataset, settings, now, connect).await;
        DeviceRun {
            device_id: device.id,
            result,
        }
    });

    futures::future::join_all(runs).await
}

async fn run_device<F, Fut, S>(
    device: &Device,
    dataset: &SeasonalDataset,
    settings: WorkerSettings,
    now: DateTime<Utc>,
    connect: &F,
) -> Result<WorkerReport, RunError>
where
    F: Fn(&Device) -> Fut,
    Fut: Future<Output = Result<S, ClientError>>,
    S: ReadingStore,
{
    validate_device(device)?;

    let store = connect(device).await.map_err(|source| RunError::Connect {
        device_id: device.id,
        source,
    })?;

    Ok(run_worker(device, dataset, &store, settings, now).await?)
}

/// Log the outcome of every run and return how many aborted.
pub fn log_runs(runs: &[DeviceRun]) -> usize {
    let mut aborted = 0;
    for run in runs {
        match &run.result {
            Ok(report) if report.outcome.is_saved() => {
                tracing::info!(device_id = run.device_id, "{}", report.status_message());
            }
            Ok(report) => {
                tracing::warn!(device_id = run.device_id, "{}", report.status_message());
            }
            Err(e) => {
                aborted += 1;
                tracing::error!(device_id = run.device_id, error = %e, "mock readings worker aborted");
            }
        }
    }
    aborted
}
