//! One pass of the mock-readings worker for a single device.
//!
//! The worker moves through three phases and then stops:
//! - priming: fetch the device's latest read to seed the cumulative total,
//! - accumulating: walk the windows since the start of the previous day,
//! - persisting: submit every generated read in a single call.
//!
//! A failed seed fetch aborts the run. A failed submission is captured in the
//! returned [`WorkerReport`] and the worker still completes.

use std::fmt;

use chrono::{DateTime, Utc};
use meter_client::{ClientError, Device, SmartMeterRead};
use tracing::{debug, error, info, Instrument};

use crate::dataset::SeasonalDataset;
use crate::store::ReadingStore;
use crate::synthesis::{
    energy_delta, windows_since_previous_day, EnergyAccumulator, SeasonalProfile, SynthesisError, Window,
    REFERENCE_YEAR,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerSettings {
    pub interval_minutes: u32,
    pub reference_year: i32,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            interval_minutes: 15,
            reference_year: REFERENCE_YEAR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerPhase {
    Priming,
    Accumulating,
    Persisting,
}

impl fmt::Display for WorkerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Priming => "priming",
            Self::Accumulating => "accumulating",
            Self::Persisting => "persisting",
        })
    }
}

#[derive(thiserror::Error, Debug)]
pub enum WorkerError {
    #[error("device {device_id}: failed to fetch seed reading: {source}")]
    Seed {
        device_id: u64,
        #[source]
        source: ClientError,
    },
    #[error("device {device_id}: {source}")]
    Synthesis {
        device_id: u64,
        #[source]
        source: SynthesisError,
    },
}

#[derive(Debug)]
pub struct PersistFailure {
    pub device_id: u64,
    pub attempted: usize,
    pub error: ClientError,
}

#[derive(Debug)]
pub enum PersistOutcome {
    Saved { count: usize },
    Failed(PersistFailure),
}

impl PersistOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }
}

#[derive(Debug)]
pub struct WorkerReport {
    pub device_id: u64,
    pub seed: u64,
    pub final_meter_reading: u64,
    pub readings: Vec<SmartMeterRead>,
    pub outcome: PersistOutcome,
}

impl WorkerReport {
    /// Completion line handed back to whoever launched the worker.
    pub fn status_message(&self) -> String {
        match &self.outcome {
            PersistOutcome::Saved { count } => {
                format!("[Device ID: {}]: Saved {} smart meter reads", self.device_id, count)
            }
            PersistOutcome::Failed(failure) => format!(
                "[Device ID: {}]: Failed to save {} smart meter reads",
                self.device_id, failure.attempted
            ),
        }
    }
}

/// Accumulate energy over `windows`, starting from `seed`.
pub fn synthesize_readings<I>(
    device: &Device,
    profile: &SeasonalProfile,
    windows: I,
    seed: u64,
) -> Result<EnergyAccumulator, SynthesisError>
where
    I: IntoIterator<Item = Window>,
{
    let mut acc = EnergyAccumulator::new(seed);
    let mut window_count: u64 = 0;

    for window in windows {
        let factor_sum = profile.factor_sum(&window)?;
        let delta = energy_delta(device.max_capacity, factor_sum);
        acc.record(window.start.with_timezone(&Utc), delta);
        window_count += 1;
    }

    metrics::counter!("simulator_windows_total").increment(window_count);
    Ok(acc)
}

/// Single best-effort submission. Never fails; the outcome says what happened.
pub async fn persist_readings<S>(store: &S, device_id: u64, reads: &[SmartMeterRead]) -> PersistOutcome
where
    S: ReadingStore + ?Sized,
{
    match store.save_meter_readings(device_id, reads).await {
        Ok(()) => {
            info!(device_id, count = reads.len(), "smart meter readings saved");
            PersistOutcome::Saved { count: reads.len() }
        }
        Err(error) => {
            error!(
                device_id,
                attempted = reads.len(),
                error = %error,
                "could not save smart meter readings for producing device"
            );
            if let ClientError::HttpStatus {
                method,
                url,
                status,
                body,
            } = &error
            {
                error!(device_id, method, url = %url, status, response = %body, "HTTP error");
            }
            debug!(device_id, readings = ?reads, "unsaved smart meter readings");
            metrics::counter!("simulator_persist_failures_total").increment(1);

            PersistOutcome::Failed(PersistFailure {
                device_id,
                attempted: reads.len(),
                error,
            })
        }
    }
}

/// Run all three phases for `device` against `store`.
pub async fn run_worker<S>(
    device: &Device,
    dataset: &SeasonalDataset,
    store: &S,
    settings: WorkerSettings,
    now: DateTime<Utc>,
) -> Result<WorkerReport, WorkerError>
where
    S: ReadingStore + ?Sized,
{
    let span = tracing::info_span!("mock_readings_worker", device_id = device.id);

    async move {
        let device_id = device.id;
        let synthesis_err = |source| WorkerError::Synthesis { device_id, source };

        debug!(phase = %WorkerPhase::Priming, "worker phase");
        let seed = store
            .latest_meter_reading(device_id)
            .await
            .map_err(|source| WorkerError::Seed { device_id, source })?
            .map_or(0, |read| read.meter_reading);

        debug!(phase = %WorkerPhase::Accumulating, seed, "worker phase");
        let profile =
            SeasonalProfile::build(dataset, device.timezone, settings.reference_year).map_err(synthesis_err)?;
        let windows = windows_since_previous_day(now, device.timezone, settings.interval_minutes)
            .map_err(synthesis_err)?;
        let acc = synthesize_readings(device, &profile, windows, seed).map_err(synthesis_err)?;

        let final_meter_reading = acc.total();
        let readings = acc.into_readings();
        metrics::counter!("simulator_readings_generated_total").increment(readings.len() as u64);
        metrics::gauge!("simulator_meter_reading", "device_id" => device_id.to_string())
            .set(final_meter_reading as f64);

        debug!(phase = %WorkerPhase::Persisting, count = readings.len(), "worker phase");
        let outcome = persist_readings(store, device_id, &readings).await;

        Ok(WorkerReport {
            device_id,
            seed,
            final_meter_reading,
            readings,
            outcome,
        })
    }
    .instrument(span)
    .await
}
