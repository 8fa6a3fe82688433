use meter_client::Device;

use crate::dataset::SeasonalDataset;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("device {device_id}: max_capacity must be finite and non-negative, got {value}")]
    Capacity { device_id: u64, value: f64 },
    #[error("dataset row {row}: weighting factor must be finite")]
    Factor { row: usize },
}

/// Rules:
/// - `max_capacity` must be finite and non-negative.
pub fn validate_device(device: &Device) -> Result<(), ValidationError> {
    if !device.max_capacity.is_finite() || device.max_capacity < 0.0 {
        metrics::counter!("validation_device_rejected_total").increment(1);
        return Err(ValidationError::Capacity {
            device_id: device.id,
            value: device.max_capacity,
        });
    }

    Ok(())
}

/// Rules:
/// - every factor must be finite. Negative factors pass; the accumulator
///   ignores the resulting negative deltas.
pub fn validate_dataset(dataset: &SeasonalDataset) -> Result<(), ValidationError> {
    match dataset.rows().iter().position(|row| !row.factor.is_finite()) {
        Some(idx) => Err(ValidationError::Factor { row: idx + 1 }),
        None => Ok(()),
    }
}
