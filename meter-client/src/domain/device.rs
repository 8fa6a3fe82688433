use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// A producing device whose meter the simulator drives.
///
/// `max_capacity` is the energy (Wh) produced in a window whose weighting
/// factors sum to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: u64,
    pub max_capacity: f64,
    pub timezone: Tz,
}
