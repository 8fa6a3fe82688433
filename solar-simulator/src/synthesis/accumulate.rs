use chrono::{DateTime, Utc};
use meter_client::SmartMeterRead;

/// Energy (Wh) produced in a window: capacity times the window's factor sum,
/// rounded half away from zero.
pub fn energy_delta(max_capacity: f64, factor_sum: f64) -> i64 {
    (max_capacity * factor_sum).round() as i64
}

/// Running cumulative meter value plus the reads emitted so far.
#[derive(Debug, Clone)]
pub struct EnergyAccumulator {
    total: u64,
    readings: Vec<SmartMeterRead>,
}

impl EnergyAccumulator {
    pub fn new(seed: u64) -> Self {
        Self {
            total: seed,
            readings: Vec::new(),
        }
    }

    /// Add a window's delta. Only a strictly positive delta advances the total
    /// and emits a read stamped with the window start.
    pub fn record(&mut self, window_start: DateTime<Utc>, delta: i64) -> Option<&SmartMeterRead> {
        if delta <= 0 {
            if delta < 0 {
                tracing::warn!(%window_start, delta, "negative energy delta ignored");
                metrics::counter!("simulator_negative_delta_windows_total").increment(1);
            }
            return None;
        }

        self.total = self.total.saturating_add(delta.unsigned_abs());
        self.readings.push(SmartMeterRead {
            meter_reading: self.total,
            timestamp: window_start,
        });
        self.readings.last()
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn readings(&self) -> &[SmartMeterRead] {
        &self.readings
    }

    pub fn into_readings(self) -> Vec<SmartMeterRead> {
        self.readings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn at(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 14, 0, 0, 0).unwrap() + TimeDelta::minutes(minutes)
    }

    #[test]
    fn delta_rounds_capacity_times_factor() {
        assert_eq!(energy_delta(100.0, 0.5), 50);
        assert_eq!(energy_delta(9000.0, 0.00005), 0);
        assert_eq!(energy_delta(9000.0, 0.0001), 1);
        assert_eq!(energy_delta(3.0, 0.5), 2);
        assert_eq!(energy_delta(100.0, 0.0), 0);
    }

    #[test]
    fn positive_delta_emits_cumulative_read() {
        let mut acc = EnergyAccumulator::new(1_000);
        let read = acc.record(at(0), 50).cloned().unwrap();

        assert_eq!(read.meter_reading, 1_050);
        assert_eq!(read.timestamp, at(0));
        assert_eq!(acc.total(), 1_050);
    }

    #[test]
    fn zero_and_negative_deltas_emit_nothing() {
        let mut acc = EnergyAccumulator::new(10);

        assert!(acc.record(at(0), 0).is_none());
        assert!(acc.record(at(15), -3).is_none());
        assert_eq!(acc.total(), 10);
        assert!(acc.readings().is_empty());
    }

    #[test]
    fn emitted_totals_never_decrease() {
        let mut acc = EnergyAccumulator::new(0);
        for (i, delta) in [5, 0, 12, -4, 1, 0, 30].into_iter().enumerate() {
            acc.record(at(i as i64 * 15), delta);
        }

        let reads = acc.into_readings();
        assert_eq!(reads.len(), 4);
        assert!(reads.windows(2).all(|p| p[0].meter_reading <= p[1].meter_reading));
        assert!(reads.windows(2).all(|p| p[0].timestamp < p[1].timestamp));
        assert_eq!(reads.last().unwrap().meter_reading, 48);
    }

    #[test]
    fn total_saturates_instead_of_wrapping() {
        let mut acc = EnergyAccumulator::new(u64::MAX - 1);
        acc.record(at(0), 10);

        assert_eq!(acc.total(), u64::MAX);
    }
}
