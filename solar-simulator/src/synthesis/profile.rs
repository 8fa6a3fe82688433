use chrono_tz::Tz;

use super::{localize, normalize_year, SynthesisError, Window};
use crate::dataset::SeasonalDataset;

/// Year every timestamp is projected onto before matching, so a dataset
/// recorded in any year lines up with today's date and time of day.
pub const REFERENCE_YEAR: i32 = 2015;

/// Dataset rows resolved to reference-year instants in one timezone, sorted
/// by time.
#[derive(Debug, Clone)]
pub struct SeasonalProfile {
    tz: Tz,
    reference_year: i32,
    samples: Vec<(i64, f64)>,
}

impl SeasonalProfile {
    pub fn build(dataset: &SeasonalDataset, tz: Tz, reference_year: i32) -> Result<Self, SynthesisError> {
        let mut samples = dataset
            .rows()
            .iter()
            .map(|row| {
                let local = normalize_year(row.local_time, reference_year);
                localize(&tz, local).map(|at| (at.timestamp(), row.factor))
            })
            .collect::<Result<Vec<_>, _>>()?;
        samples.sort_by_key(|(at, _)| *at);

        Ok(Self {
            tz,
            reference_year,
            samples,
        })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Window bounds projected onto the reference year, as unix seconds.
    pub fn normalized_bounds(&self, window: &Window) -> Result<(i64, i64), SynthesisError> {
        let project = |at: &chrono::DateTime<Tz>| {
            let local = normalize_year(at.with_timezone(&self.tz).naive_local(), self.reference_year);
            localize(&self.tz, local).map(|dt| dt.timestamp())
        };

        Ok((project(&window.start)?, project(&window.end)?))
    }

    /// Sum of factors of rows in `(start, end]` of the normalized window.
    pub fn factor_sum(&self, window: &Window) -> Result<f64, SynthesisError> {
        let (after, until) = self.normalized_bounds(window)?;
        Ok(self.factor_sum_between(after, until))
    }

    /// Sum of factors with `after < t <= until`. An inverted range (a window
    /// wrapping past New Year) is empty.
    pub fn factor_sum_between(&self, after: i64, until: i64) -> f64 {
        if until <= after {
            return 0.0;
        }

        let lo = self.samples.partition_point(|(at, _)| *at <= after);
        let hi = self.samples.partition_point(|(at, _)| *at <= until);
        self.samples[lo..hi].iter().map(|(_, factor)| factor).sum()
    }
}
