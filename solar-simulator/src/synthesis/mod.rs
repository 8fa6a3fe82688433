//! Reading synthesis: fixed windows over the last day, weighted by a seasonal
//! profile, accumulated into cumulative meter reads.

pub mod accumulate;
pub mod profile;
pub mod window;

use chrono::{DateTime, Datelike, LocalResult, NaiveDate, NaiveDateTime, TimeDelta, TimeZone};
use chrono_tz::Tz;

pub use accumulate::{energy_delta, EnergyAccumulator};
pub use profile::{SeasonalProfile, REFERENCE_YEAR};
pub use window::{previous_day_start, windows_since_previous_day, Window, WindowIter};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SynthesisError {
    #[error("reading interval must be at least one minute")]
    InvalidStep,
    #[error("local time {0} cannot be resolved in the device timezone")]
    UnresolvableLocalTime(NaiveDateTime),
    #[error("date out of supported range")]
    OutOfRange,
}

/// Resolve a wall-clock time in `tz`. Ambiguous times (DST fall-back) take the
/// earlier instant; times inside a DST gap move forward by one hour.
pub fn localize(tz: &Tz, local: NaiveDateTime) -> Result<DateTime<Tz>, SynthesisError> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        LocalResult::None => local
            .checked_add_signed(TimeDelta::hours(1))
            .and_then(|shifted| tz.from_local_datetime(&shifted).earliest())
            .ok_or(SynthesisError::UnresolvableLocalTime(local)),
    }
}

/// Force `local` into `year`, keeping month, day and time of day.
pub fn normalize_year(local: NaiveDateTime, year: i32) -> NaiveDateTime {
    local.with_year(year).unwrap_or_else(|| {
        // 29 February in a non-leap year
        NaiveDate::from_ymd_opt(year, 2, 28).map_or(local, |d| d.and_time(local.time()))
    })
}
