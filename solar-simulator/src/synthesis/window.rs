use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;

use super::{localize, SynthesisError};

/// Half-open `[start, end)` interval in the device timezone.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

/// Local midnight of the day before `now`.
pub fn previous_day_start(now: &DateTime<Tz>) -> Result<DateTime<Tz>, SynthesisError> {
    let midnight = now
        .date_naive()
        .pred_opt()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .ok_or(SynthesisError::OutOfRange)?;
    localize(&now.timezone(), midnight)
}

/// Contiguous fixed-size windows from `start` while the window start is
/// before `now`. The last window may end after `now`.
#[derive(Debug, Clone)]
pub struct WindowIter {
    next_start: DateTime<Tz>,
    now: DateTime<Tz>,
    step: TimeDelta,
}

impl WindowIter {
    pub fn new(start: DateTime<Tz>, now: DateTime<Tz>, step_minutes: u32) -> Result<Self, SynthesisError> {
        if step_minutes == 0 {
            return Err(SynthesisError::InvalidStep);
        }

        Ok(Self {
            next_start: start,
            now,
            step: TimeDelta::minutes(i64::from(step_minutes)),
        })
    }

    pub fn step(&self) -> TimeDelta {
        self.step
    }
}

impl Iterator for WindowIter {
    type Item = Window;

    fn next(&mut self) -> Option<Window> {
        if self.next_start >= self.now {
            return None;
        }

        let start = self.next_start.clone();
        let end = start.clone().checked_add_signed(self.step)?;
        self.next_start = end.clone();

        Some(Window { start, end })
    }
}

pub fn windows_since_previous_day(
    now: DateTime<Utc>,
    tz: Tz,
    step_minutes: u32,
) -> Result<WindowIter, SynthesisError> {
    let now = now.with_timezone(&tz);
    let start = previous_day_start(&now)?;
    WindowIter::new(start, now, step_minutes)
}
