use chrono::NaiveDate;

use super::types::{Schedule, Window};

/// Inclusive number of calendar days between two days, or 0 when `end` is before `start`.
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> u32 {
    let span = (end - start).num_days() + 1;
    if span > 0 {
        span as u32
    } else {
        0
    }
}

/// Days an interval spends inside `window`, both ends counted.
///
/// An open interval (`end == None`) is treated as ongoing through the window's
/// last day and never beyond it. A malformed interval whose end precedes its
/// start contributes 0.
pub fn overlap_days(start: NaiveDate, end: Option<NaiveDate>, window: &Window) -> u32 {
    let effective_start = start.max(window.start());
    let effective_end = end.unwrap_or(window.end()).min(window.end());
    if effective_start > effective_end {
        return 0;
    }
    inclusive_days(effective_start, effective_end)
}

/// Worked days a single schedule row contributes to `window`.
///
/// Timestamps are reduced to their calendar day first, so an embark at 23:59
/// and a disembark at 00:01 the next morning still count as two days.
pub fn schedule_days(schedule: &Schedule, window: &Window) -> u32 {
    overlap_days(schedule.embark_day(), schedule.disembark_day(), window)
}
