use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::Serialize;

use super::types::{Schedule, Window};
use crate::error::WindowError;

/// Days added per scroll step of the calendar.
pub const PAGE_DAYS: u32 = 100;

/// Longest window the calendar grid will lay out, one cell per day.
pub const MAX_CALENDAR_DAYS: u32 = 10 * PAGE_DAYS;

/// How a staff member's row looks on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayMark {
    Off,
    /// Embarked and disembarked the same day.
    SingleDay,
    Embark,
    Disembark,
    Aboard,
}

/// Every calendar day in `window`, in order.
pub fn days_in(window: &Window) -> Vec<NaiveDate> {
    window.start().iter_days().take_while(|d| window.contains(*d)).collect()
}

/// Marks `day` for a staff member's schedules.
///
/// The first schedule covering the day decides the mark. Open schedules are
/// drawn through `today`.
pub fn day_mark<'a, I>(schedules: I, day: NaiveDate, today: NaiveDate) -> DayMark
where
    I: IntoIterator<Item = &'a Schedule>,
{
    let covering = schedules.into_iter().find(|s| {
        let end = s.disembark_day().unwrap_or(today);
        s.embark_day() <= day && day <= end
    });

    let Some(schedule) = covering else {
        return DayMark::Off;
    };

    let starts = schedule.embark_day() == day;
    let ends = schedule.disembark_day() == Some(day);
    match (starts, ends) {
        (true, true) => DayMark::SingleDay,
        (true, false) => DayMark::Embark,
        (false, true) => DayMark::Disembark,
        (false, false) => DayMark::Aboard,
    }
}

/// One mark per day of `window`.
pub fn row_marks(schedules: &[&Schedule], window: &Window, today: NaiveDate) -> Vec<DayMark> {
    days_in(window)
        .into_iter()
        .map(|d| day_mark(schedules.iter().copied(), d, today))
        .collect()
}

/// Refuses windows too long to lay out as a day grid.
pub fn calendar_window(window: Window) -> Result<Window, WindowError> {
    let days = window.len_days();
    if days > MAX_CALENDAR_DAYS {
        return Err(WindowError::TooLong {
            days,
            max: MAX_CALENDAR_DAYS,
        });
    }
    Ok(window)
}

/// Grows the window backwards by `days` (scrolling into the past). Stops at
/// the earliest representable date.
pub fn extend_before(window: &Window, days: u32) -> Window {
    let start = window
        .start()
        .checked_sub_signed(Duration::days(i64::from(days)))
        .unwrap_or(NaiveDate::MIN);
    Window::new(start, window.end()).unwrap_or(*window)
}

/// Grows the window forwards by `days`. Stops at the latest representable date.
pub fn extend_after(window: &Window, days: u32) -> Window {
    let end = window
        .end()
        .checked_add_signed(Duration::days(i64::from(days)))
        .unwrap_or(NaiveDate::MAX);
    Window::new(window.start(), end).unwrap_or(*window)
}

/// One month back from `selected` through `selected`, the print view's range.
pub fn print_window(selected: NaiveDate) -> Window {
    let start = selected.checked_sub_months(Months::new(1)).unwrap_or(selected);
    Window::new(start, selected).unwrap_or(Window::single(selected))
}

/// First through last day of the month containing `date`, the default payroll period.
pub fn month_window(date: NaiveDate) -> Window {
    let first = date.with_day(1).unwrap_or(date);
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date);
    Window::new(first, last).unwrap_or(Window::single(date))
}
