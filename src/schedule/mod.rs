pub mod calendar;
pub mod grouping;
pub mod interval;
pub mod overlap;
pub mod payroll;
pub mod types;
pub mod worked_days;

pub use calendar::{day_mark, days_in, row_marks, DayMark};
pub use grouping::{
    group_by_department, group_by_ship, DisplayEntry, GroupPolicy, Grouping, ReferenceOrder,
};
pub use interval::schedule_days;
pub use overlap::{filter_schedules, overlaps, ScheduleQuery};
pub use payroll::{payroll_rows, sort_rows, PayrollRow, SortKey, SortOrder, SortSpec};
pub use types::{Department, Schedule, Ship, ShipScope, Staff, StaffSchedule, Window};
pub use worked_days::{ship_breakdown, ship_totals, worked_days_by_staff, ShipDays};
