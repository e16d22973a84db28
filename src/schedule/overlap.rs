use super::types::{Schedule, ShipScope, Window};

/// Selection criteria for schedule rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleQuery {
    pub window: Window,
    pub ship: ShipScope,
    pub staff_id: Option<String>,
}

impl ScheduleQuery {
    pub fn new(window: Window) -> Self {
        ScheduleQuery {
            window,
            ship: ShipScope::All,
            staff_id: None,
        }
    }

    pub fn with_ship(mut self, ship: ShipScope) -> Self {
        self.ship = ship;
        self
    }

    pub fn with_staff(mut self, staff_id: impl Into<String>) -> Self {
        self.staff_id = Some(staff_id.into());
        self
    }

    pub fn matches(&self, schedule: &Schedule) -> bool {
        overlaps(schedule, &self.window)
            && self.ship.matches(Some(schedule.ship_id.as_str()))
            && self
                .staff_id
                .as_deref()
                .map_or(true, |id| schedule.staff_id == id)
    }
}

/// A schedule overlaps when it embarks on or before the window's last day and
/// is either still open or disembarks on or after the window's first day.
pub fn overlaps(schedule: &Schedule, window: &Window) -> bool {
    schedule.embark_day() <= window.end()
        && schedule
            .disembark_day()
            .map_or(true, |d| d >= window.start())
}

/// Returns the rows matching `query`, in input order.
pub fn filter_schedules<'a>(schedules: &'a [Schedule], query: &ScheduleQuery) -> Vec<&'a Schedule> {
    schedules.iter().filter(|s| query.matches(s)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn noon(d: NaiveDate) -> NaiveDateTime {
        d.and_hms_opt(12, 0, 0).unwrap()
    }

    fn schedule(
        id: &str,
        staff: &str,
        ship: &str,
        embark: NaiveDate,
        disembark: Option<NaiveDate>,
    ) -> Schedule {
        Schedule {
            id: id.into(),
            staff_id: staff.into(),
            ship_id: ship.into(),
            embark: noon(embark),
            disembark: disembark.map(noon),
        }
    }

    fn june() -> Window {
        Window::new(day(2024, 6, 1), day(2024, 6, 30)).unwrap()
    }

    #[test]
    fn overlap_covers_containment_and_open_rows() {
        let window = june();
        let containing = schedule("a", "s1", "x", day(2024, 5, 1), Some(day(2024, 7, 15)));
        let long_open = schedule("b", "s1", "x", day(2020, 1, 1), None);
        let inside = schedule("c", "s1", "x", day(2024, 6, 3), Some(day(2024, 6, 4)));
        let ends_on_start = schedule("d", "s1", "x", day(2024, 5, 20), Some(day(2024, 6, 1)));
        let starts_on_end = schedule("e", "s1", "x", day(2024, 6, 30), None);

        for s in [&containing, &long_open, &inside, &ends_on_start, &starts_on_end] {
            assert!(overlaps(s, &window), "{} should overlap", s.id);
        }
    }

    #[test]
    fn rows_outside_the_window_are_dropped() {
        let window = june();
        let before = schedule("a", "s1", "x", day(2024, 5, 1), Some(day(2024, 5, 31)));
        let after = schedule("b", "s1", "x", day(2024, 7, 1), None);
        assert!(!overlaps(&before, &window));
        assert!(!overlaps(&after, &window));
    }

    #[test]
    fn ship_filter_narrows_and_all_includes_everything() {
        let rows = vec![
            schedule("a", "s1", "ship-1", day(2024, 6, 1), None),
            schedule("b", "s2", "ship-2", day(2024, 6, 2), None),
            schedule("c", "s3", "ship-1", day(2024, 6, 3), Some(day(2024, 6, 5))),
        ];

        let one = ScheduleQuery::new(june()).with_ship(ShipScope::Ship("ship-1".into()));
        let ids: Vec<&str> = filter_schedules(&rows, &one).iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);

        let all = ScheduleQuery::new(june()).with_ship(ShipScope::All);
        assert_eq!(filter_schedules(&rows, &all).len(), 3);
    }

    #[test]
    fn staff_filter_and_empty_results() {
        let rows = vec![
            schedule("a", "s1", "ship-1", day(2024, 6, 1), None),
            schedule("b", "s2", "ship-1", day(2024, 6, 2), None),
        ];
        let q = ScheduleQuery::new(june()).with_staff("s2");
        let hits = filter_schedules(&rows, &q);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "b");

        let nobody = ScheduleQuery::new(june()).with_staff("s9");
        assert!(filter_schedules(&rows, &nobody).is_empty());
        assert!(filter_schedules(&[], &ScheduleQuery::new(june())).is_empty());
    }
}
