use serde::{Deserialize, Serialize};

use crate::schedule::{
    filter_schedules, Schedule, ScheduleQuery, Ship, ShipScope, Staff, StaffSchedule,
};

/// Read access to persisted roster data.
///
/// Implementations hand back validated, owned records; the computations in
/// [`crate::schedule`] never reach storage themselves.
pub trait ScheduleStore {
    /// Schedules overlapping the query window, narrowed by ship and staff.
    fn fetch_schedules(&self, query: &ScheduleQuery) -> Vec<Schedule>;

    /// Staff whose current ship is within `scope`, ordered by last name.
    fn fetch_staff(&self, scope: &ShipScope) -> Vec<Staff>;

    fn fetch_ships(&self) -> Vec<Ship>;
}

/// In-memory snapshot of ships, staff and schedules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    pub ships: Vec<Ship>,
    pub staff: Vec<Staff>,
    pub schedules: Vec<Schedule>,
}

impl Roster {
    pub fn new(ships: Vec<Ship>, staff: Vec<Staff>, schedules: Vec<Schedule>) -> Self {
        Roster { ships, staff, schedules }
    }

    pub fn staff_by_id(&self, id: &str) -> Option<&Staff> {
        self.staff.iter().find(|s| s.id == id)
    }

    /// Matching schedules joined with their staff, ordered by the staff member's
    /// last name. Rows whose staff record is missing are dropped.
    pub fn fetch_staff_schedules(&self, query: &ScheduleQuery) -> Vec<StaffSchedule> {
        let mut rows: Vec<StaffSchedule> = filter_schedules(&self.schedules, query)
            .into_iter()
            .filter_map(|schedule| {
                self.staff_by_id(&schedule.staff_id).map(|staff| StaffSchedule {
                    schedule: schedule.clone(),
                    staff: staff.clone(),
                })
            })
            .collect();
        rows.sort_by(|a, b| a.staff.last_name.cmp(&b.staff.last_name));
        rows
    }
}

impl ScheduleStore for Roster {
    fn fetch_schedules(&self, query: &ScheduleQuery) -> Vec<Schedule> {
        filter_schedules(&self.schedules, query).into_iter().cloned().collect()
    }

    fn fetch_staff(&self, scope: &ShipScope) -> Vec<Staff> {
        let mut staff: Vec<Staff> = self
            .staff
            .iter()
            .filter(|s| scope.matches(s.ship_id.as_deref()))
            .cloned()
            .collect();
        staff.sort_by(|a, b| a.last_name.cmp(&b.last_name));
        staff
    }

    fn fetch_ships(&self) -> Vec<Ship> {
        self.ships.clone()
    }
}
