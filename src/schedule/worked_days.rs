use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::interval::schedule_days;
use super::types::{Schedule, Ship, Window};

/// Name shown for a breakdown row whose ship is not in the ship list.
pub const UNKNOWN_SHIP: &str = "Unknown Ship";

/// Days served on one ship within a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShipDays {
    pub ship_name: String,
    pub days: u32,
}

/// Total worked days per staff id. Staff with no days in the window are absent.
pub fn worked_days_by_staff<'a, I>(schedules: I, window: &Window) -> BTreeMap<String, u32>
where
    I: IntoIterator<Item = &'a Schedule>,
{
    let mut totals: BTreeMap<String, u32> = BTreeMap::new();
    for schedule in schedules {
        let days = schedule_days(schedule, window);
        if days > 0 {
            *totals.entry(schedule.staff_id.clone()).or_insert(0) += days;
        }
    }
    totals
}

/// One entry per contributing schedule row of `staff_id`, in input order.
/// The entries sum to that staff member's total in [`worked_days_by_staff`].
pub fn ship_breakdown<'a, I>(
    schedules: I,
    staff_id: &str,
    ships: &[Ship],
    window: &Window,
) -> Vec<ShipDays>
where
    I: IntoIterator<Item = &'a Schedule>,
{
    let names = ship_names(ships);
    schedules
        .into_iter()
        .filter(|s| s.staff_id == staff_id)
        .filter_map(|s| {
            let days = schedule_days(s, window);
            (days > 0).then(|| ShipDays {
                ship_name: names
                    .get(s.ship_id.as_str())
                    .copied()
                    .unwrap_or(UNKNOWN_SHIP)
                    .to_string(),
                days,
            })
        })
        .collect()
}

/// Total worked days per ship name, summed over every staff member.
pub fn ship_totals<'a, I>(schedules: I, ships: &[Ship], window: &Window) -> BTreeMap<String, u32>
where
    I: IntoIterator<Item = &'a Schedule>,
{
    let names = ship_names(ships);
    let mut totals: BTreeMap<String, u32> = BTreeMap::new();
    for schedule in schedules {
        let days = schedule_days(schedule, window);
        if days > 0 {
            let name = names.get(schedule.ship_id.as_str()).copied().unwrap_or(UNKNOWN_SHIP);
            *totals.entry(name.to_string()).or_insert(0) += days;
        }
    }
    totals
}

fn ship_names(ships: &[Ship]) -> HashMap<&str, &str> {
    ships.iter().map(|s| (s.id.as_str(), s.name.as_str())).collect()
}
