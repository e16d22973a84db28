use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{RosterError, WindowError};

/// Staff department, in fixed display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Department {
    Deck,
    Engine,
    Steward,
}

impl Department {
    pub const ALL: [Department; 3] = [Department::Deck, Department::Engine, Department::Steward];

    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Deck => "Deck",
            Department::Engine => "Engine",
            Department::Steward => "Steward",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Department {
    type Err = RosterError;

    /// Accepts the English names in any case, plus the Japanese names used by
    /// older exports of the dashboard.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "deck" | "甲板部" => Ok(Department::Deck),
            "engine" | "機関部" => Ok(Department::Engine),
            "steward" | "司厨部" => Ok(Department::Steward),
            _ => Err(RosterError::UnknownDepartment { value: s.to_string() }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ship {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub department: Department,
    pub role: String,
    /// Daily salary.
    pub salary: u32,
    pub code: String,
    /// Currently embarked.
    pub status: bool,
    pub ship_id: Option<String>,
}

impl Staff {
    /// "Last First", the order names are shown in tables.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.last_name, self.first_name).trim().to_string()
    }
}

/// One embark/disembark interval of a staff member on a ship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: String,
    pub staff_id: String,
    pub ship_id: String,
    pub embark: NaiveDateTime,
    /// `None` while the staff member is still aboard.
    pub disembark: Option<NaiveDateTime>,
}

impl Schedule {
    pub fn embark_day(&self) -> NaiveDate {
        self.embark.date()
    }

    pub fn disembark_day(&self) -> Option<NaiveDate> {
        self.disembark.map(|d| d.date())
    }

    pub fn is_open(&self) -> bool {
        self.disembark.is_none()
    }
}

/// A schedule joined with the staff member it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaffSchedule {
    pub schedule: Schedule,
    pub staff: Staff,
}

/// Inclusive calendar-day range every query is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Window {
    start: NaiveDate,
    end: NaiveDate,
}

impl Window {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, WindowError> {
        if start > end {
            return Err(WindowError::Inverted { start, end });
        }
        Ok(Window { start, end })
    }

    /// Builds a window from optional bounds, refusing a missing side instead of
    /// defaulting it.
    pub fn from_parts(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Self, WindowError> {
        let start = start.ok_or(WindowError::MissingStart)?;
        let end = end.ok_or(WindowError::MissingEnd)?;
        Window::new(start, end)
    }

    /// A window covering exactly one day.
    pub fn single(day: NaiveDate) -> Self {
        Window { start: day, end: day }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Number of calendar days covered, both ends included.
    pub fn len_days(&self) -> u32 {
        ((self.end - self.start).num_days() + 1) as u32
    }
}

/// Which ships a query covers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShipScope {
    #[default]
    All,
    Ship(String),
}

impl ShipScope {
    /// Converts the raw form/query value. Absent, empty and `"all"` mean no filter.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => ShipScope::All,
            Some(s) if s.eq_ignore_ascii_case("all") => ShipScope::All,
            Some(s) => ShipScope::Ship(s.to_string()),
        }
    }

    pub fn matches(&self, ship_id: Option<&str>) -> bool {
        match self {
            ShipScope::All => true,
            ShipScope::Ship(id) => ship_id == Some(id.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn department_parses_english_and_japanese_names() {
        assert_eq!("deck".parse::<Department>().unwrap(), Department::Deck);
        assert_eq!(" Engine ".parse::<Department>().unwrap(), Department::Engine);
        assert_eq!("司厨部".parse::<Department>().unwrap(), Department::Steward);
        assert!(matches!(
            "galley".parse::<Department>(),
            Err(RosterError::UnknownDepartment { .. })
        ));
    }

    #[test]
    fn window_rejects_missing_and_inverted_bounds() {
        assert_eq!(
            Window::from_parts(None, Some(day(2024, 1, 1))),
            Err(WindowError::MissingStart)
        );
        assert_eq!(
            Window::from_parts(Some(day(2024, 1, 1)), None),
            Err(WindowError::MissingEnd)
        );
        assert!(matches!(
            Window::new(day(2024, 1, 2), day(2024, 1, 1)),
            Err(WindowError::Inverted { .. })
        ));
    }

    #[test]
    fn window_length_is_inclusive() {
        let w = Window::new(day(2024, 2, 1), day(2024, 2, 29)).unwrap();
        assert_eq!(w.len_days(), 29);
        assert!(w.contains(day(2024, 2, 29)));
        assert!(!w.contains(day(2024, 3, 1)));
    }

    #[test]
    fn ship_scope_treats_all_as_no_filter() {
        assert_eq!(ShipScope::parse(None), ShipScope::All);
        assert_eq!(ShipScope::parse(Some("ALL")), ShipScope::All);
        assert_eq!(ShipScope::parse(Some(" ")), ShipScope::All);
        let scope = ShipScope::parse(Some("ship-1"));
        assert!(scope.matches(Some("ship-1")));
        assert!(!scope.matches(Some("ship-2")));
        assert!(!scope.matches(None));
        assert!(ShipScope::All.matches(None));
    }

    #[test]
    fn staff_display_name_is_last_then_first() {
        let staff = Staff {
            id: "s1".into(),
            first_name: "Taro".into(),
            last_name: "Yamada".into(),
            department: Department::Deck,
            role: "Captain".into(),
            salary: 20000,
            code: "ABC123".into(),
            status: true,
            ship_id: None,
        };
        assert_eq!(staff.display_name(), "Yamada Taro");
    }
}
