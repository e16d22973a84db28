use serde::{Deserialize, Serialize};

use super::types::{Department, Ship, ShipScope, Staff, StaffSchedule};

/// Anything that can be placed under a ship/department/role header.
pub trait Groupable {
    fn department(&self) -> Department;
    fn role(&self) -> &str;
    fn ship_id(&self) -> Option<&str>;
}

impl Groupable for Staff {
    fn department(&self) -> Department {
        self.department
    }

    fn role(&self) -> &str {
        &self.role
    }

    fn ship_id(&self) -> Option<&str> {
        self.ship_id.as_deref()
    }
}

/// A schedule belongs to the ship it was recorded on, not the staff member's
/// current ship.
impl Groupable for StaffSchedule {
    fn department(&self) -> Department {
        self.staff.department
    }

    fn role(&self) -> &str {
        &self.staff.role
    }

    fn ship_id(&self) -> Option<&str> {
        Some(&self.schedule.ship_id)
    }
}

/// Role order inside each department. Department order itself is fixed by
/// [`Department::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceOrder {
    pub deck: Vec<String>,
    pub engine: Vec<String>,
    pub steward: Vec<String>,
}

impl Default for ReferenceOrder {
    fn default() -> Self {
        let owned = |roles: &[&str]| roles.iter().map(|r| r.to_string()).collect();
        ReferenceOrder {
            deck: owned(&[
                "Captain",
                "First Officer",
                "Second Officer",
                "Third Officer",
                "Deck Crew",
            ]),
            engine: owned(&["Chief Engineer", "Second Engineer", "Third Engineer", "Engine Crew"]),
            // Historical data lists only this role for stewards.
            steward: owned(&["First Engineer"]),
        }
    }
}

impl ReferenceOrder {
    pub fn roles(&self, department: Department) -> &[String] {
        match department {
            Department::Deck => &self.deck,
            Department::Engine => &self.engine,
            Department::Steward => &self.steward,
        }
    }

    /// True when the record's role appears in its department's list.
    pub fn places<T: Groupable>(&self, record: &T) -> bool {
        self.roles(record.department()).iter().any(|r| r == record.role())
    }
}

/// Which headers are emitted over groups with no records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupPolicy {
    /// Emit a ship header even when no record is assigned to that ship.
    pub emit_empty_ships: bool,
    /// Emit department and role headers even when nothing falls under them.
    pub emit_empty_groups: bool,
}

impl GroupPolicy {
    /// Fixed scaffolding rows for the calendar grid.
    pub fn calendar() -> Self {
        GroupPolicy {
            emit_empty_ships: true,
            emit_empty_groups: true,
        }
    }

    /// Headers only over populated groups.
    pub fn compact() -> Self {
        GroupPolicy {
            emit_empty_ships: false,
            emit_empty_groups: false,
        }
    }
}

/// One row of the flattened display sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "payload")]
pub enum DisplayEntry<T> {
    Ship(String),
    Department(Department),
    Role(String),
    Record(T),
}

impl<T> DisplayEntry<T> {
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> DisplayEntry<U> {
        match self {
            DisplayEntry::Ship(name) => DisplayEntry::Ship(name),
            DisplayEntry::Department(d) => DisplayEntry::Department(d),
            DisplayEntry::Role(r) => DisplayEntry::Role(r),
            DisplayEntry::Record(t) => DisplayEntry::Record(f(t)),
        }
    }
}

/// Result of one grouping pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grouping<T> {
    pub entries: Vec<DisplayEntry<T>>,
    /// Records in scope whose department/role has no slot in the reference order.
    pub unplaced: Vec<T>,
}

impl<T> Grouping<T> {
    pub fn records(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().filter_map(|e| match e {
            DisplayEntry::Record(t) => Some(t),
            _ => None,
        })
    }
}

/// Ship → department → role → records, iterating `ships` in the given order.
///
/// With [`GroupPolicy::calendar`] a ship header is always emitted; a ship with
/// records then gets all three department headers, and every populated
/// department gets all of its role headers. With [`GroupPolicy::compact`] a
/// ship whose records all have unlisted roles gets no header at all.
pub fn group_by_ship<T: Groupable + Clone>(
    ships: &[Ship],
    records: &[T],
    order: &ReferenceOrder,
    policy: GroupPolicy,
) -> Grouping<T> {
    let mut entries = Vec::new();

    for ship in ships {
        let assigned: Vec<&T> = records
            .iter()
            .filter(|r| r.ship_id() == Some(ship.id.as_str()))
            .collect();

        let populated = assigned.iter().any(|r| order.places(*r));
        if !populated && !policy.emit_empty_ships {
            continue;
        }

        entries.push(DisplayEntry::Ship(ship.name.clone()));
        if !assigned.is_empty() {
            push_departments(&mut entries, &assigned, order, policy);
        }
    }

    let unplaced = records
        .iter()
        .filter(|r| r.ship_id().map_or(false, |id| ships.iter().any(|s| s.id == id)))
        .filter(|r| !order.places(*r))
        .cloned()
        .collect();

    Grouping { entries, unplaced }
}

/// Department → role → records for the records inside `scope`.
///
/// Records are matched to the scope by their own ship reference before any
/// grouping happens.
pub fn group_by_department<T: Groupable + Clone>(
    records: &[T],
    scope: &ShipScope,
    order: &ReferenceOrder,
    policy: GroupPolicy,
) -> Grouping<T> {
    let in_scope: Vec<&T> = records.iter().filter(|r| scope.matches(r.ship_id())).collect();

    let mut entries = Vec::new();
    push_departments(&mut entries, &in_scope, order, policy);

    let unplaced = in_scope
        .into_iter()
        .filter(|r| !order.places(*r))
        .cloned()
        .collect();

    Grouping { entries, unplaced }
}

fn push_departments<T: Groupable + Clone>(
    entries: &mut Vec<DisplayEntry<T>>,
    records: &[&T],
    order: &ReferenceOrder,
    policy: GroupPolicy,
) {
    for department in Department::ALL {
        let in_department: Vec<&T> = records
            .iter()
            .copied()
            .filter(|r| r.department() == department)
            .collect();

        let placed = in_department.iter().any(|r| order.places(*r));
        if !placed && !policy.emit_empty_groups {
            continue;
        }
        entries.push(DisplayEntry::Department(department));

        // An empty department never gets role scaffolding underneath.
        if in_department.is_empty() {
            continue;
        }

        for role in order.roles(department) {
            let in_role: Vec<&T> = in_department
                .iter()
                .copied()
                .filter(|r| r.role() == role)
                .collect();

            if in_role.is_empty() && !policy.emit_empty_groups {
                continue;
            }
            entries.push(DisplayEntry::Role(role.clone()));
            entries.extend(in_role.into_iter().cloned().map(DisplayEntry::Record));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::types::Schedule;
    use chrono::NaiveDate;

    fn staff(id: &str, department: Department, role: &str, ship: Option<&str>) -> Staff {
        Staff {
            id: id.into(),
            first_name: id.into(),
            last_name: "Test".into(),
            department,
            role: role.into(),
            salary: 10000,
            code: format!("{:0>6}", id),
            status: ship.is_some(),
            ship_id: ship.map(str::to_string),
        }
    }

    fn ship(id: &str, name: &str) -> Ship {
        Ship { id: id.into(), name: name.into() }
    }

    fn kinds<T>(entries: &[DisplayEntry<T>]) -> Vec<String> {
        entries
            .iter()
            .map(|e| match e {
                DisplayEntry::Ship(n) => format!("ship:{n}"),
                DisplayEntry::Department(d) => format!("dept:{d}"),
                DisplayEntry::Role(r) => format!("role:{r}"),
                DisplayEntry::Record(_) => "record".to_string(),
            })
            .collect()
    }

    fn record_ids(grouping: &Grouping<Staff>) -> Vec<&str> {
        grouping.records().map(|s| s.id.as_str()).collect()
    }

    fn full_roster(ship_id: &str) -> Vec<Staff> {
        let order = ReferenceOrder::default();
        let mut roster = Vec::new();
        for department in Department::ALL {
            for role in order.roles(department) {
                let id = format!("{}-{}", department, role.replace(' ', ""));
                roster.push(staff(&id, department, role, Some(ship_id)));
            }
        }
        roster
    }

    #[test]
    fn ship_scoped_full_roster_follows_reference_order() {
        let order = ReferenceOrder::default();
        let roster = full_roster("x");
        let grouping =
            group_by_ship(&[ship("x", "Asahi")], &roster, &order, GroupPolicy::calendar());

        let headers: Vec<String> = kinds(&grouping.entries)
            .into_iter()
            .filter(|k| k != "record")
            .collect();
        let mut expected = vec!["ship:Asahi".to_string()];
        for department in Department::ALL {
            expected.push(format!("dept:{department}"));
            for role in order.roles(department) {
                expected.push(format!("role:{role}"));
            }
        }
        assert_eq!(headers, expected);
        assert_eq!(grouping.records().count(), roster.len());
        assert!(grouping.unplaced.is_empty());
    }

    #[test]
    fn calendar_policy_keeps_scaffolding_for_sparse_ships() {
        let ships = vec![ship("x", "Asahi"), ship("y", "Kaiyo")];
        let roster = vec![staff("a", Department::Deck, "Captain", Some("x"))];
        let order = ReferenceOrder::default();
        let grouping = group_by_ship(&ships, &roster, &order, GroupPolicy::calendar());

        assert_eq!(
            kinds(&grouping.entries),
            vec![
                "ship:Asahi",
                "dept:Deck",
                "role:Captain",
                "record",
                "role:First Officer",
                "role:Second Officer",
                "role:Third Officer",
                "role:Deck Crew",
                "dept:Engine",
                "dept:Steward",
                "ship:Kaiyo",
            ]
        );
    }

    #[test]
    fn compact_policy_only_emits_populated_headers() {
        let ships = vec![ship("x", "Asahi"), ship("y", "Kaiyo")];
        let roster = vec![
            staff("a", Department::Engine, "Engine Crew", Some("x")),
            staff("b", Department::Deck, "Captain", Some("x")),
        ];
        let order = ReferenceOrder::default();
        let grouping = group_by_ship(&ships, &roster, &order, GroupPolicy::compact());
        assert_eq!(
            kinds(&grouping.entries),
            vec![
                "ship:Asahi",
                "dept:Deck",
                "role:Captain",
                "record",
                "dept:Engine",
                "role:Engine Crew",
                "record",
            ]
        );
    }

    #[test]
    fn records_keep_input_order_within_a_role() {
        let roster = vec![
            staff("c", Department::Deck, "Deck Crew", Some("x")),
            staff("a", Department::Deck, "Deck Crew", Some("x")),
            staff("b", Department::Deck, "Deck Crew", Some("x")),
        ];
        let order = ReferenceOrder::default();
        let grouping =
            group_by_department(&roster, &ShipScope::All, &order, GroupPolicy::compact());
        assert_eq!(record_ids(&grouping), vec!["c", "a", "b"]);
    }

    #[test]
    fn department_mode_filters_by_ship_membership() {
        let roster = vec![
            staff("a", Department::Deck, "Captain", Some("x")),
            staff("b", Department::Deck, "Captain", Some("y")),
            staff("c", Department::Steward, "First Engineer", None),
        ];
        let order = ReferenceOrder::default();

        let on_x = ShipScope::Ship("x".into());
        let only_x = group_by_department(&roster, &on_x, &order, GroupPolicy::compact());
        assert_eq!(record_ids(&only_x), vec!["a"]);
        assert_eq!(kinds(&only_x.entries), vec!["dept:Deck", "role:Captain", "record"]);

        let all = group_by_department(&roster, &ShipScope::All, &order, GroupPolicy::compact());
        assert_eq!(record_ids(&all), vec!["a", "b", "c"]);
    }

    #[test]
    fn unknown_roles_are_reported_not_placed() {
        let roster = vec![
            staff("a", Department::Deck, "Bosun", Some("x")),
            staff("b", Department::Deck, "Captain", Some("x")),
        ];
        let order = ReferenceOrder::default();
        let grouping =
            group_by_ship(&[ship("x", "Asahi")], &roster, &order, GroupPolicy::compact());
        assert_eq!(record_ids(&grouping), vec!["b"]);
        assert_eq!(grouping.unplaced.len(), 1);
        assert_eq!(grouping.unplaced[0].id, "a");

        let stranded = group_by_ship(
            &[ship("x", "Asahi")],
            &roster[..1],
            &order,
            GroupPolicy::compact(),
        );
        assert!(stranded.entries.is_empty());
        assert_eq!(stranded.unplaced.len(), 1);

        let scaffolded = group_by_ship(
            &[ship("x", "Asahi")],
            &roster[..1],
            &order,
            GroupPolicy::calendar(),
        );
        assert_eq!(scaffolded.entries[0], DisplayEntry::Ship("Asahi".into()));
        assert_eq!(scaffolded.records().count(), 0);

        let only_unknown = vec![staff("a", Department::Deck, "Bosun", Some("x"))];
        let compact =
            group_by_department(&only_unknown, &ShipScope::All, &order, GroupPolicy::compact());
        assert!(compact.entries.is_empty());
        assert_eq!(compact.unplaced.len(), 1);
    }

    #[test]
    fn configured_roles_replace_the_defaults() {
        let order = ReferenceOrder {
            steward: vec!["Chief Steward".into(), "Cook".into()],
            ..ReferenceOrder::default()
        };
        let roster = vec![
            staff("a", Department::Steward, "Cook", None),
            staff("b", Department::Steward, "Chief Steward", None),
        ];
        let grouping =
            group_by_department(&roster, &ShipScope::All, &order, GroupPolicy::compact());
        assert_eq!(record_ids(&grouping), vec!["b", "a"]);
    }

    #[test]
    fn schedules_group_under_their_own_ship() {
        let embark = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(9, 0, 0).unwrap();
        let row = StaffSchedule {
            schedule: Schedule {
                id: "sch".into(),
                staff_id: "a".into(),
                ship_id: "y".into(),
                embark,
                disembark: None,
            },
            // Currently assigned elsewhere; the schedule's ship wins.
            staff: staff("a", Department::Engine, "Chief Engineer", Some("x")),
        };
        let ships = vec![ship("x", "Asahi"), ship("y", "Kaiyo")];
        let order = ReferenceOrder::default();
        let grouping = group_by_ship(&ships, &[row], &order, GroupPolicy::compact());
        assert_eq!(
            kinds(&grouping.entries),
            vec!["ship:Kaiyo", "dept:Engine", "role:Chief Engineer", "record"]
        );
    }

    #[test]
    fn grouping_is_deterministic() {
        let roster = full_roster("x");
        let ships = vec![ship("x", "Asahi")];
        let order = ReferenceOrder::default();
        let a = group_by_ship(&ships, &roster, &order, GroupPolicy::calendar());
        let b = group_by_ship(&ships, &roster, &order, GroupPolicy::calendar());
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a.entries).unwrap(),
            serde_json::to_string(&b.entries).unwrap()
        );
    }
}
