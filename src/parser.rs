use csv::{Reader, StringRecord};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use tracing::{info, warn};

use crate::error::RosterError;
use crate::schedule::{Department, Schedule, Ship, Staff};
use crate::store::Roster;

pub const SHIPS_FILE: &str = "ships.csv";
pub const STAFF_FILE: &str = "staff.csv";
pub const SCHEDULES_FILE: &str = "schedules.csv";

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parses a calendar date in `YYYY-MM-DD` form.
pub fn parse_date(value: &str) -> Result<NaiveDate, RosterError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| RosterError::InvalidDate {
        value: value.to_string(),
    })
}

/// Parses a timestamp into local wall-clock time. A bare date means midnight
/// of that day.
///
/// RFC 3339 values carrying an offset (`...Z`, `...+09:00`, as database
/// exports write them) are instants and are converted to the local zone, so
/// they land on the local calendar day. Any other value with trailing zone
/// text is refused.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, RosterError> {
    let trimmed = value.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(instant.with_timezone(&Local).naive_local());
    }

    for format in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(ts);
        }
    }
    parse_date(trimmed)?
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| RosterError::InvalidDate {
            value: value.to_string(),
        })
}

/// Parses a boolean value from various string representations
fn parse_bool(value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    lower == "yes" || lower == "true" || lower == "1"
}

/// Column positions resolved from a header row.
struct Columns(Vec<Option<usize>>);

impl Columns {
    fn resolve(headers: &StringRecord, names: &[&str]) -> Self {
        Columns(
            names
                .iter()
                .map(|name| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name)))
                .collect(),
        )
    }

    fn get<'r>(&self, record: &'r StringRecord, idx: usize) -> &'r str {
        self.0[idx]
            .and_then(|col| record.get(col))
            .map(str::trim)
            .unwrap_or("")
    }
}

/// Loads ships from CSV with `id,name` columns.
pub fn read_ships<R: Read>(reader: R) -> Result<Vec<Ship>, RosterError> {
    let mut reader = Reader::from_reader(reader);
    let cols = Columns::resolve(reader.headers()?, &["id", "name"]);

    let mut ships = Vec::new();
    for result in reader.records() {
        let record = result?;
        let id = cols.get(&record, 0);
        let name = cols.get(&record, 1);
        if id.is_empty() || name.is_empty() {
            warn!(line = ?record.position().map(|p| p.line()), "skipping incomplete ship row");
            continue;
        }
        ships.push(Ship {
            id: id.to_string(),
            name: name.to_string(),
        });
    }
    Ok(ships)
}

/// Loads staff from CSV with
/// `id,first_name,last_name,department,role,salary,code,status,ship_id` columns.
///
/// Rows without an id, with an unknown department, or with a code that is
/// not six characters are skipped. A repeated code keeps the first row.
pub fn read_staff<R: Read>(reader: R) -> Result<Vec<Staff>, RosterError> {
    let mut reader = Reader::from_reader(reader);
    let cols = Columns::resolve(
        reader.headers()?,
        &[
            "id",
            "first_name",
            "last_name",
            "department",
            "role",
            "salary",
            "code",
            "status",
            "ship_id",
        ],
    );

    let mut staff = Vec::new();
    let mut codes = HashSet::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line());

        let id = cols.get(&record, 0);
        if id.is_empty() {
            warn!(?line, "skipping staff row without id");
            continue;
        }

        let department = match cols.get(&record, 3).parse::<Department>() {
            Ok(d) => d,
            Err(e) => {
                warn!(?line, %e, "skipping staff row");
                continue;
            }
        };

        let code = cols.get(&record, 6);
        if code.chars().count() != 6 {
            warn!(?line, code, "skipping staff row with malformed code");
            continue;
        }
        if !codes.insert(code.to_string()) {
            warn!(?line, code, "skipping staff row with duplicate code");
            continue;
        }

        let ship_id = cols.get(&record, 8);
        staff.push(Staff {
            id: id.to_string(),
            first_name: cols.get(&record, 1).to_string(),
            last_name: cols.get(&record, 2).to_string(),
            department,
            role: cols.get(&record, 4).to_string(),
            salary: cols.get(&record, 5).parse().unwrap_or(0),
            code: code.to_string(),
            status: parse_bool(cols.get(&record, 7)),
            ship_id: (!ship_id.is_empty()).then(|| ship_id.to_string()),
        });
    }
    Ok(staff)
}

/// Loads schedules from CSV with `id,staff_id,ship_id,embark,disembark` columns.
/// An empty `disembark` means the staff member is still aboard.
pub fn read_schedules<R: Read>(reader: R) -> Result<Vec<Schedule>, RosterError> {
    let mut reader = Reader::from_reader(reader);
    let cols = Columns::resolve(
        reader.headers()?,
        &["id", "staff_id", "ship_id", "embark", "disembark"],
    );

    let mut schedules = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line());

        let id = cols.get(&record, 0);
        let staff_id = cols.get(&record, 1);
        let ship_id = cols.get(&record, 2);
        let embark = cols.get(&record, 3);
        if id.is_empty() || staff_id.is_empty() || ship_id.is_empty() || embark.is_empty() {
            warn!(?line, "skipping incomplete schedule row");
            continue;
        }

        let embark = match parse_timestamp(embark) {
            Ok(ts) => ts,
            Err(e) => {
                warn!(?line, %e, "skipping schedule row");
                continue;
            }
        };
        let disembark = match cols.get(&record, 4) {
            "" => None,
            raw => match parse_timestamp(raw) {
                Ok(ts) => Some(ts),
                Err(e) => {
                    warn!(?line, %e, "skipping schedule row");
                    continue;
                }
            },
        };

        schedules.push(Schedule {
            id: id.to_string(),
            staff_id: staff_id.to_string(),
            ship_id: ship_id.to_string(),
            embark,
            disembark,
        });
    }
    Ok(schedules)
}

/// Loads `ships.csv`, `staff.csv` and `schedules.csv` from `data_dir`.
pub fn load_roster<P: AsRef<Path>>(data_dir: P) -> Result<Roster, RosterError> {
    let dir = data_dir.as_ref();
    let ships = read_ships(std::fs::File::open(dir.join(SHIPS_FILE))?)?;
    let staff = read_staff(std::fs::File::open(dir.join(STAFF_FILE))?)?;
    let schedules = read_schedules(std::fs::File::open(dir.join(SCHEDULES_FILE))?)?;

    info!(
        ships = ships.len(),
        staff = staff.len(),
        schedules = schedules.len(),
        dir = %dir.display(),
        "roster loaded"
    );
    Ok(Roster::new(ships, staff, schedules))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::fs;

    const SHIPS: &str = "id,name\nx,Asahi Maru\ny,\n";
    const STAFF: &str = "\
id,first_name,last_name,department,role,salary,code,status,ship_id
s1,Taro,Yamada,Deck,Captain,30000,AB12CD,true,x
s2,Hana,Abe,機関部,Chief Engineer,25000,ZZ99ZZ,false,
s3,Ken,Mori,Galley,Cook,10000,QQ11QQ,false,
s4,Jun,Kato,Deck,Deck Crew,12000,SHORT,false,
s5,Mai,Ito,Steward,First Engineer,11000,AB12CD,false,
";
    const SCHEDULES: &str = "\
id,staff_id,ship_id,embark,disembark
a,s1,x,2024-03-01 08:30:00,2024-03-05T17:00:00
b,s1,x,2024-03-10,
c,s2,y,2024-02-20T06:00:00.000Z,
d,s2,y,not a date,
e,,x,2024-03-01,
";

    #[test]
    fn timestamps_accept_common_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(8, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2024-03-01 08:30:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-03-01T08:30").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2024-03-01T08:30:00.250").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_milli_opt(8, 30, 0, 250).unwrap()
        );
        assert_eq!(
            parse_timestamp("2024-03-01").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
        );
        assert!(matches!(parse_timestamp("yesterday"), Err(RosterError::InvalidDate { .. })));
    }

    #[test]
    fn utc_timestamps_are_read_as_local_time() {
        let instant = Utc.with_ymd_and_hms(2024, 2, 29, 23, 0, 0).unwrap();
        let local = instant.with_timezone(&Local).naive_local();

        assert_eq!(parse_timestamp("2024-02-29T23:00:00.000Z").unwrap(), local);
        assert_eq!(parse_timestamp("2024-03-01T08:00:00+09:00").unwrap(), local);
    }

    #[test]
    fn zone_text_outside_rfc3339_is_refused() {
        assert!(parse_timestamp("2024-03-01T08:30Z").is_err());
        assert!(parse_timestamp("2024-03-01 08:30:00 JST").is_err());
    }

    #[test]
    fn ships_skip_incomplete_rows() {
        let ships = read_ships(SHIPS.as_bytes()).unwrap();
        assert_eq!(ships, vec![Ship { id: "x".into(), name: "Asahi Maru".into() }]);
    }

    #[test]
    fn staff_rows_are_validated() {
        let staff = read_staff(STAFF.as_bytes()).unwrap();
        let ids: Vec<&str> = staff.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s2"]);
        assert_eq!(staff[0].ship_id.as_deref(), Some("x"));
        assert!(staff[0].status);
        assert_eq!(staff[1].department, Department::Engine);
        assert_eq!(staff[1].ship_id, None);
    }

    #[test]
    fn schedules_parse_open_and_closed_rows() {
        let schedules = read_schedules(SCHEDULES.as_bytes()).unwrap();
        let ids: Vec<&str> = schedules.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(schedules[0].disembark.is_some());
        assert!(schedules[1].is_open());
    }

    #[test]
    fn load_roster_reads_a_data_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SHIPS_FILE), SHIPS).unwrap();
        fs::write(dir.path().join(STAFF_FILE), STAFF).unwrap();
        fs::write(dir.path().join(SCHEDULES_FILE), SCHEDULES).unwrap();

        let roster = load_roster(dir.path()).unwrap();
        assert_eq!(roster.ships.len(), 1);
        assert_eq!(roster.staff.len(), 2);
        assert_eq!(roster.schedules.len(), 3);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(load_roster(dir.path()), Err(RosterError::Io(_))));
    }
}
