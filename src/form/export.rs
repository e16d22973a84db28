use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::RosterError;
use crate::schedule::{PayrollRow, Window};

const HEADER: [&str; 9] = [
    "period_start",
    "period_end",
    "staff_id",
    "name",
    "department",
    "role",
    "worked_days",
    "daily_salary",
    "gross_pay",
];

/// Writes payroll rows as CSV, one line per staff member, with the period on
/// every line so exports from different windows can be concatenated.
pub fn write_payroll_csv<W: Write>(
    rows: &[PayrollRow],
    window: &Window,
    writer: W,
) -> Result<(), RosterError> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(HEADER)?;

    let start = window.start().to_string();
    let end = window.end().to_string();
    for row in rows {
        wtr.write_record([
            start.as_str(),
            end.as_str(),
            row.staff.id.as_str(),
            row.staff.display_name().as_str(),
            row.staff.department.as_str(),
            row.staff.role.as_str(),
            row.worked_days.to_string().as_str(),
            row.staff.salary.to_string().as_str(),
            row.gross_pay.to_string().as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports payroll rows to a CSV file, replacing any existing file.
pub fn export_payroll_to_csv(
    rows: &[PayrollRow],
    window: &Window,
    csv_path: &Path,
) -> Result<(), RosterError> {
    let file = File::create(csv_path)?;
    write_payroll_csv(rows, window, file)
}
