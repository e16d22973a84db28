use std::fs::File;
use std::io::Write;

use crate::schedule::{DayMark, DisplayEntry, PayrollRow, ShipDays, Staff, Window};

/// Formats a staff name with its role tag
pub fn format_staff_name(role: &str, name: &str) -> String {
    if role.is_empty() {
        name.to_string()
    } else {
        format!("[{}] {}", role, name)
    }
}

pub fn staff_label(staff: &Staff) -> String {
    format_staff_name(&staff.role, &staff.display_name())
}

/// One character per day: `o` single day, `<` embark, `>` disembark, `=` aboard, `.` off.
pub fn render_marks(marks: &[DayMark]) -> String {
    marks
        .iter()
        .map(|m| match m {
            DayMark::Off => '.',
            DayMark::SingleDay => 'o',
            DayMark::Embark => '<',
            DayMark::Disembark => '>',
            DayMark::Aboard => '=',
        })
        .collect()
}

/// Renders a grouped sequence as indented text lines. Role headers are only
/// printed when `show_roles` is set.
pub fn render_entries<T, F>(entries: &[DisplayEntry<T>], show_roles: bool, label: F) -> Vec<String>
where
    F: Fn(&T) -> String,
{
    entries
        .iter()
        .filter_map(|entry| match entry {
            DisplayEntry::Ship(name) => Some(format!("== {} ==", name)),
            DisplayEntry::Department(dept) => Some(format!("  {}", dept)),
            DisplayEntry::Role(role) if show_roles => Some(format!("    - {}", role)),
            DisplayEntry::Role(_) => None,
            DisplayEntry::Record(record) => Some(format!("      {}", label(record))),
        })
        .collect()
}

/// Formats payroll rows as a fixed-width table.
pub fn render_payroll(rows: &[PayrollRow], window: &Window) -> Vec<String> {
    let mut lines = vec![
        format!("Payroll {} .. {}", window.start(), window.end()),
        format!("{:<24} {:<18} {:>6} {:>12}", "Name", "Role", "Days", "Gross pay"),
    ];
    if rows.is_empty() {
        lines.push("No staff worked during the selected period.".to_string());
    }
    for row in rows {
        lines.push(format!(
            "{:<24} {:<18} {:>6} {:>12}",
            row.staff.display_name(),
            row.staff.role,
            row.worked_days,
            row.gross_pay
        ));
    }
    lines
}

pub fn render_breakdown(breakdown: &[ShipDays]) -> Vec<String> {
    if breakdown.is_empty() {
        return vec!["No schedules found for this period.".to_string()];
    }
    breakdown
        .iter()
        .map(|b| format!("{:<24} {:>4} days", b.ship_name, b.days))
        .collect()
}

/// Writes rendered lines to a file under a `** title **` header.
pub fn write_lines_to_file(
    title: &str,
    lines: &[String],
    filename: &str,
) -> Result<(), std::io::Error> {
    let mut file = File::create(filename)?;
    writeln!(file, "** {} **", title)?;
    for line in lines {
        writeln!(file, "{}", line)?;
    }
    Ok(())
}
