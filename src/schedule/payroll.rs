use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::types::Staff;

/// A staff member with their worked days for one payroll window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayrollRow {
    pub staff: Staff,
    pub worked_days: u32,
    /// Daily salary times worked days.
    pub gross_pay: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Name,
    Role,
    WorkedDays,
    Salary,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(SortKey::Name),
            "role" => Ok(SortKey::Role),
            "worked_days" | "workeddays" | "days" => Ok(SortKey::WorkedDays),
            "salary" => Ok(SortKey::Salary),
            other => Err(format!("Unknown sort key: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("Unknown sort order: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: SortKey,
    pub order: SortOrder,
}

/// Builds rows for staff who worked at least one day, keeping `staff` order.
pub fn payroll_rows(staff: &[Staff], totals: &BTreeMap<String, u32>) -> Vec<PayrollRow> {
    staff
        .iter()
        .filter_map(|member| {
            let worked_days = totals.get(&member.id).copied().unwrap_or(0);
            (worked_days > 0).then(|| PayrollRow {
                staff: member.clone(),
                worked_days,
                gross_pay: u64::from(member.salary) * u64::from(worked_days),
            })
        })
        .collect()
}

/// Stable sort of payroll rows by one column. Ties keep their current order.
pub fn sort_rows(rows: &mut [PayrollRow], spec: SortSpec) {
    rows.sort_by(|a, b| {
        let ordering = compare(a, b, spec.key);
        match spec.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

fn compare(a: &PayrollRow, b: &PayrollRow, key: SortKey) -> Ordering {
    match key {
        SortKey::Name => sort_name(&a.staff).cmp(&sort_name(&b.staff)),
        SortKey::Role => a.staff.role.to_lowercase().cmp(&b.staff.role.to_lowercase()),
        SortKey::WorkedDays => a.worked_days.cmp(&b.worked_days),
        SortKey::Salary => a.staff.salary.cmp(&b.staff.salary),
    }
}

fn sort_name(staff: &Staff) -> String {
    format!("{} {}", staff.first_name, staff.last_name).to_lowercase()
}
