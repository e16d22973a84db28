use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{RosterError, WindowError};
use crate::parser::parse_date;
use crate::schedule::calendar::print_window;
use crate::schedule::{ShipScope, SortKey, SortOrder, SortSpec, Window};

/// Window and ship query parameters as they arrive from the dashboard.
#[derive(Debug, Default, Deserialize)]
pub struct WindowRequest {
    pub start: Option<String>,
    pub end: Option<String>,
    pub ship: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

/// Print view parameters: a selected day and a ship.
#[derive(Debug, Default, Deserialize)]
pub struct PrintRequest {
    pub date: Option<String>,
    pub ship: Option<String>,
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedQuery {
    pub window: Window,
    pub ship: ShipScope,
    pub sort: Option<SortSpec>,
}

fn optional_date(raw: Option<&str>) -> Result<Option<NaiveDate>, RosterError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_date(value).map(Some),
    }
}

/// Validates a window request. Missing dates are rejected, never defaulted.
pub fn validate_window(req: &WindowRequest) -> Result<ValidatedQuery, RosterError> {
    let start = optional_date(req.start.as_deref())?;
    let end = optional_date(req.end.as_deref())?;
    let window = Window::from_parts(start, end)?;

    let sort = match req.sort.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(key) => {
            let key = key.parse::<SortKey>().map_err(|_| invalid_sort(req))?;
            let order = match req.order.as_deref() {
                None => SortOrder::default(),
                Some(o) => o.parse::<SortOrder>().map_err(|_| invalid_sort(req))?,
            };
            Some(SortSpec { key, order })
        }
    };

    Ok(ValidatedQuery {
        window,
        ship: ShipScope::parse(req.ship.as_deref()),
        sort,
    })
}

fn invalid_sort(req: &WindowRequest) -> RosterError {
    RosterError::InvalidSort {
        key: req.sort.clone().unwrap_or_default(),
        order: req.order.clone().unwrap_or_default(),
    }
}

/// Validates a print request: the window is the month leading up to `date`.
pub fn validate_print(req: &PrintRequest) -> Result<(Window, ShipScope), RosterError> {
    let date = optional_date(req.date.as_deref())?.ok_or(WindowError::MissingEnd)?;
    Ok((print_window(date), ShipScope::parse(req.ship.as_deref())))
}
