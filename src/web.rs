use actix_files::Files;
use actix_web::{middleware, web, App, HttpRequest, HttpResponse, HttpServer, Result};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::display::staff_label;
use crate::error::RosterError;
use crate::form::{validate_print, validate_window, write_payroll_csv, PrintRequest, WindowRequest};
use crate::parser::{
    load_roster, read_schedules, read_ships, read_staff, SCHEDULES_FILE, SHIPS_FILE, STAFF_FILE,
};
use crate::schedule::calendar::{calendar_window, extend_after, extend_before, PAGE_DAYS};
use crate::schedule::{
    days_in, group_by_department, group_by_ship, payroll_rows, row_marks, ship_breakdown,
    ship_totals, sort_rows, worked_days_by_staff, DayMark, DisplayEntry, GroupPolicy, PayrollRow,
    ReferenceOrder, Schedule, ScheduleQuery, Ship, ShipDays, ShipScope, Window,
};
use crate::store::{Roster, ScheduleStore};

pub struct AppState {
    pub roster: RwLock<Roster>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(roster: Roster, config: AppConfig) -> Self {
        AppState {
            roster: RwLock::new(roster),
            config,
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Roster>> {
        self.roster
            .read()
            .map_err(|_| actix_web::error::ErrorInternalServerError("roster lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Roster>> {
        self.roster
            .write()
            .map_err(|_| actix_web::error::ErrorInternalServerError("roster lock poisoned"))
    }

    fn ordering(&self) -> &ReferenceOrder {
        &self.config.ordering
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    password: String,
}

#[derive(Serialize)]
pub struct PayrollResponse {
    window: Window,
    ship: ShipScope,
    rows: Vec<PayrollRow>,
    ship_totals: BTreeMap<String, u32>,
}

#[derive(Serialize)]
pub struct BreakdownResponse {
    staff_id: String,
    total_days: u32,
    ships: Vec<ShipDays>,
}

#[derive(Serialize)]
pub struct CalendarRow {
    schedule_id: String,
    staff_id: String,
    name: String,
    marks: Vec<DayMark>,
}

#[derive(Serialize)]
pub struct CalendarResponse {
    window: Window,
    /// Windows to request when scrolling one page back or forward.
    earlier: Window,
    later: Window,
    days: Vec<NaiveDate>,
    entries: Vec<DisplayEntry<CalendarRow>>,
}

#[derive(Serialize)]
pub struct PrintRow {
    staff_id: String,
    name: String,
    marks: Vec<DayMark>,
}

#[derive(Serialize)]
pub struct PrintResponse {
    window: Window,
    entries: Vec<DisplayEntry<PrintRow>>,
}

fn error_response(e: RosterError) -> HttpResponse {
    let body = serde_json::json!({"success": false, "error": e.to_string()});
    if e.is_client_error() {
        HttpResponse::BadRequest().json(body)
    } else {
        warn!(error = %e, "request failed");
        HttpResponse::InternalServerError().json(body)
    }
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(serde_json::json!({
        "success": false,
        "error": "Unauthorized"
    }))
}

fn is_admin(req: &HttpRequest, state: &AppState) -> bool {
    let password = req
        .headers()
        .get("X-Admin-Password")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    password == state.config.admin_password
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Ships listed in scope order; a single-ship scope keeps only that ship.
fn ships_in_scope(ships: Vec<Ship>, scope: &ShipScope) -> Vec<Ship> {
    ships
        .into_iter()
        .filter(|s| scope.matches(Some(s.id.as_str())))
        .collect()
}

// Admin login endpoint
async fn admin_login(
    req: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if req.password == state.config.admin_password {
        Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
    } else {
        Ok(HttpResponse::Unauthorized().json(serde_json::json!({
            "success": false,
            "error": "Invalid password"
        })))
    }
}

// Admin CSV upload endpoint: replaces one table and swaps the roster snapshot.
// Parsing, the file write and the swap all happen under one write guard.
async fn admin_upload(
    req: HttpRequest,
    table: web::Path<String>,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&req, &state) {
        return Ok(unauthorized());
    }

    let mut roster = state.write()?;
    let mut next = roster.clone();
    let (file, parsed) = match table.as_str() {
        "ships" => (SHIPS_FILE, read_ships(&body[..]).map(|rows| next.ships = rows)),
        "staff" => (STAFF_FILE, read_staff(&body[..]).map(|rows| next.staff = rows)),
        "schedules" => (
            SCHEDULES_FILE,
            read_schedules(&body[..]).map(|rows| next.schedules = rows),
        ),
        _ => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "error": "Invalid table"
            })))
        }
    };
    // A body that fails to parse is a bad upload, not a server fault.
    if let Err(e) = parsed {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": format!("Failed to process CSV: {}", e)
        })));
    }

    let path = state.config.data_dir.join(file);
    if let Err(e) = std::fs::write(&path, &body) {
        return Ok(error_response(e.into()));
    }

    *roster = next;
    info!(table = table.as_str(), path = %path.display(), "roster table replaced");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Roster updated successfully"
    })))
}

// Admin reload endpoint: re-reads every table from the data directory
async fn admin_reload(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse> {
    if !is_admin(&req, &state) {
        return Ok(unauthorized());
    }

    // Held while reading so an upload cannot land between the read and the swap.
    let mut roster = state.write()?;
    let next = match load_roster(&state.config.data_dir) {
        Ok(next) => next,
        Err(e) => return Ok(error_response(e)),
    };
    *roster = next;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "ships": roster.ships.len(),
        "staff": roster.staff.len(),
        "schedules": roster.schedules.len()
    })))
}

async fn get_ships(state: web::Data<AppState>) -> Result<HttpResponse> {
    let ships = state.read()?.fetch_ships();
    Ok(HttpResponse::Ok().json(ships))
}

fn compute_payroll(
    roster: &Roster,
    req: &WindowRequest,
) -> std::result::Result<PayrollResponse, RosterError> {
    let q = validate_window(req)?;

    let query = ScheduleQuery::new(q.window).with_ship(q.ship.clone());
    let schedules = roster.fetch_schedules(&query);
    let totals = worked_days_by_staff(&schedules, &q.window);
    let mut rows = payroll_rows(&roster.fetch_staff(&ShipScope::All), &totals);
    if let Some(spec) = q.sort {
        sort_rows(&mut rows, spec);
    }
    Ok(PayrollResponse {
        window: q.window,
        ship: q.ship,
        rows,
        ship_totals: ship_totals(&schedules, &roster.fetch_ships(), &q.window),
    })
}

// Payroll endpoint
async fn get_payroll(
    query: web::Query<WindowRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let roster = state.read()?;
    match compute_payroll(&roster, &query) {
        Ok(payroll) => Ok(HttpResponse::Ok().json(payroll)),
        Err(e) => Ok(error_response(e)),
    }
}

async fn export_payroll(
    query: web::Query<WindowRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let roster = state.read()?;
    let PayrollResponse { window, rows, .. } = match compute_payroll(&roster, &query) {
        Ok(payroll) => payroll,
        Err(e) => return Ok(error_response(e)),
    };

    let mut buf = Vec::new();
    if let Err(e) = write_payroll_csv(&rows, &window, &mut buf) {
        return Ok(error_response(e));
    }
    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"payroll_{}_{}.csv\"", window.start(), window.end()),
        ))
        .body(buf))
}

// Worked days per ship for one staff member
async fn get_breakdown(
    staff_id: web::Path<String>,
    query: web::Query<WindowRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let q = match validate_window(&query) {
        Ok(q) => q,
        Err(e) => return Ok(error_response(e)),
    };
    let roster = state.read()?;

    let schedule_query = ScheduleQuery::new(q.window)
        .with_ship(q.ship)
        .with_staff(staff_id.as_str());
    let schedules = roster.fetch_schedules(&schedule_query);
    let ships = ship_breakdown(&schedules, &staff_id, &roster.fetch_ships(), &q.window);

    Ok(HttpResponse::Ok().json(BreakdownResponse {
        staff_id: staff_id.into_inner(),
        total_days: ships.iter().map(|s| s.days).sum(),
        ships,
    }))
}

// Calendar grid rows: schedules grouped ship -> department -> role
async fn get_calendar(
    query: web::Query<WindowRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let q = match validate_window(&query) {
        Ok(q) => q,
        Err(e) => return Ok(error_response(e)),
    };
    let window = match calendar_window(q.window) {
        Ok(window) => window,
        Err(e) => return Ok(error_response(e.into())),
    };
    let roster = state.read()?;

    let rows = roster.fetch_staff_schedules(&ScheduleQuery::new(window).with_ship(q.ship.clone()));
    let ships = ships_in_scope(roster.fetch_ships(), &q.ship);
    let grouping = group_by_ship(&ships, &rows, state.ordering(), GroupPolicy::calendar());
    if !grouping.unplaced.is_empty() {
        warn!(
            count = grouping.unplaced.len(),
            "schedules with unlisted roles left off the calendar"
        );
    }

    let today = today();
    let entries = grouping
        .entries
        .into_iter()
        .map(|entry| {
            entry.map(|row| CalendarRow {
                marks: row_marks(&[&row.schedule], &window, today),
                schedule_id: row.schedule.id,
                staff_id: row.staff.id.clone(),
                name: staff_label(&row.staff),
            })
        })
        .collect();

    Ok(HttpResponse::Ok().json(CalendarResponse {
        window,
        earlier: extend_before(&window, PAGE_DAYS),
        later: extend_after(&window, PAGE_DAYS),
        days: days_in(&window),
        entries,
    }))
}

// Print view: staff grouped department -> role for the month up to the selected day
async fn get_print(
    query: web::Query<PrintRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let (window, scope) = match validate_print(&query) {
        Ok(v) => v,
        Err(e) => return Ok(error_response(e)),
    };
    let roster = state.read()?;

    let staff = roster.fetch_staff(&ShipScope::All);
    let schedules = roster.fetch_schedules(&ScheduleQuery::new(window));
    let grouping = group_by_department(&staff, &scope, state.ordering(), GroupPolicy::compact());

    let today = today();
    let entries = grouping
        .entries
        .into_iter()
        .map(|entry| {
            entry.map(|member| {
                let own: Vec<&Schedule> = schedules
                    .iter()
                    .filter(|s| s.staff_id == member.id)
                    .collect();
                PrintRow {
                    marks: row_marks(&own, &window, today),
                    name: member.display_name(),
                    staff_id: member.id,
                }
            })
        })
        .collect();

    Ok(HttpResponse::Ok().json(PrintResponse { window, entries }))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/login", web::post().to(admin_login))
        .route("/api/upload/{table}", web::post().to(admin_upload))
        .route("/api/reload", web::post().to(admin_reload))
        .route("/api/ships", web::get().to(get_ships))
        .route("/api/payroll", web::get().to(get_payroll))
        .route("/api/payroll/export", web::get().to(export_payroll))
        .route("/api/payroll/{staff_id}/breakdown", web::get().to(get_breakdown))
        .route("/api/calendar", web::get().to(get_calendar))
        .route("/api/print", web::get().to(get_print));
}

pub async fn start_server(port: u16, roster: Roster, config: AppConfig) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState::new(roster, config));

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(routes)
            .service(Files::new("/static", "static").show_files_listing())
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
