use chrono::Local;
use tracing::info;

use crew_roster::config::AppConfig;
use crew_roster::display::{
    render_breakdown, render_entries, render_marks, render_payroll, staff_label,
    write_lines_to_file,
};
use crew_roster::form::{export_payroll_to_csv, validate_window, WindowRequest};
use crew_roster::logging;
use crew_roster::parser::load_roster;
use crew_roster::schedule::calendar::{calendar_window, month_window};
use crew_roster::schedule::{
    group_by_ship, payroll_rows, row_marks, ship_breakdown, sort_rows, worked_days_by_staff,
    GroupPolicy, ScheduleQuery, ShipScope, SortKey, SortOrder, SortSpec,
};
use crew_roster::store::{Roster, ScheduleStore};
use crew_roster::web;

const USAGE: &str = "\
usage:
  crew-roster web [port]
  crew-roster payroll [start end [ship]]
  crew-roster breakdown <staff_id> <start> <end> [ship]
  crew-roster calendar <start> <end> [ship]";

fn window_request(args: &[String], from: usize) -> WindowRequest {
    WindowRequest {
        start: args.get(from).cloned(),
        end: args.get(from + 1).cloned(),
        ship: args.get(from + 2).cloned(),
        ..WindowRequest::default()
    }
}

fn run_payroll(roster: &Roster, args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    // No dates given: the current month, like the payroll page opens with.
    let req = if args.len() > 2 {
        window_request(args, 2)
    } else {
        let month = month_window(Local::now().date_naive());
        WindowRequest {
            start: Some(month.start().to_string()),
            end: Some(month.end().to_string()),
            ..WindowRequest::default()
        }
    };
    let q = validate_window(&req)?;

    let schedules = roster.fetch_schedules(&ScheduleQuery::new(q.window).with_ship(q.ship));
    let totals = worked_days_by_staff(&schedules, &q.window);
    let mut rows = payroll_rows(&roster.fetch_staff(&ShipScope::All), &totals);
    sort_rows(&mut rows, SortSpec { key: SortKey::Name, order: SortOrder::Asc });

    let lines = render_payroll(&rows, &q.window);
    for line in &lines {
        println!("{}", line);
    }

    write_lines_to_file("Payroll", &lines, "payroll.txt")?;
    export_payroll_to_csv(&rows, &q.window, std::path::Path::new("payroll.csv"))?;
    println!("\nPayroll saved to:");
    println!("  - payroll.txt");
    println!("  - payroll.csv");
    Ok(())
}

fn run_breakdown(roster: &Roster, args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let staff_id = args.get(2).ok_or(USAGE)?;
    let q = validate_window(&window_request(args, 3))?;

    let query = ScheduleQuery::new(q.window).with_ship(q.ship).with_staff(staff_id.as_str());
    let schedules = roster.fetch_schedules(&query);
    let breakdown = ship_breakdown(&schedules, staff_id, &roster.fetch_ships(), &q.window);

    let name = roster
        .staff_by_id(staff_id)
        .map(staff_label)
        .unwrap_or_else(|| staff_id.clone());
    println!("{} ({} .. {})", name, q.window.start(), q.window.end());
    for line in render_breakdown(&breakdown) {
        println!("  {}", line);
    }
    println!("  total: {} days", breakdown.iter().map(|b| b.days).sum::<u32>());
    Ok(())
}

fn run_calendar(
    roster: &Roster,
    config: &AppConfig,
    args: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let q = validate_window(&window_request(args, 2))?;
    let window = calendar_window(q.window)?;
    let today = Local::now().date_naive();

    let query = ScheduleQuery::new(window).with_ship(q.ship.clone());
    let rows = roster.fetch_staff_schedules(&query);
    let ships: Vec<_> = roster
        .fetch_ships()
        .into_iter()
        .filter(|s| q.ship.matches(Some(s.id.as_str())))
        .collect();
    let grouping = group_by_ship(&ships, &rows, &config.ordering, GroupPolicy::calendar());

    let lines = render_entries(&grouping.entries, false, |row| {
        format!(
            "{:<32} {}",
            staff_label(&row.staff),
            render_marks(&row_marks(&[&row.schedule], &window, today))
        )
    });
    for line in &lines {
        println!("{}", line);
    }
    if !grouping.unplaced.is_empty() {
        println!(
            "\n{} schedule(s) have a role outside the configured order:",
            grouping.unplaced.len()
        );
        for row in &grouping.unplaced {
            println!("  - {}", staff_label(&row.staff));
        }
    }

    write_lines_to_file("Calendar", &lines, "calendar.txt")?;
    println!("\nCalendar saved to calendar.txt");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    logging::init(&config.log_level);

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("payroll");

    info!(data_dir = %config.data_dir.display(), "loading roster");
    let roster = load_roster(&config.data_dir)?;

    match command {
        "web" => {
            let port = args
                .get(2)
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(config.port);

            println!("Starting web server on port {}...", port);
            println!("Access the site at http://localhost:{}", port);

            web::start_server(port, roster, config).await?;
        }
        "payroll" => run_payroll(&roster, &args)?,
        "breakdown" => run_breakdown(&roster, &args)?,
        "calendar" => run_calendar(&roster, &config, &args)?,
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }

    Ok(())
}
