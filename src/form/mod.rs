pub mod export;
pub mod query;

pub use export::{export_payroll_to_csv, write_payroll_csv};
pub use query::{validate_print, validate_window, PrintRequest, ValidatedQuery, WindowRequest};
