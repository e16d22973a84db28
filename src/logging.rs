use tracing_subscriber::EnvFilter;

/// Initialize tracing at `level` for this crate and actix-web.
///
/// `RUST_LOG` overrides the configured level if set. Records emitted through
/// the `log` crate (actix's request logger) are forwarded to the same
/// subscriber.
pub fn init(level: &str) {
    let default_filter = format!("crew_roster={level},actix_web={level}");
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
