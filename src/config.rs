use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::RosterError;
use crate::schedule::ReferenceOrder;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Runtime settings, read from the environment once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding `ships.csv`, `staff.csv` and `schedules.csv`.
    pub data_dir: PathBuf,
    pub port: u16,
    pub admin_password: String,
    pub log_level: String,
    pub ordering: ReferenceOrder,
}

/// Role lists as written in the ordering file. Missing departments keep
/// their default order.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct OrderingFile {
    #[serde(default)]
    deck: Option<Vec<String>>,
    #[serde(default)]
    engine: Option<Vec<String>>,
    #[serde(default)]
    steward: Option<Vec<String>>,
}

impl OrderingFile {
    fn into_order(self) -> ReferenceOrder {
        let defaults = ReferenceOrder::default();
        ReferenceOrder {
            deck: self.deck.unwrap_or(defaults.deck),
            engine: self.engine.unwrap_or(defaults.engine),
            steward: self.steward.unwrap_or(defaults.steward),
        }
    }
}

/// Parses a role ordering from JSON text.
pub fn parse_ordering(json: &str) -> Result<ReferenceOrder, RosterError> {
    let file: OrderingFile = serde_json::from_str(json)?;
    Ok(file.into_order())
}

pub fn load_ordering<P: AsRef<Path>>(path: P) -> Result<ReferenceOrder, RosterError> {
    let text = std::fs::read_to_string(path)?;
    parse_ordering(&text)
}

impl AppConfig {
    /// Reads `ROSTER_DATA_DIR`, `ROSTER_PORT`, `ADMIN_PASSWORD`, `ROSTER_LOG`
    /// and `ROSTER_ORDERING` from the process environment.
    pub fn from_env() -> Result<Self, RosterError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RosterError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = lookup("ROSTER_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let port = lookup("ROSTER_PORT")
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        // Default password, change this!
        let admin_password = lookup("ADMIN_PASSWORD").unwrap_or_else(|| "admin123".to_string());
        let log_level = lookup("ROSTER_LOG").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
        let ordering = match lookup("ROSTER_ORDERING") {
            Some(path) => load_ordering(path)?,
            None => ReferenceOrder::default(),
        };

        Ok(AppConfig {
            data_dir,
            port,
            admin_password,
            log_level,
            ordering,
        })
    }
}
