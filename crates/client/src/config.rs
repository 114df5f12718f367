//! Runtime configuration, read once from the environment at start-up.
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use gridloc_shared::grid::{Cell, GridSpec, DEFAULT_CELL_SIZE, DEFAULT_GRID_SIZE};
use gridloc_shared::models::{DEFAULT_ACCESS_POINTS, DEFAULT_MISSING_RSSI};
use thiserror::Error;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_POLL_MS: u64 = 1000;
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;
/// Platforms throttle Wi-Fi scans hard; one manual scan per 30 s.
pub const DEFAULT_SCAN_INTERVAL_MS: u64 = 30_000;
pub const DEFAULT_START: Cell = Cell::new(1, 7);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{var}: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub server_url: String,
    pub grid: GridSpec,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub start_location: Cell,
    pub access_points: Vec<String>,
    pub missing_rssi: i32,
    pub scan_interval: Duration,
    /// JSON list of sensor snapshots replayed by the headless shell.
    pub sensor_file: Option<PathBuf>,
    /// Where the headless shell writes each frame as SVG.
    pub svg_out: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            server_url: DEFAULT_SERVER_URL.to_string(),
            grid: GridSpec::default(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_MS),
            request_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            start_location: DEFAULT_START,
            access_points: DEFAULT_ACCESS_POINTS.iter().map(|s| s.to_string()).collect(),
            missing_rssi: DEFAULT_MISSING_RSSI,
            scan_interval: Duration::from_millis(DEFAULT_SCAN_INTERVAL_MS),
            sensor_file: None,
            svg_out: None,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any `name -> value` source. Unset or empty variables take
    /// their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let server_url = get("GRIDLOC_SERVER_URL")
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

        let size: u32 =
            parse_var(get("GRIDLOC_GRID_SIZE"), "GRIDLOC_GRID_SIZE", DEFAULT_GRID_SIZE)?;
        if size == 0 {
            return Err(invalid("GRIDLOC_GRID_SIZE", "must be at least 1"));
        }
        let cell_size: f64 =
            parse_var(get("GRIDLOC_CELL_SIZE"), "GRIDLOC_CELL_SIZE", DEFAULT_CELL_SIZE)?;
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(invalid("GRIDLOC_CELL_SIZE", "must be a positive number"));
        }
        let grid = GridSpec::new(size, cell_size);

        let poll_interval = millis(get("GRIDLOC_POLL_MS"), "GRIDLOC_POLL_MS", DEFAULT_POLL_MS)?;
        let request_timeout =
            millis(get("GRIDLOC_TIMEOUT_MS"), "GRIDLOC_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?;
        let scan_interval = millis(
            get("GRIDLOC_SCAN_INTERVAL_MS"),
            "GRIDLOC_SCAN_INTERVAL_MS",
            DEFAULT_SCAN_INTERVAL_MS,
        )?;

        let start_location = match get("GRIDLOC_START") {
            Some(raw) => parse_cell(&raw).ok_or_else(|| {
                invalid("GRIDLOC_START", format!("expected `row,col`, got `{raw}`"))
            })?,
            None => DEFAULT_START,
        };
        if !grid.contains(start_location) {
            return Err(invalid(
                "GRIDLOC_START",
                format!("{start_location} is outside a {size}x{size} grid"),
            ));
        }

        let access_points = match get("GRIDLOC_ACCESS_POINTS") {
            Some(raw) => {
                let aps: Vec<String> = raw
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                if aps.is_empty() {
                    return Err(invalid("GRIDLOC_ACCESS_POINTS", "no access points listed"));
                }
                aps
            }
            None => DEFAULT_ACCESS_POINTS.iter().map(|s| s.to_string()).collect(),
        };

        let missing_rssi = parse_var(
            get("GRIDLOC_MISSING_RSSI"),
            "GRIDLOC_MISSING_RSSI",
            DEFAULT_MISSING_RSSI,
        )?;

        Ok(ClientConfig {
            server_url,
            grid,
            poll_interval,
            request_timeout,
            start_location,
            access_points,
            missing_rssi,
            scan_interval,
            sensor_file: get("GRIDLOC_SENSOR_FILE").map(PathBuf::from),
            svg_out: get("GRIDLOC_SVG_OUT").map(PathBuf::from),
        })
    }
}

fn invalid(var: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError {
        var,
        reason: reason.into(),
    }
}

fn parse_var<T>(raw: Option<String>, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| invalid(var, format!("`{raw}`: {e}"))),
        None => Ok(default),
    }
}

fn millis(raw: Option<String>, var: &'static str, default: u64) -> Result<Duration, ConfigError> {
    let ms: u64 = parse_var(raw, var, default)?;
    if ms == 0 {
        return Err(invalid(var, "must be greater than zero"));
    }
    Ok(Duration::from_millis(ms))
}

/// `"3,4"` or `"3, 4"` to a cell.
pub fn parse_cell(raw: &str) -> Option<Cell> {
    let (row, col) = raw.split_once(',')?;
    Some(Cell::new(row.trim().parse().ok()?, col.trim().parse().ok()?))
}
