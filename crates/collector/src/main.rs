//! Submit one labeled training sample from saved scan and magnetometer dumps.
//!
//! ```text
//! gridloc-collector --row 3 --col 9 --scan scan.txt --mag mag.txt [--url URL]
//! ```
use std::path::Path;

use gridloc_shared::grid::{Cell, GridSpec, DEFAULT_CELL_SIZE, DEFAULT_GRID_SIZE};
use gridloc_shared::models::{MessageResponse, DEFAULT_ACCESS_POINTS};
use gridloc_shared::sample::{format_mag_dump, format_scan_dump, TrainingSample, WifiScan};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://127.0.0.1:5000";
const USAGE: &str = "Usage: gridloc-collector --row R --col C --scan FILE --mag FILE \
    [--url URL] [--aps AP1,AP2,..] [--grid-size N] [--dry-run]";

#[derive(Debug, Clone, PartialEq)]
struct Options {
    cell: Cell,
    scan_file: String,
    mag_file: String,
    url: String,
    access_points: Vec<String>,
    grid_size: u32,
    dry_run: bool,
}

fn get_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().skip_while(|a| *a != flag).nth(1).cloned()
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn required(args: &[String], flag: &str) -> Result<String, String> {
    get_arg(args, flag).ok_or_else(|| format!("{flag} is required"))
}

fn parse_options(args: &[String]) -> Result<Options, String> {
    let row = required(args, "--row")?;
    let col = required(args, "--col")?;
    let row: u32 = row.parse().map_err(|_| format!("invalid --row: {row}"))?;
    let col: u32 = col.parse().map_err(|_| format!("invalid --col: {col}"))?;

    let grid_size = match get_arg(args, "--grid-size") {
        Some(raw) => raw
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| format!("invalid --grid-size: {raw}"))?,
        None => DEFAULT_GRID_SIZE,
    };

    let url = get_arg(args, "--url")
        .or_else(|| std::env::var("GRIDLOC_SERVER_URL").ok())
        .unwrap_or_else(|| DEFAULT_URL.to_string());

    let access_points = match get_arg(args, "--aps") {
        Some(raw) => raw
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        None => DEFAULT_ACCESS_POINTS.iter().map(|s| s.to_string()).collect(),
    };

    Ok(Options {
        cell: Cell::new(row, col),
        scan_file: required(args, "--scan")?,
        mag_file: required(args, "--mag")?,
        url: url.trim_end_matches('/').to_string(),
        access_points,
        grid_size,
        dry_run: has_flag(args, "--dry-run"),
    })
}

fn read_file(path: &str) -> Result<String, String> {
    std::fs::read_to_string(Path::new(path)).map_err(|e| format!("Failed to read {path}: {e}"))
}

fn load_sample(opts: &Options) -> Result<TrainingSample, String> {
    let scan_text = read_file(&opts.scan_file)?;
    let mag_text = read_file(&opts.mag_file)?;
    let spec = GridSpec::new(opts.grid_size, DEFAULT_CELL_SIZE);
    TrainingSample::from_dumps(opts.cell, &spec, &scan_text, &mag_text, &opts.access_points)
        .map_err(|e| e.to_string())
}

/// What the sample actually carries, in dump form: only the tracked access
/// points that were seen, then the magnetometer axes.
fn readings_report(sample: &TrainingSample) -> String {
    let seen: WifiScan = sample
        .rssi
        .iter()
        .filter_map(|(ap, rssi)| Some((ap.as_str(), (*rssi)?)))
        .collect();
    format!("{}\n{}", format_scan_dump(&seen), format_mag_dump(&sample.mag))
}

fn submit(
    client: &reqwest::blocking::Client,
    url: &str,
    body: &serde_json::Value,
) -> Result<String, String> {
    let endpoint = format!("{url}/phone_data");
    info!(%endpoint, "sending training sample");
    let resp = client
        .post(&endpoint)
        .json(body)
        .send()
        .map_err(|e| format!("Failed to send data: {e}"))?;
    let status = resp.status();
    let text = resp
        .text()
        .map_err(|e| format!("Failed to read response: {e}"))?;
    debug!(%status, %text, "response from server");
    let message = serde_json::from_str::<MessageResponse>(&text)
        .map(|m| m.message)
        .unwrap_or(text);
    if status.is_success() {
        Ok(message)
    } else {
        Err(format!("Server returned {status}: {message}"))
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let opts = parse_options(&args).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("{USAGE}");
        std::process::exit(1);
    });

    let sample = load_sample(&opts).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
    let body = sample.to_body();

    if opts.dry_run {
        eprintln!("{}", readings_report(&sample));
        println!("{body}");
        return;
    }

    let client = reqwest::blocking::Client::new();
    match submit(&client, &opts.url, &body) {
        Ok(message) => println!("{message}"),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("gridloc-collector")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    fn temp_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_get_arg() {
        let a = args(&["--row", "3", "--col", "9"]);
        assert_eq!(get_arg(&a, "--row"), Some("3".to_string()));
        assert_eq!(get_arg(&a, "--col"), Some("9".to_string()));
        assert_eq!(get_arg(&a, "--url"), None);
    }

    #[test]
    fn test_parse_options() {
        let a = args(&[
            "--row", "3", "--col", "9", "--scan", "s.txt", "--mag", "m.txt", "--url",
            "http://10.0.0.2:5000/", "--aps", "a, b", "--dry-run",
        ]);
        let opts = parse_options(&a).unwrap();
        assert_eq!(opts.cell, Cell::new(3, 9));
        assert_eq!(opts.url, "http://10.0.0.2:5000");
        assert_eq!(opts.access_points, vec!["a", "b"]);
        assert_eq!(opts.grid_size, 16);
        assert!(opts.dry_run);
    }

    #[test]
    fn test_parse_options_missing_flag() {
        let a = args(&["--row", "3", "--col", "9", "--scan", "s.txt"]);
        assert_eq!(parse_options(&a), Err("--mag is required".to_string()));
    }

    #[test]
    fn test_parse_options_bad_row() {
        let a = args(&["--row", "-3", "--col", "9", "--scan", "s", "--mag", "m"]);
        assert!(parse_options(&a).unwrap_err().contains("--row"));
    }

    #[test]
    fn test_load_sample() {
        let scan = temp_file("MG2024: -51\nnot a reading\nYaSeR_Osama: -67\n");
        let mag = temp_file("Magnetometer Data:\nX: 12.5\nY: -3.0\nZ: 40.25\n");
        let opts = Options {
            cell: Cell::new(3, 9),
            scan_file: scan.path().display().to_string(),
            mag_file: mag.path().display().to_string(),
            url: DEFAULT_URL.to_string(),
            access_points: DEFAULT_ACCESS_POINTS.iter().map(|s| s.to_string()).collect(),
            grid_size: 16,
            dry_run: true,
        };
        let body = load_sample(&opts).unwrap().to_body();
        assert_eq!(body["x"], 3);
        assert_eq!(body["y"], 9);
        assert_eq!(body["rssi_MG2024"], -51);
        assert_eq!(body["rssi_YaSeR_Osama"], -67);
        assert!(body["rssi_Samas_iPhone"].is_null());
        assert_eq!(body["mag_x"], 12.5);
    }

    #[test]
    fn test_readings_report_lists_seen_access_points() {
        let scan = temp_file("MG2024: -51\nOther: -40\n");
        let mag = temp_file("X: 12.5\nY: -3\nZ: 40.25");
        let opts = Options {
            cell: Cell::new(3, 9),
            scan_file: scan.path().display().to_string(),
            mag_file: mag.path().display().to_string(),
            url: DEFAULT_URL.to_string(),
            access_points: vec!["MG2024".to_string(), "Samas_iPhone".to_string()],
            grid_size: 16,
            dry_run: true,
        };
        let report = readings_report(&load_sample(&opts).unwrap());
        assert_eq!(
            report,
            "MG2024: -51\nMagnetometer Data:\nX: 12.5\nY: -3\nZ: 40.25"
        );
    }

    #[test]
    fn test_load_sample_rejects_empty_scan() {
        let scan = temp_file("\n");
        let mag = temp_file("X: 1\nY: 2\nZ: 3");
        let opts = Options {
            cell: Cell::new(1, 1),
            scan_file: scan.path().display().to_string(),
            mag_file: mag.path().display().to_string(),
            url: DEFAULT_URL.to_string(),
            access_points: vec!["MG2024".to_string()],
            grid_size: 16,
            dry_run: true,
        };
        assert_eq!(load_sample(&opts).unwrap_err(), "WiFi RSSI data is empty");
    }

    #[test]
    fn test_load_sample_rejects_cell_outside_grid() {
        let scan = temp_file("MG2024: -51");
        let mag = temp_file("X: 1\nY: 2\nZ: 3");
        let opts = Options {
            cell: Cell::new(9, 1),
            scan_file: scan.path().display().to_string(),
            mag_file: mag.path().display().to_string(),
            url: DEFAULT_URL.to_string(),
            access_points: vec!["MG2024".to_string()],
            grid_size: 8,
            dry_run: true,
        };
        assert!(load_sample(&opts).unwrap_err().contains("outside the grid"));
    }

    #[test]
    fn test_missing_file() {
        let err = read_file("/nonexistent/gridloc/scan.txt").unwrap_err();
        assert!(err.starts_with("Failed to read"));
    }
}
