//! Sensor readings and labeled training samples.
//!
//! Scan and magnetometer dumps use the same text the collection screen
//! shows the user: one `SSID: level` line per access point, and a
//! `Magnetometer Data:` header followed by `X: ..`, `Y: ..`, `Z: ..`.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::grid::{Cell, GridSpec};
use crate::models::rssi_key;

/// Latest Wi-Fi scan: access point identifier to RSSI in dBm.
/// An access point that wasn't seen is simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WifiScan {
    pub readings: BTreeMap<String, i32>,
}

impl WifiScan {
    pub fn get(&self, access_point: &str) -> Option<i32> {
        self.readings.get(access_point).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }
}

impl<S: Into<String>> FromIterator<(S, i32)> for WifiScan {
    fn from_iter<I: IntoIterator<Item = (S, i32)>>(iter: I) -> Self {
        WifiScan {
            readings: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MagVector {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// What one poll cycle sends to the prediction endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    pub wifi: WifiScan,
    pub mag: MagVector,
}

/// Build the prediction body. Every access point gets an integer; a missing
/// one is sent as `missing_rssi`.
pub fn prediction_body(
    snapshot: &SensorSnapshot,
    access_points: &[String],
    missing_rssi: i32,
) -> serde_json::Value {
    let mut body = serde_json::Map::new();
    for ap in access_points {
        let rssi = snapshot.wifi.get(ap).unwrap_or(missing_rssi);
        body.insert(rssi_key(ap), serde_json::json!(rssi));
    }
    body.insert("mag_x".into(), serde_json::json!(snapshot.mag.x));
    body.insert("mag_y".into(), serde_json::json!(snapshot.mag.y));
    body.insert("mag_z".into(), serde_json::json!(snapshot.mag.z));
    serde_json::Value::Object(body)
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SampleError {
    #[error("WiFi RSSI data is empty")]
    EmptyScan,
    #[error("Magnetometer data is empty")]
    MissingMagnetometer,
    #[error("Invalid magnetometer data: expected 3 axes, found {0}")]
    InvalidMagnetometer(usize),
    #[error("Cell {0} is outside the grid")]
    OutOfRange(Cell),
}

/// Parse a scan dump. Lines that aren't `SSID: level` are skipped with a warning.
pub fn parse_scan_dump(text: &str) -> WifiScan {
    let mut scan = WifiScan::default();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let parsed = line
            .rsplit_once(": ")
            .and_then(|(ssid, level)| Some((ssid, level.trim().parse::<i32>().ok()?)));
        match parsed {
            Some((ssid, level)) if !ssid.is_empty() => {
                scan.readings.insert(ssid.to_string(), level);
            }
            _ => warn!(line, "invalid WiFi RSSI line"),
        }
    }
    scan
}

pub fn format_scan_dump(scan: &WifiScan) -> String {
    scan.readings
        .iter()
        .map(|(ssid, level)| format!("{ssid}: {level}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse a magnetometer dump. Every `label: number` line counts as an axis;
/// exactly three are required.
pub fn parse_mag_dump(text: &str) -> Result<MagVector, SampleError> {
    if text.trim().is_empty() {
        return Err(SampleError::MissingMagnetometer);
    }
    let values: Vec<f32> = text
        .lines()
        .filter_map(|line| line.split_once(": ")?.1.trim().parse::<f32>().ok())
        .collect();
    match values[..] {
        [x, y, z] => Ok(MagVector { x, y, z }),
        _ => Err(SampleError::InvalidMagnetometer(values.len())),
    }
}

pub fn format_mag_dump(mag: &MagVector) -> String {
    format!(
        "Magnetometer Data:\nX: {}\nY: {}\nZ: {}",
        mag.x, mag.y, mag.z
    )
}

/// A labeled reading for `POST /phone_data`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSample {
    pub cell: Cell,
    /// Floor height; single-floor deployments always send 0.
    pub z: i64,
    pub rssi: Vec<(String, Option<i32>)>,
    pub mag: MagVector,
}

impl TrainingSample {
    /// Validate local readings for `cell`. Nothing is sent if this fails.
    pub fn build(
        cell: Cell,
        spec: &GridSpec,
        scan: &WifiScan,
        mag: Option<MagVector>,
        access_points: &[String],
    ) -> Result<Self, SampleError> {
        if !spec.contains(cell) {
            return Err(SampleError::OutOfRange(cell));
        }
        if scan.is_empty() {
            return Err(SampleError::EmptyScan);
        }
        let mag = mag.ok_or(SampleError::MissingMagnetometer)?;
        let rssi = access_points
            .iter()
            .map(|ap| (ap.clone(), scan.get(ap)))
            .collect();
        Ok(TrainingSample { cell, z: 0, rssi, mag })
    }

    /// Same as [`TrainingSample::build`] but from the text dumps.
    pub fn from_dumps(
        cell: Cell,
        spec: &GridSpec,
        scan_text: &str,
        mag_text: &str,
        access_points: &[String],
    ) -> Result<Self, SampleError> {
        let scan = parse_scan_dump(scan_text);
        if scan.is_empty() {
            return Err(SampleError::EmptyScan);
        }
        let mag = parse_mag_dump(mag_text)?;
        Self::build(cell, spec, &scan, Some(mag), access_points)
    }

    /// Wire body; an access point that wasn't seen is sent as `null`.
    pub fn to_body(&self) -> serde_json::Value {
        let mut body = serde_json::Map::new();
        body.insert("x".into(), serde_json::json!(self.cell.row));
        body.insert("y".into(), serde_json::json!(self.cell.col));
        body.insert("z".into(), serde_json::json!(self.z));
        for (ap, rssi) in &self.rssi {
            body.insert(rssi_key(ap), serde_json::json!(rssi));
        }
        body.insert("mag_x".into(), serde_json::json!(self.mag.x));
        body.insert("mag_y".into(), serde_json::json!(self.mag.y));
        body.insert("mag_z".into(), serde_json::json!(self.mag.z));
        serde_json::Value::Object(body)
    }
}
