use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::grid::Cell;

/// Access points the reference deployment's model was trained on.
pub const DEFAULT_ACCESS_POINTS: [&str; 4] =
    ["HUAWEI_CUTE_BD57", "YaSeR_Osama", "MG2024", "Samas_iPhone"];

/// RSSI floor sent for an access point missing from the latest scan.
pub const DEFAULT_MISSING_RSSI: i32 = -100;

/// Body key for an access point's RSSI, e.g. `rssi_MG2024`.
pub fn rssi_key(access_point: &str) -> String {
    format!("rssi_{access_point}")
}

/// The backend stores coordinates as floats, so `3` and `3.0` both mean row 3.
/// Anything with a fractional part is malformed.
fn grid_index<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let n = serde_json::Number::deserialize(deserializer)?;
    if let Some(v) = n.as_i64() {
        return Ok(v);
    }
    match n.as_f64() {
        Some(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Ok(v as i64),
        _ => Err(D::Error::custom(format!(
            "expected an integral grid index, got {n}"
        ))),
    }
}

/// One labeled cell from `GET /coordinates`. Extra fields (`height`) are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CoordinateEntry {
    #[serde(deserialize_with = "grid_index")]
    pub row: i64,
    #[serde(deserialize_with = "grid_index")]
    pub col: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathRequest {
    pub start: [u32; 2],
    pub goal: [u32; 2],
}

impl PathRequest {
    pub fn new(start: Cell, goal: Cell) -> Self {
        PathRequest {
            start: start.pair(),
            goal: goal.pair(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PathResponse {
    pub path: Vec<[i64; 2]>,
}

impl PathResponse {
    /// Wire pairs as cells, or `None` if any pair can't be a cell.
    pub fn cells(&self) -> Option<Vec<Cell>> {
        self.path
            .iter()
            .map(|[row, col]| Cell::from_signed(*row, *col))
            .collect()
    }
}

/// Prediction returned by `POST /process_phone_data`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PredictedLocation {
    #[serde(deserialize_with = "grid_index")]
    pub predicted_x: i64,
    #[serde(deserialize_with = "grid_index")]
    pub predicted_y: i64,
    #[serde(deserialize_with = "grid_index")]
    pub predicted_z: i64,
    pub confidence: f64,
}

/// Error/acknowledgement body the backend sends as `{"message": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
