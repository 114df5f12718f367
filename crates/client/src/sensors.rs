//! Sensor access. The platform's Wi-Fi scanner and magnetometer sit behind
//! [`SensorSource`]; the engine only ever pulls from it.
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use gridloc_shared::sample::{MagVector, SensorSnapshot, WifiScan};
use thiserror::Error;

pub trait SensorSource: Send + Sync + 'static {
    /// Most recent scan the platform has cached, if any.
    fn latest_scan(&self) -> Option<WifiScan>;

    /// Latest magnetometer reading, if the sensor has reported yet.
    fn magnetometer(&self) -> Option<MagVector>;

    /// Ask the platform for a fresh scan. Throttling is the caller's job.
    fn scan_wifi(&self) -> Option<WifiScan> {
        self.latest_scan()
    }

    /// Both readings for one poll cycle, or `None` if either is missing.
    fn snapshot(&self) -> Option<SensorSnapshot> {
        Some(SensorSnapshot {
            wifi: self.latest_scan()?,
            mag: self.magnetometer()?,
        })
    }
}

/// Holds whatever readings it was last given.
#[derive(Debug, Default)]
pub struct FixedSensors {
    scan: Mutex<Option<WifiScan>>,
    mag: Mutex<Option<MagVector>>,
}

impl FixedSensors {
    pub fn new(snapshot: Option<SensorSnapshot>) -> Self {
        let sensors = FixedSensors::default();
        if let Some(s) = snapshot {
            sensors.set(s);
        }
        sensors
    }

    pub fn set(&self, snapshot: SensorSnapshot) {
        if let Ok(mut scan) = self.scan.lock() {
            *scan = Some(snapshot.wifi);
        }
        if let Ok(mut mag) = self.mag.lock() {
            *mag = Some(snapshot.mag);
        }
    }
}

impl SensorSource for FixedSensors {
    fn latest_scan(&self) -> Option<WifiScan> {
        self.scan.lock().ok()?.clone()
    }

    fn magnetometer(&self) -> Option<MagVector> {
        *self.mag.lock().ok()?
    }
}

#[derive(Debug, Error)]
pub enum SensorFileError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// Replays recorded snapshots in order, wrapping around. Each poll advances
/// one frame; manual scans and magnetometer reads see the current frame.
#[derive(Debug, Default)]
pub struct ReplaySensors {
    frames: Vec<SensorSnapshot>,
    next: AtomicUsize,
}

impl ReplaySensors {
    pub fn new(frames: Vec<SensorSnapshot>) -> Self {
        ReplaySensors {
            frames,
            next: AtomicUsize::new(0),
        }
    }

    /// Load a JSON array of `{"wifi": {..}, "mag": {..}}` objects.
    pub fn load(path: &Path) -> Result<Self, SensorFileError> {
        let text = std::fs::read_to_string(path).map_err(|source| SensorFileError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let frames: Vec<SensorSnapshot> =
            serde_json::from_str(&text).map_err(|source| SensorFileError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        Ok(ReplaySensors::new(frames))
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    fn current(&self) -> Option<&SensorSnapshot> {
        if self.frames.is_empty() {
            return None;
        }
        let i = self.next.load(Ordering::Relaxed) % self.frames.len();
        self.frames.get(i)
    }
}

impl SensorSource for ReplaySensors {
    fn latest_scan(&self) -> Option<WifiScan> {
        self.current().map(|s| s.wifi.clone())
    }

    fn magnetometer(&self) -> Option<MagVector> {
        self.current().map(|s| s.mag)
    }

    fn snapshot(&self) -> Option<SensorSnapshot> {
        if self.frames.is_empty() {
            return None;
        }
        let i = self.next.fetch_add(1, Ordering::Relaxed) % self.frames.len();
        self.frames.get(i).cloned()
    }
}
