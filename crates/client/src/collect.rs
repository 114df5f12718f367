//! Labeling a cell with the current Wi-Fi scan and magnetometer reading.
use std::sync::Arc;
use std::time::Duration;

use gridloc_shared::grid::{Cell, GridSpec};
use gridloc_shared::sample::{SampleError, TrainingSample, WifiScan};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::api::NetworkClient;
use crate::error::ApiError;
use crate::notice::Notice;
use crate::sensors::SensorSource;
use crate::session::Update;

/// Allows one manual scan per interval.
#[derive(Debug, Clone)]
pub struct ScanThrottle {
    interval: Duration,
    last: Option<Instant>,
}

impl ScanThrottle {
    pub fn new(interval: Duration) -> Self {
        ScanThrottle {
            interval,
            last: None,
        }
    }

    /// Claim a scan slot at `now`, or return how long until the next one.
    pub fn try_acquire(&mut self, now: Instant) -> Result<(), Duration> {
        if let Some(last) = self.last {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < self.interval {
                return Err(self.interval - elapsed);
            }
        }
        self.last = Some(now);
        Ok(())
    }
}

#[derive(Debug)]
pub struct Collector {
    spec: GridSpec,
    access_points: Arc<[String]>,
    throttle: ScanThrottle,
    last_scan: Option<WifiScan>,
}

impl Collector {
    pub fn new(spec: GridSpec, access_points: Arc<[String]>, scan_interval: Duration) -> Self {
        Collector {
            spec,
            access_points,
            throttle: ScanThrottle::new(scan_interval),
            last_scan: None,
        }
    }

    pub fn last_scan(&self) -> Option<&WifiScan> {
        self.last_scan.as_ref()
    }

    /// Manual Wi-Fi scan. The result is kept for the next sample.
    pub fn scan<S: SensorSource + ?Sized>(&mut self, sensors: &S) -> Notice {
        if let Err(retry_in) = self.throttle.try_acquire(Instant::now()) {
            debug!(?retry_in, "scan throttled");
            return Notice::ScanThrottled { retry_in };
        }
        match sensors.scan_wifi() {
            Some(scan) => {
                let access_points = scan.len();
                info!(access_points, "wifi scan completed");
                self.last_scan = Some(scan);
                Notice::ScanCompleted { access_points }
            }
            None => {
                warn!("wifi scan unavailable");
                Notice::ScanUnavailable
            }
        }
    }

    /// Validate the readings for `cell`. Nothing goes to the network if
    /// this fails.
    pub fn prepare<S: SensorSource + ?Sized>(
        &self,
        cell: Cell,
        sensors: &S,
    ) -> Result<TrainingSample, SampleError> {
        let empty = WifiScan::default();
        let scan = self.last_scan.as_ref().unwrap_or(&empty);
        TrainingSample::build(
            cell,
            &self.spec,
            scan,
            sensors.magnetometer(),
            &self.access_points,
        )
    }
}

pub fn spawn_submit<C: NetworkClient>(
    client: Arc<C>,
    sample: TrainingSample,
    updates: UnboundedSender<Update>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let cell = sample.cell;
        let result = client.submit_sample(sample.to_body()).await;
        if updates.send(Update::SampleSubmitted { cell, result }).is_err() {
            debug!(%cell, "session closed, dropping submit result");
        }
    })
}

pub fn apply_submit(cell: Cell, result: Result<String, ApiError>) -> Notice {
    match result {
        Ok(message) => {
            info!(%cell, %message, "training sample stored");
            Notice::SampleSubmitted(cell)
        }
        Err(e) => {
            warn!(%cell, error = %e, "failed to send training sample");
            Notice::CollectionFailed(e.to_string())
        }
    }
}
