use std::fmt;
use std::time::Duration;

use gridloc_shared::grid::Cell;
use gridloc_shared::sample::SampleError;

/// Short-lived message for the user. Never changes engine state.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    SyncFailed(String),
    /// No path to the tapped cell, or the path request failed.
    NoPath,
    PredictionFailed(String),
    ScanThrottled { retry_in: Duration },
    ScanCompleted { access_points: usize },
    ScanUnavailable,
    CollectionRejected(SampleError),
    SampleSubmitted(Cell),
    CollectionFailed(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::SyncFailed(reason) => write!(f, "Failed to load data: {reason}"),
            Notice::NoPath => write!(f, "No possible paths:("),
            Notice::PredictionFailed(reason) => write!(f, "Failed to load data: {reason}"),
            Notice::ScanThrottled { retry_in } => write!(
                f,
                "Scan request throttled, try again in {}s",
                retry_in.as_secs_f64().ceil() as u64
            ),
            Notice::ScanCompleted { access_points } => {
                write!(f, "WiFi scan found {access_points} access points")
            }
            Notice::ScanUnavailable => write!(f, "Failed to start WiFi scan"),
            Notice::CollectionRejected(e) => write!(f, "{e}"),
            Notice::SampleSubmitted(cell) => write!(f, "Data sent for {cell}"),
            Notice::CollectionFailed(reason) => write!(f, "Failed to send data: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Notice::NoPath.to_string(), "No possible paths:(");
        assert_eq!(
            Notice::ScanThrottled { retry_in: Duration::from_millis(12_300) }.to_string(),
            "Scan request throttled, try again in 13s"
        );
        assert_eq!(
            Notice::CollectionRejected(SampleError::EmptyScan).to_string(),
            "WiFi RSSI data is empty"
        );
        assert_eq!(
            Notice::SampleSubmitted(Cell::new(3, 4)).to_string(),
            "Data sent for (3, 4)"
        );
    }
}
