//! Location polling: send the latest sensor readings for a prediction,
//! move the user marker, repeat.
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use gridloc_shared::models::PredictedLocation;
use gridloc_shared::sample::prediction_body;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::NetworkClient;
use crate::error::ApiError;
use crate::notice::Notice;
use crate::scheduler::RepeatingTask;
use crate::sensors::SensorSource;
use crate::session::Update;
use crate::view::GridView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    InFlight,
}

#[derive(Debug, Clone)]
pub struct PollSettings {
    pub period: Duration,
    pub access_points: Arc<[String]>,
    pub missing_rssi: i32,
}

/// Running poll loop. Dropping it stops polling.
#[derive(Debug)]
pub struct PollLoop {
    task: RepeatingTask,
    state: watch::Receiver<PollState>,
}

impl PollLoop {
    pub fn start<C, S>(
        client: Arc<C>,
        sensors: Arc<S>,
        settings: PollSettings,
        updates: UnboundedSender<Update>,
    ) -> Self
    where
        C: NetworkClient,
        S: SensorSource,
    {
        let (state_tx, state) = watch::channel(PollState::Idle);
        let state_tx = Arc::new(state_tx);
        let PollSettings {
            period,
            access_points,
            missing_rssi,
        } = settings;

        let task = RepeatingTask::spawn(period, move || {
            let client = client.clone();
            let sensors = sensors.clone();
            let access_points = access_points.clone();
            let updates = updates.clone();
            let state_tx = state_tx.clone();
            async move {
                if updates.is_closed() {
                    return ControlFlow::Break(());
                }
                let Some(snapshot) = sensors.snapshot() else {
                    debug!("no sensor readings yet, skipping poll");
                    return ControlFlow::Continue(());
                };
                let body = prediction_body(&snapshot, &access_points, missing_rssi);
                state_tx.send_replace(PollState::InFlight);
                let result = client.predict(body).await;
                state_tx.send_replace(PollState::Idle);
                match updates.send(Update::Predicted(result)) {
                    Ok(()) => ControlFlow::Continue(()),
                    Err(_) => ControlFlow::Break(()),
                }
            }
        });

        PollLoop { task, state }
    }

    pub fn state(&self) -> PollState {
        *self.state.borrow()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub async fn shutdown(self) {
        self.task.shutdown().await;
    }
}

/// Move the marker to a predicted cell. Predictions outside the grid are
/// ignored.
pub fn apply_prediction(
    view: &mut GridView,
    result: Result<PredictedLocation, ApiError>,
) -> Option<Notice> {
    let predicted = match result {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "prediction failed");
            return Some(Notice::PredictionFailed(e.to_string()));
        }
    };
    debug!(
        x = predicted.predicted_x,
        y = predicted.predicted_y,
        z = predicted.predicted_z,
        confidence = predicted.confidence,
        "prediction received"
    );
    match view
        .spec()
        .cell_at(predicted.predicted_x, predicted.predicted_y)
    {
        Some(cell) => {
            view.set_user_location(Some(cell));
        }
        None => debug!(
            x = predicted.predicted_x,
            y = predicted.predicted_y,
            "prediction outside grid, ignoring"
        ),
    }
    None
}
