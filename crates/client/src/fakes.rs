//! In-memory backend for engine tests.
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use gridloc_shared::models::{CoordinateEntry, PathRequest, PathResponse, PredictedLocation};

use crate::api::NetworkClient;
use crate::error::ApiError;

pub fn prediction(x: i64, y: i64) -> PredictedLocation {
    PredictedLocation {
        predicted_x: x,
        predicted_y: y,
        predicted_z: 0,
        confidence: 0.9,
    }
}

pub fn not_found() -> ApiError {
    ApiError::Status {
        status: 404,
        message: "Path not found".into(),
    }
}

pub struct FakeClient {
    pub visited: Mutex<Result<Vec<CoordinateEntry>, ApiError>>,
    pub path: Mutex<Result<PathResponse, ApiError>>,
    pub prediction: Mutex<Result<PredictedLocation, ApiError>>,
    pub submit: Mutex<Result<String, ApiError>>,
    /// How long `predict` takes to answer.
    pub predict_delay: Duration,
    pub visited_calls: AtomicUsize,
    pub predict_calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub path_requests: Mutex<Vec<PathRequest>>,
    pub predict_bodies: Mutex<Vec<serde_json::Value>>,
    pub samples: Mutex<Vec<serde_json::Value>>,
}

impl Default for FakeClient {
    fn default() -> Self {
        FakeClient {
            visited: Mutex::new(Ok(Vec::new())),
            path: Mutex::new(Ok(PathResponse { path: Vec::new() })),
            prediction: Mutex::new(Ok(prediction(1, 7))),
            submit: Mutex::new(Ok("Data received".into())),
            predict_delay: Duration::ZERO,
            visited_calls: AtomicUsize::new(0),
            predict_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            path_requests: Mutex::new(Vec::new()),
            predict_bodies: Mutex::new(Vec::new()),
            samples: Mutex::new(Vec::new()),
        }
    }
}

impl FakeClient {
    pub fn with_visited(self, cells: &[(i64, i64)]) -> Self {
        let entries = cells
            .iter()
            .map(|&(row, col)| CoordinateEntry { row, col })
            .collect();
        *self.visited.lock().unwrap() = Ok(entries);
        self
    }

    pub fn with_path(self, result: Result<PathResponse, ApiError>) -> Self {
        *self.path.lock().unwrap() = result;
        self
    }

    pub fn with_prediction(self, result: Result<PredictedLocation, ApiError>) -> Self {
        *self.prediction.lock().unwrap() = result;
        self
    }

    pub fn with_predict_delay(mut self, delay: Duration) -> Self {
        self.predict_delay = delay;
        self
    }

    pub fn predict_calls(&self) -> usize {
        self.predict_calls.load(Ordering::SeqCst)
    }
}

impl NetworkClient for FakeClient {
    async fn fetch_visited(&self) -> Result<Vec<CoordinateEntry>, ApiError> {
        self.visited_calls.fetch_add(1, Ordering::SeqCst);
        self.visited.lock().unwrap().clone()
    }

    async fn shortest_path(&self, request: PathRequest) -> Result<PathResponse, ApiError> {
        self.path_requests.lock().unwrap().push(request);
        self.path.lock().unwrap().clone()
    }

    async fn predict(&self, body: serde_json::Value) -> Result<PredictedLocation, ApiError> {
        self.predict_calls.fetch_add(1, Ordering::SeqCst);
        self.predict_bodies.lock().unwrap().push(body);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.predict_delay.is_zero() {
            tokio::time::sleep(self.predict_delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.prediction.lock().unwrap().clone()
    }

    async fn submit_sample(&self, body: serde_json::Value) -> Result<String, ApiError> {
        self.samples.lock().unwrap().push(body);
        self.submit.lock().unwrap().clone()
    }
}
