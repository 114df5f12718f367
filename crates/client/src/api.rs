use std::future::Future;
use std::time::Duration;

use gridloc_shared::models::{
    CoordinateEntry, MessageResponse, PathRequest, PathResponse, PredictedLocation,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ApiError;

/// The backend as the engine sees it. Injected so the engine can run
/// against fakes; [`HttpClient`] is the real one.
pub trait NetworkClient: Send + Sync + 'static {
    /// `GET /coordinates`: every cell that already has a labeled sample.
    fn fetch_visited(
        &self,
    ) -> impl Future<Output = Result<Vec<CoordinateEntry>, ApiError>> + Send;

    /// `POST /shortest_path`. A 404 means no path exists.
    fn shortest_path(
        &self,
        request: PathRequest,
    ) -> impl Future<Output = Result<PathResponse, ApiError>> + Send;

    /// `POST /process_phone_data` with a body from
    /// [`gridloc_shared::sample::prediction_body`].
    fn predict(
        &self,
        body: serde_json::Value,
    ) -> impl Future<Output = Result<PredictedLocation, ApiError>> + Send;

    /// `POST /phone_data` with a training sample body. Returns the backend's
    /// acknowledgement message.
    fn submit_sample(
        &self,
        body: serde_json::Value,
    ) -> impl Future<Output = Result<String, ApiError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(HttpClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        build_url(&self.base_url, path)
    }
}

/// Join the server root and an endpoint path.
pub fn build_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Decode a response, turning non-2xx statuses into [`ApiError::Status`].
async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
    let status = resp.status();
    let body = resp.bytes().await?;
    if !status.is_success() {
        let message = serde_json::from_slice::<MessageResponse>(&body)
            .map(|m| m.message)
            .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown").to_string());
        return Err(ApiError::Status {
            status: status.as_u16(),
            message,
        });
    }
    serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

impl NetworkClient for HttpClient {
    async fn fetch_visited(&self) -> Result<Vec<CoordinateEntry>, ApiError> {
        let resp = self.http.get(self.url("coordinates")).send().await?;
        read_json(resp).await
    }

    async fn shortest_path(&self, request: PathRequest) -> Result<PathResponse, ApiError> {
        debug!(?request, "requesting shortest path");
        let resp = self
            .http
            .post(self.url("shortest_path"))
            .json(&request)
            .send()
            .await?;
        read_json(resp).await
    }

    async fn predict(&self, body: serde_json::Value) -> Result<PredictedLocation, ApiError> {
        let resp = self
            .http
            .post(self.url("process_phone_data"))
            .json(&body)
            .send()
            .await?;
        read_json(resp).await
    }

    async fn submit_sample(&self, body: serde_json::Value) -> Result<String, ApiError> {
        debug!(%body, "sending training sample");
        let resp = self
            .http
            .post(self.url("phone_data"))
            .json(&body)
            .send()
            .await?;
        let ack: MessageResponse = read_json(resp).await?;
        Ok(ack.message)
    }
}
