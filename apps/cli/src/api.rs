//! Thin client for the simulation REST API.

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sim_core::{OutcomeSnapshot, SimulationSettings, SimulationUpdate};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },
    #[error("could not decode response: {0}")]
    Decode(String),
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Map a failed response to the error the caller should see.
fn error_from_status(status: StatusCode, body: &str) -> ClientError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = match (parsed.message, parsed.error) {
        (Some(m), Some(e)) => format!("{m}: {e}"),
        (Some(m), None) => m,
        (None, Some(e)) => e,
        (None, None) => body.trim().to_string(),
    };
    if status == StatusCode::NOT_FOUND {
        ClientError::NotFound(message)
    } else {
        ClientError::Server {
            status: status.as_u16(),
            message,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Created {
    #[serde(rename = "_id")]
    id: i64,
}

pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(error_from_status(status, &body));
        }
        serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Settings published by the server; `None` when it has none.
    pub async fn get_config(&self) -> Result<Option<SimulationSettings>, ClientError> {
        self.send_json(self.client.get(self.url("/api/config/getConfig")))
            .await
    }

    pub async fn create_simulation(&self, data: &SimulationUpdate) -> Result<i64, ClientError> {
        let created: Created = self
            .send_json(self.client.post(self.url("/api/simulations")).json(data))
            .await?;
        Ok(created.id)
    }

    pub async fn update_simulation(&self, id: i64, data: &SimulationUpdate) -> Result<i64, ClientError> {
        let updated: Created = self
            .send_json(
                self.client
                    .put(self.url(&format!("/api/simulations/{id}")))
                    .json(data),
            )
            .await?;
        Ok(updated.id)
    }

    pub async fn create_order(&self, snapshot: &OutcomeSnapshot) -> Result<i64, ClientError> {
        let created: Created = self
            .send_json(self.client.post(self.url("/api/orders")).json(snapshot))
            .await?;
        Ok(created.id)
    }
}
