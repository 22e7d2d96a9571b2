use crate::messages::{PredictionRequest, PredictionResponse};
use reqwest::{header::ACCEPT, StatusCode};
use thiserror::Error;
use tracing::instrument;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Unable to connect to the prediction service: {0}")]
    ConnectionFailed(#[source] reqwest::Error),
    #[error("Failed to build prediction request: {0}")]
    RequestFailed(#[source] reqwest::Error),
    #[error("Invalid prediction response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, ClientError::ConnectionFailed(_))
    }
}

/// Outcome of a delivered request.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionReply {
    Predicted(PredictionResponse),
    Rejected { status: u16, body: String },
}

/// JSON client for `POST /predict`.
///
/// No timeout is set on the underlying client: a call waits for as long as
/// the service takes to answer.
#[derive(Debug, Clone)]
pub struct PredictionClient {
    http: reqwest::Client,
    url: String,
}

impl PredictionClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionReply, ClientError> {
        tracing::debug!("Sending request with payload {:?}", request);

        let response = self
            .http
            .post(&self.url)
            .header(ACCEPT, "application/json")
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if status != StatusCode::OK {
            return Ok(PredictionReply::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str::<PredictionResponse>(&body)
            .map(PredictionReply::Predicted)
            .map_err(|e| ClientError::InvalidResponse(format!("{}: {}", e, body)))
    }
}

fn transport_error(err: reqwest::Error) -> ClientError {
    if err.is_builder() {
        ClientError::RequestFailed(err)
    } else {
        ClientError::ConnectionFailed(err)
    }
}
