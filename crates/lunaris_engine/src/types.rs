use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::persist::PersistError;

/// Opaque server-assigned job id, as returned by the upload endpoint.
pub type JobId = String;

/// Wire form of a job status object. The server owns the full blob; only
/// these fields are read and unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct JobStatus {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub succeeded: bool,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, rename = "snagMessages")]
    pub snag_messages: Vec<String>,
}

/// Wire form of the schema endpoint response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct SchemaResponse {
    #[serde(default)]
    pub col_names: Option<Vec<String>>,
    #[serde(default, rename = "isError")]
    pub is_error: bool,
    #[serde(default)]
    pub message: String,
}

/// A saved server-side session: the filter in force and the jobs it covers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct SessionData {
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub jobs: Vec<SessionJobRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionJobRef {
    pub id: JobId,
    #[serde(rename = "inputFileName")]
    pub input_file_name: String,
}

/// Connection settings for the predictor backend.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("http status {status}: {message}")]
    Http { status: u16, message: String },
    #[error("timeout: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error("schema error: {0}")]
    Schema(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

impl ClientError {
    /// Short human-readable form used for per-job status lines. For HTTP
    /// failures this is the reason phrase alone, like the browser's
    /// `response.statusText`.
    pub fn status_text(&self) -> String {
        match self {
            ClientError::Http { message, .. } if !message.is_empty() => message.clone(),
            other => other.to_string(),
        }
    }
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        return ClientError::Timeout(err.to_string());
    }
    if err.is_decode() {
        return ClientError::Decode(err.to_string());
    }
    ClientError::Network(err.to_string())
}
