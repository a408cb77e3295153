use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

pub type TaskId = String;

/// Server-side file collections exposed by the listing endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Uploaded,
    Processed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct MediaFile {
    pub filename: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub size: Option<String>,
    #[serde(default)]
    pub video_streams: Option<Vec<VideoStream>>,
    #[serde(default)]
    pub audio_streams: Option<Vec<AudioStream>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct VideoStream {
    #[serde(default, deserialize_with = "lenient_text")]
    pub codec: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub resolution: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub fps: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct AudioStream {
    #[serde(default, deserialize_with = "lenient_text")]
    pub codec: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub language: Option<String>,
}

/// Listing body. An empty directory is reported as `{"message": ...}`
/// without a `files` key.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ListingResponse {
    #[serde(default)]
    pub(crate) files: Vec<MediaFile>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SubmitResponse {
    #[serde(default, deserialize_with = "lenient_text")]
    pub(crate) task_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum TaskStatus {
    Queued,
    Processing,
    Completed,
    Error,
    Other(String),
}

impl From<String> for TaskStatus {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "queued" | "pending" => TaskStatus::Queued,
            "processing" => TaskStatus::Processing,
            "completed" => TaskStatus::Completed,
            "error" => TaskStatus::Error,
            _ => TaskStatus::Other(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatusReport {
    pub status: TaskStatus,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default, alias = "error_message", deserialize_with = "lenient_text")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Completed { filename: Option<String> },
    Failed { error: Option<String> },
    TimedOut { elapsed: Duration },
    Unreachable(ApiError),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Listed {
        collection: Collection,
        result: Result<Vec<MediaFile>, ApiError>,
    },
    UploadProgress {
        name: String,
        sent: u64,
        total: u64,
    },
    Uploaded {
        name: String,
        result: Result<(), ApiError>,
    },
    Deleted {
        filename: String,
        result: Result<(), ApiError>,
    },
    Submitted {
        filename: String,
        result: Result<TaskId, ApiError>,
    },
    TaskStatus {
        task_id: TaskId,
        report: StatusReport,
    },
    PollFinished {
        task_id: TaskId,
        outcome: PollOutcome,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Text shown to the user: the HTTP reason phrase for status failures,
    /// the underlying message otherwise.
    pub fn user_text(&self) -> String {
        match &self.kind {
            FailureKind::HttpStatus {
                reason: Some(reason),
                ..
            } => reason.clone(),
            FailureKind::HttpStatus { code, reason: None } => format!("HTTP {code}"),
            _ => self.message.clone(),
        }
    }

    /// True when the server could not be reached or answered unintelligibly,
    /// as opposed to answering with an error status.
    pub fn is_transport(&self) -> bool {
        !matches!(self.kind, FailureKind::HttpStatus { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus { code: u16, reason: Option<String> },
    Timeout,
    Network,
    Decode,
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus { code, .. } => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "unexpected response body"),
            FailureKind::Io => write!(f, "io error"),
        }
    }
}

/// Accepts a string, a number or null; ffprobe-derived fields are not
/// consistently typed.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}
