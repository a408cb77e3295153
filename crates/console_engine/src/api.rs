use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use console_logging::{console_debug, console_info, console_trace};
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tokio_util::io::ReaderStream;
use url::Url;

use crate::types::{ListingResponse, SubmitResponse};
use crate::{
    ApiError, Collection, EngineEvent, EventSink, FailureKind, MediaFile, StatusReport, TaskId,
};

/// Emit upload progress at most this often (in bytes), or every percent
/// for files large enough that a percent is bigger.
const MIN_PROGRESS_STEP: u64 = 256 * 1024;

#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Root of the REST API, e.g. `http://10.0.0.5:8000/api`.
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Applies to JSON requests only; uploads run as long as they need.
    pub request_timeout: Duration,
    /// Multipart field the upload endpoint reads files from.
    pub upload_field: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            upload_field: "file_uploads".to_string(),
        }
    }
}

#[async_trait::async_trait]
pub trait ConsoleApi: Send + Sync {
    async fn list_files(&self, collection: Collection) -> Result<Vec<MediaFile>, ApiError>;

    async fn upload_file(
        &self,
        path: &Path,
        name: &str,
        sink: Arc<dyn EventSink>,
    ) -> Result<(), ApiError>;

    async fn delete_file(&self, filename: &str) -> Result<(), ApiError>;

    async fn submit_process(&self, filename: &str) -> Result<TaskId, ApiError>;

    async fn task_status(&self, task_id: &str) -> Result<StatusReport, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestApi {
    settings: ApiSettings,
    base: Url,
    client: reqwest::Client,
}

impl ReqwestApi {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::new(
                FailureKind::InvalidUrl,
                format!("{} cannot be used as a base url", settings.base_url),
            ));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            settings,
            base,
            client,
        })
    }

    /// Appends path segments to the base url. Each segment is
    /// percent-encoded; a trailing `""` yields a trailing slash.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request
            .timeout(self.settings.request_timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = check_status(response)?;
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        serde_json::from_slice(&body)
            .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
    }
}

#[async_trait::async_trait]
impl ConsoleApi for ReqwestApi {
    async fn list_files(&self, collection: Collection) -> Result<Vec<MediaFile>, ApiError> {
        let url = match collection {
            Collection::Uploaded => self.endpoint(&["files", ""]),
            Collection::Processed => self.endpoint(&["process", "ready", ""]),
        };
        let listing: ListingResponse = self.fetch_json(self.client.get(url)).await?;
        Ok(listing.files)
    }

    async fn upload_file(
        &self,
        path: &Path,
        name: &str,
        sink: Arc<dyn EventSink>,
    ) -> Result<(), ApiError> {
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|err| ApiError::new(FailureKind::Io, err.to_string()))?;
        let total = file
            .metadata()
            .await
            .map_err(|err| ApiError::new(FailureKind::Io, err.to_string()))?
            .len();
        console_info!("Uploading {} ({} bytes)", name, total);

        let step = (total / 100).max(MIN_PROGRESS_STEP);
        let progress_name = name.to_string();
        let mut sent = 0u64;
        let body = ReaderStream::new(file).map(move |chunk: io::Result<Bytes>| {
            if let Ok(bytes) = &chunk {
                let previous = sent;
                sent += bytes.len() as u64;
                if sent / step != previous / step || sent == total {
                    console_trace!("Upload {} at {}/{}", progress_name, sent, total);
                    sink.emit(EngineEvent::UploadProgress {
                        name: progress_name.clone(),
                        sent,
                        total,
                    });
                }
            }
            chunk
        });

        let part = Part::stream_with_length(reqwest::Body::wrap_stream(body), total)
            .file_name(name.to_string())
            .mime_str("application/octet-stream")
            .map_err(|err| ApiError::new(FailureKind::Io, err.to_string()))?;
        let form = Form::new().part(self.settings.upload_field.clone(), part);

        let response = self
            .client
            .post(self.endpoint(&["uploads", ""]))
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        check_status(response)?;
        Ok(())
    }

    async fn delete_file(&self, filename: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.endpoint(&["files", filename]))
            .timeout(self.settings.request_timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        check_status(response)?;
        Ok(())
    }

    async fn submit_process(&self, filename: &str) -> Result<TaskId, ApiError> {
        let url = self.endpoint(&["process", "add", filename]);
        let submitted: SubmitResponse = self.fetch_json(self.client.post(url)).await?;
        submitted
            .task_id
            .ok_or_else(|| ApiError::new(FailureKind::Decode, "response carries no task_id"))
    }

    async fn task_status(&self, task_id: &str) -> Result<StatusReport, ApiError> {
        let url = self.endpoint(&["process", "status", task_id]);
        let report: StatusReport = self.fetch_json(self.client.get(url)).await?;
        console_debug!("Task {} status {:?}", task_id, report.status);
        Ok(report)
    }
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::new(
            FailureKind::HttpStatus {
                code: status.as_u16(),
                reason: status.canonical_reason().map(ToOwned::to_owned),
            },
            status.to_string(),
        ));
    }
    Ok(response)
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(FailureKind::Decode, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
