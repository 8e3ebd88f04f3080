use std::time::Duration;

use convoy_core::{BatchOptions, FileId, PreviewArtifact};
use url::Url;

use crate::{ConvertReply, EngineEvent, FilePayload, JobState, ServiceError};

#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub api_base: Url,
    pub connect_timeout: Duration,
    /// Per-file budget for the whole convert call; expiry is reported as a
    /// timeout error on that file.
    pub request_timeout: Duration,
    /// Granularity of the upload body stream, and therefore of progress
    /// reporting.
    pub chunk_size: usize,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            api_base: Url::parse("http://localhost:8080").expect("static url"),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
            chunk_size: 64 * 1024,
        }
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// The engine's only boundary to the outside world. One implementation talks
/// HTTP; tests substitute their own.
#[async_trait::async_trait]
pub trait ConversionService: Send + Sync {
    /// Uploads one file with the batch's shared options. `sink` receives
    /// transfer progress for `file_id` while the body streams out.
    async fn convert(
        &self,
        file_id: FileId,
        payload: &FilePayload,
        options: &BatchOptions,
        sink: &dyn ProgressSink,
    ) -> Result<ConvertReply, ServiceError>;

    /// Queries the status of an asynchronous job.
    async fn job_status(&self, job_id: &str) -> Result<JobState, ServiceError>;

    /// Renders a best-effort live preview for the given options.
    async fn preview(&self, options: &BatchOptions) -> Result<PreviewArtifact, ServiceError>;
}
