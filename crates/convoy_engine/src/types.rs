use bytes::Bytes;
use convoy_core::{Delivery, FileId, PreviewArtifact};
use thiserror::Error;

/// One file's bytes as handed to the engine. `Bytes` keeps the clone into
/// the request body cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePayload {
    pub name: String,
    pub bytes: Bytes,
}

impl FilePayload {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Immediate answer of the convert endpoint. A present `job_id` means the
/// operation runs asynchronously and must be polled to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertReply {
    pub filename: String,
    pub download_url: Option<String>,
    pub job_id: Option<String>,
}

/// Terminal or non-terminal answer of the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Completed {
        download_url: Option<String>,
        method: Option<String>,
    },
    Failed {
        message: String,
    },
    InProgress,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileProgress {
    pub file_id: FileId,
    pub percent: u8,
}

/// Events the engine reports back to the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Progress(FileProgress),
    JobAccepted {
        file_id: FileId,
        job_id: String,
    },
    UploadCompleted {
        file_id: FileId,
        result: Result<Delivery, ServiceError>,
    },
    PreviewCompleted {
        generation: u64,
        result: Result<PreviewArtifact, ServiceError>,
    },
}

/// How one polling run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The service reported the job done.
    Done(Delivery),
    /// The service reported the job failed.
    Failed { message: String },
    /// The status endpoint vanished or the attempt cap was reached; the
    /// download URL is derived from the job id's naming convention.
    Assumed(Delivery),
    /// Polling was cancelled by queue teardown.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("service returned status {0}")]
    HttpStatus(u16),
    #[error("request timed out")]
    Timeout,
    #[error("upload too large")]
    TooLarge,
    // The bare message is what lands in the file's error field.
    #[error("{message}")]
    Rejected { message: String },
    #[error("not found")]
    NotFound,
    #[error("network error: {0}")]
    Network(String),
}
