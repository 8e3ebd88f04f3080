use crate::profile::Tool;
use crate::state::{FileId, FileStatus, PreviewState};

/// Read-only snapshot of the queue for rendering. Drivers never mutate the
/// state through this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueViewModel {
    pub tool: Tool,
    pub batch_running: bool,
    pub file_count: usize,
    pub rows: Vec<FileRowView>,
    pub preview: Option<PreviewView>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRowView {
    pub file_id: FileId,
    pub name: String,
    pub size_bytes: u64,
    pub status: FileStatus,
    pub progress: u8,
    pub download_url: Option<String>,
    pub error: Option<String>,
    pub job_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewView {
    pub generation: u64,
    pub waiting: bool,
    pub media_type: Option<String>,
    pub byte_len: Option<u64>,
    pub error: Option<String>,
}

impl PreviewView {
    pub(crate) fn from_state(state: &PreviewState) -> Option<Self> {
        match state {
            PreviewState::Idle => None,
            PreviewState::Waiting { generation } => Some(Self {
                generation: *generation,
                waiting: true,
                media_type: None,
                byte_len: None,
                error: None,
            }),
            PreviewState::Ready {
                generation,
                artifact,
            } => Some(Self {
                generation: *generation,
                waiting: false,
                media_type: Some(artifact.media_type.clone()),
                byte_len: Some(artifact.bytes.len() as u64),
                error: None,
            }),
            PreviewState::Failed {
                generation,
                message,
            } => Some(Self {
                generation: *generation,
                waiting: false,
                media_type: None,
                byte_len: None,
                error: Some(message.clone()),
            }),
        }
    }
}
