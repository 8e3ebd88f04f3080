use crate::options::BatchOptions;
use crate::state::{Delivery, FileId, FileMeta, PreviewArtifact};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User selected or dropped files.
    FilesAdded(Vec<FileMeta>),
    /// User removed one queue entry.
    FileRemoved { file_id: FileId },
    /// User cleared the whole queue.
    ClearAll,
    /// User triggered the batch with the shared option set.
    ConvertClicked { options: BatchOptions },
    /// User retried a single errored file.
    RetryClicked { file_id: FileId },
    /// Engine transfer progress for a file, 0..=100.
    UploadProgress { file_id: FileId, percent: u8 },
    /// The service answered with an asynchronous job identifier.
    JobAccepted { file_id: FileId, job_id: String },
    /// Engine terminal result for a file.
    FileDone {
        file_id: FileId,
        result: Result<Delivery, String>,
    },
    /// User edited preview inputs (already debounced by the driver).
    PreviewEdited { options: BatchOptions },
    /// Engine preview result, tagged with the generation it was requested
    /// under.
    PreviewReady {
        generation: u64,
        result: Result<PreviewArtifact, String>,
    },
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
