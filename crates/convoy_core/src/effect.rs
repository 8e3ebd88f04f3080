use crate::options::BatchOptions;
use crate::state::FileId;

/// Side effects requested by the reducer, executed by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Hand one file to the engine together with the batch's shared options.
    /// Emitted in queue order; the engine processes them sequentially.
    UploadFile {
        file_id: FileId,
        options: BatchOptions,
    },
    /// Ask the engine for a debounced live preview under this generation.
    RequestPreview {
        generation: u64,
        options: BatchOptions,
    },
    /// Stop any in-flight polling and discard pending preview work.
    CancelInFlight,
    /// Ephemeral user notification.
    Notify { level: NoticeLevel, text: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}
