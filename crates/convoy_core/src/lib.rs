//! Convoy core: pure upload-queue state machine and view-model helpers.
mod effect;
mod msg;
mod options;
mod profile;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, NoticeLevel};
pub use msg::Msg;
pub use options::{BatchOptions, CompressionLevel, OptionsError, MIN_PASSWORD_LEN};
pub use profile::{Tool, ToolProfile};
pub use state::{
    Delivery, FileId, FileMeta, FileStatus, PreviewArtifact, PreviewState, QueueState,
};
pub use update::update;
pub use view_model::{FileRowView, PreviewView, QueueViewModel};
