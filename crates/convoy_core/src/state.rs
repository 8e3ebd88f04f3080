use std::collections::{BTreeMap, BTreeSet};

use crate::options::BatchOptions;
use crate::profile::Tool;
use crate::view_model::{FileRowView, PreviewView, QueueViewModel};

/// Queue-local identifier for a tracked file. Assigned monotonically, never
/// reused within one `QueueState`.
pub type FileId = u64;

/// Immutable descriptor of a user-selected file. The payload bytes stay with
/// the driver; the state machine only needs identity and intake metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta {
    pub name: String,
    pub size_bytes: u64,
    /// Lowercase extension without the dot; empty when the name has none.
    pub extension: String,
}

impl FileMeta {
    pub fn new(name: impl Into<String>, size_bytes: u64) -> Self {
        let name = name.into();
        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        Self {
            name,
            size_bytes,
            extension,
        }
    }
}

/// Lifecycle of one tracked file. Forward-only except `RetryClicked`, which
/// returns an errored file to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Pending,
    Uploading,
    Processing,
    Completed,
    Error,
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FileStatus::Pending => "pending",
            FileStatus::Uploading => "uploading",
            FileStatus::Processing => "processing",
            FileStatus::Completed => "completed",
            FileStatus::Error => "error",
        };
        write!(f, "{label}")
    }
}

/// Successful terminal result for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub download_url: String,
    /// How the service produced the result, e.g. "compressed" or
    /// "already optimized". Absent for plain conversions.
    pub method: Option<String>,
}

/// A completed file holds a delivery, an errored file holds a message, and
/// every other status holds neither.
#[derive(Debug, Clone, PartialEq, Eq)]
enum FileOutcome {
    Delivered(Delivery),
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TrackedFile {
    id: FileId,
    meta: FileMeta,
    status: FileStatus,
    /// 0..=100, non-decreasing while a run is in flight.
    progress: u8,
    outcome: Option<FileOutcome>,
    /// Opaque service identifier for asynchronous jobs that require polling.
    job_id: Option<String>,
}

impl TrackedFile {
    fn row(&self) -> FileRowView {
        let (download_url, error) = match &self.outcome {
            Some(FileOutcome::Delivered(delivery)) => {
                (Some(delivery.download_url.clone()), None)
            }
            Some(FileOutcome::Failed { message }) => (None, Some(message.clone())),
            None => (None, None),
        };
        FileRowView {
            file_id: self.id,
            name: self.meta.name.clone(),
            size_bytes: self.meta.size_bytes,
            status: self.status,
            progress: self.progress,
            download_url,
            error,
            job_id: self.job_id.clone(),
        }
    }
}

/// Rendered artifact returned by the best-effort preview path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewArtifact {
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// State of the live-preview side channel. Each edit bumps the generation;
/// only a response carrying the current generation is applied, so a slow
/// response can never overwrite a newer one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PreviewState {
    #[default]
    Idle,
    Waiting {
        generation: u64,
    },
    Ready {
        generation: u64,
        artifact: PreviewArtifact,
    },
    Failed {
        generation: u64,
        message: String,
    },
}

pub(crate) struct Admission {
    pub name: String,
    pub rejection: Option<String>,
}

pub(crate) struct DoneReport {
    pub name: String,
    pub failure: Option<String>,
    pub batch_drained: bool,
    pub completed_in_batch: usize,
    pub failed_in_batch: usize,
}

/// The authoritative upload queue for one tool page. Owned by the reducer;
/// drivers read it through `view()` and mutate it only via messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueState {
    tool: Tool,
    files: BTreeMap<FileId, TrackedFile>,
    next_file_id: FileId,
    batch_running: bool,
    in_flight: BTreeSet<FileId>,
    completed_in_batch: usize,
    failed_in_batch: usize,
    last_options: Option<BatchOptions>,
    preview_generation: u64,
    preview: PreviewState,
    dirty: bool,
}

impl QueueState {
    pub fn new(tool: Tool) -> Self {
        Self {
            tool,
            files: BTreeMap::new(),
            next_file_id: 0,
            batch_running: false,
            in_flight: BTreeSet::new(),
            completed_in_batch: 0,
            failed_in_batch: 0,
            last_options: None,
            preview_generation: 0,
            preview: PreviewState::Idle,
            dirty: false,
        }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn batch_running(&self) -> bool {
        self.batch_running
    }

    pub fn view(&self) -> QueueViewModel {
        QueueViewModel {
            tool: self.tool,
            batch_running: self.batch_running,
            file_count: self.files.len(),
            rows: self.files.values().map(TrackedFile::row).collect(),
            preview: PreviewView::from_state(&self.preview),
            dirty: self.dirty,
        }
    }

    /// Returns whether a render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn allocate_id(&mut self) -> FileId {
        self.next_file_id += 1;
        self.next_file_id
    }

    /// Appends each file to the queue. Files failing the tool's intake rules
    /// are still tracked, but enter directly in `Error` with the reason; they
    /// never start uploading.
    pub(crate) fn admit_files(&mut self, metas: Vec<FileMeta>) -> Vec<Admission> {
        let profile = self.tool.profile();
        let mut admissions = Vec::with_capacity(metas.len());
        for meta in metas {
            let rejection = profile.rejection_reason(&meta.extension, meta.size_bytes);
            let id = self.allocate_id();
            let (status, outcome) = match &rejection {
                Some(reason) => (
                    FileStatus::Error,
                    Some(FileOutcome::Failed {
                        message: reason.clone(),
                    }),
                ),
                None => (FileStatus::Pending, None),
            };
            admissions.push(Admission {
                name: meta.name.clone(),
                rejection,
            });
            self.files.insert(
                id,
                TrackedFile {
                    id,
                    meta,
                    status,
                    progress: 0,
                    outcome,
                    job_id: None,
                },
            );
        }
        if !admissions.is_empty() {
            self.mark_dirty();
        }
        admissions
    }

    /// Removes the entry regardless of status; no-op if absent. If this was
    /// the last in-flight file of a batch the batch flag clears too.
    pub(crate) fn remove_file(&mut self, file_id: FileId) -> bool {
        let removed = self.files.remove(&file_id).is_some();
        if removed {
            self.in_flight.remove(&file_id);
            if self.batch_running && self.in_flight.is_empty() {
                self.batch_running = false;
            }
            self.mark_dirty();
        }
        removed
    }

    /// Empties the queue and resets batch and preview bookkeeping. The bumped
    /// preview generation ensures any in-flight preview result is discarded
    /// on arrival.
    pub(crate) fn clear_all(&mut self) {
        self.files.clear();
        self.in_flight.clear();
        self.batch_running = false;
        self.completed_in_batch = 0;
        self.failed_in_batch = 0;
        self.preview_generation += 1;
        self.preview = PreviewState::Idle;
        self.mark_dirty();
    }

    /// Ids of files waiting to start, in queue order.
    pub(crate) fn pending_ids(&self) -> Vec<FileId> {
        self.files
            .values()
            .filter(|file| file.status == FileStatus::Pending)
            .map(|file| file.id)
            .collect()
    }

    pub(crate) fn begin_batch(&mut self, ids: &[FileId]) {
        self.batch_running = true;
        self.in_flight = ids.iter().copied().collect();
        self.completed_in_batch = 0;
        self.failed_in_batch = 0;
        self.mark_dirty();
    }

    pub(crate) fn set_last_options(&mut self, options: BatchOptions) {
        self.last_options = Some(options);
    }

    pub(crate) fn last_options(&self) -> Option<BatchOptions> {
        self.last_options.clone()
    }

    /// Applies transfer progress. Progress is clamped non-decreasing within a
    /// run; reaching 100 hands the file over to the service (`Processing`).
    /// Terminal files ignore late progress events.
    pub(crate) fn apply_progress(&mut self, file_id: FileId, percent: u8) {
        let Some(file) = self.files.get_mut(&file_id) else {
            return;
        };
        match file.status {
            FileStatus::Completed | FileStatus::Error => return,
            FileStatus::Pending => file.status = FileStatus::Uploading,
            FileStatus::Uploading | FileStatus::Processing => {}
        }
        let percent = percent.min(100);
        if percent > file.progress {
            file.progress = percent;
        }
        if file.progress >= 100 && file.status == FileStatus::Uploading {
            file.status = FileStatus::Processing;
        }
        self.mark_dirty();
    }

    pub(crate) fn apply_job_id(&mut self, file_id: FileId, job_id: String) {
        if let Some(file) = self.files.get_mut(&file_id) {
            file.job_id = Some(job_id);
            self.mark_dirty();
        }
    }

    /// Terminal transition. Returns `None` when the file is gone (removed
    /// mid-flight); the late result is then silently dropped.
    pub(crate) fn apply_done(
        &mut self,
        file_id: FileId,
        result: Result<Delivery, String>,
    ) -> Option<DoneReport> {
        let was_in_flight = self.in_flight.remove(&file_id);
        let file = self.files.get_mut(&file_id)?;
        let failure = match result {
            Ok(delivery) => {
                file.status = FileStatus::Completed;
                file.progress = 100;
                file.outcome = Some(FileOutcome::Delivered(delivery));
                None
            }
            Err(message) => {
                file.status = FileStatus::Error;
                file.outcome = Some(FileOutcome::Failed {
                    message: message.clone(),
                });
                Some(message)
            }
        };
        let name = file.meta.name.clone();
        if was_in_flight {
            if failure.is_some() {
                self.failed_in_batch += 1;
            } else {
                self.completed_in_batch += 1;
            }
        }
        let batch_drained = self.batch_running && self.in_flight.is_empty();
        if batch_drained {
            self.batch_running = false;
        }
        self.mark_dirty();
        Some(DoneReport {
            name,
            failure,
            batch_drained,
            completed_in_batch: self.completed_in_batch,
            failed_in_batch: self.failed_in_batch,
        })
    }

    /// Puts an errored file back to `Pending` so it can run again. Returns
    /// false when the file is absent or not in `Error`.
    pub(crate) fn reset_for_retry(&mut self, file_id: FileId) -> bool {
        let Some(file) = self.files.get_mut(&file_id) else {
            return false;
        };
        if file.status != FileStatus::Error {
            return false;
        }
        file.status = FileStatus::Pending;
        file.progress = 0;
        file.outcome = None;
        file.job_id = None;
        self.mark_dirty();
        true
    }

    /// The artifact of the last finished preview round, if any.
    pub fn preview_artifact(&self) -> Option<&PreviewArtifact> {
        match &self.preview {
            PreviewState::Ready { artifact, .. } => Some(artifact),
            _ => None,
        }
    }

    /// Starts a new preview round and returns its generation.
    pub(crate) fn begin_preview(&mut self) -> u64 {
        self.preview_generation += 1;
        self.preview = PreviewState::Waiting {
            generation: self.preview_generation,
        };
        self.mark_dirty();
        self.preview_generation
    }

    /// Applies a preview result only when it belongs to the current round.
    /// Stale responses (superseded or cleared) are discarded.
    pub(crate) fn apply_preview(
        &mut self,
        generation: u64,
        result: Result<PreviewArtifact, String>,
    ) -> bool {
        if generation != self.preview_generation {
            return false;
        }
        self.preview = match result {
            Ok(artifact) => PreviewState::Ready {
                generation,
                artifact,
            },
            Err(message) => PreviewState::Failed {
                generation,
                message,
            },
        };
        self.mark_dirty();
        true
    }
}
