use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use convoy_core::{
    update, BatchOptions, Effect, FileId, FileMeta, FileStatus, Msg, NoticeLevel,
    PreviewArtifact, QueueState, QueueViewModel, Tool,
};
use convoy_engine::{EngineConfig, EngineEvent, EngineHandle, FilePayload};
use convoy_logging::{convoy_debug, convoy_error, convoy_info, convoy_warn};

const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Headless driver: owns the queue state, bridges reducer effects to engine
/// commands and engine events back to messages, and renders progress as log
/// lines.
pub struct Driver {
    state: QueueState,
    engine: EngineHandle,
    payloads: HashMap<FileId, FilePayload>,
}

impl Driver {
    pub fn new(tool: Tool, config: EngineConfig) -> Self {
        Self {
            state: QueueState::new(tool),
            engine: EngineHandle::new(config),
            payloads: HashMap::new(),
        }
    }

    pub fn view(&self) -> QueueViewModel {
        self.state.view()
    }

    pub fn preview_artifact(&self) -> Option<PreviewArtifact> {
        self.state.preview_artifact().cloned()
    }

    /// Reads the given paths and enqueues them. The bytes stay here, keyed
    /// by file id; the state machine only tracks metadata.
    pub fn add_files(&mut self, paths: &[PathBuf]) -> anyhow::Result<()> {
        let mut incoming = Vec::with_capacity(paths.len());
        for path in paths {
            let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            let meta = FileMeta::new(name.clone(), bytes.len() as u64);
            incoming.push((meta, FilePayload::new(name, bytes)));
        }

        let (metas, payloads): (Vec<_>, Vec<_>) = incoming.into_iter().unzip();
        self.dispatch(Msg::FilesAdded(metas));

        // Ids were assigned in append order; pair the payloads up with the
        // rows that do not have one yet.
        let mut payloads = payloads.into_iter();
        for row in self.state.view().rows {
            if !self.payloads.contains_key(&row.file_id) {
                if let Some(payload) = payloads.next() {
                    self.payloads.insert(row.file_id, payload);
                }
            }
        }
        Ok(())
    }

    /// Starts the batch and blocks until every file reached a terminal
    /// state. Returns the final view.
    pub fn run_batch(&mut self, options: BatchOptions) -> QueueViewModel {
        self.dispatch(Msg::ConvertClicked { options });
        self.wait_for_settle()
    }

    /// Fires one preview round and blocks until its result arrived or was
    /// rejected up front.
    pub fn run_preview(&mut self, options: BatchOptions) -> QueueViewModel {
        self.dispatch(Msg::PreviewEdited { options });
        self.wait_for_settle()
    }

    /// Saves every completed result under `dir`; returns the written paths.
    pub fn download_completed(&self, dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
        let mut saved = Vec::new();
        for row in self.state.view().rows {
            if let Some(url) = row.download_url {
                let path = self
                    .engine
                    .download(&url, dir)
                    .with_context(|| format!("downloading {url}"))?;
                convoy_info!("saved {}", path.display());
                saved.push(path);
            }
        }
        Ok(saved)
    }

    fn dispatch(&mut self, msg: Msg) {
        let (state, effects) = update(self.state.clone(), msg);
        self.state = state;
        self.run_effects(effects);
    }

    fn run_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::UploadFile { file_id, options } => {
                    match self.payloads.get(&file_id) {
                        Some(payload) => {
                            self.engine.upload(file_id, payload.clone(), options)
                        }
                        None => convoy_warn!("no payload for file {file_id}, skipping"),
                    }
                }
                Effect::RequestPreview {
                    generation,
                    options,
                } => self.engine.request_preview(generation, options),
                Effect::CancelInFlight => self.engine.cancel_all(),
                Effect::Notify { level, text } => match level {
                    NoticeLevel::Info => convoy_info!("{text}"),
                    NoticeLevel::Warning => convoy_warn!("{text}"),
                    NoticeLevel::Error => convoy_error!("{text}"),
                },
            }
        }
    }

    fn wait_for_settle(&mut self) -> QueueViewModel {
        loop {
            while let Some(event) = self.engine.try_recv() {
                let msg = event_to_msg(event);
                self.dispatch(msg);
            }
            if self.state.consume_dirty() {
                render(&self.state.view());
            }
            if self.is_settled() {
                return self.state.view();
            }
            std::thread::sleep(EVENT_POLL_INTERVAL);
        }
    }

    fn is_settled(&self) -> bool {
        let view = self.state.view();
        let files_settled = view.rows.iter().all(|row| {
            matches!(
                row.status,
                FileStatus::Pending | FileStatus::Completed | FileStatus::Error
            )
        });
        let preview_settled = view.preview.as_ref().map_or(true, |preview| !preview.waiting);
        !view.batch_running && files_settled && preview_settled
    }
}

fn event_to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Progress(progress) => Msg::UploadProgress {
            file_id: progress.file_id,
            percent: progress.percent,
        },
        EngineEvent::JobAccepted { file_id, job_id } => Msg::JobAccepted { file_id, job_id },
        EngineEvent::UploadCompleted { file_id, result } => Msg::FileDone {
            file_id,
            result: result.map_err(|err| err.to_string()),
        },
        EngineEvent::PreviewCompleted { generation, result } => Msg::PreviewReady {
            generation,
            result: result.map_err(|err| err.to_string()),
        },
    }
}

fn render(view: &QueueViewModel) {
    for row in &view.rows {
        match (&row.download_url, &row.error) {
            (Some(url), _) => {
                convoy_info!("[{}] {} {}% -> {url}", row.status, row.name, row.progress)
            }
            (_, Some(error)) => {
                convoy_info!("[{}] {} {}% ({error})", row.status, row.name, row.progress)
            }
            _ => convoy_debug!("[{}] {} {}%", row.status, row.name, row.progress),
        }
    }
}
