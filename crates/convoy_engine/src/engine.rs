use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use convoy_core::{BatchOptions, Delivery, FileId};
use tokio_util::sync::CancellationToken;

use crate::download::{download_result, DownloadError};
use crate::http::HttpConversionService;
use crate::poll::{poll_until_terminal, PollSettings};
use crate::service::{ChannelProgressSink, ConversionService, ProgressSink, UploadSettings};
use crate::urls::resolve_download_url;
use crate::{EngineEvent, FilePayload, PollOutcome, ServiceError};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub upload: UploadSettings,
    pub poll: PollSettings,
    /// Idle delay before a preview request actually fires.
    pub preview_debounce: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            upload: UploadSettings::default(),
            poll: PollSettings::default(),
            preview_debounce: Duration::from_millis(800),
        }
    }
}

struct UploadCommand {
    file_id: FileId,
    payload: FilePayload,
    options: BatchOptions,
    /// Token captured when the command was submitted. Cancelling the queue
    /// invalidates commands that have not started yet and stops polling, but
    /// a request already on the wire is left to finish; its stale result is
    /// dropped by the state machine.
    cancel: CancellationToken,
}

/// Thread-backed engine. Upload commands are processed strictly one at a
/// time in submission order; previews run beside the batch on the same
/// runtime.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<UploadCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    event_tx: mpsc::Sender<EngineEvent>,
    rt: tokio::runtime::Handle,
    service: Arc<dyn ConversionService>,
    config: EngineConfig,
    cancel: Mutex<CancellationToken>,
    preview_cancel: Mutex<CancellationToken>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Self {
        let service = Arc::new(HttpConversionService::new(config.upload.clone()));
        Self::with_service(config, service)
    }

    /// Same engine, custom service implementation. Tests use this to
    /// substitute mocks for the HTTP layer.
    pub fn with_service(config: EngineConfig, service: Arc<dyn ConversionService>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<UploadCommand>();
        let (event_tx, event_rx) = mpsc::channel();
        let (rt_tx, rt_rx) = mpsc::channel();

        {
            let service = service.clone();
            let event_tx = event_tx.clone();
            let config = config.clone();
            thread::spawn(move || {
                let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
                let _ = rt_tx.send(runtime.handle().clone());
                // One command at a time: the next file starts only after the
                // previous one resolved.
                while let Ok(command) = cmd_rx.recv() {
                    if command.cancel.is_cancelled() {
                        continue;
                    }
                    runtime.block_on(handle_upload(
                        service.as_ref(),
                        &config,
                        command,
                        &event_tx,
                    ));
                }
            });
        }

        let rt = rt_rx.recv().expect("engine runtime handle");
        Self {
            cmd_tx,
            event_rx,
            event_tx,
            rt,
            service,
            config,
            cancel: Mutex::new(CancellationToken::new()),
            preview_cancel: Mutex::new(CancellationToken::new()),
        }
    }

    pub fn upload(&self, file_id: FileId, payload: FilePayload, options: BatchOptions) {
        let cancel = self.cancel.lock().expect("cancel token lock").clone();
        let _ = self.cmd_tx.send(UploadCommand {
            file_id,
            payload,
            options,
            cancel,
        });
    }

    /// Schedules a debounced preview. A newer request supersedes a pending
    /// one; whichever response still arrives is tagged with its generation so
    /// the state machine can discard stale ones.
    pub fn request_preview(&self, generation: u64, options: BatchOptions) {
        let token = {
            let mut guard = self.preview_cancel.lock().expect("preview token lock");
            guard.cancel();
            let fresh = self
                .cancel
                .lock()
                .expect("cancel token lock")
                .child_token();
            *guard = fresh.clone();
            fresh
        };
        let service = self.service.clone();
        let event_tx = self.event_tx.clone();
        let debounce = self.config.preview_debounce;
        self.rt.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(debounce) => {}
            }
            let result = tokio::select! {
                _ = token.cancelled() => return,
                result = service.preview(&options) => result,
            };
            let _ = event_tx.send(EngineEvent::PreviewCompleted { generation, result });
        });
    }

    /// Stops polling, drops queued uploads that have not started, and
    /// discards any pending preview. Called on queue reset and teardown.
    pub fn cancel_all(&self) {
        {
            let mut guard = self.cancel.lock().expect("cancel token lock");
            guard.cancel();
            *guard = CancellationToken::new();
        }
        let mut preview = self.preview_cancel.lock().expect("preview token lock");
        preview.cancel();
        *preview = CancellationToken::new();
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Saves a finished result under `dir`, blocking the calling thread
    /// until the transfer finished. The work runs on the engine runtime, so
    /// this is safe to call from any thread.
    pub fn download(&self, url: &str, dir: &Path) -> Result<PathBuf, DownloadError> {
        let (tx, rx) = mpsc::channel();
        let url = url.to_string();
        let dir = dir.to_path_buf();
        let timeout = self.config.upload.request_timeout;
        self.rt.spawn(async move {
            let _ = tx.send(download_result(&url, &dir, timeout).await);
        });
        rx.recv()
            .map_err(|_| DownloadError::Network("engine runtime stopped".to_string()))?
    }
}

async fn handle_upload(
    service: &dyn ConversionService,
    config: &EngineConfig,
    command: UploadCommand,
    event_tx: &mpsc::Sender<EngineEvent>,
) {
    let UploadCommand {
        file_id,
        payload,
        options,
        cancel,
    } = command;
    let sink = ChannelProgressSink::new(event_tx.clone());
    convoy_logging::convoy_info!(
        "upload start file_id={file_id} name={} bytes={}",
        payload.name,
        payload.bytes.len()
    );
    match run_conversion(service, config, file_id, &payload, &options, &sink, &cancel).await {
        Ok(Some(delivery)) => {
            let _ = event_tx.send(EngineEvent::UploadCompleted {
                file_id,
                result: Ok(delivery),
            });
        }
        // Cancelled mid-poll: the queue is already gone, nothing to report.
        Ok(None) => {}
        Err(err) => {
            let _ = event_tx.send(EngineEvent::UploadCompleted {
                file_id,
                result: Err(err),
            });
        }
    }
}

async fn run_conversion(
    service: &dyn ConversionService,
    config: &EngineConfig,
    file_id: FileId,
    payload: &FilePayload,
    options: &BatchOptions,
    sink: &dyn ProgressSink,
    cancel: &CancellationToken,
) -> Result<Option<Delivery>, ServiceError> {
    let reply = service.convert(file_id, payload, options, sink).await?;

    if let Some(job_id) = reply.job_id {
        sink.emit(EngineEvent::JobAccepted {
            file_id,
            job_id: job_id.clone(),
        });
        let outcome = poll_until_terminal(
            service,
            &job_id,
            &config.poll,
            &config.upload.api_base,
            cancel,
        )
        .await;
        return match outcome {
            PollOutcome::Done(delivery) | PollOutcome::Assumed(delivery) => Ok(Some(delivery)),
            PollOutcome::Failed { message } => Err(ServiceError::Rejected { message }),
            PollOutcome::Cancelled => Ok(None),
        };
    }

    let download_url = match reply.download_url {
        Some(url) => resolve_download_url(&config.upload.api_base, &url),
        None => resolve_download_url(&config.upload.api_base, &reply.filename),
    };
    Ok(Some(Delivery {
        download_url,
        method: None,
    }))
}
