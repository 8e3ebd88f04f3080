use crate::{Effect, Msg, NoticeLevel, QueueState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: QueueState, msg: Msg) -> (QueueState, Vec<Effect>) {
    let effects = match msg {
        Msg::FilesAdded(metas) => {
            if metas.is_empty() {
                return (state, Vec::new());
            }
            let admissions = state.admit_files(metas);
            admissions
                .into_iter()
                .filter_map(|admission| {
                    admission.rejection.map(|reason| Effect::Notify {
                        level: NoticeLevel::Warning,
                        text: format!("\"{}\": {reason}", admission.name),
                    })
                })
                .collect()
        }
        Msg::FileRemoved { file_id } => {
            state.remove_file(file_id);
            Vec::new()
        }
        Msg::ClearAll => {
            state.clear_all();
            vec![Effect::CancelInFlight]
        }
        Msg::ConvertClicked { options } => {
            if state.batch_running() {
                return (
                    state,
                    vec![warn("A batch is already running. Wait for it to finish.")],
                );
            }
            if let Err(err) = options.validate() {
                return (state, vec![warn(err.to_string())]);
            }
            let pending = state.pending_ids();
            if pending.is_empty() {
                return (state, vec![warn("No files waiting for conversion.")]);
            }
            state.begin_batch(&pending);
            state.set_last_options(options.clone());
            pending
                .into_iter()
                .map(|file_id| Effect::UploadFile {
                    file_id,
                    options: options.clone(),
                })
                .collect()
        }
        Msg::RetryClicked { file_id } => {
            if state.batch_running() {
                return (
                    state,
                    vec![warn("A batch is already running. Wait for it to finish.")],
                );
            }
            if !state.reset_for_retry(file_id) {
                return (state, vec![warn("Nothing to retry for that file.")]);
            }
            match state.last_options() {
                Some(options) => {
                    state.begin_batch(&[file_id]);
                    vec![Effect::UploadFile { file_id, options }]
                }
                // The only errored files before any batch ran are the ones
                // that failed intake; rerunning them cannot succeed.
                None => vec![warn("Nothing to retry for that file.")],
            }
        }
        Msg::UploadProgress { file_id, percent } => {
            state.apply_progress(file_id, percent);
            Vec::new()
        }
        Msg::JobAccepted { file_id, job_id } => {
            state.apply_job_id(file_id, job_id);
            Vec::new()
        }
        Msg::FileDone { file_id, result } => match state.apply_done(file_id, result) {
            Some(report) => {
                let mut effects = Vec::with_capacity(2);
                match &report.failure {
                    Some(message) => effects.push(Effect::Notify {
                        level: NoticeLevel::Error,
                        text: format!("\"{}\" failed: {message}", report.name),
                    }),
                    None => effects.push(Effect::Notify {
                        level: NoticeLevel::Info,
                        text: format!("\"{}\" completed.", report.name),
                    }),
                }
                if report.batch_drained {
                    effects.push(Effect::Notify {
                        level: NoticeLevel::Info,
                        text: format!(
                            "Batch finished: {} completed, {} failed.",
                            report.completed_in_batch, report.failed_in_batch
                        ),
                    });
                }
                effects
            }
            None => Vec::new(),
        },
        Msg::PreviewEdited { options } => {
            if let Err(err) = options.validate() {
                return (state, vec![warn(err.to_string())]);
            }
            let generation = state.begin_preview();
            vec![Effect::RequestPreview {
                generation,
                options,
            }]
        }
        Msg::PreviewReady { generation, result } => {
            state.apply_preview(generation, result);
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn warn(text: impl Into<String>) -> Effect {
    Effect::Notify {
        level: NoticeLevel::Warning,
        text: text.into(),
    }
}
