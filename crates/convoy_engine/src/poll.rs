use std::time::Duration;

use convoy_core::Delivery;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::service::ConversionService;
use crate::urls::{assumed_result_filename, resolve_download_url};
use crate::{JobState, PollOutcome, ServiceError};

#[derive(Debug, Clone)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 60,
        }
    }
}

/// Queries the status endpoint until the job reaches a terminal state.
///
/// Two failure modes deliberately do not fail the file: a vanished status
/// endpoint and an exhausted attempt cap both yield `Assumed`, with the
/// download URL derived from the job id's naming convention.
pub async fn poll_until_terminal(
    service: &dyn ConversionService,
    job_id: &str,
    settings: &PollSettings,
    api_base: &Url,
    cancel: &CancellationToken,
) -> PollOutcome {
    let assumed = || {
        PollOutcome::Assumed(Delivery {
            download_url: resolve_download_url(api_base, &assumed_result_filename(job_id)),
            method: Some("assumed completed".to_string()),
        })
    };

    for attempt in 1..=settings.max_attempts {
        if cancel.is_cancelled() {
            return PollOutcome::Cancelled;
        }
        match service.job_status(job_id).await {
            Ok(JobState::Completed {
                download_url,
                method,
            }) => {
                let download_url = match download_url {
                    Some(url) => resolve_download_url(api_base, &url),
                    None => {
                        resolve_download_url(api_base, &assumed_result_filename(job_id))
                    }
                };
                return PollOutcome::Done(Delivery {
                    download_url,
                    method,
                });
            }
            Ok(JobState::Failed { message }) => return PollOutcome::Failed { message },
            Ok(JobState::InProgress) => {}
            Err(ServiceError::NotFound) => {
                // The status route is gone but the job most likely ran.
                convoy_logging::convoy_warn!(
                    "status endpoint missing for job {job_id}, assuming completion"
                );
                return assumed();
            }
            Err(err) => {
                convoy_logging::convoy_debug!(
                    "status check {attempt}/{} for job {job_id} failed: {err}",
                    settings.max_attempts
                );
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => return PollOutcome::Cancelled,
            _ = tokio::time::sleep(settings.interval) => {}
        }
    }

    convoy_logging::convoy_warn!(
        "job {job_id} not terminal after {} attempts, assuming completion",
        settings.max_attempts
    );
    assumed()
}
