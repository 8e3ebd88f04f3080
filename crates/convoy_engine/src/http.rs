use bytes::Bytes;
use convoy_core::{BatchOptions, FileId, PreviewArtifact};
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use tokio::sync::mpsc::UnboundedSender;
use url::Url;

use crate::service::{ConversionService, ProgressSink, UploadSettings};
use crate::urls::join_api;
use crate::{ConvertReply, EngineEvent, FilePayload, FileProgress, JobState, ServiceError};

/// HTTP implementation of the conversion service.
#[derive(Debug, Clone)]
pub struct HttpConversionService {
    settings: UploadSettings,
}

impl HttpConversionService {
    pub fn new(settings: UploadSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &UploadSettings {
        &self.settings
    }

    fn build_client(&self) -> Result<reqwest::Client, ServiceError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| ServiceError::Network(err.to_string()))
    }

    fn endpoint(&self, path: &str) -> Result<Url, ServiceError> {
        Url::parse(&join_api(&self.settings.api_base, path))
            .map_err(|err| ServiceError::InvalidRequest(err.to_string()))
    }
}

#[async_trait::async_trait]
impl ConversionService for HttpConversionService {
    async fn convert(
        &self,
        file_id: FileId,
        payload: &FilePayload,
        options: &BatchOptions,
        sink: &dyn ProgressSink,
    ) -> Result<ConvertReply, ServiceError> {
        let client = self.build_client()?;
        let total = payload.bytes.len() as u64;

        // The body stream reports each transmitted chunk through the channel;
        // the select loop below forwards those to the sink while the request
        // is in flight.
        let (progress_tx, mut progress_rx) = tokio::sync::mpsc::unbounded_channel();
        let body = reqwest::Body::wrap_stream(progress_stream(
            payload.bytes.clone(),
            self.settings.chunk_size,
            progress_tx,
        ));
        let file_part = reqwest::multipart::Part::stream_with_length(body, total)
            .file_name(payload.name.clone())
            .mime_str("application/octet-stream")
            .map_err(|err| ServiceError::InvalidRequest(err.to_string()))?;
        let mut form = reqwest::multipart::Form::new()
            .text("operation", operation_name(options))
            .part("file", file_part);
        for (key, value) in form_fields(options) {
            form = form.text(key, value);
        }

        sink.emit(EngineEvent::Progress(FileProgress {
            file_id,
            percent: 0,
        }));

        let send = client.post(self.endpoint("convert")?).multipart(form).send();
        tokio::pin!(send);
        let mut progress_closed = false;
        let response = loop {
            tokio::select! {
                maybe = progress_rx.recv(), if !progress_closed => match maybe {
                    Some(percent) => sink.emit(EngineEvent::Progress(FileProgress {
                        file_id,
                        percent,
                    })),
                    None => progress_closed = true,
                },
                result = &mut send => break result.map_err(map_reqwest_error)?,
            }
        };
        // Flush progress the stream emitted after the response raced ahead.
        while let Ok(percent) = progress_rx.try_recv() {
            sink.emit(EngineEvent::Progress(FileProgress { file_id, percent }));
        }
        sink.emit(EngineEvent::Progress(FileProgress {
            file_id,
            percent: 100,
        }));

        let status = response.status();
        if !status.is_success() {
            return Err(map_http_status(status.as_u16()));
        }

        let wire: ConvertWire = response
            .json()
            .await
            .map_err(|err| ServiceError::Network(err.to_string()))?;
        if !wire.success {
            return Err(ServiceError::Rejected {
                message: wire
                    .error
                    .unwrap_or_else(|| "conversion failed".to_string()),
            });
        }
        let filename = wire.filename.ok_or_else(|| {
            ServiceError::InvalidRequest("response missing filename".to_string())
        })?;
        Ok(ConvertReply {
            filename,
            download_url: wire.download_url,
            job_id: wire.job_id,
        })
    }

    async fn job_status(&self, job_id: &str) -> Result<JobState, ServiceError> {
        let client = self.build_client()?;
        let response = client
            .get(self.endpoint(&format!("status/{job_id}"))?)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(map_http_status(status.as_u16()));
        }

        let wire: StatusWire = response
            .json()
            .await
            .map_err(|err| ServiceError::Network(err.to_string()))?;
        Ok(match wire.status.as_str() {
            "completed" => JobState::Completed {
                download_url: wire.download_url,
                method: wire.method,
            },
            "failed" | "error" => JobState::Failed {
                message: wire
                    .message
                    .unwrap_or_else(|| "conversion failed".to_string()),
            },
            _ => JobState::InProgress,
        })
    }

    async fn preview(&self, options: &BatchOptions) -> Result<PreviewArtifact, ServiceError> {
        let client = self.build_client()?;
        let mut body = serde_json::Map::new();
        body.insert(
            "operation".to_string(),
            serde_json::Value::String(operation_name(options).to_string()),
        );
        for (key, value) in form_fields(options) {
            body.insert(key.to_string(), serde_json::Value::String(value));
        }

        let response = client
            .post(self.endpoint("preview")?)
            .json(&serde_json::Value::Object(body))
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(map_http_status(status.as_u16()));
        }

        let media_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = response
            .bytes()
            .await
            .map_err(map_reqwest_error)?
            .to_vec();
        Ok(PreviewArtifact { media_type, bytes })
    }
}

/// Wire name of the operation, sent alongside the file so one endpoint can
/// dispatch every tool.
pub(crate) fn operation_name(options: &BatchOptions) -> &'static str {
    match options {
        BatchOptions::Convert { .. } => "convert",
        BatchOptions::Protect { .. } => "protect",
        BatchOptions::Compress { .. } => "compress",
        BatchOptions::Qr { .. } => "qr",
    }
}

/// Flattens the option set into form fields. The password confirmation is a
/// client-side check only and never leaves the machine.
pub(crate) fn form_fields(options: &BatchOptions) -> Vec<(&'static str, String)> {
    match options {
        BatchOptions::Convert { target_format } => {
            vec![("target_format", target_format.clone())]
        }
        BatchOptions::Protect { password, .. } => vec![("password", password.clone())],
        BatchOptions::Compress { level } => vec![("level", level.as_str().to_string())],
        BatchOptions::Qr {
            text,
            size,
            margin,
            dark,
            light,
        } => vec![
            ("text", text.clone()),
            ("size", size.to_string()),
            ("margin", margin.to_string()),
            ("dark", dark.clone()),
            ("light", light.clone()),
        ],
    }
}

fn progress_stream(
    bytes: Bytes,
    chunk_size: usize,
    tx: UnboundedSender<u8>,
) -> impl futures_util::Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static {
    let total = bytes.len();
    let chunk_size = chunk_size.max(1);
    let chunks: Vec<Bytes> = (0..total)
        .step_by(chunk_size)
        .map(|start| bytes.slice(start..total.min(start + chunk_size)))
        .collect();
    let mut sent = 0usize;
    futures_util::stream::iter(chunks).map(move |chunk| {
        sent += chunk.len();
        let percent = if total == 0 {
            100
        } else {
            (sent * 100 / total) as u8
        };
        let _ = tx.send(percent);
        Ok(chunk)
    })
}

fn map_http_status(code: u16) -> ServiceError {
    match code {
        404 => ServiceError::NotFound,
        413 => ServiceError::TooLarge,
        other => ServiceError::HttpStatus(other),
    }
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        return ServiceError::Timeout;
    }
    ServiceError::Network(err.to_string())
}

#[derive(Debug, Deserialize)]
struct ConvertWire {
    #[serde(default = "default_true")]
    success: bool,
    filename: Option<String>,
    download_url: Option<String>,
    #[serde(
        default,
        alias = "conversion_id",
        alias = "compression_id",
        alias = "conversionId",
        alias = "compressionId"
    )]
    job_id: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusWire {
    status: String,
    message: Option<String>,
    download_url: Option<String>,
    method: Option<String>,
}

fn default_true() -> bool {
    true
}
