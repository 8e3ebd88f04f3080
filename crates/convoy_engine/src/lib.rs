//! Convoy engine: conversion-service I/O and queue effect execution.
mod download;
mod engine;
mod http;
mod poll;
mod service;
mod types;
mod urls;

pub use download::{download_result, ensure_output_dir, DownloadError};
pub use engine::{EngineConfig, EngineHandle};
pub use http::HttpConversionService;
pub use poll::{poll_until_terminal, PollSettings};
pub use service::{ChannelProgressSink, ConversionService, ProgressSink, UploadSettings};
pub use types::{
    ConvertReply, EngineEvent, FilePayload, FileProgress, JobState, PollOutcome, ServiceError,
};
pub use urls::{assumed_result_filename, resolve_download_url};
