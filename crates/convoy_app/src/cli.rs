use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use convoy_core::{BatchOptions, CompressionLevel, Tool};

#[derive(Debug, Parser)]
#[command(name = "convoy", about = "Batch client for a file-conversion service")]
pub struct Cli {
    /// Base URL of the conversion API.
    #[arg(long, global = true, env = "CONVOY_API_BASE", default_value = "http://localhost:8080")]
    pub api_base: String,

    /// Directory where finished results are saved.
    #[arg(long, global = true, default_value = "output")]
    pub output_dir: PathBuf,

    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert PDFs to Word documents.
    PdfToWord {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long, default_value = "docx")]
        target_format: String,
    },
    /// Password-protect PDFs.
    PdfProtect {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long)]
        password: String,
        /// Repeat the password; defaults to the value of --password.
        #[arg(long)]
        confirm_password: Option<String>,
    },
    /// Shrink PDFs through the asynchronous compression jobs.
    PdfCompress {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long, value_enum, default_value = "balanced")]
        level: LevelArg,
    },
    /// Convert images between formats.
    ImageConvert {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long)]
        target_format: String,
    },
    /// Compress images.
    ImageCompress {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long, value_enum, default_value = "balanced")]
        level: LevelArg,
    },
    /// Convert font files.
    FontConvert {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long)]
        target_format: String,
    },
    /// Generate a QR code from text.
    Qr {
        #[arg(long)]
        text: String,
        #[arg(long, default_value_t = 512)]
        size: u32,
        #[arg(long, default_value_t = 16)]
        margin: u32,
        #[arg(long, default_value = "#000000")]
        dark: String,
        #[arg(long, default_value = "#ffffff")]
        light: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LevelArg {
    Low,
    Balanced,
    High,
}

impl From<LevelArg> for CompressionLevel {
    fn from(level: LevelArg) -> Self {
        match level {
            LevelArg::Low => CompressionLevel::Low,
            LevelArg::Balanced => CompressionLevel::Balanced,
            LevelArg::High => CompressionLevel::High,
        }
    }
}

impl Command {
    pub fn tool(&self) -> Tool {
        match self {
            Command::PdfToWord { .. } => Tool::PdfToWord,
            Command::PdfProtect { .. } => Tool::PdfProtect,
            Command::PdfCompress { .. } => Tool::PdfCompress,
            Command::ImageConvert { .. } => Tool::ImageConvert,
            Command::ImageCompress { .. } => Tool::ImageCompress,
            Command::FontConvert { .. } => Tool::FontConvert,
            Command::Qr { .. } => Tool::QrGenerate,
        }
    }

    pub fn files(&self) -> &[PathBuf] {
        match self {
            Command::PdfToWord { files, .. }
            | Command::PdfProtect { files, .. }
            | Command::PdfCompress { files, .. }
            | Command::ImageConvert { files, .. }
            | Command::ImageCompress { files, .. }
            | Command::FontConvert { files, .. } => files,
            Command::Qr { .. } => &[],
        }
    }

    pub fn options(&self) -> BatchOptions {
        match self {
            Command::PdfToWord { target_format, .. }
            | Command::ImageConvert { target_format, .. }
            | Command::FontConvert { target_format, .. } => BatchOptions::Convert {
                target_format: target_format.clone(),
            },
            Command::PdfProtect {
                password,
                confirm_password,
                ..
            } => BatchOptions::Protect {
                password: password.clone(),
                confirm_password: confirm_password
                    .clone()
                    .unwrap_or_else(|| password.clone()),
            },
            Command::PdfCompress { level, .. } | Command::ImageCompress { level, .. } => {
                BatchOptions::Compress {
                    level: (*level).into(),
                }
            }
            Command::Qr {
                text,
                size,
                margin,
                dark,
                light,
            } => BatchOptions::Qr {
                text: text.clone(),
                size: *size,
                margin: *margin,
                dark: dark.clone(),
                light: light.clone(),
            },
        }
    }
}
