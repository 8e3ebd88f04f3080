const MB: u64 = 1024 * 1024;

/// The conversion tools the service exposes. Each tool accepts its own set of
/// input formats and enforces its own upload size limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    PdfToWord,
    PdfProtect,
    PdfCompress,
    ImageConvert,
    ImageCompress,
    FontConvert,
    QrGenerate,
}

/// Static intake rules for one tool: which file extensions are admitted and
/// how large an upload may be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolProfile {
    /// Lowercase extensions (without the dot) this tool accepts. Empty means
    /// the tool takes no file uploads at all (e.g. QR generation).
    pub accepted_extensions: &'static [&'static str],
    pub max_bytes: u64,
}

impl Tool {
    pub fn profile(self) -> ToolProfile {
        match self {
            Tool::PdfToWord | Tool::PdfProtect | Tool::PdfCompress => ToolProfile {
                accepted_extensions: &["pdf"],
                max_bytes: 100 * MB,
            },
            Tool::ImageConvert => ToolProfile {
                accepted_extensions: &["jpg", "jpeg", "png", "webp", "gif", "bmp", "tiff"],
                max_bytes: 200 * MB,
            },
            Tool::ImageCompress => ToolProfile {
                accepted_extensions: &["jpg", "jpeg", "png", "webp"],
                max_bytes: 50 * MB,
            },
            Tool::FontConvert => ToolProfile {
                accepted_extensions: &["ttf", "otf", "woff", "woff2"],
                max_bytes: 50 * MB,
            },
            Tool::QrGenerate => ToolProfile {
                accepted_extensions: &[],
                max_bytes: 0,
            },
        }
    }
}

impl ToolProfile {
    /// Checks one file against the intake rules. Returns the reason the file
    /// is not admissible, or `None` when it is.
    pub fn rejection_reason(&self, extension: &str, size_bytes: u64) -> Option<String> {
        if self.accepted_extensions.is_empty() {
            return Some("this tool does not take file uploads".to_string());
        }
        if !self
            .accepted_extensions
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(extension))
        {
            if extension.is_empty() {
                return Some("file has no extension".to_string());
            }
            return Some(format!("unsupported file type .{extension}"));
        }
        if size_bytes > self.max_bytes {
            return Some(format!("file exceeds the {} MB limit", self.max_bytes / MB));
        }
        None
    }
}
