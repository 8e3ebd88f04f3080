use std::fmt;

/// Minimum accepted password length for protected outputs.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Compression strength requested from the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    Low,
    #[default]
    Balanced,
    High,
}

impl CompressionLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            CompressionLevel::Low => "low",
            CompressionLevel::Balanced => "balanced",
            CompressionLevel::High => "high",
        }
    }
}

/// The options shared by every file in one batch. One variant per tool
/// family; every field is explicit so validation can name what is wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOptions {
    /// Format conversion (PDF to Word, image formats, fonts).
    Convert { target_format: String },
    /// Password-protect the output.
    Protect {
        password: String,
        confirm_password: String,
    },
    /// Lossy or lossless size reduction.
    Compress { level: CompressionLevel },
    /// QR code generation from a text prompt.
    Qr {
        text: String,
        size: u32,
        margin: u32,
        dark: String,
        light: String,
    },
}

impl BatchOptions {
    /// Checks the option set before any file is allowed to start uploading.
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), OptionsError> {
        match self {
            BatchOptions::Convert { target_format } => {
                if target_format.trim().is_empty() {
                    return Err(OptionsError::EmptyTargetFormat);
                }
            }
            BatchOptions::Protect {
                password,
                confirm_password,
            } => {
                if password.is_empty() {
                    return Err(OptionsError::EmptyPassword);
                }
                if password.len() < MIN_PASSWORD_LEN {
                    return Err(OptionsError::PasswordTooShort {
                        min: MIN_PASSWORD_LEN,
                    });
                }
                if password != confirm_password {
                    return Err(OptionsError::PasswordMismatch);
                }
            }
            BatchOptions::Compress { .. } => {}
            BatchOptions::Qr { text, size, .. } => {
                if text.trim().is_empty() {
                    return Err(OptionsError::EmptyQrText);
                }
                if !(64..=2048).contains(size) {
                    return Err(OptionsError::QrSizeOutOfRange);
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    EmptyTargetFormat,
    EmptyPassword,
    PasswordTooShort { min: usize },
    PasswordMismatch,
    EmptyQrText,
    QrSizeOutOfRange,
}

impl fmt::Display for OptionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionsError::EmptyTargetFormat => write!(f, "Choose a target format."),
            OptionsError::EmptyPassword => write!(f, "Enter a password."),
            OptionsError::PasswordTooShort { min } => {
                write!(f, "Password must be at least {min} characters.")
            }
            OptionsError::PasswordMismatch => write!(f, "Passwords do not match."),
            OptionsError::EmptyQrText => write!(f, "Enter text to encode."),
            OptionsError::QrSizeOutOfRange => {
                write!(f, "QR size must be between 64 and 2048 pixels.")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BatchOptions, CompressionLevel, OptionsError};

    #[test]
    fn protect_rejects_short_and_mismatched_passwords() {
        let short = BatchOptions::Protect {
            password: "abc".into(),
            confirm_password: "abc".into(),
        };
        assert_eq!(
            short.validate(),
            Err(OptionsError::PasswordTooShort { min: 6 })
        );

        let mismatch = BatchOptions::Protect {
            password: "secret-1".into(),
            confirm_password: "secret-2".into(),
        };
        assert_eq!(mismatch.validate(), Err(OptionsError::PasswordMismatch));

        let ok = BatchOptions::Protect {
            password: "secret-1".into(),
            confirm_password: "secret-1".into(),
        };
        assert_eq!(ok.validate(), Ok(()));
    }

    #[test]
    fn compress_always_validates() {
        let options = BatchOptions::Compress {
            level: CompressionLevel::High,
        };
        assert_eq!(options.validate(), Ok(()));
    }

    #[test]
    fn qr_requires_text() {
        let options = BatchOptions::Qr {
            text: "   ".into(),
            size: 256,
            margin: 4,
            dark: "#000000".into(),
            light: "#ffffff".into(),
        };
        assert_eq!(options.validate(), Err(OptionsError::EmptyQrText));
    }
}
