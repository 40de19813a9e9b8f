use std::fmt::Display;
use std::io;

use log::Level;

use crate::process::Format;

/// Returns `$err` when `$level` is at or above the context's fail level,
/// otherwise records it as a [`Diagnostic`] and carries on.
#[macro_export]
macro_rules! report_or_err {
    ($ctx:expr, $level:expr, $err:expr $(,)?) => {{
        let err = $err;
        if $level <= $ctx.fail_level() {
            return Err(err.into());
        } else {
            $ctx.report($level, &err);
        }
    }};
}

/// Why a decode attempt did not produce a descriptor.
#[derive(thiserror::Error, Debug)]
pub enum DecodeFailure {
    #[error("Signature not found")]
    SignatureMismatch { format: Format },

    #[error("No decoder recognised the stream signature")]
    Unrecognized,

    #[error("Unsupported format version {version}, expected at most {supported}")]
    UnsupportedVersion {
        format: Format,
        version: u32,
        supported: u32,
    },

    #[error("{field} is zero, duration cannot be derived")]
    Degenerate { format: Format, field: &'static str },

    #[error("{source}")]
    Header {
        format: Option<Format>,
        #[source]
        source: HeaderError,
    },

    #[error("Header truncated: {source}")]
    Io {
        format: Option<Format>,
        #[source]
        source: io::Error,
    },
}

impl From<HeaderError> for DecodeFailure {
    fn from(source: HeaderError) -> Self {
        DecodeFailure::Header {
            format: None,
            source,
        }
    }
}

impl From<io::Error> for DecodeFailure {
    fn from(source: io::Error) -> Self {
        DecodeFailure::Io {
            format: None,
            source,
        }
    }
}

impl DecodeFailure {
    /// Severity of this failure for reporting, `None` when it is the ordinary
    /// "not my file" answer.
    pub fn level(&self) -> Option<Level> {
        match self {
            DecodeFailure::SignatureMismatch { .. } | DecodeFailure::Unrecognized => None,
            DecodeFailure::UnsupportedVersion { .. } => Some(Level::Warn),
            DecodeFailure::Degenerate { .. } => Some(Level::Warn),
            DecodeFailure::Header { .. } => Some(Level::Warn),
            DecodeFailure::Io { .. } => Some(Level::Debug),
        }
    }

    /// The format whose decoder failed, when known.
    pub fn format(&self) -> Option<Format> {
        match self {
            DecodeFailure::SignatureMismatch { format }
            | DecodeFailure::UnsupportedVersion { format, .. }
            | DecodeFailure::Degenerate { format, .. } => Some(*format),
            DecodeFailure::Header { format, .. } | DecodeFailure::Io { format, .. } => *format,
            DecodeFailure::Unrecognized => None,
        }
    }

    /// Tags a failure raised below the decoder with the decoder's format.
    pub fn with_format(self, format: Format) -> Self {
        match self {
            DecodeFailure::Header { source, .. } => DecodeFailure::Header {
                format: Some(format),
                source,
            },
            DecodeFailure::Io { source, .. } => DecodeFailure::Io {
                format: Some(format),
                source,
            },
            other => other,
        }
    }

    pub fn diagnostic(&self) -> Option<Diagnostic> {
        self.level()
            .map(|level| Diagnostic::new(level, self.format(), self))
    }
}

/// Structurally valid but suspicious header content.
///
/// These are recorded as diagnostics unless the fail level makes them fatal.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    #[error("Unknown {field} code {code:#X}")]
    UnknownCode { field: &'static str, code: u32 },

    #[error("Reserved bitrate code {code} (table value {value})")]
    ReservedBitrate { code: u8, value: i32 },

    #[error("Header CRC mismatch. Calculated {calculated:#010X}, Read {read:#010X}")]
    CrcMismatch { calculated: u32, read: u32 },

    #[error("Audio format {0} is encrypted")]
    Encrypted(u16),

    #[error("Expected chunk {expected:?}, found {found:?}")]
    UnexpectedChunk { expected: [u8; 4], found: [u8; 4] },
}

/// An event worth surfacing to the caller, returned as data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Level,
    pub format: Option<Format>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(level: Level, format: Option<Format>, message: impl Display) -> Self {
        Self {
            level,
            format,
            message: message.to_string(),
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.format {
            Some(format) => write!(f, "{format}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ZoneError {
    #[error("No zone named {0:?}")]
    UnknownZone(String),

    #[error("Patch at offset {offset}: value {value} does not fit in {width} bytes")]
    Overflow {
        offset: u64,
        width: usize,
        value: i128,
    },
}
