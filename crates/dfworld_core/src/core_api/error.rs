use std::error::Error;
use std::fmt;
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreErrorCode {
    Io,
    Framing,
    Decode,
    AlreadyDecompressed,
    UnsupportedKind,
    TruncatedString,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreError {
    pub code: CoreErrorCode,
    pub message: String,
}

impl CoreError {
    pub fn new(code: CoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn framing(message: impl Into<String>) -> Self {
        Self::new(CoreErrorCode::Framing, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(CoreErrorCode::Decode, message)
    }

    fn io_kind(&self) -> io::ErrorKind {
        match self.code {
            CoreErrorCode::Framing | CoreErrorCode::TruncatedString => {
                io::ErrorKind::UnexpectedEof
            }
            CoreErrorCode::Decode => io::ErrorKind::InvalidData,
            CoreErrorCode::Io
            | CoreErrorCode::AlreadyDecompressed
            | CoreErrorCode::UnsupportedKind => io::ErrorKind::Other,
        }
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl Error for CoreError {}

/// Wraps the error so that it survives a trip through `std::io::Read`.
impl From<CoreError> for io::Error {
    fn from(err: CoreError) -> Self {
        io::Error::new(err.io_kind(), err)
    }
}

/// Recovers a wrapped `CoreError` intact; bare io errors are classified by kind.
impl From<io::Error> for CoreError {
    fn from(err: io::Error) -> Self {
        if let Some(inner) = err.get_ref().and_then(|e| e.downcast_ref::<CoreError>()) {
            return inner.clone();
        }
        match err.kind() {
            io::ErrorKind::UnexpectedEof => {
                CoreError::framing(format!("premature end of file: {err}"))
            }
            _ => CoreError::new(CoreErrorCode::Io, err.to_string()),
        }
    }
}
