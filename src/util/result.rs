use std::{fmt::Display, io};

use thiserror::Error as ThisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Code {
    NotFound = 1,
    Corruption = 2,
    NotSupported = 3,
    InvalidArgument = 4,
    IOError = 5,
    FailedPrecondition = 6,
}

impl Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            Code::NotFound => "NotFound",
            Code::Corruption => "Corruption",
            Code::NotSupported => "NotSupported",
            Code::InvalidArgument => "InvalidArgument",
            Code::IOError => "IOError",
            Code::FailedPrecondition => "FailedPrecondition",
        };
        f.write_str(str)
    }
}

#[derive(Debug, Clone, ThisError)]
#[error("{code}: {msg}")]
pub struct Error {
    code: Code,
    msg: String,
}

impl Error {
    fn new(code: Code, msg: &str) -> Self {
        Self {
            code,
            msg: msg.to_owned(),
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self::new(Code::NotFound, msg)
    }

    pub fn corruption(msg: &str) -> Self {
        Self::new(Code::Corruption, msg)
    }

    pub fn not_supported(msg: &str) -> Self {
        Self::new(Code::NotSupported, msg)
    }

    pub fn invalid_argument(msg: &str) -> Self {
        Self::new(Code::InvalidArgument, msg)
    }

    pub fn io_error(msg: &str) -> Self {
        Self::new(Code::IOError, msg)
    }

    pub fn failed_precondition(msg: &str) -> Self {
        Self::new(Code::FailedPrecondition, msg)
    }

    /// Same error with `context` prepended to the message.
    pub fn with_context(&self, context: &str) -> Self {
        Self::new(self.code, &format!("{}: {}", context, self.msg))
    }

    pub fn code(&self) -> Code {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.msg
    }

    pub fn is_not_found(&self) -> bool {
        self.code == Code::NotFound
    }

    pub fn is_corruption(&self) -> bool {
        self.code == Code::Corruption
    }

    pub fn is_not_supported(&self) -> bool {
        self.code == Code::NotSupported
    }

    pub fn is_invalid_argument(&self) -> bool {
        self.code == Code::InvalidArgument
    }

    pub fn is_io_error(&self) -> bool {
        self.code == Code::IOError
    }

    pub fn is_failed_precondition(&self) -> bool {
        self.code == Code::FailedPrecondition
    }

    /// Malformed bytes: bad magic, truncation, unknown version, bad
    /// compressed data or checksum mismatch.
    pub fn is_format_error(&self) -> bool {
        self.is_corruption() || self.is_not_supported()
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        // Errors of this crate may travel through `io::Read`/`io::Write`
        // adapters; hand them back untouched.
        if let Some(inner) = error.get_ref().and_then(|e| e.downcast_ref::<Error>()) {
            return inner.clone();
        }
        match error.kind() {
            io::ErrorKind::NotFound => Error::not_found(&error.to_string()),
            _ => Error::io_error(&error.to_string()),
        }
    }
}

impl From<Error> for io::Error {
    fn from(error: Error) -> Self {
        io::Error::new(io::ErrorKind::Other, error)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
