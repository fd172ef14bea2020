//! Error types for giztoy-opus.

use std::os::raw::c_int;

use crate::ffi;

/// Result type alias for giztoy-opus.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for opus operations.
///
/// Every variant except [`Error::Disposed`] corresponds to a negative
/// libopus return code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// One or more invalid/out of range arguments.
    #[error("opus: invalid argument")]
    BadArgument,

    /// Not enough bytes allocated in the buffer.
    #[error("opus: buffer too small")]
    BufferTooSmall,

    /// An internal error was detected.
    #[error("opus: internal error")]
    InternalError,

    /// The compressed data passed is corrupted.
    #[error("opus: corrupted stream")]
    InvalidPacket,

    /// Invalid/unsupported request number.
    #[error("opus: request not implemented")]
    Unimplemented,

    /// An encoder or decoder structure is invalid or already freed.
    #[error("opus: invalid state")]
    InvalidState,

    /// Memory allocation has failed.
    #[error("opus: memory allocation failed")]
    AllocationFailure,

    /// A negative code libopus does not document.
    #[error("opus: unknown error {0}")]
    Unknown(i32),

    /// The encoder or decoder was disposed before the call.
    #[error("opus: instance is disposed")]
    Disposed,
}

impl Error {
    /// Maps a negative native return code to its error kind.
    pub fn from_code(code: c_int) -> Self {
        match code {
            ffi::OPUS_BAD_ARG => Self::BadArgument,
            ffi::OPUS_BUFFER_TOO_SMALL => Self::BufferTooSmall,
            ffi::OPUS_INTERNAL_ERROR => Self::InternalError,
            ffi::OPUS_INVALID_PACKET => Self::InvalidPacket,
            ffi::OPUS_UNIMPLEMENTED => Self::Unimplemented,
            ffi::OPUS_INVALID_STATE => Self::InvalidState,
            ffi::OPUS_ALLOC_FAIL => Self::AllocationFailure,
            other => Self::Unknown(other),
        }
    }

    /// Returns the native code this error was mapped from.
    ///
    /// `Disposed` never reaches native code and has none.
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::BadArgument => Some(ffi::OPUS_BAD_ARG),
            Self::BufferTooSmall => Some(ffi::OPUS_BUFFER_TOO_SMALL),
            Self::InternalError => Some(ffi::OPUS_INTERNAL_ERROR),
            Self::InvalidPacket => Some(ffi::OPUS_INVALID_PACKET),
            Self::Unimplemented => Some(ffi::OPUS_UNIMPLEMENTED),
            Self::InvalidState => Some(ffi::OPUS_INVALID_STATE),
            Self::AllocationFailure => Some(ffi::OPUS_ALLOC_FAIL),
            Self::Unknown(code) => Some(*code),
            Self::Disposed => None,
        }
    }
}

/// Checks a native return value.
///
/// Negative values are errors. Anything else is handed back unchanged; the
/// caller knows whether it counts bytes, samples or nothing at all.
pub fn check(code: c_int) -> Result<i32> {
    if code < 0 {
        let err = Error::from_code(code);
        tracing::trace!("opus call failed: {} ({})", err, code);
        return Err(err);
    }
    Ok(code)
}
