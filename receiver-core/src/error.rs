//! Wire-level error vocabulary (`ErrorKind`) and the internal typed errors
//! that project onto it at the façade boundary.
//!
//! `ErrorKind` is the flat, `Copy`, wire-stable enum every RPC response
//! carries. Internally, fallible operations return [`FacadeError`], which
//! carries the context (file paths, gain names, …) that made the failure
//! diagnosable; [`FacadeError::kind`] is the single place that narrows it
//! back down to the wire vocabulary.

use std::path::PathBuf;

/// One-for-one with the wire `ErrorCode` proto enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Ok,
    WorkerBusy,
    GainNotFound,
    AlreadyRecording,
    AlreadyNotRecording,
    InvalidInputDevice,
    InvalidFilter,
    InvalidFilterOffset,
    InvalidCwOffset,
    InvalidDemod,
    VfoNotFound,
    DemodIsOff,
    NotRunning,
    CouldntCreateFile,
    SnifferAlreadyActive,
    SnifferAlreadyInactive,
    InsufficientBufferSize,
    RdsAlreadyActive,
    RdsAlreadyInactive,
    CallError,
    Unimplemented,
    UnknownError,
}

/// Internal, context-carrying error for every façade command. Converts to
/// [`ErrorKind`] at the RPC/façade-reply boundary; never crosses the wire
/// itself.
#[derive(Debug, thiserror::Error)]
pub enum FacadeError {
    #[error("worker is busy and cannot accept new commands")]
    WorkerBusy,

    #[error("gain stage {name:?} is not advertised by the input device")]
    GainNotFound { name: String },

    #[error("already recording")]
    AlreadyRecording,

    #[error("not currently recording")]
    AlreadyNotRecording,

    #[error("input device {device:?} could not be opened")]
    InvalidInputDevice { device: String },

    #[error("filter ({low}, {high}) is invalid for the current demod")]
    InvalidFilter { low: i64, high: i64 },

    #[error("filter offset is invalid")]
    InvalidFilterOffset,

    #[error("cw offset {offset} is invalid")]
    InvalidCwOffset { offset: i64 },

    #[error("demod value is out of range")]
    InvalidDemod,

    #[error("vfo {handle} not found")]
    VfoNotFound { handle: u64 },

    #[error("demod is off")]
    DemodIsOff,

    #[error("receiver is not running")]
    NotRunning,

    #[error("couldn't create file {path:?}")]
    CouldntCreateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("sniffer is already active")]
    SnifferAlreadyActive,

    #[error("sniffer is already inactive")]
    SnifferAlreadyInactive,

    #[error("buffer of size {given} is too small, need at least {needed}")]
    InsufficientBufferSize { given: usize, needed: usize },

    #[error("rds decoder is already active")]
    RdsAlreadyActive,

    #[error("rds decoder is already inactive")]
    RdsAlreadyInactive,

    #[error("unimplemented")]
    Unimplemented,

    #[error("unknown error: {0}")]
    UnknownError(String),
}

impl FacadeError {
    /// Project this internal error onto the wire-stable [`ErrorKind`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            FacadeError::WorkerBusy => ErrorKind::WorkerBusy,
            FacadeError::GainNotFound { .. } => ErrorKind::GainNotFound,
            FacadeError::AlreadyRecording => ErrorKind::AlreadyRecording,
            FacadeError::AlreadyNotRecording => ErrorKind::AlreadyNotRecording,
            FacadeError::InvalidInputDevice { .. } => ErrorKind::InvalidInputDevice,
            FacadeError::InvalidFilter { .. } => ErrorKind::InvalidFilter,
            FacadeError::InvalidFilterOffset => ErrorKind::InvalidFilterOffset,
            FacadeError::InvalidCwOffset { .. } => ErrorKind::InvalidCwOffset,
            FacadeError::InvalidDemod => ErrorKind::InvalidDemod,
            FacadeError::VfoNotFound { .. } => ErrorKind::VfoNotFound,
            FacadeError::DemodIsOff => ErrorKind::DemodIsOff,
            FacadeError::NotRunning => ErrorKind::NotRunning,
            FacadeError::CouldntCreateFile { .. } => ErrorKind::CouldntCreateFile,
            FacadeError::SnifferAlreadyActive => ErrorKind::SnifferAlreadyActive,
            FacadeError::SnifferAlreadyInactive => ErrorKind::SnifferAlreadyInactive,
            FacadeError::InsufficientBufferSize { .. } => ErrorKind::InsufficientBufferSize,
            FacadeError::RdsAlreadyActive => ErrorKind::RdsAlreadyActive,
            FacadeError::RdsAlreadyInactive => ErrorKind::RdsAlreadyInactive,
            FacadeError::Unimplemented => ErrorKind::Unimplemented,
            FacadeError::UnknownError(_) => ErrorKind::UnknownError,
        }
    }
}

/// Worker-submission failure: the dedicated thread has already stopped.
/// Every façade command maps this to [`ErrorKind::WorkerBusy`] — callers
/// never observe a raw channel error.
#[derive(Debug, thiserror::Error)]
#[error("worker has stopped accepting tasks")]
pub struct WorkerError;

impl From<WorkerError> for FacadeError {
    fn from(_: WorkerError) -> Self {
        FacadeError::WorkerBusy
    }
}
