//! Shared error types for the services crate.

use thiserror::Error;

use storage::StorageError;

/// Errors emitted by the exercise session state machine.
///
/// Every variant is recoverable: callers drop the offending input and keep the
/// session as it was.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("{action} is not valid while the session is {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },
    #[error("stale callback for question {position} of run {run}")]
    StaleCallback { run: u32, position: usize },
    #[error("the current question is not a speaking exercise")]
    NotSpeaking,
    #[error("the current question is not answered by choosing")]
    NotChoiceBased,
    #[error("no finished recording for the current question")]
    NoRecording,
    #[error("a recording is already in progress")]
    AlreadyRecording,
    #[error("no recording in progress")]
    NotRecording,
    #[error("no media to play for the current question")]
    NoMedia,
}

/// Errors reported by the device media subsystem.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MediaError {
    #[error("recording permission was denied")]
    PermissionDenied,
    #[error("unknown media handle")]
    UnknownHandle,
    #[error("media operation failed: {0}")]
    Backend(String),
}

/// Errors emitted by a speaking verification collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum VerificationError {
    #[error("speaking verification unavailable: {0}")]
    Unavailable(String),
}

/// Errors emitted by `LessonService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LessonServiceError {
    #[error("lesson not found")]
    NotFound,
    #[error(transparent)]
    Storage(#[from] StorageError),
}
