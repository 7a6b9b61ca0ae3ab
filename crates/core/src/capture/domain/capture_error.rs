use std::path::PathBuf;

use thiserror::Error;

use crate::shared::constants::NO_FACE_IN_VIEW_MESSAGE;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CaptureError {
    /// No usable camera or source; surfaced to the user, never retried.
    #[error("camera not available: {0}")]
    Unavailable(String),
    #[error("capture session is not running")]
    NotRunning,
    #[error("{}", NO_FACE_IN_VIEW_MESSAGE)]
    NoFaceInView,
    #[error("no frame has been captured yet")]
    NoFrame,
    #[error("failed to decode frame: {0}")]
    Decode(String),
    #[error("capture source ended")]
    EndOfStream,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PickError {
    #[error("failed to load {path}: {message}")]
    Load { path: PathBuf, message: String },
    #[error("unsupported image type: {0}")]
    Unsupported(PathBuf),
}
