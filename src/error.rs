//! Error types shared across subsystems.
//!
//! None of these are fatal: every failure leaves the session in a
//! well-defined, retryable state.

use crate::state::Status;
use std::path::PathBuf;
use thiserror::Error;

/// Failures of the landmark capture/model pipeline.
#[derive(Debug, Error)]
pub enum TrackingError {
    /// The capture device or model could not be opened.
    #[error("hand tracking unavailable: {0}")]
    SourceUnavailable(String),

    #[error("cannot read landmark trace {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed landmark frame on line {line}: {source}")]
    MalformedFrame {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures of the audio transport when starting playback.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("no audio output device available")]
    NoDevice,

    #[error("no track loaded")]
    NoTrack,

    /// The platform refused to start playback (device error, policy).
    #[error("playback blocked: {0}")]
    Blocked(String),

    #[error("audio thread did not answer in time")]
    Timeout,

    #[error("audio thread is gone")]
    Disconnected,
}

/// Errors returned by session commands.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Configuration can only change while idle.
    #[error("cannot change configuration while {0:?}")]
    SessionInProgress(Status),

    #[error(transparent)]
    Playback(#[from] PlaybackError),
}

/// Errors reading or writing `settings.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot access settings file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}
