// Error handling for the media player controller

use std::fmt;

/// Media player error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerError {
    /// Command not allowed in the current controller state
    InvalidState(String),

    /// The controller has already been released
    Released,

    /// Error reported by the playback engine
    Engine(String),

    /// Network error (HTTP status, unreachable host, ...)
    Network(String),

    /// No segment with the given identifier
    SegmentNotFound(String),

    /// The segment carries a blocking reason and cannot be played
    SegmentBlocked {
        identifier: String,
        reason: String,
    },

    /// Generic error
    Other(String),
}

impl fmt::Display for PlayerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PlayerError::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            PlayerError::Released => write!(f, "Controller released"),
            PlayerError::Engine(msg) => write!(f, "Engine error: {}", msg),
            PlayerError::Network(msg) => write!(f, "Network error: {}", msg),
            PlayerError::SegmentNotFound(id) => write!(f, "Segment not found: {}", id),
            PlayerError::SegmentBlocked { identifier, reason } => {
                write!(f, "Segment {} blocked: {}", identifier, reason)
            }
            PlayerError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for PlayerError {}

/// Result type alias for controller operations
pub type Result<T> = std::result::Result<T, PlayerError>;

impl From<std::io::Error> for PlayerError {
    fn from(err: std::io::Error) -> Self {
        PlayerError::Network(err.to_string())
    }
}
