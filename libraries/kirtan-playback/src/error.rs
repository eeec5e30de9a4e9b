//! Error types for playback management

use thiserror::Error;

/// Playback errors
///
/// None of these reach the caller of a transport operation: the player
/// logs them and degrades to "skip and continue" or "stay idle".
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The media resource refused to start playback (decode failure, autoplay block)
    #[error("Playback rejected: {0}")]
    PlaybackRejected(String),

    /// The media resource failed to load or decode its source
    #[error("Media error: {0}")]
    Media(String),

    /// A link target could not be resolved into a track url
    #[error("Invalid audio link {href:?}: {reason}")]
    InvalidLink { href: String, reason: String },
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
