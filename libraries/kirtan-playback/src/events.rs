//! Player Events
//!
//! Event-based communication for UI synchronization. The player queues
//! events as state changes; the view drains them and re-renders.
//! Events are emitted at key points:
//! - Status changes (idle/loaded/playing/error)
//! - Track changes (load, next, previous, fail-forward)
//! - Position updates (from media time updates, seeks)
//! - Control changes (volume, shuffle, repeat, speed)

use crate::types::{PlayerStatus, RepeatMode};
use serde::{Deserialize, Serialize};

/// Events emitted by the player core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// Derived status changed
    StatusChanged {
        /// The new status
        status: PlayerStatus,
    },

    /// A different track was loaded
    TrackChanged {
        /// Playlist index of the new track
        index: usize,
        /// Url of the new track
        url: String,
        /// Index of the track it replaced (if any)
        previous_index: Option<usize>,
    },

    /// Playback position or duration changed
    PositionUpdate {
        /// Position in seconds
        current_time: f64,
        /// Duration in seconds, `None` while unknown
        duration: Option<f64>,
    },

    /// Volume or mute changed
    VolumeChanged {
        /// User level in `[0, 1]`
        volume: f32,
        /// Whether output is muted
        is_muted: bool,
    },

    /// Shuffle toggled
    ShuffleChanged { enabled: bool },

    /// Repeat mode cycled
    RepeatChanged { mode: RepeatMode },

    /// Playback rate cycled
    SpeedChanged { speed: f32 },

    /// Track played to its end
    TrackFinished {
        /// Playlist index of the finished track
        index: usize,
    },

    /// A failed track will be skipped once `delay_ms` has elapsed
    ///
    /// The host owns the timer and calls
    /// [`PlayerCore::fire_scheduled_advance`](crate::PlayerCore::fire_scheduled_advance)
    /// with `generation` when it fires.
    AdvanceScheduled {
        /// Load generation the advance belongs to
        generation: u64,
        /// Delay before advancing
        delay_ms: u64,
    },

    /// Media failure (already handled, reported for display)
    Error {
        /// Playlist index of the failing track
        index: Option<usize>,
        /// Error message
        message: String,
    },
}
