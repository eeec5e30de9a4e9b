//! Core types for the radio player

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fallback artist when none can be derived from a title
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Playback rates offered by the speed control, in cycle order
pub const PLAYBACK_SPEEDS: [f32; 5] = [0.75, 1.0, 1.25, 1.5, 2.0];

/// One playable audio item
///
/// Built once from the host document and never mutated afterwards.
/// Identity is the `url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Absolute (or document-relative) audio url, unique within a playlist
    pub url: String,

    /// Display title
    pub title: String,

    /// Artist derived from the title
    pub artist: String,
}

/// Repeat mode
///
/// The repeat button cycles `Off -> One -> All -> Off`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop after the last track
    #[default]
    #[serde(rename = "none")]
    Off,

    /// Loop the current track
    One,

    /// Loop the whole playlist
    All,
}

impl RepeatMode {
    /// Next mode in the repeat button cycle
    pub fn cycle(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::One,
            RepeatMode::One => RepeatMode::All,
            RepeatMode::All => RepeatMode::Off,
        }
    }
}

/// Coarse player status, derived from [`PlayerState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerStatus {
    /// Empty playlist, every transport operation is a no-op
    Idle,

    /// A track is selected but not playing
    Loaded,

    /// Playback requested and not paused
    Playing,

    /// The current track failed; an automatic advance is pending
    Error,
}

/// Seek request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeekTarget {
    /// Normalized position, interpreted against the current duration
    Fraction(f64),

    /// Absolute position in seconds
    Seconds(f64),
}

/// Live player state
///
/// Owned by the player core; everything else gets a shared reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Index into the playlist, `None` while the playlist is empty
    pub current_index: Option<usize>,

    pub is_playing: bool,

    pub is_shuffle: bool,

    pub repeat_mode: RepeatMode,

    /// User volume in `[0, 1]`
    pub volume: f32,

    pub is_muted: bool,

    /// Volume snapshot taken when muting, restored on unmute
    pub previous_volume: f32,

    /// Position in seconds
    pub current_time: f64,

    /// Track length in seconds, `None` until metadata arrives
    pub duration: Option<f64>,

    /// Current rate, always one of [`PLAYBACK_SPEEDS`]
    pub playback_speed: f32,
}

impl PlayerState {
    /// Fresh state for a new player
    pub fn new(config: &PlayerConfig) -> Self {
        let volume = f32::from(config.volume.min(100)) / 100.0;
        Self {
            current_index: None,
            is_playing: false,
            is_shuffle: false,
            repeat_mode: config.repeat,
            volume,
            is_muted: false,
            previous_volume: volume,
            current_time: 0.0,
            duration: None,
            playback_speed: 1.0,
        }
    }

    /// Volume actually applied to the media resource
    pub fn effective_volume(&self) -> f32 {
        if self.is_muted {
            0.0
        } else {
            self.volume
        }
    }

    /// Playback progress in `[0, 1]`, `None` while duration is unknown
    pub fn progress(&self) -> Option<f64> {
        match self.duration {
            Some(duration) if duration > 0.0 => Some((self.current_time / duration).clamp(0.0, 1.0)),
            _ => None,
        }
    }
}

/// Point-in-time copy of the player, as rendered by the view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub status: PlayerStatus,
    pub state: PlayerState,
    pub tracks: Vec<Track>,
}

impl PlayerSnapshot {
    pub fn current_track(&self) -> Option<&Track> {
        self.state.current_index.and_then(|i| self.tracks.get(i))
    }
}

/// Next speed in the speed button cycle
///
/// Unknown rates restart the cycle at normal speed.
pub fn next_playback_speed(current: f32) -> f32 {
    PLAYBACK_SPEEDS
        .iter()
        .position(|speed| (speed - current).abs() < f32::EPSILON)
        .map_or(1.0, |i| PLAYBACK_SPEEDS[(i + 1) % PLAYBACK_SPEEDS.len()])
}

/// Configuration for the player core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Initial volume (0-100, default: 100)
    #[serde(default = "default_volume")]
    pub volume: u8,

    /// Initial repeat mode (default: none)
    #[serde(default)]
    pub repeat: RepeatMode,

    /// Fixed seed for shuffle order, random when unset
    #[serde(default)]
    pub shuffle_seed: Option<u64>,

    /// Delay before skipping past a failed track (default: 1000 ms)
    #[serde(default = "default_error_advance_delay_ms")]
    pub error_advance_delay_ms: u64,

    /// Step used by the rewind/forward controls (default: 10 s)
    #[serde(default = "default_skip_step_secs")]
    pub skip_step_secs: f64,
}

impl PlayerConfig {
    pub fn error_advance_delay(&self) -> Duration {
        Duration::from_millis(self.error_advance_delay_ms)
    }
}

fn default_volume() -> u8 {
    100
}

fn default_error_advance_delay_ms() -> u64 {
    1000
}

fn default_skip_step_secs() -> f64 {
    10.0
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            repeat: RepeatMode::default(),
            shuffle_seed: None,
            error_advance_delay_ms: default_error_advance_delay_ms(),
            skip_step_secs: default_skip_step_secs(),
        }
    }
}
