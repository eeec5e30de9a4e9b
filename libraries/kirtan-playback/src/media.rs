//! Platform-agnostic media resource
//!
//! Abstracts the single playable-audio handle (an `<audio>` element in a
//! browser, a decoder + output stream elsewhere). Commands go in through
//! [`MediaResource`]; whatever the platform reports back is fed to the
//! player as a [`MediaEvent`].

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Single playable-audio handle
///
/// Implementors only carry out commands. Completion, progress and failure
/// are reported asynchronously through [`MediaEvent`]s.
pub trait MediaResource {
    /// Point the resource at a new url, superseding any in-flight load
    fn set_source(&mut self, url: &str);

    /// Start loading/buffering the current source
    fn load(&mut self);

    /// Request playback
    ///
    /// # Returns
    /// * `Ok(())` - Request accepted (it may still fail later with a
    ///   [`MediaEvent::PlayRejected`] or [`MediaEvent::Error`])
    /// * `Err(_)` - Rejected immediately
    fn play(&mut self) -> Result<()>;

    fn pause(&mut self);

    /// Move the playhead, in seconds
    fn set_current_time(&mut self, seconds: f64);

    /// Linear output level in `[0, 1]`
    fn set_volume(&mut self, volume: f32);

    fn set_playback_rate(&mut self, rate: f32);
}

/// Callback from the media resource
///
/// Every event names the source it belongs to, so events for a track that
/// has already been replaced can be recognised and dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MediaEvent {
    /// Playback reached the end of the source
    Ended { src: String },

    /// Periodic position report
    TimeUpdate {
        src: String,
        current_time: f64,
        duration: f64,
    },

    /// Duration became known
    LoadedMetadata { src: String, duration: f64 },

    /// Network, decode or format failure
    Error { src: String, message: String },

    /// Playback actually started
    Play { src: String },

    /// Playback actually paused
    Pause { src: String },

    /// A play request was refused after the fact
    PlayRejected { src: String, reason: String },
}

impl MediaEvent {
    /// Source url the event refers to
    pub fn src(&self) -> &str {
        match self {
            MediaEvent::Ended { src }
            | MediaEvent::TimeUpdate { src, .. }
            | MediaEvent::LoadedMetadata { src, .. }
            | MediaEvent::Error { src, .. }
            | MediaEvent::Play { src }
            | MediaEvent::Pause { src }
            | MediaEvent::PlayRejected { src, .. } => src,
        }
    }
}

/// In-memory media resource
///
/// Records every command without producing audio. Used by the CLI
/// simulator and by tests; urls marked with [`MemoryMedia::reject`] refuse
/// to play.
#[derive(Debug, Clone)]
pub struct MemoryMedia {
    source: Option<String>,
    playing: bool,
    current_time: f64,
    volume: f32,
    playback_rate: f32,
    rejected: HashSet<String>,
    load_count: usize,
    play_count: usize,
}

impl MemoryMedia {
    pub fn new() -> Self {
        Self {
            source: None,
            playing: false,
            current_time: 0.0,
            volume: 1.0,
            playback_rate: 1.0,
            rejected: HashSet::new(),
            load_count: 0,
            play_count: 0,
        }
    }

    /// Make `url` refuse every play request
    pub fn reject(&mut self, url: impl Into<String>) {
        self.rejected.insert(url.into());
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn playback_rate(&self) -> f32 {
        self.playback_rate
    }

    /// Number of `load` calls so far
    pub fn load_count(&self) -> usize {
        self.load_count
    }

    /// Number of accepted `play` calls so far
    pub fn play_count(&self) -> usize {
        self.play_count
    }
}

impl Default for MemoryMedia {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaResource for MemoryMedia {
    fn set_source(&mut self, url: &str) {
        self.source = Some(url.to_string());
        self.playing = false;
        self.current_time = 0.0;
    }

    fn load(&mut self) {
        self.load_count += 1;
    }

    fn play(&mut self) -> Result<()> {
        let Some(source) = self.source.as_deref() else {
            return Err(PlaybackError::PlaybackRejected("no source".to_string()));
        };

        if self.rejected.contains(source) {
            self.playing = false;
            return Err(PlaybackError::PlaybackRejected(format!(
                "unsupported source {source}"
            )));
        }

        self.playing = true;
        self.play_count += 1;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.current_time = seconds;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn set_playback_rate(&mut self, rate: f32) {
        self.playback_rate = rate;
    }
}
