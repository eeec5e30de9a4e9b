//! Player core - transport state machine
//!
//! Owns the playlist, the player state and the single media resource.
//! Every mutation goes through an operation here; the view only reads
//! state and drains events.

use crate::{
    events::PlayerEvent,
    media::{MediaEvent, MediaResource},
    play_order::PlayOrder,
    playlist::Playlist,
    types::{
        next_playback_speed, PlayerConfig, PlayerSnapshot, PlayerState, PlayerStatus, RepeatMode,
        SeekTarget, Track,
    },
    volume::percent_to_level,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, error, info, warn};

/// Central playback management
///
/// Orchestrates all player functionality:
/// - Track loading with autoplay continuation
/// - Transport (play, pause, next, previous) over a shuffle-aware order
/// - Repeat modes (None, One, All)
/// - Seek, rewind/forward, volume, mute and playback speed
/// - Reconciliation of media callbacks against the current source
/// - Fail-forward past unplayable tracks
///
/// With an empty playlist the player is `Idle` and every transport
/// operation is a no-op.
pub struct PlayerCore<M: MediaResource> {
    media: M,
    playlist: Playlist,
    state: PlayerState,
    config: PlayerConfig,

    // Traversal
    order: PlayOrder,
    position: usize,
    rng: StdRng,

    // Bumped by every load; scheduled advances for older loads are stale
    generation: u64,
    pending_advance: Option<u64>,

    // Consecutive play rejections, bounded by the playlist length
    rejection_streak: usize,

    // Event queue for UI synchronization
    last_status: PlayerStatus,
    pending_events: Vec<PlayerEvent>,
}

impl<M: MediaResource> PlayerCore<M> {
    /// Create a player and select the first track, if any
    pub fn new(media: M, playlist: Playlist, config: PlayerConfig) -> Self {
        let rng = match config.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(media, playlist, config, rng)
    }

    /// Create a player with an explicit random source for shuffling
    pub fn with_rng(media: M, playlist: Playlist, config: PlayerConfig, rng: StdRng) -> Self {
        let state = PlayerState::new(&config);
        let order = PlayOrder::identity(playlist.len());

        let mut player = Self {
            media,
            playlist,
            state,
            config,
            order,
            position: 0,
            rng,
            generation: 0,
            pending_advance: None,
            rejection_streak: 0,
            last_status: PlayerStatus::Idle,
            pending_events: Vec::new(),
        };

        player.media.set_volume(player.state.effective_volume());

        if player.playlist.is_empty() {
            info!("Player initialized with an empty playlist");
        } else {
            info!(tracks = player.playlist.len(), "Player initialized");
            player.load_track(0);
        }
        player.refresh_status();

        player
    }

    // ===== Track Loading =====

    /// Select the track at `index`
    ///
    /// Resets the position, points the media resource at the track and
    /// requests a load. If the player was playing, playback continues on
    /// the new track. Out-of-range indices are ignored.
    pub fn load_track(&mut self, index: usize) {
        if !self.select_track(index) {
            return;
        }
        if self.state.is_playing {
            self.start_playback();
        }
        self.refresh_status();
    }

    /// Point the media resource at `index` without touching the transport
    fn select_track(&mut self, index: usize) -> bool {
        let Some(track) = self.playlist.get(index) else {
            debug!(index, len = self.playlist.len(), "Ignoring out-of-range track index");
            return false;
        };
        let url = track.url.clone();

        let previous_index = self.state.current_index;
        self.generation += 1;
        self.pending_advance = None;

        self.state.current_index = Some(index);
        self.position = self.order.position_of(index).unwrap_or(index);
        self.state.current_time = 0.0;
        self.state.duration = None;

        self.media.set_source(&url);
        self.media.load();
        self.media.set_playback_rate(self.state.playback_speed);

        debug!(index, url = %url, "Loaded track");
        self.emit_track_changed(index, url, previous_index);
        self.emit_position_update();
        true
    }

    /// Load the track at `index` and start playing it
    pub fn play_track(&mut self, index: usize) {
        if index >= self.playlist.len() {
            debug!(index, "Ignoring out-of-range track selection");
            return;
        }
        self.load_track(index);
        if !self.state.is_playing {
            self.play();
        }
    }

    // ===== Playback Control =====

    /// Start or resume playback
    ///
    /// `is_playing` is set optimistically. A rejected request skips to the
    /// next track instead of leaving the player stuck in "playing".
    pub fn play(&mut self) {
        if self.state.current_index.is_none() {
            debug!("Play ignored, playlist is empty");
            return;
        }

        self.state.is_playing = true;
        self.start_playback();
        self.refresh_status();
    }

    /// Request playback, walking the play order past tracks that refuse
    ///
    /// Bounded by the rejection streak, so at most one lap of the playlist.
    fn start_playback(&mut self) {
        while let Err(e) = self.media.play() {
            if !self.note_rejection(&e.to_string()) {
                return;
            }
            let Some(index) = self.next_index() else {
                return;
            };
            self.select_track(index);
        }
        self.rejection_streak = 0;
    }

    /// Pause playback
    ///
    /// Also cancels a pending fail-forward advance.
    pub fn pause(&mut self) {
        if self.state.current_index.is_none() {
            return;
        }

        self.media.pause();
        self.state.is_playing = false;
        self.pending_advance = None;
        self.refresh_status();
    }

    pub fn toggle_play(&mut self) {
        if self.state.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Skip to the next track in play order, wrapping at the end
    pub fn play_next(&mut self) {
        if let Some(index) = self.next_index() {
            self.load_track(index);
        }
    }

    fn next_index(&self) -> Option<usize> {
        self.order
            .next_position(self.position)
            .and_then(|p| self.order.index_at(p))
    }

    /// Go back to the previous track in play order, wrapping at the start
    pub fn play_previous(&mut self) {
        let Some(index) = self
            .order
            .previous_position(self.position)
            .and_then(|p| self.order.index_at(p))
        else {
            return;
        };
        self.load_track(index);
    }

    // ===== Shuffle & Repeat =====

    /// Toggle shuffle
    ///
    /// Turning shuffle on draws a fresh permutation with the current track
    /// kept in its slot; turning it off drops the permutation.
    pub fn toggle_shuffle(&mut self) {
        self.state.is_shuffle = !self.state.is_shuffle;

        self.order = if self.state.is_shuffle {
            PlayOrder::shuffled(self.playlist.len(), self.state.current_index, &mut self.rng)
        } else {
            PlayOrder::identity(self.playlist.len())
        };
        self.position = self
            .state
            .current_index
            .and_then(|i| self.order.position_of(i))
            .unwrap_or(0);

        debug!(enabled = self.state.is_shuffle, "Shuffle toggled");
        self.pending_events.push(PlayerEvent::ShuffleChanged {
            enabled: self.state.is_shuffle,
        });
    }

    /// Cycle repeat mode: None -> One -> All -> None
    pub fn toggle_repeat(&mut self) {
        self.state.repeat_mode = self.state.repeat_mode.cycle();
        debug!(mode = ?self.state.repeat_mode, "Repeat mode changed");
        self.pending_events.push(PlayerEvent::RepeatChanged {
            mode: self.state.repeat_mode,
        });
    }

    // ===== Seek =====

    /// Seek within the current track
    ///
    /// The target is clamped to `[0, duration]`. Ignored while the
    /// duration is unknown or when the target is not a finite number.
    pub fn seek(&mut self, target: SeekTarget) {
        let Some(duration) = self.state.duration else {
            debug!("Seek ignored, duration unknown");
            return;
        };

        let seconds = match target {
            SeekTarget::Fraction(fraction) => fraction * duration,
            SeekTarget::Seconds(seconds) => seconds,
        };
        if !seconds.is_finite() {
            debug!(?target, "Seek ignored, target not finite");
            return;
        }

        let seconds = seconds.clamp(0.0, duration);
        self.state.current_time = seconds;
        self.media.set_current_time(seconds);
        self.emit_position_update();
    }

    /// Jump back by `seconds`
    pub fn rewind(&mut self, seconds: f64) {
        self.seek(SeekTarget::Seconds(self.state.current_time - seconds));
    }

    /// Jump ahead by `seconds`
    pub fn forward(&mut self, seconds: f64) {
        self.seek(SeekTarget::Seconds(self.state.current_time + seconds));
    }

    // ===== Volume & Speed =====

    /// Set volume from a slider percentage (0-100)
    pub fn set_volume(&mut self, percent: f32) {
        self.state.set_volume_level(percent_to_level(percent));
        self.apply_volume();
    }

    /// Mute, or restore the level from before muting
    pub fn toggle_mute(&mut self) {
        if self.state.is_muted {
            self.state.unmute();
        } else {
            self.state.mute();
        }
        self.apply_volume();
    }

    /// Advance to the next playback speed
    pub fn cycle_playback_speed(&mut self) {
        self.state.playback_speed = next_playback_speed(self.state.playback_speed);
        self.media.set_playback_rate(self.state.playback_speed);
        self.pending_events.push(PlayerEvent::SpeedChanged {
            speed: self.state.playback_speed,
        });
    }

    fn apply_volume(&mut self) {
        self.media.set_volume(self.state.effective_volume());
        self.pending_events.push(PlayerEvent::VolumeChanged {
            volume: self.state.volume,
            is_muted: self.state.is_muted,
        });
    }

    // ===== Media Callbacks =====

    /// React to a callback from the media resource
    ///
    /// Events for any source other than the current track are dropped.
    pub fn handle_media_event(&mut self, event: MediaEvent) {
        let Some(track) = self.current_track() else {
            debug!(?event, "Ignoring media event while idle");
            return;
        };
        if track.url != event.src() {
            debug!(src = event.src(), current = %track.url, "Ignoring stale media event");
            return;
        }

        match event {
            MediaEvent::Ended { .. } => self.on_track_end(),
            MediaEvent::TimeUpdate {
                current_time,
                duration,
                ..
            } => {
                if let Some(duration) = known_duration(duration) {
                    self.state.duration = Some(duration);
                }
                if current_time.is_finite() {
                    self.state.current_time = current_time.max(0.0);
                }
                self.emit_position_update();
            }
            MediaEvent::LoadedMetadata { duration, .. } => {
                self.state.duration = known_duration(duration);
                self.emit_position_update();
            }
            MediaEvent::Error { message, .. } => self.on_media_error(message),
            MediaEvent::Play { .. } => {
                self.state.is_playing = true;
                self.rejection_streak = 0;
            }
            MediaEvent::Pause { .. } => {
                self.state.is_playing = false;
                self.pending_advance = None;
            }
            MediaEvent::PlayRejected { reason, .. } => {
                if self.state.is_playing {
                    if self.note_rejection(&reason) {
                        self.play_next();
                    }
                } else {
                    debug!(reason = %reason, "Ignoring rejection, transport already stopped");
                }
            }
        }
        self.refresh_status();
    }

    /// Natural end of the current track
    fn on_track_end(&mut self) {
        let Some(index) = self.state.current_index else {
            return;
        };
        self.pending_events.push(PlayerEvent::TrackFinished { index });

        // A track can only end while it was playing; a pause echo from the
        // platform must not stop the continuation below.
        self.state.is_playing = true;

        match self.state.repeat_mode {
            RepeatMode::One => {
                self.state.current_time = 0.0;
                self.media.set_current_time(0.0);
                self.emit_position_update();
                self.play();
            }
            RepeatMode::Off if index + 1 == self.playlist.len() => {
                debug!(index, "Reached end of playlist");
                self.media.pause();
                self.state.is_playing = false;
            }
            _ => self.play_next(),
        }
    }

    /// Load/decode failure on the current source
    fn on_media_error(&mut self, message: String) {
        let index = self.state.current_index;
        error!(?index, message = %message, "Media error");
        self.pending_events.push(PlayerEvent::Error { index, message });

        if !self.state.is_playing {
            return;
        }
        if self.pending_advance == Some(self.generation) {
            return;
        }

        self.pending_advance = Some(self.generation);
        self.pending_events.push(PlayerEvent::AdvanceScheduled {
            generation: self.generation,
            delay_ms: self.config.error_advance_delay_ms,
        });
    }

    /// Record a refused play request
    ///
    /// Returns `false`, with the transport stopped, once every track has
    /// refused in a row.
    fn note_rejection(&mut self, reason: &str) -> bool {
        let index = self.state.current_index;
        warn!(?index, reason = %reason, "Playback rejected");
        self.pending_events.push(PlayerEvent::Error {
            index,
            message: reason.to_string(),
        });

        self.rejection_streak += 1;
        if self.rejection_streak >= self.playlist.len() {
            error!(
                tracks = self.playlist.len(),
                "Every track refused to play, stopping"
            );
            self.rejection_streak = 0;
            self.media.pause();
            self.state.is_playing = false;
            return false;
        }
        true
    }

    /// Run the advance announced by [`PlayerEvent::AdvanceScheduled`]
    ///
    /// Stale generations (a newer track was loaded, or the user paused in
    /// the meantime) are ignored.
    pub fn fire_scheduled_advance(&mut self, generation: u64) {
        if self.pending_advance != Some(generation) {
            debug!(generation, "Ignoring stale scheduled advance");
            return;
        }

        self.pending_advance = None;
        if self.state.is_playing {
            self.play_next();
        }
        self.refresh_status();
    }

    // ===== State Queries =====

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    /// Current status, derived from state
    pub fn status(&self) -> PlayerStatus {
        if self.playlist.is_empty() {
            PlayerStatus::Idle
        } else if self.pending_advance.is_some() {
            PlayerStatus::Error
        } else if self.state.is_playing {
            PlayerStatus::Playing
        } else {
            PlayerStatus::Loaded
        }
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    /// Owned copy of everything the view needs
    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            status: self.status(),
            state: self.state.clone(),
            tracks: self.playlist.tracks().to_vec(),
        }
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.state
            .current_index
            .and_then(|index| self.playlist.get(index))
    }

    /// Traversal order used by next/previous
    pub fn play_order(&self) -> &PlayOrder {
        &self.order
    }

    /// Position of the current track within the play order
    pub fn order_position(&self) -> usize {
        self.position
    }

    /// Load generation of the current track
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    // ===== Events =====

    /// Drain all pending events
    ///
    /// Returns all events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    fn refresh_status(&mut self) {
        let status = self.status();
        if status != self.last_status {
            debug!(from = ?self.last_status, to = ?status, "Player status changed");
            self.last_status = status;
            self.pending_events
                .push(PlayerEvent::StatusChanged { status });
        }
    }

    fn emit_track_changed(&mut self, index: usize, url: String, previous_index: Option<usize>) {
        self.pending_events.push(PlayerEvent::TrackChanged {
            index,
            url,
            previous_index,
        });
    }

    fn emit_position_update(&mut self) {
        self.pending_events.push(PlayerEvent::PositionUpdate {
            current_time: self.state.current_time,
            duration: self.state.duration,
        });
    }
}

/// Usable duration, or `None` for NaN/infinite/non-positive reports
fn known_duration(duration: f64) -> Option<f64> {
    (duration.is_finite() && duration > 0.0).then_some(duration)
}
