//! View binding
//!
//! [`PlayerView`] is a pure projection of a [`PlayerSnapshot`]: everything a
//! front end needs to draw the player, already formatted. [`ViewBinder`]
//! owns the core, turns UI controls into core operations and re-renders
//! after draining the core's event queue.

use crate::{
    events::PlayerEvent,
    media::{MediaEvent, MediaResource},
    player::PlayerCore,
    types::{PlayerSnapshot, PlayerStatus, RepeatMode, SeekTarget},
    volume::VolumeTier,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Title shown while the current track is failing
pub const ERROR_TITLE: &str = "Error loading track";

/// Format seconds as `m:ss`
///
/// Unknown, negative or non-finite values render as `0:00`.
pub fn format_time(seconds: Option<f64>) -> String {
    let seconds = match seconds {
        Some(s) if s.is_finite() && s > 0.0 => s.floor() as u64,
        _ => 0,
    };
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Speed button label, e.g. `1x` or `1.25x`
pub fn speed_label(speed: f32) -> String {
    format!("{speed}x")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayIcon {
    Play,
    Pause,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepeatIcon {
    /// Loop playlist (also shown, inactive, when repeat is off)
    Repeat,
    /// Loop current track
    RepeatOne,
}

impl RepeatIcon {
    /// Icon name as used by the stylesheet
    pub fn name(self) -> &'static str {
        match self {
            RepeatIcon::Repeat => "repeat",
            RepeatIcon::RepeatOne => "repeat-1",
        }
    }
}

/// One row of the playlist panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub index: usize,
    pub title: String,
    pub artist: String,
    pub is_current: bool,
}

/// Rendered player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub title: String,
    pub artist: String,

    /// The current track failed and a skip is pending
    pub has_error: bool,

    /// Progress bar fill, 0-100
    pub progress_percent: f64,
    pub elapsed: String,
    pub total: String,

    pub play_icon: PlayIcon,
    pub shuffle_active: bool,
    pub repeat_active: bool,
    pub repeat_icon: RepeatIcon,
    pub volume_tier: VolumeTier,

    /// Slider position, 0-100
    pub volume_percent: u8,
    pub speed_label: String,

    pub entries: Vec<PlaylistEntry>,
}

impl PlayerView {
    pub fn project(snapshot: &PlayerSnapshot) -> Self {
        let state = &snapshot.state;
        let track = snapshot.current_track();

        let has_error = snapshot.status == PlayerStatus::Error;
        let (title, artist) = match track {
            Some(track) => (track.title.clone(), track.artist.clone()),
            None if has_error => (ERROR_TITLE.to_string(), String::new()),
            None => (String::new(), String::new()),
        };

        let entries = snapshot
            .tracks
            .iter()
            .enumerate()
            .map(|(index, track)| PlaylistEntry {
                index,
                title: track.title.clone(),
                artist: track.artist.clone(),
                is_current: state.current_index == Some(index),
            })
            .collect();

        Self {
            title,
            artist,
            has_error,
            progress_percent: state.progress().map_or(0.0, |p| p * 100.0),
            elapsed: format_time(Some(state.current_time)),
            total: format_time(state.duration),
            play_icon: if state.is_playing {
                PlayIcon::Pause
            } else {
                PlayIcon::Play
            },
            shuffle_active: state.is_shuffle,
            repeat_active: state.repeat_mode != RepeatMode::Off,
            repeat_icon: match state.repeat_mode {
                RepeatMode::One => RepeatIcon::RepeatOne,
                RepeatMode::Off | RepeatMode::All => RepeatIcon::Repeat,
            },
            volume_tier: state.volume_tier(),
            volume_percent: (state.volume * 100.0).round().clamp(0.0, 100.0) as u8,
            speed_label: speed_label(state.playback_speed),
            entries,
        }
    }
}

/// UI control surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Control {
    TogglePlay,
    Next,
    Previous,
    Shuffle,
    Repeat,
    Mute,
    /// Volume slider, in percent
    Volume(f32),
    Speed,
    /// Click on the progress bar, as a fraction of its width
    Seek(f64),
    Rewind,
    Forward,
    /// Show/hide the playlist panel
    TogglePlaylist,
    /// Click on a playlist entry
    SelectTrack(usize),
}

/// Horizontal extent of the progress control, in pointer coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressBounds {
    pub left: f64,
    pub width: f64,
}

impl ProgressBounds {
    pub fn new(left: f64, width: f64) -> Self {
        Self { left, width }
    }

    /// Fraction of the bar at pointer position `x`, clamped to `[0, 1]`
    pub fn fraction_at(&self, x: f64) -> Option<f64> {
        if !(self.width.is_finite() && self.width > 0.0 && x.is_finite() && self.left.is_finite())
        {
            return None;
        }
        Some(((x - self.left) / self.width).clamp(0.0, 1.0))
    }
}

/// Pointer/touch drag on the progress control
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressDrag {
    active: bool,
}

impl ProgressDrag {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn pointer_down(&mut self, x: f64, bounds: ProgressBounds) -> Option<SeekTarget> {
        self.active = true;
        bounds.fraction_at(x).map(SeekTarget::Fraction)
    }

    /// Ignored unless a drag is in progress
    pub fn pointer_move(&mut self, x: f64, bounds: ProgressBounds) -> Option<SeekTarget> {
        if !self.active {
            return None;
        }
        bounds.fraction_at(x).map(SeekTarget::Fraction)
    }

    pub fn pointer_up(&mut self, x: f64, bounds: ProgressBounds) -> Option<SeekTarget> {
        if !std::mem::take(&mut self.active) {
            return None;
        }
        bounds.fraction_at(x).map(SeekTarget::Fraction)
    }
}

/// Fail-forward timer the host has to arm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledAdvance {
    pub generation: u64,
    pub delay: Duration,
}

/// Glue between the UI and the player core
pub struct ViewBinder<M: MediaResource> {
    player: PlayerCore<M>,
    view: PlayerView,
    playlist_visible: bool,
    drag: ProgressDrag,
    scheduled: Vec<ScheduledAdvance>,
}

impl<M: MediaResource> ViewBinder<M> {
    pub fn new(mut player: PlayerCore<M>) -> Self {
        // Startup events are already reflected in the first render
        let delay = player.config().error_advance_delay();
        let scheduled = collect_scheduled(&player.drain_events(), delay);
        let view = PlayerView::project(&player.snapshot());
        Self {
            player,
            view,
            playlist_visible: false,
            drag: ProgressDrag::default(),
            scheduled,
        }
    }

    pub fn view(&self) -> &PlayerView {
        &self.view
    }

    pub fn player(&self) -> &PlayerCore<M> {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut PlayerCore<M> {
        &mut self.player
    }

    pub fn playlist_visible(&self) -> bool {
        self.playlist_visible
    }

    /// Route a control to its player operation
    pub fn dispatch(&mut self, control: Control) {
        debug!(?control, "Dispatching control");
        let step = self.player.config().skip_step_secs;

        match control {
            Control::TogglePlay => self.player.toggle_play(),
            Control::Next => self.player.play_next(),
            Control::Previous => self.player.play_previous(),
            Control::Shuffle => self.player.toggle_shuffle(),
            Control::Repeat => self.player.toggle_repeat(),
            Control::Mute => self.player.toggle_mute(),
            Control::Volume(percent) => self.player.set_volume(percent),
            Control::Speed => self.player.cycle_playback_speed(),
            Control::Seek(fraction) => self.player.seek(SeekTarget::Fraction(fraction)),
            Control::Rewind => self.player.rewind(step),
            Control::Forward => self.player.forward(step),
            Control::TogglePlaylist => self.playlist_visible = !self.playlist_visible,
            Control::SelectTrack(index) => self.player.play_track(index),
        }
    }

    /// Forward a media callback to the core
    pub fn handle_media_event(&mut self, event: MediaEvent) {
        self.player.handle_media_event(event);
    }

    pub fn pointer_down(&mut self, x: f64, bounds: ProgressBounds) {
        if let Some(target) = self.drag.pointer_down(x, bounds) {
            self.player.seek(target);
        }
    }

    pub fn pointer_move(&mut self, x: f64, bounds: ProgressBounds) {
        if let Some(target) = self.drag.pointer_move(x, bounds) {
            self.player.seek(target);
        }
    }

    pub fn pointer_up(&mut self, x: f64, bounds: ProgressBounds) {
        if let Some(target) = self.drag.pointer_up(x, bounds) {
            self.player.seek(target);
        }
    }

    /// Drain the core's events and re-render
    ///
    /// Returns whether the view (or the panel visibility) needs redrawing.
    pub fn sync(&mut self) -> bool {
        let events = self.player.drain_events();
        for event in &events {
            debug!(?event, "Player event");
        }
        let delay = self.player.config().error_advance_delay();
        self.scheduled.extend(collect_scheduled(&events, delay));

        let view = PlayerView::project(&self.player.snapshot());
        let changed = !events.is_empty() || view != self.view;
        self.view = view;
        changed
    }

    /// Fail-forward timers announced since the last call
    pub fn take_scheduled_advances(&mut self) -> Vec<ScheduledAdvance> {
        std::mem::take(&mut self.scheduled)
    }
}

fn collect_scheduled(events: &[PlayerEvent], delay: Duration) -> Vec<ScheduledAdvance> {
    events
        .iter()
        .filter_map(|event| match event {
            PlayerEvent::AdvanceScheduled { generation, .. } => Some(ScheduledAdvance {
                generation: *generation,
                delay,
            }),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MemoryMedia;
    use crate::playlist::Playlist;
    use crate::types::{PlayerConfig, PlayerState, Track};

    fn binder(names: &[&str]) -> ViewBinder<MemoryMedia> {
        let tracks = names
            .iter()
            .map(|name| Track {
                url: format!("{name}.mp3"),
                title: format!("Raagi - {name}"),
                artist: "Raagi".to_string(),
            })
            .collect();
        let player = PlayerCore::new(
            MemoryMedia::new(),
            Playlist::new(tracks),
            PlayerConfig::default(),
        );
        ViewBinder::new(player)
    }

    fn metadata(binder: &mut ViewBinder<MemoryMedia>, duration: f64) {
        let src = binder.player().current_track().unwrap().url.clone();
        binder.handle_media_event(MediaEvent::LoadedMetadata { src, duration });
    }

    #[test]
    fn time_formatting() {
        assert_eq!(format_time(Some(0.0)), "0:00");
        assert_eq!(format_time(Some(65.9)), "1:05");
        assert_eq!(format_time(Some(3600.0)), "60:00");
        assert_eq!(format_time(None), "0:00");
        assert_eq!(format_time(Some(f64::NAN)), "0:00");
        assert_eq!(format_time(Some(-4.0)), "0:00");
    }

    #[test]
    fn speed_labels() {
        assert_eq!(speed_label(1.0), "1x");
        assert_eq!(speed_label(1.25), "1.25x");
        assert_eq!(speed_label(0.75), "0.75x");
    }

    #[test]
    fn initial_view() {
        let binder = binder(&["a", "b"]);
        let view = binder.view();

        assert_eq!(view.title, "Raagi - a");
        assert_eq!(view.play_icon, PlayIcon::Play);
        assert_eq!(view.elapsed, "0:00");
        assert_eq!(view.total, "0:00");
        assert_eq!(view.progress_percent, 0.0);
        assert_eq!(view.volume_percent, 100);
        assert_eq!(view.volume_tier, VolumeTier::High);
        assert!(view.entries[0].is_current);
        assert!(!view.entries[1].is_current);
    }

    #[test]
    fn empty_playlist_renders_blank() {
        let binder = binder(&[]);
        assert_eq!(binder.view().title, "");
        assert!(binder.view().entries.is_empty());
    }

    #[test]
    fn controls_update_view_after_sync() {
        let mut binder = binder(&["a", "b"]);

        binder.dispatch(Control::TogglePlay);
        binder.dispatch(Control::Repeat);
        binder.dispatch(Control::Shuffle);
        binder.dispatch(Control::Speed);
        assert!(binder.sync());

        let view = binder.view();
        assert_eq!(view.play_icon, PlayIcon::Pause);
        assert!(view.repeat_active);
        assert_eq!(view.repeat_icon.name(), "repeat-1");
        assert!(view.shuffle_active);
        assert_eq!(view.speed_label, "1.25x");
    }

    #[test]
    fn sync_without_changes_reports_nothing() {
        let mut binder = binder(&["a"]);
        binder.sync();
        assert!(!binder.sync());
    }

    #[test]
    fn progress_follows_time_updates() {
        let mut binder = binder(&["a"]);
        binder.handle_media_event(MediaEvent::TimeUpdate {
            src: "a.mp3".to_string(),
            current_time: 30.0,
            duration: 120.0,
        });
        binder.sync();

        assert_eq!(binder.view().progress_percent, 25.0);
        assert_eq!(binder.view().elapsed, "0:30");
        assert_eq!(binder.view().total, "2:00");
    }

    #[test]
    fn rewind_and_forward_use_skip_step() {
        let mut binder = binder(&["a"]);
        metadata(&mut binder, 100.0);

        binder.dispatch(Control::Forward);
        binder.dispatch(Control::Forward);
        assert_eq!(binder.player().state().current_time, 20.0);
        binder.dispatch(Control::Rewind);
        assert_eq!(binder.player().state().current_time, 10.0);
    }

    #[test]
    fn mute_shows_off_tier() {
        let mut binder = binder(&["a"]);
        binder.dispatch(Control::Volume(30.0));
        binder.sync();
        assert_eq!(binder.view().volume_tier, VolumeTier::Low);

        binder.dispatch(Control::Mute);
        binder.sync();
        assert_eq!(binder.view().volume_tier, VolumeTier::Off);
        assert_eq!(binder.view().volume_percent, 30);
    }

    #[test]
    fn playlist_toggle_is_local_to_the_view() {
        let mut binder = binder(&["a"]);
        binder.dispatch(Control::TogglePlaylist);
        assert!(binder.playlist_visible());
        binder.dispatch(Control::TogglePlaylist);
        assert!(!binder.playlist_visible());
    }

    #[test]
    fn selecting_entry_plays_it() {
        let mut binder = binder(&["a", "b", "c"]);
        binder.dispatch(Control::SelectTrack(2));
        binder.sync();

        assert_eq!(binder.player().state().current_index, Some(2));
        assert!(binder.view().entries[2].is_current);
        assert_eq!(binder.view().play_icon, PlayIcon::Pause);
    }

    #[test]
    fn progress_drag_seeks_with_clamped_fraction() {
        let mut binder = binder(&["a"]);
        metadata(&mut binder, 200.0);
        let bounds = ProgressBounds::new(100.0, 400.0);

        binder.pointer_down(200.0, bounds);
        assert_eq!(binder.player().state().current_time, 50.0);

        binder.pointer_move(900.0, bounds);
        assert_eq!(binder.player().state().current_time, 200.0);

        binder.pointer_up(0.0, bounds);
        assert_eq!(binder.player().state().current_time, 0.0);
    }

    #[test]
    fn drag_move_without_down_is_ignored() {
        let mut binder = binder(&["a"]);
        metadata(&mut binder, 200.0);
        let bounds = ProgressBounds::new(0.0, 100.0);

        binder.pointer_move(50.0, bounds);
        binder.pointer_up(50.0, bounds);
        assert_eq!(binder.player().state().current_time, 0.0);
    }

    #[test]
    fn zero_width_bar_yields_no_fraction() {
        assert_eq!(ProgressBounds::new(0.0, 0.0).fraction_at(5.0), None);
    }

    #[test]
    fn error_without_current_track_uses_error_title() {
        let snapshot = PlayerSnapshot {
            status: PlayerStatus::Error,
            state: PlayerState::new(&PlayerConfig::default()),
            tracks: Vec::new(),
        };
        let view = PlayerView::project(&snapshot);
        assert_eq!(view.title, ERROR_TITLE);
        assert!(view.has_error);
    }

    #[test]
    fn error_status_keeps_track_title_and_schedules_advance() {
        let mut binder = binder(&["a", "b"]);
        binder.dispatch(Control::TogglePlay);
        binder.handle_media_event(MediaEvent::Error {
            src: "a.mp3".to_string(),
            message: "decode".to_string(),
        });
        binder.sync();

        assert_eq!(binder.view().title, "Raagi - a");
        assert!(binder.view().has_error);
        let scheduled = binder.take_scheduled_advances();
        assert_eq!(scheduled.len(), 1);
        assert_eq!(scheduled[0].delay, Duration::from_secs(1));

        binder.player_mut().fire_scheduled_advance(scheduled[0].generation);
        binder.sync();
        assert_eq!(binder.view().title, "Raagi - b");
        assert!(!binder.view().has_error);
        assert!(binder.take_scheduled_advances().is_empty());
    }
}
