//! Scripted player sessions
//!
//! Drives a player against the in-memory media resource. Each command is
//! either a UI control or a media callback the platform would deliver.

use anyhow::{anyhow, bail, Context};
use kirtan_playback::{
    view::PlayIcon, Control, MediaEvent, MemoryMedia, PlaybackError, PlayerConfig, PlayerCore,
    PlayerStatus, PlayerView, Playlist, ViewBinder,
};
use std::str::FromStr;
use tracing::{debug, info};

/// One scripted command
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    Play,
    Pause,
    Control(Control),
    /// Metadata arrives with this duration (seconds)
    Duration(f64),
    /// Playback reaches this position (seconds)
    Time(f64),
    /// Current track plays to its end
    End,
    /// Current track fails to load
    Fail,
}

impl FromStr for Step {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let (name, value) = match s.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (s, None),
        };

        let number = |value: Option<&str>| -> anyhow::Result<f64> {
            let value = value.ok_or_else(|| anyhow!("{name} needs a value, e.g. {name}=1"))?;
            value
                .parse::<f64>()
                .with_context(|| format!("Invalid number in {s:?}"))
        };

        let step = match name {
            "play" => Step::Play,
            "pause" => Step::Pause,
            "toggle" => Step::Control(Control::TogglePlay),
            "next" => Step::Control(Control::Next),
            "prev" | "previous" => Step::Control(Control::Previous),
            "shuffle" => Step::Control(Control::Shuffle),
            "repeat" => Step::Control(Control::Repeat),
            "mute" => Step::Control(Control::Mute),
            "speed" => Step::Control(Control::Speed),
            "rewind" => Step::Control(Control::Rewind),
            "forward" => Step::Control(Control::Forward),
            "playlist" => Step::Control(Control::TogglePlaylist),
            "volume" => Step::Control(Control::Volume(number(value)? as f32)),
            "seek" => Step::Control(Control::Seek(number(value)?)),
            "select" => {
                let index = number(value)?;
                if index < 0.0 || index.fract() != 0.0 {
                    bail!("Track index must be a whole number, got {s:?}");
                }
                Step::Control(Control::SelectTrack(index as usize))
            }
            "duration" => Step::Duration(number(value)?),
            "time" => Step::Time(number(value)?),
            "end" => Step::End,
            "fail" => Step::Fail,
            _ => bail!("Unknown command {s:?}"),
        };
        Ok(step)
    }
}

/// Parse a whole script, reporting the first bad command
pub fn parse_script(commands: &[String]) -> anyhow::Result<Vec<Step>> {
    commands.iter().map(|c| c.parse()).collect()
}

/// A player session without real audio
pub struct Session {
    binder: ViewBinder<MemoryMedia>,
}

impl Session {
    pub fn new(playlist: Playlist, config: PlayerConfig) -> Self {
        let player = PlayerCore::new(MemoryMedia::new(), playlist, config);
        Self {
            binder: ViewBinder::new(player),
        }
    }

    pub fn view(&self) -> &PlayerView {
        self.binder.view()
    }

    pub fn status(&self) -> PlayerStatus {
        self.binder.player().status()
    }

    pub fn player(&self) -> &PlayerCore<MemoryMedia> {
        self.binder.player()
    }

    /// Apply one step and settle
    ///
    /// Fail-forward timers fire immediately: the session has no clock.
    pub fn apply(&mut self, step: Step) {
        debug!(?step, "Applying step");

        match step {
            Step::Play => self.binder.player_mut().play(),
            Step::Pause => self.binder.player_mut().pause(),
            Step::Control(control) => self.binder.dispatch(control),
            Step::Duration(duration) => {
                if let Some(src) = self.current_src() {
                    self.binder
                        .handle_media_event(MediaEvent::LoadedMetadata { src, duration });
                }
            }
            Step::Time(current_time) => {
                if let Some(src) = self.current_src() {
                    let duration = self.player().state().duration.unwrap_or(f64::NAN);
                    self.binder.handle_media_event(MediaEvent::TimeUpdate {
                        src,
                        current_time,
                        duration,
                    });
                }
            }
            Step::End => {
                if let Some(src) = self.current_src() {
                    self.binder.handle_media_event(MediaEvent::Ended { src });
                }
            }
            Step::Fail => {
                if let Some(src) = self.current_src() {
                    let message = PlaybackError::Media("simulated load failure".into()).to_string();
                    self.binder
                        .handle_media_event(MediaEvent::Error { src, message });
                }
            }
        }

        self.binder.sync();
        for advance in self.binder.take_scheduled_advances() {
            info!(
                generation = advance.generation,
                delay_ms = advance.delay.as_millis() as u64,
                "Skipping failed track"
            );
            self.binder
                .player_mut()
                .fire_scheduled_advance(advance.generation);
            self.binder.sync();
        }
    }

    fn current_src(&self) -> Option<String> {
        self.player().current_track().map(|t| t.url.clone())
    }
}

/// One-line summary of the view
pub fn describe(view: &PlayerView, status: PlayerStatus) -> String {
    if status == PlayerStatus::Idle {
        return "idle (no tracks)".to_string();
    }

    let icon = match view.play_icon {
        _ if view.has_error => "error",
        PlayIcon::Pause => "playing",
        PlayIcon::Play => "paused",
    };
    let position = view
        .entries
        .iter()
        .position(|e| e.is_current)
        .map_or(0, |i| i + 1);
    let repeat = if view.repeat_active {
        view.repeat_icon.name()
    } else {
        "off"
    };

    format!(
        "{icon:<7} [{position}/{total}] {title} ({artist}) {elapsed}/{duration} shuffle={shuffle} repeat={repeat} volume={volume}{muted} speed={speed}",
        total = view.entries.len(),
        title = view.title,
        artist = view.artist,
        elapsed = view.elapsed,
        duration = view.total,
        shuffle = if view.shuffle_active { "on" } else { "off" },
        volume = view.volume_percent,
        muted = if view.volume_tier == kirtan_playback::VolumeTier::Off {
            " (silent)"
        } else {
            ""
        },
        speed = view.speed_label,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use kirtan_playback::AudioLink;

    fn session() -> Session {
        let links = vec![
            AudioLink::new("a.mp3", "Bhai Sahib - Asa"),
            AudioLink::new("b.mp3", "Rehras"),
            AudioLink::new("c.mp3", "Kirtan Sohila"),
        ];
        Session::new(Playlist::build(&links, None), PlayerConfig::default())
    }

    fn script(commands: &[&str]) -> Vec<Step> {
        let commands: Vec<String> = commands.iter().map(|c| c.to_string()).collect();
        parse_script(&commands).unwrap()
    }

    #[test]
    fn parses_commands() {
        assert_eq!("play".parse::<Step>().unwrap(), Step::Play);
        assert_eq!(
            "volume=40".parse::<Step>().unwrap(),
            Step::Control(Control::Volume(40.0))
        );
        assert_eq!(
            "seek=0.5".parse::<Step>().unwrap(),
            Step::Control(Control::Seek(0.5))
        );
        assert_eq!(
            "select=2".parse::<Step>().unwrap(),
            Step::Control(Control::SelectTrack(2))
        );
    }

    #[test]
    fn rejects_bad_commands() {
        assert!("dance".parse::<Step>().is_err());
        assert!("volume".parse::<Step>().is_err());
        assert!("seek=half".parse::<Step>().is_err());
        assert!("select=-1".parse::<Step>().is_err());
    }

    #[test]
    fn failure_skips_to_next_track() {
        let mut session = session();
        for step in script(&["play", "fail"]) {
            session.apply(step);
        }
        assert_eq!(session.player().state().current_index, Some(1));
        assert_eq!(session.status(), PlayerStatus::Playing);
        assert_eq!(session.view().title, "Rehras");
    }

    #[test]
    fn end_of_playlist_stops() {
        let mut session = session();
        for step in script(&["play", "end", "end", "end"]) {
            session.apply(step);
        }
        assert_eq!(session.player().state().current_index, Some(2));
        assert_eq!(session.status(), PlayerStatus::Loaded);
    }

    #[test]
    fn seek_needs_duration() {
        let mut session = session();
        for step in script(&["seek=0.5", "duration=120", "seek=0.5"]) {
            session.apply(step);
        }
        assert_eq!(session.view().elapsed, "1:00");
        assert_eq!(session.view().total, "2:00");
    }

    #[test]
    fn describe_summarizes_view() {
        let mut session = session();
        for step in script(&["play", "repeat", "volume=40", "mute"]) {
            session.apply(step);
        }
        let line = describe(session.view(), session.status());
        assert!(line.starts_with("playing [1/3] Bhai Sahib - Asa (Bhai Sahib)"));
        assert!(line.contains("repeat=repeat-1"));
        assert!(line.contains("volume=40 (silent)"));
    }

    #[test]
    fn idle_session() {
        let session = Session::new(Playlist::default(), PlayerConfig::default());
        assert_eq!(describe(session.view(), session.status()), "idle (no tracks)");
    }
}
