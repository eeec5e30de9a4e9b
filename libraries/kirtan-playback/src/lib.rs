//! Kirtan Radio - Playback
//!
//! Platform-agnostic radio player for the Kirtan landing site.
//!
//! This crate provides:
//! - Playlist building from the audio links of a page
//! - Transport (play/pause, next/previous with wraparound)
//! - Shuffle (anchored Fisher-Yates) and repeat modes (None, One, All)
//! - Seek (fraction or seconds), rewind/forward
//! - Volume with mute/unmute restore, playback speed cycling
//! - Fail-forward past tracks that refuse to play
//! - A view projection and control dispatcher for front ends
//!
//! # Architecture
//!
//! `kirtan-playback` never touches a real audio element. The platform
//! provides a [`MediaResource`] and feeds its callbacks back as
//! [`MediaEvent`]s; the player answers with [`PlayerEvent`]s for the UI.
//! The player owns no timers: a fail-forward delay is announced with
//! [`PlayerEvent::AdvanceScheduled`] and armed by the host.
//!
//! # Example: Building a Playlist
//!
//! ```rust
//! use kirtan_playback::{MarkupLinks, Playlist};
//!
//! let page = r#"<a href="audio/Bhai%20Sahib%20-%20Asa.mp3">Bhai Sahib - Asa</a>
//!               <a href="about.html">About</a>"#;
//!
//! let playlist = Playlist::build(&MarkupLinks::new(page), None);
//! assert_eq!(playlist.len(), 1);
//! assert_eq!(playlist.get(0).unwrap().artist, "Bhai Sahib");
//! ```
//!
//! # Example: Driving the Player
//!
//! ```rust
//! use kirtan_playback::{
//!     AudioLink, MediaEvent, MemoryMedia, PlayerConfig, PlayerCore, PlayerStatus, Playlist,
//! };
//!
//! let links = vec![AudioLink::new("a.mp3", "A"), AudioLink::new("b.mp3", "B")];
//! let playlist = Playlist::build(&links, None);
//! let mut player = PlayerCore::new(MemoryMedia::new(), playlist, PlayerConfig::default());
//!
//! player.play();
//! assert_eq!(player.status(), PlayerStatus::Playing);
//!
//! // The platform reports the end of the first track
//! player.handle_media_event(MediaEvent::Ended { src: "a.mp3".to_string() });
//! assert_eq!(player.state().current_index, Some(1));
//! ```

mod error;
mod events;
mod media;
mod play_order;
mod player;
mod playlist;
pub mod types;
pub mod view;
mod volume;

// Public exports
pub use error::{PlaybackError, Result};
pub use events::PlayerEvent;
pub use media::{MediaEvent, MediaResource, MemoryMedia};
pub use play_order::PlayOrder;
pub use player::PlayerCore;
pub use playlist::{
    artist_from_title, is_audio_href, title_from_url, AudioLink, LinkSource, MarkupLinks, Playlist,
};
pub use types::{
    PlayerConfig, PlayerSnapshot, PlayerState, PlayerStatus, RepeatMode, SeekTarget, Track,
    PLAYBACK_SPEEDS, UNKNOWN_ARTIST,
};
pub use view::{Control, PlayerView, ProgressBounds, ScheduledAdvance, ViewBinder};
pub use volume::{percent_to_level, VolumeTier};
