//! Playlist building
//!
//! Scans the host document for links to audio files and turns each into a
//! [`Track`]. Pure read: the document is never modified.

use crate::error::{PlaybackError, Result};
use crate::types::{Track, UNKNOWN_ARTIST};
use percent_encoding::percent_decode_str;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::debug;
use url::Url;

/// File extensions treated as playable audio
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "m4a", "aac", "ogg", "oga", "opus", "wav", "flac"];

/// A link as found in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioLink {
    /// Raw link target
    pub href: String,

    /// Visible link text
    pub text: String,
}

impl AudioLink {
    pub fn new(href: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            text: text.into(),
        }
    }
}

/// Read-only source of links, in document order
pub trait LinkSource {
    fn links(&self) -> Vec<AudioLink>;
}

impl LinkSource for [AudioLink] {
    fn links(&self) -> Vec<AudioLink> {
        self.to_vec()
    }
}

impl LinkSource for Vec<AudioLink> {
    fn links(&self) -> Vec<AudioLink> {
        self.clone()
    }
}

/// Links scanned from HTML markup
///
/// Finds `<a href="...">text</a>` elements; nested tags inside the link
/// text are stripped and common entities decoded.
#[derive(Debug, Clone, Copy)]
pub struct MarkupLinks<'a> {
    markup: &'a str,
}

impl<'a> MarkupLinks<'a> {
    pub fn new(markup: &'a str) -> Self {
        Self { markup }
    }
}

fn anchor_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<a\b([^>]*)>(.*?)</a\s*>").expect("valid anchor regex"))
}

fn href_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)\bhref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#)
            .expect("valid href regex")
    })
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid tag regex"))
}

impl LinkSource for MarkupLinks<'_> {
    fn links(&self) -> Vec<AudioLink> {
        anchor_regex()
            .captures_iter(self.markup)
            .filter_map(|caps| {
                let attrs = caps.get(1)?.as_str();
                let href = href_regex().captures(attrs).and_then(|h| {
                    h.get(1)
                        .or_else(|| h.get(2))
                        .or_else(|| h.get(3))
                        .map(|m| decode_entities(m.as_str()))
                })?;
                let inner = caps.get(2).map_or("", |m| m.as_str());
                let text = decode_entities(&tag_regex().replace_all(inner, ""));
                Some(AudioLink { href, text })
            })
            .collect()
    }
}

/// Decode the handful of entities that show up in link text and urls
fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Strip query string and fragment from a link target
fn path_part(href: &str) -> &str {
    let end = href.find(&['?', '#'][..]).unwrap_or(href.len());
    &href[..end]
}

/// Whether a link target points at an audio file
pub fn is_audio_href(href: &str) -> bool {
    let path = path_part(href);
    path.rsplit_once('.').is_some_and(|(_, ext)| {
        !ext.contains('/')
            && AUDIO_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
    })
}

/// Human-readable name from the last path segment of a url
///
/// `/audio/Bhai%20Sahib%20-%20Asa.mp3` becomes `Bhai Sahib - Asa`.
pub fn title_from_url(url: &str) -> String {
    let path = path_part(url);
    let file = path.rsplit('/').next().unwrap_or(path);
    let decoded = percent_decode_str(file).decode_utf8_lossy();
    match decoded.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => decoded.into_owned(),
    }
}

/// Artist part of a `"Artist - Title"` style name
pub fn artist_from_title(title: &str) -> String {
    title
        .split_once('-')
        .map(|(artist, _)| artist.trim())
        .filter(|artist| !artist.is_empty())
        .unwrap_or(UNKNOWN_ARTIST)
        .to_string()
}

fn resolve_href(href: &str, base: Option<&Url>) -> Result<String> {
    let href = href.trim();
    if href.is_empty() {
        return Err(PlaybackError::InvalidLink {
            href: href.to_string(),
            reason: "empty link target".to_string(),
        });
    }

    match base {
        Some(base) => base
            .join(href)
            .map(String::from)
            .map_err(|e| PlaybackError::InvalidLink {
                href: href.to_string(),
                reason: e.to_string(),
            }),
        None => Ok(href.to_string()),
    }
}

/// Ordered set of tracks for a session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Playlist {
    tracks: Vec<Track>,
}

impl Playlist {
    /// Playlist from prepared tracks
    ///
    /// Later duplicates of a url are dropped.
    pub fn new(tracks: Vec<Track>) -> Self {
        let mut seen = HashSet::new();
        let tracks = tracks
            .into_iter()
            .filter(|track| {
                let fresh = seen.insert(track.url.clone());
                if !fresh {
                    debug!(url = %track.url, "Skipping duplicate track");
                }
                fresh
            })
            .collect();
        Self { tracks }
    }

    /// Build a playlist from every audio link in `source`
    ///
    /// Link targets are resolved against `base` when given, the way a
    /// browser reports absolute hrefs. Finding nothing is not an error:
    /// the result is simply empty.
    pub fn build<S: LinkSource + ?Sized>(source: &S, base: Option<&Url>) -> Self {
        let tracks = source
            .links()
            .into_iter()
            .filter(|link| is_audio_href(&link.href))
            .filter_map(|link| match resolve_href(&link.href, base) {
                Ok(url) => Some(track_from_link(url, &link.text)),
                Err(e) => {
                    debug!("Ignoring link: {}", e);
                    None
                }
            })
            .collect();

        let playlist = Self::new(tracks);
        debug!(tracks = playlist.len(), "Built playlist");
        playlist
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }
}

fn track_from_link(url: String, text: &str) -> Track {
    let text = text.trim();
    let title = if text.is_empty() {
        title_from_url(&url)
    } else {
        text.to_string()
    };
    let artist = artist_from_title(&title);
    Track { url, title, artist }
}
