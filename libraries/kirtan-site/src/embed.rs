//! Video embeds for elements marked with `data-youtube`

use crate::markup::{child_insertion_point, elements_with_attribute, escape_html, insert_all};
use tracing::{debug, warn};

/// Marker attribute naming the embed layout
pub const EMBED_ATTRIBUTE: &str = "data-youtube";

/// Embed layout requested by the container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedKind {
    /// Full-width banner, 1170x568
    Banner,
    /// In-text player, 540x262
    Inline,
    /// Any other value: no explicit size
    Unsized,
}

impl EmbedKind {
    pub fn from_attribute(value: &str) -> Self {
        match value {
            "banner" => EmbedKind::Banner,
            "inline" => EmbedKind::Inline,
            _ => EmbedKind::Unsized,
        }
    }

    /// Width and height in pixels
    pub fn dimensions(self) -> Option<(u32, u32)> {
        match self {
            EmbedKind::Banner => Some((1170, 568)),
            EmbedKind::Inline => Some((540, 262)),
            EmbedKind::Unsized => None,
        }
    }
}

/// Markup for one embedded player
pub fn iframe(url: &str, kind: EmbedKind) -> String {
    let mut html = format!(
        r#"<iframe type="text/html" src="{}" frameborder="0" allowfullscreen="allowfullscreen""#,
        escape_html(url)
    );
    if let Some((width, height)) = kind.dimensions() {
        html.push_str(&format!(r#" width="{width}" height="{height}""#));
    }
    html.push_str("></iframe>");
    html
}

/// Append a player to every `data-youtube` element
///
/// Without a video url the markup is returned unchanged.
pub fn embed_videos(html: &str, url: Option<&str>) -> String {
    let containers = elements_with_attribute(html, EMBED_ATTRIBUTE);
    if containers.is_empty() {
        return html.to_string();
    }

    let Some(url) = url.filter(|u| !u.is_empty()) else {
        warn!(
            containers = containers.len(),
            "No video url configured, skipping embeds"
        );
        return html.to_string();
    };

    let inserts = containers
        .iter()
        .map(|tag| {
            let kind = EmbedKind::from_attribute(
                tag.attribute(EMBED_ATTRIBUTE).as_deref().unwrap_or_default(),
            );
            (child_insertion_point(html, tag), iframe(url, kind))
        })
        .collect();

    debug!(count = containers.len(), "Embedding videos");
    insert_all(html, inserts)
}
