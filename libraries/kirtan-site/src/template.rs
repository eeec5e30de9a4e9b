//! Placeholder substitution
//!
//! Rewrites `{{TOKEN}}` markers inside the document body, in text and
//! attribute values alike.

use crate::markup::escape_html;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::debug;

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{([^}]+)\}\}").expect("valid placeholder regex"))
}

fn body_open_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<body\b").expect("valid body regex"))
}

fn body_close_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)</body\s*>").expect("valid body regex"))
}

/// Byte range of the body element, tags included
///
/// The whole document when there is no `<body>`.
fn body_range(html: &str) -> (usize, usize) {
    let Some(open) = body_open_regex().find(html) else {
        return (0, html.len());
    };
    let end = body_close_regex()
        .find_at(html, open.end())
        .map_or(html.len(), |close| close.end());
    (open.start(), end)
}

/// Replace every known `{{TOKEN}}` inside the body
///
/// Values are HTML-escaped. Unknown tokens and tokens mapped to an empty
/// value keep their original marker.
pub fn replace_placeholders(html: &str, placeholders: &BTreeMap<String, String>) -> String {
    let (start, end) = body_range(html);
    let mut replaced = 0usize;
    let mut missing = 0usize;

    let body = placeholder_regex().replace_all(&html[start..end], |caps: &Captures<'_>| {
        match placeholders.get(&caps[1]).filter(|value| !value.is_empty()) {
            Some(value) => {
                replaced += 1;
                escape_html(value)
            }
            None => {
                missing += 1;
                caps[0].to_string()
            }
        }
    });

    debug!(replaced, missing, "Replaced placeholders");

    let mut out = String::with_capacity(html.len() + body.len() - (end - start));
    out.push_str(&html[..start]);
    out.push_str(&body);
    out.push_str(&html[end..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placeholders() -> BTreeMap<String, String> {
        [
            ("DATE", "November 28-30, 2025"),
            ("YEAR", "2025"),
            ("DAY3", ""),
            ("VENUE", "Hall <A> & B"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn replaces_text_and_attributes() {
        let html = r#"<body><h1 title="Kirtan {{YEAR}}">{{DATE}}</h1></body>"#;
        assert_eq!(
            replace_placeholders(html, &placeholders()),
            r#"<body><h1 title="Kirtan 2025">November 28-30, 2025</h1></body>"#
        );
    }

    #[test]
    fn unknown_and_empty_tokens_are_kept() {
        let html = "<body>{{DAY3}} {{SPEAKER}} {{YEAR}}</body>";
        assert_eq!(
            replace_placeholders(html, &placeholders()),
            "<body>{{DAY3}} {{SPEAKER}} 2025</body>"
        );
    }

    #[test]
    fn head_is_left_alone() {
        let html = "<html><head><title>{{YEAR}}</title></head><BODY class=\"y{{YEAR}}\">{{YEAR}}</BODY></html>";
        assert_eq!(
            replace_placeholders(html, &placeholders()),
            "<html><head><title>{{YEAR}}</title></head><BODY class=\"y2025\">2025</BODY></html>"
        );
    }

    #[test]
    fn fragment_without_body_is_fully_processed() {
        assert_eq!(replace_placeholders("<p>{{YEAR}}</p>", &placeholders()), "<p>2025</p>");
    }

    #[test]
    fn values_are_escaped() {
        assert_eq!(
            replace_placeholders("<p>{{VENUE}}</p>", &placeholders()),
            "<p>Hall &lt;A&gt; &amp; B</p>"
        );
    }

    #[test]
    fn token_names_are_exact() {
        assert_eq!(
            replace_placeholders("<p>{{ YEAR }} {{year}}</p>", &placeholders()),
            "<p>{{ YEAR }} {{year}}</p>"
        );
    }
}
