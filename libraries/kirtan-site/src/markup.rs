//! Markup scanning helpers
//!
//! Regex-based tag scanning, enough for the well-formed templates the site
//! ships. This is not an HTML parser: comments and raw-text elements are
//! not special-cased.

use regex::Regex;
use std::sync::OnceLock;

/// Elements that never have children
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<(/?)([A-Za-z][A-Za-z0-9-]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#)
            .expect("valid tag regex")
    })
}

fn attribute_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"([^\s=/>"']+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#)
            .expect("valid attribute regex")
    })
}

/// A start or end tag found in the markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Tag {
    /// Byte offset of `<`
    pub start: usize,
    /// Byte offset just past `>`
    pub end: usize,
    /// Lowercased element name
    pub name: String,
    /// Raw attribute text
    pub attrs: String,
    pub closing: bool,
    pub self_closing: bool,
}

impl Tag {
    pub fn attribute(&self, name: &str) -> Option<String> {
        attribute(&self.attrs, name)
    }

    fn is_void(&self) -> bool {
        self.self_closing || VOID_ELEMENTS.contains(&self.name.as_str())
    }
}

/// Every tag in document order
pub(crate) fn tags(html: &str) -> impl Iterator<Item = Tag> + '_ {
    tag_regex().captures_iter(html).filter_map(|caps| {
        let whole = caps.get(0)?;
        let attrs = caps.get(3).map_or("", |m| m.as_str());
        Some(Tag {
            start: whole.start(),
            end: whole.end(),
            name: caps.get(2)?.as_str().to_ascii_lowercase(),
            attrs: attrs.to_string(),
            closing: caps.get(1).is_some_and(|m| !m.as_str().is_empty()),
            self_closing: attrs.trim_end().ends_with('/'),
        })
    })
}

/// Value of attribute `name` (case-insensitive); valueless attributes give `""`
pub(crate) fn attribute(attrs: &str, name: &str) -> Option<String> {
    attribute_regex().captures_iter(attrs).find_map(|caps| {
        let key = caps.get(1)?.as_str();
        if !key.eq_ignore_ascii_case(name) {
            return None;
        }
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map_or("", |m| m.as_str());
        Some(value.to_string())
    })
}

/// Opening tags carrying attribute `name`
pub(crate) fn elements_with_attribute(html: &str, name: &str) -> Vec<Tag> {
    tags(html)
        .filter(|tag| !tag.closing && tag.attribute(name).is_some())
        .collect()
}

/// Opening tag of the element with `id`
pub(crate) fn element_by_id(html: &str, id: &str) -> Option<Tag> {
    tags(html).find(|tag| !tag.closing && tag.attribute("id").as_deref() == Some(id))
}

/// Offset at which a new last child of `open` goes
///
/// That is the start of the matching end tag. Void elements and elements
/// without an end tag fall back to the position right after `open`.
pub(crate) fn child_insertion_point(html: &str, open: &Tag) -> usize {
    if open.is_void() {
        return open.end;
    }

    let mut depth = 0usize;
    for tag in tags(&html[open.end..]) {
        if tag.name != open.name {
            continue;
        }
        if tag.closing {
            if depth == 0 {
                return open.end + tag.start;
            }
            depth -= 1;
        } else if !tag.self_closing {
            depth += 1;
        }
    }
    open.end
}

/// Insert fragments at byte offsets, all relative to the original `html`
pub(crate) fn insert_all(html: &str, mut inserts: Vec<(usize, String)>) -> String {
    // Stable sort keeps document order for fragments sharing an offset
    inserts.sort_by_key(|(offset, _)| *offset);

    let extra: usize = inserts.iter().map(|(_, fragment)| fragment.len()).sum();
    let mut out = String::with_capacity(html.len() + extra);
    let mut cursor = 0;
    for (offset, fragment) in inserts {
        out.push_str(&html[cursor..offset]);
        out.push_str(&fragment);
        cursor = offset;
    }
    out.push_str(&html[cursor..]);
    out
}

/// Escape text for use in element content or a quoted attribute value
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_open_close_and_self_closing_tags() {
        let html = r#"<div id="a"><br/><img src="x.png"></div>"#;
        let found: Vec<_> = tags(html).collect();

        assert_eq!(found.len(), 4);
        assert_eq!(found[0].name, "div");
        assert!(!found[0].closing);
        assert!(found[1].self_closing);
        assert_eq!(found[2].attribute("src").as_deref(), Some("x.png"));
        assert!(found[3].closing);
    }

    #[test]
    fn quoted_gt_does_not_end_tag() {
        let html = r#"<p title="a > b" data-x='1'>text</p>"#;
        let tag = tags(html).next().unwrap();
        assert_eq!(tag.attribute("title").as_deref(), Some("a > b"));
        assert_eq!(tag.attribute("data-x").as_deref(), Some("1"));
    }

    #[test]
    fn attribute_lookup() {
        let attrs = r#" class="schedule" DATA-DAY=day1 hidden"#;
        assert_eq!(attribute(attrs, "data-day").as_deref(), Some("day1"));
        assert_eq!(attribute(attrs, "hidden").as_deref(), Some(""));
        assert_eq!(attribute(attrs, "id"), None);
    }

    #[test]
    fn finds_element_by_id() {
        let html = r#"<section><div id="day2Container" data-day="day2"></div></section>"#;
        let tag = element_by_id(html, "day2Container").unwrap();
        assert_eq!(tag.attribute("data-day").as_deref(), Some("day2"));
        assert!(element_by_id(html, "day3Container").is_none());
    }

    #[test]
    fn insertion_point_skips_nested_elements() {
        let html = r#"<div id="c"><div>inner</div><p>x</p></div><div>after</div>"#;
        let open = element_by_id(html, "c").unwrap();
        let at = child_insertion_point(html, &open);
        assert_eq!(&html[at..at + 6], "</div>");
        assert_eq!(&html[..at], r#"<div id="c"><div>inner</div><p>x</p>"#);
    }

    #[test]
    fn insertion_point_for_unclosed_or_void_element() {
        let html = r#"<img id="v" src="a.png"><div id="u">"#;
        let void = element_by_id(html, "v").unwrap();
        assert_eq!(child_insertion_point(html, &void), void.end);

        let unclosed = element_by_id(html, "u").unwrap();
        assert_eq!(child_insertion_point(html, &unclosed), html.len());
    }

    #[test]
    fn insert_all_keeps_offsets_relative_to_input() {
        let html = "<a></a><b></b>";
        let out = insert_all(html, vec![(10, "2".to_string()), (3, "1".to_string())]);
        assert_eq!(out, "<a>1</a><b>2</b>");
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_html(r#"Raag & "Taal" <b>"#),
            "Raag &amp; &quot;Taal&quot; &lt;b&gt;"
        );
    }
}
