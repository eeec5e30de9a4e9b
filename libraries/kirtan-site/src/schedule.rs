//! Schedule tables
//!
//! Plain-text schedules (`12:00 PM Welcome`, one entry per line) are
//! fetched per day and rendered into `table.schedule`.

use crate::error::{Result, SiteError};
use crate::markup::escape_html;
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, error, info};
use url::Url;

/// Served instead of a failed fetch in debug mode
pub const SAMPLE_SCHEDULE: &str = "
    12:00 PM Welcome
    12:05 PM Opening Remarks
    12:10 PM Keynote
";

fn entry_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d{1,2}:\d{2}\s*(?:AM|PM)?)\s+(.*)").expect("valid schedule regex")
    })
}

/// One row of a schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub time: String,
    pub title: String,
}

/// Extract every `time title` entry from schedule text
///
/// Lines that do not start with a time are skipped.
pub fn parse_schedule(text: &str) -> Vec<ScheduleEntry> {
    entry_regex()
        .captures_iter(text)
        .map(|caps| ScheduleEntry {
            time: caps[1].trim().to_string(),
            title: caps[2].trim().to_string(),
        })
        .collect()
}

/// `<table class="schedule">` with one row per entry
pub fn render_table(entries: &[ScheduleEntry]) -> String {
    let mut html =
        String::from(r#"<table class="schedule"><colgroup><col><col></colgroup><tbody>"#);
    for entry in entries {
        html.push_str("<tr><td>");
        html.push_str(&escape_html(&entry.time));
        html.push_str("</td><td>");
        html.push_str(&escape_html(&entry.title));
        html.push_str("</td></tr>");
    }
    html.push_str("</tbody></table>");
    html
}

/// Where schedule text comes from
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    /// Raw schedule text for `day` (the container's `data-day` value)
    async fn fetch(&self, day: &str) -> Result<String>;
}

#[async_trait]
impl<T: ScheduleSource + ?Sized> ScheduleSource for Box<T> {
    async fn fetch(&self, day: &str) -> Result<String> {
        (**self).fetch(day).await
    }
}

/// Day names end up in a path or url; keep them to a single plain segment
fn check_day(day: &str) -> Result<()> {
    let plain = !day.is_empty()
        && day
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if plain {
        Ok(())
    } else {
        Err(SiteError::InvalidDay(day.to_string()))
    }
}

/// Fetches `{base}/config/{day}.txt` over HTTP
///
/// Every request carries a `cache` query parameter with the current time so
/// intermediaries never serve a stale schedule.
pub struct HttpScheduleSource {
    http: Client,
    base: Url,
}

impl HttpScheduleSource {
    pub fn new(base: &str) -> Result<Self> {
        let mut base = Url::parse(base).map_err(|e| SiteError::InvalidUrl(e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(SiteError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("KirtanRadio/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, base })
    }

    /// Url for a day, without the cache buster
    pub fn schedule_url(&self, day: &str) -> Result<Url> {
        check_day(day)?;
        self.base
            .join(&format!("config/{day}.txt"))
            .map_err(|e| SiteError::InvalidUrl(e.to_string()))
    }
}

#[async_trait]
impl ScheduleSource for HttpScheduleSource {
    async fn fetch(&self, day: &str) -> Result<String> {
        let mut url = self.schedule_url(day)?;
        let cache_buster = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        url.query_pairs_mut()
            .append_pair("cache", &cache_buster.to_string());

        debug!(url = %url, "Fetching schedule");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SiteError::ScheduleUnavailable {
                day: day.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

/// Reads `{dir}/{day}.txt` from disk
pub struct DirScheduleSource {
    dir: PathBuf,
}

impl DirScheduleSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ScheduleSource for DirScheduleSource {
    async fn fetch(&self, day: &str) -> Result<String> {
        check_day(day)?;
        let path = self.dir.join(format!("{day}.txt"));
        debug!(path = %path.display(), "Reading schedule");
        Ok(tokio::fs::read_to_string(path).await?)
    }
}

/// Schedule text for `day`, or `None` when it cannot be loaded
///
/// In debug mode a failed load yields [`SAMPLE_SCHEDULE`] instead.
pub async fn load_schedule<S: ScheduleSource + ?Sized>(
    source: &S,
    day: &str,
    debug_fallback: bool,
) -> Option<String> {
    match source.fetch(day).await {
        Ok(text) => Some(text),
        Err(e) if debug_fallback => {
            info!(day, error = %e, "Schedule unavailable, using sample schedule");
            Some(SAMPLE_SCHEDULE.to_string())
        }
        Err(e) => {
            error!(day, error = %e, "Error loading schedule");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    #[async_trait]
    impl ScheduleSource for Failing {
        async fn fetch(&self, day: &str) -> Result<String> {
            Err(SiteError::ScheduleUnavailable {
                day: day.to_string(),
                status: 404,
            })
        }
    }

    #[test]
    fn parses_entries_with_and_without_meridiem() {
        let text = "
            10:30 AM  Asa Di Vaar
            Break for langar
            9:05 Sukhmani Sahib
            12:00PM Anand Sahib
        ";
        let entries = parse_schedule(text);
        assert_eq!(
            entries,
            vec![
                ScheduleEntry {
                    time: "10:30 AM".into(),
                    title: "Asa Di Vaar".into()
                },
                ScheduleEntry {
                    time: "9:05".into(),
                    title: "Sukhmani Sahib".into()
                },
                ScheduleEntry {
                    time: "12:00PM".into(),
                    title: "Anand Sahib".into()
                },
            ]
        );
    }

    #[test]
    fn sample_schedule_has_three_entries() {
        let entries = parse_schedule(SAMPLE_SCHEDULE);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].title, "Opening Remarks");
    }

    #[test]
    fn renders_table_with_escaped_cells() {
        let html = render_table(&[ScheduleEntry {
            time: "7:00 PM".into(),
            title: "Raag <Kalyan> & Q&A".into(),
        }]);
        assert_eq!(
            html,
            r#"<table class="schedule"><colgroup><col><col></colgroup><tbody><tr><td>7:00 PM</td><td>Raag &lt;Kalyan&gt; &amp; Q&amp;A</td></tr></tbody></table>"#
        );
    }

    #[test]
    fn empty_schedule_renders_empty_body() {
        assert!(render_table(&[]).contains("<tbody></tbody>"));
    }

    #[test]
    fn day_names_must_be_plain() {
        assert!(check_day("day1").is_ok());
        assert!(check_day("sunday_2").is_ok());
        assert!(check_day("").is_err());
        assert!(check_day("../secrets").is_err());
        assert!(check_day("a/b").is_err());
    }

    #[test]
    fn schedule_url_is_under_config() {
        let source = HttpScheduleSource::new("https://kirtan.example.org/2025").unwrap();
        assert_eq!(
            source.schedule_url("day2").unwrap().as_str(),
            "https://kirtan.example.org/2025/config/day2.txt"
        );
    }

    #[test]
    fn non_http_base_is_rejected() {
        assert!(matches!(
            HttpScheduleSource::new("ftp://example.org"),
            Err(SiteError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn failed_load_falls_back_only_in_debug() {
        assert_eq!(
            load_schedule(&Failing, "day1", true).await.as_deref(),
            Some(SAMPLE_SCHEDULE)
        );
        assert_eq!(load_schedule(&Failing, "day1", false).await, None);
    }
}
