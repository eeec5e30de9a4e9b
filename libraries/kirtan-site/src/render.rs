//! Page rendering pipeline

use crate::config::{SiteConfig, YOUTUBE_KEY};
use crate::embed::embed_videos;
use crate::markup::{child_insertion_point, element_by_id};
use crate::schedule::{load_schedule, parse_schedule, render_table, ScheduleSource};
use crate::template::replace_placeholders;
use tracing::{error, info, warn};

/// Runs placeholders, then video embeds, then schedule tables
pub struct SiteRenderer<S> {
    config: SiteConfig,
    schedules: S,
}

impl<S: ScheduleSource> SiteRenderer<S> {
    pub fn new(config: SiteConfig, schedules: S) -> Self {
        Self { config, schedules }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Render a page
    ///
    /// Missing containers and unavailable schedules are logged; the rest of
    /// the page is still produced.
    pub async fn render(&self, html: &str) -> String {
        let html = replace_placeholders(html, &self.config.placeholders);
        let mut html = embed_videos(&html, self.config.placeholder(YOUTUBE_KEY));

        for container in self.config.schedule_containers() {
            html = self.fill_schedule(&html, container).await;
        }

        info!(bytes = html.len(), "Rendered page");
        html
    }

    /// Append the schedule table for one container
    async fn fill_schedule(&self, html: &str, container: &str) -> String {
        let Some(open) = element_by_id(html, container) else {
            warn!(container, "Schedule container not found");
            return html.to_string();
        };

        let entries = match open.attribute("data-day") {
            Some(day) => match load_schedule(&self.schedules, &day, self.config.debug).await {
                Some(text) => parse_schedule(&text),
                None => {
                    error!(day = %day, "Schedule not found");
                    Vec::new()
                }
            },
            None => {
                error!(container, "Schedule container has no data-day attribute");
                Vec::new()
            }
        };

        let at = child_insertion_point(html, &open);
        let mut out = String::with_capacity(html.len() + 256);
        out.push_str(&html[..at]);
        out.push_str(&render_table(&entries));
        out.push_str(&html[at..]);
        out
    }
}
