//! Kirtan Radio - Site Rendering
//!
//! Turns the static landing-page templates into the published page.
//!
//! This crate provides:
//! - Per-event configuration (file + `KIRTAN_*` environment overrides)
//! - `{{TOKEN}}` placeholder substitution in the page body
//! - Video embeds for `data-youtube` elements
//! - Schedule tables fetched per day over HTTP or from disk
//!
//! # Example
//!
//! ```rust
//! use kirtan_site::{DirScheduleSource, SiteConfig, SiteRenderer};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> kirtan_site::Result<()> {
//! let config = SiteConfig::from_toml(
//!     r#"
//!     [placeholders]
//!     YEAR = "2025"
//!     "#,
//! )?;
//!
//! let renderer = SiteRenderer::new(config, DirScheduleSource::new("config"));
//! let page = renderer.render("<body><footer>Kirtan {{YEAR}}</footer></body>").await;
//! assert_eq!(page, "<body><footer>Kirtan 2025</footer></body>");
//! # Ok(())
//! # }
//! ```

mod config;
mod embed;
mod error;
mod markup;
mod render;
mod schedule;
mod template;

// Public exports
pub use config::{SiteConfig, DEFAULT_CONFIG_FILE, ENV_PREFIX, YOUTUBE_KEY};
pub use embed::{embed_videos, iframe, EmbedKind, EMBED_ATTRIBUTE};
pub use error::{Result, SiteError};
pub use markup::escape_html;
pub use render::SiteRenderer;
pub use schedule::{
    load_schedule, parse_schedule, render_table, DirScheduleSource, HttpScheduleSource,
    ScheduleEntry, ScheduleSource, SAMPLE_SCHEDULE,
};
pub use template::replace_placeholders;
