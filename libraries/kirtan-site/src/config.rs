//! Per-event site configuration

use crate::error::{Result, SiteError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use url::Url;

/// Config file picked up from the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "kirtan.toml";

/// Prefix for environment overrides, e.g. `KIRTAN_HAS_SCHEDULE=true`
pub const ENV_PREFIX: &str = "KIRTAN";

/// Placeholder holding the video embed url
pub const YOUTUBE_KEY: &str = "YOUTUBE";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SiteConfig {
    /// `{{TOKEN}}` replacements; names are upper-cased on load
    #[serde(default)]
    pub placeholders: BTreeMap<String, String>,

    #[serde(default)]
    pub is_live: bool,

    /// Render the schedule tables
    #[serde(default)]
    pub has_schedule: bool,

    /// The event has a third (Sunday) day
    #[serde(default)]
    pub has_sunday: bool,

    /// Fall back to a sample schedule when a fetch fails
    #[serde(default)]
    pub debug: bool,
}

impl SiteConfig {
    /// Load configuration from file and environment
    ///
    /// With no explicit path, `kirtan.toml` in the working directory is used
    /// if it exists. `KIRTAN_*` variables override file values; nested keys
    /// use a double underscore (`KIRTAN_PLACEHOLDERS__YEAR=2026`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path).required(true));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| SiteError::Config(e.to_string()))?;

        let site: Self = config
            .try_deserialize()
            .map_err(|e| SiteError::Config(e.to_string()))?;

        let site = site.normalized();
        site.validate()?;
        Ok(site)
    }

    /// Parse configuration from TOML text, without environment overrides
    pub fn from_toml(text: &str) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(text, config::FileFormat::Toml))
            .build()
            .map_err(|e| SiteError::Config(e.to_string()))?;

        let site: Self = config
            .try_deserialize()
            .map_err(|e| SiteError::Config(e.to_string()))?;

        let site = site.normalized();
        site.validate()?;
        Ok(site)
    }

    fn normalized(mut self) -> Self {
        self.placeholders = std::mem::take(&mut self.placeholders)
            .into_iter()
            .map(|(key, value)| (key.trim().to_ascii_uppercase(), value))
            .collect();
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        for key in self.placeholders.keys() {
            if key.trim().is_empty() {
                return Err(SiteError::Config("Placeholder name cannot be empty".into()));
            }
            if key.contains(&['{', '}'][..]) {
                return Err(SiteError::Config(format!(
                    "Placeholder name {key:?} cannot contain braces"
                )));
            }
        }

        if let Some(url) = self.placeholder(YOUTUBE_KEY) {
            Url::parse(url).map_err(|e| {
                SiteError::Config(format!("{YOUTUBE_KEY} is not a valid url: {e}"))
            })?;
        }

        Ok(())
    }

    /// Configured, non-empty value of a placeholder
    pub fn placeholder(&self, key: &str) -> Option<&str> {
        self.placeholders
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Containers that get a schedule table, in page order
    pub fn schedule_containers(&self) -> Vec<&'static str> {
        let mut containers = vec!["day1Container", "day2Container"];
        if self.has_schedule && self.has_sunday {
            containers.push("day3Container");
        }
        containers
    }
}
