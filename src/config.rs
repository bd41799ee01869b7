use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use serde_json::json;

use crate::error_codes::{CodedError, INVALID_CONFIG};
use crate::image_backend::DEFAULT_ENDPOINT;

pub const EVENTS_DIR_VAR: &str = "SIMG_EVENTS_DIR";
pub const OUTPUT_DIR_VAR: &str = "SIMG_OUTPUT_DIR";

const DEFAULT_EVENTS_DIR: &str = "src/content/events";
const DEFAULT_OUTPUT_DIR: &str = "public/images/events";
const DEFAULT_LANGUAGE: &str = "en";
const DEFAULT_REMOTE_TIMEOUT_SECONDS: u64 = 60;

/// Generator settings. Layered as defaults, then the YAML file, then the
/// environment, then CLI flags (applied by the binary).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailConfig {
    pub events_dir: PathBuf,
    pub output_dir: PathBuf,
    pub languages: Vec<String>,
    pub remote_endpoint: String,
    pub remote_timeout_seconds: u64,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            events_dir: PathBuf::from(DEFAULT_EVENTS_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            languages: vec![DEFAULT_LANGUAGE.to_owned()],
            remote_endpoint: DEFAULT_ENDPOINT.to_owned(),
            remote_timeout_seconds: DEFAULT_REMOTE_TIMEOUT_SECONDS,
        }
    }
}

impl ThumbnailConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|error| {
            anyhow!(CodedError::config(
                INVALID_CONFIG,
                format!("failed to read config {}: {error}", path.display()),
            )
            .with_details(json!({ "path": path.display().to_string() })))
        })?;
        Self::from_yaml(&contents)
            .with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(contents).map_err(|error| {
            let location = error
                .location()
                .map(|location| json!({ "line": location.line(), "column": location.column() }));
            let mut coded = CodedError::config(INVALID_CONFIG, error.to_string());
            if let Some(location) = location {
                coded = coded.with_details(location);
            }
            anyhow!(coded)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `SIMG_EVENTS_DIR` / `SIMG_OUTPUT_DIR` from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| env::var(name).ok());
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_blank = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        if let Some(dir) = non_blank(EVENTS_DIR_VAR) {
            self.events_dir = PathBuf::from(dir);
        }
        if let Some(dir) = non_blank(OUTPUT_DIR_VAR) {
            self.output_dir = PathBuf::from(dir);
        }
    }

    /// Appends languages not already configured, keeping order.
    pub fn add_languages<I, S>(&mut self, languages: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for language in languages {
            let language = language.as_ref().trim().to_ascii_lowercase();
            if !language.is_empty() && !self.languages.contains(&language) {
                self.languages.push(language);
            }
        }
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout_seconds)
    }

    fn validate(&self) -> Result<()> {
        if self.remote_timeout_seconds == 0 {
            return Err(anyhow!(CodedError::config(
                INVALID_CONFIG,
                "remote_timeout_seconds must be greater than zero",
            )));
        }
        if self.languages.is_empty() {
            return Err(anyhow!(CodedError::config(
                INVALID_CONFIG,
                "languages must list at least one content language",
            )));
        }
        Ok(())
    }
}
