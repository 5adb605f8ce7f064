//! Application settings.
//!
//! Settings come from an optional TOML file layered with environment
//! variables prefixed `CGMBAND` (nested keys separated by `__`):
//!
//! ```toml
//! preferences = "prefs.json"
//!
//! [processor]
//! min_delta = 0.1
//! max_delta = 0.1
//! max_time_diff_minutes = 119
//!
//! [extractor]
//! packages = ["com.dexcom.g6.region1.mmol"]
//!
//! [display]
//! channel_id = "values"
//! notification_id = 10
//! icon = "ic_launcher"
//! ```
//!
//! Every value is optional and falls back to its default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::extract::DEXCOM_PACKAGES;
use crate::orchestrator::AlertStyle;
use crate::output::{DEFAULT_CHANNEL_ID, DEFAULT_ICON, DEFAULT_NOTIFICATION_ID};
use crate::process::Thresholds;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Path of the JSON preference store holding the quiet window.
    pub preferences: PathBuf,
    pub processor: ProcessorSettings,
    pub extractor: ExtractorSettings,
    pub display: DisplaySettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preferences: PathBuf::from("prefs.json"),
            processor: ProcessorSettings::default(),
            extractor: ExtractorSettings::default(),
            display: DisplaySettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProcessorSettings {
    pub min_delta: f64,
    pub max_delta: f64,
    pub max_time_diff_minutes: u64,
}

impl Default for ProcessorSettings {
    fn default() -> Self {
        let defaults = Thresholds::default();
        Self {
            min_delta: defaults.min_delta,
            max_delta: defaults.max_delta,
            max_time_diff_minutes: defaults.max_time_diff.as_secs() / 60,
        }
    }
}

impl ProcessorSettings {
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            min_delta: self.min_delta,
            max_delta: self.max_delta,
            max_time_diff: Duration::from_secs(self.max_time_diff_minutes.saturating_mul(60)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExtractorSettings {
    /// Packages whose ongoing notification carries the reading.
    pub packages: Vec<String>,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            packages: DEXCOM_PACKAGES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub channel_id: String,
    pub notification_id: i32,
    pub icon: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            channel_id: DEFAULT_CHANNEL_ID.to_string(),
            notification_id: DEFAULT_NOTIFICATION_ID,
            icon: DEFAULT_ICON.to_string(),
        }
    }
}

impl DisplaySettings {
    pub fn style(&self) -> AlertStyle {
        AlertStyle {
            channel_id: self.channel_id.clone(),
            notification_id: self.notification_id,
            icon: self.icon.clone(),
        }
    }
}

impl Settings {
    /// Load settings from `path` (if it exists) and the environment.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with(path, environment())
    }

    fn load_with(path: &Path, env: Environment) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(env)
            .build()?;
        Ok(config.try_deserialize()?)
    }
}

/// `CGMBAND_<SECTION>__<KEY>` variables, e.g. `CGMBAND_PROCESSOR__MIN_DELTA`.
fn environment() -> Environment {
    Environment::with_prefix("CGMBAND")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
