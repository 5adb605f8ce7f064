//! Persisted key/value preferences.
//!
//! The quiet window is stored as four integers in a small JSON object so the
//! running listener and the settings command can share it:
//!
//! ```json
//! { "filter_start_hour": 8, "filter_start_minute": 0,
//!   "filter_end_hour": 20, "filter_end_minute": 0 }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use crate::error::PrefsError;
use crate::filter::QuietWindow;

pub const KEY_FILTER_START_HOUR: &str = "filter_start_hour";
pub const KEY_FILTER_START_MINUTE: &str = "filter_start_minute";
pub const KEY_FILTER_END_HOUR: &str = "filter_end_hour";
pub const KEY_FILTER_END_MINUTE: &str = "filter_end_minute";

/// Read access to integer preferences.
pub trait IntPreferences {
    /// Returns the stored value, or `default` when the key is absent.
    fn get_int(&self, key: &str, default: i64) -> i64;
}

impl IntPreferences for HashMap<String, i64> {
    fn get_int(&self, key: &str, default: i64) -> i64 {
        self.get(key).copied().unwrap_or(default)
    }
}

/// Integer preferences backed by a JSON file.
///
/// A missing file is an empty store. Writes go straight to disk.
#[derive(Debug)]
pub struct PreferenceStore {
    path: PathBuf,
    values: BTreeMap<String, i64>,
    last_modified: Option<SystemTime>,
}

impl PreferenceStore {
    /// Open the store at `path`, loading it if the file exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PrefsError> {
        let path = path.as_ref().to_path_buf();
        let mut store = Self {
            path,
            values: BTreeMap::new(),
            last_modified: None,
        };
        store.load()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn modified_time(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).ok()?.modified().ok()
    }

    fn load(&mut self) -> Result<(), PrefsError> {
        if !self.path.exists() {
            self.values.clear();
            self.last_modified = None;
            return Ok(());
        }
        let content = fs::read_to_string(&self.path)?;
        self.values = serde_json::from_str(&content)?;
        self.last_modified = self.modified_time();
        Ok(())
    }

    /// Re-read the file if it changed since the last load.
    ///
    /// Returns true if the stored values were reloaded.
    pub fn reload_if_changed(&mut self) -> Result<bool, PrefsError> {
        let current = self.modified_time();
        let changed = match (&self.last_modified, &current) {
            (None, None) => false,
            (Some(last), Some(current)) => current > last,
            _ => true,
        };
        if changed {
            debug!("Preferences at {} changed, reloading", self.path.display());
            self.load()?;
        }
        Ok(changed)
    }

    /// Set several values and persist them in one write.
    pub fn set_ints(&mut self, entries: &[(&str, i64)]) -> Result<(), PrefsError> {
        for (key, value) in entries {
            self.values.insert(key.to_string(), *value);
        }
        self.persist()
    }

    fn persist(&mut self) -> Result<(), PrefsError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let serialized = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, serialized)?;
        self.last_modified = self.modified_time();
        Ok(())
    }

    /// The currently stored quiet window.
    pub fn quiet_window(&self) -> QuietWindow {
        QuietWindow::from_preferences(self)
    }

    /// Store a quiet window; [`QuietWindow::default`] disables it.
    pub fn set_quiet_window(&mut self, window: QuietWindow) -> Result<(), PrefsError> {
        self.set_ints(&[
            (KEY_FILTER_START_HOUR, window.start_hour as i64),
            (KEY_FILTER_START_MINUTE, window.start_minute as i64),
            (KEY_FILTER_END_HOUR, window.end_hour as i64),
            (KEY_FILTER_END_MINUTE, window.end_minute as i64),
        ])
    }
}

impl IntPreferences for PreferenceStore {
    fn get_int(&self, key: &str, default: i64) -> i64 {
        self.values.get(key).copied().unwrap_or(default)
    }
}
