//! File-based notification source.
//!
//! Polls a JSON file holding the host's currently active notifications (an
//! array of [`RawNotification`]), the same view a listener gets from asking
//! the host for its active notifications.

use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::{ActiveNotifications, HostEvent, NotificationSource};
use crate::notification::RawNotification;

/// A source that diffs successive versions of an active-notifications file.
///
/// The file's modification time is tracked and the file is only re-read when
/// it changes. Notifications whose `(key, post_time)` was not present in the
/// previous version are reported as posted; keys that disappeared are
/// reported as removed.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    last_error: Option<String>,
    last_modified: Option<SystemTime>,
    active: ActiveNotifications,
    pending: VecDeque<HostEvent>,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            last_error: None,
            last_modified: None,
            active: ActiveNotifications::new(),
            pending: VecDeque::new(),
        }
    }

    /// Returns the path being monitored.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the file's modification time.
    fn get_modified_time(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).ok()?.modified().ok()
    }

    /// Read and parse the file.
    fn read_file(&mut self) -> Option<Vec<RawNotification>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(notifications) => {
                    self.last_error = None;
                    Some(notifications)
                }
                Err(e) => {
                    self.last_error = Some(format!("Parse error: {}", e));
                    None
                }
            },
            Err(e) => {
                self.last_error = Some(format!("Read error: {}", e));
                None
            }
        }
    }

    /// Queue events describing the move from the current set to `next`.
    fn diff(&mut self, next: Vec<RawNotification>) {
        let next_keys: HashMap<String, i64> =
            next.iter().map(|n| (n.key(), n.post_time)).collect();

        let removed: Vec<String> = self
            .active
            .keys()
            .filter(|key| !next_keys.contains_key(*key))
            .map(str::to_string)
            .collect();
        for key in removed {
            let event = HostEvent::Removed { key };
            self.active.apply(&event);
            self.pending.push_back(event);
        }

        for notification in next {
            let unchanged = self
                .active
                .get(&notification.key())
                .is_some_and(|current| current.post_time == notification.post_time);
            if unchanged {
                continue;
            }
            let event = HostEvent::Posted { notification };
            self.active.apply(&event);
            self.pending.push_back(event);
        }
    }
}

impl NotificationSource for FileSource {
    fn poll(&mut self) -> Option<HostEvent> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }

        let current_modified = self.get_modified_time();

        // Check if file has been modified since last read
        let file_changed = match (&self.last_modified, &current_modified) {
            (None, _) => true,        // First poll, always read
            (Some(_), None) => false, // File disappeared, keep the last state
            (Some(last), Some(current)) => current > last,
        };

        if file_changed {
            if let Some(notifications) = self.read_file() {
                self.last_modified = current_modified;
                self.diff(notifications);
            }
        }

        self.pending.pop_front()
    }

    fn active_notifications(&self) -> Vec<RawNotification> {
        self.active.to_vec()
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        self.last_error.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample_json() -> &'static str {
        r#"[
            { "package": "com.dexcom.g6.region1.mmol", "id": 1, "flags": 2,
              "post_time": 1000,
              "content_view": { "actions": [
                  { "view_id": 1, "method": "setText",
                    "parameters": [{ "type": "char_sequence", "value": "5.5 mmol/l" }] }
              ] } },
            { "package": "com.example.chat", "id": 7, "post_time": 900 }
        ]"#
    }

    fn drain(source: &mut FileSource) -> Vec<HostEvent> {
        std::iter::from_fn(|| source.poll()).collect()
    }

    #[test]
    fn test_file_source_new() {
        let source = FileSource::new("/tmp/active.json");
        assert_eq!(source.path(), Path::new("/tmp/active.json"));
        assert_eq!(source.description(), "file: /tmp/active.json");
        assert!(source.error().is_none());
    }

    #[test]
    fn test_file_source_poll_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();

        let mut source = FileSource::new(file.path());

        // First poll reports every notification as posted
        let events = drain(&mut source);
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| matches!(e, HostEvent::Posted { .. })));
        assert_eq!(source.active_notifications().len(), 2);

        // No file change, nothing new
        assert!(source.poll().is_none());
    }

    #[test]
    fn test_file_source_diffs_changes() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();

        let mut source = FileSource::new(file.path());
        drain(&mut source);

        // Same notification re-posted with a new time, the other one gone
        let updated = r#"[
            { "package": "com.dexcom.g6.region1.mmol", "id": 1, "flags": 2,
              "post_time": 2000 }
        ]"#;
        source.diff(serde_json::from_str(updated).unwrap());

        let events = drain(&mut source);
        assert_eq!(
            events[0],
            HostEvent::Removed {
                key: "com.example.chat|7".to_string()
            }
        );
        match &events[1] {
            HostEvent::Posted { notification } => assert_eq!(notification.post_time, 2000),
            other => panic!("unexpected event {:?}", other),
        }
        assert_eq!(events.len(), 2);
        assert_eq!(source.active_notifications().len(), 1);
    }

    #[test]
    fn test_file_source_missing_file() {
        let mut source = FileSource::new("/nonexistent/path/active.json");

        assert!(source.poll().is_none());
        let error = source.error().unwrap();
        assert!(error.contains("Read error"));
    }

    #[test]
    fn test_file_source_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid json").unwrap();

        let mut source = FileSource::new(file.path());

        assert!(source.poll().is_none());
        let error = source.error().unwrap();
        assert!(error.contains("Parse error"));
    }
}
