//! Reading observers.

use std::sync::{Arc, Mutex};

use chrono::{Local, TimeZone};
use tokio::sync::watch;
use tracing::info;

use super::ReadingObserver;
use crate::reading::ReadingBroadcast;

/// Logs each reading as `"<value> <unit> @HH:MM"`, using the local time the
/// source notification was posted.
#[derive(Debug, Clone, Default)]
pub struct StatusLineObserver;

impl StatusLineObserver {
    pub fn status_line(broadcast: &ReadingBroadcast) -> String {
        let reading = &broadcast.reading;
        let posted = Local
            .timestamp_millis_opt(reading.timestamp_millis())
            .single()
            .map(|t| t.format("%H:%M").to_string())
            .unwrap_or_else(|| "--:--".to_string());
        format!("{:.2} {} @{}", reading.value(), reading.unit(), posted)
    }
}

impl ReadingObserver for StatusLineObserver {
    fn on_reading(&self, broadcast: &ReadingBroadcast) {
        info!("Reading {}", Self::status_line(broadcast));
    }
}

/// Publishes the latest reading on a watch channel.
///
/// Useful for a UI task that only cares about the current value.
#[derive(Debug)]
pub struct WatchObserver {
    sender: watch::Sender<Option<ReadingBroadcast>>,
}

impl WatchObserver {
    /// Create an observer and the receiver that sees its updates.
    pub fn create() -> (Self, watch::Receiver<Option<ReadingBroadcast>>) {
        let (sender, receiver) = watch::channel(None);
        (Self { sender }, receiver)
    }
}

impl ReadingObserver for WatchObserver {
    fn on_reading(&self, broadcast: &ReadingBroadcast) {
        // send_replace keeps the value even with no receivers alive
        self.sender.send_replace(Some(broadcast.clone()));
    }
}

/// Collects every broadcast in memory.
///
/// Clones share the same buffer, so keep one clone to inspect what the
/// pipeline broadcast.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    received: Arc<Mutex<Vec<ReadingBroadcast>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn received(&self) -> Vec<ReadingBroadcast> {
        self.received.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.received.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReadingObserver for RecordingObserver {
    fn on_reading(&self, broadcast: &ReadingBroadcast) {
        if let Ok(mut received) = self.received.lock() {
            received.push(broadcast.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::Broadcast;
    use crate::reading::Reading;

    #[test]
    fn test_broadcast_reaches_all_observers() {
        let first = RecordingObserver::new();
        let second = RecordingObserver::new();
        let mut broadcast = Broadcast::new();
        broadcast.register(Box::new(first.clone()));
        broadcast.register(Box::new(second.clone()));
        assert_eq!(broadcast.len(), 2);

        broadcast.send(&Reading::new(5.5, "mmol/l", 0));
        assert_eq!(first.len(), 1);
        assert_eq!(second.received()[0].reading.unit(), "mmol/l");
    }

    #[test]
    fn test_watch_observer_keeps_latest() {
        let (observer, receiver) = WatchObserver::create();
        assert!(receiver.borrow().is_none());

        observer.on_reading(&ReadingBroadcast {
            reading: Reading::new(100.0, "mg/dl", 0),
        });
        observer.on_reading(&ReadingBroadcast {
            reading: Reading::new(104.0, "mg/dl", 60_000),
        });

        let latest = receiver.borrow().clone().unwrap();
        assert_eq!(latest.reading.value(), 104.0);
    }

    #[test]
    fn test_status_line_format() {
        let line = StatusLineObserver::status_line(&ReadingBroadcast {
            reading: Reading::new(5.5, "mmol/l", 0),
        });
        assert!(line.starts_with("5.50 mmol/l @"));
        assert_eq!(line.len(), "5.50 mmol/l @HH:MM".len());
    }
}
