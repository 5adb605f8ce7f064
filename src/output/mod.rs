//! Where decoded readings and alerts go.
//!
//! Two boundaries leave the pipeline:
//!
//! - every decoded reading is broadcast to [`ReadingObserver`]s (status
//!   views, other processes), whether or not it produces an alert
//! - alerts are shown through an [`AlertDisplay`], which holds at most one
//!   alert from this system at a time

mod display;
mod observer;

pub use display::{DisplayEvent, RecordingDisplay, StdoutDisplay};
pub use observer::{RecordingObserver, StatusLineObserver, WatchObserver};

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::reading::{Reading, ReadingBroadcast};

/// Receives every decoded reading.
pub trait ReadingObserver: Send + Debug {
    fn on_reading(&self, broadcast: &ReadingBroadcast);
}

/// Fans a reading out to all registered observers.
#[derive(Debug, Default)]
pub struct Broadcast {
    observers: Vec<Box<dyn ReadingObserver>>,
}

impl Broadcast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, observer: Box<dyn ReadingObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn send(&self, reading: &Reading) {
        let broadcast = ReadingBroadcast {
            reading: reading.clone(),
        };
        for observer in &self.observers {
            observer.on_reading(&broadcast);
        }
    }
}

/// Default notification channel for alerts.
pub const DEFAULT_CHANNEL_ID: &str = "values";
/// Default id of the single alert this system shows.
pub const DEFAULT_NOTIFICATION_ID: i32 = 10;
/// Default small icon resource.
pub const DEFAULT_ICON: &str = "ic_launcher";

/// A request to show an alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayRequest {
    pub channel_id: String,
    pub notification_id: i32,
    pub icon: String,
    pub text: String,
}

/// Shows alerts to the user.
pub trait AlertDisplay: Send + Debug {
    /// Remove any alert this system is currently showing.
    fn cancel(&mut self);

    /// Show a new alert.
    fn show(&mut self, request: &DisplayRequest);
}
