//! Alert displays.

use std::io::Write;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use super::{AlertDisplay, DisplayRequest};

/// Writes alerts to a writer (stdout by default), one block per alert.
///
/// Cancelling a shown alert writes a `[channel#id] cleared` line.
pub struct StdoutDisplay {
    writer: Box<dyn Write + Send>,
    /// Channel and id of the alert on display.
    showing: Option<(String, i32)>,
}

impl std::fmt::Debug for StdoutDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StdoutDisplay").field("showing", &self.showing).finish()
    }
}

impl Default for StdoutDisplay {
    fn default() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }
}

impl StdoutDisplay {
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer,
            showing: None,
        }
    }

    fn write_line(&mut self, channel_id: &str, notification_id: i32, text: &str) {
        let result = writeln!(self.writer, "[{}#{}] {}", channel_id, notification_id, text)
            .and_then(|_| self.writer.flush());
        if let Err(e) = result {
            warn!("Failed to write alert: {}", e);
        }
    }
}

impl AlertDisplay for StdoutDisplay {
    fn cancel(&mut self) {
        if let Some((channel_id, notification_id)) = self.showing.take() {
            debug!("Clearing displayed alert");
            self.write_line(&channel_id, notification_id, "cleared");
        }
    }

    fn show(&mut self, request: &DisplayRequest) {
        self.write_line(&request.channel_id, request.notification_id, &request.text);
        self.showing = Some((request.channel_id.clone(), request.notification_id));
    }
}

/// Display event captured by [`RecordingDisplay`].
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayEvent {
    Cancelled,
    Shown(DisplayRequest),
}

/// Keeps the displayed alert and the full event history in memory.
///
/// Clones share state.
#[derive(Debug, Clone, Default)]
pub struct RecordingDisplay {
    state: Arc<Mutex<RecordingState>>,
}

#[derive(Debug, Default)]
struct RecordingState {
    current: Option<DisplayRequest>,
    events: Vec<DisplayEvent>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// The alert currently on screen.
    pub fn current(&self) -> Option<DisplayRequest> {
        self.state.lock().ok().and_then(|s| s.current.clone())
    }

    pub fn events(&self) -> Vec<DisplayEvent> {
        self.state.lock().map(|s| s.events.clone()).unwrap_or_default()
    }

    /// Texts of every alert shown so far.
    pub fn shown_texts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                DisplayEvent::Shown(request) => Some(request.text),
                DisplayEvent::Cancelled => None,
            })
            .collect()
    }
}

impl AlertDisplay for RecordingDisplay {
    fn cancel(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            state.current = None;
            state.events.push(DisplayEvent::Cancelled);
        }
    }

    fn show(&mut self, request: &DisplayRequest) {
        if let Ok(mut state) = self.state.lock() {
            state.current = Some(request.clone());
            state.events.push(DisplayEvent::Shown(request.clone()));
        }
    }
}
