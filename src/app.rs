//! Session state: one source feeding one pipeline.

use tracing::{debug, info, warn};

use crate::filter::FilterChain;
use crate::notification::RawNotification;
use crate::orchestrator::{Orchestrator, Outcome};
use crate::source::{HostEvent, NotificationSource};

/// Counters over everything a session has processed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Notifications run through the pipeline (posted or replayed).
    pub handled: u64,
    /// Notifications that came from the CGM app.
    pub matched: u64,
    /// Readings successfully decoded and broadcast.
    pub decoded: u64,
    pub displayed: u64,
    pub suppressed: u64,
    /// Times the active notifications were replayed on request.
    pub read_now: u64,
}

impl SessionStats {
    fn record(&mut self, outcome: &Outcome) {
        self.handled += 1;
        match outcome {
            Outcome::Ignored => {}
            Outcome::ExtractionFailed => self.matched += 1,
            Outcome::NoAlert(_) => {
                self.matched += 1;
                self.decoded += 1;
            }
            Outcome::Suppressed { .. } => {
                self.matched += 1;
                self.decoded += 1;
                self.suppressed += 1;
            }
            Outcome::Displayed { .. } => {
                self.matched += 1;
                self.decoded += 1;
                self.displayed += 1;
            }
        }
    }
}

/// A listening session.
///
/// Owns the source and the pipeline; the processor's alert baseline lives
/// exactly as long as the session.
pub struct Session {
    source: Box<dyn NotificationSource>,
    orchestrator: Orchestrator,
    pub stats: SessionStats,
    pub last_error: Option<String>,
}

impl Session {
    /// Create a new session with the given source and pipeline.
    pub fn new(source: Box<dyn NotificationSource>, orchestrator: Orchestrator) -> Self {
        Self {
            source,
            orchestrator,
            stats: SessionStats::default(),
            last_error: None,
        }
    }

    /// Returns a description of the current notification source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// True once the source can produce no more events.
    pub fn is_finished(&self) -> bool {
        self.source.is_closed()
    }

    /// Drain all pending events from the source.
    ///
    /// Returns the outcomes of every pipeline run, in order.
    pub fn pump(&mut self) -> Vec<Outcome> {
        let mut outcomes = Vec::new();
        while let Some(event) = self.source.poll() {
            match event {
                HostEvent::Posted { notification } => {
                    outcomes.push(self.run(&notification));
                }
                HostEvent::Removed { key } => {
                    debug!("Notification {} removed", key);
                }
                HostEvent::ReadNow => outcomes.extend(self.read_now()),
            }
        }

        let error = self.source.error();
        if error.is_some() && error != self.last_error {
            warn!(
                "Source {} reported: {}",
                self.source.description(),
                error.as_deref().unwrap_or_default()
            );
        }
        self.last_error = error;

        outcomes
    }

    /// Replay every active notification through the pipeline.
    pub fn read_now(&mut self) -> Vec<Outcome> {
        let active = self.source.active_notifications();
        info!("Reading {} active notifications", active.len());
        self.stats.read_now += 1;
        active.iter().map(|n| self.run(n)).collect()
    }

    /// Swap the filter chain after the quiet window changed.
    pub fn replace_filters(&mut self, filters: FilterChain) {
        self.orchestrator.replace_filters(filters);
    }

    fn run(&mut self, notification: &RawNotification) -> Outcome {
        let outcome = self.orchestrator.handle(notification);
        self.stats.record(&outcome);
        outcome
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("source", &self.source.description())
            .field("stats", &self.stats)
            .finish()
    }
}
