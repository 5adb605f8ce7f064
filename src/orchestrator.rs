//! The notification → alert pipeline.

use tracing::{debug, info};

use crate::extract::Extractor;
use crate::filter::FilterChain;
use crate::notification::RawNotification;
use crate::output::{
    AlertDisplay, Broadcast, DisplayRequest, DEFAULT_CHANNEL_ID, DEFAULT_ICON,
    DEFAULT_NOTIFICATION_ID,
};
use crate::process::Processor;
use crate::reading::Reading;

/// How a single notification left the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Not the CGM app's ongoing notification.
    Ignored,
    /// Matched, but no reading could be decoded.
    ExtractionFailed,
    /// Decoded and broadcast; no alert due.
    NoAlert(Reading),
    /// An alert was due but a filter vetoed it. The previous alert has
    /// already been cleared.
    Suppressed {
        reading: Reading,
        message: String,
        filter: &'static str,
    },
    /// A new alert is on display.
    Displayed { reading: Reading, message: String },
}

/// Appearance of the alerts this system shows.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertStyle {
    pub channel_id: String,
    pub notification_id: i32,
    pub icon: String,
}

impl Default for AlertStyle {
    fn default() -> Self {
        Self {
            channel_id: DEFAULT_CHANNEL_ID.to_string(),
            notification_id: DEFAULT_NOTIFICATION_ID,
            icon: DEFAULT_ICON.to_string(),
        }
    }
}

/// Runs raw notifications through extract → broadcast → process → filter →
/// display.
///
/// Each call to [`handle`](Self::handle) runs to completion before the next
/// one; the processor's baseline depends on seeing readings one at a time in
/// arrival order. Share an orchestrator between threads only behind a single
/// mutex around `handle`.
#[derive(Debug)]
pub struct Orchestrator {
    extractor: Box<dyn Extractor>,
    processor: Box<dyn Processor>,
    filters: FilterChain,
    broadcast: Broadcast,
    display: Box<dyn AlertDisplay>,
    style: AlertStyle,
}

impl Orchestrator {
    pub fn new(
        extractor: Box<dyn Extractor>,
        processor: Box<dyn Processor>,
        filters: FilterChain,
        broadcast: Broadcast,
        display: Box<dyn AlertDisplay>,
    ) -> Self {
        Self {
            extractor,
            processor,
            filters,
            broadcast,
            display,
            style: AlertStyle::default(),
        }
    }

    pub fn with_style(mut self, style: AlertStyle) -> Self {
        self.style = style;
        self
    }

    /// Swap the filter chain, e.g. after the quiet window was reconfigured.
    pub fn replace_filters(&mut self, filters: FilterChain) {
        self.filters = filters;
    }

    pub fn processor(&self) -> &dyn Processor {
        self.processor.as_ref()
    }

    /// Run one notification through the pipeline.
    pub fn handle(&mut self, notification: &RawNotification) -> Outcome {
        if !self.extractor.matches(notification) {
            return Outcome::Ignored;
        }

        let reading = match self.extractor.extract(notification) {
            Ok(reading) => reading,
            Err(e) => {
                debug!("Extraction failed for {}: {}", notification.key(), e);
                return Outcome::ExtractionFailed;
            }
        };

        self.broadcast.send(&reading);

        let Some(message) = self.processor.process(&reading) else {
            return Outcome::NoAlert(reading);
        };

        // The previous alert goes away even if this one ends up suppressed.
        self.display.cancel();

        if let Some(filter) = self.filters.suppressed_by(&reading, &message) {
            debug!("Alert {:?} suppressed by {} filter", message, filter);
            return Outcome::Suppressed {
                reading,
                message,
                filter,
            };
        }

        info!("Alert: {:?}", message);
        self.display.show(&DisplayRequest {
            channel_id: self.style.channel_id.clone(),
            notification_id: self.style.notification_id,
            icon: self.style.icon.clone(),
            text: message.clone(),
        });
        Outcome::Displayed { reading, message }
    }

    /// Run a batch (the host's active notifications) through the pipeline,
    /// in order.
    pub fn replay<'a, I>(&mut self, notifications: I) -> Vec<Outcome>
    where
        I: IntoIterator<Item = &'a RawNotification>,
    {
        notifications.into_iter().map(|n| self.handle(n)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    use crate::extract::DexcomExtractor;
    use crate::filter::{FixedClock, QuietWindow, TimeOfDayFilter};
    use crate::notification::{Instruction, Parameter, RenderedView, FLAG_ONGOING_EVENT};
    use crate::output::{RecordingDisplay, RecordingObserver};
    use crate::process::RelativeDeltaProcessor;

    const PACKAGE: &str = "com.dexcom.g6.region1.mmol";
    const T0: i64 = 1_700_000_000_000;
    const MINUTE: i64 = 60_000;

    fn notification(text: &str, post_time: i64) -> RawNotification {
        RawNotification {
            package: PACKAGE.to_string(),
            id: 1,
            tag: None,
            flags: FLAG_ONGOING_EVENT,
            post_time,
            content_view: Some(RenderedView {
                schema: 1,
                actions: vec![Instruction {
                    view_id: 1,
                    method: Some("setText".to_string()),
                    parameters: vec![Parameter::CharSequence(text.to_string())],
                }],
            }),
            big_content_view: None,
        }
    }

    fn pipeline(filters: FilterChain) -> (Orchestrator, RecordingObserver, RecordingDisplay) {
        let observer = RecordingObserver::new();
        let display = RecordingDisplay::new();
        let mut broadcast = Broadcast::new();
        broadcast.register(Box::new(observer.clone()));
        let orchestrator = Orchestrator::new(
            Box::new(DexcomExtractor::default()),
            Box::new(RelativeDeltaProcessor::default()),
            filters,
            broadcast,
            Box::new(display.clone()),
        );
        (orchestrator, observer, display)
    }

    fn quiet_filter(hour: u32, minute: u32) -> FilterChain {
        let clock = FixedClock(NaiveTime::from_hms_opt(hour, minute, 0).unwrap());
        FilterChain::new().with(Box::new(TimeOfDayFilter::new(
            QuietWindow::new((8, 0), (20, 0)),
            Box::new(clock),
        )))
    }

    #[test]
    fn test_non_matching_notification_is_ignored() {
        let (mut orchestrator, observer, display) = pipeline(FilterChain::new());
        let mut n = notification("120 mg/dl", T0);
        n.flags = 0;

        assert_eq!(orchestrator.handle(&n), Outcome::Ignored);
        assert!(observer.is_empty());
        assert!(display.events().is_empty());
    }

    #[test]
    fn test_extraction_failure_is_silent() {
        let (mut orchestrator, observer, display) = pipeline(FilterChain::new());
        assert_eq!(
            orchestrator.handle(&notification("abc", T0)),
            Outcome::ExtractionFailed
        );
        assert!(observer.is_empty());
        assert!(display.events().is_empty());
    }

    #[test]
    fn test_every_reading_is_broadcast() {
        let (mut orchestrator, observer, display) = pipeline(FilterChain::new());

        let first = orchestrator.handle(&notification("100 u", T0));
        assert!(matches!(first, Outcome::Displayed { ref message, .. } if message == "100 u"));

        let second = orchestrator.handle(&notification("101 u", T0 + MINUTE));
        assert_eq!(second, Outcome::NoAlert(Reading::new(101.0, "u", T0 + MINUTE)));

        assert_eq!(observer.len(), 2);
        assert_eq!(display.shown_texts(), vec!["100 u"]);
    }

    #[test]
    fn test_suppressed_alert_clears_previous_one() {
        let (mut orchestrator, _observer, display) = pipeline(FilterChain::new());
        orchestrator.handle(&notification("100 u", T0));
        assert!(display.current().is_some());

        orchestrator.replace_filters(quiet_filter(21, 0));
        let outcome = orchestrator.handle(&notification("150 u", T0 + 5 * MINUTE));
        assert!(matches!(outcome, Outcome::Suppressed { filter: "time-of-day", .. }));
        assert!(display.current().is_none());

        // The suppressed reading still became the baseline
        assert_eq!(
            orchestrator.processor().last_emitted(),
            Some(&Reading::new(150.0, "u", T0 + 5 * MINUTE))
        );
    }

    #[test]
    fn test_alert_inside_window_is_displayed() {
        let (mut orchestrator, _observer, display) = pipeline(quiet_filter(12, 0));
        orchestrator.handle(&notification("5.5 mmol/l", T0));

        let current = display.current().unwrap();
        assert_eq!(current.text, "5.50 mmol/l");
        assert_eq!(current.channel_id, "values");
        assert_eq!(current.notification_id, 10);
    }

    #[test]
    fn test_replay_runs_in_order() {
        let (mut orchestrator, observer, display) = pipeline(FilterChain::new());
        let batch = vec![
            notification("100 u", T0),
            notification("101 u", T0 + MINUTE),
            notification("115 u", T0 + 5 * MINUTE),
        ];

        let outcomes = orchestrator.replay(&batch);
        assert_eq!(outcomes.len(), 3);
        assert_eq!(observer.len(), 3);
        assert_eq!(display.shown_texts(), vec!["100 u", "115 u\n+15/5m"]);
    }
}
