//! Relative-delta throttling.

use std::time::Duration;

use super::message::{change_message, single_message};
use super::Processor;
use crate::reading::Reading;

/// Slack applied to the relative thresholds.
const THRESHOLD_EPSILON: f64 = 1e-9;

/// Thresholds for the relative-delta processor.
#[derive(Debug, Clone, PartialEq)]
pub struct Thresholds {
    /// Relative decrease that triggers an alert (0.1 = 10%).
    pub min_delta: f64,
    /// Relative increase that triggers an alert (0.1 = 10%).
    pub max_delta: f64,
    /// An alert is forced once this much time has passed since the last one.
    pub max_time_diff: Duration,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_delta: 0.1,
            max_delta: 0.1,
            max_time_diff: Duration::from_secs(119 * 60),
        }
    }
}

/// Skips readings while they stay within a relative band around the last
/// alerted value, and forces an alert after `max_time_diff` regardless.
///
/// The previously alerted value must be non-zero; CGM readings always are.
#[derive(Debug, Clone, Default)]
pub struct RelativeDeltaProcessor {
    thresholds: Thresholds,
    last_emitted: Option<Reading>,
}

impl RelativeDeltaProcessor {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            last_emitted: None,
        }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    fn is_due(&self, previous: &Reading, reading: &Reading) -> bool {
        let elapsed = reading.timestamp_millis() - previous.timestamp_millis();
        let limit = i64::try_from(self.thresholds.max_time_diff.as_millis()).unwrap_or(i64::MAX);
        if elapsed >= limit {
            return true;
        }

        // One-decimal readings rarely divide exactly; a step of exactly the
        // threshold must still count.
        let reldiff = (reading.value() - previous.value()) / previous.value();
        reldiff <= -self.thresholds.min_delta + THRESHOLD_EPSILON
            || reldiff >= self.thresholds.max_delta - THRESHOLD_EPSILON
    }
}

impl Processor for RelativeDeltaProcessor {
    fn process(&mut self, reading: &Reading) -> Option<String> {
        let message = match &self.last_emitted {
            None => single_message(reading),
            Some(previous) if self.is_due(previous, reading) => change_message(previous, reading),
            Some(_) => return None,
        };

        self.last_emitted = Some(reading.clone());
        Some(message)
    }

    fn last_emitted(&self) -> Option<&Reading> {
        self.last_emitted.as_ref()
    }
}
