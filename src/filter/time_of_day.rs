//! Quiet-window filter based on the wall-clock time of day.

use chrono::{Local, NaiveTime};
use tracing::warn;

use super::Filter;
use crate::prefs::{
    IntPreferences, KEY_FILTER_END_HOUR, KEY_FILTER_END_MINUTE, KEY_FILTER_START_HOUR,
    KEY_FILTER_START_MINUTE,
};
use crate::reading::Reading;

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> NaiveTime;
}

/// Local time of the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// A clock stuck at one time of day.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveTime {
        self.0
    }
}

/// The configured alert window, as four stored integers. All zero means no
/// window is configured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuietWindow {
    pub start_hour: u32,
    pub start_minute: u32,
    pub end_hour: u32,
    pub end_minute: u32,
}

impl QuietWindow {
    pub fn new(start: (u32, u32), end: (u32, u32)) -> Self {
        Self {
            start_hour: start.0,
            start_minute: start.1,
            end_hour: end.0,
            end_minute: end.1,
        }
    }

    /// Read the window from stored preferences; missing keys read as zero.
    ///
    /// Values that do not fit a `u32` (e.g. negative) read as `u32::MAX`, which
    /// makes the window invalid rather than silently moving it.
    pub fn from_preferences(prefs: &dyn IntPreferences) -> Self {
        let get = |key: &str| u32::try_from(prefs.get_int(key, 0)).unwrap_or(u32::MAX);
        Self {
            start_hour: get(KEY_FILTER_START_HOUR),
            start_minute: get(KEY_FILTER_START_MINUTE),
            end_hour: get(KEY_FILTER_END_HOUR),
            end_minute: get(KEY_FILTER_END_MINUTE),
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.start_hour == 0 && self.start_minute == 0 && self.end_hour == 0 && self.end_minute == 0
    }

    /// Start and end as times of day, or `None` if disabled or out of range.
    pub fn bounds(&self) -> Option<(NaiveTime, NaiveTime)> {
        if self.is_disabled() {
            return None;
        }
        let start = NaiveTime::from_hms_opt(self.start_hour, self.start_minute, 0)?;
        let end = NaiveTime::from_hms_opt(self.end_hour, self.end_minute, 0)?;
        Some((start, end))
    }
}

impl std::fmt::Display for QuietWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02}:{:02} - {:02}:{:02}",
            self.start_hour, self.start_minute, self.end_hour, self.end_minute
        )
    }
}

/// Lets alerts through only between `start` and `end` (both inclusive).
///
/// When `start` is later than `end` the window wraps past midnight, so
/// 22:00 - 07:00 allows alerts at night and suppresses them during the day.
#[derive(Debug)]
pub struct TimeOfDayFilter {
    bounds: Option<(NaiveTime, NaiveTime)>,
    clock: Box<dyn Clock>,
}

impl TimeOfDayFilter {
    pub fn new(window: QuietWindow, clock: Box<dyn Clock>) -> Self {
        let bounds = window.bounds();
        if bounds.is_none() && !window.is_disabled() {
            warn!("Ignoring invalid alert window {}", window);
        }
        Self { bounds, clock }
    }

    /// Build the filter from stored preferences using the system clock.
    pub fn from_preferences(prefs: &dyn IntPreferences) -> Self {
        Self::new(QuietWindow::from_preferences(prefs), Box::new(SystemClock))
    }

    pub fn is_enabled(&self) -> bool {
        self.bounds.is_some()
    }

    fn suppresses_at(&self, now: NaiveTime) -> bool {
        let Some((start, end)) = self.bounds else {
            return false;
        };

        if start <= end {
            now < start || now > end
        } else {
            now > end && now < start
        }
    }
}

impl Filter for TimeOfDayFilter {
    fn filter(&self, _reading: &Reading, _message: &str) -> bool {
        self.suppresses_at(self.clock.now())
    }

    fn name(&self) -> &'static str {
        "time-of-day"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn at(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn filter_at(window: QuietWindow, hour: u32, minute: u32) -> bool {
        let filter = TimeOfDayFilter::new(window, Box::new(FixedClock(at(hour, minute))));
        filter.filter(&Reading::new(100.0, "mg/dl", 0), "100 mg/dl")
    }

    #[test]
    fn test_disabled_window_never_suppresses() {
        let window = QuietWindow::default();
        assert!(window.is_disabled());
        assert!(!filter_at(window, 0, 0));
        assert!(!filter_at(window, 3, 30));
        assert!(!filter_at(window, 23, 59));
    }

    #[test]
    fn test_day_window() {
        let window = QuietWindow::new((8, 0), (20, 0));
        assert!(filter_at(window, 7, 59));
        assert!(!filter_at(window, 8, 0));
        assert!(!filter_at(window, 12, 0));
        assert!(!filter_at(window, 20, 0));
        assert!(filter_at(window, 20, 1));
    }

    #[test]
    fn test_seconds_past_end_suppress() {
        let window = QuietWindow::new((8, 0), (20, 0));
        let clock = FixedClock(NaiveTime::from_hms_opt(20, 0, 30).unwrap());
        let filter = TimeOfDayFilter::new(window, Box::new(clock));
        assert!(filter.filter(&Reading::new(1.0, "u", 0), "1 u"));
    }

    #[test]
    fn test_window_spanning_midnight() {
        let window = QuietWindow::new((22, 0), (7, 0));
        assert!(!filter_at(window, 23, 0));
        assert!(!filter_at(window, 0, 0));
        assert!(!filter_at(window, 7, 0));
        assert!(filter_at(window, 7, 1));
        assert!(filter_at(window, 12, 0));
        assert!(!filter_at(window, 22, 0));
    }

    #[test]
    fn test_invalid_window_is_ignored() {
        let window = QuietWindow::new((25, 0), (7, 0));
        let filter = TimeOfDayFilter::new(window, Box::new(FixedClock(at(12, 0))));
        assert!(!filter.is_enabled());
        assert!(!filter_at(window, 12, 0));
    }

    #[test]
    fn test_window_from_preferences() {
        let mut prefs: HashMap<String, i64> = HashMap::new();
        prefs.insert(KEY_FILTER_START_HOUR.to_string(), 8);
        prefs.insert(KEY_FILTER_END_HOUR.to_string(), 20);
        prefs.insert(KEY_FILTER_END_MINUTE.to_string(), 30);

        let window = QuietWindow::from_preferences(&prefs);
        assert_eq!(window, QuietWindow::new((8, 0), (20, 30)));
        assert_eq!(window.to_string(), "08:00 - 20:30");
    }

    #[test]
    fn test_negative_stored_value_disables_window() {
        let mut prefs: HashMap<String, i64> = HashMap::new();
        prefs.insert(KEY_FILTER_START_HOUR.to_string(), -1);
        prefs.insert(KEY_FILTER_END_HOUR.to_string(), 20);

        let window = QuietWindow::from_preferences(&prefs);
        assert!(!window.is_disabled());
        assert!(window.bounds().is_none());

        let filter = TimeOfDayFilter::from_preferences(&prefs);
        assert!(!filter.is_enabled());
        assert!(!filter_at(window, 21, 0));
    }
}
