//! Suppression of alerts that are otherwise due.

mod time_of_day;

pub use time_of_day::{Clock, FixedClock, QuietWindow, SystemClock, TimeOfDayFilter};

use std::fmt::Debug;

use crate::reading::Reading;

/// A predicate that can veto an alert.
pub trait Filter: Send + Debug {
    /// Returns true if the alert for `reading` must not be displayed.
    fn filter(&self, reading: &Reading, message: &str) -> bool;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Ordered list of filters, evaluated as a short-circuit OR.
#[derive(Debug, Default)]
pub struct FilterChain {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter; filters run in insertion order.
    pub fn with(mut self, filter: Box<dyn Filter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Returns the name of the first filter that suppresses the alert.
    pub fn suppressed_by(&self, reading: &Reading, message: &str) -> Option<&'static str> {
        self.filters
            .iter()
            .find(|f| f.filter(reading, message))
            .map(|f| f.name())
    }
}
