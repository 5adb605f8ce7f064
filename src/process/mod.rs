//! Deciding which readings are worth an alert.
//!
//! A [`Processor`] sees every decoded reading and returns the alert text when
//! a new alert is due. Processors are stateful: the decision depends on what
//! was last alerted, not on what was last received.

mod message;
mod relative;

pub use message::{change_message, format_value, single_message};
pub use relative::{RelativeDeltaProcessor, Thresholds};

use std::fmt::Debug;

use crate::reading::Reading;

/// Stateful alert throttle.
pub trait Processor: Send + Debug {
    /// Returns the alert message if `reading` warrants one.
    fn process(&mut self, reading: &Reading) -> Option<String>;

    /// The reading the last alert was generated for, if any.
    fn last_emitted(&self) -> Option<&Reading>;
}
