//! Host abstraction for receiving notification events.
//!
//! A notification listener sees three things from its host: notifications
//! being posted, notifications being removed, and user commands. This module
//! models those as [`HostEvent`]s and provides several ways to receive them
//! (file polling, async byte streams, in-process channels).

mod active;
mod channel;
mod event;
mod file;
mod stream;

pub use active::ActiveNotifications;
pub use channel::ChannelSource;
pub use event::HostEvent;
pub use file::FileSource;
pub use stream::StreamSource;

use std::fmt::Debug;

use crate::notification::RawNotification;

/// Trait for receiving host events from various sources.
///
/// Every source also tracks which notifications are currently active on the
/// host, so a "read now" command can replay them.
///
/// # Example
///
/// ```
/// use cgmband::{FileSource, NotificationSource};
///
/// let mut source = FileSource::new("active.json");
/// while let Some(event) = source.poll() {
///     println!("{:?}", event);
/// }
/// ```
pub trait NotificationSource: Send + Debug {
    /// Poll for the next event.
    ///
    /// Returns `None` when nothing is pending. This method must not block.
    fn poll(&mut self) -> Option<HostEvent>;

    /// Notifications currently active on the host, in posting order.
    fn active_notifications(&self) -> Vec<RawNotification>;

    /// Returns a human-readable description of the source.
    fn description(&self) -> &str;

    /// Returns the error message if the last poll failed.
    fn error(&self) -> Option<String>;

    /// True once the source can never produce another event.
    fn is_closed(&self) -> bool {
        false
    }
}
