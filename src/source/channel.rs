//! Channel-based notification source.
//!
//! Receives host events via a tokio mpsc channel. This is the source to use
//! when embedding the pipeline in a process that already receives
//! notifications, e.g. a platform bridge pushing events as they arrive.

use tokio::sync::mpsc;

use super::{ActiveNotifications, HostEvent, NotificationSource};
use crate::notification::RawNotification;

/// Default channel capacity used by [`ChannelSource::create`].
const CHANNEL_CAPACITY: usize = 64;

/// A source that receives host events through a channel.
///
/// # Example
///
/// ```
/// use cgmband::{ChannelSource, HostEvent};
///
/// let (tx, source) = ChannelSource::create("bridge");
/// tx.try_send(HostEvent::ReadNow).unwrap();
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: mpsc::Receiver<HostEvent>,
    description: String,
    active: ActiveNotifications,
    closed: bool,
}

impl ChannelSource {
    /// Create a source reading from `receiver`.
    pub fn new(receiver: mpsc::Receiver<HostEvent>, source_description: &str) -> Self {
        Self {
            receiver,
            description: format!("channel: {}", source_description),
            active: ActiveNotifications::new(),
            closed: false,
        }
    }

    /// Create a channel pair. Events sent on the returned sender show up in
    /// [`poll`](NotificationSource::poll).
    pub fn create(source_description: &str) -> (mpsc::Sender<HostEvent>, Self) {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        (tx, Self::new(rx, source_description))
    }
}

impl NotificationSource for ChannelSource {
    fn poll(&mut self) -> Option<HostEvent> {
        match self.receiver.try_recv() {
            Ok(event) => {
                self.active.apply(&event);
                Some(event)
            }
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                self.closed = true;
                None
            }
        }
    }

    fn active_notifications(&self) -> Vec<RawNotification> {
        self.active.to_vec()
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        // Delivery problems belong to whoever feeds the channel
        None
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification(id: i32) -> RawNotification {
        RawNotification {
            package: "pkg".to_string(),
            id,
            tag: None,
            flags: 2,
            post_time: 1,
            content_view: None,
            big_content_view: None,
        }
    }

    #[test]
    fn test_channel_source_poll() {
        let (tx, mut source) = ChannelSource::create("test");
        assert_eq!(source.description(), "channel: test");

        // Nothing sent yet
        assert!(source.poll().is_none());

        tx.try_send(HostEvent::Posted {
            notification: notification(1),
        })
        .unwrap();
        tx.try_send(HostEvent::ReadNow).unwrap();

        assert!(matches!(source.poll(), Some(HostEvent::Posted { .. })));
        assert_eq!(source.poll(), Some(HostEvent::ReadNow));
        assert!(source.poll().is_none());
        assert_eq!(source.active_notifications().len(), 1);
        assert!(!source.is_closed());
    }

    #[test]
    fn test_channel_source_closes_when_sender_dropped() {
        let (tx, mut source) = ChannelSource::create("test");
        tx.try_send(HostEvent::ReadNow).unwrap();
        drop(tx);

        // Buffered events are still delivered
        assert_eq!(source.poll(), Some(HostEvent::ReadNow));
        assert!(source.poll().is_none());
        assert!(source.is_closed());
    }
}
