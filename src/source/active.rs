//! Bookkeeping of the host's active notifications.

use std::collections::HashMap;

use super::HostEvent;
use crate::notification::RawNotification;

/// The set of notifications currently shown by the host, keyed by
/// [`RawNotification::key`]. A re-post replaces the previous entry but keeps
/// its original position.
#[derive(Debug, Clone, Default)]
pub struct ActiveNotifications {
    order: Vec<String>,
    by_key: HashMap<String, RawNotification>,
}

impl ActiveNotifications {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the set from an event.
    pub fn apply(&mut self, event: &HostEvent) {
        match event {
            HostEvent::Posted { notification } => self.insert(notification.clone()),
            HostEvent::Removed { key } => {
                self.remove(key);
            }
            HostEvent::ReadNow => {}
        }
    }

    pub fn insert(&mut self, notification: RawNotification) {
        let key = notification.key();
        if self.by_key.insert(key.clone(), notification).is_none() {
            self.order.push(key);
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<RawNotification> {
        let removed = self.by_key.remove(key)?;
        self.order.retain(|k| k != key);
        Some(removed)
    }

    pub fn get(&self, key: &str) -> Option<&RawNotification> {
        self.by_key.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Active notifications in first-posted order.
    pub fn to_vec(&self) -> Vec<RawNotification> {
        self.order
            .iter()
            .filter_map(|key| self.by_key.get(key).cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification(id: i32, post_time: i64) -> RawNotification {
        RawNotification {
            package: "pkg".to_string(),
            id,
            tag: None,
            flags: 0,
            post_time,
            content_view: None,
            big_content_view: None,
        }
    }

    #[test]
    fn test_repost_replaces_in_place() {
        let mut active = ActiveNotifications::new();
        active.apply(&HostEvent::Posted {
            notification: notification(1, 10),
        });
        active.apply(&HostEvent::Posted {
            notification: notification(2, 20),
        });
        active.apply(&HostEvent::Posted {
            notification: notification(1, 30),
        });

        let all = active.to_vec();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, 1);
        assert_eq!(all[0].post_time, 30);
        assert_eq!(all[1].id, 2);
    }

    #[test]
    fn test_remove() {
        let mut active = ActiveNotifications::new();
        active.insert(notification(1, 10));
        active.apply(&HostEvent::Removed {
            key: "pkg|1".to_string(),
        });
        assert!(active.is_empty());
        assert!(active.remove("pkg|1").is_none());
    }
}
