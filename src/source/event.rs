//! Events delivered by the host.

use serde::{Deserialize, Serialize};

use crate::notification::RawNotification;

/// Something the host tells the listener.
///
/// Serialized as one JSON object per line, tagged by `event`:
///
/// ```json
/// {"event":"posted","notification":{"package":"...","post_time":1700000000000}}
/// {"event":"removed","key":"com.dexcom.g6.region1.mmol|1"}
/// {"event":"read_now"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    /// A notification was posted or updated.
    Posted { notification: RawNotification },
    /// A notification was dismissed.
    Removed { key: String },
    /// The user asked for the current value: replay all active notifications.
    ReadNow,
}
