//! Raw notification types as delivered by the host.
//!
//! These mirror what a notification listener sees for a posted status bar
//! notification: the posting package, its flag bits, the post time and the
//! rendered content views. A rendered view is an ordered list of opaque
//! draw/update instructions; only the [`ContentDecoder`] looks inside them.
//!
//! [`ContentDecoder`]: crate::extract::ContentDecoder

use serde::{Deserialize, Serialize};

/// Flag bit marking a notification as ongoing (cannot be swiped away).
pub const FLAG_ONGOING_EVENT: u32 = 0x0000_0002;
/// Flag bit marking a notification that survives "clear all".
pub const FLAG_NO_CLEAR: u32 = 0x0000_0020;

/// Instruction schema understood by this crate's decoders.
pub const INSTRUCTION_SCHEMA_V1: u32 = 1;

fn default_schema() -> u32 {
    INSTRUCTION_SCHEMA_V1
}

/// A notification as posted by another application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNotification {
    /// Package name of the posting application.
    pub package: String,

    /// Notification id within the package.
    #[serde(default)]
    pub id: i32,

    /// Optional tag, part of the notification's identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    /// Status flag bits (see the `FLAG_*` constants).
    #[serde(default)]
    pub flags: u32,

    /// Time the notification was posted, epoch milliseconds.
    pub post_time: i64,

    /// Collapsed rendered content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_view: Option<RenderedView>,

    /// Expanded rendered content, preferred when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub big_content_view: Option<RenderedView>,
}

impl RawNotification {
    /// Host-unique identity of this notification. A re-post with the same
    /// key replaces the previous one.
    pub fn key(&self) -> String {
        match &self.tag {
            Some(tag) => format!("{}|{}|{}", self.package, self.id, tag),
            None => format!("{}|{}", self.package, self.id),
        }
    }

    pub fn is_ongoing(&self) -> bool {
        self.flags & FLAG_ONGOING_EVENT != 0
    }

    /// The rendered view to decode: expanded form first, collapsed as fallback.
    pub fn preferred_view(&self) -> Option<&RenderedView> {
        self.big_content_view.as_ref().or(self.content_view.as_ref())
    }
}

/// A rendered content description: the instructions the host replays to
/// build the notification's view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedView {
    /// Version of the instruction layout.
    #[serde(default = "default_schema")]
    pub schema: u32,

    #[serde(default)]
    pub actions: Vec<Instruction>,
}

/// One draw/update instruction against a view in the layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// Target view id.
    pub view_id: i32,

    /// Name of the operation (`setText`, `setImageResource`, ...). Absent for
    /// instruction kinds that carry no method.
    #[serde(default)]
    pub method: Option<String>,

    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

/// A typed instruction parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Parameter {
    Bool(bool),
    Int(i64),
    Float(f64),
    CharSequence(String),
    #[serde(other)]
    Unknown,
}
