//! Matching and decoding CGM readings out of raw notifications.
//!
//! Extraction is split in two capabilities so the vendor-coupled part can be
//! swapped without touching the pipeline:
//!
//! - an [`Extractor`] decides which notifications belong to the CGM app and
//!   turns the decoded text into a [`Reading`]
//! - a [`ContentDecoder`] walks a rendered view's instruction list and
//!   returns the text fragments it sets, for one instruction schema version

mod decode;
mod dexcom;

pub use decode::TextActionDecoder;
pub use dexcom::{DexcomExtractor, DEXCOM_PACKAGES};

use std::fmt::Debug;

use crate::error::ExtractError;
use crate::notification::{RawNotification, RenderedView};
use crate::reading::Reading;

/// Recognizes and decodes notifications from one CGM vendor.
pub trait Extractor: Send + Debug {
    /// Returns true if the notification is the vendor's persistent glance
    /// notification (and not, e.g., a transient alert from the same app).
    fn matches(&self, notification: &RawNotification) -> bool;

    /// Decode a reading from a matching notification.
    ///
    /// Failure is a normal outcome; callers log the error and move on.
    fn extract(&self, notification: &RawNotification) -> Result<Reading, ExtractError>;
}

/// Walks a rendered view and collects the text it displays.
pub trait ContentDecoder: Send + Sync + Debug {
    /// The instruction schema version this decoder understands.
    fn schema(&self) -> u32;

    /// Returns the payload of every text-set instruction, in instruction order.
    fn text_fragments(&self, view: &RenderedView) -> Result<Vec<String>, ExtractError>;
}
