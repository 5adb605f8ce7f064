//! Extractor for the Dexcom G6 glance notification.
//!
//! The G6 app keeps an ongoing notification whose view shows the current
//! value and unit as separate text views. The reading is only available
//! through the rendered view, so this relies on the app's current layout.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use super::{ContentDecoder, Extractor, TextActionDecoder};
use crate::error::ExtractError;
use crate::notification::RawNotification;
use crate::reading::Reading;

/// Packages whose notifications are considered by default.
pub const DEXCOM_PACKAGES: &[&str] = &["com.dexcom.g6.region1.mmol"];

fn reading_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([0-9.]+) ([A-Za-z/]+)$").expect("Invalid regex"))
}

/// Matches ongoing notifications from an allow-listed package and decodes
/// `"<number> <unit>"` from the text they render.
#[derive(Debug)]
pub struct DexcomExtractor {
    packages: Vec<String>,
    decoder: Box<dyn ContentDecoder>,
}

impl Default for DexcomExtractor {
    fn default() -> Self {
        Self::new(DEXCOM_PACKAGES.iter().map(|p| p.to_string()).collect())
    }
}

impl DexcomExtractor {
    /// Create an extractor for the given packages using the schema v1 decoder.
    pub fn new(packages: Vec<String>) -> Self {
        Self::with_decoder(packages, Box::new(TextActionDecoder))
    }

    /// Create an extractor with a custom content decoder.
    pub fn with_decoder(packages: Vec<String>, decoder: Box<dyn ContentDecoder>) -> Self {
        Self { packages, decoder }
    }

    pub fn packages(&self) -> &[String] {
        &self.packages
    }

    /// Concatenate decoded fragments with single spaces.
    fn rendered_text(&self, notification: &RawNotification) -> Result<String, ExtractError> {
        let view = notification
            .preferred_view()
            .ok_or(ExtractError::MissingContentView)?;

        let mut text = String::new();
        for fragment in self.decoder.text_fragments(view)? {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(&fragment);
        }

        Ok(text.trim().to_string())
    }
}

impl Extractor for DexcomExtractor {
    fn matches(&self, notification: &RawNotification) -> bool {
        notification.is_ongoing() && self.packages.iter().any(|p| *p == notification.package)
    }

    fn extract(&self, notification: &RawNotification) -> Result<Reading, ExtractError> {
        let text = self.rendered_text(notification)?;
        debug!("Decoded notification text {:?}", text);

        let captures = reading_pattern()
            .captures(&text)
            .ok_or_else(|| ExtractError::PatternMismatch(text.clone()))?;

        let number = &captures[1];
        let value: f64 = number
            .parse()
            .map_err(|_| ExtractError::InvalidNumber(number.to_string()))?;

        Ok(Reading::new(value, &captures[2], notification.post_time))
    }
}
