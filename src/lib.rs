//! # cgmband
//!
//! Re-surfaces readings from a continuous glucose monitor's companion app as
//! rate-limited alerts.
//!
//! The CGM app keeps an ongoing notification that shows the current value,
//! but it updates every few minutes and offers no API for the reading. This
//! crate decodes the reading from the notification's rendered view and only
//! raises a new alert when the value moved enough, or when enough time has
//! passed, and never outside the configured alert window.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                              Session                               │
//! │  ┌─────────┐   ┌───────────┐   ┌───────────┐   ┌────────┐  ┌─────┐ │
//! │  │ source  │──▶│  extract  │──▶│  process  │──▶│ filter │─▶│ out │ │
//! │  │ (input) │   │ (decode)  │   │(throttle) │   │(quiet) │  │     │ │
//! │  └─────────┘   └─────┬─────┘   └───────────┘   └────────┘  └─────┘ │
//! │                      │ broadcast every reading                     │
//! │                      └──────────────────────────▶ observers        │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: Host events ([`NotificationSource`] trait) from files,
//!   byte streams or channels, plus tracking of active notifications
//! - **[`extract`]**: The [`Extractor`] and [`ContentDecoder`] capabilities
//!   and the Dexcom G6 implementation
//! - **[`process`]**: The [`Processor`] throttle and alert message format
//! - **[`filter`]**: The [`Filter`] chain and the time-of-day filter
//! - **[`output`]**: Reading observers and alert displays
//! - **[`orchestrator`]**: The pipeline wiring one event end to end
//! - **[`app`]**: The [`Session`] owning a source and a pipeline
//!
//! ## Usage
//!
//! ```
//! use cgmband::{
//!     Broadcast, ChannelSource, DexcomExtractor, FilterChain, HostEvent, Orchestrator,
//!     RecordingDisplay, RelativeDeltaProcessor, Session,
//! };
//!
//! let display = RecordingDisplay::new();
//! let orchestrator = Orchestrator::new(
//!     Box::new(DexcomExtractor::default()),
//!     Box::new(RelativeDeltaProcessor::default()),
//!     FilterChain::new(),
//!     Broadcast::new(),
//!     Box::new(display.clone()),
//! );
//!
//! let (tx, source) = ChannelSource::create("example");
//! let mut session = Session::new(Box::new(source), orchestrator);
//! tx.try_send(HostEvent::ReadNow).unwrap();
//! session.pump();
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod filter;
pub mod notification;
pub mod orchestrator;
pub mod output;
pub mod prefs;
pub mod process;
pub mod reading;
pub mod source;

// Re-export main types for convenience
pub use app::{Session, SessionStats};
pub use config::Settings;
pub use error::{ExtractError, PrefsError};
pub use extract::{ContentDecoder, DexcomExtractor, Extractor, TextActionDecoder};
pub use filter::{Filter, FilterChain, QuietWindow, TimeOfDayFilter};
pub use notification::{Instruction, Parameter, RawNotification, RenderedView};
pub use orchestrator::{AlertStyle, Orchestrator, Outcome};
pub use output::{
    AlertDisplay, Broadcast, DisplayRequest, ReadingObserver, RecordingDisplay,
    RecordingObserver, StatusLineObserver, StdoutDisplay, WatchObserver,
};
pub use prefs::{IntPreferences, PreferenceStore};
pub use process::{Processor, RelativeDeltaProcessor, Thresholds};
pub use reading::{Reading, ReadingBroadcast};
pub use source::{
    ActiveNotifications, ChannelSource, FileSource, HostEvent, NotificationSource, StreamSource,
};
