//! Stream-based notification source.
//!
//! Receives host events from an async byte stream: a TCP connection from a
//! platform bridge, or stdin when events are piped in.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::warn;

use super::{ActiveNotifications, HostEvent, NotificationSource};
use crate::notification::RawNotification;

/// A source that reads newline-delimited JSON [`HostEvent`]s from an async
/// reader on a background task.
///
/// Lines that fail to parse are skipped and recorded as the last error.
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use cgmband::StreamSource;
///
/// # tokio_test::block_on(async {
/// let data = b"{\"event\":\"read_now\"}\n";
/// let stream = Cursor::new(data.to_vec());
/// let source = StreamSource::spawn(stream, "example");
/// # });
/// ```
#[derive(Debug)]
pub struct StreamSource {
    receiver: mpsc::Receiver<HostEvent>,
    description: String,
    active: ActiveNotifications,
    last_error: Arc<Mutex<Option<String>>>,
    finished: Arc<AtomicBool>,
    closed: bool,
}

impl StreamSource {
    /// Spawn a background task that reads from the given async reader.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<R>(reader: R, description: &str) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(64);
        let last_error = Arc::new(Mutex::new(None));
        let error_handle = last_error.clone();
        let finished = Arc::new(AtomicBool::new(false));
        let finished_handle = finished.clone();

        tokio::spawn(async move {
            let mut reader = BufReader::new(reader);
            let mut line = String::new();

            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => break,
                    Ok(_) => {
                        let trimmed = line.trim();
                        if trimmed.is_empty() {
                            continue;
                        }
                        match serde_json::from_str::<HostEvent>(trimmed) {
                            Ok(event) => {
                                set_error(&error_handle, None);
                                if tx.send(event).await.is_err() {
                                    // Receiver dropped
                                    break;
                                }
                            }
                            Err(e) => {
                                warn!("Skipping malformed host event: {}", e);
                                set_error(&error_handle, Some(format!("Parse error: {}", e)));
                            }
                        }
                    }
                    Err(e) => {
                        set_error(&error_handle, Some(format!("Read error: {}", e)));
                        break;
                    }
                }
            }
            finished_handle.store(true, Ordering::SeqCst);
        });

        Self {
            receiver: rx,
            description: format!("stream: {}", description),
            active: ActiveNotifications::new(),
            last_error,
            finished,
            closed: false,
        }
    }

    /// True once the reader hit end of stream or a read error.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}

fn set_error(slot: &Mutex<Option<String>>, error: Option<String>) {
    if let Ok(mut guard) = slot.lock() {
        *guard = error;
    }
}

impl NotificationSource for StreamSource {
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
        self.last_error.lock().ok().and_then(|e| e.clone())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}
