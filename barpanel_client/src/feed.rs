//! Background reader for the machine's push notification stream.
//!
//! Spawns a thread that owns the HTTP connection, parses the
//! `text/event-stream` body into typed [`MachineEvent`]s, and forwards them
//! over a bounded channel to the panel loop. The stream is fire-and-forget:
//! there is no acknowledgment back-channel, and reconnection after a drop is
//! this reader's responsibility, not the panel's.

use std::io::{BufRead, BufReader, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel as xch;
use serde::Deserialize;

use barpanel_core::MachineEvent;

/// Events the channel buffers before the producer blocks; the panel loop
/// drains far faster than the machine emits.
const FEED_BUFFER: usize = 64;

pub struct NotificationFeed {
    rx: xch::Receiver<MachineEvent>,
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl NotificationFeed {
    /// Connect to `base_url` + `path` and keep reading until dropped,
    /// pausing `reconnect` between attempts after the stream breaks.
    pub fn connect(base_url: &str, path: &str, reconnect: Duration) -> Self {
        let (tx, rx) = xch::bounded(FEED_BUFFER);
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_reader = shutdown.clone();
        let url = format!("{}{path}", base_url.trim_end_matches('/'));

        let handle = std::thread::spawn(move || {
            // No request timeout: an idle but healthy stream stays open
            // between events, kept alive by server keepalives.
            let client = match reqwest::blocking::Client::builder().timeout(None).build() {
                Ok(c) => c,
                Err(e) => {
                    tracing::error!(error = %e, "feed client build failed");
                    return;
                }
            };
            while !shutdown_reader.load(Ordering::Relaxed) {
                match client.get(&url).send().and_then(|r| r.error_for_status()) {
                    Ok(resp) => {
                        tracing::info!(url, "notification feed connected");
                        if !read_events(resp, &tx, &shutdown_reader) {
                            // Consumer gone; nothing left to deliver to.
                            return;
                        }
                        tracing::warn!(url, "notification feed dropped");
                    }
                    Err(e) => {
                        tracing::warn!(url, error = %e, "notification feed connect failed");
                    }
                }
                if shutdown_reader.load(Ordering::Relaxed) {
                    return;
                }
                std::thread::sleep(reconnect);
            }
        });

        Self {
            rx,
            shutdown,
            handle: Some(handle),
        }
    }

    /// Receiver the panel loop selects on.
    pub fn events(&self) -> xch::Receiver<MachineEvent> {
        self.rx.clone()
    }
}

impl Drop for NotificationFeed {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        // The reader may be parked inside a blocking read; detach it rather
        // than stalling shutdown waiting for the next keepalive.
        let _ = self.handle.take();
    }
}

/// Read one stream to exhaustion, forwarding parsed events. Returns false
/// when the consumer disconnected (send failed), true when the stream ended
/// and a reconnect should be attempted.
fn read_events<R: Read>(
    stream: R,
    tx: &xch::Sender<MachineEvent>,
    shutdown: &AtomicBool,
) -> bool {
    let reader = BufReader::new(stream);
    let mut event_name = String::new();
    let mut data = String::new();

    for line in reader.lines() {
        if shutdown.load(Ordering::Relaxed) {
            return true;
        }
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                tracing::debug!(error = %e, "feed read error");
                return true;
            }
        };
        if line.is_empty() {
            // Blank line terminates one event block.
            if !event_name.is_empty()
                && let Some(event) = parse_event(&event_name, &data)
                && tx.send(event).is_err()
            {
                return false;
            }
            event_name.clear();
            data.clear();
        } else if let Some(rest) = line.strip_prefix("event:") {
            event_name = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix("data:") {
            if !data.is_empty() {
                data.push('\n');
            }
            data.push_str(rest.trim_start());
        }
        // Comment lines (":keepalive") and unknown fields are skipped.
    }
    true
}

#[derive(Debug, Deserialize)]
struct StartWire {
    drink_name: String,
}

#[derive(Debug, Deserialize)]
struct ProgressWire {
    progress: f32,
}

#[derive(Debug, Deserialize)]
struct ErrorWire {
    error: String,
}

/// Decode one feed event. Unknown names and malformed payloads yield None;
/// the feed absorbs them instead of killing the stream.
fn parse_event(name: &str, data: &str) -> Option<MachineEvent> {
    let payload = if data.is_empty() { "{}" } else { data };
    match name {
        "mixing_start" => match serde_json::from_str::<StartWire>(payload) {
            Ok(w) => Some(MachineEvent::MixingStart {
                drink_name: w.drink_name,
            }),
            Err(e) => {
                tracing::warn!(error = %e, "malformed mixing_start payload");
                None
            }
        },
        "mixing_progress" => match serde_json::from_str::<ProgressWire>(payload) {
            Ok(w) => Some(MachineEvent::MixingProgress {
                progress: w.progress,
            }),
            Err(e) => {
                tracing::warn!(error = %e, "malformed mixing_progress payload");
                None
            }
        },
        "mixing_complete" => Some(MachineEvent::MixingComplete),
        "mixing_error" => match serde_json::from_str::<ErrorWire>(payload) {
            Ok(w) => Some(MachineEvent::MixingError { error: w.error }),
            Err(e) => {
                tracing::warn!(error = %e, "malformed mixing_error payload");
                None
            }
        },
        other => {
            tracing::trace!(event = other, "ignoring unknown feed event");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::atomic::AtomicBool;

    #[test]
    fn parses_known_events() {
        assert_eq!(
            parse_event("mixing_start", r#"{"drink_name": "Mojito"}"#),
            Some(MachineEvent::MixingStart {
                drink_name: "Mojito".to_string()
            })
        );
        assert_eq!(
            parse_event("mixing_progress", r#"{"progress": 0.5}"#),
            Some(MachineEvent::MixingProgress { progress: 0.5 })
        );
        assert_eq!(parse_event("mixing_complete", ""), Some(MachineEvent::MixingComplete));
        assert_eq!(
            parse_event("mixing_error", r#"{"error": "pump 3 jammed"}"#),
            Some(MachineEvent::MixingError {
                error: "pump 3 jammed".to_string()
            })
        );
    }

    #[test]
    fn malformed_and_unknown_events_are_absorbed() {
        assert_eq!(parse_event("mixing_start", "not json"), None);
        assert_eq!(parse_event("mixing_progress", "{}"), None);
        assert_eq!(parse_event("pump_status", "{}"), None);
    }

    #[test]
    fn stream_blocks_decode_in_order() {
        let stream = concat!(
            "event: mixing_start\n",
            "data: {\"drink_name\": \"Mojito\"}\n",
            "\n",
            ":keepalive\n",
            "\n",
            "event: mixing_progress\n",
            "data: {\"progress\": 0.5}\n",
            "\n",
            "event: mixing_complete\n",
            "data: {}\n",
            "\n",
        );
        let (tx, rx) = xch::unbounded();
        let shutdown = AtomicBool::new(false);
        assert!(read_events(Cursor::new(stream), &tx, &shutdown));
        drop(tx);

        let events: Vec<_> = rx.iter().collect();
        assert_eq!(
            events,
            vec![
                MachineEvent::MixingStart {
                    drink_name: "Mojito".to_string()
                },
                MachineEvent::MixingProgress { progress: 0.5 },
                MachineEvent::MixingComplete,
            ]
        );
    }

    #[test]
    fn reader_stops_when_consumer_disconnects() {
        let stream = concat!(
            "event: mixing_complete\n",
            "data: {}\n",
            "\n",
            "event: mixing_complete\n",
            "data: {}\n",
            "\n",
        );
        let (tx, rx) = xch::bounded(0);
        drop(rx);
        let shutdown = AtomicBool::new(false);
        assert!(!read_events(Cursor::new(stream), &tx, &shutdown));
    }
}
