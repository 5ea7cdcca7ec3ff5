//! Reconnecting WebSocket transport.
//!
//! Runs one connection on a dedicated thread with its own tokio runtime and
//! dispatches open/message/close events to a registered [`SocketEvents`]
//! handler. When the connection drops, a new one is attempted after an
//! exponential backoff; the consumer only ever sees the event stream.

use futures_util::StreamExt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tokio::sync::Notify;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use super::events::SocketEvents;
use super::reconnect::ReconnectPolicy;

/// WebSocket ready states (matching browser API)
pub const WS_CONNECTING: u32 = 0;
pub const WS_OPEN: u32 = 1;
pub const WS_CLOSING: u32 = 2;
pub const WS_CLOSED: u32 = 3;

/// A live reconnecting connection.
///
/// Dropping the handle does not end the connection; it lives until
/// [`SocketHandle::close`] or process exit, matching page-view semantics.
pub struct ReconnectingSocket;

/// Handle for observing and shutting down a connection.
#[derive(Clone)]
pub struct SocketHandle {
    ready_state: Arc<AtomicU32>,
    stopped: Arc<AtomicBool>,
    stop: Arc<Notify>,
}

impl SocketHandle {
    /// Current ready state (one of the `WS_*` constants).
    pub fn ready_state(&self) -> u32 {
        self.ready_state.load(Ordering::SeqCst)
    }

    /// Stop reconnecting and close the connection.
    pub fn close(&self) {
        log::info!("[LiveSocket] Closing");
        self.ready_state.store(WS_CLOSING, Ordering::SeqCst);
        self.stopped.store(true, Ordering::SeqCst);
        self.stop.notify_waiters();
    }
}

impl ReconnectingSocket {
    /// Connect to `url`, dispatching events to `events`, reconnecting per
    /// `policy` whenever the connection drops. Returns immediately.
    pub fn connect(url: Url, events: Arc<dyn SocketEvents>, policy: ReconnectPolicy) -> SocketHandle {
        let handle = SocketHandle {
            ready_state: Arc::new(AtomicU32::new(WS_CONNECTING)),
            stopped: Arc::new(AtomicBool::new(false)),
            stop: Arc::new(Notify::new()),
        };

        let ready_state = handle.ready_state.clone();
        let stopped = handle.stopped.clone();
        let stop = handle.stop.clone();

        // Dedicated thread with its own tokio runtime, so callers need no
        // runtime of their own
        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .worker_threads(2)
                .build();
            let rt = match rt {
                Ok(rt) => rt,
                Err(e) => {
                    log::error!("[LiveSocket] Failed to build runtime: {}", e);
                    ready_state.store(WS_CLOSED, Ordering::SeqCst);
                    return;
                }
            };

            rt.block_on(run_connection(url, events, policy, ready_state, stopped, stop));
        });

        handle
    }
}

async fn run_connection(
    url: Url,
    events: Arc<dyn SocketEvents>,
    policy: ReconnectPolicy,
    ready_state: Arc<AtomicU32>,
    stopped: Arc<AtomicBool>,
    stop: Arc<Notify>,
) {
    let mut attempt: u32 = 0;

    // One pinned future for the whole connection lifetime: registration
    // survives across select polls, so a notify between two awaits is not
    // lost. enable() registers before close() can race the first poll.
    let notified = stop.notified();
    tokio::pin!(notified);
    notified.as_mut().enable();

    loop {
        if stopped.load(Ordering::SeqCst) {
            break;
        }

        ready_state.store(WS_CONNECTING, Ordering::SeqCst);
        log::info!("[LiveSocket] Connecting to {}", url);

        let connected = tokio::select! {
            result = tokio_tungstenite::connect_async(url.as_str()) => result,
            _ = notified.as_mut() => break,
        };

        match connected {
            Ok((ws_stream, response)) => {
                log::info!(
                    "[LiveSocket] Connected successfully (status: {})",
                    response.status()
                );
                ready_state.store(WS_OPEN, Ordering::SeqCst);
                events.on_open();
                attempt = 0;

                let (_write, mut read) = ws_stream.split();
                let mut closed_by_peer = false;

                loop {
                    // The handler runs outside any select; a close() issued
                    // while it runs is picked up here
                    if stopped.load(Ordering::SeqCst) {
                        events.on_close(1000, "closed by client");
                        ready_state.store(WS_CLOSED, Ordering::SeqCst);
                        return;
                    }

                    let msg_result = tokio::select! {
                        msg = read.next() => msg,
                        _ = notified.as_mut() => {
                            events.on_close(1000, "closed by client");
                            ready_state.store(WS_CLOSED, Ordering::SeqCst);
                            return;
                        }
                    };

                    let Some(msg_result) = msg_result else {
                        break;
                    };

                    match msg_result {
                        Ok(Message::Text(text)) => {
                            log::debug!(
                                "[LiveSocket] Received: {}",
                                truncate_for_log(text.as_str(), 200)
                            );
                            events.on_message(text.as_str());
                        }
                        Ok(Message::Binary(data)) => {
                            log::debug!(
                                "[LiveSocket] Ignoring binary frame ({} bytes)",
                                data.len()
                            );
                        }
                        Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                            // Handled by tungstenite
                        }
                        Ok(Message::Close(frame)) => {
                            let (code, reason) = frame
                                .map(|f| (f.code.into(), f.reason.to_string()))
                                .unwrap_or((1000, String::new()));
                            log::info!("[LiveSocket] Received close: {} {}", code, reason);
                            events.on_close(code, &reason);
                            closed_by_peer = true;
                            break;
                        }
                        Ok(Message::Frame(_)) => {}
                        Err(e) => {
                            log::error!("[LiveSocket] Read error: {}", e);
                            events.on_close(1006, "connection error");
                            closed_by_peer = true;
                            break;
                        }
                    }
                }

                if !closed_by_peer {
                    log::info!("[LiveSocket] Connection ended");
                    events.on_close(1006, "connection lost");
                }
            }
            Err(e) => {
                log::error!("[LiveSocket] Connection failed: {}", e);
                events.on_close(1006, "connection failed");
            }
        }

        if stopped.load(Ordering::SeqCst) {
            break;
        }

        let delay = policy.delay_for(attempt);
        attempt = attempt.saturating_add(1);
        log::info!(
            "[LiveSocket] Reconnecting in {:.1}s (attempt {})",
            delay.as_secs_f64(),
            attempt
        );

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = notified.as_mut() => break,
        }
    }

    ready_state.store(WS_CLOSED, Ordering::SeqCst);
    log::info!("[LiveSocket] Stopped");
}

/// Truncate a frame for logging without splitting a multi-byte character.
fn truncate_for_log(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
