//! Socket event interface.
//!
//! One method per connection event, mirroring the browser callbacks the
//! transport stands in for. Registering a handler is the only coupling
//! between the transport and the update client, which keeps the client
//! testable without a live socket.

/// Handler for connection lifecycle and message events.
///
/// Invoked from the transport's own thread, one event at a time, in
/// delivery order. Implementations must therefore be `Send + Sync`; they
/// never run concurrently with themselves.
pub trait SocketEvents: Send + Sync {
    /// The connection (or a reconnection) completed its handshake.
    fn on_open(&self) {}

    /// A text frame arrived.
    fn on_message(&self, text: &str);

    /// The connection closed. The transport schedules its own reconnect;
    /// this is observability only.
    fn on_close(&self, code: u16, reason: &str) {
        let _ = (code, reason);
    }
}
