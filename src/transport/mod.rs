//! Reconnecting Transport
//!
//! The external collaborator the update client registers against: a
//! WebSocket connection that reconnects on its own (with exponential
//! backoff) and surfaces open/message/close events through a handler trait.
//! No application logic lives here.

mod events;
mod reconnect;
mod socket;

pub use events::SocketEvents;
pub use reconnect::ReconnectPolicy;
pub use socket::{
    ReconnectingSocket, SocketHandle, WS_CLOSED, WS_CLOSING, WS_CONNECTING, WS_OPEN,
};
