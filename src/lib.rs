//! # liveblog-client
//!
//! A live-blog update client: subscribes to a post's update feed over a
//! reconnecting WebSocket and patches a typed document tree as entries are
//! published. New posts land most-recent-first in a container element;
//! already-rendered posts are replaced in place.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use liveblog_client::{Element, LiveUpdateClient, LiveblogConfig, ReconnectPolicy};
//!
//! # fn main() -> Result<(), url::ParseError> {
//! let config = LiveblogConfig::new("sample_app", "en", "first-post")
//!     .with_host("blog.example.com")
//!     .with_secure(true);
//!
//! let mut container = Element::new("div");
//! container.set_attribute("id", "liveblog-posts");
//!
//! let client = Arc::new(LiveUpdateClient::new(config, container));
//! let handle = client.clone().connect(ReconnectPolicy::default())?;
//!
//! // ... the transport now drives the client; render snapshots at will
//! println!("{}", client.snapshot());
//! # handle.close();
//! # Ok(())
//! # }
//! ```

pub mod dom;
pub mod live;
pub mod transport;

pub use dom::{Element, FragmentError, Node, parse_fragment};
pub use live::{
    Applied, ApplyError, LiveUpdateClient, LiveblogConfig, POST_ID_ATTRIBUTE, PostId,
    ServerMessage, Update,
};
pub use transport::{ReconnectPolicy, ReconnectingSocket, SocketEvents, SocketHandle};
