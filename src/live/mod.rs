//! Live Update Client
//!
//! One client per page view: it opens a single connection to the live-blog
//! feed for a post and keeps the container element current as entries are
//! published, replacing existing post nodes in place and prepending new
//! ones.

mod client;
mod config;
mod update;

pub use client::{Applied, ApplyError, LiveUpdateClient, POST_ID_ATTRIBUTE};
pub use config::LiveblogConfig;
pub use update::{PostId, ServerMessage, Update};
