//! Live Update Client.
//!
//! Applies incoming post updates to a container element: replace the
//! existing node for that post in place, or prepend a new one. One frame is
//! handled at a time, in delivery order; a bad frame is logged and dropped
//! without affecting the frames after it.

use std::sync::{Arc, Mutex};

use crate::dom::{Element, FragmentError, Node, parse_fragment};
use crate::transport::{ReconnectPolicy, ReconnectingSocket, SocketEvents, SocketHandle};

use super::config::LiveblogConfig;
use super::update::{ServerMessage, Update};

/// Attribute tagging each rendered post with its identifier.
pub const POST_ID_ATTRIBUTE: &str = "data-post-id";

/// How an update landed in the container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    /// An existing post node was replaced in place.
    Replaced,
    /// A new post node was prepended to the container.
    Inserted,
}

/// Why an update could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyError {
    /// The update's content is not a usable drop-in node.
    #[error("unusable content fragment: {0}")]
    BadFragment(#[from] FragmentError),
}

/// Maintains the live feed for one post's update stream.
///
/// Owns the container element the rendered posts live in. Implements
/// [`SocketEvents`], so an `Arc<LiveUpdateClient>` can be registered
/// directly against the reconnecting transport, or driven by hand in tests.
pub struct LiveUpdateClient {
    config: LiveblogConfig,
    container: Mutex<Element>,
}

impl LiveUpdateClient {
    /// Create a client patching the given container element.
    pub fn new(config: LiveblogConfig, container: Element) -> Self {
        Self {
            config,
            container: Mutex::new(container),
        }
    }

    pub fn config(&self) -> &LiveblogConfig {
        &self.config
    }

    /// Open the connection and register this client for its events.
    /// The transport owns reconnection; this is called once per page view.
    /// Callers keep their own `Arc` clone for reading snapshots.
    pub fn connect(self: Arc<Self>, policy: ReconnectPolicy) -> Result<SocketHandle, url::ParseError> {
        let url = self.config.connection_url()?;
        Ok(ReconnectingSocket::connect(url, self, policy))
    }

    /// Apply one update to the container.
    ///
    /// The content must parse to exactly one root element. If a descendant
    /// of the container already carries the update's id, the first such
    /// node is replaced in its sibling position; otherwise the new node
    /// becomes the container's first child (most-recent-first ordering).
    pub fn apply(&self, update: &Update) -> Result<Applied, ApplyError> {
        let replacement = parse_fragment(&update.content)?;
        let id = update.id.to_string();

        let mut container = self.container.lock().unwrap();
        if container.find_by_attribute(POST_ID_ATTRIBUTE, &id).is_some() {
            container.replace_by_attribute(POST_ID_ATTRIBUTE, &id, replacement);
            Ok(Applied::Replaced)
        } else {
            container.prepend_child(Node::Element(replacement));
            Ok(Applied::Inserted)
        }
    }

    /// Handle one inbound text frame. Never fails: malformed frames and
    /// unusable updates are logged and dropped so the next frame is
    /// unaffected.
    pub fn handle_frame(&self, text: &str) {
        match ServerMessage::parse(text) {
            Ok(ServerMessage::Update(update)) => match self.apply(&update) {
                Ok(Applied::Replaced) => {
                    log::info!("[Liveblog] Replaced post {}", update.id);
                }
                Ok(Applied::Inserted) => {
                    log::info!("[Liveblog] Inserted post {}", update.id);
                }
                Err(e) => {
                    log::error!("[Liveblog] Skipping update for post {}: {}", update.id, e);
                }
            },
            Ok(ServerMessage::Error { error }) => {
                log::error!("[Liveblog] Server rejected subscription: {}", error);
            }
            Ok(ServerMessage::Accept { accept: true }) => {
                log::debug!("[Liveblog] Subscription accepted");
            }
            Ok(ServerMessage::Accept { accept: false }) => {
                log::warn!("[Liveblog] Subscription not accepted");
            }
            Err(e) => {
                log::warn!("[Liveblog] Dropping malformed frame: {}", e);
            }
        }
    }

    /// Render the current container to HTML.
    pub fn snapshot(&self) -> String {
        self.container.lock().unwrap().to_html()
    }

    /// Number of post nodes directly inside the container.
    pub fn post_count(&self) -> usize {
        self.container
            .lock()
            .unwrap()
            .children
            .iter()
            .filter(|c| c.as_element().is_some())
            .count()
    }
}

impl SocketEvents for LiveUpdateClient {
    fn on_open(&self) {
        log::info!("[Liveblog] Connected to notification socket");
    }

    fn on_message(&self, text: &str) {
        log::debug!("[Liveblog] Got message {}", text);
        self.handle_frame(text);
    }

    fn on_close(&self, code: u16, reason: &str) {
        log::info!(
            "[Liveblog] Disconnected from notification socket ({} {})",
            code,
            reason
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::update::PostId;

    fn client_with(children_html: &[&str]) -> LiveUpdateClient {
        let mut container = Element::new("div");
        container.set_attribute("id", "liveblog-posts");
        for html in children_html {
            container
                .children
                .push(Node::Element(parse_fragment(html).unwrap()));
        }
        LiveUpdateClient::new(LiveblogConfig::new("sample_app", "en", "post"), container)
    }

    fn update(id: i64, content: &str) -> Update {
        Update {
            id: PostId::Number(id),
            content: content.to_string(),
            creation_date: None,
            changed_date: None,
        }
    }

    fn child_ids(client: &LiveUpdateClient) -> Vec<String> {
        let container = client.container.lock().unwrap();
        container
            .children
            .iter()
            .filter_map(|c| c.as_element())
            .filter_map(|el| el.attribute(POST_ID_ATTRIBUTE))
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_new_post_is_prepended() {
        let client = client_with(&["<div data-post-id='1'>first</div>"]);
        let applied = client
            .apply(&update(2, "<div data-post-id='2'>second</div>"))
            .unwrap();
        assert_eq!(applied, Applied::Inserted);
        assert_eq!(child_ids(&client), vec!["2", "1"]);
    }

    #[test]
    fn test_existing_post_is_replaced_in_place() {
        let client = client_with(&[
            "<div data-post-id='1'>a</div>",
            "<div data-post-id='2'>b</div>",
            "<div data-post-id='3'>c</div>",
        ]);
        let applied = client
            .apply(&update(2, "<div data-post-id='2'>updated</div>"))
            .unwrap();
        assert_eq!(applied, Applied::Replaced);
        assert_eq!(child_ids(&client), vec!["1", "2", "3"]);
        assert!(client.snapshot().contains("updated"));
        assert!(!client.snapshot().contains(">b<"));
    }

    #[test]
    fn test_replay_is_idempotent() {
        let client = client_with(&[]);
        let msg = update(5, "<div data-post-id='5'>x</div>");
        assert_eq!(client.apply(&msg).unwrap(), Applied::Inserted);
        assert_eq!(client.apply(&msg).unwrap(), Applied::Replaced);
        assert_eq!(child_ids(&client), vec!["5"]);
    }

    #[test]
    fn test_most_recent_first_ordering() {
        let client = client_with(&[]);
        client
            .apply(&update(1, "<div data-post-id='1'>m1</div>"))
            .unwrap();
        client
            .apply(&update(2, "<div data-post-id='2'>m2</div>"))
            .unwrap();
        assert_eq!(child_ids(&client), vec!["2", "1"]);
    }

    #[test]
    fn test_string_and_numeric_ids_address_the_same_node() {
        let client = client_with(&["<div data-post-id='5'>old</div>"]);
        let msg = Update {
            id: PostId::Text("5".into()),
            content: "<div data-post-id='5'>new</div>".into(),
            creation_date: None,
            changed_date: None,
        };
        assert_eq!(client.apply(&msg).unwrap(), Applied::Replaced);
    }

    #[test]
    fn test_multi_root_content_is_rejected_without_corrupting_the_tree() {
        let client = client_with(&["<div data-post-id='1'>a</div>"]);
        let before = client.snapshot();
        let err = client
            .apply(&update(1, "<div>a</div><div>b</div>"))
            .unwrap_err();
        assert!(matches!(err, ApplyError::BadFragment(_)));
        assert_eq!(client.snapshot(), before);
    }

    #[test]
    fn test_malformed_frame_does_not_break_the_next_one() {
        let client = client_with(&[]);
        client.handle_frame("{ not json");
        client.handle_frame(r#"{"id": 1}"#);
        client.handle_frame(r#"{"id": 1, "content": "<div data-post-id='1'>ok</div>"}"#);
        assert_eq!(child_ids(&client), vec!["1"]);
    }

    #[test]
    fn test_notices_leave_the_tree_alone() {
        let client = client_with(&["<div data-post-id='1'>a</div>"]);
        let before = client.snapshot();
        client.handle_frame(r#"{"accept": true}"#);
        client.handle_frame(r#"{"accept": false}"#);
        client.handle_frame(r#"{"error": "no_post"}"#);
        assert_eq!(client.snapshot(), before);
    }

    // The end-to-end scenario from the original feed: replace then insert.
    #[test]
    fn test_replace_then_insert_scenario() {
        let client = client_with(&["<div data-post-id='5'>old</div>"]);

        client.handle_frame(r#"{"id":5,"content":"<div data-post-id='5'>new</div>"}"#);
        assert_eq!(client.post_count(), 1);
        assert_eq!(
            client.snapshot(),
            "<div id=\"liveblog-posts\"><div data-post-id=\"5\">new</div></div>"
        );

        client.handle_frame(r#"{"id":7,"content":"<div data-post-id='7'>hi</div>"}"#);
        assert_eq!(client.post_count(), 2);
        assert_eq!(child_ids(&client), vec!["7", "5"]);
    }

    #[test]
    fn test_nested_match_is_replaced() {
        let client = client_with(&["<section><div data-post-id='9'>deep</div></section>"]);
        let applied = client
            .apply(&update(9, "<div data-post-id='9'>patched</div>"))
            .unwrap();
        assert_eq!(applied, Applied::Replaced);
        // Still nested inside the section, same position
        assert!(
            client
                .snapshot()
                .contains("<section><div data-post-id=\"9\">patched</div></section>")
        );
    }
}
