//! Wire protocol types.
//!
//! The backend broadcasts one JSON object per published entry. Alongside
//! updates it can send two notices: `{"error": "no_post"}` when the
//! subscription targets an unknown post, and `{"accept": true}` when the
//! subscription is accepted. Notices never touch the tree.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Post identifier as found on the wire: a number or a string.
///
/// Matching against the tree always goes through the canonical string form
/// (`Display`), so `5` and `"5"` address the same node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostId {
    Number(i64),
    Text(String),
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostId::Number(n) => write!(f, "{}", n),
            PostId::Text(s) => f.write_str(s),
        }
    }
}

/// A published live-blog entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    pub id: PostId,
    /// Full rendered markup of the post, rooted in a single element.
    pub content: String,
    /// Preformatted creation timestamp, informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
    /// Preformatted last-change timestamp, informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changed_date: Option<String>,
}

/// Any JSON frame the backend sends.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ServerMessage {
    Update(Update),
    Error { error: String },
    Accept { accept: bool },
}

impl ServerMessage {
    /// Parse a text frame.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_update_with_numeric_id() {
        let msg = ServerMessage::parse(r#"{"id": 5, "content": "<div>x</div>"}"#).unwrap();
        let ServerMessage::Update(update) = msg else {
            panic!("expected update");
        };
        assert_eq!(update.id, PostId::Number(5));
        assert_eq!(update.id.to_string(), "5");
        assert_eq!(update.content, "<div>x</div>");
        assert_eq!(update.creation_date, None);
    }

    #[test]
    fn test_parse_update_with_string_id_and_dates() {
        let msg = ServerMessage::parse(
            r#"{"id": "7", "content": "<p>hi</p>",
                "creation_date": "Mon 01 Jan 2024 10:00",
                "changed_date": "Mon 01 Jan 2024 10:05"}"#,
        )
        .unwrap();
        let ServerMessage::Update(update) = msg else {
            panic!("expected update");
        };
        assert_eq!(update.id.to_string(), "7");
        assert_eq!(update.creation_date.as_deref(), Some("Mon 01 Jan 2024 10:00"));
    }

    #[test]
    fn test_parse_notices() {
        assert_eq!(
            ServerMessage::parse(r#"{"error": "no_post"}"#).unwrap(),
            ServerMessage::Error {
                error: "no_post".into()
            }
        );
        assert_eq!(
            ServerMessage::parse(r#"{"accept": true}"#).unwrap(),
            ServerMessage::Accept { accept: true }
        );
    }

    #[test]
    fn test_malformed_frames_are_errors() {
        assert!(ServerMessage::parse("not json").is_err());
        assert!(ServerMessage::parse(r#"{"id": 5}"#).is_err());
        assert!(ServerMessage::parse(r#"{"content": "<div></div>"}"#).is_err());
    }
}
