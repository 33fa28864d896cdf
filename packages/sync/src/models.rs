//! Normalized posts and comments.
//!
//! The API is loose about field names (`image_url` or `image`, `content`
//! or `description`, numeric or string ids). Reconciliation happens once,
//! here, when a response is decoded.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use scribe_parser::{preview_text, PLACEHOLDER_BODY};
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::{SyncError, SyncResult};

/// Accepts ids sent either as JSON numbers or strings
#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Number(serde_json::Number),
    Text(String),
}

impl IdRepr {
    fn into_string(self) -> String {
        match self {
            IdRepr::Number(number) => number.to_string(),
            IdRepr::Text(text) => text,
        }
    }
}

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                IdRepr::deserialize(deserializer).map(|repr| Self(repr.into_string()))
            }
        }
    };
}

id_type!(
    /// Server-assigned post id
    PostId
);
id_type!(UserId);
id_type!(CommentId);

/// A post as the rest of the client sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPost")]
pub struct Post {
    pub id: PostId,
    pub title: String,
    /// Serialized markup, never empty (the placeholder stands in)
    pub body: String,
    pub cover_image: Option<String>,
    pub author_id: Option<UserId>,
    pub author_name: Option<String>,
    /// Plain-text preview from description, then excerpt, then content
    pub summary: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPost {
    id: Option<PostId>,
    title: Option<String>,
    body: Option<String>,
    content: Option<String>,
    description: Option<String>,
    excerpt: Option<String>,
    cover_image: Option<String>,
    image_url: Option<String>,
    image: Option<String>,
    author_id: Option<UserId>,
    user_id: Option<UserId>,
    #[serde(rename = "userId")]
    user_id_camel: Option<UserId>,
    author_name: Option<String>,
    author: Option<String>,
    fname: Option<String>,
    lname: Option<String>,
    username: Option<String>,
    created_at: Option<String>,
    #[serde(rename = "createdAt")]
    created_at_camel: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

impl From<RawPost> for Post {
    fn from(raw: RawPost) -> Self {
        let summary_source = [&raw.description, &raw.excerpt, &raw.content]
            .into_iter()
            .flatten()
            .find(|text| !text.trim().is_empty())
            .cloned();

        let body = non_empty(raw.body)
            .or_else(|| non_empty(raw.content))
            .or_else(|| non_empty(raw.description))
            .unwrap_or_else(|| PLACEHOLDER_BODY.to_string());

        let full_name = match (non_empty(raw.fname), non_empty(raw.lname)) {
            (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
            (Some(name), None) | (None, Some(name)) => Some(name),
            (None, None) => None,
        };

        Self {
            id: raw.id.unwrap_or_else(|| PostId::new("")),
            title: raw.title.unwrap_or_default(),
            body,
            cover_image: non_empty(raw.cover_image)
                .or_else(|| non_empty(raw.image_url))
                .or_else(|| non_empty(raw.image)),
            author_id: raw.author_id.or(raw.user_id).or(raw.user_id_camel),
            author_name: non_empty(raw.author_name)
                .or(full_name)
                .or_else(|| non_empty(raw.author))
                .or_else(|| non_empty(raw.username)),
            summary: preview_text(summary_source.as_deref()),
            created_at: parse_timestamp(raw.created_at.or(raw.created_at_camel)),
        }
    }
}

/// A comment on a post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawComment")]
pub struct Comment {
    pub id: CommentId,
    pub post_id: Option<PostId>,
    pub author_id: Option<UserId>,
    pub author_name: Option<String>,
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawComment {
    id: Option<CommentId>,
    text: Option<String>,
    comment: Option<String>,
    post_id: Option<PostId>,
    #[serde(rename = "postId")]
    post_id_camel: Option<PostId>,
    author_id: Option<UserId>,
    user_id: Option<UserId>,
    #[serde(rename = "userId")]
    user_id_camel: Option<UserId>,
    author_name: Option<String>,
    username: Option<String>,
    created_at: Option<String>,
    #[serde(rename = "createdAt")]
    created_at_camel: Option<String>,
}

impl From<RawComment> for Comment {
    fn from(raw: RawComment) -> Self {
        Self {
            id: raw.id.unwrap_or_else(|| CommentId::new("")),
            post_id: raw.post_id.or(raw.post_id_camel),
            author_id: raw.author_id.or(raw.user_id).or(raw.user_id_camel),
            author_name: non_empty(raw.author_name).or_else(|| non_empty(raw.username)),
            text: raw.text.or(raw.comment).unwrap_or_default(),
            created_at: parse_timestamp(raw.created_at.or(raw.created_at_camel)),
        }
    }
}

/// RFC 3339, or a bare `YYYY-MM-DD HH:MM:SS` taken as UTC
fn parse_timestamp(value: Option<String>) -> Option<DateTime<Utc>> {
    let value = value?;

    if let Ok(parsed) = DateTime::parse_from_rfc3339(&value) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(&value, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }

    warn!(value = %value, "Unrecognized timestamp");
    None
}

/// Keys under which the API wraps a payload
const ENVELOPE_KEYS: &[&str] = &["data", "post", "posts", "comment", "comments"];

/// Strip a `{ "data": ... }`-style wrapper when the object is not itself a record
pub(crate) fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) if !map.contains_key("id") => {
            for key in ENVELOPE_KEYS {
                let wrapped = map
                    .get(*key)
                    .is_some_and(|inner| inner.is_object() || inner.is_array());
                if wrapped {
                    if let Some(inner) = map.remove(*key) {
                        return inner;
                    }
                }
            }
            Value::Object(map)
        }
        other => other,
    }
}

/// Decode a single record, which must carry an id
pub(crate) fn decode_record<T: DeserializeOwned>(value: Value) -> SyncResult<T> {
    let value = unwrap_envelope(value);
    if value.get("id").map_or(true, Value::is_null) {
        return Err(SyncError::Decode(format!("Response has no id: {}", value)));
    }
    Ok(serde_json::from_value(value)?)
}

/// Decode a list, skipping entries that do not decode
pub(crate) fn decode_list<T: DeserializeOwned>(value: Value) -> SyncResult<Vec<T>> {
    match unwrap_envelope(value) {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| match decode_record(item) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!(error = %err, "Skipping malformed list entry");
                    None
                }
            })
            .collect()),
        Value::Null => Ok(Vec::new()),
        other => Err(SyncError::Decode(format!("Expected a list, got: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ids_accept_numbers_and_strings() {
        let numeric: PostId = serde_json::from_value(json!(42)).unwrap();
        let text: PostId = serde_json::from_value(json!("42")).unwrap();
        assert_eq!(numeric, text);
        assert_eq!(serde_json::to_value(&numeric).unwrap(), json!("42"));
    }

    #[test]
    fn test_post_field_reconciliation() {
        let post: Post = serde_json::from_value(json!({
            "id": 3,
            "title": "Trip",
            "description": "<p>We went <strong>north</strong>.</p>",
            "image_url": "https://cdn.example.com/a.jpg",
            "user_id": 7,
            "fname": "Ada",
            "lname": "Lovelace",
            "created_at": "2024-05-01T10:00:00.000Z"
        }))
        .unwrap();

        assert_eq!(post.id, PostId::new("3"));
        assert_eq!(post.body, "<p>We went <strong>north</strong>.</p>");
        assert_eq!(post.cover_image.as_deref(), Some("https://cdn.example.com/a.jpg"));
        assert_eq!(post.author_id, Some(UserId::new("7")));
        assert_eq!(post.author_name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(post.summary, "We went north.");
        assert!(post.created_at.is_some());
    }

    #[test]
    fn test_post_aliases() {
        let post: Post = serde_json::from_value(json!({
            "id": "9",
            "title": "Alias",
            "content": "<p>Body</p>",
            "excerpt": "Short",
            "image": "b.png",
            "userId": "u-2",
            "username": "ada",
            "createdAt": "2024-05-01 10:00:00"
        }))
        .unwrap();

        assert_eq!(post.body, "<p>Body</p>");
        assert_eq!(post.summary, "Short");
        assert_eq!(post.cover_image.as_deref(), Some("b.png"));
        assert_eq!(post.author_id, Some(UserId::new("u-2")));
        assert_eq!(post.author_name.as_deref(), Some("ada"));
        assert!(post.created_at.is_some());
    }

    #[test]
    fn test_missing_body_is_placeholder() {
        let post: Post = serde_json::from_value(json!({"id": 1, "title": "Empty"})).unwrap();
        assert_eq!(post.body, PLACEHOLDER_BODY);
        assert_eq!(post.summary, "");
    }

    #[test]
    fn test_normalized_post_round_trips_through_json() {
        let post: Post = serde_json::from_value(json!({
            "id": 5,
            "title": "T",
            "description": "<p>x</p>",
            "image_url": "c.png"
        }))
        .unwrap();

        let again: Post = serde_json::from_value(serde_json::to_value(&post).unwrap()).unwrap();
        assert_eq!(again.body, post.body);
        assert_eq!(again.cover_image, post.cover_image);
    }

    #[test]
    fn test_comment_fields() {
        let comment: Comment = serde_json::from_value(json!({
            "id": 11,
            "comment": "Nice post",
            "user_id": 7,
            "post_id": 3,
        }))
        .unwrap();

        assert_eq!(comment.text, "Nice post");
        assert_eq!(comment.author_id, Some(UserId::new("7")));
        assert_eq!(comment.post_id, Some(PostId::new("3")));
    }

    #[test]
    fn test_envelopes() {
        let posts: Vec<Post> = decode_list(json!({"data": [{"id": 1}, {"title": "no id"}]})).unwrap();
        assert_eq!(posts.len(), 1);

        let post: Post = decode_record(json!({"message": "Created", "post": {"id": 2}})).unwrap();
        assert_eq!(post.id, PostId::new("2"));

        assert!(decode_record::<Post>(json!({"message": "ok"})).is_err());
        assert!(decode_list::<Post>(Value::Null).unwrap().is_empty());
    }
}
