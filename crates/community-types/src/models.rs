use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub type PostId = i64;
pub type CommentId = i64;

/// Account identifier. The backend emits numeric ids, but string ids are
/// accepted so ownership checks work against either.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(i64),
            Str(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Num(n) => UserId(n.to_string()),
            Raw::Str(s) => UserId(s),
        })
    }
}

/// Counters may arrive as `null` on freshly created rows.
fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or(0))
}

/// A board post as listed by `/api/posts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(rename = "post_id")]
    pub id: PostId,
    pub title: String,
    #[serde(rename = "content", alias = "body", default)]
    pub body: String,
    #[serde(alias = "user_name", default)]
    pub author: Option<String>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "count")]
    pub like_count: u32,
    #[serde(default, deserialize_with = "count")]
    pub comment_count: u32,
    #[serde(default)]
    pub view_count: Option<u32>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub private: bool,
    #[serde(rename = "user_liked", default)]
    pub viewer_has_liked: bool,
    #[serde(rename = "is_author", default)]
    pub viewer_is_author: bool,
}

impl Post {
    pub fn author_or_anonymous(&self) -> &str {
        match self.author.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => "익명",
        }
    }
}

/// A comment as listed by `/api/comments/{post_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "comment_id")]
    pub id: CommentId,
    #[serde(default)]
    pub post_id: Option<PostId>,
    #[serde(rename = "user_id")]
    pub author_id: UserId,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(rename = "comment_body")]
    pub body: String,
    #[serde(with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Nickname, falling back to the author id when the profile has none.
    pub fn display_name(&self) -> &str {
        match self.nickname.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.author_id.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn post_accepts_board_listing_shape() {
        let post: Post = serde_json::from_value(json!({
            "post_id": 7,
            "title": "hello",
            "body": "first",
            "user_name": "민수",
            "user_id": 3,
            "created_at": "2024-05-01 12:00:00",
            "like_count": 2,
            "comment_count": null,
            "view_count": 10,
            "pinned": true,
            "private": false,
            "user_liked": true,
            "is_author": false
        }))
        .unwrap();

        assert_eq!(post.id, 7);
        assert_eq!(post.body, "first");
        assert_eq!(post.author_or_anonymous(), "민수");
        assert_eq!(post.user_id, Some(UserId::new("3")));
        assert_eq!(post.comment_count, 0);
        assert!(post.viewer_has_liked);
        assert!(!post.viewer_is_author);
    }

    #[test]
    fn post_defaults_viewer_flags_and_author() {
        let post: Post = serde_json::from_value(json!({
            "post_id": 1,
            "title": "t",
            "content": "c",
            "created_at": "2024-05-01T12:00:00Z"
        }))
        .unwrap();

        assert_eq!(post.author_or_anonymous(), "익명");
        assert!(!post.viewer_has_liked);
        assert_eq!(post.like_count, 0);
    }

    #[test]
    fn comment_display_name_falls_back_to_author_id() {
        let comment: Comment = serde_json::from_value(json!({
            "comment_id": 4,
            "comment_body": "hi",
            "created_at": "2024-05-01 12:00:00",
            "user_id": 42,
            "nickname": null
        }))
        .unwrap();

        assert_eq!(comment.display_name(), "42");
    }
}
