use serde::{Deserialize, Serialize};

use crate::models::{Comment, CommentId, Post, PostId};
use crate::packet::Packet;

// -- Envelope --

/// Outcome flag carried by every board endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Success,
    Failure,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Status {
    pub fn is_success(self) -> bool {
        self == Status::Success
    }
}

/// Error body shape. Only `message` is read.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// Generic acknowledgement for create/update/delete calls.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub post_id: Option<PostId>,
}

// -- Posts --

#[derive(Debug, Clone, Deserialize)]
pub struct PostListResponse {
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub posts: Option<Vec<Post>>,
    #[serde(default)]
    pub total_posts: Option<u32>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostResponse {
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub post: Option<Post>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdatePostRequest {
    pub post_id: PostId,
    pub title: String,
    pub content: String,
}

// -- Comments --

#[derive(Debug, Clone, Deserialize)]
pub struct CommentListResponse {
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateCommentRequest {
    pub post_id: PostId,
    pub comment_body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateCommentRequest {
    pub comment_id: CommentId,
    pub comment_body: String,
}

// -- Likes --

#[derive(Debug, Clone, Serialize)]
pub struct ToggleLikeRequest {
    pub post_id: PostId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToggleLikeResponse {
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub liked: Option<bool>,
    /// Older backends report `LIKE`/`UNLIKE` instead of a boolean.
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ToggleLikeResponse {
    pub fn is_liked(&self) -> bool {
        self.liked
            .unwrap_or_else(|| self.action.as_deref() == Some("LIKE"))
    }
}

// -- Chat --

#[derive(Debug, Clone, Deserialize)]
pub struct ChatHistoryResponse {
    #[serde(default)]
    pub history: Vec<Packet>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendChatRequest<'a> {
    pub packet: &'a Packet,
    pub ask_ai: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendChatResponse {
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub packet: Option<Packet>,
    #[serde(default)]
    pub ai_packet: Option<Packet>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_status_does_not_fail_decoding() {
        let resp: StatusResponse =
            serde_json::from_value(json!({ "status": "PENDING" })).unwrap();
        assert_eq!(resp.status, Status::Unknown);
        assert!(!resp.status.is_success());
    }

    #[test]
    fn like_response_reads_action_when_flag_missing() {
        let resp: ToggleLikeResponse =
            serde_json::from_value(json!({ "status": "SUCCESS", "action": "LIKE" })).unwrap();
        assert!(resp.is_liked());

        let resp: ToggleLikeResponse =
            serde_json::from_value(json!({ "status": "SUCCESS", "liked": false, "action": "LIKE" }))
                .unwrap();
        assert!(!resp.is_liked());
    }

    #[test]
    fn post_list_without_posts_field() {
        let resp: PostListResponse =
            serde_json::from_value(json!({ "status": "FAILURE", "message": "DB 연결 실패" }))
                .unwrap();
        assert!(resp.posts.is_none());
    }
}
