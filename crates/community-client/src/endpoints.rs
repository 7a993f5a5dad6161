//! Typed wrappers for every backend route the client consumes.

use reqwest::Method;
use tracing::debug;

use community_types::api::{
    ChatHistoryResponse, CommentListResponse, CreateCommentRequest, CreatePostRequest,
    PostListResponse, PostResponse, SendChatRequest, SendChatResponse,
    StatusResponse, ToggleLikeRequest, ToggleLikeResponse, UpdateCommentRequest,
    UpdatePostRequest,
};
use community_types::models::{CommentId, PostId};
use community_types::packet::Packet;

use crate::error::ClientError;
use crate::transport::ApiClient;

pub const CHAT_HISTORY: &str = "/api/chat/history";
pub const CHAT_SEND: &str = "/api/chat/send";
pub const POSTS: &str = "/api/posts";
pub const POST_CREATE: &str = "/api/posts/create";
pub const POST_UPDATE: &str = "/api/posts/update";
pub const COMMENT_CREATE: &str = "/api/comments/create";
pub const COMMENT_UPDATE: &str = "/api/comments/update";
pub const LIKE_TOGGLE: &str = "/api/likes/toggle";

pub fn post_path(post_id: PostId) -> String {
    format!("/api/posts/{post_id}")
}

pub fn post_delete_path(post_id: PostId) -> String {
    format!("/api/posts/delete/{post_id}")
}

pub fn comments_path(post_id: PostId) -> String {
    format!("/api/comments/{post_id}")
}

pub fn comment_delete_path(comment_id: CommentId) -> String {
    format!("/api/comments/delete/{comment_id}")
}

impl ApiClient {
    // -- Chat --

    pub async fn chat_history(&self) -> Result<Vec<Packet>, ClientError> {
        let resp: ChatHistoryResponse = self.send_json::<(), _>(Method::GET, CHAT_HISTORY, None).await?;
        debug!(count = resp.history.len(), "chat history fetched");
        Ok(resp.history)
    }

    pub async fn send_chat(&self, packet: &Packet, ask_ai: bool) -> Result<SendChatResponse, ClientError> {
        let req = SendChatRequest { packet, ask_ai };
        self.send_json(Method::POST, CHAT_SEND, Some(&req)).await
    }

    // -- Posts --

    pub async fn list_posts(&self) -> Result<PostListResponse, ClientError> {
        self.send_json::<(), _>(Method::GET, POSTS, None).await
    }

    pub async fn get_post(&self, post_id: PostId) -> Result<PostResponse, ClientError> {
        self.send_json::<(), _>(Method::GET, &post_path(post_id), None).await
    }

    pub async fn create_post(&self, req: &CreatePostRequest) -> Result<StatusResponse, ClientError> {
        self.send_json(Method::POST, POST_CREATE, Some(req)).await
    }

    pub async fn update_post(&self, req: &UpdatePostRequest) -> Result<StatusResponse, ClientError> {
        self.send_json(Method::PUT, POST_UPDATE, Some(req)).await
    }

    pub async fn delete_post(&self, post_id: PostId) -> Result<StatusResponse, ClientError> {
        self.send_json::<(), _>(Method::DELETE, &post_delete_path(post_id), None).await
    }

    // -- Comments --

    pub async fn list_comments(&self, post_id: PostId) -> Result<CommentListResponse, ClientError> {
        let mut resp: CommentListResponse =
            self.send_json::<(), _>(Method::GET, &comments_path(post_id), None).await?;
        for comment in &mut resp.comments {
            comment.post_id.get_or_insert(post_id);
        }
        Ok(resp)
    }

    pub async fn create_comment(&self, req: &CreateCommentRequest) -> Result<StatusResponse, ClientError> {
        self.send_json(Method::POST, COMMENT_CREATE, Some(req)).await
    }

    pub async fn update_comment(&self, req: &UpdateCommentRequest) -> Result<StatusResponse, ClientError> {
        self.send_json(Method::PUT, COMMENT_UPDATE, Some(req)).await
    }

    pub async fn delete_comment(&self, comment_id: CommentId) -> Result<StatusResponse, ClientError> {
        self.send_json::<(), _>(Method::DELETE, &comment_delete_path(comment_id), None).await
    }

    // -- Likes --

    pub async fn toggle_like(&self, post_id: PostId) -> Result<ToggleLikeResponse, ClientError> {
        self.send_json(Method::POST, LIKE_TOGGLE, Some(&ToggleLikeRequest { post_id })).await
    }
}
