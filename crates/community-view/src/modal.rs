use community_types::api::{CreatePostRequest, UpdatePostRequest};
use community_types::models::{Post, PostId};

use crate::ValidationFailure;
use crate::effect::{Effect, Slot};

pub const NEW_HEADING: &str = "✍️ 새 게시글 작성";
pub const EDIT_HEADING: &str = "✏️ 게시글 수정";

/// Create/edit dialog for a post.
#[derive(Debug, Default)]
pub struct PostModal {
    visible: bool,
    editing: Option<PostId>,
    title: String,
    content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PostSubmission {
    Create(CreatePostRequest),
    Update(UpdatePostRequest),
}

impl PostModal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn editing(&self) -> Option<PostId> {
        self.editing
    }

    pub fn open_new(&mut self) -> Vec<Effect> {
        self.editing = None;
        self.title.clear();
        self.content.clear();
        self.show(NEW_HEADING)
    }

    pub fn open_edit(&mut self, post: &Post) -> Vec<Effect> {
        self.editing = Some(post.id);
        self.title = post.title.clone();
        self.content = post.body.clone();
        self.show(EDIT_HEADING)
    }

    pub fn close(&mut self) -> Vec<Effect> {
        self.visible = false;
        vec![Effect::SetVisible { slot: Slot::PostModal, visible: false }]
    }

    pub fn set_fields(&mut self, title: impl Into<String>, content: impl Into<String>) {
        self.title = title.into();
        self.content = content.into();
    }

    /// Request for the current form contents.
    pub fn submission(&self) -> Result<PostSubmission, ValidationFailure> {
        let title = self.title.trim();
        let content = self.content.trim();
        if title.is_empty() {
            return Err(ValidationFailure("제목을 입력해주세요."));
        }
        if content.is_empty() {
            return Err(ValidationFailure("내용을 입력해주세요."));
        }

        Ok(match self.editing {
            Some(post_id) => PostSubmission::Update(UpdatePostRequest {
                post_id,
                title: title.to_string(),
                content: content.to_string(),
            }),
            None => PostSubmission::Create(CreatePostRequest {
                title: title.to_string(),
                content: content.to_string(),
            }),
        })
    }

    fn show(&mut self, heading: &str) -> Vec<Effect> {
        self.visible = true;
        vec![
            Effect::SetText { slot: Slot::PostModalHeading, text: heading.into() },
            Effect::SetValue { slot: Slot::PostTitle, value: self.title.clone() },
            Effect::SetValue { slot: Slot::PostContent, value: self.content.clone() },
            Effect::SetVisible { slot: Slot::PostModal, visible: true },
        ]
    }
}
