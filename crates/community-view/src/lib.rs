//! View state and rendering for the board and the chat log.
//!
//! Nothing in this crate touches a document or the network. State
//! transitions return [`Effect`] lists which a document adapter applies.

pub mod cache;
pub mod chat;
pub mod composer;
pub mod effect;
pub mod modal;
pub mod render;
pub mod theme;
pub mod time;

pub use effect::{Effect, NoticeKind, Notification, Slot};

use community_types::models::UserId;

/// Who is looking at the page. Drives comment ownership checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: Option<UserId>,
}

impl Viewer {
    pub fn new(user_id: Option<UserId>) -> Self {
        Self { user_id }
    }

    pub fn owns(&self, author: &UserId) -> bool {
        self.user_id.as_ref() == Some(author)
    }
}

/// Local input rejected before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationFailure(pub &'static str);

impl ValidationFailure {
    pub fn notice(&self) -> Effect {
        Effect::Notify(Notification::error(self.0))
    }
}
