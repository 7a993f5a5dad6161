use community_types::models::PostId;

use crate::theme::Theme;

/// Addressable node in the rendered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Posts,
    RefreshButton,
    CommentCount(PostId),
    CommentSection(PostId),
    CommentList(PostId),
    CommentInput(PostId),
    ChatLog,
    ChatInput,
    ChatSubmit,
    TypingIndicator,
    PostModal,
    PostModalHeading,
    PostTitle,
    PostContent,
}

impl Slot {
    /// Element id of the node this slot addresses.
    pub fn element_id(&self) -> String {
        match self {
            Slot::Posts => "posts-container".into(),
            Slot::RefreshButton => "refresh-posts".into(),
            Slot::CommentCount(id) => format!("comment-count-{id}"),
            Slot::CommentSection(id) => format!("comments-{id}"),
            Slot::CommentList(id) => format!("comments-list-{id}"),
            Slot::CommentInput(id) => format!("comment-input-{id}"),
            Slot::ChatLog => "chat-log".into(),
            Slot::ChatInput => "chat-input".into(),
            Slot::ChatSubmit => "chat-submit".into(),
            Slot::TypingIndicator => "typing-indicator".into(),
            Slot::PostModal => "post-modal".into(),
            Slot::PostModalHeading => "post-modal-heading".into(),
            Slot::PostTitle => "post-title".into(),
            Slot::PostContent => "post-content".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Transient toast shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Error, message: message.into() }
    }

    /// Error toast for a failed request, prefixed the way every handler reports one.
    pub fn failure(message: &str) -> Self {
        Self::error(format!("❌ {message}"))
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

/// Side effect produced by a state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Replace the node's children with trusted markup.
    SetHtml { slot: Slot, html: String },
    /// Replace the node's children with plain text.
    SetText { slot: Slot, text: String },
    SetVisible { slot: Slot, visible: bool },
    /// Form control value.
    SetValue { slot: Slot, value: String },
    SetDisabled { slot: Slot, disabled: bool },
    Notify(Notification),
    SetTheme(Theme),
}
