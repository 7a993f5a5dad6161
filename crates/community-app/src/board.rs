//! Community board controller.
//!
//! Owns the post cache, the post modal and the open comment sections, and
//! drives every board mutation: validate locally, call the backend, then
//! refresh the smallest affected part of the page.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use community_client::{ApiClient, ClientError};
use community_types::api::{CreateCommentRequest, UpdateCommentRequest};
use community_types::models::{Comment, CommentId, Post, PostId};
use community_view::cache::PostCache;
use community_view::modal::{PostModal, PostSubmission};
use community_view::render::{COMMENTS_FAILED, render_comments};
use community_view::{Effect, Notification, Slot, ValidationFailure, Viewer};

use crate::latest::LatestOnly;
use crate::lock;
use crate::page::PageHandle;
use crate::poller::{Poller, PollerHandle};

pub const LOAD_FAILED: &str = "게시글을 불러오는데 실패했습니다.";
pub const REFRESH_LABEL: &str = "🔄 게시글 새로고침";
pub const REFRESHING_LABEL: &str = "🔄 새로고침 중...";

/// Asks the user before a destructive action.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Default)]
struct CommentPanels {
    open: HashSet<PostId>,
    listed: HashMap<PostId, Vec<Comment>>,
}

struct BoardInner {
    client: ApiClient,
    page: PageHandle,
    viewer: Viewer,
    cache: Mutex<PostCache>,
    modal: Mutex<PostModal>,
    panels: Mutex<CommentPanels>,
    loads: LatestOnly,
    comment_loads: LatestOnly<PostId>,
}

#[derive(Clone)]
pub struct Board {
    inner: Arc<BoardInner>,
}

impl Board {
    pub fn new(client: ApiClient, page: PageHandle, viewer: Viewer) -> Self {
        Self {
            inner: Arc::new(BoardInner {
                client,
                page,
                viewer,
                cache: Mutex::new(PostCache::new()),
                modal: Mutex::new(PostModal::new()),
                panels: Mutex::new(CommentPanels::default()),
                loads: LatestOnly::new(),
                comment_loads: LatestOnly::new(),
            }),
        }
    }

    pub fn page(&self) -> &PageHandle {
        &self.inner.page
    }

    pub fn posts(&self) -> Vec<Post> {
        self.cache().posts().to_vec()
    }

    pub fn post(&self, post_id: PostId) -> Option<Post> {
        self.cache().get(post_id).cloned()
    }

    pub fn modal_visible(&self) -> bool {
        self.modal().is_visible()
    }

    pub fn comments_open(&self, post_id: PostId) -> bool {
        lock(&self.inner.panels).open.contains(&post_id)
    }

    /// Comments as last listed for an open section.
    pub fn comments(&self, post_id: PostId) -> Vec<Comment> {
        lock(&self.inner.panels).listed.get(&post_id).cloned().unwrap_or_default()
    }

    pub fn start_polling(&self, every: Duration) -> PollerHandle {
        let board = self.clone();
        Poller::start("posts", every, move || {
            let board = board.clone();
            async move { board.load().await }
        })
    }

    /// Fetch the post list and re-render the board.
    ///
    /// A failed fetch empties the cache and renders the empty state.
    pub async fn load(&self) {
        let ticket = self.inner.loads.issue(());
        let result = self.inner.client.list_posts().await;
        if !self.inner.loads.is_latest(&ticket) {
            debug!("dropping stale post list response");
            return;
        }

        let effects = match result {
            Ok(resp) => match resp.posts {
                Some(posts) if resp.status.is_success() => {
                    debug!(count = posts.len(), "post list loaded");
                    self.cache().replace(posts, Utc::now())
                }
                _ => {
                    debug!(status = ?resp.status, "post list not available");
                    self.cache().clear()
                }
            },
            Err(e) => {
                warn!("Failed to load posts: {e}");
                let mut effects = self.cache().clear();
                effects.push(Effect::Notify(Notification::error(LOAD_FAILED)));
                effects
            }
        };

        // The re-render collapses every comment section.
        *lock(&self.inner.panels) = CommentPanels::default();
        self.inner.page.apply(effects);
    }

    /// `load` with the refresh button disabled while it runs.
    pub async fn refresh(&self) {
        self.inner.page.apply([
            Effect::SetText { slot: Slot::RefreshButton, text: REFRESHING_LABEL.into() },
            Effect::SetDisabled { slot: Slot::RefreshButton, disabled: true },
        ]);
        self.load().await;
        self.inner.page.apply([
            Effect::SetText { slot: Slot::RefreshButton, text: REFRESH_LABEL.into() },
            Effect::SetDisabled { slot: Slot::RefreshButton, disabled: false },
        ]);
    }

    pub async fn toggle_like(&self, post_id: PostId) {
        match self.inner.client.toggle_like(post_id).await {
            Ok(resp) if resp.status.is_success() => {
                let notice = if resp.is_liked() { "❤️ 좋아요!" } else { "🤍 좋아요 취소" };
                self.notify(Notification::success(notice));
                self.apply_like_delta(post_id).await;
            }
            Ok(resp) => self.report_rejected(resp.message),
            Err(e) => self.report_failure(&e),
        }
    }

    /// Fetch one post for a detail view. The cache is left as it is.
    pub async fn view_post(&self, post_id: PostId) -> Option<Post> {
        match self.inner.client.get_post(post_id).await {
            Ok(resp) if resp.status.is_success() => match resp.post {
                Some(post) => Some(post),
                None => {
                    self.report_rejected(resp.message);
                    None
                }
            },
            Ok(resp) => {
                self.report_rejected(resp.message);
                None
            }
            Err(e) => {
                self.report_failure(&e);
                None
            }
        }
    }

    /// Like counts are not patched locally; the list is reloaded.
    pub async fn apply_like_delta(&self, post_id: PostId) {
        debug!(post_id, "like toggled, reloading posts");
        self.load().await;
    }

    pub fn apply_comment_count_delta(&self, post_id: PostId, delta: i32) {
        let effects = self.cache().apply_comment_count_delta(post_id, delta);
        self.inner.page.apply(effects);
    }

    /// Show or hide a post's comment section. Opening loads the comments.
    pub async fn toggle_comments(&self, post_id: PostId) {
        let opening = {
            let mut panels = lock(&self.inner.panels);
            if panels.open.remove(&post_id) {
                panels.listed.remove(&post_id);
                false
            } else {
                panels.open.insert(post_id);
                true
            }
        };

        self.inner.page.apply([Effect::SetVisible { slot: Slot::CommentSection(post_id), visible: opening }]);
        if opening {
            self.load_comments(post_id).await;
        }
    }

    pub async fn load_comments(&self, post_id: PostId) {
        let ticket = self.inner.comment_loads.issue(post_id);
        let result = self.inner.client.list_comments(post_id).await;
        if !self.inner.comment_loads.is_latest(&ticket) {
            debug!(post_id, "dropping stale comment list response");
            return;
        }

        let listed = match result {
            Ok(resp) if resp.status.is_success() => Some(resp.comments),
            Ok(resp) => {
                debug!(post_id, status = ?resp.status, "comment list not available");
                None
            }
            Err(e) => {
                warn!(post_id, "Failed to load comments: {e}");
                None
            }
        };

        let html = {
            let mut panels = lock(&self.inner.panels);
            match listed {
                Some(comments) => {
                    let html = render_comments(&comments, post_id, &self.inner.viewer, Utc::now());
                    panels.listed.insert(post_id, comments);
                    html
                }
                None => {
                    panels.listed.remove(&post_id);
                    COMMENTS_FAILED.to_string()
                }
            }
        };
        self.inner.page.apply([Effect::SetHtml { slot: Slot::CommentList(post_id), html }]);
    }

    pub async fn create_comment(&self, post_id: PostId, text: &str) {
        let body = text.trim();
        if body.is_empty() {
            self.inner.page.apply([ValidationFailure("댓글 내용을 입력해주세요.").notice()]);
            return;
        }

        let req = CreateCommentRequest { post_id, comment_body: body.to_string() };
        match self.inner.client.create_comment(&req).await {
            Ok(resp) if resp.status.is_success() => {
                self.inner.page.apply([
                    Effect::SetValue { slot: Slot::CommentInput(post_id), value: String::new() },
                    Effect::Notify(Notification::success("✅ 댓글이 작성되었습니다!")),
                ]);
                self.load_comments(post_id).await;
                self.apply_comment_count_delta(post_id, 1);
            }
            Ok(resp) => self.report_rejected(resp.message),
            Err(e) => self.report_failure(&e),
        }
    }

    /// Replace a comment's body. Blank or unchanged text is a no-op.
    pub async fn edit_comment(&self, post_id: PostId, comment_id: CommentId, text: &str) {
        let current = lock(&self.inner.panels)
            .listed
            .get(&post_id)
            .and_then(|comments| comments.iter().find(|c| c.id == comment_id))
            .map(|c| c.body.clone());

        if text.trim().is_empty() || current.as_deref() == Some(text) {
            debug!(post_id, comment_id, "comment edit skipped");
            return;
        }

        let req = UpdateCommentRequest { comment_id, comment_body: text.to_string() };
        match self.inner.client.update_comment(&req).await {
            Ok(resp) if resp.status.is_success() => {
                self.notify(Notification::success("✅ 댓글이 수정되었습니다!"));
                self.load_comments(post_id).await;
            }
            Ok(resp) => self.report_rejected(resp.message),
            Err(e) => self.report_failure(&e),
        }
    }

    pub async fn delete_comment(&self, post_id: PostId, comment_id: CommentId, confirm: &impl Confirm) {
        if !confirm.confirm("정말 이 댓글을 삭제하시겠습니까?") {
            return;
        }

        match self.inner.client.delete_comment(comment_id).await {
            Ok(resp) if resp.status.is_success() => {
                self.notify(Notification::success("✅ 댓글이 삭제되었습니다!"));
                self.load_comments(post_id).await;
                self.apply_comment_count_delta(post_id, -1);
            }
            Ok(resp) => self.report_rejected(resp.message),
            Err(e) => self.report_failure(&e),
        }
    }

    pub fn open_new_post(&self) {
        let effects = self.modal().open_new();
        self.inner.page.apply(effects);
    }

    /// Open the modal prefilled from the cached post. False if not cached.
    pub fn open_edit_post(&self, post_id: PostId) -> bool {
        let Some(post) = self.post(post_id) else {
            return false;
        };
        let effects = self.modal().open_edit(&post);
        self.inner.page.apply(effects);
        true
    }

    pub fn close_post_modal(&self) {
        let effects = self.modal().close();
        self.inner.page.apply(effects);
    }

    /// Submit the modal form as a create or an update.
    pub async fn submit_post(&self, title: &str, content: &str) {
        let submission = {
            let mut modal = self.modal();
            modal.set_fields(title, content);
            modal.submission()
        };
        let submission = match submission {
            Ok(submission) => submission,
            Err(failure) => {
                self.inner.page.apply([failure.notice()]);
                return;
            }
        };

        let (result, done) = match &submission {
            PostSubmission::Create(req) => {
                (self.inner.client.create_post(req).await, "✅ 게시글이 작성되었습니다!")
            }
            PostSubmission::Update(req) => {
                (self.inner.client.update_post(req).await, "✅ 게시글이 수정되었습니다!")
            }
        };

        match result {
            Ok(resp) if resp.status.is_success() => {
                info!(post_id = ?resp.post_id, "post saved");
                let mut effects = vec![Effect::Notify(Notification::success(done))];
                effects.extend(self.modal().close());
                self.inner.page.apply(effects);
                self.load().await;
            }
            Ok(resp) => self.report_rejected(resp.message),
            Err(e) => self.report_failure(&e),
        }
    }

    pub async fn delete_post(&self, post_id: PostId, confirm: &impl Confirm) {
        if !confirm.confirm("정말 이 게시글을 삭제하시겠습니까?") {
            return;
        }

        match self.inner.client.delete_post(post_id).await {
            Ok(resp) if resp.status.is_success() => {
                info!(post_id, "post deleted");
                self.notify(Notification::success("✅ 게시글이 삭제되었습니다!"));
                self.load().await;
            }
            Ok(resp) => self.report_rejected(resp.message),
            Err(e) => self.report_failure(&e),
        }
    }

    fn cache(&self) -> MutexGuard<'_, PostCache> {
        lock(&self.inner.cache)
    }

    fn modal(&self) -> MutexGuard<'_, PostModal> {
        lock(&self.inner.modal)
    }

    fn notify(&self, notification: Notification) {
        self.inner.page.apply([Effect::Notify(notification)]);
    }

    fn report_rejected(&self, message: Option<String>) {
        let message = message.unwrap_or_else(|| "요청 실패".to_string());
        warn!("Request rejected: {message}");
        self.notify(Notification::failure(&message));
    }

    fn report_failure(&self, err: &ClientError) {
        warn!("Request failed: {err}");
        self.notify(Notification::failure(&err.message()));
    }
}
