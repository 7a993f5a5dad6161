//! Markup fragments for posts, comments and chat entries.
//!
//! Every user-controlled string goes through [`escape_html`]. Ids and
//! counters are numeric and are interpolated directly.

use std::fmt::Write;

use chrono::{DateTime, Utc};

use community_types::models::{Comment, Post, PostId};
use community_types::packet::Message;

use crate::Viewer;
use crate::time::{format_clock, format_relative};

pub const EMPTY_POSTS: &str = r#"<div class="empty-state"><h2>📝 첫 게시글을 작성해보세요!</h2><p>새 게시글 작성 버튼을 눌러 커뮤니티를 시작하세요.</p></div>"#;
pub const EMPTY_COMMENTS: &str = r#"<p class="comments-empty">아직 댓글이 없습니다. 첫 댓글을 작성해보세요! 💬</p>"#;
pub const COMMENTS_FAILED: &str = r#"<p class="comments-error">댓글을 불러오는데 실패했습니다.</p>"#;

/// Escape the five HTML-significant characters. No other sanitizing.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn comment_counter_text(count: u32) -> String {
    format!("💬 {count}")
}

pub fn render_post(post: &Post, now: DateTime<Utc>) -> String {
    let id = post.id;
    let (like_class, like_icon) = if post.viewer_has_liked {
        ("like-btn liked", "❤️")
    } else {
        ("like-btn", "🤍")
    };

    let mut html = String::new();
    let _ = write!(
        html,
        r#"<article class="post-card" data-post-id="{id}"><div class="post-header"><h3 class="post-title">{title}</h3><div class="post-meta"><span>👤 {author}</span><span>📅 {date}</span><span>❤️ {likes}</span><span class="comment-count" id="comment-count-{id}">{counter}</span></div></div><div class="post-content">{body}</div><div class="post-actions"><button class="{like_class}" data-action="toggle-like" data-post-id="{id}">{like_icon} 좋아요</button><button data-action="toggle-comments" data-post-id="{id}">💬 댓글 보기</button>"#,
        title = escape_html(&post.title),
        author = escape_html(post.author_or_anonymous()),
        date = format_relative(post.created_at, now),
        likes = post.like_count,
        counter = comment_counter_text(post.comment_count),
        body = escape_html(&post.body),
    );
    if post.viewer_is_author {
        let _ = write!(
            html,
            r#"<button data-action="edit-post" data-post-id="{id}">✏️ 수정</button><button data-action="delete-post" data-post-id="{id}">🗑️ 삭제</button>"#
        );
    }
    let _ = write!(
        html,
        r#"</div><div id="comments-{id}" class="comments-section" hidden><div class="comments-header"><h4>💬 댓글 {count}개</h4></div><div class="comments-list" id="comments-list-{id}"></div><div class="comment-form"><textarea placeholder="댓글을 입력하세요..." id="comment-input-{id}" rows="3"></textarea><button type="button" data-action="create-comment" data-post-id="{id}">댓글 작성 ✈️</button></div></div></article>"#,
        count = post.comment_count,
    );
    html
}

/// Full post list, or the empty-state prompt when there is nothing to show.
pub fn render_posts(posts: &[Post], now: DateTime<Utc>) -> String {
    if posts.is_empty() {
        return EMPTY_POSTS.to_string();
    }
    posts.iter().map(|p| render_post(p, now)).collect()
}

pub fn render_comment(comment: &Comment, post_id: PostId, viewer: &Viewer, now: DateTime<Utc>) -> String {
    let id = comment.id;
    let mut html = String::new();
    let _ = write!(
        html,
        r#"<div class="comment" data-comment-id="{id}"><div class="comment-header"><span class="comment-author">{author}</span><span class="comment-date">{date}</span></div><div class="comment-body" id="comment-body-{id}">{body}</div>"#,
        author = escape_html(comment.display_name()),
        date = format_relative(comment.created_at, now),
        body = escape_html(&comment.body),
    );
    if viewer.owns(&comment.author_id) {
        let _ = write!(
            html,
            r#"<div class="comment-actions"><button data-action="edit-comment" data-comment-id="{id}" data-post-id="{post_id}">✏️ 수정</button><button data-action="delete-comment" data-comment-id="{id}" data-post-id="{post_id}">🗑️ 삭제</button></div>"#
        );
    }
    html.push_str("</div>");
    html
}

pub fn render_comments(comments: &[Comment], post_id: PostId, viewer: &Viewer, now: DateTime<Utc>) -> String {
    if comments.is_empty() {
        return EMPTY_COMMENTS.to_string();
    }
    comments
        .iter()
        .map(|c| render_comment(c, post_id, viewer, now))
        .collect()
}

pub fn render_message(message: &Message) -> String {
    let class = if message.is_ai() {
        "chat-entry chat-entry--ai"
    } else {
        "chat-entry"
    };
    format!(
        r#"<article class="{class}" data-message-id="{id}"><div class="chat-entry__meta">{sender} • {time}</div><div class="chat-entry__body">{body}</div></article>"#,
        id = escape_html(&message.id),
        sender = escape_html(&message.sender),
        time = format_clock(message.timestamp),
        body = escape_html(&message.body),
    )
}

pub fn render_history(messages: &[Message]) -> String {
    messages.iter().map(render_message).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use community_types::models::UserId;
    use community_types::packet::MessageKind;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn post(id: PostId) -> Post {
        Post {
            id,
            title: "제목".into(),
            body: "본문".into(),
            author: None,
            user_id: None,
            created_at: now(),
            like_count: 2,
            comment_count: 4,
            view_count: None,
            pinned: false,
            private: false,
            viewer_has_liked: false,
            viewer_is_author: false,
        }
    }

    fn unescape(s: &str) -> String {
        s.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#039;", "'")
            .replace("&amp;", "&")
    }

    #[test]
    fn escape_neutralizes_script_tags() {
        let out = escape_html("<script>alert('x')</script>");
        assert!(!out.contains('<'));
        assert!(!out.contains("<script"));
        assert_eq!(out, "&lt;script&gt;alert(&#039;x&#039;)&lt;/script&gt;");
    }

    #[test]
    fn escape_decodes_back_to_original() {
        for s in ["&<>\"'", "a & b", "&amp; literal", "plain 한글"] {
            assert_eq!(unescape(&escape_html(s)), s);
        }
    }

    #[test]
    fn post_card_escapes_user_fields() {
        let mut p = post(1);
        p.title = "<b>hi</b>".into();
        p.body = "<img src=x onerror=alert(1)>".into();
        p.author = Some("\"evil\"".into());

        let html = render_post(&p, now());
        assert!(html.contains("&lt;b&gt;hi&lt;/b&gt;"));
        assert!(!html.contains("<img"));
        assert!(html.contains("&quot;evil&quot;"));
    }

    #[test]
    fn post_card_shows_owner_actions_only_for_author() {
        let mut p = post(9);
        assert!(!render_post(&p, now()).contains("edit-post"));

        p.viewer_is_author = true;
        let html = render_post(&p, now());
        assert!(html.contains(r#"data-action="edit-post" data-post-id="9""#));
        assert!(html.contains(r#"data-action="delete-post""#));
    }

    #[test]
    fn post_card_reflects_like_state_and_counter() {
        let mut p = post(3);
        p.viewer_has_liked = true;
        let html = render_post(&p, now());
        assert!(html.contains("like-btn liked"));
        assert!(html.contains(r#"<span class="comment-count" id="comment-count-3">💬 4</span>"#));
        assert!(html.contains("익명"));
    }

    #[test]
    fn empty_post_list_renders_prompt() {
        assert_eq!(render_posts(&[], now()), EMPTY_POSTS);
    }

    #[test]
    fn comment_actions_follow_viewer() {
        let comment = Comment {
            id: 5,
            post_id: Some(1),
            author_id: UserId::new("7"),
            nickname: Some("<nick>".into()),
            body: "hello".into(),
            created_at: now(),
        };

        let stranger = Viewer::new(Some(UserId::new("8")));
        let html = render_comment(&comment, 1, &stranger, now());
        assert!(html.contains("&lt;nick&gt;"));
        assert!(!html.contains("comment-actions"));

        let owner = Viewer::new(Some(UserId::new("7")));
        assert!(render_comment(&comment, 1, &owner, now()).contains("comment-actions"));
    }

    #[test]
    fn ai_message_gets_ai_class() {
        let message = Message {
            id: "m".into(),
            sender: "AI-Community".into(),
            channel: "lobby".into(),
            kind: MessageKind::Ai,
            body: "<hi>".into(),
            timestamp: now(),
        };
        let html = render_message(&message);
        assert!(html.contains("chat-entry chat-entry--ai"));
        assert!(html.contains("AI-Community • 오후 12:00:00"));
        assert!(html.contains("&lt;hi&gt;"));
    }
}
