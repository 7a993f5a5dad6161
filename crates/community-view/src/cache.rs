use chrono::{DateTime, Utc};
use tracing::debug;

use community_types::models::{Post, PostId};

use crate::effect::{Effect, Slot};
use crate::render::{comment_counter_text, render_posts};

/// Last known post list.
///
/// A denormalized read model, never authoritative: [`PostCache::replace`]
/// discards every local patch, and a failed refresh empties it rather than
/// leaving a stale list behind.
#[derive(Debug, Default)]
pub struct PostCache {
    posts: Vec<Post>,
}

impl PostCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn get(&self, post_id: PostId) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == post_id)
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Swap in a fresh server snapshot and re-render the whole list.
    pub fn replace(&mut self, posts: Vec<Post>, now: DateTime<Utc>) -> Vec<Effect> {
        debug!(count = posts.len(), "post cache replaced");
        self.posts = posts;
        vec![Effect::SetHtml {
            slot: Slot::Posts,
            html: render_posts(&self.posts, now),
        }]
    }

    /// Drop everything and render the empty state.
    pub fn clear(&mut self) -> Vec<Effect> {
        self.replace(Vec::new(), Utc::now())
    }

    /// Shift one post's comment counter by `delta`, clamped at zero, and patch
    /// only that counter.
    ///
    /// Returns no effects when the post is not cached (a refresh already
    /// dropped it).
    pub fn apply_comment_count_delta(&mut self, post_id: PostId, delta: i32) -> Vec<Effect> {
        let Some(post) = self.posts.iter_mut().find(|p| p.id == post_id) else {
            debug!(post_id, "comment delta for uncached post ignored");
            return Vec::new();
        };

        let next = i64::from(post.comment_count) + i64::from(delta);
        post.comment_count = u32::try_from(next.max(0)).unwrap_or(u32::MAX);

        vec![Effect::SetText {
            slot: Slot::CommentCount(post_id),
            text: comment_counter_text(post.comment_count),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn post(id: PostId, comments: u32) -> Post {
        Post {
            id,
            title: format!("post {id}"),
            body: String::new(),
            author: Some("a".into()),
            user_id: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            like_count: 0,
            comment_count: comments,
            view_count: None,
            pinned: false,
            private: false,
            viewer_has_liked: false,
            viewer_is_author: false,
        }
    }

    #[test]
    fn replace_renders_full_list() {
        let mut cache = PostCache::new();
        let effects = cache.replace(vec![post(1, 0), post(2, 0)], Utc::now());

        assert_eq!(cache.posts().len(), 2);
        let [Effect::SetHtml { slot: Slot::Posts, html }] = effects.as_slice() else {
            panic!("expected a single posts render, got {effects:?}");
        };
        assert!(html.contains(r#"data-post-id="1""#));
        assert!(html.contains(r#"data-post-id="2""#));
    }

    #[test]
    fn comment_delta_patches_only_the_counter() {
        let mut cache = PostCache::new();
        cache.replace(vec![post(1, 3), post(2, 5)], Utc::now());

        let effects = cache.apply_comment_count_delta(2, 1);
        assert_eq!(
            effects,
            vec![Effect::SetText { slot: Slot::CommentCount(2), text: "💬 6".into() }]
        );
        assert_eq!(cache.get(2).unwrap().comment_count, 6);
        assert_eq!(cache.get(1).unwrap().comment_count, 3);
    }

    #[test]
    fn comment_delta_clamps_at_zero() {
        let mut cache = PostCache::new();
        cache.replace(vec![post(1, 0)], Utc::now());

        cache.apply_comment_count_delta(1, -1);
        assert_eq!(cache.get(1).unwrap().comment_count, 0);
    }

    #[test]
    fn refresh_overrides_optimistic_patch() {
        let mut cache = PostCache::new();
        cache.replace(vec![post(1, 3)], Utc::now());
        cache.apply_comment_count_delta(1, 1);

        cache.replace(vec![post(1, 3)], Utc::now());
        assert_eq!(cache.get(1).unwrap().comment_count, 3);
    }

    #[test]
    fn delta_on_missing_post_is_a_no_op() {
        let mut cache = PostCache::new();
        assert!(cache.apply_comment_count_delta(42, 1).is_empty());
    }

    #[test]
    fn clear_renders_empty_state() {
        let mut cache = PostCache::new();
        cache.replace(vec![post(1, 0)], Utc::now());

        let effects = cache.clear();
        assert!(cache.is_empty());
        assert_eq!(
            effects,
            vec![Effect::SetHtml { slot: Slot::Posts, html: crate::render::EMPTY_POSTS.into() }]
        );
    }
}
