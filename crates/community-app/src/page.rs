//! In-memory document that [`Effect`]s are applied to.
//!
//! The page is a single markup string addressed by element id, plus form
//! state (values, disabled flags) that does not live in markup. Effects that
//! target a missing element are ignored, like a `getElementById` miss.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tracing::{debug, warn};

use community_view::render::escape_html;
use community_view::theme::Theme;
use community_view::{Effect, Notification, Slot};

use crate::lock;

const SKELETON: &str = concat!(
    r#"<header><h1>AI Community</h1><button id="theme-toggle"></button></header>"#,
    r#"<main>"#,
    r#"<section id="board"><div class="board-actions"><button id="new-post-btn">✍️ 새 게시글</button><button id="refresh-posts">🔄 게시글 새로고침</button></div><div id="posts-container"></div></section>"#,
    r#"<section id="chat"><div id="chat-log"></div><div id="typing-indicator" class="typing-indicator" hidden><span></span><span></span><span></span></div>"#,
    r#"<form id="chat-form"><textarea name="message" id="chat-input"></textarea><button type="submit" id="chat-submit">전송 ✈️</button></form></section>"#,
    r#"</main>"#,
    r#"<div id="post-modal" class="modal" hidden><div class="modal-content"><h2 id="post-modal-heading"></h2><form id="post-form"><input name="title" id="post-title"><textarea name="content" id="post-content"></textarea><button type="submit">저장</button></form></div></div>"#,
);

/// Element span inside the document.
struct Element {
    open_start: usize,
    content_start: usize,
    content_end: usize,
}

/// Notifications kept on the page; older ones are dropped first.
pub const NOTIFICATION_LOG_LIMIT: usize = 50;

#[derive(Debug)]
pub struct Page {
    body: String,
    theme: Theme,
    values: HashMap<String, String>,
    disabled: HashSet<String>,
    notifications: Vec<Notification>,
}

impl Default for Page {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

impl Page {
    pub fn new(theme: Theme) -> Self {
        let mut page = Self {
            body: SKELETON.to_string(),
            theme,
            values: HashMap::new(),
            disabled: HashSet::new(),
            notifications: Vec::new(),
        };
        page.apply(Effect::SetTheme(theme));
        page
    }

    pub fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::SetHtml { slot, html } => self.set_inner(&slot, &html),
            Effect::SetText { slot, text } => self.set_inner(&slot, &escape_html(&text)),
            Effect::SetVisible { slot, visible } => self.set_visible(&slot, visible),
            Effect::SetValue { slot, value } => {
                self.values.insert(slot.element_id(), value);
            }
            Effect::SetDisabled { slot, disabled } => {
                if disabled {
                    self.disabled.insert(slot.element_id());
                } else {
                    self.disabled.remove(&slot.element_id());
                }
            }
            Effect::Notify(notification) => {
                self.notifications.push(notification);
                let excess = self.notifications.len().saturating_sub(NOTIFICATION_LOG_LIMIT);
                self.notifications.drain(..excess);
            }
            Effect::SetTheme(theme) => {
                self.theme = theme;
                let id = "theme-toggle";
                if let Some(el) = find_element(&self.body, id) {
                    self.body.replace_range(el.content_start..el.content_end, theme.toggle_icon());
                }
            }
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Children of the element with `id`, as markup.
    pub fn inner_html(&self, id: &str) -> Option<&str> {
        find_element(&self.body, id).map(|el| &self.body[el.content_start..el.content_end])
    }

    pub fn is_visible(&self, id: &str) -> Option<bool> {
        let el = find_element(&self.body, id)?;
        Some(!self.body[el.open_start..el.content_start].ends_with(" hidden>"))
    }

    pub fn value(&self, id: &str) -> Option<&str> {
        self.values.get(id).map(String::as_str)
    }

    pub fn is_disabled(&self, id: &str) -> bool {
        self.disabled.contains(id)
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Full document with the current theme.
    pub fn to_html(&self) -> String {
        format!(
            "<!doctype html>\n<html lang=\"ko\" data-theme=\"{}\">\n<head><meta charset=\"utf-8\"><title>AI Community</title></head>\n<body>{}</body>\n</html>\n",
            self.theme, self.body
        )
    }

    fn set_inner(&mut self, slot: &Slot, inner: &str) {
        let id = slot.element_id();
        match find_element(&self.body, &id) {
            Some(el) => self.body.replace_range(el.content_start..el.content_end, inner),
            None => debug!(%id, "effect target not in page"),
        }
    }

    fn set_visible(&mut self, slot: &Slot, visible: bool) {
        let id = slot.element_id();
        let Some(el) = find_element(&self.body, &id) else {
            debug!(%id, "effect target not in page");
            return;
        };
        // `hidden` is always written as the last attribute.
        let tag_end = el.content_start - 1;
        let hidden = self.body[el.open_start..el.content_start].ends_with(" hidden>");
        match (visible, hidden) {
            (true, true) => self.body.replace_range(tag_end - " hidden".len()..tag_end, ""),
            (false, false) => self.body.insert_str(tag_end, " hidden"),
            _ => {}
        }
    }
}

fn find_element(doc: &str, id: &str) -> Option<Element> {
    let needle = format!(r#" id="{id}""#);
    let attr = doc.find(&needle)?;
    let open_start = doc[..attr].rfind('<')?;
    let content_start = attr + doc[attr..].find('>')? + 1;

    let tag: String = doc[open_start + 1..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    let open_pat = format!("<{tag}");
    let close_pat = format!("</{tag}>");

    let mut depth = 1usize;
    let mut pos = content_start;
    loop {
        let close = pos + doc[pos..].find(&close_pat)?;
        match next_open_tag(doc, pos, close, &open_pat) {
            Some(open) => {
                depth += 1;
                pos = open + open_pat.len();
            }
            None => {
                depth -= 1;
                if depth == 0 {
                    return Some(Element { open_start, content_start, content_end: close });
                }
                pos = close + close_pat.len();
            }
        }
    }
}

fn next_open_tag(doc: &str, mut from: usize, before: usize, pat: &str) -> Option<usize> {
    while let Some(i) = doc[from..before].find(pat) {
        let at = from + i;
        if matches!(doc[at + pat.len()..].chars().next(), Some(' ' | '>' | '/')) {
            return Some(at);
        }
        from = at + pat.len();
    }
    None
}

/// Shared handle to the page. Cheap to clone.
#[derive(Clone)]
pub struct PageHandle {
    page: Arc<Mutex<Page>>,
    snapshot: Option<Arc<PathBuf>>,
    notices: broadcast::Sender<Notification>,
}

impl PageHandle {
    pub fn new(page: Page) -> Self {
        let (notices, _) = broadcast::channel(64);
        Self {
            page: Arc::new(Mutex::new(page)),
            snapshot: None,
            notices,
        }
    }

    /// Write the rendered document to `path` after every batch of effects.
    pub fn with_snapshot(mut self, path: PathBuf) -> Self {
        self.snapshot = Some(Arc::new(path));
        self
    }

    /// Receive every notification as it is applied.
    pub fn subscribe_notifications(&self) -> broadcast::Receiver<Notification> {
        self.notices.subscribe()
    }

    pub fn apply(&self, effects: impl IntoIterator<Item = Effect>) {
        let html = {
            let mut page = lock(&self.page);
            for effect in effects {
                if let Effect::Notify(notification) = &effect {
                    let _ = self.notices.send(notification.clone());
                }
                page.apply(effect);
            }
            self.snapshot.as_ref().map(|_| page.to_html())
        };

        if let (Some(path), Some(html)) = (&self.snapshot, html) {
            if let Err(e) = std::fs::write(path.as_ref(), html) {
                warn!("Failed to write page snapshot to {}: {}", path.display(), e);
            }
        }
    }

    pub fn read<T>(&self, f: impl FnOnce(&Page) -> T) -> T {
        f(&lock(&self.page))
    }
}
