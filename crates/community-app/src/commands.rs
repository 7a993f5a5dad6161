//! Line-oriented command shell for the terminal client.

use tracing::debug;

use community_types::models::{CommentId, PostId};

use crate::appearance::Appearance;
use crate::board::Board;
use crate::chat::{Chat, SendOutcome};
use crate::poller::{Visibility, VisibilityWatch};

pub const HELP: &str = "\
commands:
  <text>                          send a chat message (end with \\ to continue on the next line)
  <empty line>                    resend a draft that failed to send
  /refresh                        reload posts and chat history
  /theme                          toggle dark/light theme
  /posts                          list posts
  /view <id>                      show a post
  /post <title> | <content>       write a post
  /edit <id> <title> | <content>  edit a post
  /delete <id>                    delete a post
  /like <id>                      toggle like
  /comments <id>                  show or hide comments
  /comment <id> <text>            write a comment
  /edit-comment <post> <id> <text>
  /delete-comment <post> <id>
  /hide, /show                    simulate the view going out of / into sight
  /quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Composer line that ends the message.
    Say(String),
    /// Composer line followed by Shift+Enter.
    Continue(String),
    Refresh,
    Theme,
    Posts,
    View(PostId),
    NewPost { title: String, content: String },
    EditPost { post_id: PostId, title: String, content: String },
    DeletePost(PostId),
    Like(PostId),
    Comments(PostId),
    Comment { post_id: PostId, text: String },
    EditComment { post_id: PostId, comment_id: CommentId, text: String },
    DeleteComment { post_id: PostId, comment_id: CommentId },
    Hide,
    Show,
    Help,
    Quit,
    Invalid(String),
}

pub fn parse(line: &str) -> Command {
    let Some(rest) = line.strip_prefix('/') else {
        return match line.strip_suffix('\\') {
            Some(text) => Command::Continue(text.to_string()),
            None => Command::Say(line.to_string()),
        };
    };

    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest.trim_end(), ""),
    };

    let parsed = match name {
        "refresh" => Some(Command::Refresh),
        "theme" => Some(Command::Theme),
        "posts" => Some(Command::Posts),
        "view" => single_id(args).map(Command::View),
        "post" => title_and_content(args).map(|(title, content)| Command::NewPost { title, content }),
        "edit" => leading_id(args).and_then(|(post_id, rest)| {
            title_and_content(rest).map(|(title, content)| Command::EditPost { post_id, title, content })
        }),
        "delete" => single_id(args).map(Command::DeletePost),
        "like" => single_id(args).map(Command::Like),
        "comments" => single_id(args).map(Command::Comments),
        "comment" => leading_id(args).map(|(post_id, text)| Command::Comment { post_id, text: text.to_string() }),
        "edit-comment" => leading_id(args).and_then(|(post_id, rest)| {
            leading_id(rest).map(|(comment_id, text)| Command::EditComment {
                post_id,
                comment_id,
                text: text.to_string(),
            })
        }),
        "delete-comment" => leading_id(args).and_then(|(post_id, rest)| {
            single_id(rest).map(|comment_id| Command::DeleteComment { post_id, comment_id })
        }),
        "hide" => Some(Command::Hide),
        "show" => Some(Command::Show),
        "help" => Some(Command::Help),
        "quit" | "exit" => Some(Command::Quit),
        _ => None,
    };

    parsed.unwrap_or_else(|| Command::Invalid(line.to_string()))
}

fn leading_id(args: &str) -> Option<(i64, &str)> {
    let (id, rest) = args.split_once(char::is_whitespace).unwrap_or((args, ""));
    Some((id.parse().ok()?, rest.trim_start()))
}

fn single_id(args: &str) -> Option<i64> {
    match leading_id(args)? {
        (id, "") => Some(id),
        _ => None,
    }
}

fn title_and_content(args: &str) -> Option<(String, String)> {
    let (title, content) = args.split_once('|')?;
    Some((title.trim().to_string(), content.trim().to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    DeletePost(PostId),
    DeleteComment { post_id: PostId, comment_id: CommentId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Dispatches input lines to the board and chat controllers.
///
/// Destructive commands are held until the next line answers the prompt.
/// A plain line replaces whatever draft a failed send left behind, unless it
/// follows a continued line.
pub struct Shell {
    board: Board,
    chat: Chat,
    appearance: Appearance,
    visibility: VisibilityWatch,
    pending: Option<Pending>,
    drafting: bool,
}

impl Shell {
    pub fn new(board: Board, chat: Chat, appearance: Appearance, visibility: VisibilityWatch) -> Self {
        Self { board, chat, appearance, visibility, pending: None, drafting: false }
    }

    /// Prompt to show for the pending confirmation, if any.
    pub fn pending_prompt(&self) -> Option<&'static str> {
        self.pending.map(|pending| match pending {
            Pending::DeletePost(_) => "정말 이 게시글을 삭제하시겠습니까? (y/N)",
            Pending::DeleteComment { .. } => "정말 이 댓글을 삭제하시겠습니까? (y/N)",
        })
    }

    pub async fn handle(&mut self, line: &str) -> Flow {
        if let Some(pending) = self.pending.take() {
            let answer = line.trim().eq_ignore_ascii_case("y");
            let confirm = move |_: &str| answer;
            match pending {
                Pending::DeletePost(post_id) => self.board.delete_post(post_id, &confirm).await,
                Pending::DeleteComment { post_id, comment_id } => {
                    self.board.delete_comment(post_id, comment_id, &confirm).await
                }
            }
            return Flow::Continue;
        }

        let command = parse(line);
        debug!(?command, "command");
        match command {
            Command::Say(text) => {
                if self.drafting {
                    self.chat.type_text(&text);
                } else if !text.is_empty() {
                    self.chat.set_input(&text);
                }
                self.drafting = false;
                let outcome = self.chat.key_enter(false).await;
                if let Some(SendOutcome::Failed { draft }) = outcome {
                    println!("보내지 못한 메시지: {draft}");
                    println!("(빈 줄을 입력하면 다시 전송합니다)");
                }
            }
            Command::Continue(text) => {
                if self.drafting {
                    self.chat.type_text(&text);
                } else {
                    self.chat.set_input(&text);
                }
                self.drafting = true;
                self.chat.key_enter(true).await;
            }
            Command::Refresh => {
                self.board.refresh().await;
                self.chat.refresh_history().await;
            }
            Command::Theme => {
                let theme = self.appearance.toggle();
                println!("theme: {theme}");
            }
            Command::Posts => {
                self.board.load().await;
                self.print_posts();
            }
            Command::View(post_id) => {
                if let Some(post) = self.board.view_post(post_id).await {
                    println!("#{} {}", post.id, post.title);
                    println!(
                        "by {}  {}  ❤️ {}  💬 {}  👁 {}",
                        post.author_or_anonymous(),
                        post.created_at.format("%Y-%m-%d %H:%M"),
                        post.like_count,
                        post.comment_count,
                        post.view_count.unwrap_or(0)
                    );
                    println!("{}", post.body);
                }
            }
            Command::NewPost { title, content } => {
                self.board.open_new_post();
                self.board.submit_post(&title, &content).await;
            }
            Command::EditPost { post_id, title, content } => {
                if self.board.open_edit_post(post_id) {
                    self.board.submit_post(&title, &content).await;
                } else {
                    println!("no post #{post_id} on the board, try /posts");
                }
            }
            Command::DeletePost(post_id) => self.ask(Pending::DeletePost(post_id)),
            Command::Like(post_id) => self.board.toggle_like(post_id).await,
            Command::Comments(post_id) => {
                self.board.toggle_comments(post_id).await;
                if self.board.comments_open(post_id) {
                    self.print_comments(post_id);
                }
            }
            Command::Comment { post_id, text } => self.board.create_comment(post_id, &text).await,
            Command::EditComment { post_id, comment_id, text } => {
                self.board.edit_comment(post_id, comment_id, &text).await
            }
            Command::DeleteComment { post_id, comment_id } => {
                self.ask(Pending::DeleteComment { post_id, comment_id })
            }
            Command::Hide => {
                self.visibility.set(Visibility::Hidden);
            }
            Command::Show => {
                self.visibility.set(Visibility::Visible);
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => return Flow::Quit,
            Command::Invalid(line) => println!("unknown command: {line} (try /help)"),
        }
        Flow::Continue
    }

    fn ask(&mut self, pending: Pending) {
        self.pending = Some(pending);
        if let Some(prompt) = self.pending_prompt() {
            println!("{prompt}");
        }
    }

    fn print_posts(&self) {
        let posts = self.board.posts();
        if posts.is_empty() {
            println!("(no posts)");
        }
        for post in posts {
            println!(
                "#{:<4} {}  ❤️ {}  💬 {}  by {}",
                post.id,
                post.title,
                post.like_count,
                post.comment_count,
                post.author_or_anonymous()
            );
        }
    }

    fn print_comments(&self, post_id: PostId) {
        for comment in self.board.comments(post_id) {
            println!("  [{}] {}: {}", comment.id, comment.display_name(), comment.body);
        }
    }
}
