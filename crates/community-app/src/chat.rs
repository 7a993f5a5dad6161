use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, warn};

use community_client::ApiClient;
use community_types::packet::{Message, Packet};
use community_view::chat::ChatLog;
use community_view::composer::{Composer, ComposerState, KeyOutcome};

use crate::latest::LatestOnly;
use crate::lock;
use crate::page::PageHandle;
use crate::poller::{Poller, PollerHandle};

/// Pause before the second history refresh after a send that produced an
/// AI reply.
pub const AI_FOLLOW_UP_DELAY: Duration = Duration::from_millis(500);

/// Result of a submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    /// Blank input, or a send already in flight.
    Skipped,
    /// The backend call failed and `draft` is back in the composer.
    Failed { draft: String },
}

struct ChatInner {
    client: ApiClient,
    page: PageHandle,
    sender: String,
    ask_ai: bool,
    log: Mutex<ChatLog>,
    composer: Mutex<Composer>,
    refreshes: LatestOnly,
    arrivals: broadcast::Sender<Message>,
}

/// Chat log and composer controller.
#[derive(Clone)]
pub struct Chat {
    inner: Arc<ChatInner>,
}

impl Chat {
    pub fn new(client: ApiClient, page: PageHandle, sender: impl Into<String>, ask_ai: bool) -> Self {
        let (arrivals, _) = broadcast::channel(256);
        Self {
            inner: Arc::new(ChatInner {
                client,
                page,
                sender: sender.into(),
                ask_ai,
                log: Mutex::new(ChatLog::new()),
                composer: Mutex::new(Composer::new()),
                refreshes: LatestOnly::new(),
                arrivals,
            }),
        }
    }

    /// Messages seen for the first time, in history order.
    pub fn subscribe(&self) -> broadcast::Receiver<Message> {
        self.inner.arrivals.subscribe()
    }

    pub fn messages(&self) -> Vec<Message> {
        lock(&self.inner.log).messages().to_vec()
    }

    pub fn composer_state(&self) -> ComposerState {
        self.composer().state()
    }

    pub fn input(&self) -> String {
        self.composer().text().to_string()
    }

    pub fn start_polling(&self, every: Duration) -> PollerHandle {
        let chat = self.clone();
        Poller::start("chat-history", every, move || {
            let chat = chat.clone();
            async move { chat.refresh_history().await }
        })
    }

    pub async fn refresh_history(&self) {
        let ticket = self.inner.refreshes.issue(());
        let result = self.inner.client.chat_history().await;
        if !self.inner.refreshes.is_latest(&ticket) {
            debug!("dropping stale chat history response");
            return;
        }

        match result {
            Ok(packets) => {
                let refresh = lock(&self.inner.log).replace(&packets);
                self.inner.page.apply(refresh.effects);
                for message in refresh.arrived {
                    let _ = self.inner.arrivals.send(message);
                }
            }
            Err(e) => warn!("Failed to refresh chat history: {e}"),
        }
    }

    /// Append typed text to the composer.
    pub fn type_text(&self, text: &str) {
        let mut composer = self.composer();
        let next = format!("{}{text}", composer.text());
        composer.set_text(next);
    }

    /// Replace the composer text.
    pub fn set_input(&self, text: &str) {
        self.composer().set_text(text);
    }

    /// Enter in the composer. `None` when Shift+Enter only added a newline.
    pub async fn key_enter(&self, shift: bool) -> Option<SendOutcome> {
        let outcome = self.composer().key_enter(shift);
        match outcome {
            KeyOutcome::Submit => Some(self.submit().await),
            KeyOutcome::Newline => None,
        }
    }

    /// Send the composer text. Blank input and re-entrant submits do nothing.
    pub async fn submit(&self) -> SendOutcome {
        let started = self.composer().begin_send(self.inner.ask_ai);
        let Some((body, effects)) = started else {
            debug!("nothing to send");
            return SendOutcome::Skipped;
        };
        self.inner.page.apply(effects);

        let packet = Packet::chat(&self.inner.sender, body);
        if let Err(e) = packet.validate() {
            return self.fail_send(&e.to_string());
        }

        match self.inner.client.send_chat(&packet, self.inner.ask_ai).await {
            Ok(resp) => {
                debug!(message_id = %packet.header.message_id, ai_reply = resp.ai_packet.is_some(), "chat sent");
                self.refresh_history().await;
                if resp.ai_packet.is_some() {
                    tokio::time::sleep(AI_FOLLOW_UP_DELAY).await;
                    self.refresh_history().await;
                }
                let effects = self.composer().finish_ok();
                self.inner.page.apply(effects);
                SendOutcome::Sent
            }
            Err(e) => {
                warn!("Failed to send chat message: {e}");
                self.fail_send(&e.message())
            }
        }
    }

    fn fail_send(&self, message: &str) -> SendOutcome {
        let (effects, draft) = {
            let mut composer = self.composer();
            let effects = composer.finish_err(message);
            (effects, composer.text().to_string())
        };
        self.inner.page.apply(effects);
        SendOutcome::Failed { draft }
    }

    fn composer(&self) -> MutexGuard<'_, Composer> {
        lock(&self.inner.composer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Page;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn history(bodies: &[&str]) -> serde_json::Value {
        let packets: Vec<_> = bodies
            .iter()
            .enumerate()
            .map(|(i, body)| {
                json!({
                    "header": {
                        "version": "1.0",
                        "message_type": "CHAT",
                        "message_id": format!("m{i}"),
                        "sender": "kim",
                        "channel": "lobby",
                        "timestamp": "2024-06-07T15:04:05Z",
                    },
                    "payload": {"body": body, "metadata": {}},
                })
            })
            .collect();
        json!({"status": "SUCCESS", "history": packets})
    }

    fn chat_for(server: &MockServer, ask_ai: bool) -> Chat {
        let client = ApiClient::new(server.uri()).unwrap();
        Chat::new(client, PageHandle::new(Page::default()), "me@example.com", ask_ai)
    }

    #[tokio::test]
    async fn refresh_renders_and_announces_new_messages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/chat/history"))
            .respond_with(ResponseTemplate::new(200).set_body_json(history(&["hello", "world"])))
            .mount(&server)
            .await;

        let chat = chat_for(&server, false);
        let mut arrivals = chat.subscribe();
        chat.refresh_history().await;
        chat.refresh_history().await;

        assert_eq!(chat.messages().len(), 2);
        assert_eq!(arrivals.try_recv().unwrap().body, "hello");
        assert_eq!(arrivals.try_recv().unwrap().body, "world");
        assert!(arrivals.try_recv().is_err());
    }

    #[tokio::test]
    async fn late_history_response_is_dropped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/chat/history"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(history(&["old"]))
                    .set_delay(Duration::from_millis(300)),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/chat/history"))
            .respond_with(ResponseTemplate::new(200).set_body_json(history(&["new"])))
            .mount(&server)
            .await;

        let chat = chat_for(&server, false);
        let newer = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            chat.refresh_history().await;
        };
        tokio::join!(chat.refresh_history(), newer);

        let bodies: Vec<_> = chat.messages().into_iter().map(|m| m.body).collect();
        assert_eq!(bodies, ["new"]);
    }

    #[tokio::test]
    async fn ai_reply_triggers_follow_up_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat/send"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "SUCCESS",
                "ai_packet": history(&["answer"])["history"][0],
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/chat/history"))
            .respond_with(ResponseTemplate::new(200).set_body_json(history(&["question", "answer"])))
            .expect(2)
            .mount(&server)
            .await;

        let chat = chat_for(&server, true);
        chat.type_text("question");
        assert_eq!(chat.key_enter(false).await, Some(SendOutcome::Sent));

        assert_eq!(chat.composer_state(), ComposerState::Idle);
        assert_eq!(chat.input(), "");
    }

    #[tokio::test]
    async fn failed_send_restores_input() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat/send"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "AI 서버 오류"})))
            .mount(&server)
            .await;

        let chat = chat_for(&server, true);
        chat.type_text("keep me");
        assert_eq!(chat.submit().await, SendOutcome::Failed { draft: "keep me".into() });

        assert_eq!(chat.input(), "keep me");
        assert_eq!(chat.composer_state(), ComposerState::Idle);
        let page = chat.inner.page.clone();
        assert!(!page.read(|p| p.is_disabled("chat-submit")));
        assert_eq!(page.read(|p| p.is_visible("typing-indicator")), Some(false));
    }

    #[tokio::test]
    async fn shift_enter_does_not_send() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let chat = chat_for(&server, false);
        chat.type_text("first line");
        assert_eq!(chat.key_enter(true).await, None);

        assert_eq!(chat.input(), "first line\n");
    }
}
