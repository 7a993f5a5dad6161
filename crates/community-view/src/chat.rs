use std::collections::HashSet;
use std::time::Duration;

use community_types::packet::{Message, Packet};

use crate::effect::{Effect, Slot};
use crate::render::render_history;

/// Delay between revealed characters of an AI reply.
pub const TYPING_INTERVAL: Duration = Duration::from_millis(20);

/// Chat history as last fetched. Replaced wholesale on every refresh.
#[derive(Debug, Default)]
pub struct ChatLog {
    messages: Vec<Message>,
    /// Ids in the previous refresh only, so the set follows the server window.
    seen: HashSet<String>,
}

#[derive(Debug)]
pub struct HistoryRefresh {
    pub effects: Vec<Effect>,
    /// Messages not present in the previous refresh, in history order.
    pub arrived: Vec<Message>,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn replace(&mut self, packets: &[Packet]) -> HistoryRefresh {
        self.messages = packets.iter().map(Message::from).collect();

        let arrived = self.messages.iter().filter(|m| !self.seen.contains(&m.id)).cloned().collect();
        self.seen = self.messages.iter().map(|m| m.id.clone()).collect();

        HistoryRefresh {
            effects: vec![
                Effect::SetVisible { slot: Slot::TypingIndicator, visible: false },
                Effect::SetHtml { slot: Slot::ChatLog, html: render_history(&self.messages) },
            ],
            arrived,
        }
    }
}

/// Successive prefixes of `text`, one more character each step.
///
/// Purely cosmetic; the document itself is always rendered in full.
#[derive(Debug, Clone)]
pub struct TypingReveal<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> TypingReveal<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }
}

impl<'a> Iterator for TypingReveal<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let c = self.text[self.pos..].chars().next()?;
        self.pos += c.len_utf8();
        Some(&self.text[..self.pos])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packet(id: &str, body: &str) -> Packet {
        let mut p = Packet::chat("me", body);
        p.header.message_id = id.into();
        p
    }

    #[test]
    fn replace_swaps_the_whole_list() {
        let mut log = ChatLog::new();
        log.replace(&[packet("a", "one"), packet("b", "two")]);
        log.replace(&[packet("c", "three")]);

        assert_eq!(log.messages().len(), 1);
        assert_eq!(log.messages()[0].body, "three");
    }

    #[test]
    fn arrived_reports_only_unseen_messages() {
        let mut log = ChatLog::new();
        let first = log.replace(&[packet("a", "one")]);
        assert_eq!(first.arrived.len(), 1);

        let second = log.replace(&[packet("a", "one"), packet("b", "two")]);
        let ids: Vec<_> = second.arrived.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["b"]);
    }

    #[test]
    fn seen_ids_follow_current_history() {
        let mut log = ChatLog::new();
        log.replace(&[packet("a", "one"), packet("b", "two")]);
        log.replace(&[packet("b", "two"), packet("c", "three")]);

        let mut seen: Vec<_> = log.seen.iter().map(String::as_str).collect();
        seen.sort_unstable();
        assert_eq!(seen, ["b", "c"]);
    }

    #[test]
    fn refresh_hides_typing_indicator() {
        let mut log = ChatLog::new();
        let refresh = log.replace(&[]);
        assert_eq!(
            refresh.effects[0],
            Effect::SetVisible { slot: Slot::TypingIndicator, visible: false }
        );
    }

    #[test]
    fn reveal_walks_characters_not_bytes() {
        let steps: Vec<_> = TypingReveal::new("안녕!").collect();
        assert_eq!(steps, ["안", "안녕", "안녕!"]);
        assert_eq!(TypingReveal::new("").count(), 0);
    }
}
