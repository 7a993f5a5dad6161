//! Chat composer: `Idle → Sending → Idle`.
//!
//! Enter submits and Shift+Enter inserts a newline. While a send is in
//! flight, further submits are refused. A failed send restores the text
//! that was being sent.

use crate::effect::{Effect, Notification, Slot};

pub const SUBMIT_LABEL: &str = "전송 ✈️";
pub const SENDING_LABEL: &str = "전송 중... 🚀";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComposerState {
    #[default]
    Idle,
    Sending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Submit,
    Newline,
}

#[derive(Debug, Default)]
pub struct Composer {
    text: String,
    state: ComposerState,
    in_flight: Option<String>,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ComposerState {
        self.state
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Enter pressed in the textarea.
    pub fn key_enter(&mut self, shift: bool) -> KeyOutcome {
        if shift {
            self.text.push('\n');
            KeyOutcome::Newline
        } else {
            KeyOutcome::Submit
        }
    }

    /// Start a send. Returns the trimmed body and the effects for the
    /// sending state, or `None` when there is nothing to send or a send is
    /// already running.
    pub fn begin_send(&mut self, ask_ai: bool) -> Option<(String, Vec<Effect>)> {
        if self.state == ComposerState::Sending {
            return None;
        }
        let body = self.text.trim();
        if body.is_empty() {
            return None;
        }
        let body = body.to_string();

        self.in_flight = Some(std::mem::take(&mut self.text));
        self.state = ComposerState::Sending;

        let mut effects = vec![
            Effect::SetValue { slot: Slot::ChatInput, value: String::new() },
            Effect::SetText { slot: Slot::ChatSubmit, text: SENDING_LABEL.into() },
            Effect::SetDisabled { slot: Slot::ChatSubmit, disabled: true },
        ];
        if ask_ai {
            effects.push(Effect::SetVisible { slot: Slot::TypingIndicator, visible: true });
        }
        Some((body, effects))
    }

    pub fn finish_ok(&mut self) -> Vec<Effect> {
        self.state = ComposerState::Idle;
        self.in_flight = None;
        Self::button_reset()
    }

    /// Back to idle with the unsent text restored.
    pub fn finish_err(&mut self, message: &str) -> Vec<Effect> {
        self.state = ComposerState::Idle;
        if let Some(unsent) = self.in_flight.take() {
            if self.text.is_empty() {
                self.text = unsent;
            }
        }

        let mut effects = vec![
            Effect::SetVisible { slot: Slot::TypingIndicator, visible: false },
            Effect::SetValue { slot: Slot::ChatInput, value: self.text.clone() },
        ];
        effects.extend(Self::button_reset());
        effects.push(Effect::Notify(Notification::failure(message)));
        effects
    }

    fn button_reset() -> Vec<Effect> {
        vec![
            Effect::SetText { slot: Slot::ChatSubmit, text: SUBMIT_LABEL.into() },
            Effect::SetDisabled { slot: Slot::ChatSubmit, disabled: false },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_does_not_send() {
        let mut composer = Composer::new();
        composer.set_text("   \n\t ");
        assert!(composer.begin_send(true).is_none());
        assert_eq!(composer.state(), ComposerState::Idle);
    }

    #[test]
    fn shift_enter_inserts_newline() {
        let mut composer = Composer::new();
        composer.set_text("line one");
        assert_eq!(composer.key_enter(true), KeyOutcome::Newline);
        assert_eq!(composer.text(), "line one\n");
        assert_eq!(composer.key_enter(false), KeyOutcome::Submit);
    }

    #[test]
    fn send_cycle_success() {
        let mut composer = Composer::new();
        composer.set_text("  hello  ");

        let (body, effects) = composer.begin_send(false).unwrap();
        assert_eq!(body, "hello");
        assert_eq!(composer.state(), ComposerState::Sending);
        assert_eq!(composer.text(), "");
        assert!(effects.contains(&Effect::SetDisabled { slot: Slot::ChatSubmit, disabled: true }));
        assert!(!effects.iter().any(|e| matches!(e, Effect::SetVisible { .. })));

        composer.finish_ok();
        assert_eq!(composer.state(), ComposerState::Idle);
        assert_eq!(composer.text(), "");
    }

    #[test]
    fn second_submit_while_sending_is_refused() {
        let mut composer = Composer::new();
        composer.set_text("one");
        composer.begin_send(true).unwrap();

        composer.set_text("two");
        assert!(composer.begin_send(true).is_none());
    }

    #[test]
    fn failure_restores_text_and_reenables_button() {
        let mut composer = Composer::new();
        composer.set_text("hello");
        composer.begin_send(true).unwrap();

        let effects = composer.finish_err("요청 실패");
        assert_eq!(composer.state(), ComposerState::Idle);
        assert_eq!(composer.text(), "hello");
        assert!(effects.contains(&Effect::SetValue { slot: Slot::ChatInput, value: "hello".into() }));
        assert!(effects.contains(&Effect::SetDisabled { slot: Slot::ChatSubmit, disabled: false }));
        assert!(effects.contains(&Effect::Notify(Notification::error("❌ 요청 실패"))));
    }
}
