//! Observable playback state owned by the scheduler.

use serde::{Deserialize, Serialize};

use crate::message::{Message, SharedStr};

/// "Someone is composing" signal for a non-self participant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingIndicator {
    pub sender_id: SharedStr,
    pub display_name: SharedStr,
}

/// Revealed messages, the active typing indicator and the next message index.
///
/// `displayed` always equals the first `cursor` messages of the script.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub displayed: Vec<Message>,
    pub typing_indicator: Option<TypingIndicator>,
    pub cursor: usize,
}

impl PlaybackState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the message at the cursor and advances it.
    pub(crate) fn reveal(&mut self, message: Message) {
        self.displayed.push(message);
        self.cursor += 1;
    }

    pub(crate) fn show_typing(&mut self, indicator: TypingIndicator) {
        self.typing_indicator = Some(indicator);
    }

    pub(crate) fn hide_typing(&mut self) -> Option<TypingIndicator> {
        self.typing_indicator.take()
    }

    /// Texts of the displayed messages, in order.
    pub fn displayed_texts(&self) -> Vec<&str> {
        self.displayed
            .iter()
            .map(|message| message.text.as_ref())
            .collect()
    }
}
