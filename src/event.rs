//! Observable transitions emitted by the playback scheduler.

use serde::{Deserialize, Serialize};

use crate::message::{Message, SharedStr};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlaybackEvent {
    /// Session started; the lead-in pause is pending.
    Started { lead_in_ms: u64 },
    TypingStarted {
        index: usize,
        sender_id: SharedStr,
        display_name: SharedStr,
        delay_ms: u64,
    },
    TypingStopped { index: usize, sender_id: SharedStr },
    MessageRevealed { index: usize, message: Message },
    /// Script exhausted.
    Finished { revealed: usize },
    /// Session torn down before the script finished.
    Cancelled { cursor: usize },
}

impl PlaybackEvent {
    /// Serializes the event to JSON.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "null".to_string())
    }
}
