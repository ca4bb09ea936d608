//! Rendering helpers for playback snapshots.

use crate::script::ScriptStore;
use crate::session::PlaybackSnapshot;

/// Renderer interface consuming scheduler output.
pub trait RenderBackend {
    fn render(&self, snapshot: &PlaybackSnapshot, store: &ScriptStore) -> RenderOutput;
}

/// Rendered text output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOutput {
    pub text: String,
}

/// Simple renderer that formats a chat transcript as text.
#[derive(Clone, Debug, Default)]
pub struct TextRenderer;

impl RenderBackend for TextRenderer {
    fn render(&self, snapshot: &PlaybackSnapshot, store: &ScriptStore) -> RenderOutput {
        let mut lines = Vec::with_capacity(snapshot.displayed.len() + 1);
        for message in &snapshot.displayed {
            let line = match store.find_participant(&message.sender_id) {
                Some(sender) if sender.is_self => format!("> {}", message.text),
                Some(sender) => format!(
                    "[{}] {}: {}",
                    initials(&sender.name),
                    sender.name,
                    message.text
                ),
                None => format!("{}: {}", message.sender_id, message.text),
            };
            lines.push(line);
        }
        if let Some(typing) = &snapshot.typing_indicator {
            lines.push(format!("{} is typing…", typing.display_name));
        }
        RenderOutput {
            text: lines.join("\n"),
        }
    }
}

/// Avatar badge text: first letter of up to two words, uppercased.
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect()
}
