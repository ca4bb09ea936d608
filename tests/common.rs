#![allow(dead_code)]

use chat_replay::{PlaybackEvent, PlaybackTrace, ScriptStore};

/// Alice (other side) says "hi", Bob (self) answers "hey".
pub const ALICE_BOB_JSON: &str = r#"{
    "chatTitle": "Weekend plans",
    "defaultTypingDelayMs": 2000,
    "participants": [
        { "id": "A", "name": "Alice" },
        { "id": "B", "name": "Bob", "isSelf": true }
    ],
    "messages": [
        { "senderId": "A", "text": "hi" },
        { "senderId": "B", "text": "hey" }
    ]
}"#;

pub const GROUP_JSON: &str = r#"{
    "scriptSchemaVersion": "1.0",
    "chatTitle": "Launch crew",
    "participants": [
        { "id": "me", "name": "Sam", "isSelf": true },
        { "id": "kim", "name": "Kim Lee" },
        { "id": "raj", "name": "Raj" }
    ],
    "messages": [
        { "senderId": "kim", "text": "deploy is green", "typingDelayMsOverride": 800 },
        { "senderId": "raj", "text": "nice" },
        { "senderId": "me", "text": "shipping it" },
        { "senderId": "me", "text": "now" },
        { "senderId": "kim", "text": "🚀", "typingDelayMsOverride": 0 }
    ]
}"#;

pub fn load(json: &str) -> ScriptStore {
    ScriptStore::from_json(json).expect("load script")
}

/// Revealed texts in the order they appear in the trace.
pub fn revealed_texts(trace: &PlaybackTrace) -> Vec<String> {
    trace
        .entries
        .iter()
        .filter_map(|entry| match &entry.event {
            PlaybackEvent::MessageRevealed { message, .. } => Some(message.text.to_string()),
            _ => None,
        })
        .collect()
}
