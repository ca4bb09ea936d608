use std::collections::HashMap;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ReplayError, ReplayResult};
use crate::message::{Message, MessageRaw, Participant, ParticipantRaw, SharedStr};
use crate::policy::ScriptPolicy;
use crate::resource::{ResourceLimiter, StringBudget};
use crate::version::SCRIPT_SCHEMA_VERSION;

use super::store::ScriptStore;

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct ScriptEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    script_schema_version: Option<String>,
    #[serde(default)]
    chat_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_typing_delay_ms: Option<i64>,
    #[serde(default)]
    participants: Vec<ParticipantRaw>,
    #[serde(default)]
    messages: Vec<MessageRaw>,
}

/// JSON-facing chat script with unresolved sender references.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct ScriptRaw {
    pub title: String,
    pub default_typing_delay_ms: Option<i64>,
    pub participants: Vec<ParticipantRaw>,
    pub messages: Vec<MessageRaw>,
}

impl ScriptRaw {
    /// Creates a raw script from participants and messages.
    pub fn new(
        title: impl Into<String>,
        participants: Vec<ParticipantRaw>,
        messages: Vec<MessageRaw>,
    ) -> Self {
        Self {
            title: title.into(),
            default_typing_delay_ms: None,
            participants,
            messages,
        }
    }

    /// Sets the script-wide typing delay.
    pub fn with_default_typing_delay(mut self, delay_ms: i64) -> Self {
        self.default_typing_delay_ms = Some(delay_ms);
        self
    }

    /// Parses a JSON script into a raw script structure.
    pub fn from_json(input: &str) -> ReplayResult<Self> {
        Self::from_json_with_limits(input, ResourceLimiter::default())
    }

    /// Parses a JSON script into a raw script structure with resource limits.
    pub fn from_json_with_limits(input: &str, limits: ResourceLimiter) -> ReplayResult<Self> {
        if input.len() > limits.max_script_bytes {
            return Err(ReplayError::ResourceLimit("script document size".to_string()));
        }
        let envelope: ScriptEnvelope =
            serde_json::from_str(input).map_err(|err| json_deserialize_error(input, &err))?;
        if let Some(version) = envelope.script_schema_version.as_deref() {
            if version != SCRIPT_SCHEMA_VERSION {
                return Err(ReplayError::InvalidScript(format!(
                    "schema incompatible: found {version}, expected {SCRIPT_SCHEMA_VERSION}"
                )));
            }
        }
        let script = Self {
            title: envelope.chat_title,
            default_typing_delay_ms: envelope.default_typing_delay_ms,
            participants: envelope.participants,
            messages: envelope.messages,
        };
        script.ensure_string_budget(limits.max_script_bytes)?;
        Ok(script)
    }

    /// Serializes the script to a JSON string with the current schema version.
    pub fn to_json(&self) -> ReplayResult<String> {
        let envelope = ScriptEnvelope {
            script_schema_version: Some(SCRIPT_SCHEMA_VERSION.to_string()),
            chat_title: self.title.clone(),
            default_typing_delay_ms: self.default_typing_delay_ms,
            participants: self.participants.clone(),
            messages: self.messages.clone(),
        };
        serde_json::to_string_pretty(&envelope).map_err(|e| ReplayError::Serialization {
            message: e.to_string(),
            src: "".to_string(),
            span: (0, 0).into(),
        })
    }

    pub fn ensure_string_budget(&self, max_bytes: usize) -> ReplayResult<()> {
        let mut total = self.title.len();
        for participant in &self.participants {
            total = total.saturating_add(participant.string_bytes());
        }
        if total > max_bytes {
            return Err(ReplayError::ResourceLimit(
                "script string budget (participants)".to_string(),
            ));
        }
        for message in &self.messages {
            total = total.saturating_add(message.string_bytes());
            if total > max_bytes {
                return Err(ReplayError::ResourceLimit("script string budget".to_string()));
            }
        }
        Ok(())
    }

    /// Resolves sender references and interns repeated strings.
    ///
    /// Call `ScriptPolicy::validate_raw` first, or use `ScriptStore::load`.
    pub fn compile(&self, policy: &ScriptPolicy) -> ReplayResult<ScriptStore> {
        let mut pool = StringPool::default();
        let mut index: HashMap<SharedStr, usize> = HashMap::with_capacity(self.participants.len());
        let mut participants = Vec::with_capacity(self.participants.len());

        for raw in &self.participants {
            let id = pool.intern(&raw.id);
            if index.insert(id.clone(), participants.len()).is_some() {
                return Err(ReplayError::InvalidScript(format!(
                    "duplicate participant id '{}'",
                    raw.id
                )));
            }
            participants.push(Participant {
                id,
                name: pool.intern(&raw.name),
                is_self: raw.is_self,
            });
        }

        let default_typing_delay_ms = self
            .default_typing_delay_ms
            .map(|delay| policy.resolve_delay("defaultTypingDelayMs", delay))
            .transpose()?;

        let messages = self
            .messages
            .iter()
            .enumerate()
            .map(|(position, raw)| {
                if !index.contains_key(raw.sender_id.as_str()) {
                    return Err(ReplayError::UnknownSender {
                        index: position,
                        sender_id: raw.sender_id.clone(),
                    });
                }
                let typing_delay_ms = raw
                    .typing_delay_ms_override
                    .map(|delay| {
                        policy.resolve_delay(
                            &format!("messages[{position}].typingDelayMsOverride"),
                            delay,
                        )
                    })
                    .transpose()?;
                Ok(Message {
                    sender_id: pool.intern(&raw.sender_id),
                    text: pool.intern(&raw.text),
                    typing_delay_ms,
                })
            })
            .collect::<ReplayResult<Vec<_>>>()?;

        Ok(ScriptStore::from_parts(
            pool.intern(&self.title),
            default_typing_delay_ms,
            participants,
            index,
            messages,
        ))
    }
}

/// JSON Schema of the script document, pretty-printed.
pub fn script_json_schema() -> ReplayResult<String> {
    let schema = schemars::schema_for!(ScriptEnvelope);
    serde_json::to_string_pretty(&schema).map_err(|e| ReplayError::Serialization {
        message: e.to_string(),
        src: "".to_string(),
        span: (0, 0).into(),
    })
}

#[cold]
#[inline(never)]
fn json_deserialize_error(input: &str, err: &serde_json::Error) -> ReplayError {
    let (offset, length) = json_error_span(input, err);
    let (window, local_offset) = json_error_window(input, offset, length);
    let max_len = window.len().saturating_sub(local_offset);
    let span_len = if max_len == 0 { 0 } else { length.min(max_len) };
    ReplayError::Serialization {
        message: err.to_string(),
        src: window,
        span: (local_offset, span_len).into(),
    }
}

#[cold]
#[inline(never)]
fn json_error_span(input: &str, error: &serde_json::Error) -> (usize, usize) {
    let line = error.line();
    let column = error.column();
    if line == 0 || column == 0 {
        return (0, 1);
    }
    let mut current_line = 1usize;
    let mut offset = 0usize;
    for chunk in input.split_inclusive('\n') {
        if current_line == line {
            let byte_index = chunk
                .char_indices()
                .nth(column.saturating_sub(1))
                .map(|(idx, _)| idx)
                .unwrap_or(chunk.len().saturating_sub(1));
            return (offset + byte_index, 1);
        }
        offset += chunk.len();
        current_line += 1;
    }
    (input.len().saturating_sub(1), 1)
}

#[cold]
#[inline(never)]
fn json_error_window(input: &str, offset: usize, length: usize) -> (String, usize) {
    const CONTEXT: usize = 160;
    let mut start = offset.saturating_sub(CONTEXT);
    let mut end = (offset + length + CONTEXT).min(input.len());
    while start > 0 && !input.is_char_boundary(start) {
        start = start.saturating_sub(1);
    }
    while end < input.len() && !input.is_char_boundary(end) {
        end = end.saturating_add(1).min(input.len());
    }
    (input[start..end].to_string(), offset.saturating_sub(start))
}

#[derive(Default)]
struct StringPool {
    cache: HashMap<String, SharedStr>,
}

impl StringPool {
    fn intern(&mut self, value: &str) -> SharedStr {
        if let Some(existing) = self.cache.get(value) {
            return existing.clone();
        }
        let shared: SharedStr = Arc::from(value);
        self.cache.insert(value.to_string(), shared.clone());
        shared
    }
}
