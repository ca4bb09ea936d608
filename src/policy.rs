//! Load-time policy validation for chat scripts.

use std::collections::HashSet;

use crate::error::{ReplayError, ReplayResult};
use crate::resource::ResourceLimiter;
use crate::script::ScriptRaw;

/// Policy used to validate script content before loading.
#[derive(Clone, Debug, Default)]
pub struct ScriptPolicy {
    /// Reject messages whose text is empty or whitespace.
    pub reject_empty_text: bool,
    /// Clamp negative delays to zero instead of rejecting the script.
    pub clamp_negative_delays: bool,
}

impl ScriptPolicy {
    /// Validates a raw script against policy and resource limits.
    ///
    /// Sender references are resolved later, during loading.
    pub fn validate_raw(&self, script: &ScriptRaw, limits: ResourceLimiter) -> ReplayResult<()> {
        if script.messages.len() > limits.max_messages {
            return Err(ReplayError::ResourceLimit("message count".to_string()));
        }
        if script.participants.len() > limits.max_participants {
            return Err(ReplayError::ResourceLimit("participant count".to_string()));
        }
        if script.title.len() > limits.max_text_length {
            return Err(ReplayError::ResourceLimit("chat title".to_string()));
        }

        let mut seen = HashSet::with_capacity(script.participants.len());
        for participant in &script.participants {
            if participant.id.trim().is_empty() {
                return Err(ReplayError::InvalidScript(
                    "participant id cannot be empty".to_string(),
                ));
            }
            if participant.id.len() > limits.max_name_length {
                return Err(ReplayError::ResourceLimit(format!(
                    "participant id '{}' too long",
                    participant.id
                )));
            }
            if participant.name.len() > limits.max_name_length {
                return Err(ReplayError::ResourceLimit(format!(
                    "participant name for '{}' too long",
                    participant.id
                )));
            }
            if !seen.insert(participant.id.as_str()) {
                return Err(ReplayError::InvalidScript(format!(
                    "duplicate participant id '{}'",
                    participant.id
                )));
            }
        }

        if let Some(delay) = script.default_typing_delay_ms {
            self.resolve_delay("defaultTypingDelayMs", delay)?;
        }

        for (index, message) in script.messages.iter().enumerate() {
            if message.text.len() > limits.max_text_length {
                return Err(ReplayError::ResourceLimit(format!(
                    "message {index} text"
                )));
            }
            if self.reject_empty_text && message.text.trim().is_empty() {
                return Err(ReplayError::InvalidScript(format!(
                    "message {index} text cannot be empty"
                )));
            }
            if let Some(delay) = message.typing_delay_ms_override {
                self.resolve_delay(
                    &format!("messages[{index}].typingDelayMsOverride"),
                    delay,
                )?;
            }
        }
        Ok(())
    }

    /// Converts a scripted delay into milliseconds, applying the negative-delay rule.
    pub fn resolve_delay(&self, field: &str, value: i64) -> ReplayResult<u64> {
        match u64::try_from(value) {
            Ok(ms) => Ok(ms),
            Err(_) if self.clamp_negative_delays => Ok(0),
            Err(_) => Err(ReplayError::InvalidDelay {
                field: field.to_string(),
                value,
            }),
        }
    }
}
