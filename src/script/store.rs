use std::collections::HashMap;

use tracing::debug;

use crate::error::ReplayResult;
use crate::message::{Message, Participant, SharedStr};
use crate::policy::ScriptPolicy;
use crate::resource::ResourceLimiter;

use super::raw::ScriptRaw;

/// Immutable, validated chat script with participant lookup by id.
#[derive(Clone, Debug)]
pub struct ScriptStore {
    title: SharedStr,
    default_typing_delay_ms: Option<u64>,
    participants: Vec<Participant>,
    index: HashMap<SharedStr, usize>,
    messages: Vec<Message>,
}

impl ScriptStore {
    /// Validates and loads a raw script. Any dangling sender reference aborts the load.
    pub fn load(
        script: ScriptRaw,
        policy: &ScriptPolicy,
        limits: ResourceLimiter,
    ) -> ReplayResult<Self> {
        policy.validate_raw(&script, limits)?;
        let store = script.compile(policy)?;
        debug!(
            title = %store.title,
            participants = store.participants.len(),
            messages = store.messages.len(),
            "script loaded"
        );
        Ok(store)
    }

    /// Parses and loads a JSON script with the default policy and limits.
    pub fn from_json(input: &str) -> ReplayResult<Self> {
        let limits = ResourceLimiter::default();
        let script = ScriptRaw::from_json_with_limits(input, limits)?;
        Self::load(script, &ScriptPolicy::default(), limits)
    }

    pub(crate) fn from_parts(
        title: SharedStr,
        default_typing_delay_ms: Option<u64>,
        participants: Vec<Participant>,
        index: HashMap<SharedStr, usize>,
        messages: Vec<Message>,
    ) -> Self {
        Self {
            title,
            default_typing_delay_ms,
            participants,
            index,
            messages,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn default_typing_delay_ms(&self) -> Option<u64> {
        self.default_typing_delay_ms
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Looks up a participant by id.
    pub fn find_participant(&self, id: &str) -> Option<&Participant> {
        self.index
            .get(id)
            .and_then(|position| self.participants.get(*position))
    }

    /// Resolves the sender of the message at `index`.
    pub fn sender_of(&self, index: usize) -> Option<&Participant> {
        self.messages
            .get(index)
            .and_then(|message| self.find_participant(&message.sender_id))
    }

    /// Effective typing delay: message override, then script default, then `fallback_ms`.
    pub fn typing_delay_ms(&self, message: &Message, fallback_ms: u64) -> u64 {
        message
            .typing_delay_ms
            .or(self.default_typing_delay_ms)
            .unwrap_or(fallback_ms)
    }
}
