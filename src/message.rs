//! Participant and message definitions for raw and loaded scripts.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::resource::StringBudget;

/// Shared string storage used by loaded scripts.
pub type SharedStr = Arc<str>;

/// Conversation member in raw form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(rename_all = "camelCase")]
pub struct ParticipantRaw {
    pub id: String,
    pub name: String,
    /// Marks the local user: right-aligned, never shown typing.
    #[serde(default)]
    pub is_self: bool,
}

/// Scripted chat line in raw form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(rename_all = "camelCase")]
pub struct MessageRaw {
    pub sender_id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typing_delay_ms_override: Option<i64>,
}

impl StringBudget for ParticipantRaw {
    fn string_bytes(&self) -> usize {
        self.id.len().saturating_add(self.name.len())
    }
}

impl StringBudget for MessageRaw {
    fn string_bytes(&self) -> usize {
        self.sender_id.len().saturating_add(self.text.len())
    }
}

/// Validated participant with interned strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: SharedStr,
    pub name: SharedStr,
    pub is_self: bool,
}

/// Validated message. `typing_delay_ms` is the per-message override, already
/// checked to be non-negative.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender_id: SharedStr,
    pub text: SharedStr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typing_delay_ms: Option<u64>,
}
