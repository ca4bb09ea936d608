//! Headless playback on a virtual millisecond clock.
//!
//! Produces the same transitions as a real session, stamped with the script
//! time at which each one happens.

use serde::{Deserialize, Serialize};

use crate::config::PlaybackConfig;
use crate::error::{ReplayError, ReplayResult};
use crate::event::PlaybackEvent;
use crate::scheduler::Scheduler;
use crate::script::ScriptStore;
use crate::state::PlaybackState;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub at_ms: u64,
    pub event: PlaybackEvent,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackTrace {
    pub entries: Vec<TraceEntry>,
    /// Script time at which the last transition happened.
    pub total_ms: u64,
    pub final_state: PlaybackState,
}

impl PlaybackTrace {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Timestamp of the first entry matching `predicate`.
    pub fn first_at<F>(&self, predicate: F) -> Option<u64>
    where
        F: Fn(&PlaybackEvent) -> bool,
    {
        self.entries
            .iter()
            .find(|entry| predicate(&entry.event))
            .map(|entry| entry.at_ms)
    }

    pub fn to_json(&self) -> ReplayResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ReplayError::Serialization {
            message: e.to_string(),
            src: "".to_string(),
            span: (0, 0).into(),
        })
    }
}

/// Runs a full playback without sleeping and records every transition.
pub fn simulate(store: &ScriptStore, config: &PlaybackConfig) -> ReplayResult<PlaybackTrace> {
    let mut scheduler = Scheduler::new(store, config);
    let mut now_ms = 0u64;
    let mut entries = Vec::new();
    let mut step = scheduler.start()?;
    loop {
        entries.extend(step.events.into_iter().map(|event| TraceEntry {
            at_ms: now_ms,
            event,
        }));
        let Some(timer) = step.next else {
            break;
        };
        now_ms = now_ms.saturating_add(timer.delay_ms);
        step = scheduler.fire(timer.token)?;
    }
    Ok(PlaybackTrace {
        entries,
        total_ms: now_ms,
        final_state: scheduler.state().clone(),
    })
}
