//! Playback scheduler: replays a chat script with human-like pacing.
//!
//! The scheduler is an explicit state machine that never sleeps. Each
//! transition returns at most one [`TimerRequest`]; the caller waits for it
//! and hands the token back through [`Scheduler::fire`].
//!
//! # Contracts
//! - **Invariant**: at most one timer is pending (`pending` is an `Option`).
//! - **Invariant**: `state.displayed == messages[..state.cursor]`.
//! - **Invariant**: a typing indicator is set iff the phase is `Typing`.
//! - Tokens that do not match the pending timer are stale and ignored.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::config::PlaybackConfig;
use crate::error::{ReplayError, ReplayResult};
use crate::event::PlaybackEvent;
use crate::script::ScriptStore;
use crate::state::{PlaybackState, TypingIndicator};

/// Resting states of the scheduler. Dispatch and reveal are synchronous
/// steps between them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    LeadIn,
    Typing,
    /// Waiting after a reveal.
    Pause,
    Done,
    /// Fail-stop after a sender lookup failure.
    Halted,
    Cancelled,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Done | Phase::Halted | Phase::Cancelled)
    }
}

/// Identity of a scheduled timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

/// Request to call [`Scheduler::fire`] with `token` after `delay_ms`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerRequest {
    pub token: TimerToken,
    pub delay_ms: u64,
}

/// Result of one scheduler transition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Step {
    pub events: Vec<PlaybackEvent>,
    pub next: Option<TimerRequest>,
}

#[derive(Debug)]
pub struct Scheduler<'a> {
    store: &'a ScriptStore,
    lead_in_ms: u64,
    reveal_pause_ms: u64,
    fallback_typing_delay_ms: u64,
    phase: Phase,
    state: PlaybackState,
    pending: Option<TimerRequest>,
    next_token: u64,
}

impl<'a> Scheduler<'a> {
    pub fn new(store: &'a ScriptStore, config: &PlaybackConfig) -> Self {
        Self {
            store,
            lead_in_ms: config.lead_in_ms,
            reveal_pause_ms: config.reveal_pause_ms,
            fallback_typing_delay_ms: config.fallback_typing_delay_ms,
            phase: Phase::Idle,
            state: PlaybackState::new(),
            pending: None,
            next_token: 0,
        }
    }

    /// Starts the session: `Idle -> LeadIn`.
    #[instrument(skip(self), fields(title = %self.store.title()))]
    pub fn start(&mut self) -> ReplayResult<Step> {
        if self.phase != Phase::Idle {
            return Err(ReplayError::InvalidTransition(format!(
                "start called in phase {:?}",
                self.phase
            )));
        }
        info!(
            messages = self.store.len(),
            lead_in_ms = self.lead_in_ms,
            "playback started"
        );
        self.phase = Phase::LeadIn;
        let events = vec![PlaybackEvent::Started {
            lead_in_ms: self.lead_in_ms,
        }];
        let next = Some(self.schedule(self.lead_in_ms));
        Ok(Step { events, next })
    }

    /// Handles expiry of the pending timer.
    ///
    /// Returns `UnknownSender` and moves to `Halted` if the message at the
    /// cursor has no resolvable sender; nothing is revealed in that case.
    pub fn fire(&mut self, token: TimerToken) -> ReplayResult<Step> {
        match self.pending {
            Some(pending) if pending.token == token => self.pending = None,
            _ => {
                debug!(?token, phase = ?self.phase, "ignoring stale timer");
                return Ok(Step::default());
            }
        }

        let mut step = Step::default();
        match self.phase {
            Phase::LeadIn | Phase::Pause => self.dispatch(&mut step)?,
            Phase::Typing => {
                self.stop_typing(&mut step);
                self.reveal(&mut step);
            }
            phase => {
                return Err(ReplayError::InvalidTransition(format!(
                    "timer fired in phase {phase:?}"
                )))
            }
        }
        step.next = self.pending;
        Ok(step)
    }

    /// Tears the session down. The pending timer is dropped and later
    /// `fire` calls become no-ops.
    pub fn cancel(&mut self) -> Step {
        if self.phase.is_terminal() {
            return Step::default();
        }
        self.pending = None;
        self.state.hide_typing();
        self.phase = Phase::Cancelled;
        info!(cursor = self.state.cursor, "playback cancelled");
        Step {
            events: vec![PlaybackEvent::Cancelled {
                cursor: self.state.cursor,
            }],
            next: None,
        }
    }

    fn dispatch(&mut self, step: &mut Step) -> ReplayResult<()> {
        let store = self.store;
        let index = self.state.cursor;
        let Some(message) = store.messages().get(index) else {
            self.phase = Phase::Done;
            info!(revealed = self.state.displayed.len(), "playback finished");
            step.events.push(PlaybackEvent::Finished {
                revealed: self.state.displayed.len(),
            });
            return Ok(());
        };

        let Some(sender) = store.find_participant(&message.sender_id) else {
            self.phase = Phase::Halted;
            error!(index, sender_id = %message.sender_id, "unknown sender, halting playback");
            return Err(ReplayError::UnknownSender {
                index,
                sender_id: message.sender_id.to_string(),
            });
        };

        if sender.is_self {
            self.reveal(step);
            return Ok(());
        }

        let delay_ms = store.typing_delay_ms(message, self.fallback_typing_delay_ms);
        debug!(index, sender = %sender.name, delay_ms, "typing");
        self.state.show_typing(TypingIndicator {
            sender_id: sender.id.clone(),
            display_name: sender.name.clone(),
        });
        self.phase = Phase::Typing;
        step.events.push(PlaybackEvent::TypingStarted {
            index,
            sender_id: sender.id.clone(),
            display_name: sender.name.clone(),
            delay_ms,
        });
        self.schedule(delay_ms);
        Ok(())
    }

    fn stop_typing(&mut self, step: &mut Step) {
        if let Some(indicator) = self.state.hide_typing() {
            step.events.push(PlaybackEvent::TypingStopped {
                index: self.state.cursor,
                sender_id: indicator.sender_id,
            });
        }
    }

    fn reveal(&mut self, step: &mut Step) {
        let index = self.state.cursor;
        let Some(message) = self.store.messages().get(index).cloned() else {
            return;
        };
        debug!(index, sender_id = %message.sender_id, "reveal");
        self.state.reveal(message.clone());
        step.events
            .push(PlaybackEvent::MessageRevealed { index, message });
        self.phase = Phase::Pause;
        self.schedule(self.reveal_pause_ms);
    }

    fn schedule(&mut self, delay_ms: u64) -> TimerRequest {
        debug_assert!(self.pending.is_none(), "timer already pending");
        self.next_token += 1;
        let request = TimerRequest {
            token: TimerToken(self.next_token),
            delay_ms,
        };
        self.pending = Some(request);
        request
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// The single pending timer, if any.
    pub fn pending(&self) -> Option<TimerRequest> {
        self.pending
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_terminal()
    }
}

#[cfg(test)]
#[path = "tests/scheduler_tests.rs"]
mod tests;
