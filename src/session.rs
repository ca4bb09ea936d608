//! Real-time playback session driven by the tokio clock.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::PlaybackConfig;
use crate::error::{ReplayError, ReplayResult};
use crate::message::Message;
use crate::scheduler::{Phase, Scheduler};
use crate::script::ScriptStore;
use crate::state::TypingIndicator;

/// Observable state published after every transition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlaybackSnapshot {
    pub phase: Phase,
    pub cursor: usize,
    pub displayed: Vec<Message>,
    pub typing_indicator: Option<TypingIndicator>,
}

impl PlaybackSnapshot {
    fn capture(scheduler: &Scheduler<'_>) -> Self {
        let state = scheduler.state();
        Self {
            phase: scheduler.phase(),
            cursor: state.cursor,
            displayed: state.displayed.clone(),
            typing_indicator: state.typing_indicator.clone(),
        }
    }
}

pub struct PlaybackSession;

impl PlaybackSession {
    /// Spawns playback on the current tokio runtime.
    pub fn spawn(store: Arc<ScriptStore>, config: PlaybackConfig) -> SessionHandle {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (snapshot_tx, snapshot_rx) = watch::channel(PlaybackSnapshot::default());
        let task = tokio::spawn(run_session(store, config, cancel_rx, snapshot_tx));
        SessionHandle {
            cancel_tx,
            snapshot_rx,
            task: Some(task),
        }
    }
}

/// Handle for observing and tearing down a running session.
///
/// Dropping the handle cancels the session.
pub struct SessionHandle {
    cancel_tx: watch::Sender<bool>,
    snapshot_rx: watch::Receiver<PlaybackSnapshot>,
    task: Option<JoinHandle<ReplayResult<PlaybackSnapshot>>>,
}

impl SessionHandle {
    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Cancels the pending timer and waits for the session task to exit.
    pub async fn cancel(mut self) -> ReplayResult<PlaybackSnapshot> {
        let _ = self.cancel_tx.send(true);
        self.join().await
    }

    /// Waits for the script to finish.
    pub async fn wait(mut self) -> ReplayResult<PlaybackSnapshot> {
        self.join().await
    }

    async fn join(&mut self) -> ReplayResult<PlaybackSnapshot> {
        let task = self.task.take().ok_or(ReplayError::SessionClosed)?;
        task.await.map_err(|err| {
            warn!(%err, "playback task failed");
            ReplayError::SessionClosed
        })?
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        let _ = self.cancel_tx.send(true);
    }
}

async fn run_session(
    store: Arc<ScriptStore>,
    config: PlaybackConfig,
    mut cancel_rx: watch::Receiver<bool>,
    snapshot_tx: watch::Sender<PlaybackSnapshot>,
) -> ReplayResult<PlaybackSnapshot> {
    let mut scheduler = Scheduler::new(&store, &config);
    let mut step = scheduler.start()?;
    publish(&snapshot_tx, &scheduler);

    while let Some(timer) = step.next {
        let delay = config.effective_delay(timer.delay_ms);
        tokio::select! {
            biased;
            _ = cancelled(&mut cancel_rx) => {
                scheduler.cancel();
                publish(&snapshot_tx, &scheduler);
                return Ok(PlaybackSnapshot::capture(&scheduler));
            }
            _ = tokio::time::sleep(delay) => {}
        }
        step = match scheduler.fire(timer.token) {
            Ok(step) => step,
            Err(err) => {
                publish(&snapshot_tx, &scheduler);
                return Err(err);
            }
        };
        for event in &step.events {
            debug!(event = %event.to_json_string(), "transition");
        }
        publish(&snapshot_tx, &scheduler);
    }

    info!(phase = ?scheduler.phase(), "session ended");
    Ok(PlaybackSnapshot::capture(&scheduler))
}

fn publish(tx: &watch::Sender<PlaybackSnapshot>, scheduler: &Scheduler<'_>) {
    tx.send_replace(PlaybackSnapshot::capture(scheduler));
}

/// Resolves once cancellation is requested or the handle is gone.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            return;
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
