//! Async driver for the core polling state machine.
//!
//! Commands in, events out, in the shape of an actor: one task owns the
//! [`modelhub_core::ViewerState`] and the single retry-timer handle, and
//! executes the effects the pure `update` function emits.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hub_logging::hub_debug;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use modelhub_core::{update, Effect, Msg, Notice, TranslationStatus, ViewerState};

use crate::BackendError;

/// Where the driver gets translation statuses from. Implemented by
/// [`crate::DerivativeClient`]; tests substitute scripted fakes.
#[async_trait]
pub trait StatusSource: Send + Sync + 'static {
    async fn status(&self, urn: &str) -> Result<TranslationStatus, BackendError>;
}

/// Outbound UI-facing events emitted by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEvent {
    Notice(Notice),
    NoticeCleared,
    FragmentChanged(Option<String>),
    LoadModel { urn: String },
}

enum SessionCommand {
    Select { urn: String },
    Clear,
}

/// Handle used to steer a running poll session.
#[derive(Clone)]
pub struct PollHandle {
    cmd_tx: mpsc::UnboundedSender<SessionCommand>,
}

impl PollHandle {
    /// Makes `urn` the polled subject, superseding any previous one.
    pub fn select(&self, urn: impl Into<String>) {
        let _ = self.cmd_tx.send(SessionCommand::Select { urn: urn.into() });
    }

    /// Clears the selection and cancels any pending retry.
    pub fn clear(&self) {
        let _ = self.cmd_tx.send(SessionCommand::Clear);
    }
}

/// A poll session: one per (viewer instance, subject) pair.
pub struct PollSession;

impl PollSession {
    /// Spawns the session task. Dropping the handle (and every clone)
    /// ends the session and aborts any pending timer.
    pub fn spawn<S: StatusSource>(
        source: Arc<S>,
        retry_delay: Duration,
    ) -> (PollHandle, mpsc::UnboundedReceiver<PollEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        tokio::spawn(run_session(source, retry_delay, cmd_rx, event_tx));
        (PollHandle { cmd_tx }, event_rx)
    }
}

async fn run_session<S: StatusSource>(
    source: Arc<S>,
    retry_delay: Duration,
    mut cmd_rx: mpsc::UnboundedReceiver<SessionCommand>,
    event_tx: mpsc::UnboundedSender<PollEvent>,
) {
    let (msg_tx, mut msg_rx) = mpsc::unbounded_channel::<Msg>();
    let mut state = ViewerState::with_retry_delay(retry_delay);
    // The one pending re-query timer; Effect::CancelRetryTimer aborts it.
    let mut timer: Option<JoinHandle<()>> = None;

    loop {
        let msg = tokio::select! {
            cmd = cmd_rx.recv() => match cmd {
                Some(SessionCommand::Select { urn }) => Msg::SubjectSelected { urn },
                Some(SessionCommand::Clear) => Msg::SubjectCleared,
                None => break,
            },
            msg = msg_rx.recv() => match msg {
                Some(msg) => msg,
                None => break,
            },
        };

        let (next, effects) = update(state, msg);
        state = next;

        for effect in effects {
            match effect {
                Effect::CancelRetryTimer => {
                    if let Some(handle) = timer.take() {
                        handle.abort();
                    }
                }
                Effect::QueryStatus { urn } => {
                    // Queries run detached so a slow response never blocks a
                    // subject switch; late results die in the stale guard.
                    let source = source.clone();
                    let msg_tx = msg_tx.clone();
                    tokio::spawn(async move {
                        let msg = match source.status(&urn).await {
                            Ok(status) => Msg::StatusArrived { urn, status },
                            Err(err) => Msg::QueryFailed {
                                urn,
                                error: err.to_string(),
                            },
                        };
                        let _ = msg_tx.send(msg);
                    });
                }
                Effect::ArmRetryTimer { urn, delay } => {
                    if let Some(handle) = timer.take() {
                        handle.abort();
                    }
                    hub_debug!("Arming re-query timer for {} ({:?})", urn, delay);
                    let msg_tx = msg_tx.clone();
                    timer = Some(tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        let _ = msg_tx.send(Msg::RetryTimerFired { urn });
                    }));
                }
                Effect::UpdateFragment { urn } => {
                    let _ = event_tx.send(PollEvent::FragmentChanged(urn));
                }
                Effect::ShowNotice(notice) => {
                    let _ = event_tx.send(PollEvent::Notice(notice));
                }
                Effect::ClearNotice => {
                    let _ = event_tx.send(PollEvent::NoticeCleared);
                }
                Effect::LoadViewer { urn } => {
                    let _ = event_tx.send(PollEvent::LoadModel { urn });
                }
            }
        }
    }

    if let Some(handle) = timer.take() {
        handle.abort();
    }
}
