use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use modelhub_core::{Notice, TranslationStatus};
use modelhub_engine::{BackendError, PollEvent, PollSession, StatusSource};
use pretty_assertions::assert_eq;
use tokio::sync::mpsc;

const RETRY_DELAY: Duration = Duration::from_millis(5000);
const RECV_TIMEOUT: Duration = Duration::from_secs(60);

/// Scripted status source: pops one response per query and records which
/// subject each query was for.
struct ScriptedSource {
    script: Mutex<VecDeque<Result<TranslationStatus, BackendError>>>,
    queried: Mutex<Vec<String>>,
}

impl ScriptedSource {
    fn new(script: Vec<Result<TranslationStatus, BackendError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            queried: Mutex::new(Vec::new()),
        })
    }

    fn queried(&self) -> Vec<String> {
        self.queried.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatusSource for ScriptedSource {
    async fn status(&self, urn: &str) -> Result<TranslationStatus, BackendError> {
        self.queried.lock().unwrap().push(urn.to_string());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(TranslationStatus::Complete))
    }
}

fn in_progress(text: &str) -> Result<TranslationStatus, BackendError> {
    Ok(TranslationStatus::InProgress {
        progress: text.to_string(),
    })
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<PollEvent>) -> PollEvent {
    tokio::time::timeout(RECV_TIMEOUT, rx.recv())
        .await
        .expect("event within the timeout")
        .expect("session alive")
}

#[tokio::test(start_paused = true)]
async fn in_progress_script_polls_three_times_and_loads_once() {
    let source = ScriptedSource::new(vec![
        in_progress("25% complete"),
        in_progress("80% complete"),
        Ok(TranslationStatus::Complete),
    ]);
    let (handle, mut events) = PollSession::spawn(source.clone(), RETRY_DELAY);

    handle.select("urn-a");

    assert_eq!(
        next_event(&mut events).await,
        PollEvent::FragmentChanged(Some("urn-a".to_string()))
    );
    assert_eq!(
        next_event(&mut events).await,
        PollEvent::Notice(Notice::Progress("25% complete".to_string()))
    );
    // The paused clock advances past the retry delay while we wait.
    assert_eq!(
        next_event(&mut events).await,
        PollEvent::Notice(Notice::Progress("80% complete".to_string()))
    );
    assert_eq!(next_event(&mut events).await, PollEvent::NoticeCleared);
    assert_eq!(
        next_event(&mut events).await,
        PollEvent::LoadModel {
            urn: "urn-a".to_string(),
        }
    );

    // Exactly one query per scripted status: the initial one plus one per
    // armed timer.
    assert_eq!(source.queried(), vec!["urn-a", "urn-a", "urn-a"]);
}

#[tokio::test(start_paused = true)]
async fn switching_subject_cancels_the_pending_timer() {
    let source = ScriptedSource::new(vec![
        in_progress("10% complete"),
        Ok(TranslationStatus::Complete),
    ]);
    let (handle, mut events) = PollSession::spawn(source.clone(), RETRY_DELAY);

    handle.select("urn-old");
    assert_eq!(
        next_event(&mut events).await,
        PollEvent::FragmentChanged(Some("urn-old".to_string()))
    );
    assert_eq!(
        next_event(&mut events).await,
        PollEvent::Notice(Notice::Progress("10% complete".to_string()))
    );

    // Timer for urn-old is pending; switching must cancel it before it fires.
    handle.select("urn-new");
    assert_eq!(
        next_event(&mut events).await,
        PollEvent::FragmentChanged(Some("urn-new".to_string()))
    );
    assert_eq!(next_event(&mut events).await, PollEvent::NoticeCleared);
    assert_eq!(
        next_event(&mut events).await,
        PollEvent::LoadModel {
            urn: "urn-new".to_string(),
        }
    );

    // Advance far past the old delay: no re-query for urn-old may appear.
    tokio::time::sleep(RETRY_DELAY * 3).await;
    assert_eq!(source.queried(), vec!["urn-old", "urn-new"]);
}

#[tokio::test(start_paused = true)]
async fn query_failure_is_surfaced_and_not_retried() {
    let source = ScriptedSource::new(vec![Err(BackendError {
        status_code: None,
        body: "connection refused".to_string(),
    })]);
    let (handle, mut events) = PollSession::spawn(source.clone(), RETRY_DELAY);

    handle.select("urn-a");
    assert_eq!(
        next_event(&mut events).await,
        PollEvent::FragmentChanged(Some("urn-a".to_string()))
    );
    match next_event(&mut events).await {
        PollEvent::Notice(Notice::QueryError(message)) => {
            assert!(message.contains("connection refused"), "message: {message}");
        }
        other => panic!("expected a query-error notice, got {other:?}"),
    }

    // No timer was armed; nothing further happens.
    tokio::time::sleep(RETRY_DELAY * 3).await;
    assert_eq!(source.queried(), vec!["urn-a"]);
}

#[tokio::test(start_paused = true)]
async fn clearing_the_subject_resets_the_fragment() {
    let source = ScriptedSource::new(vec![in_progress("10% complete")]);
    let (handle, mut events) = PollSession::spawn(source.clone(), RETRY_DELAY);

    handle.select("urn-a");
    assert_eq!(
        next_event(&mut events).await,
        PollEvent::FragmentChanged(Some("urn-a".to_string()))
    );
    assert_eq!(
        next_event(&mut events).await,
        PollEvent::Notice(Notice::Progress("10% complete".to_string()))
    );

    handle.clear();
    assert_eq!(next_event(&mut events).await, PollEvent::FragmentChanged(None));
    assert_eq!(next_event(&mut events).await, PollEvent::NoticeCleared);

    tokio::time::sleep(RETRY_DELAY * 3).await;
    assert_eq!(source.queried(), vec!["urn-a"]);
}
